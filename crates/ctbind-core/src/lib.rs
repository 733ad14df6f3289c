//! Declaration model and Python ctypes rendering for native C/C++ APIs.
//!
//! This crate provides:
//! - Translation of native type spellings into ctypes expressions
//! - A declaration model (interface classes, functions, structures, enums,
//!   typedefs, constants) built by a header driver or loaded from a model file
//! - Renderers producing Python source fragments for each declaration
//! - Validation of annotations the renderers depend on
//!
//! # Architecture
//!
//! ```text
//! model file / header driver → BindingModule → Renderer → Python fragments
//!                                           ↘ validate → Diagnostics
//! ```

mod error;
mod model;
mod param;
pub mod render;
mod translate;
mod types;
mod validate;

pub use error::{ModelError, Result};
pub use model::{
    BindingModule, Class, ConstantDeclaration, Declaration, EnumConstant, EnumDecl, Function,
    Method, Struct, StructField, StructureForwardDeclaration, Typedef,
};
pub use param::{is_error_type_name, Annotation, Parameter};
pub use render::Renderer;
pub use translate::{translate_type, Translator, TypeExpr, CHAR_P, NO_VALUE, PRIMITIVE_MARKER, VOID_P};
pub use types::{CType, TypeKind};
pub use validate::{validate_declaration, validate_module};

/// Render every declaration of a module with the given renderer, dropping
/// empty fragments.
pub fn render_module(renderer: &Renderer, module: &BindingModule) -> Vec<String> {
    module
        .declarations
        .iter()
        .map(|decl| renderer.render_declaration(decl))
        .filter(|fragment| !fragment.is_empty())
        .collect()
}
