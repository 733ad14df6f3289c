//! Python ctypes renderers.
//!
//! Every renderer is a pure function of a model node plus the [`Renderer`]
//! context (configuration and translator). Output is a text fragment with no
//! trailing newline; callers join fragments with blank lines.

mod class;
mod decls;
mod function;
mod method;
pub mod writer;

use std::borrow::Cow;

use ctbind_config::BindingConfig;

use crate::model::{Declaration, Method};
use crate::translate::Translator;

/// Rendering context.
#[derive(Debug, Clone)]
pub struct Renderer {
    config: BindingConfig,
    translator: Translator,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(BindingConfig::default())
    }
}

impl Renderer {
    pub fn new(config: BindingConfig) -> Self {
        let translator = Translator::new(&config.types);
        Self { config, translator }
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn translate(&self, spelling: &str) -> String {
        self.translator.translate(spelling)
    }

    /// Render any declaration. Self-aliasing typedefs render to `""`.
    pub fn render_declaration(&self, declaration: &Declaration) -> String {
        tracing::debug!(name = declaration.name(), "rendering declaration");
        match declaration {
            Declaration::Class(class) => self.render_class(class),
            Declaration::Function(function) => self.render_function(function),
            Declaration::Struct(st) => self.render_struct(st),
            Declaration::ForwardDeclaration(fwd) => self.render_forward_declaration(fwd),
            Declaration::Enum(en) => self.render_enum(en),
            Declaration::Typedef(td) => self.render_typedef(td),
            Declaration::Constant(constant) => self.render_constant(constant),
        }
    }

    /// The method with configured implicit annotations filled in for
    /// parameters the parser left unannotated.
    pub fn with_implicit_annotations<'a>(&self, method: &'a Method) -> Cow<'a, Method> {
        let implicit: Vec<(usize, &str)> = method
            .parameters()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.parsed_annotation().is_none())
            .filter_map(|(index, p)| {
                self.config
                    .annotations
                    .implicit_for(&p.name)
                    .map(|annotation| (index, annotation))
            })
            .collect();
        if implicit.is_empty() {
            return Cow::Borrowed(method);
        }
        let mut method = method.clone();
        for (index, annotation) in implicit {
            tracing::trace!(
                method = %method.name,
                param = %method.parameters()[index].name,
                annotation,
                "applying implicit annotation"
            );
            method.set_parameter_annotation(index, annotation);
        }
        Cow::Owned(method)
    }
}

/// First line of a docstring, for single-line comment positions.
fn first_line(doc: &str) -> &str {
    doc.lines().next().unwrap_or_default().trim()
}
