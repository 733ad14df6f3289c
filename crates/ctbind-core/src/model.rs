//! The declaration model.
//!
//! Nodes are plain values built once by the header driver (or deserialized
//! from a model file) and only appended to while the model is being built.
//! Rendering lives in [`crate::render`]; nothing here knows about the output
//! syntax.

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ModelError, Result};
use crate::param::Parameter;
use crate::translate::Translator;

/// An interface class backed by a function table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Class {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    /// Python base class of the wrapper.
    #[serde(default = "default_class_base")]
    pub base: String,
    /// In function-table order.
    #[serde(default)]
    pub methods: Vec<Method>,
}

fn default_class_base() -> String {
    "object".to_string()
}

impl Class {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docstring: None,
            base: default_class_base(),
            methods: Vec::new(),
        }
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    /// Methods must be added in function-table order.
    pub fn add_method(&mut self, method: Method) {
        self.methods.push(method);
    }
}

/// One function-table entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "MethodData")]
pub struct Method {
    pub name: String,
    pub return_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    parameters: Vec<Parameter>,
    #[serde(skip)]
    count_parameter_names: FxHashSet<String>,
}

#[derive(Deserialize)]
struct MethodData {
    name: String,
    return_type: String,
    #[serde(default)]
    docstring: Option<String>,
    #[serde(default)]
    parameters: Vec<Parameter>,
}

impl From<MethodData> for Method {
    fn from(data: MethodData) -> Self {
        let mut method = Method::new(data.name, data.return_type);
        method.docstring = data.docstring;
        for param in data.parameters {
            method.add_parameter(param);
        }
        method
    }
}

impl Method {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            docstring: None,
            parameters: Vec::new(),
            count_parameter_names: FxHashSet::default(),
        }
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.add_parameter(parameter);
        self
    }

    pub fn add_parameter(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
        self.classify_counts();
    }

    /// Replace a parameter's annotation and reclassify.
    pub fn set_parameter_annotation(&mut self, index: usize, annotation: impl Into<String>) {
        if let Some(param) = self.parameters.get_mut(index) {
            param.annotation = Some(annotation.into());
            self.classify_counts();
        }
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Names of the parameters that only carry a length for another one.
    pub fn count_parameter_names(&self) -> &FxHashSet<String> {
        &self.count_parameter_names
    }

    /// Collect every companion count name over the whole parameter list,
    /// then mark parameters against the complete set, so a count declared
    /// before its array is still recognized.
    fn classify_counts(&mut self) {
        let mut names = FxHashSet::default();
        for (index, param) in self.parameters.iter().enumerate() {
            if let Some(count) = param.is_array() {
                names.insert(count);
            }
            if param.is_out_string() {
                if let Some(len_param) = self.parameters.get(index + 1) {
                    names.insert(len_param.name.clone());
                }
            }
        }
        for param in &mut self.parameters {
            param.is_count = names.contains(&param.name);
        }
        self.count_parameter_names = names;
    }

    /// Whether the native return value is handed back to the caller. An
    /// output string consumes it: the probe call returns the buffer size.
    pub fn has_return(&self, translator: &Translator) -> bool {
        if translator.translate(&self.return_type) == crate::translate::NO_VALUE {
            return false;
        }
        !self.parameters.iter().any(Parameter::is_out_string)
    }
}

/// A free function exported by the native library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Function {
    pub name: String,
    pub return_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
}

impl Function {
    pub fn new(name: impl Into<String>, return_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            return_type: return_type.into(),
            docstring: None,
            parameters: Vec::new(),
        }
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.add_parameter(parameter);
        self
    }

    pub fn add_parameter(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    pub fn error_parameters<'a>(
        &'a self,
        translator: &'a Translator,
    ) -> impl Iterator<Item = &'a Parameter> + 'a {
        self.parameters.iter().filter(move |p| p.is_error(translator))
    }
}

/// A structure; field order is the native memory layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Struct {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    #[serde(default)]
    pub fields: Vec<StructField>,
    /// Explicit base type, overriding the configured defaults.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
}

impl Struct {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docstring: None,
            fields: Vec::new(),
            base: None,
        }
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.add_field(StructField::new(name, ty));
        self
    }

    pub fn add_field(&mut self, field: StructField) {
        self.fields.push(field);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    /// Native type spelling.
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

impl StructField {
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            docstring: None,
        }
    }
}

/// A structure that is referenced before its definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureForwardDeclaration {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

impl StructureForwardDeclaration {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docstring: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDecl {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    #[serde(default)]
    pub constants: Vec<EnumConstant>,
}

impl EnumDecl {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            docstring: None,
            constants: Vec::new(),
        }
    }

    pub fn with_constant(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.add_constant(EnumConstant::new(name, value));
        self
    }

    pub fn add_constant(&mut self, constant: EnumConstant) {
        self.constants.push(constant);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumConstant {
    pub name: String,
    /// Emitted verbatim.
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

impl EnumConstant {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            docstring: None,
        }
    }
}

/// A manifest constant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantDeclaration {
    pub name: String,
    /// Emitted verbatim.
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

impl ConstantDeclaration {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            docstring: None,
        }
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Typedef {
    /// The alias being declared.
    pub name: String,
    /// Native spelling of the aliased type.
    pub original: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
}

impl Typedef {
    pub fn new(alias: impl Into<String>, original: impl Into<String>) -> Self {
        Self {
            name: alias.into(),
            original: original.into(),
            docstring: None,
        }
    }
}

/// Any top-level declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Declaration {
    Class(Class),
    Function(Function),
    Struct(Struct),
    ForwardDeclaration(StructureForwardDeclaration),
    Enum(EnumDecl),
    Typedef(Typedef),
    Constant(ConstantDeclaration),
}

impl Declaration {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Class(d) => &d.name,
            Declaration::Function(d) => &d.name,
            Declaration::Struct(d) => &d.name,
            Declaration::ForwardDeclaration(d) => &d.name,
            Declaration::Enum(d) => &d.name,
            Declaration::Typedef(d) => &d.name,
            Declaration::Constant(d) => &d.name,
        }
    }
}

/// An ordered set of declarations, as stored in a model file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BindingModule {
    #[serde(default)]
    pub declarations: Vec<Declaration>,
}

impl BindingModule {
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load a `.json` or `.toml` model file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            Some("toml") => Self::from_toml_str(&content),
            _ => Err(ModelError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    pub fn push(&mut self, declaration: Declaration) {
        self.declarations.push(declaration);
    }
}
