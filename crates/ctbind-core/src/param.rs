//! Parameters and the annotation mini-language.
//!
//! The header parser attaches a free-form annotation string to parameters.
//! Four tags are understood:
//!
//! | Tag | Meaning |
//! |---|---|
//! | `array_count:<param>;` | pointer to an array whose length is passed in `<param>` |
//! | `out_string: ;` | byte buffer whose size is probed with a zero-length call first |
//! | `in_out: ;` | caller-supplied buffer that is also handed back |
//! | `size_of:<param>;` | integer filled with the byte size of `<param>`'s pointee |
//!
//! Anything else is kept as [`Annotation::Other`] and ignored.

use serde::{Deserialize, Serialize};

use crate::render::writer::sanitize_identifier;
use crate::translate::Translator;
use crate::types::{CType, TypeKind};

/// A parsed parameter annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    ArrayCount(String),
    OutString,
    InOut,
    SizeOf(String),
    Other(String),
}

impl Annotation {
    /// Parse annotation text. Returns `None` for empty text.
    pub fn parse(text: &str) -> Option<Annotation> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let annotation = match text {
            "out_string: ;" => Annotation::OutString,
            "in_out: ;" => Annotation::InOut,
            _ => {
                if let Some(name) = tag_value(text, "array_count:") {
                    Annotation::ArrayCount(name)
                } else if let Some(name) = tag_value(text, "size_of:") {
                    Annotation::SizeOf(name)
                } else {
                    Annotation::Other(text.to_string())
                }
            }
        };
        Some(annotation)
    }
}

/// Value of a `tag<value>;` annotation: the value is the leading
/// non-whitespace run up to its last `;`.
fn tag_value(text: &str, tag: &str) -> Option<String> {
    let rest = text.strip_prefix(tag)?;
    let run = rest.split_whitespace().next()?;
    let end = run.rfind(';')?;
    let value = &run[..end];
    (!value.is_empty()).then(|| value.to_string())
}

/// Whether a translated type name is an error/status enum (`EVRInitError`).
pub fn is_error_type_name(name: &str) -> bool {
    name.len() > "E".len() + "Error".len()
        && name.starts_with('E')
        && name.ends_with("Error")
        && !name.contains(char::is_whitespace)
}

/// One native parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Parameter {
    /// Native parameter name, as referenced by annotations.
    pub name: String,
    #[serde(rename = "type")]
    pub ty: CType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docstring: Option<String>,
    /// Set by the owning method when another parameter names this one as
    /// its companion count.
    #[serde(skip)]
    pub(crate) is_count: bool,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: CType) -> Self {
        Self {
            name: name.into(),
            ty,
            default_value: None,
            annotation: None,
            docstring: None,
            is_count: false,
        }
    }

    pub fn with_default(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn with_annotation(mut self, annotation: impl Into<String>) -> Self {
        self.annotation = Some(annotation.into());
        self
    }

    pub fn with_docstring(mut self, docstring: impl Into<String>) -> Self {
        self.docstring = Some(docstring.into());
        self
    }

    /// The name used for this parameter in generated code.
    pub fn ident(&self) -> String {
        sanitize_identifier(&self.name)
    }

    pub fn parsed_annotation(&self) -> Option<Annotation> {
        self.annotation.as_deref().and_then(Annotation::parse)
    }

    /// Pointer to an error/status enum.
    pub fn is_error(&self, translator: &Translator) -> bool {
        if !self.ty.is_pointer() {
            return false;
        }
        self.ty
            .pointee()
            .map(|pointee| is_error_type_name(&translator.translate(pointee.spelling())))
            .unwrap_or(false)
    }

    /// Name of the companion count parameter, if this is an array.
    pub fn is_array(&self) -> Option<String> {
        match self.parsed_annotation() {
            Some(Annotation::ArrayCount(count)) => Some(count),
            _ => None,
        }
    }

    pub fn is_out_string(&self) -> bool {
        self.parsed_annotation() == Some(Annotation::OutString)
    }

    pub fn is_in_out(&self) -> bool {
        self.parsed_annotation() == Some(Annotation::InOut)
    }

    /// Name of the buffer parameter whose size this parameter carries.
    pub fn size_of(&self) -> Option<String> {
        match self.parsed_annotation() {
            Some(Annotation::SizeOf(buffer)) => Some(buffer),
            _ => None,
        }
    }

    pub fn is_count(&self) -> bool {
        self.is_count
    }

    /// Pointer to a mutable, non-void value.
    pub fn is_output(&self) -> bool {
        if self.is_count || !self.ty.is_pointer() {
            return false;
        }
        match self.ty.pointee() {
            Some(pointee) => !pointee.is_const_qualified() && !is_void(pointee),
            None => false,
        }
    }

    /// Appears in the generated method signature.
    pub fn is_input(&self) -> bool {
        if self.is_count {
            return false;
        }
        if self.is_array().is_some() || self.is_in_out() {
            return true;
        }
        if self.size_of().is_some() {
            return false;
        }
        !self.is_output()
    }

    /// Translated pointee type, for pointer parameters.
    pub fn pointee_type(&self, translator: &Translator) -> Option<String> {
        self.ty
            .pointee()
            .map(|pointee| translator.translate(pointee.spelling()))
    }
}

fn is_void(ty: &CType) -> bool {
    ty.kind() == TypeKind::Void
        || ty
            .spelling()
            .split_whitespace()
            .filter(|w| *w != "const")
            .eq(["void"])
}
