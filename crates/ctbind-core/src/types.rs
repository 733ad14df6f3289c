//! Native type handles.
//!
//! A `CType` is what the header parser hands over for a parameter: the kind
//! tag, the spelling exactly as clang prints it, and for pointers the pointee
//! handle with its own const qualification. The generator never re-parses a
//! declaration; it only looks at these handles and at spellings.

use serde::{Deserialize, Serialize};

/// Coarse type kind, mirroring the libclang kinds the generator cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Void,
    Builtin,
    Pointer,
    LValueReference,
    Record,
    Enum,
    Typedef,
    ConstantArray,
    #[default]
    Other,
}

/// A parsed native type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CType {
    #[serde(default)]
    pub kind: TypeKind,
    pub spelling: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointee: Option<Box<CType>>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_const: bool,
}

impl CType {
    /// A non-pointer type of the given kind.
    pub fn named(kind: TypeKind, spelling: impl Into<String>) -> Self {
        Self {
            kind,
            spelling: spelling.into(),
            pointee: None,
            is_const: false,
        }
    }

    pub fn void() -> Self {
        Self::named(TypeKind::Void, "void")
    }

    pub fn builtin(spelling: impl Into<String>) -> Self {
        Self::named(TypeKind::Builtin, spelling)
    }

    pub fn record(spelling: impl Into<String>) -> Self {
        Self::named(TypeKind::Record, spelling)
    }

    pub fn enumeration(spelling: impl Into<String>) -> Self {
        Self::named(TypeKind::Enum, spelling)
    }

    pub fn typedef(spelling: impl Into<String>) -> Self {
        Self::named(TypeKind::Typedef, spelling)
    }

    /// Const-qualify this type; the spelling gains a `const ` prefix the way
    /// clang prints it.
    pub fn constant(mut self) -> Self {
        if !self.is_const {
            self.is_const = true;
            self.spelling = format!("const {}", self.spelling);
        }
        self
    }

    /// Create a pointer to this type.
    pub fn ptr(self) -> Self {
        Self {
            kind: TypeKind::Pointer,
            spelling: format!("{} *", self.spelling),
            pointee: Some(Box::new(self)),
            is_const: false,
        }
    }

    /// Create a pointer to the const-qualified version of this type.
    pub fn const_ptr(self) -> Self {
        self.constant().ptr()
    }

    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    pub fn spelling(&self) -> &str {
        &self.spelling
    }

    /// Get the pointee type for a pointer type.
    /// Returns None if this is not a pointer type.
    pub fn pointee(&self) -> Option<&CType> {
        match self.kind {
            TypeKind::Pointer | TypeKind::LValueReference => self.pointee.as_deref(),
            _ => None,
        }
    }

    pub fn is_pointer(&self) -> bool {
        self.kind == TypeKind::Pointer
    }

    pub fn is_const_qualified(&self) -> bool {
        self.is_const
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_spelling_matches_clang() {
        let ty = CType::builtin("uint32_t").ptr();
        assert_eq!(ty.spelling(), "uint32_t *");
        assert!(ty.is_pointer());
        assert_eq!(ty.pointee().map(CType::spelling), Some("uint32_t"));
    }

    #[test]
    fn test_const_pointer() {
        let ty = CType::builtin("char").const_ptr();
        assert_eq!(ty.spelling(), "const char *");
        let pointee = ty.pointee().unwrap();
        assert!(pointee.is_const_qualified());
        assert!(!ty.is_const_qualified());
    }

    #[test]
    fn test_constant_is_idempotent() {
        let ty = CType::record("vr::HmdMatrix34_t").constant().constant();
        assert_eq!(ty.spelling(), "const vr::HmdMatrix34_t");
    }

    #[test]
    fn test_non_pointer_has_no_pointee() {
        assert!(CType::enumeration("vr::ETrackedDeviceClass").pointee().is_none());
    }

    #[test]
    fn test_deserialize_defaults() {
        let ty: CType = serde_json::from_str(r#"{ "spelling": "float" }"#).unwrap();
        assert_eq!(ty.kind(), TypeKind::Other);
        assert!(!ty.is_const_qualified());
        assert!(ty.pointee().is_none());
    }
}
