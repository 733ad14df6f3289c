//! Binding configuration types (ctbind.toml format).

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, Result};

/// Root binding configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// The native library and its free functions.
    pub library: LibraryConfig,

    /// Type translation knobs.
    pub types: TypesConfig,

    /// Interface (function table) lookup and error reporting.
    pub interface: InterfaceConfig,

    /// Array parameter conventions.
    pub arrays: ArraysConfig,

    /// Structure layout overrides.
    pub structs: StructsConfig,

    /// Annotations applied to parameters the parser left unannotated.
    pub annotations: AnnotationsConfig,
}

/// The native shared library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryConfig {
    /// Name of the loaded library object in the generated module.
    pub handle: String,

    /// Prefix stripped from free function names before camel-casing.
    pub function_prefix: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            handle: "_openvr".to_string(),
            function_prefix: "VR_".to_string(),
        }
    }
}

/// Type translation knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypesConfig {
    /// Library namespace stripped from the start of type names (`vr::`).
    pub namespace: String,

    /// Identifier prefix stripped at word boundaries (`VR_`).
    pub strip_prefix: String,

    /// ABI-sized boolean alias defined by the runtime support module.
    pub bool_alias: String,
}

impl Default for TypesConfig {
    fn default() -> Self {
        Self {
            namespace: "vr::".to_string(),
            strip_prefix: "VR_".to_string(),
            bool_alias: "openvr_bool".to_string(),
        }
    }
}

/// Versioned interface lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterfaceConfig {
    /// Suffix appended to a class name to form its version key constant.
    pub version_suffix: String,

    /// Prefix of the function-table lookup key.
    pub fn_table_key_prefix: String,

    /// Calling-convention factory used in function-table layouts.
    pub calltype: String,

    /// Exception class raised by generated wrappers.
    pub error_class: String,

    /// Helper that raises on a non-zero init error code.
    pub init_error_check: String,

    /// Error code passed to `init_error_check` when a version is unknown.
    pub interface_not_found: String,

    /// Runtime entry point validating an interface version key.
    pub version_check: String,

    /// Runtime entry point resolving an interface key to a function table.
    pub lookup: String,
}

impl Default for InterfaceConfig {
    fn default() -> Self {
        Self {
            version_suffix: "_Version".to_string(),
            fn_table_key_prefix: "FnTable:".to_string(),
            calltype: "OPENVR_FNTABLE_CALLTYPE".to_string(),
            error_class: "OpenVRError".to_string(),
            init_error_check: "_checkInitError".to_string(),
            interface_not_found: "VRInitError_Init_InterfaceNotFound".to_string(),
            version_check: "isInterfaceVersionValid".to_string(),
            lookup: "getGenericInterface".to_string(),
        }
    }
}

/// Array parameter conventions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArraysConfig {
    /// Count parameters starting with this prefix...
    pub device_count_prefix: String,

    /// ...and ending with this suffix size per-device arrays.
    pub device_count_suffix: String,

    /// Constant used as the array length when the caller passes no array.
    pub max_device_count: String,
}

impl Default for ArraysConfig {
    fn default() -> Self {
        Self {
            device_count_prefix: "unTrackedDevice".to_string(),
            device_count_suffix: "Count".to_string(),
            max_device_count: "k_unMaxTrackedDeviceCount".to_string(),
        }
    }
}

impl ArraysConfig {
    /// Whether a count parameter name follows the per-device naming convention.
    pub fn is_device_count(&self, count_param: &str) -> bool {
        count_param.len() >= self.device_count_prefix.len() + self.device_count_suffix.len()
            && count_param.starts_with(&self.device_count_prefix)
            && count_param.ends_with(&self.device_count_suffix)
    }
}

/// A convenience mixin added to structures whose name has a given prefix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MixinConfig {
    pub prefix: String,
    pub mixin: String,
}

/// Structure layout overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StructsConfig {
    /// Structures that need the alignment-override base type.
    pub packed: Vec<String>,

    /// The alignment-override base type.
    pub packed_base: String,

    /// Native structure names replaced before rendering.
    pub renames: IndexMap<String, String>,

    /// Mixins, applied in order; later matches end up first in the base list.
    pub mixins: Vec<MixinConfig>,
}

impl Default for StructsConfig {
    fn default() -> Self {
        let mut renames = IndexMap::new();
        renames.insert(
            "vr::VRControllerState001_t".to_string(),
            "VRControllerState_t".to_string(),
        );
        Self {
            packed: vec!["VRControllerState_t".to_string(), "vr::VREvent_t".to_string()],
            packed_base: "PackHackStructure".to_string(),
            renames,
            mixins: vec![
                MixinConfig {
                    prefix: "HmdMatrix".to_string(),
                    mixin: "_MatrixMixin".to_string(),
                },
                MixinConfig {
                    prefix: "HmdVector".to_string(),
                    mixin: "_VectorMixin".to_string(),
                },
            ],
        }
    }
}

impl StructsConfig {
    /// The name a structure is declared under after renames.
    pub fn rename<'a>(&'a self, name: &'a str) -> &'a str {
        self.renames.get(name).map(String::as_str).unwrap_or(name)
    }

    pub fn is_packed(&self, name: &str) -> bool {
        self.packed.iter().any(|p| p == name)
    }

    /// Mixins whose prefix matches the (translated) structure name.
    pub fn mixins_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.mixins
            .iter()
            .filter(move |m| name.starts_with(&m.prefix))
            .map(|m| m.mixin.as_str())
    }
}

/// Annotations keyed by parameter name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationsConfig {
    /// Annotation text used when a parameter arrives without one.
    pub implicit: IndexMap<String, String>,
}

impl Default for AnnotationsConfig {
    fn default() -> Self {
        let mut implicit = IndexMap::new();
        implicit.insert("pEvent".to_string(), "in_out: ;".to_string());
        implicit.insert("uncbVREvent".to_string(), "size_of:pEvent;".to_string());
        implicit.insert(
            "unControllerStateSize".to_string(),
            "size_of:pControllerState;".to_string(),
        );
        Self { implicit }
    }
}

impl AnnotationsConfig {
    pub fn implicit_for(&self, param: &str) -> Option<&str> {
        self.implicit.get(param).map(String::as_str)
    }
}

impl BindingConfig {
    /// Parse configuration from TOML text and validate it.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: BindingConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Reject settings that would produce unusable bindings.
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("library.handle", &self.library.handle),
            ("interface.calltype", &self.interface.calltype),
            ("interface.error_class", &self.interface.error_class),
        ];
        for (key, value) in required {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("`{}` must not be empty", key)));
            }
        }
        if let Some(m) = self.structs.mixins.iter().find(|m| m.prefix.is_empty()) {
            return Err(ConfigError::Validation(format!(
                "mixin `{}` has an empty prefix and would apply to every structure",
                m.mixin
            )));
        }
        Ok(())
    }
}
