//! Binding configuration for the ctbind generator.
//!
//! Everything the generator knows about the wrapped library (its function
//! prefix, namespace, error class, interface lookup entry points, packed
//! structures) lives here rather than in the renderers. The defaults describe
//! OpenVR, so an empty file is a valid configuration.
//!
//! # Example
//!
//! ```toml
//! # ctbind.toml
//! [library]
//! handle = "_openvr"
//! function_prefix = "VR_"
//!
//! [types]
//! namespace = "vr::"
//! bool_alias = "openvr_bool"
//!
//! [structs]
//! packed = ["VRControllerState_t", "vr::VREvent_t"]
//!
//! [[structs.mixins]]
//! prefix = "HmdMatrix"
//! mixin = "_MatrixMixin"
//!
//! [annotations.implicit]
//! pEvent = "in_out: ;"
//! uncbVREvent = "size_of:pEvent;"
//! ```

mod config;
mod error;

pub use config::{
    AnnotationsConfig, ArraysConfig, BindingConfig, InterfaceConfig, LibraryConfig, MixinConfig,
    StructsConfig, TypesConfig,
};
pub use error::{ConfigError, Result};
