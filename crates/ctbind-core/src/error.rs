//! Error types for ctbind-core.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for model loading.
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors that can occur while loading a declaration model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Failed to read the model file.
    #[error("Failed to read model file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse JSON model: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Failed to parse TOML model: {0}")]
    ParseToml(#[from] toml::de::Error),

    /// The file extension is neither `.json` nor `.toml`.
    #[error("Unsupported model format: {}", .0.display())]
    UnsupportedFormat(PathBuf),
}
