//! Error types for translations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for translation operations.
pub type I18nResult<T> = Result<T, I18nError>;

/// Errors that can occur while loading translation catalogs.
#[derive(Error, Debug)]
pub enum I18nError {
    #[error("Translation directory not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid catalog {path}: {message}")]
    InvalidCatalog { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
