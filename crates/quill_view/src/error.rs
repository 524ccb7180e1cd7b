//! Error types for views.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for view operations.
pub type ViewResult<T> = Result<T, ViewError>;

/// Errors that can occur while configuring or presenting a view.
///
/// Markup problems inside a template never surface here: unmatched blocks,
/// missing includes and unbound keys all degrade to output text.
#[derive(Error, Debug)]
pub enum ViewError {
    #[error("Template file: {path} not found")]
    TemplateNotFound { path: String },

    #[error("Include: invalid parameter(s) for key '{key}'")]
    InvalidInclude { key: String },

    #[error("Invalid configuration in {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}
