//! Error types for schema database operations.
//!
//! Provides a unified error type covering all failure modes: I/O,
//! serialization, schema validation and source selection.

use thiserror::Error;

/// Errors that can occur during database operations.
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON parsing or serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A loaded command table failed validation.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),

    /// File extension is not one of `json`, `yaml`, `yml`.
    #[error("unsupported schema file format: {0}")]
    UnsupportedFormat(String),

    /// All configured loader sources failed.
    #[error("no schema sources available")]
    NoSourcesAvailable,
}

/// Convenience alias for results with [`DatabaseError`].
pub type Result<T> = std::result::Result<T, DatabaseError>;
