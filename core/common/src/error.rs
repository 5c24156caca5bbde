//! Common error types for StrataFS.

use thiserror::Error;

/// Top-level error type for StrataFS operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("Config parse error: {0}")]
    ConfigParse(String),

    /// Backend construction failed.
    #[error("Construction error: {0}")]
    Construction(String),

    /// Registry key could not be decoded.
    #[error("Decode error: {0}")]
    Decode(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Resource already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Operation is not supported by this backend.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// Network operation failed.
    #[error("Network error: {0}")]
    Network(String),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
