//! Common error types for nextrack

use thiserror::Error;

/// Common result type for nextrack operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the nextrack crates
#[derive(Error, Debug)]
pub enum Error {
    /// Key-value store operation error (wraps sqlx::Error)
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored payload failed to decode
    #[error("Decode error: {0}")]
    Decode(String),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(e.to_string())
    }
}
