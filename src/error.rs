//! Error types for cdcr.

use thiserror::Error;

/// Result type for cdcr operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for cdcr operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Parse error (malformed interchange data that could not be recovered).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Structural corruption of an interchange file (unbalanced CONLL markers).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// Error from the core types crate.
    #[error(transparent)]
    Core(#[from] cdcr_core::Error),
}

impl Error {
    /// Create an invalid input error.
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a parse error.
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Error::Validation(msg.into())
    }

    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }
}
