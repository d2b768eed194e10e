//! Error types for cdcr-core.

use thiserror::Error;

/// Result type for cdcr-core operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for cdcr-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A mention span encoding could not be parsed.
    #[error("Invalid span: {0}")]
    InvalidSpan(String),

    /// Parse error.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl Error {
    /// Create an invalid input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create an invalid span error.
    #[must_use]
    pub fn invalid_span(msg: impl Into<String>) -> Self {
        Self::InvalidSpan(msg.into())
    }

    /// Create a parse error.
    #[must_use]
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }
}
