//! Error handling for SlideKit
//!
//! Provides the shared error type used by the core crate and embedded by the
//! higher layers. Each higher crate owns its own `thiserror` enum; this one
//! covers the concerns they have in common (I/O, serialization, parsing of
//! shared value types).

use thiserror::Error;

/// Main error type for SlideKit core
#[derive(Error, Debug)]
pub enum Error {
    /// A color string could not be parsed
    #[error("Invalid color '{value}': {reason}")]
    InvalidColor {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is an I/O error
    pub fn is_io(&self) -> bool {
        matches!(self, Error::Io(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;
