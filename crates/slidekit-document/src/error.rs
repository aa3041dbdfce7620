//! Error types for the document crate.

use thiserror::Error;

/// Errors from the persistence layer.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),

    #[error("No presentation stored under '{0}'")]
    NotFound(String),

    #[error("Unsupported format version {found} (expected at most {supported})")]
    UnsupportedVersion { found: u32, supported: u32 },
}

/// Reasons an image file is rejected on import.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ImportError {
    #[error("Image file is empty")]
    Empty,

    #[error("Image is {size} bytes; the limit is {limit} bytes")]
    TooLarge { size: usize, limit: usize },

    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),

    #[error("Image could not be decoded: {0}")]
    Decode(String),

    #[error("Could not read image file: {0}")]
    Read(String),
}

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;
