//! Error types for rendering.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenderError {
    /// The renderer cannot be bound to the requested surface.
    #[error("Invalid surface {width}x{height} at ratio {device_pixel_ratio}: {reason}")]
    InvalidSurface {
        width: f64,
        height: f64,
        device_pixel_ratio: f64,
        reason: String,
    },

    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),

    #[error("Invalid grid size {0}: must be at least {1}")]
    InvalidGridSize(f64, f64),

    #[error("Image '{reference}' could not be loaded: {reason}")]
    ImageLoad { reference: String, reason: String },

    #[error("Image '{reference}' could not be decoded: {reason}")]
    ImageDecode { reference: String, reason: String },

    #[error("Surface encoding failed: {0}")]
    Encode(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    pub(crate) fn load(reference: &str, reason: impl Into<String>) -> Self {
        RenderError::ImageLoad {
            reference: abbreviate(reference),
            reason: reason.into(),
        }
    }

    pub(crate) fn decode(reference: &str, reason: impl Into<String>) -> Self {
        RenderError::ImageDecode {
            reference: abbreviate(reference),
            reason: reason.into(),
        }
    }
}

/// `data:` URLs can be megabytes long; keep messages readable.
pub(crate) fn abbreviate(reference: &str) -> String {
    const MAX: usize = 64;
    if reference.len() <= MAX {
        return reference.to_string();
    }
    let mut end = MAX;
    while !reference.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &reference[..end])
}

/// Result type for rendering operations
pub type Result<T> = std::result::Result<T, RenderError>;
