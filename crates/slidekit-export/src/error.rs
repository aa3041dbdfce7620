//! Error types for PDF export.

use slidekit_render::RenderError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Presentation '{0}' has no slides to export")]
    EmptyPresentation(String),

    /// A slide could not be rendered; the whole export is abandoned.
    #[error("Slide {slide} could not be rendered: {source}")]
    Render {
        /// One-based slide number.
        slide: usize,
        #[source]
        source: RenderError,
    },

    /// An image on a slide could not be loaded; the whole export is abandoned.
    #[error("Slide {slide}: image '{image}' could not be loaded: {reason}")]
    Image {
        /// One-based slide number.
        slide: usize,
        image: String,
        reason: String,
    },

    #[error("Offscreen renderer unavailable: {0}")]
    Renderer(#[from] RenderError),

    #[error("PDF assembly failed: {0}")]
    Pdf(String),

    #[error("Invalid export option: {0}")]
    InvalidOption(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;
