//! Image import validation.
//!
//! Files picked by the user are sniffed, size-checked and decoded once
//! before they are embedded as `data:` URLs in image elements.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::ImageFormat;
use slidekit_core::constants::MAX_IMAGE_IMPORT_BYTES;
use std::path::Path;

use crate::error::ImportError;
use crate::model::{Bounds, Element, ElementKind, ImageContent};

/// A validated image ready to be placed on a slide.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedImage {
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
    /// `data:<mime>;base64,...`
    pub data_url: String,
}

impl ImportedImage {
    pub fn mime_type(&self) -> &'static str {
        mime_type(self.format)
    }

    /// Image element at `(x, y)`, scaled down to fit the given box.
    pub fn to_element(&self, x: f64, y: f64, max_width: f64, max_height: f64, alt_text: &str) -> Element {
        let (w, h) = (self.width.max(1) as f64, self.height.max(1) as f64);
        let scale = (max_width / w).min(max_height / h).min(1.0);
        Element::new(
            Bounds::new(x, y, w * scale, h * scale),
            ElementKind::Image(ImageContent {
                source: self.data_url.clone(),
                alt_text: alt_text.to_string(),
            }),
        )
    }
}

/// Outcome of an import attempt.
pub type ImportResult = std::result::Result<ImportedImage, ImportError>;

/// Validates image bytes against the type and size limits.
#[derive(Debug, Clone)]
pub struct ImageImporter {
    max_bytes: usize,
}

impl ImageImporter {
    pub fn new() -> Self {
        Self::with_limit(MAX_IMAGE_IMPORT_BYTES)
    }

    pub fn with_limit(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    pub fn import_bytes(&self, bytes: &[u8]) -> ImportResult {
        if bytes.is_empty() {
            return Err(ImportError::Empty);
        }
        if bytes.len() > self.max_bytes {
            return Err(ImportError::TooLarge {
                size: bytes.len(),
                limit: self.max_bytes,
            });
        }

        let format = image::guess_format(bytes)
            .map_err(|_| ImportError::UnsupportedType("unknown".to_string()))?;
        if !is_supported(format) {
            return Err(ImportError::UnsupportedType(format!("{:?}", format)));
        }

        let decoded = image::load_from_memory_with_format(bytes, format)
            .map_err(|e| ImportError::Decode(e.to_string()))?;

        tracing::debug!(
            "Imported {:?} image {}x{} ({} bytes)",
            format,
            decoded.width(),
            decoded.height(),
            bytes.len()
        );

        Ok(ImportedImage {
            format,
            width: decoded.width(),
            height: decoded.height(),
            data_url: format!("data:{};base64,{}", mime_type(format), STANDARD.encode(bytes)),
        })
    }

    pub fn import_file(&self, path: &Path) -> ImportResult {
        // Check the size before reading the whole file.
        let len = std::fs::metadata(path)
            .map_err(|e| ImportError::Read(e.to_string()))?
            .len();
        if len > self.max_bytes as u64 {
            return Err(ImportError::TooLarge {
                size: usize::try_from(len).unwrap_or(usize::MAX),
                limit: self.max_bytes,
            });
        }
        let bytes = std::fs::read(path).map_err(|e| ImportError::Read(e.to_string()))?;
        self.import_bytes(&bytes)
    }
}

impl Default for ImageImporter {
    fn default() -> Self {
        Self::new()
    }
}

fn is_supported(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Png | ImageFormat::Jpeg | ImageFormat::Gif | ImageFormat::WebP
    )
}

fn mime_type(format: ImageFormat) -> &'static str {
    match format {
        ImageFormat::Png => "image/png",
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Gif => "image/gif",
        ImageFormat::WebP => "image/webp",
        _ => "application/octet-stream",
    }
}
