//! Export quality, page orientation and compression settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ExportError;

/// Raster resolution of the slide images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportQuality {
    Low,
    #[default]
    Medium,
    High,
}

impl ExportQuality {
    pub fn dpi(self) -> u32 {
        match self {
            ExportQuality::Low => 72,
            ExportQuality::Medium => 150,
            ExportQuality::High => 300,
        }
    }

    /// Render scale relative to the 960x540 slide (72 DPI is 1.0).
    pub fn scale(self) -> f64 {
        self.dpi() as f64 / 72.0
    }

    /// Compression used when none is chosen explicitly. Larger images get
    /// lighter JPEG compression.
    pub fn default_compression(self) -> CompressionHint {
        match self {
            ExportQuality::Low => CompressionHint::Slow,
            ExportQuality::Medium => CompressionHint::Medium,
            ExportQuality::High => CompressionHint::Fast,
        }
    }
}

impl fmt::Display for ExportQuality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportQuality::Low => write!(f, "low"),
            ExportQuality::Medium => write!(f, "medium"),
            ExportQuality::High => write!(f, "high"),
        }
    }
}

impl FromStr for ExportQuality {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(ExportQuality::Low),
            "medium" => Ok(ExportQuality::Medium),
            "high" => Ok(ExportQuality::High),
            other => Err(ExportError::InvalidOption(format!(
                "unknown quality '{}' (expected low, medium or high)",
                other
            ))),
        }
    }
}

/// A4 page orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageLayout {
    #[default]
    Landscape,
    Portrait,
}

impl PageLayout {
    /// Page width and height in millimetres.
    pub fn page_size_mm(self) -> (f64, f64) {
        match self {
            PageLayout::Landscape => (297.0, 210.0),
            PageLayout::Portrait => (210.0, 297.0),
        }
    }
}

impl fmt::Display for PageLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PageLayout::Landscape => write!(f, "landscape"),
            PageLayout::Portrait => write!(f, "portrait"),
        }
    }
}

impl FromStr for PageLayout {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "landscape" => Ok(PageLayout::Landscape),
            "portrait" => Ok(PageLayout::Portrait),
            other => Err(ExportError::InvalidOption(format!(
                "unknown layout '{}' (expected landscape or portrait)",
                other
            ))),
        }
    }
}

/// Size/speed trade-off for the output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionHint {
    None,
    Fast,
    Medium,
    Slow,
}

impl CompressionHint {
    pub fn jpeg_quality(self) -> u8 {
        match self {
            CompressionHint::None => 95,
            CompressionHint::Fast => 85,
            CompressionHint::Medium => 75,
            CompressionHint::Slow => 60,
        }
    }

    /// Whether content streams are Flate-compressed.
    pub fn compress_streams(self) -> bool {
        self != CompressionHint::None
    }
}

impl FromStr for CompressionHint {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(CompressionHint::None),
            "fast" => Ok(CompressionHint::Fast),
            "medium" => Ok(CompressionHint::Medium),
            "slow" => Ok(CompressionHint::Slow),
            other => Err(ExportError::InvalidOption(format!(
                "unknown compression '{}'",
                other
            ))),
        }
    }
}

/// Everything that shapes one export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExportOptions {
    pub quality: ExportQuality,
    pub layout: PageLayout,
    pub include_notes: bool,
    /// Overrides the quality's default compression.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compression: Option<CompressionHint>,
}

impl ExportOptions {
    pub fn new(quality: ExportQuality, layout: PageLayout) -> Self {
        Self {
            quality,
            layout,
            include_notes: false,
            compression: None,
        }
    }

    pub fn with_notes(mut self, include_notes: bool) -> Self {
        self.include_notes = include_notes;
        self
    }

    pub fn with_compression(mut self, compression: CompressionHint) -> Self {
        self.compression = Some(compression);
        self
    }

    /// The compression actually applied.
    pub fn effective_compression(&self) -> CompressionHint {
        self.compression
            .unwrap_or_else(|| self.quality.default_compression())
    }
}
