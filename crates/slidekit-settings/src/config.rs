//! Editor configuration for SlideKit
//!
//! Settings are grouped into sections that mirror the editor's parts:
//! - History (undo capacity)
//! - Render (thumbnail and notes preview scales, grid)
//! - Export defaults (quality, page layout, notes)
//! - Storage (where presentations are kept)
//! - Import limits and URL validation timing
//!
//! Files may be JSON or TOML, chosen by extension. Missing sections fall
//! back to their defaults.

use serde::{Deserialize, Serialize};
use slidekit_core::constants::{
    DEFAULT_GRID_SIZE, DEFAULT_HISTORY_CAPACITY, DEFAULT_THUMBNAIL_SCALE,
    DEFAULT_VALIDATION_DEBOUNCE_MS, MAX_IMAGE_IMPORT_BYTES, MIN_GRID_SIZE,
};
use slidekit_document::{HistoryStore, ImageImporter};
use slidekit_export::{ExportOptions, ExportQuality, PageLayout};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{SettingsError, SettingsResult};

/// Undo history settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    /// Maximum number of undo steps kept
    pub capacity: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Derived view settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Thumbnail size relative to the 960x540 slide
    pub thumbnail_scale: f64,
    /// Canvas grid spacing in slide units
    pub grid_size: f64,
    /// Notes panel preview size relative to the slide
    pub notes_preview_scale: f64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            thumbnail_scale: DEFAULT_THUMBNAIL_SCALE,
            grid_size: DEFAULT_GRID_SIZE,
            notes_preview_scale: 0.5,
        }
    }
}

/// PDF export defaults
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    pub quality: ExportQuality,
    pub layout: PageLayout,
    /// Print speaker notes under each slide
    pub include_notes: bool,
}

/// Presentation storage settings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Directory holding saved presentations; the platform data directory when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

/// Image import settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportSettings {
    /// Largest accepted image file in bytes
    pub max_image_bytes: usize,
}

impl Default for ImportSettings {
    fn default() -> Self {
        Self {
            max_image_bytes: MAX_IMAGE_IMPORT_BYTES,
        }
    }
}

/// Image URL validation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationSettings {
    /// Quiet period before a typed URL is probed
    pub debounce_ms: u64,
}

impl Default for ValidationSettings {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_VALIDATION_DEBOUNCE_MS,
        }
    }
}

/// Complete editor configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history: HistorySettings,
    pub render: RenderSettings,
    pub export: ExportSettings,
    pub storage: StorageSettings,
    pub import: ImportSettings,
    pub validation: ValidationSettings,
}

enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> SettingsResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(SettingsError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// `<config_dir>/slidekit/config.toml`
    pub fn default_path() -> SettingsResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("slidekit").join("config.toml"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no config directory on this platform".to_string())
            })
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)?;
        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };
        config.validate()?;
        tracing::debug!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Loads `path` if it exists, otherwise returns the defaults.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No settings at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Save config to file (JSON or TOML), creating parent directories.
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;
        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        tracing::debug!("Saved settings to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> SettingsResult<()> {
        if self.history.capacity == 0 {
            return Err(SettingsError::invalid("history.capacity", "must be at least 1"));
        }

        for (key, scale) in [
            ("render.thumbnail_scale", self.render.thumbnail_scale),
            ("render.notes_preview_scale", self.render.notes_preview_scale),
        ] {
            if !scale.is_finite() || scale <= 0.0 || scale > 4.0 {
                return Err(SettingsError::invalid(key, "must be in (0, 4]"));
            }
        }

        if !self.render.grid_size.is_finite() || self.render.grid_size < MIN_GRID_SIZE {
            return Err(SettingsError::invalid(
                "render.grid_size",
                format!("must be at least {}", MIN_GRID_SIZE),
            ));
        }

        if self.import.max_image_bytes == 0 {
            return Err(SettingsError::invalid("import.max_image_bytes", "must be > 0"));
        }

        Ok(())
    }

    /// Export options seeded from the configured defaults.
    pub fn export_options(&self) -> ExportOptions {
        ExportOptions::new(self.export.quality, self.export.layout)
            .with_notes(self.export.include_notes)
    }

    pub fn history_store(&self) -> HistoryStore {
        HistoryStore::with_capacity(self.history.capacity)
    }

    pub fn image_importer(&self) -> ImageImporter {
        ImageImporter::with_limit(self.import.max_image_bytes)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.validation.debounce_ms)
    }

    /// The configured storage directory, or `<data_dir>/slidekit/presentations`.
    pub fn storage_directory(&self) -> SettingsResult<PathBuf> {
        if let Some(dir) = &self.storage.directory {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join("slidekit").join("presentations"))
            .ok_or_else(|| {
                SettingsError::ConfigDirectory("no data directory on this platform".to_string())
            })
    }
}
