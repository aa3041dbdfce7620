//! SlideKit Settings Crate
//!
//! Editor configuration: defaults, validation and JSON/TOML persistence.

pub mod config;
pub mod error;

pub use config::{
    EditorConfig, ExportSettings, HistorySettings, ImportSettings, RenderSettings,
    StorageSettings, ValidationSettings,
};
pub use error::{SettingsError, SettingsResult};
