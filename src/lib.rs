//! # SlideKit
//!
//! The core of a slide-presentation editor, usable headless:
//! - Slide-space geometry and a zoomable, pannable viewport
//! - A deterministic 960x540 slide renderer with an image cache
//! - A document store with bounded undo/redo history
//! - Canvas, thumbnail and notes views that follow the store
//! - Sequential PDF export, one A4 page per slide
//!
//! ## Architecture
//!
//! SlideKit is organized as a workspace with multiple crates:
//!
//! 1. **slidekit-core** - Constants, errors, event bus, observable, supervisor
//! 2. **slidekit-document** - Data model, document store, history, persistence
//! 3. **slidekit-render** - Geometry, renderer, image loading, derived views
//! 4. **slidekit-export** - PDF export pipeline
//! 5. **slidekit-settings** - Editor configuration
//! 6. **slidekit** - Command-line binary that ties the crates together

pub mod cli;

pub use slidekit_core::{
    event_bus, AppEvent, Error, EventBus, ExportEvent, Notification, NotificationSink, Result,
};
pub use slidekit_document::{
    DocumentStore, Editor, HistoryStore, Presentation, PresentationFile, PresentationRepository,
    Slide,
};
pub use slidekit_export::{ExportOptions, ExportQuality, ExportedPdf, PageLayout, PdfExporter};
pub use slidekit_render::{
    EditorCanvas, NotesPanel, SlideRenderer, SurfaceConfig, ThumbnailStrip, ViewportState,
};
pub use slidekit_settings::EditorConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Forwards notifications to the process-wide event bus.
#[derive(Debug, Default, Clone, Copy)]
pub struct BusNotifier;

impl NotificationSink for BusNotifier {
    fn notify(&self, notification: Notification) {
        event_bus().notify(notification);
    }
}

/// Initialize logging
///
/// Log lines go to stderr so command output on stdout stays clean.
/// `RUST_LOG` overrides the default `info` level. With `json` set each
/// event is written as one JSON object per line.
pub fn init_logging(json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    if json {
        let fmt_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_current_span(false);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_level(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()?;
    }

    Ok(())
}
