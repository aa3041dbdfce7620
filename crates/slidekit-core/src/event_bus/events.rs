//! Event type definitions for the event bus.
//!
//! Events are cloneable and serializable for logging/replay.

use serde::{Deserialize, Serialize};

/// Root event enum for all application events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AppEvent {
    /// Outcome notifications for the user
    Notification(Notification),
    /// Document lifecycle events
    Document(DocumentEvent),
    /// PDF export progress and results
    Export(ExportEvent),
}

impl AppEvent {
    /// Get the category of this event
    pub fn category(&self) -> EventCategory {
        match self {
            AppEvent::Notification(_) => EventCategory::Notification,
            AppEvent::Document(_) => EventCategory::Document,
            AppEvent::Export(_) => EventCategory::Export,
        }
    }

    /// Get a short description of this event for logging
    pub fn description(&self) -> String {
        match self {
            AppEvent::Notification(n) => format!("{}: {}", n.title, n.message),
            AppEvent::Document(e) => e.description(),
            AppEvent::Export(e) => e.description(),
        }
    }
}

/// Event category for filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// User-facing outcome notifications.
    Notification,
    /// Document save/load/create events.
    Document,
    /// Export progress events.
    Export,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Notification => write!(f, "Notification"),
            EventCategory::Document => write!(f, "Document"),
            EventCategory::Export => write!(f, "Export"),
        }
    }
}

/// Outcome signal handed to the external notification sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub success: bool,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: true,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn failure(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Anything that can receive outcome notifications.
pub trait NotificationSink {
    fn notify(&self, notification: Notification);
}

/// Document lifecycle events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DocumentEvent {
    /// A presentation was written to storage.
    Saved {
        /// Storage key.
        key: String,
        /// Presentation name.
        name: String,
    },
    /// A presentation was read from storage.
    Loaded {
        /// Storage key.
        key: String,
        /// Number of slides loaded.
        slide_count: usize,
    },
    /// An image import was rejected.
    ImportRejected {
        /// Reason shown to the user.
        reason: String,
    },
}

impl DocumentEvent {
    fn description(&self) -> String {
        match self {
            DocumentEvent::Saved { key, name } => format!("Saved '{}' as {}", name, key),
            DocumentEvent::Loaded { key, slide_count } => {
                format!("Loaded {} ({} slides)", key, slide_count)
            }
            DocumentEvent::ImportRejected { reason } => format!("Import rejected: {}", reason),
        }
    }
}

/// PDF export events
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExportEvent {
    /// Export started.
    Started {
        /// Number of slides to export.
        slide_count: usize,
    },
    /// A slide finished; progress is 0..=100.
    Progress {
        /// Percent complete.
        percent: f32,
    },
    /// Export produced a document.
    Completed {
        /// Output file name.
        file_name: String,
        /// Number of pages written.
        pages: usize,
    },
    /// Export failed as a whole.
    Failed {
        /// Error message.
        error: String,
    },
}

impl ExportEvent {
    fn description(&self) -> String {
        match self {
            ExportEvent::Started { slide_count } => format!("Export started ({} slides)", slide_count),
            ExportEvent::Progress { percent } => format!("Export progress {:.0}%", percent),
            ExportEvent::Completed { file_name, pages } => {
                format!("Exported {} ({} pages)", file_name, pages)
            }
            ExportEvent::Failed { error } => format!("Export failed: {}", error),
        }
    }
}
