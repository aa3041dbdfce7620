//! # SlideKit Core
//!
//! Core types, traits, and utilities for SlideKit.
//! Provides the fundamental abstractions shared by the document, render and
//! export crates: slide-space constants, the error taxonomy, the application
//! event bus, the single-threaded observable used for store subscriptions,
//! and the fallback supervisor that guards render/update cycles.

pub mod constants;
pub mod error;
pub mod event_bus;
pub mod observable;
pub mod supervisor;
pub mod types;

pub use error::{Error, Result};

// Re-export event bus for convenience
pub use event_bus::{
    event_bus, AppEvent, DocumentEvent, EventBus, EventCategory, ExportEvent, ListenerId,
    Notification, NotificationSink,
};

pub use observable::{Subject, Subscription};
pub use supervisor::{SupervisedFailure, SupervisedOutput, Supervisor};

// Re-export type aliases for convenience
pub use types::{
    shared, thread_safe, OperationResult, ProgressCallback, Shared, ThreadSafe, UiDataCallback,
};
