//! # Event Bus Module
//!
//! Publish/subscribe channel for outcomes that leave the core: user
//! notifications (`{success, title, message}`), export progress and
//! document lifecycle events. The core never draws UI; it only signals.
//!
//! ```rust,ignore
//! use slidekit_core::event_bus::{event_bus, AppEvent, EventCategory};
//!
//! let id = event_bus().listen(&[EventCategory::Notification], |event| {
//!     if let AppEvent::Notification(n) = event {
//!         println!("{}: {}", n.title, n.message);
//!     }
//! });
//! // ...
//! event_bus().remove(id);
//! ```

mod bus;
mod events;

pub use bus::{event_bus, EventBus, ListenerId, NOTIFICATION_BACKLOG};
pub use events::{AppEvent, DocumentEvent, EventCategory, ExportEvent, Notification, NotificationSink};
