//! Process-wide event bus.
//!
//! Listeners registered with [`EventBus::listen`] run synchronously on the
//! publishing thread, after the listener list has been released, so a
//! handler may register or remove listeners. Async tasks poll a
//! [`broadcast`] receiver instead.
//! The last few notifications are kept so a late view can replay them.

use parking_lot::{Mutex, RwLock};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::sync::broadcast;

use super::events::{AppEvent, EventCategory, Notification, NotificationSink};

/// Broadcast channel capacity.
const CHANNEL_CAPACITY: usize = 256;

/// Notifications kept for replay.
pub const NOTIFICATION_BACKLOG: usize = 20;

/// Handle returned by [`EventBus::listen`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener#{}", self.0)
    }
}

type Handler = Arc<dyn Fn(&AppEvent) + Send + Sync>;

struct Listener {
    id: ListenerId,
    /// `None` receives every category.
    categories: Option<Vec<EventCategory>>,
    handler: Handler,
}

impl Listener {
    fn wants(&self, event: &AppEvent) -> bool {
        self.categories
            .as_ref()
            .map_or(true, |c| c.contains(&event.category()))
    }
}

pub struct EventBus {
    sender: broadcast::Sender<AppEvent>,
    listeners: RwLock<Vec<Listener>>,
    next_id: AtomicU64,
    backlog: Mutex<VecDeque<Notification>>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            backlog: Mutex::new(VecDeque::with_capacity(NOTIFICATION_BACKLOG)),
        }
    }

    /// Delivers `event` to matching listeners and async receivers.
    ///
    /// Returns how many listeners and receivers saw it; zero is not an error.
    pub fn publish(&self, event: AppEvent) -> usize {
        tracing::trace!("publish: {}", event.description());

        if let AppEvent::Notification(n) = &event {
            let mut backlog = self.backlog.lock();
            if backlog.len() == NOTIFICATION_BACKLOG {
                backlog.pop_front();
            }
            backlog.push_back(n.clone());
        }

        let handlers: Vec<Handler> = self
            .listeners
            .read()
            .iter()
            .filter(|l| l.wants(&event))
            .map(|l| Arc::clone(&l.handler))
            .collect();
        for handler in &handlers {
            handler(&event);
        }
        handlers.len() + self.sender.send(event).unwrap_or(0)
    }

    /// Registers a synchronous listener for the given categories; an empty
    /// slice means every category.
    pub fn listen<F>(&self, categories: &[EventCategory], handler: F) -> ListenerId
    where
        F: Fn(&AppEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let categories = (!categories.is_empty()).then(|| categories.to_vec());
        self.listeners.write().push(Listener {
            id,
            categories,
            handler: Arc::new(handler),
        });
        tracing::debug!("{} registered", id);
        id
    }

    /// Returns false when `id` was not registered.
    pub fn remove(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        let removed = listeners.len() != before;
        if removed {
            tracing::debug!("{} removed", id);
        }
        removed
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Receiver for async consumers; sees events published after this call.
    pub fn receiver(&self) -> broadcast::Receiver<AppEvent> {
        self.sender.subscribe()
    }

    /// Most recent notifications, oldest first.
    pub fn recent_notifications(&self) -> Vec<Notification> {
        self.backlog.lock().iter().cloned().collect()
    }
}

impl NotificationSink for EventBus {
    fn notify(&self, notification: Notification) {
        if notification.success {
            tracing::info!("{}: {}", notification.title, notification.message);
        } else {
            tracing::warn!("{}: {}", notification.title, notification.message);
        }
        self.publish(AppEvent::Notification(notification));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listener_count())
            .field("backlog", &self.backlog.lock().len())
            .finish()
    }
}

static EVENT_BUS: OnceLock<EventBus> = OnceLock::new();

/// The process-wide bus, created on first use.
pub fn event_bus() -> &'static EventBus {
    EVENT_BUS.get_or_init(EventBus::new)
}

/// Publishes an event on the process-wide bus.
#[macro_export]
macro_rules! emit {
    ($event:expr) => {
        $crate::event_bus::event_bus().publish($event)
    };
}
