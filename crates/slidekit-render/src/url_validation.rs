//! Debounced validation of image URLs typed by the user.
//!
//! Every [`DebouncedValidator::submit`] restarts a timer; only when the
//! input has been quiet for the debounce delay is the URL probed through the
//! [`ImageLoader`] (fetch and decode). A generation counter tags each
//! request so a result that arrives after a newer submission is dropped.

use slidekit_core::constants::DEFAULT_VALIDATION_DEBOUNCE_MS;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::image_loader::{load_pixmap, ImageLoader};

/// Result of probing one URL.
#[derive(Debug, Clone, PartialEq)]
pub enum UrlCheck {
    /// The URL resolved to a decodable image.
    Valid { width: u32, height: u32 },
    Invalid(String),
}

/// What the validator currently knows.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationState {
    Idle,
    /// Waiting for the input to settle, or probing.
    Pending { url: String },
    Checked { url: String, check: UrlCheck },
}

pub struct DebouncedValidator {
    loader: Arc<dyn ImageLoader>,
    delay: Duration,
    generation: Arc<AtomicU64>,
    state: Arc<watch::Sender<ValidationState>>,
    task: Option<JoinHandle<()>>,
}

impl DebouncedValidator {
    pub fn new(loader: Arc<dyn ImageLoader>, delay: Duration) -> Self {
        let (state, _) = watch::channel(ValidationState::Idle);
        Self {
            loader,
            delay,
            generation: Arc::new(AtomicU64::new(0)),
            state: Arc::new(state),
            task: None,
        }
    }

    pub fn with_default_delay(loader: Arc<dyn ImageLoader>) -> Self {
        Self::new(loader, Duration::from_millis(DEFAULT_VALIDATION_DEBOUNCE_MS))
    }

    pub fn subscribe(&self) -> watch::Receiver<ValidationState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> ValidationState {
        self.state.borrow().clone()
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Restarts the debounce timer for `url`. Must be called inside a tokio runtime.
    pub fn submit(&mut self, url: impl Into<String>) {
        let url = url.into().trim().to_string();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.abort_pending();

        if url.is_empty() {
            self.state.send_replace(ValidationState::Idle);
            return;
        }
        self.state
            .send_replace(ValidationState::Pending { url: url.clone() });

        let loader = Arc::clone(&self.loader);
        let current = Arc::clone(&self.generation);
        let state = Arc::clone(&self.state);
        let delay = self.delay;
        self.task = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let check = match load_pixmap(loader.as_ref(), &url).await {
                Ok(pixmap) => UrlCheck::Valid {
                    width: pixmap.width(),
                    height: pixmap.height(),
                },
                Err(e) => UrlCheck::Invalid(e.to_string()),
            };
            if current.load(Ordering::SeqCst) != generation {
                tracing::trace!("Discarding stale validation of {}", url);
                return;
            }
            tracing::debug!("Validated {}: {:?}", url, check);
            state.send_replace(ValidationState::Checked { url, check });
        }));
    }

    /// Drops any pending check and returns to idle.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.abort_pending();
        self.state.send_replace(ValidationState::Idle);
    }

    fn abort_pending(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for DebouncedValidator {
    fn drop(&mut self) {
        self.abort_pending();
    }
}

impl std::fmt::Debug for DebouncedValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DebouncedValidator")
            .field("delay", &self.delay)
            .field("generation", &self.generation())
            .field("state", &*self.state.borrow())
            .finish()
    }
}

/// Waits until `rx` reports a finished check.
pub async fn next_check(rx: &mut watch::Receiver<ValidationState>) -> Option<(String, UrlCheck)> {
    loop {
        if let ValidationState::Checked { url, check } = &*rx.borrow_and_update() {
            return Some((url.clone(), check.clone()));
        }
        rx.changed().await.ok()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_loader::MemoryImageLoader;

    #[tokio::test(start_paused = true)]
    async fn test_empty_input_is_idle() {
        let mut v = DebouncedValidator::new(
            Arc::new(MemoryImageLoader::new()),
            Duration::from_millis(500),
        );
        v.submit("   ");
        assert_eq!(v.state(), ValidationState::Idle);
        v.submit("x.png");
        assert!(matches!(v.state(), ValidationState::Pending { .. }));
        v.cancel();
        assert_eq!(v.state(), ValidationState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_missing_image_is_invalid() {
        let mut v = DebouncedValidator::with_default_delay(Arc::new(MemoryImageLoader::new()));
        let mut rx = v.subscribe();
        v.submit("nowhere.png");
        let (url, check) = next_check(&mut rx).await.expect("check");
        assert_eq!(url, "nowhere.png");
        assert!(matches!(check, UrlCheck::Invalid(_)));
    }
}
