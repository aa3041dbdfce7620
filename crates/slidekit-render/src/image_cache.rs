//! Decoded-image cache keyed by source string.

use std::collections::HashMap;
use std::sync::Arc;
use tiny_skia::Pixmap;

/// Cache entry for one image source.
#[derive(Debug, Clone)]
pub enum CachedImage {
    Ready(Arc<Pixmap>),
    /// Loading or decoding failed; the error is kept so the source is not
    /// retried on every preload.
    Failed(String),
}

#[derive(Debug, Default)]
pub struct ImageCache {
    entries: HashMap<String, CachedImage>,
}

impl ImageCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decoded image for `source`, if it loaded successfully.
    pub fn get(&self, source: &str) -> Option<&Arc<Pixmap>> {
        match self.entries.get(source) {
            Some(CachedImage::Ready(pixmap)) => Some(pixmap),
            _ => None,
        }
    }

    pub fn failure(&self, source: &str) -> Option<&str> {
        match self.entries.get(source) {
            Some(CachedImage::Failed(reason)) => Some(reason),
            _ => None,
        }
    }

    /// True when `source` has been attempted, successfully or not.
    pub fn contains(&self, source: &str) -> bool {
        self.entries.contains_key(source)
    }

    pub fn insert_ready(&mut self, source: impl Into<String>, pixmap: Pixmap) {
        self.entries
            .insert(source.into(), CachedImage::Ready(Arc::new(pixmap)));
    }

    pub fn insert_failed(&mut self, source: impl Into<String>, reason: impl Into<String>) {
        self.entries
            .insert(source.into(), CachedImage::Failed(reason.into()));
    }

    /// Forgets a failure so the next preload tries again.
    pub fn forget(&mut self, source: &str) -> bool {
        self.entries.remove(source).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ready_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e, CachedImage::Ready(_)))
            .count()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
