//! Editing facade pairing a [`DocumentStore`] with its [`HistoryStore`].

use std::sync::Arc;

use crate::history::{HistoryStore, Snapshot};
use crate::store::DocumentStore;

/// Runs labelled edits against the store and records undo history for
/// the ones that actually change the document.
#[derive(Debug, Default)]
pub struct Editor {
    store: DocumentStore,
    history: HistoryStore,
}

impl Editor {
    pub fn new(store: DocumentStore, history: HistoryStore) -> Self {
        Self { store, history }
    }

    pub fn with_history_capacity(capacity: usize) -> Self {
        Self::new(DocumentStore::new(), HistoryStore::with_capacity(capacity))
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Applies `edit` and records an undo step labelled `label` if the
    /// document changed. Selection-only edits leave history alone.
    pub fn apply<R, F>(&mut self, label: &str, edit: F) -> R
    where
        F: FnOnce(&mut DocumentStore) -> R,
    {
        let before = Arc::clone(self.store.document());
        let result = edit(&mut self.store);
        if !Arc::ptr_eq(&before, self.store.document()) {
            self.history.push(Snapshot::new(label, before));
        }
        result
    }

    /// Edits that must never be undone (selection, loading).
    pub fn store_mut(&mut self) -> &mut DocumentStore {
        &mut self.store
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.store)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.store)
    }

    pub fn into_parts(self) -> (DocumentStore, HistoryStore) {
        (self.store, self.history)
    }
}
