//! Undo/redo history over document snapshots.
//!
//! Snapshots are `Arc<Document>`s, so recording one costs a pointer copy;
//! the store's structural sharing keeps the snapshots small.

use chrono::{DateTime, Utc};
use slidekit_core::constants::DEFAULT_HISTORY_CAPACITY;
use std::collections::VecDeque;
use std::sync::Arc;

use crate::model::Document;
use crate::store::DocumentStore;

/// A saved document state with the label of the action that followed it.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub label: String,
    pub document: Arc<Document>,
    pub taken_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn new(label: impl Into<String>, document: Arc<Document>) -> Self {
        Self {
            label: label.into(),
            document,
            taken_at: Utc::now(),
        }
    }
}

/// Bounded undo stack plus redo stack.
#[derive(Debug)]
pub struct HistoryStore {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: Vec<Snapshot>,
    capacity: usize,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_HISTORY_CAPACITY)
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records the store's current document and clears the redo stack.
    pub fn record_snapshot(&mut self, label: impl Into<String>, store: &DocumentStore) {
        self.push(Snapshot::new(label, Arc::clone(store.document())));
    }

    /// Pushes an already captured snapshot and clears the redo stack.
    pub fn push(&mut self, snapshot: Snapshot) {
        tracing::trace!("History: recorded '{}'", snapshot.label);
        self.undo_stack.push_back(snapshot);
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
        self.redo_stack.clear();
    }

    /// Restores the most recent snapshot. Returns false when there is nothing to undo.
    pub fn undo(&mut self, store: &mut DocumentStore) -> bool {
        let Some(snapshot) = self.undo_stack.pop_back() else {
            return false;
        };
        tracing::debug!("Undo '{}'", snapshot.label);
        self.redo_stack.push(Snapshot::new(
            snapshot.label.clone(),
            Arc::clone(store.document()),
        ));
        store.restore(snapshot.document);
        true
    }

    /// Re-applies the most recently undone state. Returns false when there is nothing to redo.
    pub fn redo(&mut self, store: &mut DocumentStore) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        tracing::debug!("Redo '{}'", snapshot.label);
        self.undo_stack.push_back(Snapshot::new(
            snapshot.label.clone(),
            Arc::clone(store.document()),
        ));
        while self.undo_stack.len() > self.capacity {
            self.undo_stack.pop_front();
        }
        store.restore(snapshot.document);
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_label(&self) -> Option<&str> {
        self.undo_stack.back().map(|s| s.label.as_str())
    }

    pub fn redo_label(&self) -> Option<&str> {
        self.redo_stack.last().map(|s| s.label.as_str())
    }

    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for HistoryStore {
    fn default() -> Self {
        Self::new()
    }
}
