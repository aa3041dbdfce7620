//! Presentation persistence.
//!
//! Presentations are stored as versioned JSON blobs through a
//! [`KeyValueStore`]. The repository never fails loudly: every operation
//! returns an [`OperationResult`] that the UI can surface as a notification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use slidekit_core::{emit, AppEvent, DocumentEvent, Notification, NotificationSink, OperationResult};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{StorageError, StorageResult};
use crate::model::Presentation;

/// Current blob format version
pub const FORMAT_VERSION: u32 = 1;

const FILE_EXTENSION: &str = "json";

/// String key/value storage for serialized presentations.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
    /// Returns whether a value was removed.
    fn remove(&mut self, key: &str) -> StorageResult<bool>;
    /// All keys, sorted.
    fn keys(&self) -> StorageResult<Vec<String>>;
}

/// In-memory store, mainly for tests and scratch sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<bool> {
        Ok(self.entries.remove(key).is_some())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}

/// One `<key>.json` file per entry inside a directory.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    /// Opens (and creates if needed) a storage directory.
    pub fn open(root: impl Into<PathBuf>) -> StorageResult<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        tracing::debug!("Presentation storage at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        validate_key(key)?;
        Ok(self.root.join(format!("{key}.{FILE_EXTENSION}")))
    }
}

impl KeyValueStore for DirectoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        // Write to a sibling temp file first so a crash never leaves half a blob.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<bool> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// Keys are limited to `[A-Za-z0-9_-]` so they are safe as file names.
fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

/// Storage key derived from a presentation name.
pub fn key_for_name(name: &str) -> String {
    let key: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect();
    if key.is_empty() {
        "untitled".to_string()
    } else {
        key
    }
}

/// On-disk blob wrapping a presentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationFile {
    pub format_version: u32,
    pub saved_at: DateTime<Utc>,
    pub presentation: Presentation,
}

impl PresentationFile {
    pub fn new(presentation: Presentation) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            saved_at: Utc::now(),
            presentation,
        }
    }

    pub fn to_json(&self) -> StorageResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> StorageResult<Self> {
        let file: PresentationFile = serde_json::from_str(json)?;
        if file.format_version > FORMAT_VERSION {
            return Err(StorageError::UnsupportedVersion {
                found: file.format_version,
                supported: FORMAT_VERSION,
            });
        }
        Ok(file)
    }
}

/// Saves and loads presentations through a [`KeyValueStore`].
pub struct PresentationRepository<S: KeyValueStore> {
    store: S,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl<S: KeyValueStore> PresentationRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store, sink: None }
    }

    /// Sends a notification for every save/load outcome to `sink`.
    pub fn with_notifications(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn save(&mut self, key: &str, presentation: &Presentation) -> OperationResult<()> {
        let result = PresentationFile::new(presentation.clone())
            .to_json()
            .and_then(|json| self.store.set(key, &json));

        match result {
            Ok(()) => {
                tracing::info!("Saved presentation '{}' as {}", presentation.name, key);
                let _ = emit!(AppEvent::Document(DocumentEvent::Saved {
                    key: key.to_string(),
                    name: presentation.name.clone(),
                }));
                self.notify(Notification::success(
                    "Presentation saved",
                    format!("'{}' was saved.", presentation.name),
                ));
                OperationResult::done()
            }
            Err(e) => {
                tracing::error!("Failed to save {}: {}", key, e);
                self.notify(Notification::failure("Save failed", e.to_string()));
                OperationResult::err(e.to_string())
            }
        }
    }

    pub fn load(&self, key: &str) -> OperationResult<Presentation> {
        let result = self.store.get(key).and_then(|blob| {
            let blob = blob.ok_or_else(|| StorageError::NotFound(key.to_string()))?;
            PresentationFile::from_json(&blob)
        });

        match result {
            Ok(file) => {
                let presentation = file.presentation;
                tracing::info!(
                    "Loaded presentation '{}' ({} slides)",
                    presentation.name,
                    presentation.slide_count()
                );
                let _ = emit!(AppEvent::Document(DocumentEvent::Loaded {
                    key: key.to_string(),
                    slide_count: presentation.slide_count(),
                }));
                OperationResult::ok(presentation)
            }
            Err(e) => {
                tracing::warn!("Failed to load {}: {}", key, e);
                self.notify(Notification::failure("Load failed", e.to_string()));
                OperationResult::err(e.to_string())
            }
        }
    }

    pub fn list(&self) -> OperationResult<Vec<String>> {
        self.store.keys().into()
    }

    pub fn delete(&mut self, key: &str) -> OperationResult<bool> {
        self.store.remove(key).into()
    }

    fn notify(&self, notification: Notification) {
        if let Some(sink) = &self.sink {
            sink.notify(notification);
        }
    }
}

impl<S: KeyValueStore + std::fmt::Debug> std::fmt::Debug for PresentationRepository<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PresentationRepository")
            .field("store", &self.store)
            .field("notifications", &self.sink.is_some())
            .finish()
    }
}
