use slidekit_core::{Notification, NotificationSink};
use slidekit_document::{
    Bounds, DirectoryStore, Element, KeyValueStore, MemoryStore, Presentation,
    PresentationRepository, Slide,
};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

#[derive(Default)]
struct RecordingSink {
    seen: Mutex<Vec<Notification>>,
}

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.seen.lock().expect("lock").push(notification);
    }
}

fn sample() -> Presentation {
    Presentation::new("Quarterly Review").with_slide(
        Slide::new()
            .with_notes("Mention the numbers")
            .with_element(Element::text(Bounds::new(40.0, 40.0, 400.0, 60.0), "Q3").with_rotation(15.0)),
    )
}

#[test]
fn test_memory_round_trip() {
    let mut repo = PresentationRepository::new(MemoryStore::new());
    let original = sample();
    assert!(repo.save("q3", &original).success);

    let loaded = repo.load("q3");
    assert!(loaded.success);
    assert_eq!(loaded.data.as_ref(), Some(&original));
    assert_eq!(repo.list().data, Some(vec!["q3".to_string()]));
}

#[test]
fn test_load_missing_reports_error() {
    let sink = Arc::new(RecordingSink::default());
    let repo = PresentationRepository::new(MemoryStore::new()).with_notifications(sink.clone());
    let result = repo.load("nope");
    assert!(!result.success);
    assert!(result.data.is_none());
    assert!(result.error.expect("error").contains("nope"));

    let seen = sink.seen.lock().expect("lock");
    assert_eq!(seen.len(), 1);
    assert!(!seen[0].success);
}

#[test]
fn test_invalid_key_is_not_saved() {
    let mut repo = PresentationRepository::new(MemoryStore::new());
    let result = repo.save("../escape", &sample());
    assert!(!result.success);
    assert!(repo.store().is_empty());
}

#[test]
fn test_corrupt_blob_reports_error() {
    let mut store = MemoryStore::new();
    store.set("broken", "{ not json").expect("set");
    let repo = PresentationRepository::new(store);
    assert!(!repo.load("broken").success);
}

#[test]
fn test_directory_store_round_trip() {
    let dir = TempDir::new().expect("tempdir");
    let store = DirectoryStore::open(dir.path().join("decks")).expect("open");
    let mut repo = PresentationRepository::new(store);

    let original = sample();
    assert!(repo.save("review", &original).success);
    assert!(dir.path().join("decks").join("review.json").exists());

    let loaded = repo.load("review").data.expect("loaded");
    assert_eq!(loaded, original);

    assert_eq!(repo.delete("review").data, Some(true));
    assert_eq!(repo.delete("review").data, Some(false));
    assert_eq!(repo.list().data, Some(Vec::new()));
}
