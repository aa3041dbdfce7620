use proptest::prelude::*;
use slidekit_document::{
    Bounds, DocumentStore, Editor, Element, HistoryStore, SlidePatch,
};
use std::sync::Arc;

#[test]
fn test_undo_redo_round_trip_is_exact() {
    let mut store = DocumentStore::new();
    let pid = store.create_presentation("Deck");
    let sid = store.presentation(pid).expect("p").slides[0].id;
    let mut history = HistoryStore::new();

    history.record_snapshot("Add text", &store);
    store.add_element(pid, sid, Element::text(Bounds::new(10.0, 10.0, 200.0, 40.0), "Hello"));

    let before_undo = Arc::clone(store.document());
    assert!(history.undo(&mut store));
    assert!(history.redo(&mut store));
    assert!(Arc::ptr_eq(&before_undo, store.document()));
}

#[test]
fn test_editor_skips_history_for_selection() {
    let mut editor = Editor::default();
    let pid = editor.apply("New", |s| s.create_presentation("Deck"));
    let sid = editor.store().presentation(pid).expect("p").slides[0].id;
    let depth = editor.history().undo_len();

    editor.apply("Select", |s| s.select_slide(pid, sid));
    editor.store_mut().clear_selection();
    assert_eq!(editor.history().undo_len(), depth);
}

#[test]
fn test_undo_restores_removed_selection_target() {
    let mut editor = Editor::default();
    let pid = editor.apply("New", |s| s.create_presentation("Deck"));
    let sid = editor.store().presentation(pid).expect("p").slides[0].id;

    editor.apply("Delete slide", |s| s.delete_slide(pid, sid));
    assert!(editor.store().current_slide().is_none());

    editor.undo();
    assert!(editor.store().slide(pid, sid).is_some());
}

proptest! {
    #[test]
    fn prop_n_actions_then_n_undos_restore_original(n in 1usize..20, capacity in 1usize..25) {
        let mut store = DocumentStore::new();
        let pid = store.create_presentation("Deck");
        let sid = store.presentation(pid).expect("p").slides[0].id;
        let mut history = HistoryStore::with_capacity(capacity);

        let mut states = vec![Arc::clone(store.document())];
        for i in 0..n {
            history.record_snapshot(format!("edit {i}"), &store);
            store.update_slide(pid, sid, SlidePatch::notes(format!("note {i}")));
            states.push(Arc::clone(store.document()));
        }

        let undos = n.min(capacity);
        for _ in 0..undos {
            prop_assert!(history.undo(&mut store));
        }
        prop_assert!(!history.can_undo());
        prop_assert!(Arc::ptr_eq(&states[n - undos], store.document()));

        for _ in 0..undos {
            prop_assert!(history.redo(&mut store));
        }
        prop_assert!(Arc::ptr_eq(&states[n], store.document()));
    }
}
