use proptest::prelude::*;
use slidekit_document::{
    Bounds, Color, DocumentStore, Element, ElementId, ElementPatch, PresentationId,
    ShapeContent, ShapeType, SlideId, SlidePatch, ZOrder,
};
use std::sync::Arc;

fn store_with_deck() -> (DocumentStore, PresentationId, SlideId) {
    let mut store = DocumentStore::new();
    let pid = store.create_presentation("Deck");
    let sid = store.presentation(pid).expect("presentation").slides[0].id;
    (store, pid, sid)
}

fn square(x: f64) -> Element {
    Element::shape(
        Bounds::new(x, x, 20.0, 20.0),
        ShapeContent::filled(ShapeType::Rectangle, Color::rgb(10, 20, 30)),
    )
}

#[test]
fn test_update_slide_unknown_id_is_reference_equal() {
    let (mut store, pid, _) = store_with_deck();
    let before = Arc::clone(store.document());
    let changed = store.update_slide(pid, SlideId::new(), SlidePatch::notes("ignored"));
    assert!(!changed);
    assert!(Arc::ptr_eq(&before, store.document()));
}

#[test]
fn test_update_element_patch_and_noop() {
    let (mut store, pid, sid) = store_with_deck();
    let eid = store.add_element(pid, sid, square(0.0)).expect("element");

    assert!(store.update_element(pid, sid, eid, ElementPatch::default().position(40.0, 50.0)));
    let e = store.element(pid, sid, eid).expect("element");
    assert_eq!((e.position.x, e.position.y), (40.0, 50.0));

    let doc = Arc::clone(store.document());
    assert!(!store.update_element(pid, sid, eid, ElementPatch::default().position(40.0, 50.0)));
    assert!(Arc::ptr_eq(&doc, store.document()));
}

#[test]
fn test_update_element_with_cannot_change_id() {
    let (mut store, pid, sid) = store_with_deck();
    let eid = store.add_element(pid, sid, square(0.0)).expect("element");
    store.update_element_with(pid, sid, eid, |e| {
        e.id = ElementId::new();
        e.size.width = 99.0;
    });
    let e = store.element(pid, sid, eid).expect("same id");
    assert_eq!(e.size.width, 99.0);
}

#[test]
fn test_untouched_slides_are_shared() {
    let (mut store, pid, first) = store_with_deck();
    let second = store.add_slide(pid, None).expect("second");
    let third = store.add_slide(pid, Some(1)).expect("third");

    let ids: Vec<_> = store.presentation(pid).expect("p").slides.iter().map(|s| s.id).collect();
    assert_eq!(ids, vec![first, third, second]);

    let shared = Arc::clone(store.slide(pid, second).expect("second"));
    store.add_element(pid, first, square(1.0));
    assert!(Arc::ptr_eq(&shared, store.slide(pid, second).expect("second")));
}

#[test]
fn test_delete_presentation_clears_selection() {
    let (mut store, pid, _) = store_with_deck();
    assert!(store.delete_presentation(pid));
    assert!(store.current_presentation().is_none());
    assert_eq!(store.selection().slide_id, None);
    assert!(!store.delete_presentation(pid));
}

#[test]
fn test_revision_is_monotonic() {
    let (mut store, pid, sid) = store_with_deck();
    let r0 = store.revision();
    store.update_slide(pid, sid, SlidePatch::notes("a"));
    let r1 = store.revision();
    store.update_slide(pid, sid, SlidePatch::notes("a"));
    assert_eq!(store.revision(), r1);
    assert!(r1 > r0);
}

#[derive(Debug, Clone)]
enum Op {
    Add(f64),
    Move(usize, f64),
    Delete(usize),
    Reorder(usize, u8),
    Notes(String),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0.0..900.0f64).prop_map(Op::Add),
        (0usize..8, 0.0..900.0f64).prop_map(|(i, x)| Op::Move(i, x)),
        (0usize..8).prop_map(Op::Delete),
        (0usize..8, 0u8..4).prop_map(|(i, o)| Op::Reorder(i, o)),
        "[a-z ]{0,12}".prop_map(Op::Notes),
    ]
}

fn apply(store: &mut DocumentStore, pid: PresentationId, sid: SlideId, op: &Op) {
    let ids: Vec<ElementId> = store
        .slide(pid, sid)
        .map(|s| s.elements.iter().map(|e| e.id).collect())
        .unwrap_or_default();
    let pick = |i: usize| ids.get(i).copied().unwrap_or_else(ElementId::new);
    match op {
        Op::Add(x) => {
            store.add_element(pid, sid, square(*x));
        }
        Op::Move(i, x) => {
            store.update_element(pid, sid, pick(*i), ElementPatch::default().position(*x, *x));
        }
        Op::Delete(i) => {
            store.delete_element(pid, sid, pick(*i));
        }
        Op::Reorder(i, o) => {
            let order = match o {
                0 => ZOrder::Front,
                1 => ZOrder::Back,
                2 => ZOrder::Forward,
                _ => ZOrder::Backward,
            };
            store.reorder_element(pid, sid, pick(*i), order);
        }
        Op::Notes(n) => {
            store.update_slide(pid, sid, SlidePatch::notes(n.clone()));
        }
    }
}

proptest! {
    #[test]
    fn prop_document_changes_iff_value_changes(ops in prop::collection::vec(op_strategy(), 1..30)) {
        let (mut store, pid, sid) = store_with_deck();
        for op in &ops {
            let before = Arc::clone(store.document());
            apply(&mut store, pid, sid, op);
            let after = store.document();
            if Arc::ptr_eq(&before, after) {
                prop_assert_eq!(&*before, &**after);
            } else {
                prop_assert_ne!(&*before, &**after);
            }
        }
    }

    #[test]
    fn prop_element_ids_stay_unique(ops in prop::collection::vec(op_strategy(), 1..30)) {
        let (mut store, pid, sid) = store_with_deck();
        for op in &ops {
            apply(&mut store, pid, sid, op);
        }
        let slide = store.slide(pid, sid).expect("slide");
        let mut ids: Vec<_> = slide.elements.iter().map(|e| e.id).collect();
        let n = ids.len();
        ids.sort();
        ids.dedup();
        prop_assert_eq!(ids.len(), n);
    }
}
