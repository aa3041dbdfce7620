use slidekit_document::{
    Bounds, Color, DocumentStore, Editor, Element, ShapeContent, ShapeType, SlidePatch,
};
use slidekit_render::{
    EditorCanvas, MemoryImageLoader, NotesPanel, SurfaceConfig, ThumbnailStrip,
};
use std::sync::Arc;

fn red_square() -> Element {
    Element::shape(
        Bounds::new(0.0, 0.0, 480.0, 540.0),
        ShapeContent::filled(ShapeType::Rectangle, Color::rgb(255, 0, 0)),
    )
}

#[test]
fn test_views_stay_consistent_through_undo() {
    let mut editor = Editor::with_history_capacity(10);
    let pid = editor.apply("Create", |s| s.create_presentation("Deck"));
    let sid = editor.store().current_slide().expect("slide").id;

    let strip = ThumbnailStrip::attach(editor.store(), pid, 0.1).expect("strip");
    let notes = NotesPanel::attach(editor.store(), 0.1).expect("notes");
    let canvas =
        EditorCanvas::attach(editor.store(), SurfaceConfig::new(960.0, 540.0, 1.0)).expect("canvas");

    editor.apply("Add square", |s| s.add_element(pid, sid, red_square()));
    editor.apply("Notes", |s| s.update_slide(pid, sid, SlidePatch::notes("Intro")));
    assert_eq!(notes.notes(), "Intro");
    let thumb = strip.thumbnail(sid).expect("thumbnail");
    assert_eq!(thumb.image.get_pixel(10, 10).0, [255, 0, 0, 255]);

    assert!(editor.undo());
    assert!(editor.undo());
    assert_eq!(notes.notes(), "");
    let thumb = strip.thumbnail(sid).expect("thumbnail");
    assert_eq!(thumb.image.get_pixel(10, 10).0, [255, 255, 255, 255]);
    assert_eq!(canvas.hit_test(slidekit_document::Point::new(480.0, 270.0)), None);

    assert!(editor.redo());
    let thumb = strip.thumbnail(sid).expect("thumbnail");
    assert_eq!(thumb.image.get_pixel(10, 10).0, [255, 0, 0, 255]);
}

#[test]
fn test_consumers_release_subscriptions_on_drop() {
    let mut store = DocumentStore::new();
    let pid = store.create_presentation("Deck");
    let sid = store.current_slide().expect("slide").id;
    {
        let _strip = ThumbnailStrip::attach(&store, pid, 0.1).expect("strip");
        let _notes = NotesPanel::attach(&store, 0.1).expect("notes");
    }
    // Nothing is listening any more; edits still commit.
    assert!(store.update_slide(pid, sid, SlidePatch::notes("x")));
}

#[tokio::test]
async fn test_thumbnail_preload_repaints_image_slides() {
    let loader = MemoryImageLoader::new().with_image("logo.png", super::png(2, 2, [0, 200, 0, 255]));
    let mut store = DocumentStore::new();
    let pid = store.create_presentation("Deck");
    let sid = store.current_slide().expect("slide").id;
    let plain = store.add_slide(pid, None).expect("slide");
    store.add_element(
        pid,
        sid,
        Element::image(Bounds::new(0.0, 0.0, 960.0, 540.0), "logo.png"),
    );

    let strip = ThumbnailStrip::attach_with_loader(&store, pid, 0.1, Arc::new(loader))
        .expect("strip");
    assert_eq!(strip.render_count(), 2);
    assert_eq!(strip.thumbnail(sid).expect("thumb").image.get_pixel(48, 27).0, [255, 255, 255, 255]);

    let report = strip.preload().await;
    assert_eq!(report.loaded, 1);
    assert_eq!(strip.render_count(), 3);
    assert_eq!(strip.thumbnail(sid).expect("thumb").image.get_pixel(48, 27).0, [0, 200, 0, 255]);
    assert!(strip.thumbnail(plain).is_some());

    let again = strip.preload().await;
    assert_eq!(again.cached, 1);
    assert_eq!(strip.render_count(), 3);
}

#[tokio::test]
async fn test_canvas_preload_with_broken_source() {
    let mut store = DocumentStore::new();
    let pid = store.create_presentation("Deck");
    let sid = store.current_slide().expect("slide").id;
    store.add_element(pid, sid, Element::image(Bounds::new(0.0, 0.0, 10.0, 10.0), "gone.png"));
    store.add_element(pid, sid, red_square());

    let canvas = EditorCanvas::attach_with_loader(
        &store,
        SurfaceConfig::new(960.0, 540.0, 1.0),
        Arc::new(MemoryImageLoader::new()),
    )
    .expect("canvas");
    let report = canvas.preload().await;
    assert_eq!(report.failed.len(), 1);
    assert!(canvas.last_failure().is_none());
    assert!(canvas.frame().is_some());
}
