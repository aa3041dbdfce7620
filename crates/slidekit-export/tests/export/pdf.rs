use lopdf::{Document, Object};
use slidekit_core::{Notification, NotificationSink};
use slidekit_document::{Bounds, Color, Element, Presentation, ShapeContent, ShapeType, Slide};
use slidekit_export::{
    mm_to_pt, CompressionHint, ExportError, ExportOptions, ExportQuality, PageLayout,
    PdfExporter,
};
use slidekit_render::MemoryImageLoader;
use std::io::Cursor;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct RecordingSink(Mutex<Vec<Notification>>);

impl NotificationSink for RecordingSink {
    fn notify(&self, notification: Notification) {
        self.0.lock().expect("lock").push(notification);
    }
}

fn chart_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([0, 160, 80, 255]));
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png).expect("encode png");
    buf.into_inner()
}

fn loader() -> Arc<MemoryImageLoader> {
    Arc::new(MemoryImageLoader::new().with_image("chart.png", chart_png()))
}

fn slide(n: usize, image: &str) -> Slide {
    Slide::new()
        .with_notes(format!("Talking points for slide {}", n))
        .with_element(Element::shape(
            Bounds::new(100.0, 100.0, 300.0, 200.0),
            ShapeContent::filled(ShapeType::Ellipse, Color::rgb(40, 90, 200)),
        ))
        .with_element(Element::image(Bounds::new(500.0, 100.0, 200.0, 200.0), image))
}

fn deck(slides: usize) -> Presentation {
    (1..=slides).fold(Presentation::empty("Quarterly Review"), |p, n| {
        p.with_slide(slide(n, "chart.png"))
    })
}

fn number(o: &Object) -> f64 {
    match o {
        Object::Integer(i) => *i as f64,
        Object::Real(r) => *r as f64,
        other => panic!("not a number: {:?}", other),
    }
}

fn media_box(doc: &Document, page: lopdf::ObjectId) -> (f64, f64) {
    let dict = doc
        .get_object(page)
        .and_then(Object::as_dict)
        .expect("page dictionary");
    let mb = dict
        .get(b"MediaBox")
        .and_then(Object::as_array)
        .expect("media box");
    (number(&mb[2]) - number(&mb[0]), number(&mb[3]) - number(&mb[1]))
}

#[tokio::test]
async fn test_three_slides_low_landscape() {
    let sink = Arc::new(RecordingSink::default());
    let options = ExportOptions::new(ExportQuality::Low, PageLayout::Landscape);
    let exporter = PdfExporter::with_loader(options, loader())
        .with_notifications(sink.clone());

    let mut progress = Vec::new();
    let pdf = exporter
        .export(&deck(3), |p| progress.push(p))
        .await
        .expect("export");

    assert_eq!(pdf.page_count, 3);
    assert_eq!(pdf.file_name, "quarterly_review_presentation.pdf");
    assert_eq!(progress.len(), 3);
    assert!(progress.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(progress.last().copied(), Some(100.0));

    let doc = Document::load_mem(&pdf.bytes).expect("valid pdf");
    let pages = doc.get_pages();
    assert_eq!(pages.len(), 3);
    for (_, page) in pages {
        let (w, h) = media_box(&doc, page);
        assert!((w - mm_to_pt(297.0)).abs() < 0.01, "width {}", w);
        assert!((h - mm_to_pt(210.0)).abs() < 0.01, "height {}", h);
    }

    let sent = sink.0.lock().expect("lock");
    assert_eq!(sent.len(), 1);
    assert!(sent[0].success);
}

#[tokio::test]
async fn test_portrait_with_notes_embeds_jpeg_at_quality_scale() {
    let options = ExportOptions::new(ExportQuality::Low, PageLayout::Portrait)
        .with_notes(true)
        .with_compression(CompressionHint::None);
    let exporter = PdfExporter::with_loader(options, loader());
    let pdf = exporter.export(&deck(1), |_| {}).await.expect("export");

    let doc = Document::load_mem(&pdf.bytes).expect("valid pdf");
    let (_, page) = doc.get_pages().into_iter().next().expect("page");
    let (w, h) = media_box(&doc, page);
    assert!(h > w);

    let image = doc
        .objects
        .values()
        .find_map(|o| match o {
            Object::Stream(s)
                if s.dict.get(b"Subtype").and_then(Object::as_name).ok() == Some(&b"Image"[..]) =>
            {
                Some(s.content.clone())
            }
            _ => None,
        })
        .expect("image stream");
    let decoded = image::load_from_memory(&image).expect("jpeg").to_rgb8();
    assert_eq!((decoded.width(), decoded.height()), (960, 540));
    // The preloaded chart is painted, not left blank.
    let [r, g, b] = decoded.get_pixel(600, 200).0;
    assert!(r < 60 && g > 120 && b < 120, "chart pixel {:?}", [r, g, b]);

    let content = doc.get_page_content(page).expect("content");
    let text = String::from_utf8_lossy(&content);
    assert!(text.contains("Talking points for slide 1"));
}

#[tokio::test]
async fn test_empty_presentation_fails_whole_export() {
    let sink = Arc::new(RecordingSink::default());
    let exporter = PdfExporter::with_loader(ExportOptions::default(), loader())
        .with_notifications(sink.clone());
    let mut calls = 0;
    let result = exporter
        .export(&Presentation::empty("Nothing"), |_| calls += 1)
        .await;

    assert!(matches!(result, Err(ExportError::EmptyPresentation(_))));
    assert_eq!(calls, 0);
    let sent = sink.0.lock().expect("lock");
    assert!(!sent[0].success);
}

#[tokio::test]
async fn test_unloadable_image_fails_whole_export() {
    let sink = Arc::new(RecordingSink::default());
    let exporter = PdfExporter::with_loader(ExportOptions::default(), loader())
        .with_notifications(sink.clone());
    let presentation = Presentation::empty("Broken")
        .with_slide(slide(1, "chart.png"))
        .with_slide(slide(2, "gone.png"))
        .with_slide(slide(3, "chart.png"));

    let mut progress = Vec::new();
    let result = exporter.export(&presentation, |p| progress.push(p)).await;

    match result {
        Err(ExportError::Image { slide, image, .. }) => {
            assert_eq!(slide, 2);
            assert_eq!(image, "gone.png");
        }
        other => panic!("expected image failure, got {:?}", other.map(|pdf| pdf.page_count)),
    }
    assert_eq!(progress.len(), 1);
    let sent = sink.0.lock().expect("lock");
    assert_eq!(sent.len(), 1);
    assert!(!sent[0].success);
    assert!(sent[0].message.contains("gone.png"));
}

#[tokio::test]
async fn test_write_to_dir() {
    let dir = tempfile::tempdir().expect("tempdir");
    let exporter = PdfExporter::with_loader(
        ExportOptions::new(ExportQuality::Low, PageLayout::Landscape),
        loader(),
    );
    let pdf = exporter.export(&deck(1), |_| {}).await.expect("export");
    let path = pdf.write_to_dir(&dir.path().join("out")).await.expect("write");
    assert!(path.ends_with("quarterly_review_presentation.pdf"));
    assert_eq!(std::fs::read(path).expect("read").len(), pdf.bytes.len());
}
