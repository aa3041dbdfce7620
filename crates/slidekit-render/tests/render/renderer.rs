use slidekit_document::{
    Background, Bounds, Color, Element, ShapeContent, ShapeType, Slide, Stroke,
};
use slidekit_render::{
    MemoryImageLoader, RenderError, RenderOptions, SlideRenderer, SurfaceConfig, ViewportState,
};
use std::sync::Arc;

fn busy_slide() -> Slide {
    let ellipse = Element::shape(
        Bounds::new(300.0, 120.0, 200.0, 120.0),
        ShapeContent {
            shape_type: ShapeType::Ellipse,
            fill: Some(Color::rgba(0, 128, 255, 180)),
            stroke: Some(Stroke {
                color: Color::BLACK,
                width: 3.0,
            }),
        },
    )
    .with_rotation(30.0);
    let mut slide = Slide::new()
        .with_element(Element::shape(
            Bounds::new(10.0, 10.0, 100.0, 100.0),
            ShapeContent::filled(ShapeType::Rectangle, Color::rgb(200, 0, 0)),
        ))
        .with_element(ellipse)
        .with_element(Element::shape(
            Bounds::new(600.0, 300.0, 150.0, 40.0),
            ShapeContent::outlined(ShapeType::Arrow, Color::rgb(20, 20, 20), 4.0),
        ));
    slide.background = Background::LinearGradient {
        from: Color::WHITE,
        to: Color::rgb(220, 230, 255),
        angle: 45.0,
    };
    slide
}

#[test]
fn test_repeated_render_is_pixel_identical() {
    let slide = busy_slide();
    let vp = ViewportState::new(1.3, 12.0, -7.0);
    let ids = slide.elements.iter().map(|e| e.id);
    let options = RenderOptions::editing(ids).with_grid(true);

    let mut renderer = SlideRenderer::new(SurfaceConfig::new(640.0, 400.0, 2.0)).expect("renderer");
    renderer.render(&slide, &vp, &options).expect("render");
    let first = renderer.to_rgba_image();
    renderer.render(&slide, &vp, &options).expect("render");
    assert_eq!(first, renderer.to_rgba_image());

    let mut other = SlideRenderer::new(SurfaceConfig::new(640.0, 400.0, 2.0)).expect("renderer");
    other.render(&slide, &vp, &options).expect("render");
    assert_eq!(first, other.to_rgba_image());
}

#[test]
fn test_device_pixel_ratio_scales_output() {
    let slide = busy_slide();
    let mut r1 = SlideRenderer::new(SurfaceConfig::slide(1.0)).expect("renderer");
    let mut r2 = SlideRenderer::new(SurfaceConfig::slide(2.0)).expect("renderer");
    let opts = RenderOptions::default();
    r1.render(&slide, &ViewportState::identity(), &opts).expect("render");
    r2.render(&slide, &ViewportState::identity(), &opts).expect("render");

    assert_eq!((r2.pixel_width(), r2.pixel_height()), (1920, 1080));
    let a = r1.to_rgba_image();
    let b = r2.to_rgba_image();
    assert_eq!(a.get_pixel(60, 60), b.get_pixel(120, 120));
    assert_eq!(b.get_pixel(120, 120).0, [200, 0, 0, 255]);
}

#[test]
fn test_invalid_surfaces_are_rejected() {
    for surface in [
        SurfaceConfig::new(0.0, 100.0, 1.0),
        SurfaceConfig::new(100.0, f64::NAN, 1.0),
        SurfaceConfig::new(100.0, 100.0, 0.0),
        SurfaceConfig::new(20000.0, 100.0, 1.0),
    ] {
        assert!(matches!(
            SlideRenderer::new(surface),
            Err(RenderError::InvalidSurface { .. })
        ));
    }
}

#[tokio::test]
async fn test_broken_image_does_not_abort_slide() {
    let loader = MemoryImageLoader::new()
        .with_image("blue.png", super::png(4, 4, [0, 0, 255, 255]))
        .with_image("broken.png", b"definitely not a png".to_vec());
    let slide = Slide::new()
        .with_element(Element::shape(
            Bounds::new(10.0, 10.0, 100.0, 100.0),
            ShapeContent::filled(ShapeType::Rectangle, Color::rgb(200, 0, 0)),
        ))
        .with_element(Element::image(Bounds::new(200.0, 10.0, 100.0, 100.0), "broken.png"))
        .with_element(Element::image(Bounds::new(400.0, 10.0, 100.0, 100.0), "missing.png"))
        .with_element(Element::image(Bounds::new(600.0, 10.0, 100.0, 100.0), "blue.png"));

    let mut renderer =
        SlideRenderer::with_loader(SurfaceConfig::slide(1.0), Arc::new(loader)).expect("renderer");
    let report = renderer.preload_images(&slide).await;
    assert_eq!(report.requested, 3);
    assert_eq!(report.loaded, 1);
    assert_eq!(report.failed.len(), 2);
    assert!(!report.is_complete());

    renderer
        .render(&slide, &ViewportState::identity(), &RenderOptions::default())
        .expect("render");
    let img = renderer.to_rgba_image();
    assert_eq!(img.get_pixel(60, 60).0, [200, 0, 0, 255]);
    let blue = img.get_pixel(650, 60).0;
    assert!(blue[2] > 240 && blue[0] < 10, "image pixel was {:?}", blue);

    // Failures are remembered rather than retried.
    let again = renderer.preload_images(&slide).await;
    assert_eq!(again.cached, 3);
    assert_eq!(again.loaded, 0);
    assert!(again.is_complete());

    renderer.clear_image_cache();
    assert!(renderer.images().is_empty());
}

#[test]
fn test_render_before_preload_skips_images() {
    let slide = Slide::new().with_element(Element::image(
        Bounds::new(0.0, 0.0, 960.0, 540.0),
        "later.png",
    ));
    let mut renderer = SlideRenderer::new(SurfaceConfig::slide(0.5)).expect("renderer");
    renderer
        .render(&slide, &ViewportState::identity(), &RenderOptions::default())
        .expect("render");
    assert_eq!(renderer.to_rgba_image().get_pixel(100, 100).0, [255, 255, 255, 255]);
}

#[test]
fn test_png_and_jpeg_encoding() {
    let mut renderer = SlideRenderer::new(SurfaceConfig::slide(0.25)).expect("renderer");
    renderer
        .render(&busy_slide(), &ViewportState::identity(), &RenderOptions::default())
        .expect("render");
    let png = renderer.encode_png().expect("png");
    assert_eq!(&png[..4], b"\x89PNG");
    let jpeg = renderer.encode_jpeg(80).expect("jpeg");
    assert_eq!(&jpeg[..2], [0xFF, 0xD8]);
    let decoded = image::load_from_memory(&jpeg).expect("decode");
    assert_eq!((decoded.width(), decoded.height()), (240, 135));
}
