use proptest::prelude::*;
use slidekit_document::{Bounds, Point, Size};
use slidekit_render::{to_screen, to_screen_rect, to_slide, ViewTransform, ViewportState};

fn close(a: f64, b: f64, scale: f64) -> bool {
    (a - b).abs() <= 1e-9 * scale.max(1.0)
}

proptest! {
    #[test]
    fn prop_to_slide_inverts_to_screen(
        zoom in 0.1f64..10.0,
        pan_x in -2000.0f64..2000.0,
        pan_y in -2000.0f64..2000.0,
        width in 50.0f64..4000.0,
        height in 50.0f64..4000.0,
        x in -1000.0f64..2000.0,
        y in -1000.0f64..2000.0,
    ) {
        let vp = ViewportState::new(zoom, pan_x, pan_y);
        let dims = Size::new(width, height);
        let p = Point::new(x, y);
        let back = to_slide(to_screen(p, &vp, dims), &vp, dims);
        let scale = (x.abs() + y.abs() + pan_x.abs() + pan_y.abs() + width + height) * 10.0;
        prop_assert!(close(back.x, x, scale), "x: {} vs {}", back.x, x);
        prop_assert!(close(back.y, y, scale), "y: {} vs {}", back.y, y);
    }

    #[test]
    fn prop_view_transform_matches_to_screen(
        zoom in 0.1f64..10.0,
        pan_x in -500.0f64..500.0,
        pan_y in -500.0f64..500.0,
        dpr in 0.5f64..4.0,
        x in 0.0f64..960.0,
        y in 0.0f64..540.0,
    ) {
        let vp = ViewportState::new(zoom, pan_x, pan_y);
        let dims = Size::new(800.0, 600.0);
        let screen = to_screen(Point::new(x, y), &vp, dims);
        let device = ViewTransform::new(&vp, dims, dpr).apply(Point::new(x, y));
        let scale = (screen.x.abs() + screen.y.abs() + 1000.0) * dpr * 10.0;
        prop_assert!(close(device.x, screen.x * dpr, scale));
        prop_assert!(close(device.y, screen.y * dpr, scale));
    }
}

#[test]
fn test_centre_is_fixed_under_zoom() {
    let dims = Size::new(960.0, 540.0);
    let centre = Point::new(480.0, 270.0);
    for zoom in [0.1, 0.5, 1.0, 3.0, 10.0] {
        let vp = ViewportState::new(zoom, 0.0, 0.0);
        assert_eq!(to_screen(centre, &vp, dims), centre);
    }
}

#[test]
fn test_zoom_at_keeps_anchor() {
    let dims = Size::new(1200.0, 800.0);
    let mut vp = ViewportState::fit_to_view(dims);
    let cursor = Point::new(300.0, 200.0);
    let under = to_slide(cursor, &vp, dims);
    vp.zoom_at(cursor, 4.0, dims);
    let after = to_screen(under, &vp, dims);
    assert!((after.x - cursor.x).abs() < 1e-9);
    assert!((after.y - cursor.y).abs() < 1e-9);
}

#[test]
fn test_fit_to_view_centres_slide() {
    let dims = Size::new(1000.0, 1000.0);
    let vp = ViewportState::fit_to_view(dims);
    let rect = to_screen_rect(Bounds::new(0.0, 0.0, 960.0, 540.0), &vp, dims);
    assert!((rect.x + rect.width / 2.0 - 500.0).abs() < 1e-9);
    assert!((rect.y + rect.height / 2.0 - 500.0).abs() < 1e-9);
    assert!((rect.width - 900.0).abs() < 1e-9);
}
