//! Viewport and coordinate transformation between slide space and screen space.
//!
//! Slide space is the fixed 960x540 logical canvas every element lives on.
//! Screen space is the logical pixel grid of a view (before the device pixel
//! ratio is applied). Zoom and pan pivot around the centre of the view:
//!
//! ```text
//! screen = (slide - dims / 2 + pan) * zoom + dims / 2
//! slide  = (screen - dims / 2) / zoom + dims / 2 - pan
//! ```
//!
//! Every view uses these functions; painting uses the equivalent
//! [`ViewTransform`] so that hit testing and drawing always agree.

use slidekit_core::constants::{
    MAX_ZOOM, MIN_ZOOM, SLIDE_HEIGHT, SLIDE_WIDTH, VIEW_PADDING, ZOOM_STEP,
};
use slidekit_document::{Bounds, Point, Size};
use std::fmt;

use crate::error::{RenderError, Result};

/// Zoom and pan of one view. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportState {
    pub zoom: f64,
    pub pan_x: f64,
    pub pan_y: f64,
}

impl ViewportState {
    pub const fn new(zoom: f64, pan_x: f64, pan_y: f64) -> Self {
        Self { zoom, pan_x, pan_y }
    }

    /// Zoom 1, no pan: a 960x540 view shows the slide 1:1.
    pub const fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }

    /// Viewport that centres the slide in `dims` and fits it with padding.
    pub fn fit(dims: Size, padding: f64) -> Self {
        Self {
            zoom: fit_zoom(dims, padding),
            pan_x: dims.width / 2.0 - SLIDE_WIDTH / 2.0,
            pan_y: dims.height / 2.0 - SLIDE_HEIGHT / 2.0,
        }
    }

    /// [`ViewportState::fit`] with the default 5% padding.
    pub fn fit_to_view(dims: Size) -> Self {
        Self::fit(dims, VIEW_PADDING)
    }

    /// Zoom must be positive and every field finite.
    pub fn validate(&self) -> Result<()> {
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return Err(RenderError::InvalidViewport(format!(
                "zoom must be positive, got {}",
                self.zoom
            )));
        }
        if !(self.pan_x.is_finite() && self.pan_y.is_finite()) {
            return Err(RenderError::InvalidViewport(format!(
                "pan must be finite, got ({}, {})",
                self.pan_x, self.pan_y
            )));
        }
        Ok(())
    }

    /// Sets the zoom level, clamped to the supported range.
    pub fn set_zoom(&mut self, zoom: f64) {
        if zoom.is_finite() {
            self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        }
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / ZOOM_STEP);
    }

    /// Changes the zoom while keeping `screen_point` over the same slide point.
    ///
    /// Useful for "zoom to cursor".
    pub fn zoom_at(&mut self, screen_point: Point, new_zoom: f64, dims: Size) {
        let anchor = to_slide(screen_point, self, dims);
        self.set_zoom(new_zoom);
        // Solve screen = (anchor - dims/2 + pan) * zoom + dims/2 for pan.
        self.pan_x = (screen_point.x - dims.width / 2.0) / self.zoom + dims.width / 2.0 - anchor.x;
        self.pan_y =
            (screen_point.y - dims.height / 2.0) / self.zoom + dims.height / 2.0 - anchor.y;
    }

    /// Pans by a delta given in screen pixels.
    pub fn pan_by_screen(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx / self.zoom;
        self.pan_y += dy / self.zoom;
    }

    pub fn reset(&mut self) {
        *self = Self::identity();
    }
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::identity()
    }
}

impl fmt::Display for ViewportState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Zoom: {:.2}x | Pan: ({:.1}, {:.1})",
            self.zoom, self.pan_x, self.pan_y
        )
    }
}

/// Maps a slide-space point into the view's screen space.
pub fn to_screen(point: Point, viewport: &ViewportState, dims: Size) -> Point {
    Point::new(
        (point.x - dims.width / 2.0 + viewport.pan_x) * viewport.zoom + dims.width / 2.0,
        (point.y - dims.height / 2.0 + viewport.pan_y) * viewport.zoom + dims.height / 2.0,
    )
}

/// Inverse of [`to_screen`]. `viewport.zoom` must be non-zero.
pub fn to_slide(point: Point, viewport: &ViewportState, dims: Size) -> Point {
    Point::new(
        (point.x - dims.width / 2.0) / viewport.zoom + dims.width / 2.0 - viewport.pan_x,
        (point.y - dims.height / 2.0) / viewport.zoom + dims.height / 2.0 - viewport.pan_y,
    )
}

/// Maps an axis-aligned slide-space rectangle to screen space.
pub fn to_screen_rect(bounds: Bounds, viewport: &ViewportState, dims: Size) -> Bounds {
    let origin = to_screen(Point::new(bounds.x, bounds.y), viewport, dims);
    Bounds::new(
        origin.x,
        origin.y,
        bounds.width * viewport.zoom,
        bounds.height * viewport.zoom,
    )
}

/// Zoom that fits the whole slide into `dims`, leaving `padding` (a fraction
/// of the view per side) free. Degenerate views yield the minimum zoom.
pub fn fit_zoom(dims: Size, padding: f64) -> f64 {
    let padding_factor = (1.0 - padding.clamp(0.0, 0.45) * 2.0).max(0.0);
    let zoom_x = dims.width * padding_factor / SLIDE_WIDTH;
    let zoom_y = dims.height * padding_factor / SLIDE_HEIGHT;
    let zoom = zoom_x.min(zoom_y);
    if zoom.is_finite() && zoom > 0.0 {
        zoom.clamp(MIN_ZOOM, MAX_ZOOM)
    } else {
        MIN_ZOOM
    }
}

/// Scale-plus-translation from slide space straight to device pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f64,
    pub translate_x: f64,
    pub translate_y: f64,
}

impl ViewTransform {
    pub fn new(viewport: &ViewportState, dims: Size, device_pixel_ratio: f64) -> Self {
        let half_w = dims.width / 2.0;
        let half_h = dims.height / 2.0;
        Self {
            scale: viewport.zoom * device_pixel_ratio,
            translate_x: ((viewport.pan_x - half_w) * viewport.zoom + half_w) * device_pixel_ratio,
            translate_y: ((viewport.pan_y - half_h) * viewport.zoom + half_h) * device_pixel_ratio,
        }
    }

    /// Slide point to device pixel.
    pub fn apply(&self, point: Point) -> Point {
        Point::new(
            point.x * self.scale + self.translate_x,
            point.y * self.scale + self.translate_y,
        )
    }

    pub fn to_skia(&self) -> tiny_skia::Transform {
        tiny_skia::Transform::from_row(
            self.scale as f32,
            0.0,
            0.0,
            self.scale as f32,
            self.translate_x as f32,
            self.translate_y as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIMS: Size = Size::new(1200.0, 800.0);

    #[test]
    fn test_identity_on_slide_sized_view() {
        let dims = Size::new(SLIDE_WIDTH, SLIDE_HEIGHT);
        let p = Point::new(123.0, 45.0);
        assert_eq!(to_screen(p, &ViewportState::identity(), dims), p);
    }

    #[test]
    fn test_zoom_pivots_on_view_centre() {
        let vp = ViewportState::new(2.0, 0.0, 0.0);
        let centre = Point::new(600.0, 400.0);
        assert_eq!(to_screen(centre, &vp, DIMS), centre);
        let p = to_screen(Point::new(700.0, 400.0), &vp, DIMS);
        assert_eq!(p, Point::new(800.0, 400.0));
    }

    #[test]
    fn test_view_transform_matches_to_screen() {
        let vp = ViewportState::new(1.7, -35.0, 12.5);
        let t = ViewTransform::new(&vp, DIMS, 2.0);
        let p = Point::new(310.0, 95.0);
        let screen = to_screen(p, &vp, DIMS);
        let device = t.apply(p);
        assert!((device.x - screen.x * 2.0).abs() < 1e-9);
        assert!((device.y - screen.y * 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_centres_slide() {
        let vp = ViewportState::fit(DIMS, 0.05);
        let centre = to_screen(Point::new(SLIDE_WIDTH / 2.0, SLIDE_HEIGHT / 2.0), &vp, DIMS);
        assert!((centre.x - 600.0).abs() < 1e-9);
        assert!((centre.y - 400.0).abs() < 1e-9);
        // Width is the limiting side: 1200 * 0.9 / 960
        assert!((vp.zoom - 1.125).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut vp = ViewportState::identity();
        vp.set_zoom(100.0);
        assert_eq!(vp.zoom, MAX_ZOOM);
        vp.set_zoom(0.0);
        assert_eq!(vp.zoom, MIN_ZOOM);
        vp.set_zoom(f64::NAN);
        assert_eq!(vp.zoom, MIN_ZOOM);
    }

    #[test]
    fn test_zoom_at_keeps_cursor_fixed() {
        let mut vp = ViewportState::fit_to_view(DIMS);
        let cursor = Point::new(250.0, 610.0);
        let before = to_slide(cursor, &vp, DIMS);
        vp.zoom_at(cursor, vp.zoom * 3.0, DIMS);
        let after = to_slide(cursor, &vp, DIMS);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_validate_rejects_bad_zoom() {
        assert!(ViewportState::new(0.0, 0.0, 0.0).validate().is_err());
        assert!(ViewportState::new(1.0, f64::INFINITY, 0.0).validate().is_err());
        assert!(ViewportState::identity().validate().is_ok());
    }

    #[test]
    fn test_screen_rect_scales_size() {
        let vp = ViewportState::new(2.0, 10.0, 0.0);
        let r = to_screen_rect(Bounds::new(0.0, 0.0, 50.0, 20.0), &vp, DIMS);
        assert_eq!((r.width, r.height), (100.0, 40.0));
    }
}
