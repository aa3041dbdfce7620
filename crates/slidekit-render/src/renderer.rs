//! Slide canvas renderer.
//! Paints one slide into a pixel surface using tiny-skia.
//!
//! A [`SlideRenderer`] is bound to one surface for its whole life and owns
//! the decoded images for that surface. Painting is deterministic: the same
//! slide, viewport and options always produce the same pixels.
//!
//! Paint order:
//! - workspace clear and slide background
//! - elements in array order (later elements occlude earlier ones)
//! - grid overlay, if enabled
//! - hover outline, selection outline and handles

use image::codecs::jpeg::JpegEncoder;
use image::{ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use slidekit_core::constants::{DEFAULT_GRID_SIZE, MIN_GRID_SIZE, SLIDE_HEIGHT, SLIDE_WIDTH};
use slidekit_document::{
    Background, Bounds, Color as SlideColor, Element, ElementId, ElementKind, Point, ShapeContent,
    ShapeType, Size, Slide, TextContent,
};
use std::collections::BTreeSet;
use std::io::Cursor;
use std::sync::Arc;
use tiny_skia::{
    Color, FillRule, FilterQuality, GradientStop, LinearGradient, Paint, Path, PathBuilder,
    Pixmap, PixmapPaint, Rect, SpreadMode, Stroke, Transform,
};

use crate::error::{RenderError, Result};
use crate::geometry::{ViewTransform, ViewportState};
use crate::image_cache::ImageCache;
use crate::image_loader::{load_pixmap, FsImageLoader, ImageLoader};
use crate::{font_manager, text};

/// Largest surface side, in device pixels.
pub const MAX_SURFACE_SIDE: u32 = 16384;

/// Side of a selection handle, in screen pixels.
pub const HANDLE_SIZE: f64 = 8.0;

fn workspace_color() -> Color {
    Color::from_rgba8(229, 231, 235, 255)
}
fn selection_color() -> Color {
    Color::from_rgba8(37, 99, 235, 255)
}
fn hover_color() -> Color {
    Color::from_rgba8(96, 165, 250, 255)
}
fn grid_color() -> Color {
    Color::from_rgba8(0, 0, 0, 32)
}

fn skia_color(c: SlideColor) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, c.a)
}

/// Size of the surface a renderer draws into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceConfig {
    /// Logical width in screen pixels.
    pub width: f64,
    /// Logical height in screen pixels.
    pub height: f64,
    /// Device pixels per screen pixel; multiplies every paint operation.
    pub device_pixel_ratio: f64,
}

impl SurfaceConfig {
    pub fn new(width: f64, height: f64, device_pixel_ratio: f64) -> Self {
        Self {
            width,
            height,
            device_pixel_ratio,
        }
    }

    /// A surface exactly one slide in size, scaled by `device_pixel_ratio`.
    pub fn slide(device_pixel_ratio: f64) -> Self {
        Self::new(SLIDE_WIDTH, SLIDE_HEIGHT, device_pixel_ratio)
    }

    pub fn logical_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Device pixel dimensions, or why the surface is unusable.
    pub fn pixel_size(&self) -> Result<(u32, u32)> {
        let invalid = |reason: &str| RenderError::InvalidSurface {
            width: self.width,
            height: self.height,
            device_pixel_ratio: self.device_pixel_ratio,
            reason: reason.to_string(),
        };

        if !(self.width.is_finite() && self.height.is_finite() && self.device_pixel_ratio.is_finite())
        {
            return Err(invalid("dimensions must be finite"));
        }
        if self.width <= 0.0 || self.height <= 0.0 || self.device_pixel_ratio <= 0.0 {
            return Err(invalid("dimensions must be positive"));
        }

        let w = (self.width * self.device_pixel_ratio).round();
        let h = (self.height * self.device_pixel_ratio).round();
        if w < 1.0 || h < 1.0 {
            return Err(invalid("surface is smaller than one pixel"));
        }
        let max = MAX_SURFACE_SIDE as f64;
        if w > max || h > max {
            return Err(invalid("surface exceeds the maximum pixel size"));
        }
        Ok((w as u32, h as u32))
    }
}

/// Display-only decorations for a render.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    pub selected_element_ids: BTreeSet<ElementId>,
    pub hovered_element_id: Option<ElementId>,
    pub show_grid: bool,
    pub show_selection_handles: bool,
}

impl RenderOptions {
    /// Options for an editing view: selection with handles.
    pub fn editing<I>(selected: I) -> Self
    where
        I: IntoIterator<Item = ElementId>,
    {
        Self {
            selected_element_ids: selected.into_iter().collect(),
            show_selection_handles: true,
            ..Default::default()
        }
    }

    pub fn with_grid(mut self, show: bool) -> Self {
        self.show_grid = show;
        self
    }

    pub fn with_hover(mut self, hovered: Option<ElementId>) -> Self {
        self.hovered_element_id = hovered;
        self
    }
}

/// An image that could not be preloaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFailure {
    pub source: String,
    pub reason: String,
}

/// Outcome of [`SlideRenderer::preload_images`]. Failures are per image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreloadReport {
    /// Distinct sources on the slide.
    pub requested: usize,
    /// Sources already attempted by an earlier preload.
    pub cached: usize,
    pub loaded: usize,
    pub failed: Vec<ImageFailure>,
}

impl PreloadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Renders slides into one surface.
pub struct SlideRenderer {
    surface: SurfaceConfig,
    pixmap: Pixmap,
    images: ImageCache,
    loader: Arc<dyn ImageLoader>,
    grid_size: f64,
    missing_font_logged: bool,
}

impl SlideRenderer {
    /// Binds a renderer to `surface`, loading images from the file system.
    pub fn new(surface: SurfaceConfig) -> Result<Self> {
        Self::with_loader(surface, Arc::new(FsImageLoader::new()))
    }

    pub fn with_loader(surface: SurfaceConfig, loader: Arc<dyn ImageLoader>) -> Result<Self> {
        let pixmap = allocate(&surface)?;
        tracing::debug!(
            "Renderer bound to {}x{} surface ({}x{} px)",
            surface.width,
            surface.height,
            pixmap.width(),
            pixmap.height()
        );
        Ok(Self {
            surface,
            pixmap,
            images: ImageCache::new(),
            loader,
            grid_size: DEFAULT_GRID_SIZE,
            missing_font_logged: false,
        })
    }

    /// Grid spacing in slide units, no finer than [`MIN_GRID_SIZE`].
    pub fn set_grid_size(&mut self, grid_size: f64) -> Result<()> {
        if !grid_size.is_finite() || grid_size < MIN_GRID_SIZE {
            return Err(RenderError::InvalidGridSize(grid_size, MIN_GRID_SIZE));
        }
        self.grid_size = grid_size;
        Ok(())
    }

    pub fn grid_size(&self) -> f64 {
        self.grid_size
    }

    pub fn surface(&self) -> &SurfaceConfig {
        &self.surface
    }

    /// Rebinds to a new surface size. Cached images are kept.
    pub fn resize(&mut self, surface: SurfaceConfig) -> Result<()> {
        self.pixmap = allocate(&surface)?;
        self.surface = surface;
        Ok(())
    }

    pub fn pixel_width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn pixel_height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    pub fn images(&self) -> &ImageCache {
        &self.images
    }

    pub fn image_loader(&self) -> Arc<dyn ImageLoader> {
        Arc::clone(&self.loader)
    }

    /// Paints `slide` as seen through `viewport`.
    pub fn render(
        &mut self,
        slide: &Slide,
        viewport: &ViewportState,
        options: &RenderOptions,
    ) -> Result<()> {
        viewport.validate()?;
        let view = ViewTransform::new(
            viewport,
            self.surface.logical_size(),
            self.surface.device_pixel_ratio,
        );
        let transform = view.to_skia();

        self.pixmap.fill(workspace_color());
        paint_background(&mut self.pixmap, &slide.background, transform);

        let mut missing_font = false;
        for element in &slide.elements {
            let et = element_transform(element, transform);
            match &element.kind {
                ElementKind::Shape(shape) => paint_shape(&mut self.pixmap, element, shape, et),
                ElementKind::Image(img) => match self.images.get(&img.source) {
                    Some(decoded) => paint_image(&mut self.pixmap, &element.bounds(), decoded, et),
                    None => tracing::trace!("Image {} not loaded; skipped", element.id),
                },
                ElementKind::Text(text) => {
                    missing_font |= !paint_text(&mut self.pixmap, element, text, et);
                }
            }
        }
        if missing_font && !self.missing_font_logged {
            tracing::warn!("No system font available; text elements are not drawn");
            self.missing_font_logged = true;
        }

        if options.show_grid {
            paint_grid(&mut self.pixmap, self.grid_size, transform);
        }
        paint_decorations(
            &mut self.pixmap,
            slide,
            options,
            transform,
            viewport.zoom,
            self.surface.device_pixel_ratio,
        );
        Ok(())
    }

    /// Image sources on `slide` that have not been attempted yet.
    pub fn missing_image_sources(&self, slide: &Slide) -> Vec<String> {
        slide
            .image_sources()
            .into_iter()
            .filter(|s| !self.images.contains(s))
            .map(String::from)
            .collect()
    }

    /// Decodes every image on `slide` into the cache. Never fails as a
    /// whole; broken sources are reported and later skipped by `render`.
    pub async fn preload_images(&mut self, slide: &Slide) -> PreloadReport {
        let requested = slide.image_sources().len();
        let sources = self.missing_image_sources(slide);
        let loader = self.image_loader();
        let results = load_images(loader.as_ref(), &sources).await;

        let mut report = self.store_images(results);
        report.requested = requested;
        report.cached = requested - sources.len();
        report
    }

    /// Puts loader results into the cache.
    pub fn store_images(&mut self, results: Vec<(String, Result<Pixmap>)>) -> PreloadReport {
        let mut report = PreloadReport::default();
        for (source, result) in results {
            match result {
                Ok(pixmap) => {
                    self.images.insert_ready(source, pixmap);
                    report.loaded += 1;
                }
                Err(e) => {
                    tracing::warn!("Skipping image: {}", e);
                    let reason = e.to_string();
                    self.images.insert_failed(source.clone(), reason.clone());
                    report.failed.push(ImageFailure { source, reason });
                }
            }
        }
        report
    }

    /// Releases every decoded image.
    pub fn clear_image_cache(&mut self) {
        if !self.images.is_empty() {
            tracing::debug!("Releasing {} cached images", self.images.len());
        }
        self.images.clear();
    }

    /// Surface contents as straight-alpha RGBA.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut out = RgbaImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in out.pixels_mut().zip(self.pixmap.pixels()) {
            let c = src.demultiply();
            *dst = Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
        }
        out
    }

    /// Surface contents flattened onto white.
    pub fn to_rgb_image(&self) -> RgbImage {
        let mut out = RgbImage::new(self.pixmap.width(), self.pixmap.height());
        for (dst, src) in out.pixels_mut().zip(self.pixmap.pixels()) {
            let under = 255 - src.alpha();
            *dst = Rgb([src.red() + under, src.green() + under, src.blue() + under]);
        }
        out
    }

    pub fn encode_png(&self) -> Result<Vec<u8>> {
        let mut buf = Cursor::new(Vec::new());
        self.to_rgba_image()
            .write_to(&mut buf, ImageFormat::Png)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        Ok(buf.into_inner())
    }

    /// JPEG of the surface flattened onto white; `quality` is clamped to 1..=100.
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>> {
        let rgb = self.to_rgb_image();
        let mut buf = Vec::new();
        JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
            .encode_image(&rgb)
            .map_err(|e| RenderError::Encode(e.to_string()))?;
        Ok(buf)
    }
}

impl std::fmt::Debug for SlideRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlideRenderer")
            .field("surface", &self.surface)
            .field("pixels", &(self.pixmap.width(), self.pixmap.height()))
            .field("cached_images", &self.images.len())
            .finish()
    }
}

/// Fetches and decodes `sources` one after another.
pub async fn load_images(
    loader: &dyn ImageLoader,
    sources: &[String],
) -> Vec<(String, Result<Pixmap>)> {
    let mut results = Vec::with_capacity(sources.len());
    for source in sources {
        let result = load_pixmap(loader, source).await;
        results.push((source.clone(), result));
    }
    results
}

/// Corner and edge-midpoint handle centres, clockwise from top-left.
pub fn selection_handle_points(b: &Bounds) -> [Point; 8] {
    let (l, t, r, btm) = (b.x, b.y, b.right(), b.bottom());
    let (cx, cy) = (b.x + b.width / 2.0, b.y + b.height / 2.0);
    [
        Point::new(l, t),
        Point::new(cx, t),
        Point::new(r, t),
        Point::new(r, cy),
        Point::new(r, btm),
        Point::new(cx, btm),
        Point::new(l, btm),
        Point::new(l, cy),
    ]
}

fn allocate(surface: &SurfaceConfig) -> Result<Pixmap> {
    let (w, h) = surface.pixel_size()?;
    Pixmap::new(w, h).ok_or_else(|| RenderError::InvalidSurface {
        width: surface.width,
        height: surface.height,
        device_pixel_ratio: surface.device_pixel_ratio,
        reason: "pixel buffer could not be allocated".to_string(),
    })
}

fn element_transform(element: &Element, view: Transform) -> Transform {
    match element.rotation {
        Some(deg) => {
            let c = element.center();
            view.pre_concat(Transform::from_rotate_at(deg as f32, c.x as f32, c.y as f32))
        }
        None => view,
    }
}

fn paint_background(pixmap: &mut Pixmap, background: &Background, transform: Transform) {
    let Some(rect) = Rect::from_xywh(0.0, 0.0, SLIDE_WIDTH as f32, SLIDE_HEIGHT as f32) else {
        return;
    };
    let mut paint = Paint::default();
    paint.anti_alias = false;
    match background {
        Background::Solid { color } => paint.set_color(skia_color(*color)),
        Background::LinearGradient { from, to, angle } => {
            // Gradient line through the centre, long enough to reach the corners.
            let (sin, cos) = angle.to_radians().sin_cos();
            let half = SLIDE_WIDTH / 2.0 * cos.abs() + SLIDE_HEIGHT / 2.0 * sin.abs();
            let (cx, cy) = (SLIDE_WIDTH / 2.0, SLIDE_HEIGHT / 2.0);
            let start = tiny_skia::Point::from_xy((cx - cos * half) as f32, (cy - sin * half) as f32);
            let end = tiny_skia::Point::from_xy((cx + cos * half) as f32, (cy + sin * half) as f32);
            let stops = vec![
                GradientStop::new(0.0, skia_color(*from)),
                GradientStop::new(1.0, skia_color(*to)),
            ];
            match LinearGradient::new(start, end, stops, SpreadMode::Pad, Transform::identity()) {
                Some(shader) => paint.shader = shader,
                None => paint.set_color(skia_color(*from)),
            }
        }
    }
    pixmap.fill_rect(rect, &paint, transform, None);
}

fn closed_shape_path(shape_type: ShapeType, b: &Bounds) -> Option<Path> {
    let (x, y, w, h) = (b.x as f32, b.y as f32, b.width as f32, b.height as f32);
    match shape_type {
        ShapeType::Rectangle => Rect::from_xywh(x, y, w, h).map(PathBuilder::from_rect),
        ShapeType::Ellipse => Rect::from_xywh(x, y, w, h).and_then(PathBuilder::from_oval),
        ShapeType::Triangle => {
            let mut pb = PathBuilder::new();
            pb.move_to(x + w / 2.0, y);
            pb.line_to(x + w, y + h);
            pb.line_to(x, y + h);
            pb.close();
            pb.finish()
        }
        ShapeType::Line | ShapeType::Arrow => None,
    }
}

fn paint_shape(pixmap: &mut Pixmap, element: &Element, shape: &ShapeContent, transform: Transform) {
    let b = element.bounds();
    if matches!(shape.shape_type, ShapeType::Line | ShapeType::Arrow) {
        paint_connector(pixmap, shape, &b, transform);
        return;
    }
    let Some(path) = closed_shape_path(shape.shape_type, &b) else {
        return;
    };

    let mut paint = Paint::default();
    paint.anti_alias = true;
    if let Some(fill) = shape.fill {
        paint.set_color(skia_color(fill));
        pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
    }
    if let Some(stroke) = shape.stroke {
        if stroke.width > 0.0 {
            paint.set_color(skia_color(stroke.color));
            let sk_stroke = Stroke {
                width: stroke.width as f32,
                ..Default::default()
            };
            pixmap.stroke_path(&path, &paint, &sk_stroke, transform, None);
        }
    }
}

/// Lines run corner to corner across the box, from its top-left to its
/// bottom-right; arrows add a head at the bottom-right end.
fn paint_connector(pixmap: &mut Pixmap, shape: &ShapeContent, b: &Bounds, transform: Transform) {
    let stroke = shape.stroke.unwrap_or(slidekit_document::Stroke {
        color: shape.fill.unwrap_or(SlideColor::BLACK),
        width: 2.0,
    });
    if stroke.width <= 0.0 || stroke.color.is_transparent() {
        return;
    }

    let (x0, y0) = (b.x as f32, b.y as f32);
    let (x1, y1) = ((b.x + b.width) as f32, (b.y + b.height) as f32);
    let length = (b.width as f32).hypot(b.height as f32);
    if length <= f32::EPSILON {
        return;
    }
    let (dx, dy) = ((x1 - x0) / length, (y1 - y0) / length);
    let sw = stroke.width as f32;
    let head = if shape.shape_type == ShapeType::Arrow {
        (length * 0.2).max(sw * 3.0).min(length)
    } else {
        0.0
    };

    let mut paint = Paint::default();
    paint.anti_alias = true;
    paint.set_color(skia_color(stroke.color));

    let (bx, by) = (x1 - dx * head, y1 - dy * head);
    let mut pb = PathBuilder::new();
    pb.move_to(x0, y0);
    pb.line_to(bx, by);
    if let Some(shaft) = pb.finish() {
        let sk_stroke = Stroke {
            width: sw,
            ..Default::default()
        };
        pixmap.stroke_path(&shaft, &paint, &sk_stroke, transform, None);
    }

    if head > 0.0 {
        let half = (head * 0.5).max(sw * 1.5);
        let (nx, ny) = (-dy * half, dx * half);
        let mut pb = PathBuilder::new();
        pb.move_to(bx + nx, by + ny);
        pb.line_to(x1, y1);
        pb.line_to(bx - nx, by - ny);
        pb.close();
        if let Some(tip) = pb.finish() {
            pixmap.fill_path(&tip, &paint, FillRule::Winding, transform, None);
        }
    }
}

fn paint_image(pixmap: &mut Pixmap, b: &Bounds, image: &Pixmap, transform: Transform) {
    let sx = b.width as f32 / image.width() as f32;
    let sy = b.height as f32 / image.height() as f32;
    let placement = transform.pre_concat(Transform::from_row(sx, 0.0, 0.0, sy, b.x as f32, b.y as f32));
    let paint = PixmapPaint {
        quality: FilterQuality::Bilinear,
        ..PixmapPaint::default()
    };
    pixmap.draw_pixmap(0, 0, image.as_ref(), &paint, placement, None);
}

/// Returns false when no font could be found.
fn paint_text(pixmap: &mut Pixmap, element: &Element, text: &TextContent, transform: Transform) -> bool {
    if text.content.trim().is_empty() || text.color.is_transparent() {
        return true;
    }
    let Some(font) = font_manager::font_for(&text.font) else {
        return false;
    };
    let bounds = element.bounds();
    if let Some(path) = text::layout_path(font, text.font.size, &text.content, &bounds, text.align) {
        let mut paint = Paint::default();
        paint.anti_alias = true;
        paint.set_color(skia_color(text.color));
        pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
    }
    true
}

fn paint_grid(pixmap: &mut Pixmap, spacing: f64, transform: Transform) {
    let mut pb = PathBuilder::new();
    let mut x = spacing;
    while x < SLIDE_WIDTH {
        pb.move_to(x as f32, 0.0);
        pb.line_to(x as f32, SLIDE_HEIGHT as f32);
        x += spacing;
    }
    let mut y = spacing;
    while y < SLIDE_HEIGHT {
        pb.move_to(0.0, y as f32);
        pb.line_to(SLIDE_WIDTH as f32, y as f32);
        y += spacing;
    }
    let Some(path) = pb.finish() else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(grid_color());
    paint.anti_alias = false;
    // Zero width strokes as a one pixel hairline.
    let stroke = Stroke {
        width: 0.0,
        ..Default::default()
    };
    pixmap.stroke_path(&path, &paint, &stroke, transform, None);
}

fn paint_decorations(
    pixmap: &mut Pixmap,
    slide: &Slide,
    options: &RenderOptions,
    transform: Transform,
    zoom: f64,
    device_pixel_ratio: f64,
) {
    for element in &slide.elements {
        let selected = options.selected_element_ids.contains(&element.id);
        let hovered = options.hovered_element_id == Some(element.id);
        if !selected && !hovered {
            continue;
        }

        let b = element.bounds();
        let Some(rect) = Rect::from_xywh(b.x as f32, b.y as f32, b.width as f32, b.height as f32)
        else {
            continue;
        };
        let outline = PathBuilder::from_rect(rect);
        let et = element_transform(element, transform);

        let mut paint = Paint::default();
        paint.anti_alias = true;
        // Widths are in screen pixels; the transform scales by zoom and ratio.
        let (color, width) = if selected {
            (selection_color(), 1.5 / zoom)
        } else {
            (hover_color(), 1.0 / zoom)
        };
        paint.set_color(color);
        let stroke = Stroke {
            width: width as f32,
            ..Default::default()
        };
        pixmap.stroke_path(&outline, &paint, &stroke, et, None);

        if selected && options.show_selection_handles {
            paint_handles(pixmap, &b, et, device_pixel_ratio);
        }
    }
}

fn paint_handles(pixmap: &mut Pixmap, b: &Bounds, transform: Transform, device_pixel_ratio: f64) {
    let mut points: Vec<tiny_skia::Point> = selection_handle_points(b)
        .iter()
        .map(|p| tiny_skia::Point::from_xy(p.x as f32, p.y as f32))
        .collect();
    transform.map_points(&mut points);

    let size = (HANDLE_SIZE * device_pixel_ratio) as f32;
    let mut fill = Paint::default();
    fill.set_color(Color::WHITE);
    let mut edge = Paint::default();
    edge.set_color(selection_color());
    let stroke = Stroke {
        width: device_pixel_ratio as f32,
        ..Default::default()
    };

    for p in points {
        let Some(r) = Rect::from_xywh(p.x - size / 2.0, p.y - size / 2.0, size, size) else {
            continue;
        };
        let handle = PathBuilder::from_rect(r);
        pixmap.fill_path(&handle, &fill, FillRule::Winding, Transform::identity(), None);
        pixmap.stroke_path(&handle, &edge, &stroke, Transform::identity(), None);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidekit_document::{Color as SlideColor, ShapeContent};

    fn red_square() -> Element {
        Element::shape(
            Bounds::new(100.0, 100.0, 200.0, 100.0),
            ShapeContent::filled(ShapeType::Rectangle, SlideColor::rgb(255, 0, 0)),
        )
    }

    fn rgba_at(r: &SlideRenderer, x: u32, y: u32) -> [u8; 4] {
        r.to_rgba_image().get_pixel(x, y).0
    }

    #[test]
    fn test_invalid_surfaces_are_rejected() {
        for s in [
            SurfaceConfig::new(0.0, 540.0, 1.0),
            SurfaceConfig::new(960.0, 540.0, 0.0),
            SurfaceConfig::new(f64::NAN, 540.0, 1.0),
            SurfaceConfig::new(960.0, 540.0, 100.0),
        ] {
            assert!(matches!(
                SlideRenderer::new(s),
                Err(RenderError::InvalidSurface { .. })
            ));
        }
    }

    #[test]
    fn test_pixel_size_applies_ratio() {
        let r = SlideRenderer::new(SurfaceConfig::slide(0.2)).expect("renderer");
        assert_eq!((r.pixel_width(), r.pixel_height()), (192, 108));
    }

    #[test]
    fn test_shape_and_background() {
        let slide = Slide::new().with_element(red_square());
        let mut r = SlideRenderer::new(SurfaceConfig::slide(1.0)).expect("renderer");
        r.render(&slide, &ViewportState::identity(), &RenderOptions::default())
            .expect("render");
        assert_eq!(rgba_at(&r, 200, 150), [255, 0, 0, 255]);
        assert_eq!(rgba_at(&r, 50, 50), [255, 255, 255, 255]);
    }

    #[test]
    fn test_device_pixel_ratio_scales_paint() {
        let slide = Slide::new().with_element(red_square());
        let mut r = SlideRenderer::new(SurfaceConfig::slide(2.0)).expect("renderer");
        r.render(&slide, &ViewportState::identity(), &RenderOptions::default())
            .expect("render");
        // Slide (150, 120) lands on device (300, 240).
        assert_eq!(rgba_at(&r, 300, 240), [255, 0, 0, 255]);
        assert_eq!(rgba_at(&r, 150, 120), [255, 255, 255, 255]);
    }

    #[test]
    fn test_rotation_moves_pixels() {
        let bar = Element::shape(
            Bounds::new(380.0, 260.0, 200.0, 20.0),
            ShapeContent::filled(ShapeType::Rectangle, SlideColor::BLACK),
        );
        let mut r = SlideRenderer::new(SurfaceConfig::slide(1.0)).expect("renderer");
        let flat = Slide::new().with_element(bar.clone());
        r.render(&flat, &ViewportState::identity(), &RenderOptions::default())
            .expect("render");
        assert_eq!(rgba_at(&r, 560, 270), [0, 0, 0, 255]);

        let rotated = Slide::new().with_element(bar.with_rotation(90.0));
        r.render(&rotated, &ViewportState::identity(), &RenderOptions::default())
            .expect("render");
        assert_eq!(rgba_at(&r, 560, 270), [255, 255, 255, 255]);
        assert_eq!(rgba_at(&r, 480, 350), [0, 0, 0, 255]);
    }

    #[test]
    fn test_selection_handles_are_drawn() {
        let e = red_square();
        let id = e.id;
        let slide = Slide::new().with_element(e);
        let mut r = SlideRenderer::new(SurfaceConfig::slide(1.0)).expect("renderer");
        r.render(&slide, &ViewportState::identity(), &RenderOptions::editing([id]))
            .expect("render");
        // Centre of the top-left handle is white fill.
        assert_eq!(rgba_at(&r, 100, 100), [255, 255, 255, 255]);
        // The handle border runs along x = 96.
        let edge = rgba_at(&r, 96, 100);
        assert_ne!(edge, [255, 255, 255, 255]);
    }

    #[test]
    fn test_invalid_viewport_is_error() {
        let mut r = SlideRenderer::new(SurfaceConfig::slide(1.0)).expect("renderer");
        let err = r.render(
            &Slide::new(),
            &ViewportState::new(0.0, 0.0, 0.0),
            &RenderOptions::default(),
        );
        assert!(matches!(err, Err(RenderError::InvalidViewport(_))));
    }

    #[test]
    fn test_encoders() {
        let mut r = SlideRenderer::new(SurfaceConfig::slide(0.1)).expect("renderer");
        r.render(&Slide::new(), &ViewportState::identity(), &RenderOptions::default())
            .expect("render");
        let png = r.encode_png().expect("png");
        assert_eq!(&png[..4], b"\x89PNG");
        let jpeg = r.encode_jpeg(80).expect("jpeg");
        assert_eq!(&jpeg[..2], [0xFF, 0xD8]);
    }

    #[test]
    fn test_line_runs_corner_to_corner() {
        let line = Element::shape(
            Bounds::new(100.0, 100.0, 200.0, 200.0),
            ShapeContent::outlined(ShapeType::Line, SlideColor::BLACK, 4.0),
        );
        let mut r = SlideRenderer::new(SurfaceConfig::slide(1.0)).expect("renderer");
        r.render(
            &Slide::new().with_element(line),
            &ViewportState::identity(),
            &RenderOptions::default(),
        )
        .expect("render");
        assert_eq!(rgba_at(&r, 150, 150), [0, 0, 0, 255]);
        assert_eq!(rgba_at(&r, 250, 250), [0, 0, 0, 255]);
        // Off the diagonal, including the box's horizontal middle.
        assert_eq!(rgba_at(&r, 150, 200), [255, 255, 255, 255]);
        assert_eq!(rgba_at(&r, 275, 265), [255, 255, 255, 255]);
    }

    #[test]
    fn test_arrow_head_sits_at_bottom_right() {
        let arrow = Element::shape(
            Bounds::new(100.0, 100.0, 200.0, 200.0),
            ShapeContent::outlined(ShapeType::Arrow, SlideColor::BLACK, 4.0),
        );
        let mut r = SlideRenderer::new(SurfaceConfig::slide(1.0)).expect("renderer");
        r.render(
            &Slide::new().with_element(arrow),
            &ViewportState::identity(),
            &RenderOptions::default(),
        )
        .expect("render");
        assert_eq!(rgba_at(&r, 150, 150), [0, 0, 0, 255]);
        // Beside the shaft, inside the head.
        assert_eq!(rgba_at(&r, 275, 265), [0, 0, 0, 255]);
        // Beside the shaft near the start there is no head.
        assert_eq!(rgba_at(&r, 125, 115), [255, 255, 255, 255]);
    }

    #[test]
    fn test_grid_size_has_a_minimum() {
        let mut r = SlideRenderer::new(SurfaceConfig::slide(0.1)).expect("renderer");
        for grid_size in [1e-6, 0.5, 0.0, -20.0, f64::INFINITY] {
            assert!(matches!(
                r.set_grid_size(grid_size),
                Err(RenderError::InvalidGridSize(..))
            ));
        }
        assert_eq!(r.grid_size(), DEFAULT_GRID_SIZE);

        r.set_grid_size(MIN_GRID_SIZE).expect("minimum accepted");
        assert_eq!(r.grid_size(), MIN_GRID_SIZE);
        r.render(&Slide::new(), &ViewportState::identity(), &RenderOptions::default().with_grid(true))
            .expect("render");
    }

    #[test]
    fn test_handle_points_order() {
        let pts = selection_handle_points(&Bounds::new(0.0, 0.0, 10.0, 20.0));
        assert_eq!(pts[0], Point::new(0.0, 0.0));
        assert_eq!(pts[4], Point::new(10.0, 20.0));
        assert_eq!(pts[7], Point::new(0.0, 10.0));
    }
}
