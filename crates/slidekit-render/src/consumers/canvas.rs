//! Main editing canvas: the selected slide with selection, hover and grid.

use image::RgbaImage;
use slidekit_core::{shared, Shared, Subscription, SupervisedFailure, Supervisor};
use slidekit_document::{
    Bounds, DocumentStore, ElementId, Point, Size, Slide, SlideId, StoreChange,
};
use std::collections::BTreeSet;
use std::rc::Rc;
use std::sync::Arc;

use super::{placeholder, selected_slide, FailureRelay};
use crate::error::Result;
use crate::geometry::{to_screen_rect, to_slide, ViewportState};
use crate::image_loader::{FsImageLoader, ImageLoader};
use crate::renderer::{load_images, PreloadReport, RenderOptions, SlideRenderer, SurfaceConfig};

struct CanvasState {
    renderer: SlideRenderer,
    viewport: ViewportState,
    slide: Option<Arc<Slide>>,
    selected: BTreeSet<ElementId>,
    hovered: Option<ElementId>,
    show_grid: bool,
    render_count: u64,
    supervisor: Supervisor<()>,
}

impl CanvasState {
    fn apply(&mut self, change: &StoreChange) {
        let next = selected_slide(&change.document, &change.selection);
        let same_slide = match (&self.slide, &next) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if same_slide && self.selected == change.selection.element_ids {
            return;
        }
        if !same_slide {
            let hovered_exists = match (&next, self.hovered) {
                (Some(slide), Some(id)) => slide.element(id).is_some(),
                _ => false,
            };
            if !hovered_exists {
                self.hovered = None;
            }
        }
        self.slide = next;
        self.selected = change.selection.element_ids.clone();
        self.redraw(false);
    }

    fn redraw(&mut self, retry: bool) {
        let Some(slide) = self.slide.clone() else {
            return;
        };
        let options = RenderOptions::editing(self.selected.iter().copied())
            .with_grid(self.show_grid)
            .with_hover(self.hovered);
        let viewport = self.viewport;
        let renderer = &mut self.renderer;
        let render_count = &mut self.render_count;
        let cycle = || -> Result<()> {
            renderer.render(&slide, &viewport, &options)?;
            *render_count += 1;
            Ok(())
        };
        if retry {
            self.supervisor.retry(cycle);
        } else {
            self.supervisor.run(cycle);
        }
    }

    fn dims(&self) -> Size {
        self.renderer.surface().logical_size()
    }

    fn hit_test(&self, screen: Point) -> Option<ElementId> {
        let slide = self.slide.as_ref()?;
        let p = to_slide(screen, &self.viewport, self.dims());
        slide
            .elements
            .iter()
            .rev()
            .find(|e| e.contains_point(&p))
            .map(|e| e.id)
    }
}

/// The editing view of the selected slide.
///
/// Owns the viewport of the view; everything else it shows comes from the
/// store.
pub struct EditorCanvas {
    state: Shared<CanvasState>,
    failures: FailureRelay,
    _subscription: Subscription,
}

impl EditorCanvas {
    /// Attaches to `store` with the slide fitted into `surface`.
    pub fn attach(store: &DocumentStore, surface: SurfaceConfig) -> Result<Self> {
        Self::attach_with_loader(store, surface, Arc::new(FsImageLoader::new()))
    }

    pub fn attach_with_loader(
        store: &DocumentStore,
        surface: SurfaceConfig,
        loader: Arc<dyn ImageLoader>,
    ) -> Result<Self> {
        let renderer = SlideRenderer::with_loader(surface, loader)?;
        let failures = FailureRelay::default();
        let state = shared(CanvasState {
            renderer,
            viewport: ViewportState::fit_to_view(surface.logical_size()),
            slide: selected_slide(store.document(), store.selection()),
            selected: store.selection().element_ids.clone(),
            hovered: None,
            show_grid: false,
            render_count: 0,
            supervisor: failures.supervisor("editor canvas", || ()),
        });
        state.borrow_mut().redraw(false);

        let weak = Rc::downgrade(&state);
        let relay = failures.clone();
        let subscription = store.subscribe(move |change| {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().apply(change);
                relay.flush();
            }
        });
        Ok(Self {
            state,
            failures,
            _subscription: subscription,
        })
    }

    /// Installs the collaborator told about failed render cycles. It runs
    /// once the canvas is idle, so it may query or repaint the canvas.
    pub fn on_error<F>(&self, callback: F)
    where
        F: FnMut(&SupervisedFailure) + 'static,
    {
        self.failures.set_callback(callback);
    }

    pub fn slide_id(&self) -> Option<SlideId> {
        self.state.borrow().slide.as_ref().map(|s| s.id)
    }

    pub fn viewport(&self) -> ViewportState {
        self.state.borrow().viewport
    }

    pub fn surface(&self) -> SurfaceConfig {
        *self.state.borrow().renderer.surface()
    }

    /// Replaces the viewport. Rejected (and nothing repainted) if invalid.
    pub fn set_viewport(&self, viewport: ViewportState) -> Result<()> {
        viewport.validate()?;
        self.update_view(|s| s.viewport = viewport);
        Ok(())
    }

    pub fn fit_to_view(&self) {
        self.update_view(|s| s.viewport = ViewportState::fit_to_view(s.dims()));
    }

    pub fn zoom_in(&self) {
        self.update_view(|s| s.viewport.zoom_in());
    }

    pub fn zoom_out(&self) {
        self.update_view(|s| s.viewport.zoom_out());
    }

    /// Zooms to `zoom`, keeping the slide point under `screen` in place.
    pub fn zoom_at(&self, screen: Point, zoom: f64) {
        self.update_view(|s| {
            let dims = s.dims();
            s.viewport.zoom_at(screen, zoom, dims);
        });
    }

    pub fn pan_by(&self, dx: f64, dy: f64) {
        self.update_view(|s| s.viewport.pan_by_screen(dx, dy));
    }

    /// Rebinds the renderer to a new logical size, keeping the pixel ratio.
    pub fn resize(&self, width: f64, height: f64) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let surface = SurfaceConfig::new(width, height, state.renderer.surface().device_pixel_ratio);
        state.renderer.resize(surface)?;
        state.redraw(false);
        drop(state);
        self.failures.flush();
        Ok(())
    }

    pub fn show_grid(&self) -> bool {
        self.state.borrow().show_grid
    }

    pub fn set_show_grid(&self, show: bool) {
        if self.show_grid() != show {
            self.update_view(|s| s.show_grid = show);
        }
    }

    /// Rejected (and nothing repainted) below the minimum spacing.
    pub fn set_grid_size(&self, grid_size: f64) -> Result<()> {
        self.state.borrow_mut().renderer.set_grid_size(grid_size)?;
        self.update_view(|_| {});
        Ok(())
    }

    /// Topmost element under a screen point, honouring rotation.
    pub fn hit_test(&self, screen: Point) -> Option<ElementId> {
        self.state.borrow().hit_test(screen)
    }

    /// Moves the hover highlight to whatever is under `screen`.
    pub fn hover_at(&self, screen: Point) -> Option<ElementId> {
        let hit = self.hit_test(screen);
        if self.hovered() != hit {
            self.update_view(|s| s.hovered = hit);
        }
        hit
    }

    pub fn clear_hover(&self) {
        if self.hovered().is_some() {
            self.update_view(|s| s.hovered = None);
        }
    }

    pub fn hovered(&self) -> Option<ElementId> {
        self.state.borrow().hovered
    }

    /// Screen rectangle of an element's unrotated box, for overlays.
    pub fn element_screen_rect(&self, id: ElementId) -> Option<Bounds> {
        let state = self.state.borrow();
        let element = state.slide.as_ref()?.element(id)?.clone();
        Some(to_screen_rect(element.bounds(), &state.viewport, state.dims()))
    }

    /// Screen rectangles of every selected element.
    pub fn selection_overlays(&self) -> Vec<(ElementId, Bounds)> {
        let ids: Vec<ElementId> = self.state.borrow().selected.iter().copied().collect();
        ids.into_iter()
            .filter_map(|id| self.element_screen_rect(id).map(|b| (id, b)))
            .collect()
    }

    /// Current frame, or `None` when no slide is selected. After a failed
    /// render cycle a blank frame stands in.
    pub fn frame(&self) -> Option<RgbaImage> {
        let state = self.state.borrow();
        state.slide.as_ref()?;
        if state.supervisor.has_failed() {
            return Some(placeholder(
                state.renderer.pixel_width(),
                state.renderer.pixel_height(),
            ));
        }
        Some(state.renderer.to_rgba_image())
    }

    pub fn render_count(&self) -> u64 {
        self.state.borrow().render_count
    }

    pub fn last_failure(&self) -> Option<SupervisedFailure> {
        self.state.borrow().supervisor.last_failure().cloned()
    }

    pub fn retry(&self) {
        self.state.borrow_mut().redraw(true);
        self.failures.flush();
    }

    /// Decodes the selected slide's images and repaints.
    pub async fn preload(&self) -> PreloadReport {
        let (slide, loader, sources) = {
            let state = self.state.borrow();
            let Some(slide) = state.slide.clone() else {
                return PreloadReport::default();
            };
            let sources = state.renderer.missing_image_sources(&slide);
            (slide, state.renderer.image_loader(), sources)
        };

        let results = load_images(loader.as_ref(), &sources).await;

        let mut report = {
            let mut state = self.state.borrow_mut();
            let report = state.renderer.store_images(results);
            if report.loaded > 0 {
                state.redraw(false);
            }
            report
        };
        self.failures.flush();
        report.requested = slide.image_sources().len();
        report.cached = report.requested - sources.len();
        report
    }

    fn update_view<F>(&self, change: F)
    where
        F: FnOnce(&mut CanvasState),
    {
        {
            let mut state = self.state.borrow_mut();
            change(&mut state);
            state.redraw(false);
        }
        self.failures.flush();
    }
}

impl Drop for EditorCanvas {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.renderer.clear_image_cache();
        }
    }
}

impl std::fmt::Debug for EditorCanvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("EditorCanvas")
            .field("surface", state.renderer.surface())
            .field("viewport", &state.viewport)
            .field("render_count", &state.render_count)
            .finish()
    }
}
