//! Speaker-notes panel for the selected slide.

use image::RgbaImage;
use slidekit_core::{shared, Shared, Subscription, SupervisedFailure, Supervisor};
use slidekit_document::{DocumentStore, Slide, SlideId, StoreChange};
use std::rc::Rc;
use std::sync::Arc;

use super::{placeholder, selected_slide, FailureRelay};
use crate::error::Result;
use crate::geometry::ViewportState;
use crate::image_loader::{FsImageLoader, ImageLoader};
use crate::renderer::{load_images, PreloadReport, RenderOptions, SlideRenderer, SurfaceConfig};

struct NotesState {
    slide: Option<Arc<Slide>>,
    preview: Option<Arc<RgbaImage>>,
    renderer: SlideRenderer,
    render_count: u64,
    supervisor: Supervisor<Arc<RgbaImage>>,
}

impl NotesState {
    fn apply(&mut self, change: &StoreChange) {
        let next = selected_slide(&change.document, &change.selection);
        let same = match (&self.slide, &next) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        if !same {
            self.slide = next;
            self.sync(false);
        }
    }

    fn sync(&mut self, retry: bool) {
        let Some(slide) = self.slide.clone() else {
            self.preview = None;
            return;
        };
        let renderer = &mut self.renderer;
        let render_count = &mut self.render_count;
        let cycle = || -> Result<Arc<RgbaImage>> {
            renderer.render(&slide, &ViewportState::identity(), &RenderOptions::default())?;
            *render_count += 1;
            Ok(Arc::new(renderer.to_rgba_image()))
        };
        let output = if retry {
            self.supervisor.retry(cycle)
        } else {
            self.supervisor.run(cycle)
        };
        self.preview = Some(output.into_inner());
    }
}

/// Shows the notes and a small preview of whichever slide is selected.
pub struct NotesPanel {
    state: Shared<NotesState>,
    failures: FailureRelay,
    _subscription: Subscription,
}

impl NotesPanel {
    pub fn attach(store: &DocumentStore, preview_scale: f64) -> Result<Self> {
        Self::attach_with_loader(store, preview_scale, Arc::new(FsImageLoader::new()))
    }

    pub fn attach_with_loader(
        store: &DocumentStore,
        preview_scale: f64,
        loader: Arc<dyn ImageLoader>,
    ) -> Result<Self> {
        let renderer = SlideRenderer::with_loader(SurfaceConfig::slide(preview_scale), loader)?;
        let (w, h) = (renderer.pixel_width(), renderer.pixel_height());
        let failures = FailureRelay::default();
        let state = shared(NotesState {
            slide: selected_slide(store.document(), store.selection()),
            preview: None,
            renderer,
            render_count: 0,
            supervisor: failures.supervisor("notes panel", move || Arc::new(placeholder(w, h))),
        });
        state.borrow_mut().sync(false);

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

    pub fn on_error<F>(&self, callback: F)
    where
        F: FnMut(&SupervisedFailure) + 'static,
    {
        self.failures.set_callback(callback);
    }

    pub fn slide_id(&self) -> Option<SlideId> {
        self.state.borrow().slide.as_ref().map(|s| s.id)
    }

    /// Notes of the selected slide; empty when nothing is selected.
    pub fn notes(&self) -> String {
        self.state
            .borrow()
            .slide
            .as_ref()
            .map(|s| s.notes.clone())
            .unwrap_or_default()
    }

    pub fn preview(&self) -> Option<Arc<RgbaImage>> {
        self.state.borrow().preview.clone()
    }

    pub fn render_count(&self) -> u64 {
        self.state.borrow().render_count
    }

    pub fn last_failure(&self) -> Option<SupervisedFailure> {
        self.state.borrow().supervisor.last_failure().cloned()
    }

    pub fn retry(&self) {
        self.state.borrow_mut().sync(true);
        self.failures.flush();
    }

    /// Decodes the selected slide's images and repaints the preview.
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
            let still_selected = state.slide.as_ref().is_some_and(|s| Arc::ptr_eq(s, &slide));
            if report.loaded > 0 && still_selected {
                state.sync(false);
            }
            report
        };
        self.failures.flush();
        report.requested = slide.image_sources().len();
        report.cached = report.requested - sources.len();
        report
    }
}

impl Drop for NotesPanel {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.renderer.clear_image_cache();
        }
    }
}

impl std::fmt::Debug for NotesPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotesPanel")
            .field("slide_id", &self.slide_id())
            .field("render_count", &self.render_count())
            .finish()
    }
}
