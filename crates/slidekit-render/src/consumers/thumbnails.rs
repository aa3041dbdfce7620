//! Thumbnail strip: one small render per slide of a presentation.
//!
//! Slides are compared by `Arc` identity against the previous sync, so an
//! edit to one slide repaints only that slide's thumbnail.

use image::RgbaImage;
use slidekit_core::{
    shared, Shared, Subscription, SupervisedFailure, SupervisedOutput, Supervisor,
};
use slidekit_document::{Document, DocumentStore, PresentationId, Slide, SlideId, StoreChange};
use std::collections::BTreeSet;
use std::rc::Rc;
use std::sync::Arc;

use super::{placeholder, FailureRelay};
use crate::error::Result;
use crate::geometry::ViewportState;
use crate::image_loader::{FsImageLoader, ImageLoader};
use crate::renderer::{load_images, PreloadReport, RenderOptions, SlideRenderer, SurfaceConfig};

/// Rendered preview of one slide.
#[derive(Debug, Clone)]
pub struct Thumbnail {
    pub slide_id: SlideId,
    pub image: Arc<RgbaImage>,
    /// True when rendering failed and a blank image stands in.
    pub placeholder: bool,
}

type Entries = Vec<(Arc<Slide>, Thumbnail)>;

struct StripState {
    presentation_id: PresentationId,
    document: Arc<Document>,
    renderer: SlideRenderer,
    entries: Entries,
    render_count: u64,
    supervisor: Supervisor<Entries>,
}

impl StripState {
    fn slides(&self) -> Vec<Arc<Slide>> {
        self.document
            .presentation(self.presentation_id)
            .map(|p| p.slides.clone())
            .unwrap_or_default()
    }

    fn apply(&mut self, change: &StoreChange) {
        if Arc::ptr_eq(&change.document, &self.document) {
            return;
        }
        let before = self.document.presentation(self.presentation_id).cloned();
        self.document = Arc::clone(&change.document);
        let unchanged = match (before.as_ref(), self.document.presentation(self.presentation_id)) {
            (Some(b), Some(a)) => Arc::ptr_eq(b, a),
            (None, None) => true,
            _ => false,
        };
        if !unchanged {
            self.sync(false);
        }
    }

    fn sync(&mut self, retry: bool) {
        let slides = self.slides();
        let previous = std::mem::take(&mut self.entries);
        let renderer = &mut self.renderer;
        let render_count = &mut self.render_count;
        let cycle = || render_changed(renderer, &slides, &previous, render_count);
        let output = if retry {
            self.supervisor.retry(cycle)
        } else {
            self.supervisor.run(cycle)
        };

        self.entries = match output {
            SupervisedOutput::Completed(entries) => entries,
            SupervisedOutput::Fallback(_) => {
                let (w, h) = (self.renderer.pixel_width(), self.renderer.pixel_height());
                slides
                    .iter()
                    .map(|slide| {
                        let kept = previous
                            .iter()
                            .find(|(s, t)| Arc::ptr_eq(s, slide) && !t.placeholder);
                        match kept {
                            Some(entry) => entry.clone(),
                            None => (
                                Arc::clone(slide),
                                Thumbnail {
                                    slide_id: slide.id,
                                    image: Arc::new(placeholder(w, h)),
                                    placeholder: true,
                                },
                            ),
                        }
                    })
                    .collect()
            }
        };
    }

    /// Forgets thumbnails of slides that show any of `sources`.
    fn invalidate(&mut self, sources: &[String]) {
        self.entries.retain(|(slide, _)| {
            !slide
                .image_sources()
                .iter()
                .any(|s| sources.iter().any(|loaded| loaded.as_str() == *s))
        });
    }
}

fn render_changed(
    renderer: &mut SlideRenderer,
    slides: &[Arc<Slide>],
    previous: &Entries,
    render_count: &mut u64,
) -> Result<Entries> {
    let viewport = ViewportState::identity();
    let options = RenderOptions::default();
    let mut entries = Vec::with_capacity(slides.len());
    for slide in slides {
        let unchanged = previous
            .iter()
            .find(|(s, t)| Arc::ptr_eq(s, slide) && !t.placeholder);
        if let Some(entry) = unchanged {
            entries.push(entry.clone());
            continue;
        }
        renderer.render(slide, &viewport, &options)?;
        *render_count += 1;
        entries.push((
            Arc::clone(slide),
            Thumbnail {
                slide_id: slide.id,
                image: Arc::new(renderer.to_rgba_image()),
                placeholder: false,
            },
        ));
    }
    tracing::trace!("Thumbnail strip synced {} slides", entries.len());
    Ok(entries)
}

/// Keeps one thumbnail per slide of a presentation in step with the store.
pub struct ThumbnailStrip {
    state: Shared<StripState>,
    failures: FailureRelay,
    _subscription: Subscription,
}

impl ThumbnailStrip {
    /// Attaches to `store`, rendering every slide at `scale` (1.0 = 960x540).
    pub fn attach(store: &DocumentStore, presentation_id: PresentationId, scale: f64) -> Result<Self> {
        Self::attach_with_loader(store, presentation_id, scale, Arc::new(FsImageLoader::new()))
    }

    pub fn attach_with_loader(
        store: &DocumentStore,
        presentation_id: PresentationId,
        scale: f64,
        loader: Arc<dyn ImageLoader>,
    ) -> Result<Self> {
        let renderer = SlideRenderer::with_loader(SurfaceConfig::slide(scale), loader)?;
        let failures = FailureRelay::default();
        let state = shared(StripState {
            presentation_id,
            document: Arc::clone(store.document()),
            renderer,
            entries: Vec::new(),
            render_count: 0,
            supervisor: failures.supervisor("thumbnail strip", Vec::new),
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

    /// Installs the collaborator told about failed render cycles.
    pub fn on_error<F>(&self, callback: F)
    where
        F: FnMut(&SupervisedFailure) + 'static,
    {
        self.failures.set_callback(callback);
    }

    pub fn presentation_id(&self) -> PresentationId {
        self.state.borrow().presentation_id
    }

    pub fn thumbnail(&self, slide_id: SlideId) -> Option<Thumbnail> {
        self.state
            .borrow()
            .entries
            .iter()
            .find(|(_, t)| t.slide_id == slide_id)
            .map(|(_, t)| t.clone())
    }

    /// Thumbnails in slide order.
    pub fn thumbnails(&self) -> Vec<Thumbnail> {
        self.state
            .borrow()
            .entries
            .iter()
            .map(|(_, t)| t.clone())
            .collect()
    }

    pub fn slide_ids(&self) -> Vec<SlideId> {
        self.state
            .borrow()
            .entries
            .iter()
            .map(|(_, t)| t.slide_id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.state.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slide renders performed since attaching.
    pub fn render_count(&self) -> u64 {
        self.state.borrow().render_count
    }

    pub fn last_failure(&self) -> Option<SupervisedFailure> {
        self.state.borrow().supervisor.last_failure().cloned()
    }

    /// Re-renders placeholder thumbnails.
    pub fn retry(&self) {
        self.state.borrow_mut().sync(true);
        self.failures.flush();
    }

    /// Decodes every image used by the presentation, then repaints the
    /// thumbnails that show a newly loaded image.
    pub async fn preload(&self) -> PreloadReport {
        let (loader, sources, requested) = {
            let state = self.state.borrow();
            let mut wanted = BTreeSet::new();
            for slide in state.slides() {
                wanted.extend(slide.image_sources().into_iter().map(String::from));
            }
            let missing: Vec<String> = wanted
                .iter()
                .filter(|s| !state.renderer.images().contains(s))
                .cloned()
                .collect();
            (state.renderer.image_loader(), missing, wanted.len())
        };

        let results = load_images(loader.as_ref(), &sources).await;

        let mut report = {
            let mut state = self.state.borrow_mut();
            let report = state.renderer.store_images(results);
            if report.loaded > 0 {
                state.invalidate(&sources);
                state.sync(false);
            }
            report
        };
        self.failures.flush();
        report.requested = requested;
        report.cached = requested - sources.len();
        report
    }
}

impl Drop for ThumbnailStrip {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.try_borrow_mut() {
            state.renderer.clear_image_cache();
        }
    }
}

impl std::fmt::Debug for ThumbnailStrip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ThumbnailStrip")
            .field("presentation_id", &state.presentation_id)
            .field("thumbnails", &state.entries.len())
            .field("render_count", &state.render_count)
            .finish()
    }
}
