//! Derived views that follow the document store.
//!
//! Each consumer owns its own [`SlideRenderer`](crate::SlideRenderer),
//! subscribes to the store on `attach` and repaints when something it shows
//! changes. Consumers never mutate the store. Render cycles run under a
//! [`Supervisor`](slidekit_core::Supervisor), so a failing repaint leaves the
//! consumer alive with fallback output; the `on_error` callback runs after
//! the consumer has released its state. Dropping a consumer unsubscribes it
//! and releases its decoded images.

mod canvas;
mod notes;
mod thumbnails;

pub use canvas::EditorCanvas;
pub use notes::NotesPanel;
pub use thumbnails::{Thumbnail, ThumbnailStrip};

use slidekit_core::{SupervisedFailure, Supervisor};
use slidekit_document::{Document, Selection, Slide};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

/// Slide the selection points at, if it still exists in `document`.
pub(crate) fn selected_slide(document: &Document, selection: &Selection) -> Option<Arc<Slide>> {
    let presentation = document.presentation(selection.presentation_id?)?;
    presentation.slide(selection.slide_id?).cloned()
}

/// Blank opaque image used where a render failed.
pub(crate) fn placeholder(width: u32, height: u32) -> image::RgbaImage {
    image::RgbaImage::from_pixel(width.max(1), height.max(1), image::Rgba([229, 231, 235, 255]))
}

type ErrorCallback = Box<dyn FnMut(&SupervisedFailure)>;

#[derive(Default)]
struct RelayInner {
    pending: RefCell<Vec<SupervisedFailure>>,
    callback: RefCell<Option<ErrorCallback>>,
    flushing: Cell<bool>,
}

/// Holds failures captured inside a render cycle until the consumer's state
/// borrow ends, then hands them to the `on_error` callback. The callback may
/// therefore query or drive its own view.
#[derive(Clone, Default)]
pub(crate) struct FailureRelay(Rc<RelayInner>);

impl FailureRelay {
    /// A supervisor whose failures queue on this relay.
    pub(crate) fn supervisor<T, F>(&self, component: &str, fallback: F) -> Supervisor<T>
    where
        F: Fn() -> T + 'static,
    {
        let inner = Rc::clone(&self.0);
        Supervisor::new(component, fallback)
            .on_error(move |failure| inner.pending.borrow_mut().push(failure.clone()))
    }

    pub(crate) fn set_callback<F>(&self, callback: F)
    where
        F: FnMut(&SupervisedFailure) + 'static,
    {
        *self.0.callback.borrow_mut() = Some(Box::new(callback));
    }

    /// Delivers queued failures. Must be called with no state borrow held.
    pub(crate) fn flush(&self) {
        // A callback that repaints its view lands here again; the outer loop
        // delivers whatever that repaint queued.
        if self.0.flushing.replace(true) {
            return;
        }
        loop {
            let batch = std::mem::take(&mut *self.0.pending.borrow_mut());
            if batch.is_empty() {
                break;
            }
            let taken = self.0.callback.borrow_mut().take();
            let Some(mut callback) = taken else {
                continue;
            };
            for failure in &batch {
                callback(failure);
            }
            let mut slot = self.0.callback.borrow_mut();
            if slot.is_none() {
                *slot = Some(callback);
            }
        }
        self.0.flushing.set(false);
    }
}
