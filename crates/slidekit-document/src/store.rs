//! Document store: the single source of truth for presentation data.
//!
//! Every mutation goes through a store operation. Operations replace the
//! touched entities with new ones and share everything else with the
//! previous [`Document`], so consumers can compare `Arc`s to decide whether
//! something they render changed. An operation that targets an unknown id,
//! or whose result equals the current value, is a silent no-op: the
//! document `Arc` stays the same and no change is published.
//!
//! Observers registered with [`DocumentStore::subscribe`] are called after
//! every committed change with the new state. They run while the caller
//! still holds the store, so they must not reach back into it; everything
//! they need is in the [`StoreChange`].

use chrono::Utc;
use slidekit_core::{Subject, Subscription};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::model::{
    Document, Element, ElementId, ElementPatch, Presentation, PresentationId, PresentationPatch,
    Slide, SlideId, SlidePatch,
};

/// Z-order moves for [`DocumentStore::reorder_element`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    /// Paint last (top-most).
    Front,
    /// Paint first (bottom-most).
    Back,
    /// Swap with the element painted just after.
    Forward,
    /// Swap with the element painted just before.
    Backward,
}

/// What the editing UI currently has selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    pub presentation_id: Option<PresentationId>,
    pub slide_id: Option<SlideId>,
    pub element_ids: BTreeSet<ElementId>,
}

/// Why a change was published.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// A mutation operation changed the document.
    Edited,
    /// Only the selection changed.
    Selection,
    /// The document was replaced wholesale (undo/redo or load).
    Restored,
}

/// Published to observers after each committed change.
#[derive(Debug, Clone)]
pub struct StoreChange {
    pub kind: ChangeKind,
    pub revision: u64,
    pub document: Arc<Document>,
    pub selection: Selection,
}

pub struct DocumentStore {
    document: Arc<Document>,
    selection: Selection,
    revision: u64,
    changes: Subject<StoreChange>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            document: Arc::new(Document::default()),
            selection: Selection::default(),
            revision: 0,
            changes: Subject::new(),
        }
    }

    /// Store seeded with an existing presentation, which becomes current.
    pub fn with_presentation(presentation: Presentation) -> Self {
        let mut store = Self::new();
        store.replace_presentation(presentation);
        store
    }

    // ---------------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------------

    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Incremented on every committed change, including selection changes.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn presentation(&self, id: PresentationId) -> Option<&Arc<Presentation>> {
        self.document.presentation(id)
    }

    pub fn slide(&self, pid: PresentationId, sid: SlideId) -> Option<&Arc<Slide>> {
        self.presentation(pid)?.slide(sid)
    }

    pub fn element(&self, pid: PresentationId, sid: SlideId, eid: ElementId) -> Option<&Arc<Element>> {
        self.slide(pid, sid)?.element(eid)
    }

    pub fn current_presentation(&self) -> Option<&Arc<Presentation>> {
        self.presentation(self.selection.presentation_id?)
    }

    pub fn current_slide(&self) -> Option<&Arc<Slide>> {
        self.slide(self.selection.presentation_id?, self.selection.slide_id?)
    }

    /// Registers an observer for committed changes.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(&StoreChange) + 'static,
    {
        self.changes.subscribe(observer)
    }

    // ---------------------------------------------------------------------
    // Presentations
    // ---------------------------------------------------------------------

    /// Creates a presentation with one blank slide and makes it current.
    pub fn create_presentation(&mut self, name: impl Into<String>) -> PresentationId {
        let presentation = Presentation::new(name);
        let id = presentation.id;
        let first_slide = presentation.slides.first().map(|s| s.id);

        let mut document = Document::clone(&self.document);
        document.presentations.push(Arc::new(presentation));
        self.selection = Selection {
            presentation_id: Some(id),
            slide_id: first_slide,
            element_ids: BTreeSet::new(),
        };
        tracing::debug!("Created presentation {}", id);
        self.commit(document, ChangeKind::Edited);
        id
    }

    /// Inserts `presentation`, replacing any presentation with the same id,
    /// and makes it current.
    pub fn replace_presentation(&mut self, presentation: Presentation) {
        let id = presentation.id;
        let first_slide = presentation.slides.first().map(|s| s.id);
        let mut document = Document::clone(&self.document);
        match document.presentation_index(id) {
            Some(idx) => document.presentations[idx] = Arc::new(presentation),
            None => document.presentations.push(Arc::new(presentation)),
        }
        self.selection = Selection {
            presentation_id: Some(id),
            slide_id: first_slide,
            element_ids: BTreeSet::new(),
        };
        self.commit(document, ChangeKind::Restored);
    }

    pub fn delete_presentation(&mut self, id: PresentationId) -> bool {
        let Some(idx) = self.document.presentation_index(id) else {
            return false;
        };
        let mut document = Document::clone(&self.document);
        document.presentations.remove(idx);
        tracing::debug!("Deleted presentation {}", id);
        self.commit(document, ChangeKind::Edited);
        true
    }

    pub fn update_presentation(&mut self, id: PresentationId, patch: PresentationPatch) -> bool {
        self.modify_presentation(id, |p| {
            let mut next = p.clone();
            if let Some(name) = &patch.name {
                next.name = name.clone();
            }
            Some(next)
        })
    }

    pub fn rename_presentation(&mut self, id: PresentationId, name: impl Into<String>) -> bool {
        self.update_presentation(
            id,
            PresentationPatch {
                name: Some(name.into()),
            },
        )
    }

    // ---------------------------------------------------------------------
    // Slides
    // ---------------------------------------------------------------------

    /// Adds a blank slide at `index` (appended when `None` or out of range).
    pub fn add_slide(&mut self, pid: PresentationId, index: Option<usize>) -> Option<SlideId> {
        self.insert_slide(pid, Slide::new(), index)
    }

    /// Inserts a prepared slide at `index` (appended when `None` or out of range).
    pub fn insert_slide(
        &mut self,
        pid: PresentationId,
        slide: Slide,
        index: Option<usize>,
    ) -> Option<SlideId> {
        let id = slide.id;
        let slide = Arc::new(slide);
        let changed = self.modify_presentation(pid, |p| {
            let mut next = p.clone();
            let at = index.unwrap_or(next.slides.len()).min(next.slides.len());
            next.slides.insert(at, slide);
            Some(next)
        });
        changed.then_some(id)
    }

    pub fn delete_slide(&mut self, pid: PresentationId, sid: SlideId) -> bool {
        self.modify_presentation(pid, |p| {
            let idx = p.slide_index(sid)?;
            let mut next = p.clone();
            next.slides.remove(idx);
            Some(next)
        })
    }

    /// Applies `patch`; other slide fields and all ordering are unchanged.
    pub fn update_slide(&mut self, pid: PresentationId, sid: SlideId, patch: SlidePatch) -> bool {
        self.modify_slide(pid, sid, |s| Some(s.patched(&patch)))
    }

    /// Inserts a copy (fresh ids) right after the original.
    pub fn duplicate_slide(&mut self, pid: PresentationId, sid: SlideId) -> Option<SlideId> {
        let copy = self.slide(pid, sid)?.duplicate();
        let idx = self.presentation(pid)?.slide_index(sid)?;
        self.insert_slide(pid, copy, Some(idx + 1))
    }

    /// Moves a slide to `to_index` (clamped to the last position).
    pub fn move_slide(&mut self, pid: PresentationId, sid: SlideId, to_index: usize) -> bool {
        self.modify_presentation(pid, |p| {
            let from = p.slide_index(sid)?;
            let mut next = p.clone();
            let slide = next.slides.remove(from);
            let to = to_index.min(next.slides.len());
            next.slides.insert(to, slide);
            Some(next)
        })
    }

    // ---------------------------------------------------------------------
    // Elements
    // ---------------------------------------------------------------------

    /// Appends `element` on top of the slide's paint order.
    pub fn add_element(
        &mut self,
        pid: PresentationId,
        sid: SlideId,
        element: Element,
    ) -> Option<ElementId> {
        let id = element.id;
        let element = Arc::new(element);
        self.modify_slide(pid, sid, |s| {
            let mut next = s.clone();
            next.elements.push(element);
            Some(next)
        })
        .then_some(id)
    }

    pub fn update_element(
        &mut self,
        pid: PresentationId,
        sid: SlideId,
        eid: ElementId,
        patch: ElementPatch,
    ) -> bool {
        self.update_element_with(pid, sid, eid, |e| *e = e.patched(&patch))
    }

    /// Edits an element through a closure. The id cannot be changed.
    pub fn update_element_with<F>(
        &mut self,
        pid: PresentationId,
        sid: SlideId,
        eid: ElementId,
        edit: F,
    ) -> bool
    where
        F: FnOnce(&mut Element),
    {
        self.modify_slide(pid, sid, |s| {
            let idx = s.element_index(eid)?;
            let mut element = Element::clone(&s.elements[idx]);
            edit(&mut element);
            element.id = eid;
            if element == *s.elements[idx] {
                return None;
            }
            let mut next = s.clone();
            next.elements[idx] = Arc::new(element);
            Some(next)
        })
    }

    pub fn delete_element(&mut self, pid: PresentationId, sid: SlideId, eid: ElementId) -> bool {
        self.modify_slide(pid, sid, |s| {
            let idx = s.element_index(eid)?;
            let mut next = s.clone();
            next.elements.remove(idx);
            Some(next)
        })
    }

    pub fn reorder_element(
        &mut self,
        pid: PresentationId,
        sid: SlideId,
        eid: ElementId,
        order: ZOrder,
    ) -> bool {
        self.modify_slide(pid, sid, |s| {
            let from = s.element_index(eid)?;
            let last = s.elements.len() - 1;
            let to = match order {
                ZOrder::Front => last,
                ZOrder::Back => 0,
                ZOrder::Forward => (from + 1).min(last),
                ZOrder::Backward => from.saturating_sub(1),
            };
            if to == from {
                return None;
            }
            let mut next = s.clone();
            let element = next.elements.remove(from);
            next.elements.insert(to, element);
            Some(next)
        })
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Makes a slide current and clears the element selection.
    pub fn select_slide(&mut self, pid: PresentationId, sid: SlideId) -> bool {
        if self.slide(pid, sid).is_none() {
            return false;
        }
        self.set_selection(Selection {
            presentation_id: Some(pid),
            slide_id: Some(sid),
            element_ids: BTreeSet::new(),
        })
    }

    /// Selects elements on the current slide; unknown ids are ignored.
    pub fn select_elements<I>(&mut self, ids: I) -> bool
    where
        I: IntoIterator<Item = ElementId>,
    {
        let Some(slide) = self.current_slide() else {
            return false;
        };
        let element_ids: BTreeSet<ElementId> = ids
            .into_iter()
            .filter(|id| slide.element(*id).is_some())
            .collect();
        let selection = Selection {
            element_ids,
            ..self.selection.clone()
        };
        self.set_selection(selection)
    }

    pub fn clear_selection(&mut self) -> bool {
        let selection = Selection {
            element_ids: BTreeSet::new(),
            ..self.selection.clone()
        };
        self.set_selection(selection)
    }

    fn set_selection(&mut self, selection: Selection) -> bool {
        if selection == self.selection {
            return false;
        }
        self.selection = selection;
        self.revision += 1;
        self.publish(ChangeKind::Selection);
        true
    }

    // ---------------------------------------------------------------------
    // History support
    // ---------------------------------------------------------------------

    /// Replaces the whole document (undo/redo). The selection is pruned of
    /// anything that no longer exists.
    pub fn restore(&mut self, document: Arc<Document>) {
        if Arc::ptr_eq(&document, &self.document) {
            return;
        }
        self.document = document;
        self.prune_selection();
        self.revision += 1;
        tracing::debug!("Document restored at revision {}", self.revision);
        self.publish(ChangeKind::Restored);
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    /// Replaces a presentation with `edit`'s result. `edit` returns `None`
    /// to signal "nothing to do" (e.g. unknown child id).
    fn modify_presentation<F>(&mut self, pid: PresentationId, edit: F) -> bool
    where
        F: FnOnce(&Presentation) -> Option<Presentation>,
    {
        let Some(idx) = self.document.presentation_index(pid) else {
            return false;
        };
        let current = &self.document.presentations[idx];
        let Some(mut next) = edit(current) else {
            return false;
        };
        if next == **current {
            return false;
        }
        next.updated_at = Utc::now();

        let mut document = Document::clone(&self.document);
        document.presentations[idx] = Arc::new(next);
        self.commit(document, ChangeKind::Edited);
        true
    }

    fn modify_slide<F>(&mut self, pid: PresentationId, sid: SlideId, edit: F) -> bool
    where
        F: FnOnce(&Slide) -> Option<Slide>,
    {
        self.modify_presentation(pid, |p| {
            let idx = p.slide_index(sid)?;
            let next_slide = edit(&p.slides[idx])?;
            if next_slide == *p.slides[idx] {
                return None;
            }
            let mut next = p.clone();
            next.slides[idx] = Arc::new(next_slide);
            Some(next)
        })
    }

    fn commit(&mut self, document: Document, kind: ChangeKind) {
        self.document = Arc::new(document);
        self.prune_selection();
        self.revision += 1;
        self.publish(kind);
    }

    fn prune_selection(&mut self) {
        let doc = Arc::clone(&self.document);
        let presentation = self.selection.presentation_id.and_then(|id| doc.presentation(id));
        match presentation {
            None => self.selection = Selection::default(),
            Some(p) => {
                let slide = self.selection.slide_id.and_then(|id| p.slide(id));
                match slide {
                    None => {
                        self.selection.slide_id = p.slides.first().map(|s| s.id);
                        self.selection.element_ids.clear();
                    }
                    Some(s) => self.selection.element_ids.retain(|id| s.element(*id).is_some()),
                }
            }
        }
    }

    fn publish(&self, kind: ChangeKind) {
        self.changes.notify(&StoreChange {
            kind,
            revision: self.revision,
            document: Arc::clone(&self.document),
            selection: self.selection.clone(),
        });
    }
}

impl Default for DocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentStore")
            .field("presentations", &self.document.presentations.len())
            .field("revision", &self.revision)
            .field("selection", &self.selection)
            .finish()
    }
}
