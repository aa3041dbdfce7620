use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{Color, Element, ElementId, SlideId};

/// Slide background fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Background {
    Solid {
        color: Color,
    },
    LinearGradient {
        from: Color,
        to: Color,
        /// Direction in degrees; 0 runs left to right, 90 top to bottom.
        angle: f64,
    },
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid {
            color: Color::WHITE,
        }
    }
}

/// One slide. `elements` is in paint order: later elements occlude earlier ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub id: SlideId,
    #[serde(default)]
    pub elements: Vec<Arc<Element>>,
    #[serde(default)]
    pub background: Background,
    #[serde(default)]
    pub notes: String,
}

impl Slide {
    pub fn new() -> Self {
        Self {
            id: SlideId::new(),
            elements: Vec::new(),
            background: Background::default(),
            notes: String::new(),
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = notes.into();
        self
    }

    pub fn with_element(mut self, element: Element) -> Self {
        self.elements.push(Arc::new(element));
        self
    }

    pub fn element(&self, id: ElementId) -> Option<&Arc<Element>> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn element_index(&self, id: ElementId) -> Option<usize> {
        self.elements.iter().position(|e| e.id == id)
    }

    /// Distinct image sources in paint order.
    pub fn image_sources(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for src in self.elements.iter().filter_map(|e| e.image_source()) {
            if !out.contains(&src) {
                out.push(src);
            }
        }
        out
    }

    /// Deep copy with fresh slide and element ids.
    pub fn duplicate(&self) -> Slide {
        Slide {
            id: SlideId::new(),
            elements: self
                .elements
                .iter()
                .map(|e| {
                    let mut copy = Element::clone(e);
                    copy.id = ElementId::new();
                    Arc::new(copy)
                })
                .collect(),
            background: self.background.clone(),
            notes: self.notes.clone(),
        }
    }

    /// Returns a copy with `patch` applied.
    pub fn patched(&self, patch: &SlidePatch) -> Slide {
        let mut next = self.clone();
        if let Some(background) = &patch.background {
            next.background = background.clone();
        }
        if let Some(notes) = &patch.notes {
            next.notes = notes.clone();
        }
        next
    }
}

impl Default for Slide {
    fn default() -> Self {
        Self::new()
    }
}

/// Partial update for a slide. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlidePatch {
    pub background: Option<Background>,
    pub notes: Option<String>,
}

impl SlidePatch {
    pub fn notes(notes: impl Into<String>) -> Self {
        Self {
            notes: Some(notes.into()),
            ..Default::default()
        }
    }

    pub fn background(background: Background) -> Self {
        Self {
            background: Some(background),
            ..Default::default()
        }
    }
}
