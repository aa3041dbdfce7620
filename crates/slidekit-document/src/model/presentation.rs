use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{PresentationId, Slide, SlideId};

/// A named, ordered deck of slides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Presentation {
    pub id: PresentationId,
    pub name: String,
    #[serde(default)]
    pub slides: Vec<Arc<Slide>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Presentation {
    /// New presentation containing one blank slide.
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: PresentationId::new(),
            name: name.into(),
            slides: vec![Arc::new(Slide::new())],
            created_at: now,
            updated_at: now,
        }
    }

    /// New presentation without any slides.
    pub fn empty(name: impl Into<String>) -> Self {
        let mut p = Self::new(name);
        p.slides.clear();
        p
    }

    pub fn with_slide(mut self, slide: Slide) -> Self {
        self.slides.push(Arc::new(slide));
        self
    }

    pub fn slide(&self, id: SlideId) -> Option<&Arc<Slide>> {
        self.slides.iter().find(|s| s.id == id)
    }

    pub fn slide_index(&self, id: SlideId) -> Option<usize> {
        self.slides.iter().position(|s| s.id == id)
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }
}

/// Partial update for a presentation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PresentationPatch {
    pub name: Option<String>,
}

/// Everything the document store owns. Snapshots hold an `Arc<Document>`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub presentations: Vec<Arc<Presentation>>,
}

impl Document {
    pub fn presentation(&self, id: PresentationId) -> Option<&Arc<Presentation>> {
        self.presentations.iter().find(|p| p.id == id)
    }

    pub fn presentation_index(&self, id: PresentationId) -> Option<usize> {
        self.presentations.iter().position(|p| p.id == id)
    }
}
