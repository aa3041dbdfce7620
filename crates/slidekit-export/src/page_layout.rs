//! Placement of the slide image and notes on an A4 page.
//!
//! Rectangles are in PDF points with the origin at the bottom-left corner
//! of the page, ready to be used in content streams.

use slidekit_core::constants::SLIDE_ASPECT;

use crate::options::PageLayout;

pub const PAGE_MARGIN_MM: f64 = 10.0;

/// Height reserved below the slide for speaker notes.
pub const NOTES_BAND_MM: f64 = 40.0;

/// Space between the slide image and the notes band.
const NOTES_GAP_MM: f64 = 4.0;

pub fn mm_to_pt(mm: f64) -> f64 {
    mm * 72.0 / 25.4
}

/// Axis-aligned rectangle in points, bottom-left origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PdfRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl PdfRect {
    pub fn top(&self) -> f64 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    /// Where the slide image goes; always 16:9.
    pub slide: PdfRect,
    pub notes: Option<PdfRect>,
}

impl PageGeometry {
    pub fn new(layout: PageLayout, include_notes: bool) -> Self {
        let (page_w, page_h) = layout.page_size_mm();
        let margin = PAGE_MARGIN_MM;
        let reserved = if include_notes {
            NOTES_BAND_MM + NOTES_GAP_MM
        } else {
            0.0
        };

        let avail_w = page_w - 2.0 * margin;
        let avail_h = page_h - 2.0 * margin - reserved;
        let slide_w = avail_w.min(avail_h * SLIDE_ASPECT);
        let slide_h = slide_w / SLIDE_ASPECT;

        // Centred horizontally, and vertically inside the area above the notes.
        let slide_x = (page_w - slide_w) / 2.0;
        let slide_top = margin + (avail_h - slide_h) / 2.0;
        let slide = PdfRect {
            x: mm_to_pt(slide_x),
            y: mm_to_pt(page_h - slide_top - slide_h),
            width: mm_to_pt(slide_w),
            height: mm_to_pt(slide_h),
        };

        let notes = include_notes.then(|| PdfRect {
            x: mm_to_pt(margin),
            y: mm_to_pt(margin),
            width: mm_to_pt(avail_w),
            height: mm_to_pt(NOTES_BAND_MM),
        });

        Self {
            width: mm_to_pt(page_w),
            height: mm_to_pt(page_h),
            slide,
            notes,
        }
    }
}
