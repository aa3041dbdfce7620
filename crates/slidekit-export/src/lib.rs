//! # SlideKit Export
//!
//! Turns a presentation into a PDF: one A4 page per slide, each slide
//! rendered offscreen to a JPEG and centred on its page.
//!
//! - [`options`]: quality, page layout and compression hints
//! - [`page_layout`]: where the slide and notes go on the page
//! - [`pdf`]: the sequential export pipeline

pub mod error;
pub mod options;
pub mod page_layout;
pub mod pdf;

pub use error::{ExportError, Result};
pub use options::{CompressionHint, ExportOptions, ExportQuality, PageLayout};
pub use page_layout::{mm_to_pt, PageGeometry, PdfRect, NOTES_BAND_MM, PAGE_MARGIN_MM};
pub use pdf::{latin1, pdf_file_name, ExportedPdf, PdfExporter};
