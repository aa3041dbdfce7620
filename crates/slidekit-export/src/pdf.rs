//! PDF export: one A4 page per slide.
//!
//! Slides are exported strictly in order through a single offscreen
//! renderer. For each slide the images are preloaded, the slide is painted,
//! encoded as JPEG and placed on its own page, optionally with the speaker
//! notes underneath. The task yields between slides so other work on the
//! runtime keeps moving. Any slide failing abandons the whole export; no
//! partial document is ever returned. An export in flight cannot be
//! cancelled.

use chrono::Utc;
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use slidekit_core::{emit, AppEvent, ExportEvent, Notification, NotificationSink};
use slidekit_document::Presentation;
use slidekit_render::text::wrap_lines;
use slidekit_render::{
    FsImageLoader, ImageLoader, RenderOptions, SlideRenderer, SurfaceConfig, ViewportState,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::{ExportError, Result};
use crate::options::ExportOptions;
use crate::page_layout::{PageGeometry, PdfRect};

const NOTES_FONT_SIZE: f64 = 10.0;
const NOTES_LINE_HEIGHT: f64 = 12.0;
/// Average Helvetica advance as a fraction of the font size.
const HELVETICA_AVG_WIDTH: f64 = 0.5;
const PRODUCER: &str = "SlideKit";

/// A finished export, not yet written anywhere.
#[derive(Debug, Clone)]
pub struct ExportedPdf {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

impl ExportedPdf {
    /// Writes the document into `dir` under its file name.
    pub async fn write_to_dir(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(&self.file_name);
        tokio::fs::write(&path, &self.bytes).await?;
        tracing::info!("Wrote {} ({} bytes)", path.display(), self.bytes.len());
        Ok(path)
    }
}

/// `<name>_presentation.pdf` with every non-alphanumeric turned into `_`.
pub fn pdf_file_name(presentation_name: &str) -> String {
    let trimmed = presentation_name.trim();
    let stem: String = if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    '_'
                }
            })
            .collect()
    };
    format!("{}_presentation.pdf", stem)
}

/// Drives the offscreen renderer over a presentation and assembles the PDF.
pub struct PdfExporter {
    options: ExportOptions,
    loader: Arc<dyn ImageLoader>,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl PdfExporter {
    pub fn new(options: ExportOptions) -> Self {
        Self::with_loader(options, Arc::new(FsImageLoader::new()))
    }

    pub fn with_loader(options: ExportOptions, loader: Arc<dyn ImageLoader>) -> Self {
        Self {
            options,
            loader,
            sink: None,
        }
    }

    /// Sends a success or failure notification when an export finishes.
    pub fn with_notifications(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Exports every slide of `presentation`. `progress` receives the
    /// percentage done (0 to 100) after each slide.
    pub async fn export<P>(&self, presentation: &Presentation, mut progress: P) -> Result<ExportedPdf>
    where
        P: FnMut(f32),
    {
        let result = self.run(presentation, &mut progress).await;
        match &result {
            Ok(pdf) => {
                tracing::info!(
                    "Exported '{}' to {} ({} pages)",
                    presentation.name,
                    pdf.file_name,
                    pdf.page_count
                );
                let _ = emit!(AppEvent::Export(ExportEvent::Completed {
                    file_name: pdf.file_name.clone(),
                    pages: pdf.page_count,
                }));
                self.notify(Notification::success(
                    "PDF exported",
                    format!("{} pages written to {}.", pdf.page_count, pdf.file_name),
                ));
            }
            Err(e) => {
                tracing::error!("Export of '{}' failed: {}", presentation.name, e);
                let _ = emit!(AppEvent::Export(ExportEvent::Failed {
                    error: e.to_string(),
                }));
                self.notify(Notification::failure("PDF export failed", e.to_string()));
            }
        }
        result
    }

    async fn run(
        &self,
        presentation: &Presentation,
        progress: &mut dyn FnMut(f32),
    ) -> Result<ExportedPdf> {
        let total = presentation.slides.len();
        if total == 0 {
            return Err(ExportError::EmptyPresentation(presentation.name.clone()));
        }
        let compression = self.options.effective_compression();
        tracing::info!(
            "Exporting '{}': {} slides at {} DPI, {} pages",
            presentation.name,
            total,
            self.options.quality.dpi(),
            self.options.layout
        );
        let _ = emit!(AppEvent::Export(ExportEvent::Started { slide_count: total }));

        let surface = SurfaceConfig::slide(self.options.quality.scale());
        let mut renderer = SlideRenderer::with_loader(surface, Arc::clone(&self.loader))?;
        let geometry = PageGeometry::new(self.options.layout, self.options.include_notes);
        let mut builder = PdfBuilder::new(&presentation.name);

        for (index, slide) in presentation.slides.iter().enumerate() {
            let number = index + 1;
            let report = renderer.preload_images(slide).await;
            if let Some(failure) = report.failed.first() {
                tracing::warn!(
                    "Slide {}: {} image(s) could not be loaded",
                    number,
                    report.failed.len()
                );
                return Err(ExportError::Image {
                    slide: number,
                    image: failure.source.clone(),
                    reason: failure.reason.clone(),
                });
            }
            renderer
                .render(slide, &ViewportState::identity(), &RenderOptions::default())
                .map_err(|source| ExportError::Render {
                    slide: number,
                    source,
                })?;
            let jpeg = renderer
                .encode_jpeg(compression.jpeg_quality())
                .map_err(|source| ExportError::Render {
                    slide: number,
                    source,
                })?;

            let notes = if self.options.include_notes {
                Some(slide.notes.as_str())
            } else {
                None
            };
            builder.add_page(
                &geometry,
                SlideImage {
                    jpeg,
                    width: renderer.pixel_width(),
                    height: renderer.pixel_height(),
                },
                notes,
            )?;

            let percent = number as f32 / total as f32 * 100.0;
            progress(percent);
            let _ = emit!(AppEvent::Export(ExportEvent::Progress { percent }));
            tracing::debug!("Slide {}/{} exported", number, total);
            tokio::task::yield_now().await;
        }

        renderer.clear_image_cache();
        let bytes = builder.finish(compression.compress_streams())?;
        Ok(ExportedPdf {
            file_name: pdf_file_name(&presentation.name),
            bytes,
            page_count: total,
        })
    }

    fn notify(&self, notification: Notification) {
        if let Some(sink) = &self.sink {
            sink.notify(notification);
        }
    }
}

struct SlideImage {
    jpeg: Vec<u8>,
    width: u32,
    height: u32,
}

/// Accumulates pages into a `lopdf` document.
struct PdfBuilder {
    doc: Document,
    pages_id: ObjectId,
    font_id: ObjectId,
    kids: Vec<Object>,
    title: String,
}

impl PdfBuilder {
    fn new(title: &str) -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        Self {
            doc,
            pages_id,
            font_id,
            kids: Vec::new(),
            title: title.to_string(),
        }
    }

    fn add_page(&mut self, geometry: &PageGeometry, image: SlideImage, notes: Option<&str>) -> Result<()> {
        let image_stream = Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => image.width as i64,
                "Height" => image.height as i64,
                "ColorSpace" => "DeviceRGB",
                "BitsPerComponent" => 8,
                "Filter" => "DCTDecode",
            },
            image.jpeg,
        )
        .with_compression(false);
        let image_id = self.doc.add_object(image_stream);

        let slide = geometry.slide;
        let mut operations = vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![
                    real(slide.width),
                    0.into(),
                    0.into(),
                    real(slide.height),
                    real(slide.x),
                    real(slide.y),
                ],
            ),
            Operation::new("Do", vec!["Im0".into()]),
            Operation::new("Q", vec![]),
        ];
        if let (Some(text), Some(band)) = (notes, geometry.notes) {
            operations.extend(notes_operations(text, &band));
        }

        let content = Content { operations }
            .encode()
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, content));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "MediaBox" => vec![0.into(), 0.into(), real(geometry.width), real(geometry.height)],
            "Contents" => content_id,
            "Resources" => dictionary! {
                "XObject" => dictionary! { "Im0" => image_id },
                "Font" => dictionary! { "F1" => self.font_id },
            },
        });
        self.kids.push(page_id.into());
        Ok(())
    }

    fn finish(mut self, compress: bool) -> Result<Vec<u8>> {
        let count = self.kids.len() as i64;
        self.doc.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => self.kids,
                "Count" => count,
            }),
        );
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        let info_id = self.doc.add_object(dictionary! {
            "Title" => Object::String(latin1(&self.title), StringFormat::Literal),
            "Producer" => Object::string_literal(PRODUCER),
            "CreationDate" => Object::string_literal(Utc::now().format("D:%Y%m%d%H%M%SZ").to_string()),
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.trailer.set("Info", info_id);
        if compress {
            self.doc.compress();
        }

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| ExportError::Pdf(e.to_string()))?;
        Ok(bytes)
    }
}

fn real(value: f64) -> Object {
    Object::Real(value as f32)
}

/// Text operations that set `text` inside `band`, one `Tj` per wrapped
/// line. Lines that do not fit the band are dropped.
fn notes_operations(text: &str, band: &PdfRect) -> Vec<Operation> {
    if text.trim().is_empty() {
        return Vec::new();
    }
    let char_width = (NOTES_FONT_SIZE * HELVETICA_AVG_WIDTH) as f32;
    let lines = wrap_lines(text, band.width as f32, |s| s.chars().count() as f32 * char_width);
    let max_lines = (band.height / NOTES_LINE_HEIGHT).floor().max(1.0) as usize;
    if lines.len() > max_lines {
        tracing::debug!("Notes truncated to {} lines", max_lines);
    }

    let mut ops = vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec!["F1".into(), real(NOTES_FONT_SIZE)]),
        Operation::new("TL", vec![real(NOTES_LINE_HEIGHT)]),
        Operation::new("Td", vec![real(band.x), real(band.top() - NOTES_FONT_SIZE)]),
    ];
    for (i, line) in lines.iter().take(max_lines).enumerate() {
        if i > 0 {
            ops.push(Operation::new("T*", vec![]));
        }
        ops.push(Operation::new(
            "Tj",
            vec![Object::String(latin1(&line.text), StringFormat::Literal)],
        ));
    }
    ops.push(Operation::new("ET", vec![]));
    ops
}

/// Latin-1 bytes for the standard PDF fonts; anything outside becomes `?`.
pub fn latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
