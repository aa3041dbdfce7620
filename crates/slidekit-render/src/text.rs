//! Text layout for text elements.
//!
//! Text is wrapped greedily at word boundaries inside the element box and
//! turned into vector outlines, so it scales with the view like every other
//! element instead of being rasterised at a fixed size.

use rusttype::{point, Font, OutlineBuilder, Scale};
use slidekit_document::{Bounds, TextAlign};
use tiny_skia::{Path, PathBuilder};

/// One laid-out line.
#[derive(Debug, Clone, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub width: f32,
}

/// Splits `text` into lines no wider than `max_width` according to
/// `measure`. Explicit newlines always break; a single word wider than the
/// box gets a line of its own rather than being split.
pub fn wrap_lines<F>(text: &str, max_width: f32, measure: F) -> Vec<TextLine>
where
    F: Fn(&str) -> f32,
{
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measure(&candidate) <= max_width {
                current = candidate;
            } else {
                let width = measure(&current);
                lines.push(TextLine {
                    text: std::mem::take(&mut current),
                    width,
                });
                current.push_str(word);
            }
        }
        let width = measure(&current);
        lines.push(TextLine {
            text: current,
            width,
        });
    }
    lines
}

/// Advance width of `text` at `scale`.
pub fn measure(font: &Font<'_>, scale: Scale, text: &str) -> f32 {
    font.layout(text, scale, point(0.0, 0.0))
        .last()
        .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
        .unwrap_or(0.0)
}

struct SkiaOutline<'a>(&'a mut PathBuilder);

impl OutlineBuilder for SkiaOutline<'_> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        self.0.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.0.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.0.close();
    }
}

/// Builds one path holding every glyph of `text`, wrapped inside `bounds`.
/// Coordinates are slide space. Returns `None` for blank text.
pub fn layout_path(
    font: &Font<'_>,
    size: f64,
    text: &str,
    bounds: &Bounds,
    align: TextAlign,
) -> Option<Path> {
    let scale = Scale::uniform(size as f32);
    let v_metrics = font.v_metrics(scale);
    let line_height = v_metrics.ascent - v_metrics.descent + v_metrics.line_gap;
    let box_width = bounds.width as f32;

    let lines = wrap_lines(text, box_width, |s| measure(font, scale, s));

    let mut pb = PathBuilder::new();
    let mut baseline = bounds.y as f32 + v_metrics.ascent;
    for line in &lines {
        let offset = match align {
            TextAlign::Left => 0.0,
            TextAlign::Center => (box_width - line.width) / 2.0,
            TextAlign::Right => box_width - line.width,
        };
        let start = point(bounds.x as f32 + offset, baseline);
        for glyph in font.layout(&line.text, scale, start) {
            glyph.build_outline(&mut SkiaOutline(&mut pb));
        }
        baseline += line_height;
    }
    pb.finish()
}
