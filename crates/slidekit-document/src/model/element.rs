//! Slide elements: text boxes, images and vector shapes.

use serde::{Deserialize, Serialize};

use super::{Bounds, Color, ElementId, Point, Size};

/// Smallest width/height an element can be resized to.
pub const MIN_ELEMENT_SIZE: f64 = 1.0;

/// Horizontal text alignment inside a text box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Font selection for a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontSpec {
    /// Family name; empty, "Sans", "Serif" and "Monospace" select generic families.
    pub family: String,
    /// Font size in slide-space units.
    pub size: f64,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
}

impl Default for FontSpec {
    fn default() -> Self {
        Self {
            family: "Sans".to_string(),
            size: 24.0,
            bold: false,
            italic: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    pub content: String,
    #[serde(default)]
    pub font: FontSpec,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub align: TextAlign,
}

impl TextContent {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            font: FontSpec::default(),
            color: Color::BLACK,
            align: TextAlign::Left,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageContent {
    /// Source reference: a path, `file://` URL or `data:` URL.
    pub source: String,
    #[serde(default)]
    pub alt_text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeType {
    Rectangle,
    Ellipse,
    Triangle,
    Line,
    Arrow,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: Color,
    /// Stroke width in slide-space units.
    pub width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeContent {
    pub shape_type: ShapeType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
}

impl ShapeContent {
    pub fn filled(shape_type: ShapeType, fill: Color) -> Self {
        Self {
            shape_type,
            fill: Some(fill),
            stroke: None,
        }
    }

    pub fn outlined(shape_type: ShapeType, color: Color, width: f64) -> Self {
        Self {
            shape_type,
            fill: None,
            stroke: Some(Stroke { color, width }),
        }
    }
}

/// Variant-specific part of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Text(TextContent),
    Image(ImageContent),
    Shape(ShapeContent),
}

impl ElementKind {
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Text(_) => "text",
            ElementKind::Image(_) => "image",
            ElementKind::Shape(_) => "shape",
        }
    }
}

/// A positioned item on a slide.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ElementId,
    pub position: Point,
    #[serde(rename = "dimensions")]
    pub size: Size,
    /// Clockwise rotation in degrees about the element centre.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
    #[serde(flatten)]
    pub kind: ElementKind,
}

impl Element {
    pub fn new(bounds: Bounds, kind: ElementKind) -> Self {
        Self {
            id: ElementId::new(),
            position: Point::new(bounds.x, bounds.y),
            size: Size::new(
                bounds.width.max(MIN_ELEMENT_SIZE),
                bounds.height.max(MIN_ELEMENT_SIZE),
            ),
            rotation: None,
            kind,
        }
    }

    pub fn text(bounds: Bounds, content: impl Into<String>) -> Self {
        Self::new(bounds, ElementKind::Text(TextContent::new(content)))
    }

    pub fn image(bounds: Bounds, source: impl Into<String>) -> Self {
        Self::new(
            bounds,
            ElementKind::Image(ImageContent {
                source: source.into(),
                alt_text: String::new(),
            }),
        )
    }

    pub fn shape(bounds: Bounds, shape: ShapeContent) -> Self {
        Self::new(bounds, ElementKind::Shape(shape))
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = normalize_rotation(degrees);
        self
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(
            self.position.x,
            self.position.y,
            self.size.width,
            self.size.height,
        )
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    pub fn rotation_degrees(&self) -> f64 {
        self.rotation.unwrap_or(0.0)
    }

    /// Hit test in slide space, honouring rotation.
    pub fn contains_point(&self, p: &Point) -> bool {
        let local = match self.rotation {
            Some(deg) => {
                let c = self.center();
                let (sin, cos) = (-deg).to_radians().sin_cos();
                let dx = p.x - c.x;
                let dy = p.y - c.y;
                Point::new(c.x + dx * cos - dy * sin, c.y + dx * sin + dy * cos)
            }
            None => *p,
        };
        self.bounds().contains(&local)
    }

    /// Image source, if this is an image element.
    pub fn image_source(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Image(img) => Some(img.source.as_str()),
            _ => None,
        }
    }

    /// Returns a copy with `patch` applied.
    pub fn patched(&self, patch: &ElementPatch) -> Element {
        let mut next = self.clone();
        if let Some(position) = patch.position {
            next.position = position;
        }
        if let Some(size) = patch.size {
            next.size = Size::new(
                size.width.max(MIN_ELEMENT_SIZE),
                size.height.max(MIN_ELEMENT_SIZE),
            );
        }
        if let Some(rotation) = patch.rotation {
            next.rotation = normalize_rotation(rotation);
        }
        if let Some(kind) = &patch.kind {
            next.kind = kind.clone();
        }
        next
    }
}

/// Rotation of 0 (mod 360) is stored as `None`.
fn normalize_rotation(degrees: f64) -> Option<f64> {
    let r = degrees.rem_euclid(360.0);
    if r.abs() < f64::EPSILON || !r.is_finite() {
        None
    } else {
        Some(r)
    }
}

/// Partial update for an element. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub position: Option<Point>,
    pub size: Option<Size>,
    /// New rotation in degrees; 0 clears the rotation.
    pub rotation: Option<f64>,
    pub kind: Option<ElementKind>,
}

impl ElementPatch {
    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Point::new(x, y));
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.size = Some(Size::new(width, height));
        self
    }

    pub fn rotation(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn kind(mut self, kind: ElementKind) -> Self {
        self.kind = Some(kind);
        self
    }
}
