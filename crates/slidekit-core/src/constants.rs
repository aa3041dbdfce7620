//! Shared constants for slide-space geometry and editor defaults.

/// Logical slide width in slide-space units.
pub const SLIDE_WIDTH: f64 = 960.0;

/// Logical slide height in slide-space units.
pub const SLIDE_HEIGHT: f64 = 540.0;

/// Slide aspect ratio (16:9).
pub const SLIDE_ASPECT: f64 = SLIDE_WIDTH / SLIDE_HEIGHT;

/// Default number of undo snapshots kept before the oldest is evicted.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Smallest zoom the viewport helpers accept.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest zoom the viewport helpers accept.
pub const MAX_ZOOM: f64 = 10.0;

/// Multiplicative zoom step for zoom in/out.
pub const ZOOM_STEP: f64 = 1.2;

/// Grid spacing in slide-space units.
pub const DEFAULT_GRID_SIZE: f64 = 20.0;

/// Finest grid spacing accepted, in slide-space units.
pub const MIN_GRID_SIZE: f64 = 1.0;

/// Scale used by the thumbnail strip (192x108 pixels per slide).
pub const DEFAULT_THUMBNAIL_SCALE: f64 = 0.2;

/// Largest image accepted by the importer, in bytes.
pub const MAX_IMAGE_IMPORT_BYTES: usize = 10 * 1024 * 1024;

/// Debounce delay applied to image URL validation, in milliseconds.
pub const DEFAULT_VALIDATION_DEBOUNCE_MS: u64 = 500;

/// Padding used when fitting the slide into a view (fraction per side).
pub const VIEW_PADDING: f64 = 0.05;
