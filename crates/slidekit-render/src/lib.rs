//! # SlideKit Render
//!
//! Everything that turns slides into pixels:
//! - [`geometry`]: slide-space/screen-space mapping shared by every view
//! - [`renderer`]: the tiny-skia slide renderer bound to one surface
//! - [`image_loader`] and [`image_cache`]: async image fetch and decode
//! - [`font_manager`] and [`text`]: system fonts and text layout
//! - [`consumers`]: the editor canvas, thumbnail strip and notes panel
//! - [`url_validation`]: debounced probing of user-typed image URLs

pub mod consumers;
pub mod error;
pub mod font_manager;
pub mod geometry;
pub mod image_cache;
pub mod image_loader;
pub mod renderer;
pub mod text;
pub mod url_validation;

pub use consumers::{EditorCanvas, NotesPanel, Thumbnail, ThumbnailStrip};
pub use error::{RenderError, Result};
pub use geometry::{fit_zoom, to_screen, to_screen_rect, to_slide, ViewTransform, ViewportState};
pub use image_cache::{CachedImage, ImageCache};
pub use image_loader::{decode_data_url, decode_pixmap, load_pixmap, FsImageLoader, ImageLoader, MemoryImageLoader};
pub use renderer::{
    load_images, selection_handle_points, ImageFailure, PreloadReport, RenderOptions,
    SlideRenderer, SurfaceConfig, HANDLE_SIZE, MAX_SURFACE_SIDE,
};
pub use url_validation::{next_check, DebouncedValidator, UrlCheck, ValidationState};
