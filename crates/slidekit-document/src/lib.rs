//! # SlideKit Document
//!
//! The presentation data model and everything that owns or mutates it:
//! - [`model`]: presentations, slides, elements and their value types
//! - [`store`]: the document store, the only place edits happen
//! - [`history`]: bounded undo/redo over document snapshots
//! - [`editor`]: store plus history behind one labelled `apply`
//! - [`persistence`]: versioned JSON blobs behind a key/value store
//! - [`import`]: validation of user-supplied image files

pub mod editor;
pub mod error;
pub mod history;
pub mod import;
pub mod model;
pub mod persistence;
pub mod store;

pub use editor::Editor;
pub use error::{ImportError, StorageError, StorageResult};
pub use history::{HistoryStore, Snapshot};
pub use import::{ImageImporter, ImportResult, ImportedImage};
pub use model::{
    Background, Bounds, Color, Document, Element, ElementId, ElementKind, ElementPatch, FontSpec,
    ImageContent, Point, Presentation, PresentationId, PresentationPatch, ShapeContent, ShapeType,
    Size, Slide, SlideId, SlidePatch, Stroke, TextAlign, TextContent,
};
pub use persistence::{
    key_for_name, DirectoryStore, KeyValueStore, MemoryStore, PresentationFile,
    PresentationRepository, FORMAT_VERSION,
};
pub use store::{ChangeKind, DocumentStore, Selection, StoreChange, ZOrder};
