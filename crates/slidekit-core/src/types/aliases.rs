//! Type aliases for commonly used complex types.
//!
//! The editor core is single-threaded: views share the document store as
//! `Shared<T>`. Work handed to other threads (export encoding, async image
//! decode) uses the `ThreadSafe` forms.

use parking_lot::Mutex;
use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;

/// A reference-counted, interior-mutable wrapper for single-threaded sharing.
///
/// # Example
/// ```rust,ignore
/// let store: Shared<DocumentStore> = shared(DocumentStore::new());
/// store.borrow_mut().create_presentation("Deck");
/// ```
pub type Shared<T> = Rc<RefCell<T>>;

/// A thread-safe, mutex-protected wrapper for cross-thread sharing.
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// A progress callback receiving a percentage in `0.0..=100.0`.
pub type ProgressCallback = Box<dyn FnMut(f32)>;

/// A UI callback with a single parameter, replaceable at runtime.
pub type UiDataCallback<T> = Rc<RefCell<Option<Box<dyn Fn(T)>>>>;

/// Wraps a value as [`Shared`].
pub fn shared<T>(value: T) -> Shared<T> {
    Rc::new(RefCell::new(value))
}

/// Wraps a value as [`ThreadSafe`].
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}
