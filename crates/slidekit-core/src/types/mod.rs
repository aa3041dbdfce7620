//! Type system utilities and aliases.
//!
//! - [`aliases`]: Type aliases for `Rc<RefCell<T>>`, `Arc<Mutex<T>>` and callbacks.
//! - [`outcome`]: The `{success, data?, error?}` result value returned across
//!   collaborator boundaries.

pub mod aliases;
pub mod outcome;

pub use aliases::*;
pub use outcome::OperationResult;
