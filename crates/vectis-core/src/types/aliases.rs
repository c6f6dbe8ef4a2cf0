//! Type aliases for shared ownership across threads.
//!
//! The editing core mutates documents on a single logical edit thread, but
//! render caches and selection trackers read from other threads. Sharing a
//! document goes through these aliases so the locking primitive is chosen in
//! one place.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vectis_core::types::*;
//!
//! // Instead of: Arc<parking_lot::RwLock<Document>>
//! let doc: ThreadSafeRw<Document> = thread_safe_rw(Document::new());
//! doc.write().set_opacity(id, 0.5)?;
//! ```

use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// A thread-safe, mutex-protected wrapper for cross-thread sharing.
///
/// Uses `parking_lot::Mutex` for better performance than `std::sync::Mutex`.
pub type ThreadSafe<T> = Arc<Mutex<T>>;

/// A thread-safe read-write lock for read-heavy shared state.
///
/// The write guard is the per-document exclusive lock under which commands
/// mutate layers; readers take the read guard to enumerate layer properties.
pub type ThreadSafeRw<T> = Arc<RwLock<T>>;

/// Create a new `ThreadSafe<T>` from a value.
#[inline]
pub fn thread_safe<T>(value: T) -> ThreadSafe<T> {
    Arc::new(Mutex::new(value))
}

/// Create a new `ThreadSafeRw<T>` from a value.
#[inline]
pub fn thread_safe_rw<T>(value: T) -> ThreadSafeRw<T> {
    Arc::new(RwLock::new(value))
}
