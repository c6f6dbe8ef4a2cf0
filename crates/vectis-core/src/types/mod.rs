//! Type system utilities and aliases.
//!
//! ## Modules
//!
//! - [`aliases`]: Type aliases for `Arc<Mutex<T>>` and `Arc<RwLock<T>>`.
//! - [`ids`]: Stable identities for layers and gradient resources.

pub mod aliases;
pub mod ids;

pub use aliases::*;
pub use ids::*;
