//! Stable identities for scene entities.
//!
//! Ids are opaque UUIDs assigned at creation and never reused, so they stay
//! valid while a layer is detached from the tree and waiting in a history
//! entry to be re-attached.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a layer in a document arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(Uuid);

impl LayerId {
    /// Create a new unique layer id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// The underlying UUID
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for LayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for LayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Layer({})", &self.0.to_string()[..8])
    }
}

/// Identity of a gradient resource in a document's swatch list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GradientId(Uuid);

impl GradientId {
    /// Create a new unique gradient id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GradientId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GradientId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Gradient({})", &self.0.to_string()[..8])
    }
}
