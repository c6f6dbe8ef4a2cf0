//! Error handling for Vectis
//!
//! Provides the error types for every layer of the editing core:
//! - Scene errors (tree ownership and lookup preconditions)
//! - Command errors (domain errors raised while applying an edit)
//! - Configuration errors (loading and validating editor settings)
//!
//! All error types use `thiserror` for ergonomic error handling.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{GradientId, LayerId};

/// Scene graph error type
///
/// Precondition violations on the layer tree. These surface at the call
/// site; callers do not attempt partial rollback.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    /// No layer with this id exists in the document arena
    #[error("Layer {id} not found")]
    LayerNotFound {
        /// The id that failed to resolve.
        id: LayerId,
    },

    /// The layer already has a parent and must be removed first
    #[error("Layer {child} already has parent {parent}")]
    AlreadyParented {
        /// The layer being inserted.
        child: LayerId,
        /// Its current parent.
        parent: LayerId,
    },

    /// The layer is not a child of the group it is being removed from
    #[error("Layer {child} is not a child of {parent}")]
    NotAChild {
        /// The layer being removed.
        child: LayerId,
        /// The group the caller expected to own it.
        parent: LayerId,
    },

    /// The target layer cannot hold children
    #[error("Layer {id} is not a container")]
    NotAContainer {
        /// The non-group layer.
        id: LayerId,
    },

    /// Inserting the layer would make it its own ancestor
    #[error("Adding {child} under {parent} would create a cycle")]
    CycleDetected {
        /// The layer being inserted.
        child: LayerId,
        /// The prospective parent.
        parent: LayerId,
    },

    /// An index was outside the valid range of a collection
    #[error("Index {index} out of range (len: {len})")]
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The collection length.
        len: usize,
    },

    /// The layer has the wrong variant for the requested operation
    #[error("Layer {id} is a {actual} layer, expected {expected}")]
    WrongLayerKind {
        /// The layer id.
        id: LayerId,
        /// The variant the operation needs.
        expected: String,
        /// The variant the layer actually has.
        actual: String,
    },

    /// No gradient with this id exists in the swatch list
    #[error("Gradient {id} not found")]
    GradientNotFound {
        /// The id that failed to resolve.
        id: GradientId,
    },

    /// A transform could not be inverted
    #[error("Transform is not invertible")]
    SingularTransform,
}

/// Command error type
///
/// Domain errors raised by a concrete command while it applies or reverts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    /// The command does not support this operation on its target
    #[error("Unsupported operation '{operation}': {reason}")]
    UnsupportedOperation {
        /// The operation name.
        operation: String,
        /// Why it cannot be applied.
        reason: String,
    },

    /// The geometry resolver could not produce geometry for a layer
    #[error("No geometry available for layer {id}")]
    GeometryUnavailable {
        /// The layer without geometry.
        id: LayerId,
    },

    /// A command argument was invalid
    #[error("Invalid argument: {reason}")]
    InvalidArgument {
        /// Description of the problem.
        reason: String,
    },

    /// Revert was requested for a command that has not been applied
    #[error("Command '{description}' has not been applied")]
    NotApplied {
        /// The command description.
        description: String,
    },

    /// A scene precondition failed inside the command
    #[error(transparent)]
    Scene(#[from] SceneError),
}

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file format is not supported
    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    /// A configuration value is invalid
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting {
        /// The setting name.
        key: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error("TOML error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

/// Main error type for Vectis
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Scene graph error
    #[error(transparent)]
    Scene(#[from] SceneError),

    /// Command error
    #[error(transparent)]
    Command(#[from] CommandError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a precondition violation on the scene graph
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            Error::Scene(_) | Error::Command(CommandError::Scene(_))
        )
    }

    /// Check if this is a domain error raised by a command
    pub fn is_command_error(&self) -> bool {
        matches!(self, Error::Command(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

/// Severity attached to user-visible status notifications
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    /// Informational message.
    Info,
    /// Something was skipped or adjusted.
    Warning,
    /// An edit was rejected.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}
