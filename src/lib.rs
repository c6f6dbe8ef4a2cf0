//! # Vectis
//!
//! Editing core for a vector-graphics authoring tool:
//! - Layer scene graph with groups, shapes, paths and text
//! - Affine transforms with exact decomposition and absolute/world queries
//! - Path node editing and exact de Casteljau subdivision
//! - Undoable, mergeable commands and a positional history
//!
//! ## Architecture
//!
//! Vectis is organized as a workspace of two library crates and this facade:
//!
//! 1. **vectis-core** - Ids, error types, the editor event bus and configuration
//! 2. **vectis-designer** - Geometry, the layer document, commands and history
//! 3. **vectis** - This facade, re-exporting both and owning logging setup

pub use vectis_core as core;
pub use vectis_designer as designer;

pub use vectis_core::{
    CommandError, ConfigError, EditorConfig, EditorEvent, Error, EventBus, EventCategory,
    EventFilter, GradientId, HistoryEvent, LayerId, PropertyKind, Result, SceneError, Severity,
    StructureEvent,
};

pub use vectis_designer::{
    Command, CommandMeta, Document, History, HistoryEntry, Layer, LayerKind, Target,
};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support (defaults to `info`)
///
/// Fails if a global subscriber is already installed.
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_thread_ids(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

    tracing::debug!("vectis {} logging initialized", VERSION);
    Ok(())
}
