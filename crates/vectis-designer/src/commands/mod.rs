//! Undoable editing commands.
//!
//! Every mutation an interactive tool makes goes through a [`Command`] pushed
//! into [`History`](crate::history::History). Commands capture whatever they
//! need on `apply` so that `revert` restores the prior state exactly.

use chrono::{DateTime, Utc};
use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};
use vectis_core::{CommandError, GradientId, LayerId};

use crate::scene::Document;

mod align;
mod compound;
mod convert;
mod gradient;
mod layer;
mod paint;
mod path;
mod subdivide;
mod transform;
mod z_index;

pub use align::{AlignCommand, Alignment};
pub use compound::CompoundCommand;
pub use convert::ConvertToPathCommand;
pub use gradient::{GradientOperation, ModifyGradientCommand};
pub use layer::{AddLayerCommand, GroupCommand, RemoveLayerCommand, UngroupCommand};
pub use paint::{ApplyFillCommand, ApplyPaintCommand, ApplyStrokeCommand, FillSlot, PaintSlot, StrokeSlot};
pub use path::{ModifyPathCommand, PathOperation};
pub use subdivide::SubdividePathCommand;
pub use transform::TransformCommand;
pub use z_index::ChangeZIndexCommand;

// Single counter for every command in the process; 0 means "no command".
static NEXT_COMMAND_ID: AtomicU64 = AtomicU64::new(1);

/// Allocate the next command id.
pub fn next_command_id() -> u64 {
    NEXT_COMMAND_ID.fetch_add(1, Ordering::SeqCst)
}

/// Identity, creation time and label of a command.
///
/// The id doubles as the history position reached once the command is applied.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandMeta {
    pub id: u64,
    pub time: DateTime<Utc>,
    pub description: String,
}

impl CommandMeta {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            id: next_command_id(),
            time: Utc::now(),
            description: description.into(),
        }
    }
}

/// Something a command mutates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Layer(LayerId),
    Gradient(GradientId),
}

/// An undoable edit.
pub trait Command: Send + std::fmt::Debug {
    fn meta(&self) -> &CommandMeta;

    fn meta_mut(&mut self) -> &mut CommandMeta;

    /// Layers and resources this command mutates, in order.
    fn targets(&self) -> Vec<Target>;

    /// Do.
    fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError>;

    /// Undo.
    fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError>;

    /// Coalesce `next` (already applied) into a single replacement entry.
    ///
    /// `None` means the two stay separate.
    fn merge(&self, _next: &dyn Command) -> Option<Box<dyn Command>> {
        None
    }

    /// Layers this command may attach again on a later apply or revert.
    ///
    /// While the command is recorded these stay in the arena even when
    /// detached.
    fn retained_layers(&self) -> Vec<LayerId> {
        self.targets()
            .into_iter()
            .filter_map(|target| match target {
                Target::Layer(id) => Some(id),
                Target::Gradient(_) => None,
            })
            .collect()
    }

    fn as_any(&self) -> &dyn Any;

    fn id(&self) -> u64 {
        self.meta().id
    }

    fn description(&self) -> &str {
        &self.meta().description
    }
}

/// Whether two commands have the same concrete type.
pub fn same_kind(a: &dyn Command, b: &dyn Command) -> bool {
    <dyn Any>::type_id(a.as_any()) == <dyn Any>::type_id(b.as_any())
}

pub(crate) fn downcast<T: 'static>(command: &dyn Command) -> Option<&T> {
    command.as_any().downcast_ref::<T>()
}

pub(crate) fn layer_targets(ids: &[LayerId]) -> Vec<Target> {
    ids.iter().copied().map(Target::Layer).collect()
}

pub(crate) fn not_applied(meta: &CommandMeta) -> CommandError {
    CommandError::NotApplied {
        description: meta.description.clone(),
    }
}

/// Fail before any mutation if one of `ids` is missing.
pub(crate) fn ensure_layers(doc: &Document, ids: &[LayerId]) -> Result<(), CommandError> {
    for id in ids {
        doc.layer(*id)?;
    }
    Ok(())
}
