//! Z-order changes within a group.

use std::any::Any;
use vectis_core::{CommandError, LayerId};

use super::{downcast, ensure_layers, layer_targets, Command, CommandMeta, Target};
use crate::scene::Document;

/// Move layers within their siblings by `delta`, clamped to the group.
#[derive(Debug)]
pub struct ChangeZIndexCommand {
    meta: CommandMeta,
    targets: Vec<LayerId>,
    /// One entry per coalesced request, replayed in order.
    deltas: Vec<i64>,
    /// Moves actually made, in order: (layer, applied delta).
    applied: Vec<(LayerId, i64)>,
}

impl ChangeZIndexCommand {
    pub fn new(targets: Vec<LayerId>, delta: i64) -> Self {
        let description = if delta > 0 {
            "Bring forward"
        } else {
            "Send backward"
        };
        Self {
            meta: CommandMeta::new(description),
            targets,
            deltas: vec![delta],
            applied: Vec::new(),
        }
    }

    /// Net requested delta.
    pub fn delta(&self) -> i64 {
        self.deltas.iter().sum()
    }

    fn shift(&mut self, doc: &mut Document, delta: i64) -> Result<(), CommandError> {
        let mut placed = Vec::with_capacity(self.targets.len());
        for id in &self.targets {
            let (_, index) = doc
                .child_index(*id)
                .ok_or_else(|| CommandError::InvalidArgument {
                    reason: format!("{} is not attached to a group", id),
                })?;
            placed.push((*id, index));
        }

        // The leading layer moves first so followers do not jump over it.
        if delta > 0 {
            placed.sort_by(|a, b| b.1.cmp(&a.1));
        } else {
            placed.sort_by(|a, b| a.1.cmp(&b.1));
        }

        for (id, _) in placed {
            let Some((parent, from)) = doc.child_index(id) else {
                continue;
            };
            let len = doc.children(parent)?.len() as i64;
            let to = (from as i64 + delta).clamp(0, len - 1);
            doc.move_child(parent, from, to as usize)?;
            self.applied.push((id, to - from as i64));
        }
        Ok(())
    }
}

impl Command for ChangeZIndexCommand {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn targets(&self) -> Vec<Target> {
        layer_targets(&self.targets)
    }

    fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        ensure_layers(doc, &self.targets)?;
        self.applied.clear();
        for delta in self.deltas.clone() {
            self.shift(doc, delta)?;
        }
        Ok(())
    }

    fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        for (id, moved) in std::mem::take(&mut self.applied).into_iter().rev() {
            let (parent, index) =
                doc.child_index(id)
                    .ok_or_else(|| CommandError::InvalidArgument {
                        reason: format!("{} is not attached to a group", id),
                    })?;
            let back = (index as i64 - moved).max(0) as usize;
            doc.move_child(parent, index, back)?;
        }
        Ok(())
    }

    /// Same targets chain their moves.
    fn merge(&self, next: &dyn Command) -> Option<Box<dyn Command>> {
        let next = downcast::<Self>(next)?;
        if next.targets != self.targets {
            return None;
        }
        let mut applied = self.applied.clone();
        applied.extend(next.applied.iter().copied());
        let mut deltas = self.deltas.clone();
        deltas.extend(next.deltas.iter().copied());
        Some(Box::new(Self {
            meta: next.meta.clone(),
            targets: self.targets.clone(),
            deltas,
            applied,
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
