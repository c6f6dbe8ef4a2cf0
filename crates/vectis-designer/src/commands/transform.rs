//! Affine transform edits.

use std::any::Any;
use vectis_core::{CommandError, LayerId};

use super::{downcast, ensure_layers, layer_targets, not_applied, Command, CommandMeta, Target};
use crate::geometry::{translation, Matrix, Point, TransformComponents};
use crate::scene::Document;

/// Apply a local and/or global matrix to several layers.
///
/// Undo restores the captured components, so it is exact even where
/// decomposition is lossy.
#[derive(Debug)]
pub struct TransformCommand {
    meta: CommandMeta,
    targets: Vec<LayerId>,
    local: Option<Matrix>,
    global: Option<Matrix>,
    previous: Option<Vec<TransformComponents>>,
}

impl TransformCommand {
    pub fn new(targets: Vec<LayerId>, local: Option<Matrix>, global: Option<Matrix>) -> Self {
        Self {
            meta: CommandMeta::new("Transform"),
            targets,
            local,
            global,
            previous: None,
        }
    }

    /// Transform composed after each layer's own transform.
    pub fn local(targets: Vec<LayerId>, matrix: Matrix) -> Self {
        Self::new(targets, Some(matrix), None)
    }

    /// Transform applied in document space.
    pub fn global(targets: Vec<LayerId>, matrix: Matrix) -> Self {
        Self::new(targets, None, Some(matrix))
    }

    /// Move layers by a document-space offset.
    pub fn translate(targets: Vec<LayerId>, delta: Point) -> Self {
        let mut command = Self::global(targets, translation(delta));
        command.meta.description = "Move".to_string();
        command
    }

    pub fn local_matrix(&self) -> Option<&Matrix> {
        self.local.as_ref()
    }

    pub fn global_matrix(&self) -> Option<&Matrix> {
        self.global.as_ref()
    }
}

impl Command for TransformCommand {
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
        let mut previous = Vec::with_capacity(self.targets.len());
        for id in &self.targets {
            previous.push(doc.apply_transform(*id, self.local.as_ref(), self.global.as_ref())?);
        }
        self.previous = Some(previous);
        Ok(())
    }

    fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        let previous = self.previous.take().ok_or_else(|| not_applied(&self.meta))?;
        for (id, transform) in self.targets.iter().zip(previous).rev() {
            doc.set_transform(*id, transform)?;
        }
        Ok(())
    }

    /// Same targets and the same single matrix slot compose into one entry.
    fn merge(&self, next: &dyn Command) -> Option<Box<dyn Command>> {
        let next = downcast::<Self>(next)?;
        if next.targets != self.targets {
            return None;
        }
        let (local, global) = match (self.local, self.global, next.local, next.global) {
            (Some(a), None, Some(b), None) => (Some(a.then(&b)), None),
            (None, Some(a), None, Some(b)) => (None, Some(a.then(&b))),
            _ => return None,
        };
        Some(Box::new(Self {
            meta: next.meta.clone(),
            targets: self.targets.clone(),
            local,
            global,
            previous: self.previous.clone(),
        }))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
