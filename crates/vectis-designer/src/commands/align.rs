//! Alignment of several layers against their combined bounds.

use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use vectis_core::{CommandError, LayerId};

use super::{ensure_layers, layer_targets, not_applied, Command, CommandMeta, Target};
use crate::geometry::{translation, Bounds, Point, TransformComponents};
use crate::scene::{Document, GeometryResolver};

/// Edge or axis to align to. Document space is y-down, so `Top` is the
/// smallest y.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    CenterHorizontal,
    Right,
    Top,
    CenterVertical,
    Bottom,
}

impl Alignment {
    /// Offset that moves `bounds` onto the matching edge of `target`.
    pub fn delta(&self, bounds: &Bounds, target: &Bounds) -> Point {
        match self {
            Alignment::Left => Point::new(target.min_x - bounds.min_x, 0.0),
            Alignment::Right => Point::new(target.max_x - bounds.max_x, 0.0),
            Alignment::CenterHorizontal => Point::new(target.center().x - bounds.center().x, 0.0),
            Alignment::Top => Point::new(0.0, target.min_y - bounds.min_y),
            Alignment::Bottom => Point::new(0.0, target.max_y - bounds.max_y),
            Alignment::CenterVertical => Point::new(0.0, target.center().y - bounds.center().y),
        }
    }
}

/// Translate each target so its world bounds line up with the union of all
/// targets' world bounds.
pub struct AlignCommand {
    meta: CommandMeta,
    targets: Vec<LayerId>,
    alignment: Alignment,
    resolver: Arc<dyn GeometryResolver + Send + Sync>,
    previous: Option<Vec<TransformComponents>>,
}

impl AlignCommand {
    pub fn new(
        targets: Vec<LayerId>,
        alignment: Alignment,
        resolver: Arc<dyn GeometryResolver + Send + Sync>,
    ) -> Self {
        Self {
            meta: CommandMeta::new(format!("Align {:?}", alignment)),
            targets,
            alignment,
            resolver,
            previous: None,
        }
    }
}

impl std::fmt::Debug for AlignCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignCommand")
            .field("meta", &self.meta)
            .field("targets", &self.targets)
            .field("alignment", &self.alignment)
            .finish()
    }
}

impl Command for AlignCommand {
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

        let mut bounds = Vec::with_capacity(self.targets.len());
        for id in &self.targets {
            bounds.push(doc.world_bounds(*id, self.resolver.as_ref())?);
        }
        let union = bounds
            .iter()
            .filter(|b| !b.is_empty())
            .copied()
            .reduce(|a, b| a.union(&b));

        let mut previous = Vec::with_capacity(self.targets.len());
        for (id, b) in self.targets.iter().zip(&bounds) {
            let delta = match union {
                Some(target) if !b.is_empty() => self.alignment.delta(b, &target),
                _ => Point::ZERO,
            };
            previous.push(doc.apply_transform(*id, None, Some(&translation(delta)))?);
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

    fn as_any(&self) -> &dyn Any {
        self
    }
}
