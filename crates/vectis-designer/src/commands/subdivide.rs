use std::any::Any;
use vectis_core::{CommandError, LayerId, SceneError};

use super::{not_applied, Command, CommandMeta, Target};
use crate::geometry::{plan_subdivision, renumber, PathNode, SegmentShape};
use crate::scene::Document;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Originals {
    left: PathNode,
    right: PathNode,
}

/// Insert a node at the parametric midpoint of the segment starting at
/// node `edge`, preserving the curve's shape.
#[derive(Debug)]
pub struct SubdividePathCommand {
    meta: CommandMeta,
    path: LayerId,
    edge: usize,
    shape: Option<SegmentShape>,
    originals: Option<Originals>,
}

impl SubdividePathCommand {
    pub fn new(path: LayerId, edge: usize) -> Self {
        Self {
            meta: CommandMeta::new("Subdivide segment"),
            path,
            edge,
            shape: None,
            originals: None,
        }
    }

    /// Shape of the split segment (known once applied).
    pub fn shape(&self) -> Option<SegmentShape> {
        self.shape
    }
}

impl Command for SubdividePathCommand {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn targets(&self) -> Vec<Target> {
        vec![Target::Layer(self.path)]
    }

    fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        let layer = doc.layer(self.path)?;
        let nodes = layer.nodes().ok_or_else(|| SceneError::WrongLayerKind {
            id: self.path,
            expected: "path".to_string(),
            actual: layer.kind().name().to_string(),
        })?;
        let plan = plan_subdivision(nodes, self.edge)?;
        let originals = Originals {
            left: nodes[self.edge],
            right: nodes[self.edge + 1],
        };

        let edge = self.edge;
        doc.edit_nodes(self.path, |nodes| {
            nodes[edge] = plan.left;
            nodes[edge + 1] = plan.right;
            nodes.insert(edge + 1, plan.middle);
            renumber(nodes, edge);
        })?;

        tracing::debug!(path = %self.path, edge, shape = ?plan.shape, "Subdivided segment");
        self.shape = Some(plan.shape);
        self.originals = Some(originals);
        Ok(())
    }

    fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        let originals = self.originals.take().ok_or_else(|| not_applied(&self.meta))?;
        let edge = self.edge;
        doc.edit_nodes(self.path, |nodes| {
            nodes.remove(edge + 1);
            nodes[edge] = originals.left;
            nodes[edge + 1] = originals.right;
            renumber(nodes, edge);
        })?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
