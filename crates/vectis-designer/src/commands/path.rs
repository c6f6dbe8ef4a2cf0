//! Node-level path edits.

use std::any::Any;
use vectis_core::{CommandError, LayerId, SceneError};

use super::{downcast, not_applied, Command, CommandMeta, Target};
use crate::geometry::{renumber, FigureEnd, PathNode, Point};
use crate::scene::Document;

/// One edit of a path layer's node list.
#[derive(Debug, Clone, PartialEq)]
pub enum PathOperation {
    /// Insert nodes at `index`; a figure-end tag on the node before moves to
    /// the last inserted node.
    Add { index: usize, nodes: Vec<PathNode> },
    /// Delete nodes. A removed figure-end tag moves to the new predecessor,
    /// which is also shifted by `delta`.
    Remove { indices: Vec<usize>, delta: Point },
    Move { indices: Vec<usize>, delta: Point },
    MoveInHandle { indices: Vec<usize>, delta: Point },
    MoveOutHandle { indices: Vec<usize>, delta: Point },
    EndFigureClosed { indices: Vec<usize>, delta: Point },
    EndFigureOpen { indices: Vec<usize>, delta: Point },
}

impl PathOperation {
    pub fn name(&self) -> &'static str {
        match self {
            PathOperation::Add { .. } => "Add node",
            PathOperation::Remove { .. } => "Remove node",
            PathOperation::Move { .. } => "Move node",
            PathOperation::MoveInHandle { .. } => "Move in handle",
            PathOperation::MoveOutHandle { .. } => "Move out handle",
            PathOperation::EndFigureClosed { .. } => "Close figure",
            PathOperation::EndFigureOpen { .. } => "Open figure",
        }
    }

    fn check(&self, len: usize) -> Result<(), SceneError> {
        match self {
            PathOperation::Add { index, .. } if *index > len => {
                Err(SceneError::IndexOutOfRange { index: *index, len })
            }
            PathOperation::Add { .. } => Ok(()),
            PathOperation::Remove { indices, .. }
            | PathOperation::Move { indices, .. }
            | PathOperation::MoveInHandle { indices, .. }
            | PathOperation::MoveOutHandle { indices, .. }
            | PathOperation::EndFigureClosed { indices, .. }
            | PathOperation::EndFigureOpen { indices, .. } => {
                match indices.iter().find(|i| **i >= len) {
                    Some(index) => Err(SceneError::IndexOutOfRange { index: *index, len }),
                    None => Ok(()),
                }
            }
        }
    }
}

/// A node removed by [`PathOperation::Remove`].
#[derive(Debug, Clone, PartialEq)]
struct RemovedNode {
    index: usize,
    node: PathNode,
    /// Predecessor as it was before it inherited the figure-end tag.
    predecessor: Option<PathNode>,
}

/// What revert needs for one operation.
#[derive(Debug, Clone, PartialEq)]
enum PathUndo {
    Added {
        index: usize,
        count: usize,
        moved_tag: Option<FigureEnd>,
    },
    Removed(Vec<RemovedNode>),
    Negate,
    Tags(Vec<(usize, Option<FigureEnd>)>),
}

fn apply_operation(nodes: &mut Vec<PathNode>, operation: &PathOperation) -> PathUndo {
    match operation {
        PathOperation::Add { index, nodes: new } => {
            let index = *index;
            let mut moved_tag = None;
            if index > 0 && !new.is_empty() {
                moved_tag = nodes[index - 1].end.take();
            }
            nodes.splice(index..index, new.iter().copied());
            if let Some(tag) = moved_tag {
                nodes[index + new.len() - 1].end = Some(tag);
            }
            renumber(nodes, index);
            PathUndo::Added {
                index,
                count: new.len(),
                moved_tag,
            }
        }
        PathOperation::Remove { indices, delta } => {
            let mut order = indices.clone();
            order.sort_unstable_by(|a, b| b.cmp(a));
            order.dedup();

            let mut removed = Vec::with_capacity(order.len());
            for index in order {
                let node = nodes.remove(index);
                let mut predecessor = None;
                if let (Some(tag), Some(prev)) =
                    (node.end, index.checked_sub(1).and_then(|i| nodes.get_mut(i)))
                {
                    predecessor = Some(*prev);
                    prev.end = Some(tag);
                    prev.translate(*delta);
                }
                removed.push(RemovedNode {
                    index,
                    node,
                    predecessor,
                });
            }
            renumber(nodes, 0);
            PathUndo::Removed(removed)
        }
        PathOperation::Move { indices, delta } => {
            for i in indices {
                nodes[*i].translate(*delta);
            }
            PathUndo::Negate
        }
        PathOperation::MoveInHandle { indices, delta } => {
            for i in indices {
                if let Some(h) = nodes[*i].incoming.as_mut() {
                    *h += *delta;
                }
            }
            PathUndo::Negate
        }
        PathOperation::MoveOutHandle { indices, delta } => {
            for i in indices {
                if let Some(h) = nodes[*i].outgoing.as_mut() {
                    *h += *delta;
                }
            }
            PathUndo::Negate
        }
        PathOperation::EndFigureClosed { indices, delta }
        | PathOperation::EndFigureOpen { indices, delta } => {
            let tag = if matches!(operation, PathOperation::EndFigureClosed { .. }) {
                FigureEnd::Closed
            } else {
                FigureEnd::Open
            };
            let mut prior = Vec::with_capacity(indices.len());
            for i in indices {
                let node = &mut nodes[*i];
                prior.push((*i, node.end.replace(tag)));
                node.translate(*delta);
            }
            PathUndo::Tags(prior)
        }
    }
}

fn revert_operation(nodes: &mut Vec<PathNode>, operation: &PathOperation, undo: PathUndo) {
    match (undo, operation) {
        (
            PathUndo::Added {
                index,
                count,
                moved_tag,
            },
            _,
        ) => {
            let end = (index + count).min(nodes.len());
            nodes.drain(index..end);
            if let Some(tag) = moved_tag {
                if let Some(prev) = nodes.get_mut(index - 1) {
                    prev.end = Some(tag);
                }
            }
            renumber(nodes, index.saturating_sub(1));
        }
        (PathUndo::Removed(removed), _) => {
            for r in removed.into_iter().rev() {
                if let Some(original) = r.predecessor {
                    nodes[r.index - 1] = original;
                }
                nodes.insert(r.index, r.node);
            }
            renumber(nodes, 0);
        }
        (PathUndo::Negate, PathOperation::Move { indices, delta }) => {
            apply_operation(
                nodes,
                &PathOperation::Move {
                    indices: indices.clone(),
                    delta: -*delta,
                },
            );
        }
        (PathUndo::Negate, PathOperation::MoveInHandle { indices, delta }) => {
            apply_operation(
                nodes,
                &PathOperation::MoveInHandle {
                    indices: indices.clone(),
                    delta: -*delta,
                },
            );
        }
        (PathUndo::Negate, PathOperation::MoveOutHandle { indices, delta }) => {
            apply_operation(
                nodes,
                &PathOperation::MoveOutHandle {
                    indices: indices.clone(),
                    delta: -*delta,
                },
            );
        }
        (
            PathUndo::Tags(prior),
            PathOperation::EndFigureClosed { delta, .. } | PathOperation::EndFigureOpen { delta, .. },
        ) => {
            for (i, tag) in prior.into_iter().rev() {
                let node = &mut nodes[i];
                node.translate(-*delta);
                node.end = tag;
            }
        }
        _ => {}
    }
}

/// Edit the node list of one path layer.
///
/// Holds a sequence of operations (one unless built by merging); they apply
/// in order and revert in reverse.
#[derive(Debug)]
pub struct ModifyPathCommand {
    meta: CommandMeta,
    path: LayerId,
    operations: Vec<PathOperation>,
    undo: Option<Vec<PathUndo>>,
}

impl ModifyPathCommand {
    pub fn new(path: LayerId, operation: PathOperation) -> Self {
        Self {
            meta: CommandMeta::new(operation.name()),
            path,
            operations: vec![operation],
            undo: None,
        }
    }

    pub fn operations(&self) -> &[PathOperation] {
        &self.operations
    }

    fn merged(&self, next: &Self, operations: Vec<PathOperation>, undo: Option<Vec<PathUndo>>) -> Box<dyn Command> {
        Box::new(Self {
            meta: next.meta.clone(),
            path: self.path,
            operations,
            undo,
        })
    }
}

impl Command for ModifyPathCommand {
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
        let Some(nodes) = layer.nodes() else {
            return Err(SceneError::WrongLayerKind {
                id: self.path,
                expected: "path".to_string(),
                actual: layer.kind().name().to_string(),
            }
            .into());
        };
        if let [operation] = self.operations.as_slice() {
            operation.check(nodes.len())?;
        }

        let operations = &self.operations;
        let undo = doc.edit_nodes(self.path, |nodes| {
            let mut undo = Vec::with_capacity(operations.len());
            for operation in operations {
                operation.check(nodes.len())?;
                undo.push(apply_operation(nodes, operation));
            }
            Ok::<_, SceneError>(undo)
        })??;
        self.undo = Some(undo);
        Ok(())
    }

    fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        let undo = self.undo.take().ok_or_else(|| not_applied(&self.meta))?;
        let operations = &self.operations;
        doc.edit_nodes(self.path, |nodes| {
            for (operation, undo) in operations.iter().zip(undo).rev() {
                revert_operation(nodes, operation, undo);
            }
        })?;
        Ok(())
    }

    fn merge(&self, next: &dyn Command) -> Option<Box<dyn Command>> {
        let next = downcast::<Self>(next)?;
        if next.path != self.path {
            return None;
        }
        let ([mine], [theirs]) = (self.operations.as_slice(), next.operations.as_slice()) else {
            // merged removals keep concatenating
            return match (self.operations.first(), next.operations.as_slice()) {
                (Some(PathOperation::Remove { .. }), [PathOperation::Remove { .. }])
                    if self
                        .operations
                        .iter()
                        .all(|op| matches!(op, PathOperation::Remove { .. })) =>
                {
                    let mut operations = self.operations.clone();
                    operations.extend(next.operations.iter().cloned());
                    let undo = concat_undo(&self.undo, &next.undo);
                    Some(self.merged(next, operations, undo))
                }
                _ => None,
            };
        };

        match (mine, theirs) {
            (
                PathOperation::Add {
                    index: a,
                    nodes: older,
                },
                PathOperation::Add {
                    index: b,
                    nodes: newer,
                },
            ) if a == b && older.len() == 1 && newer.len() == 1 => {
                let index = *a;
                let moved_tag = match (&self.undo, &next.undo) {
                    (Some(u1), Some(u2)) => match (u1.as_slice(), u2.as_slice()) {
                        (
                            [PathUndo::Added { moved_tag: t1, .. }],
                            [PathUndo::Added { moved_tag: t2, .. }],
                        ) => t1.or(*t2),
                        _ => None,
                    },
                    _ => None,
                };
                let operations = vec![PathOperation::Add {
                    index,
                    nodes: vec![newer[0], older[0]],
                }];
                let undo = self.undo.as_ref().map(|_| {
                    vec![PathUndo::Added {
                        index,
                        count: 2,
                        moved_tag,
                    }]
                });
                Some(self.merged(next, operations, undo))
            }
            (PathOperation::Remove { .. }, PathOperation::Remove { .. }) => {
                let operations = vec![mine.clone(), theirs.clone()];
                let undo = concat_undo(&self.undo, &next.undo);
                Some(self.merged(next, operations, undo))
            }
            (
                PathOperation::Move { indices: i, delta: a },
                PathOperation::Move { indices: j, delta: b },
            ) if i == j => Some(self.merged(
                next,
                vec![PathOperation::Move {
                    indices: i.clone(),
                    delta: *a + *b,
                }],
                self.undo.clone(),
            )),
            (
                PathOperation::MoveInHandle { indices: i, delta: a },
                PathOperation::MoveInHandle { indices: j, delta: b },
            ) if i == j => Some(self.merged(
                next,
                vec![PathOperation::MoveInHandle {
                    indices: i.clone(),
                    delta: *a + *b,
                }],
                self.undo.clone(),
            )),
            (
                PathOperation::MoveOutHandle { indices: i, delta: a },
                PathOperation::MoveOutHandle { indices: j, delta: b },
            ) if i == j => Some(self.merged(
                next,
                vec![PathOperation::MoveOutHandle {
                    indices: i.clone(),
                    delta: *a + *b,
                }],
                self.undo.clone(),
            )),
            _ => None,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn concat_undo(a: &Option<Vec<PathUndo>>, b: &Option<Vec<PathUndo>>) -> Option<Vec<PathUndo>> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.iter().chain(b.iter()).cloned().collect()),
        _ => None,
    }
}
