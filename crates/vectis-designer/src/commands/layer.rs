//! Structural commands: add, remove, group and ungroup.

use std::any::Any;
use vectis_core::{CommandError, LayerId, SceneError};

use super::{ensure_layers, layer_targets, not_applied, Command, CommandMeta, Target};
use crate::geometry::TransformComponents;
use crate::scene::{Document, Layer};

/// Attach a layer to a container.
#[derive(Debug)]
pub struct AddLayerCommand {
    meta: CommandMeta,
    parent: LayerId,
    index: Option<usize>,
    child: LayerId,
    pending: Option<Layer>,
    inserted_at: Option<usize>,
}

impl AddLayerCommand {
    /// Append a new layer to `parent`.
    pub fn new(parent: LayerId, layer: Layer) -> Self {
        Self::build(parent, None, layer.id(), Some(layer))
    }

    /// Insert a new layer into `parent` at `index`.
    pub fn insert(parent: LayerId, index: usize, layer: Layer) -> Self {
        Self::build(parent, Some(index), layer.id(), Some(layer))
    }

    /// Append a layer that already lives in the document arena.
    pub fn existing(parent: LayerId, child: LayerId) -> Self {
        Self::build(parent, None, child, None)
    }

    fn build(parent: LayerId, index: Option<usize>, child: LayerId, pending: Option<Layer>) -> Self {
        let description = match &pending {
            Some(layer) => format!("Add {}", layer.name()),
            None => "Add layer".to_string(),
        };
        Self {
            meta: CommandMeta::new(description),
            parent,
            index,
            child,
            pending,
            inserted_at: None,
        }
    }

    /// Id of the layer this command attaches.
    pub fn child(&self) -> LayerId {
        self.child
    }
}

impl Command for AddLayerCommand {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn targets(&self) -> Vec<Target> {
        vec![Target::Layer(self.parent)]
    }

    fn retained_layers(&self) -> Vec<LayerId> {
        vec![self.parent, self.child]
    }

    fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        doc.layer(self.parent)?;
        if let Some(layer) = self.pending.take() {
            doc.create_layer(layer);
        }
        let index = match self.index {
            Some(index) => {
                doc.insert_child(self.parent, index, self.child)?;
                index
            }
            None => doc.add_child(self.parent, self.child)?,
        };
        self.inserted_at = Some(index);
        tracing::debug!("Added {} to {} at {}", self.child, self.parent, index);
        Ok(())
    }

    fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        if self.inserted_at.take().is_none() {
            return Err(not_applied(&self.meta));
        }
        doc.remove_child(self.parent, self.child)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Detach a layer from its parent.
#[derive(Debug)]
pub struct RemoveLayerCommand {
    meta: CommandMeta,
    layer: LayerId,
    removed_from: Option<(LayerId, usize)>,
}

impl RemoveLayerCommand {
    pub fn new(layer: LayerId) -> Self {
        Self {
            meta: CommandMeta::new("Remove layer"),
            layer,
            removed_from: None,
        }
    }
}

impl Command for RemoveLayerCommand {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn targets(&self) -> Vec<Target> {
        vec![Target::Layer(self.layer)]
    }

    fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        let removed = doc
            .detach(self.layer)?
            .ok_or_else(|| CommandError::InvalidArgument {
                reason: format!("{} is not attached to a group", self.layer),
            })?;
        self.removed_from = Some(removed);
        Ok(())
    }

    fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        let (parent, index) = self
            .removed_from
            .take()
            .ok_or_else(|| not_applied(&self.meta))?;
        doc.insert_child(parent, index, self.layer)?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
struct GroupRecord {
    parent: LayerId,
    /// Original sibling index of each target, ascending.
    members: Vec<(LayerId, usize)>,
}

/// Wrap sibling layers in a new group.
///
/// The group takes the z-position of the top-most target; members keep their
/// relative order.
#[derive(Debug)]
pub struct GroupCommand {
    meta: CommandMeta,
    targets: Vec<LayerId>,
    group: LayerId,
    pending: Option<Layer>,
    record: Option<GroupRecord>,
}

impl GroupCommand {
    pub fn new(targets: Vec<LayerId>, name: impl Into<String>) -> Self {
        let group = Layer::group(name);
        Self {
            meta: CommandMeta::new("Group"),
            targets,
            group: group.id(),
            pending: Some(group),
            record: None,
        }
    }

    /// Id of the wrapping group.
    pub fn group(&self) -> LayerId {
        self.group
    }
}

impl Command for GroupCommand {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn targets(&self) -> Vec<Target> {
        layer_targets(&self.targets)
    }

    fn retained_layers(&self) -> Vec<LayerId> {
        let mut ids = self.targets.clone();
        ids.push(self.group);
        ids
    }

    fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        if self.targets.is_empty() {
            return Err(CommandError::InvalidArgument {
                reason: "nothing to group".to_string(),
            });
        }
        ensure_layers(doc, &self.targets)?;

        let mut parent = None;
        let mut members = Vec::with_capacity(self.targets.len());
        for id in &self.targets {
            let (p, index) = doc
                .child_index(*id)
                .ok_or_else(|| CommandError::InvalidArgument {
                    reason: format!("{} is not attached to a group", id),
                })?;
            if parent.is_some_and(|existing| existing != p) {
                return Err(CommandError::InvalidArgument {
                    reason: "grouped layers must share a parent".to_string(),
                });
            }
            parent = Some(p);
            members.push((*id, index));
        }
        let Some(parent) = parent else {
            return Err(not_applied(&self.meta));
        };
        members.sort_by_key(|(_, index)| *index);
        members.dedup_by_key(|(id, _)| *id);

        let top = members.last().map(|(_, index)| *index).unwrap_or(0);
        let group_index = top + 1 - members.len();

        if let Some(group) = self.pending.take() {
            doc.create_layer(group);
        }
        for (id, _) in members.iter().rev() {
            doc.remove_child(parent, *id)?;
        }
        for (id, _) in &members {
            doc.add_child(self.group, *id)?;
        }
        doc.insert_child(parent, group_index, self.group)?;

        self.record = Some(GroupRecord { parent, members });
        Ok(())
    }

    fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        let record = self.record.take().ok_or_else(|| not_applied(&self.meta))?;
        doc.remove_child(record.parent, self.group)?;
        for (id, _) in &record.members {
            doc.remove_child(self.group, *id)?;
        }
        for (id, index) in &record.members {
            doc.insert_child(record.parent, *index, *id)?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[derive(Debug, Clone)]
struct UngroupRecord {
    group: LayerId,
    parent: LayerId,
    index: usize,
    /// Children in order with their transform before folding.
    children: Vec<(LayerId, TransformComponents)>,
}

/// Dissolve groups into their parents.
///
/// Each child's transform absorbs the group's transform so nothing moves.
#[derive(Debug)]
pub struct UngroupCommand {
    meta: CommandMeta,
    groups: Vec<LayerId>,
    records: Vec<UngroupRecord>,
}

impl UngroupCommand {
    pub fn new(groups: Vec<LayerId>) -> Self {
        Self {
            meta: CommandMeta::new("Ungroup"),
            groups,
            records: Vec::new(),
        }
    }
}

impl Command for UngroupCommand {
    fn meta(&self) -> &CommandMeta {
        &self.meta
    }

    fn meta_mut(&mut self) -> &mut CommandMeta {
        &mut self.meta
    }

    fn targets(&self) -> Vec<Target> {
        layer_targets(&self.groups)
    }

    fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        for group in &self.groups {
            let layer = doc.layer(*group)?;
            if !layer.is_group() {
                return Err(SceneError::WrongLayerKind {
                    id: *group,
                    expected: "group".to_string(),
                    actual: layer.kind().name().to_string(),
                }
                .into());
            }
            if doc.child_index(*group).is_none() {
                return Err(CommandError::InvalidArgument {
                    reason: format!("{} has no parent to ungroup into", group),
                });
            }
        }

        self.records.clear();
        for group in &self.groups {
            let Some((parent, index)) = doc.child_index(*group) else {
                continue;
            };
            let group_matrix = doc.transform(*group)?;
            let children = doc.children(*group)?.to_vec();

            let mut folded = Vec::with_capacity(children.len());
            let mut record = UngroupRecord {
                group: *group,
                parent,
                index,
                children: Vec::with_capacity(children.len()),
            };
            for child in &children {
                let current = *doc.layer(*child)?.transform();
                let matrix = current.matrix().then(&group_matrix);
                folded.push(TransformComponents::decompose(&matrix, current.origin)?);
                record.children.push((*child, current));
            }

            doc.remove_child(parent, *group)?;
            for (offset, (child, transform)) in children.iter().zip(folded).enumerate() {
                doc.remove_child(*group, *child)?;
                doc.set_transform(*child, transform)?;
                doc.insert_child(parent, index + offset, *child)?;
            }
            self.records.push(record);
        }
        Ok(())
    }

    fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        if self.records.is_empty() && !self.groups.is_empty() {
            return Err(not_applied(&self.meta));
        }
        for record in std::mem::take(&mut self.records).into_iter().rev() {
            for (child, transform) in &record.children {
                doc.remove_child(record.parent, *child)?;
                doc.set_transform(*child, *transform)?;
                doc.add_child(record.group, *child)?;
            }
            doc.insert_child(record.parent, record.index, record.group)?;
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
