//! Document arena and tree operations.

use std::collections::{HashMap, HashSet};

use vectis_core::{
    EditorConfig, EditorEvent, EventBus, GradientId, LayerId, PropertyKind, SceneError,
    StructureEvent,
};

use super::layer::{Layer, LayerKind};
use super::paint::{Brush, Gradient, Pen};
use crate::geometry::{Matrix, PathNode, TransformComponents};

/// Owns every layer of a drawing, the root group and the swatch list.
///
/// Detached layers stay in the arena so commands can re-attach them on undo
/// and redo; [`Document::purge_detached`] drops the unreachable ones.
#[derive(Debug)]
pub struct Document {
    layers: HashMap<LayerId, Layer>,
    root: LayerId,
    gradients: Vec<Gradient>,
    events: EventBus,
    config: EditorConfig,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self::with_config(EditorConfig::default())
    }

    pub fn with_config(config: EditorConfig) -> Self {
        let root = Layer::group("Root");
        let root_id = root.id;
        let mut layers = HashMap::new();
        layers.insert(root_id, root);
        Self {
            layers,
            root: root_id,
            gradients: Vec::new(),
            events: EventBus::with_config(config.events.clone()),
            config,
        }
    }

    pub fn root(&self) -> LayerId {
        self.root
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub(crate) fn notify(&self, event: EditorEvent) {
        tracing::trace!("{}", event.description());
        self.events.notify(event);
    }

    pub fn layer(&self, id: LayerId) -> Result<&Layer, SceneError> {
        self.layers.get(&id).ok_or(SceneError::LayerNotFound { id })
    }

    pub(crate) fn layer_mut(&mut self, id: LayerId) -> Result<&mut Layer, SceneError> {
        self.layers
            .get_mut(&id)
            .ok_or(SceneError::LayerNotFound { id })
    }

    pub fn contains(&self, id: LayerId) -> bool {
        self.layers.contains_key(&id)
    }

    /// Number of layers in the arena, attached or not.
    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    /// Put a layer into the arena without attaching it.
    ///
    /// A layer whose id is already present is left untouched.
    pub fn create_layer(&mut self, mut layer: Layer) -> LayerId {
        let id = layer.id;
        layer.parent = None;
        if let Some(children) = layer.children_mut() {
            children.clear();
        }
        self.layers.entry(id).or_insert(layer);
        id
    }

    /// Create a layer and append it to `parent`.
    pub fn add_layer(&mut self, parent: LayerId, layer: Layer) -> Result<LayerId, SceneError> {
        let id = self.create_layer(layer);
        self.add_child(parent, id)?;
        Ok(id)
    }

    pub fn children(&self, id: LayerId) -> Result<&[LayerId], SceneError> {
        self.layer(id)?
            .children()
            .ok_or(SceneError::NotAContainer { id })
    }

    pub fn parent(&self, id: LayerId) -> Result<Option<LayerId>, SceneError> {
        Ok(self.layer(id)?.parent)
    }

    /// Parent and sibling index of an attached layer.
    pub fn child_index(&self, id: LayerId) -> Option<(LayerId, usize)> {
        let parent = self.layers.get(&id)?.parent?;
        let index = self
            .layers
            .get(&parent)?
            .children()?
            .iter()
            .position(|c| *c == id)?;
        Some((parent, index))
    }

    /// Ancestors from the parent upwards.
    pub fn ancestors(&self, id: LayerId) -> Vec<LayerId> {
        let mut out = Vec::new();
        let mut current = self.layers.get(&id).and_then(|l| l.parent);
        while let Some(p) = current {
            out.push(p);
            current = self.layers.get(&p).and_then(|l| l.parent);
        }
        out
    }

    pub fn is_ancestor(&self, ancestor: LayerId, id: LayerId) -> bool {
        self.ancestors(id).contains(&ancestor)
    }

    /// All layers below `id`, depth first in z-order.
    pub fn descendants(&self, id: LayerId) -> Vec<LayerId> {
        let mut out = Vec::new();
        let mut stack: Vec<LayerId> = self
            .layers
            .get(&id)
            .and_then(|l| l.children())
            .map(|c| c.iter().rev().copied().collect())
            .unwrap_or_default();
        while let Some(next) = stack.pop() {
            out.push(next);
            if let Some(children) = self.layers.get(&next).and_then(|l| l.children()) {
                stack.extend(children.iter().rev().copied());
            }
        }
        out
    }

    pub fn add_child(&mut self, parent: LayerId, child: LayerId) -> Result<usize, SceneError> {
        let len = self.children(parent)?.len();
        self.insert_child(parent, len, child)?;
        Ok(len)
    }

    /// Insert `child` into `parent` at `index`.
    ///
    /// The child must be detached and must not be `parent` or one of its
    /// ancestors.
    pub fn insert_child(
        &mut self,
        parent: LayerId,
        index: usize,
        child: LayerId,
    ) -> Result<(), SceneError> {
        let len = self.children(parent)?.len();
        let current = self.layer(child)?.parent;
        if let Some(existing) = current {
            return Err(SceneError::AlreadyParented {
                child,
                parent: existing,
            });
        }
        if child == parent || self.is_ancestor(child, parent) {
            return Err(SceneError::CycleDetected { child, parent });
        }
        if index > len {
            return Err(SceneError::IndexOutOfRange { index, len });
        }

        self.layer_mut(child)?.parent = Some(parent);
        if let Some(children) = self.layer_mut(parent)?.children_mut() {
            children.insert(index, child);
        }

        self.notify(EditorEvent::Structure(StructureEvent::ChildAdded {
            parent,
            child,
            index,
        }));
        Ok(())
    }

    /// Remove `child` from `parent`, returning the index it occupied.
    ///
    /// The child stays in the arena, detached and deselected.
    pub fn remove_child(&mut self, parent: LayerId, child: LayerId) -> Result<usize, SceneError> {
        if self.layer(child)?.parent != Some(parent) {
            return Err(SceneError::NotAChild { child, parent });
        }
        let index = self
            .children(parent)?
            .iter()
            .position(|c| *c == child)
            .ok_or(SceneError::NotAChild { child, parent })?;

        if let Some(children) = self.layer_mut(parent)?.children_mut() {
            children.remove(index);
        }
        let layer = self.layer_mut(child)?;
        layer.parent = None;
        let was_selected = std::mem::replace(&mut layer.selected, false);

        self.notify(EditorEvent::Structure(StructureEvent::ChildRemoved {
            parent,
            child,
            index,
        }));
        if was_selected {
            self.notify(EditorEvent::PropertyChanged {
                layer: child,
                property: PropertyKind::Selection,
            });
        }
        Ok(index)
    }

    /// Detach a layer from whatever group holds it.
    pub fn detach(&mut self, id: LayerId) -> Result<Option<(LayerId, usize)>, SceneError> {
        match self.layer(id)?.parent {
            Some(parent) => {
                let index = self.remove_child(parent, id)?;
                Ok(Some((parent, index)))
            }
            None => Ok(None),
        }
    }

    /// Move a child within its group's z-order.
    pub fn move_child(&mut self, parent: LayerId, from: usize, to: usize) -> Result<(), SceneError> {
        let len = self.children(parent)?.len();
        for index in [from, to] {
            if index >= len {
                return Err(SceneError::IndexOutOfRange { index, len });
            }
        }
        if from == to {
            return Ok(());
        }

        let mut child = None;
        if let Some(children) = self.layer_mut(parent)?.children_mut() {
            let id = children.remove(from);
            children.insert(to, id);
            child = Some(id);
        }
        if let Some(child) = child {
            self.notify(EditorEvent::Structure(StructureEvent::ChildMoved {
                parent,
                child,
                from,
                to,
            }));
        }
        Ok(())
    }

    /// Local transform of a layer.
    pub fn transform(&self, id: LayerId) -> Result<Matrix, SceneError> {
        Ok(self.layer(id)?.local_matrix())
    }

    /// Parent's absolute transform, or identity for a detached layer.
    pub fn world_transform(&self, id: LayerId) -> Result<Matrix, SceneError> {
        match self.layer(id)?.parent {
            Some(parent) => self.absolute_transform(parent),
            None => Ok(Matrix::identity()),
        }
    }

    /// `Transform · WorldTransform`.
    pub fn absolute_transform(&self, id: LayerId) -> Result<Matrix, SceneError> {
        let mut matrix = self.layer(id)?.local_matrix();
        for ancestor in self.ancestors(id) {
            matrix = matrix.then(&self.layer(ancestor)?.local_matrix());
        }
        Ok(matrix)
    }

    /// Replace the stored transform components, returning the previous ones.
    pub fn set_transform(
        &mut self,
        id: LayerId,
        transform: TransformComponents,
    ) -> Result<TransformComponents, SceneError> {
        let layer = self.layer_mut(id)?;
        let previous = std::mem::replace(&mut layer.transform, transform);
        self.notify(EditorEvent::BoundsChanged { layer: id });
        Ok(previous)
    }

    /// Re-derive the transform components from a requested change.
    ///
    /// `local` is composed after the current transform; `global` is applied
    /// in document space as `(Transform · local · World) · global · World⁻¹`.
    /// The origin is held fixed. Returns the previous components.
    pub fn apply_transform(
        &mut self,
        id: LayerId,
        local: Option<&Matrix>,
        global: Option<&Matrix>,
    ) -> Result<TransformComponents, SceneError> {
        let current = self.layer(id)?.transform;
        let mut matrix = current.matrix();
        if let Some(local) = local {
            matrix = matrix.then(local);
        }
        if let Some(global) = global {
            let world = self.world_transform(id)?;
            let inverse = world.inverse().ok_or(SceneError::SingularTransform)?;
            matrix = matrix.then(&world).then(global).then(&inverse);
        }
        let next = TransformComponents::decompose(&matrix, current.origin)?;
        self.set_transform(id, next)
    }

    pub fn set_name(&mut self, id: LayerId, name: impl Into<String>) -> Result<(), SceneError> {
        self.layer_mut(id)?.name = name.into();
        self.notify(EditorEvent::PropertyChanged {
            layer: id,
            property: PropertyKind::Name,
        });
        Ok(())
    }

    pub fn set_opacity(&mut self, id: LayerId, opacity: f64) -> Result<(), SceneError> {
        self.layer_mut(id)?.opacity = opacity.clamp(0.0, 1.0);
        self.notify(EditorEvent::PropertyChanged {
            layer: id,
            property: PropertyKind::Opacity,
        });
        Ok(())
    }

    pub fn set_visible(&mut self, id: LayerId, visible: bool) -> Result<(), SceneError> {
        self.layer_mut(id)?.visible = visible;
        self.notify(EditorEvent::PropertyChanged {
            layer: id,
            property: PropertyKind::Visibility,
        });
        Ok(())
    }

    pub fn set_selected(&mut self, id: LayerId, selected: bool) -> Result<(), SceneError> {
        self.layer_mut(id)?.selected = selected;
        self.notify(EditorEvent::PropertyChanged {
            layer: id,
            property: PropertyKind::Selection,
        });
        Ok(())
    }

    /// Selected layers in depth-first z-order.
    pub fn selection(&self) -> Vec<LayerId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|id| self.layers.get(id).is_some_and(|l| l.selected))
            .collect()
    }

    /// Set the fill of a paintable layer, returning the previous fill.
    pub fn set_fill(
        &mut self,
        id: LayerId,
        fill: Option<Brush>,
    ) -> Result<Option<Brush>, SceneError> {
        if let Some(Brush::Gradient(gradient)) = &fill {
            self.gradient(*gradient)?;
        }
        let paint = paint_mut(self.layer_mut(id)?)?;
        let previous = std::mem::replace(&mut paint.fill, fill);
        self.notify(EditorEvent::PropertyChanged {
            layer: id,
            property: PropertyKind::Fill,
        });
        Ok(previous)
    }

    /// Set the stroke of a paintable layer, returning the previous stroke.
    pub fn set_stroke(&mut self, id: LayerId, stroke: Option<Pen>) -> Result<Option<Pen>, SceneError> {
        if let Some(Pen {
            brush: Brush::Gradient(gradient),
            ..
        }) = &stroke
        {
            self.gradient(*gradient)?;
        }
        let paint = paint_mut(self.layer_mut(id)?)?;
        let previous = std::mem::replace(&mut paint.stroke, stroke);
        self.notify(EditorEvent::PropertyChanged {
            layer: id,
            property: PropertyKind::Stroke,
        });
        Ok(previous)
    }

    /// Edit the node list of a path layer and publish the change.
    pub(crate) fn edit_nodes<R>(
        &mut self,
        id: LayerId,
        edit: impl FnOnce(&mut Vec<PathNode>) -> R,
    ) -> Result<R, SceneError> {
        let layer = self.layer_mut(id)?;
        let actual = layer.kind.name();
        let LayerKind::Path { nodes, .. } = &mut layer.kind else {
            return Err(SceneError::WrongLayerKind {
                id,
                expected: "path".to_string(),
                actual: actual.to_string(),
            });
        };
        let result = edit(nodes);
        self.notify(EditorEvent::Structure(StructureEvent::NodesChanged { layer: id }));
        self.notify(EditorEvent::BoundsChanged { layer: id });
        Ok(result)
    }

    pub fn gradients(&self) -> &[Gradient] {
        &self.gradients
    }

    pub fn gradient(&self, id: GradientId) -> Result<&Gradient, SceneError> {
        self.gradients
            .iter()
            .find(|g| g.id == id)
            .ok_or(SceneError::GradientNotFound { id })
    }

    pub fn add_gradient(&mut self, gradient: Gradient) -> GradientId {
        let id = gradient.id;
        self.gradients.push(gradient);
        self.notify(EditorEvent::ResourceChanged { gradient: id });
        id
    }

    /// Edit a gradient in place and publish the change.
    pub(crate) fn edit_gradient<R>(
        &mut self,
        id: GradientId,
        edit: impl FnOnce(&mut Gradient) -> R,
    ) -> Result<R, SceneError> {
        let gradient = self
            .gradients
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(SceneError::GradientNotFound { id })?;
        let result = edit(gradient);
        self.notify(EditorEvent::ResourceChanged { gradient: id });
        Ok(result)
    }

    /// Drop every layer not reachable from the root. Returns how many went.
    pub fn purge_detached(&mut self) -> usize {
        let mut reachable: HashSet<LayerId> = self.descendants(self.root).into_iter().collect();
        reachable.insert(self.root);
        let before = self.layers.len();
        self.layers.retain(|id, _| reachable.contains(id));
        let purged = before - self.layers.len();
        if purged > 0 {
            tracing::debug!("Purged {} detached layers", purged);
        }
        purged
    }

    /// Drop the detached subtrees rooted at `ids`. A subtree containing any
    /// layer in `keep` stays. Attached layers are never touched. Returns how
    /// many layers went.
    pub fn release(&mut self, ids: &[LayerId], keep: &HashSet<LayerId>) -> usize {
        let mut released = 0;
        for id in ids {
            if *id == self.root || keep.contains(id) {
                continue;
            }
            match self.layers.get(id) {
                Some(layer) if layer.parent.is_none() => {}
                _ => continue,
            }
            let subtree = self.descendants(*id);
            if subtree.iter().any(|d| keep.contains(d)) {
                continue;
            }
            for d in subtree.iter().chain(std::iter::once(id)) {
                if self.layers.remove(d).is_some() {
                    released += 1;
                }
            }
        }
        if released > 0 {
            tracing::debug!("Released {} layers no longer referenced by history", released);
        }
        released
    }
}

fn paint_mut(layer: &mut Layer) -> Result<&mut super::layer::Paint, SceneError> {
    let id = layer.id;
    let actual = layer.kind.name();
    layer.paint_mut().ok_or_else(|| SceneError::WrongLayerKind {
        id,
        expected: "paintable".to_string(),
        actual: actual.to_string(),
    })
}
