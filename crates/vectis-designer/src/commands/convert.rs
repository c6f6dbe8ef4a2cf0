//! Conversion of geometric layers to editable paths.

use std::any::Any;
use std::sync::Arc;
use vectis_core::{CommandError, LayerId, SceneError};

use super::{ensure_layers, layer_targets, not_applied, Command, CommandMeta, Target};
use crate::geometry::nodes_from_instructions;
use crate::scene::{Document, GeometryResolver, Layer, LayerKind};

#[derive(Debug, Clone, Copy)]
struct Replacement {
    original: LayerId,
    path: LayerId,
    parent: LayerId,
    index: usize,
    selected: bool,
}

/// Replace each target with a path layer built from its resolved geometry,
/// keeping its sibling position.
pub struct ConvertToPathCommand {
    meta: CommandMeta,
    targets: Vec<LayerId>,
    resolver: Arc<dyn GeometryResolver + Send + Sync>,
    /// Replacement path per target, created on first apply.
    paths: Vec<LayerId>,
    applied: Vec<Replacement>,
}

impl ConvertToPathCommand {
    pub fn new(targets: Vec<LayerId>, resolver: Arc<dyn GeometryResolver + Send + Sync>) -> Self {
        Self {
            meta: CommandMeta::new("Convert to path"),
            targets,
            resolver,
            paths: Vec::new(),
            applied: Vec::new(),
        }
    }

    /// Ids of the created path layers, in target order (empty until applied).
    pub fn paths(&self) -> &[LayerId] {
        &self.paths
    }

    fn build_paths(&self, doc: &Document) -> Result<Vec<Layer>, CommandError> {
        let mut out = Vec::with_capacity(self.targets.len());
        for id in &self.targets {
            let layer = doc.layer(*id)?;
            match layer.kind() {
                LayerKind::Shape { .. }
                | LayerKind::Path { .. }
                | LayerKind::Text { .. }
                | LayerKind::Clone { .. } => {}
                other => {
                    return Err(SceneError::WrongLayerKind {
                        id: *id,
                        expected: "geometric".to_string(),
                        actual: other.name().to_string(),
                    }
                    .into())
                }
            }
            if doc.child_index(*id).is_none() {
                return Err(CommandError::InvalidArgument {
                    reason: format!("{} is not attached to a group", id),
                });
            }
            let geometry = self
                .resolver
                .geometry(doc, *id)
                .ok_or(CommandError::GeometryUnavailable { id: *id })?;

            let mut path = Layer::path(layer.name(), nodes_from_instructions(&geometry))
                .with_transform(*layer.transform())
                .with_opacity(layer.opacity());
            path.visible = layer.is_visible();
            if let Some(paint) = doc.effective_paint(*id) {
                if let Some(fill) = &paint.fill {
                    path = path.with_fill(fill.clone());
                }
                if let Some(stroke) = &paint.stroke {
                    path = path.with_stroke(stroke.clone());
                }
            }
            out.push(path);
        }
        Ok(out)
    }
}

impl std::fmt::Debug for ConvertToPathCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConvertToPathCommand")
            .field("meta", &self.meta)
            .field("targets", &self.targets)
            .field("paths", &self.paths)
            .finish()
    }
}

impl Command for ConvertToPathCommand {
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
        self.targets.iter().chain(&self.paths).copied().collect()
    }

    fn apply(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        ensure_layers(doc, &self.targets)?;
        if self.paths.len() != self.targets.len() {
            let built = self.build_paths(doc)?;
            self.paths = built.into_iter().map(|path| doc.create_layer(path)).collect();
        }

        self.applied.clear();
        for (original, path) in self.targets.iter().zip(&self.paths) {
            let selected = doc.layer(*original)?.is_selected();
            let (parent, index) =
                doc.child_index(*original)
                    .ok_or_else(|| CommandError::InvalidArgument {
                        reason: format!("{} is not attached to a group", original),
                    })?;
            doc.remove_child(parent, *original)?;
            doc.insert_child(parent, index, *path)?;
            if selected {
                doc.set_selected(*path, true)?;
            }
            self.applied.push(Replacement {
                original: *original,
                path: *path,
                parent,
                index,
                selected,
            });
        }
        Ok(())
    }

    fn revert(&mut self, doc: &mut Document) -> Result<(), CommandError> {
        if self.applied.is_empty() && !self.targets.is_empty() {
            return Err(not_applied(&self.meta));
        }
        for r in std::mem::take(&mut self.applied).into_iter().rev() {
            doc.remove_child(r.parent, r.path)?;
            doc.insert_child(r.parent, r.index, r.original)?;
            if r.selected {
                doc.set_selected(r.original, true)?;
            }
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
