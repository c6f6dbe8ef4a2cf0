//! Bounds and hit testing over the layer tree.

use vectis_core::{LayerId, SceneError};

use super::document::Document;
use super::layer::{LayerKind, Paint};
use super::resolver::{fill_contains, stroke_contains, GeometryResolver};
use crate::geometry::{to_lyon_path, Bounds, Point};

impl Document {
    /// Bounds in the layer's own coordinate space.
    ///
    /// Groups return the union of their children's relative bounds; an empty
    /// group (or a layer without geometry) yields [`Bounds::EMPTY`].
    pub fn bounds(
        &self,
        id: LayerId,
        resolver: &dyn GeometryResolver,
    ) -> Result<Bounds, SceneError> {
        let layer = self.layer(id)?;
        match layer.kind() {
            LayerKind::Plain => Ok(Bounds::EMPTY),
            LayerKind::Group { children } => {
                let mut union: Option<Bounds> = None;
                for child in children {
                    let relative = self.relative_bounds(*child, resolver)?;
                    if relative.is_empty() {
                        continue;
                    }
                    union = Some(match union {
                        Some(u) => u.union(&relative),
                        None => relative,
                    });
                }
                Ok(union.unwrap_or(Bounds::EMPTY))
            }
            _ => Ok(resolver.local_bounds(self, id)),
        }
    }

    /// Bounds mapped through the layer's own transform (its parent's space).
    pub fn relative_bounds(
        &self,
        id: LayerId,
        resolver: &dyn GeometryResolver,
    ) -> Result<Bounds, SceneError> {
        let bounds = self.bounds(id, resolver)?;
        if bounds.is_empty() {
            return Ok(Bounds::EMPTY);
        }
        Ok(bounds.transform(&self.transform(id)?))
    }

    /// Bounds mapped into document space.
    pub fn world_bounds(
        &self,
        id: LayerId,
        resolver: &dyn GeometryResolver,
    ) -> Result<Bounds, SceneError> {
        let bounds = self.bounds(id, resolver)?;
        if bounds.is_empty() {
            return Ok(Bounds::EMPTY);
        }
        Ok(bounds.transform(&self.absolute_transform(id)?))
    }

    /// Paint used to draw a layer, following clone references.
    pub fn effective_paint(&self, id: LayerId) -> Option<&Paint> {
        let mut current = self.layer(id).ok()?;
        for _ in 0..16 {
            match current.kind() {
                LayerKind::Clone { source } => current = self.layer(*source).ok()?,
                _ => return current.paint(),
            }
        }
        None
    }

    /// Topmost layer under `point`, which is given in the parent's space of `id`.
    ///
    /// Recursion into a group decrements `min_depth`. A leaf is only accepted
    /// once `min_depth <= 0`; a group whose subtree was hit at that depth
    /// reports itself, so callers pick how deep a click descends.
    pub fn hit_test(
        &self,
        id: LayerId,
        resolver: &dyn GeometryResolver,
        point: Point,
        min_depth: i32,
    ) -> Result<Option<LayerId>, SceneError> {
        let layer = self.layer(id)?;
        if !layer.is_visible() {
            return Ok(None);
        }

        let inverse = match layer.local_matrix().inverse() {
            Some(inverse) => inverse,
            None => return Ok(None),
        };
        let local = point.transform(&inverse);

        if let Some(children) = layer.children() {
            for child in children.iter().rev() {
                if let Some(hit) = self.hit_test(*child, resolver, local, min_depth - 1)? {
                    return Ok(Some(if min_depth <= 0 { id } else { hit }));
                }
            }
            return Ok(None);
        }

        if min_depth > 0 {
            return Ok(None);
        }
        if self.contains_local_point(id, resolver, local) {
            Ok(Some(id))
        } else {
            Ok(None)
        }
    }

    fn contains_local_point(
        &self,
        id: LayerId,
        resolver: &dyn GeometryResolver,
        local: Point,
    ) -> bool {
        let Some(paint) = self.effective_paint(id) else {
            return false;
        };
        if paint.fill.is_none() && paint.stroke.is_none() {
            return false;
        }
        let Some(instructions) = resolver.geometry(self, id) else {
            return false;
        };

        let path = to_lyon_path(&instructions);
        let tolerance = self.config().hit_test_tolerance;

        if paint.fill.is_some() && fill_contains(&path, local, tolerance) {
            return true;
        }
        if let Some(pen) = &paint.stroke {
            let half_width = pen.width / 2.0 + tolerance;
            if stroke_contains(&path, local, half_width, self.config().flatten_tolerance) {
                return true;
            }
        }
        false
    }
}
