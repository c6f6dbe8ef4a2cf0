//! Geometry resolution for shape-like layers.

use lyon::algorithms::aabb::bounding_box;
use lyon::algorithms::hit_test::hit_test_path;
use lyon::path::iterator::PathIterator;
use lyon::path::{FillRule, Path};
use vectis_core::LayerId;

use super::document::Document;
use super::layer::{Layer, LayerKind};
use crate::geometry::{
    instructions_from_nodes, to_lyon_path, Bounds, PathInstruction, Point,
};

/// Longest clone chain followed before giving up.
const MAX_CLONE_DEPTH: usize = 16;

/// Supplies the resolved outline of a layer.
///
/// Renderers and text shapers implement this to hand glyph outlines and
/// cached geometry to the core.
pub trait GeometryResolver {
    /// Resolved outline in the layer's local space.
    fn geometry(&self, doc: &Document, layer: LayerId) -> Option<Vec<PathInstruction>>;

    /// Local bounding box of the resolved outline.
    fn local_bounds(&self, doc: &Document, layer: LayerId) -> Bounds {
        self.geometry(doc, layer)
            .map(|instructions| path_bounds(&to_lyon_path(&instructions)))
            .unwrap_or(Bounds::EMPTY)
    }
}

/// Built-in resolver for parametric shapes, paths and clones.
///
/// Text layers resolve to `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct VectorResolver;

impl VectorResolver {
    fn resolve(&self, doc: &Document, layer: &Layer, depth: usize) -> Option<Vec<PathInstruction>> {
        match layer.kind() {
            LayerKind::Shape { geometry, .. } => Some(geometry.instructions()),
            LayerKind::Path { nodes, .. } => Some(instructions_from_nodes(nodes)),
            LayerKind::Clone { source } if depth < MAX_CLONE_DEPTH => {
                let source = doc.layer(*source).ok()?;
                self.resolve(doc, source, depth + 1)
            }
            _ => None,
        }
    }
}

impl GeometryResolver for VectorResolver {
    fn geometry(&self, doc: &Document, layer: LayerId) -> Option<Vec<PathInstruction>> {
        let layer = doc.layer(layer).ok()?;
        self.resolve(doc, layer, 0)
    }
}

pub(crate) fn path_bounds(path: &Path) -> Bounds {
    if path.iter().next().is_none() {
        return Bounds::EMPTY;
    }
    let bb = bounding_box(path.iter());
    Bounds::new(
        bb.min.x as f64,
        bb.min.y as f64,
        bb.max.x as f64,
        bb.max.y as f64,
    )
}

/// Fill containment with the non-zero rule.
pub(crate) fn fill_contains(path: &Path, point: Point, tolerance: f64) -> bool {
    hit_test_path(
        &point.to_lyon(),
        path.iter(),
        FillRule::NonZero,
        tolerance as f32,
    )
}

/// Whether `point` lies within `half_width` of the flattened outline.
pub(crate) fn stroke_contains(path: &Path, point: Point, half_width: f64, tolerance: f64) -> bool {
    for event in path.iter().flattened(tolerance as f32) {
        let (from, to) = match event {
            lyon::path::Event::Line { from, to } => (from, to),
            lyon::path::Event::End {
                last,
                first,
                close: true,
            } => (last, first),
            _ => continue,
        };
        let distance = segment_distance(point, Point::from_lyon(from), Point::from_lyon(to));
        if distance <= half_width {
            return true;
        }
    }
    false
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.dot(ab);
    if len_sq == 0.0 {
        return p.distance_to(&a);
    }
    let t = ((p - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    p.distance_to(&(a + ab * t))
}
