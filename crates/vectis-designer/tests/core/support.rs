#![allow(dead_code)]

use vectis_core::LayerId;
use vectis_designer::geometry::{PathNode, Point};
use vectis_designer::{Brush, Color, Command, Document, Gradient, Layer, Pen, ShapeGeometry};

/// Every layer reachable from the root plus the swatch list.
pub fn snapshot(doc: &Document) -> (Vec<Layer>, Vec<Gradient>) {
    let root = doc.root();
    let mut layers = vec![doc.layer(root).unwrap().clone()];
    for id in doc.descendants(root) {
        layers.push(doc.layer(id).unwrap().clone());
    }
    (layers, doc.gradients().to_vec())
}

pub fn rect(name: &str, width: f64, height: f64) -> Layer {
    Layer::shape(
        name,
        ShapeGeometry::Rectangle {
            width,
            height,
            corner_radius: 0.0,
        },
    )
    .with_fill(Brush::Solid(Color::BLACK))
}

pub fn outlined_rect(name: &str, width: f64, height: f64) -> Layer {
    Layer::shape(
        name,
        ShapeGeometry::Rectangle {
            width,
            height,
            corner_radius: 0.0,
        },
    )
    .with_stroke(Pen::solid(Color::BLACK, 2.0))
}

pub fn polyline(name: &str, points: &[(f64, f64)]) -> Layer {
    let nodes = points
        .iter()
        .map(|(x, y)| PathNode::line(Point::new(*x, *y)))
        .collect();
    Layer::path(name, nodes).with_stroke(Pen::solid(Color::BLACK, 1.0))
}

/// Root with three rectangles `[a, b, c]` in z-order.
pub fn three_rects() -> (Document, [LayerId; 3]) {
    let mut doc = Document::new();
    let root = doc.root();
    let a = doc.add_layer(root, rect("a", 10.0, 10.0)).unwrap();
    let b = doc
        .add_layer(root, rect("b", 10.0, 10.0).with_position(Point::new(20.0, 0.0)))
        .unwrap();
    let c = doc
        .add_layer(root, rect("c", 10.0, 10.0).with_position(Point::new(40.0, 0.0)))
        .unwrap();
    (doc, [a, b, c])
}

pub fn path_nodes(doc: &Document, id: LayerId) -> Vec<PathNode> {
    doc.layer(id).unwrap().nodes().unwrap().to_vec()
}

/// Do, Undo, Do, Undo: each undo restores the state before the first Do and
/// each redo reproduces the state after it.
pub fn assert_undo_identity(doc: &mut Document, command: &mut dyn Command) {
    let before = snapshot(doc);
    command.apply(doc).unwrap();
    let after = snapshot(doc);
    command.revert(doc).unwrap();
    assert_eq!(snapshot(doc), before, "undo of {}", command.description());

    command.apply(doc).unwrap();
    assert_eq!(snapshot(doc), after, "redo of {}", command.description());
    command.revert(doc).unwrap();
    assert_eq!(snapshot(doc), before);
}
