use proptest::prelude::*;
use vectis_core::{CommandError, LayerId, SceneError};
use vectis_designer::geometry::{
    eval_cubic, ArcSegment, FigureEnd, MissingHandle, NodeKind, PathNode, Point, SegmentShape,
};
use vectis_designer::{Command, Document, Layer, SubdividePathCommand};

use crate::support::{assert_undo_identity, path_nodes};

fn path_doc(nodes: Vec<PathNode>) -> (Document, LayerId) {
    let mut doc = Document::new();
    let root = doc.root();
    let path = doc.add_layer(root, Layer::path("p", nodes)).unwrap();
    (doc, path)
}

fn close(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn test_line_subdivision_scenario() {
    let (mut doc, path) = path_doc(vec![
        PathNode::line(Point::new(0.0, 0.0)),
        PathNode::line(Point::new(10.0, 0.0)),
    ]);
    let original = path_nodes(&doc, path);

    let mut command = SubdividePathCommand::new(path, 0);
    command.apply(&mut doc).unwrap();
    assert_eq!(command.shape(), Some(SegmentShape::Line));

    let nodes = path_nodes(&doc, path);
    let positions: Vec<Point> = nodes.iter().map(|n| n.position).collect();
    assert_eq!(
        positions,
        vec![
            Point::new(0.0, 0.0),
            Point::new(5.0, 0.0),
            Point::new(10.0, 0.0)
        ]
    );
    assert_eq!(nodes[1].incoming, None);
    assert_eq!(nodes[1].outgoing, None);
    assert_eq!(nodes[1].index, 1);
    assert_eq!(nodes[2].index, 2);

    command.revert(&mut doc).unwrap();
    assert_eq!(path_nodes(&doc, path), original);
}

#[test]
fn test_cubic_halves_lie_on_original_curve() {
    let p0 = Point::new(0.0, 0.0);
    let c1 = Point::new(0.0, 10.0);
    let c2 = Point::new(10.0, 10.0);
    let p3 = Point::new(10.0, 0.0);
    let (mut doc, path) = path_doc(vec![
        PathNode::line(p0).with_outgoing(c1),
        PathNode::cubic(c2, p3),
    ]);
    let original = path_nodes(&doc, path);

    let mut command = SubdividePathCommand::new(path, 0);
    command.apply(&mut doc).unwrap();
    assert_eq!(command.shape(), Some(SegmentShape::Cubic));

    let n = path_nodes(&doc, path);
    assert_eq!(n.len(), 3);
    let first = [n[0].position, n[0].outgoing.unwrap(), n[1].incoming.unwrap(), n[1].position];
    let second = [n[1].position, n[1].outgoing.unwrap(), n[2].incoming.unwrap(), n[2].position];

    let curve = [p0, c1, c2, p3];
    assert!(close(eval_cubic(first, 0.5), eval_cubic(curve, 0.25)));
    assert!(close(eval_cubic(second, 0.5), eval_cubic(curve, 0.75)));
    assert_eq!(n[1].kind, NodeKind::Cubic);

    command.revert(&mut doc).unwrap();
    assert_eq!(path_nodes(&doc, path), original);
}

#[test]
fn test_single_handle_is_promoted() {
    let (mut doc, path) = path_doc(vec![
        PathNode::line(Point::new(0.0, 0.0)),
        PathNode::quadratic(Point::new(5.0, 10.0), Point::new(10.0, 0.0)),
    ]);
    let mut command = SubdividePathCommand::new(path, 0);
    assert_undo_identity(&mut doc, &mut command);

    command.apply(&mut doc).unwrap();
    assert_eq!(
        command.shape(),
        Some(SegmentShape::Mixed(MissingHandle::Outgoing))
    );
    let n = path_nodes(&doc, path);
    // apex of the quadratic
    assert!(close(n[1].position, Point::new(5.0, 5.0)));
    assert_eq!(n[2].kind, NodeKind::Cubic);
}

#[test]
fn test_subdivide_keeps_later_figures() {
    let (mut doc, path) = path_doc(vec![
        PathNode::line(Point::new(0.0, 0.0)),
        PathNode::line(Point::new(10.0, 0.0)).with_end(FigureEnd::Closed),
        PathNode::line(Point::new(20.0, 0.0)),
        PathNode::line(Point::new(30.0, 0.0)).with_end(FigureEnd::Open),
    ]);
    let mut command = SubdividePathCommand::new(path, 2);
    assert_undo_identity(&mut doc, &mut command);

    command.apply(&mut doc).unwrap();
    let n = path_nodes(&doc, path);
    assert_eq!(n.len(), 5);
    assert_eq!(n[1].end, Some(FigureEnd::Closed));
    assert_eq!(n[3].position, Point::new(25.0, 0.0));
    assert_eq!(n[4].end, Some(FigureEnd::Open));
}

#[test]
fn test_invalid_edges() {
    let arc = ArcSegment {
        radii: Point::new(5.0, 5.0),
        x_rotation: 0.0,
        large_arc: false,
        sweep: true,
    };
    let (mut doc, path) = path_doc(vec![
        PathNode::line(Point::new(0.0, 0.0)),
        PathNode::line(Point::new(10.0, 0.0)).with_end(FigureEnd::Open),
        PathNode::line(Point::new(20.0, 0.0)),
        PathNode::arc(arc, Point::new(30.0, 0.0)),
    ]);

    assert_eq!(
        SubdividePathCommand::new(path, 3).apply(&mut doc).unwrap_err(),
        CommandError::Scene(SceneError::IndexOutOfRange { index: 4, len: 4 })
    );
    assert!(matches!(
        SubdividePathCommand::new(path, 1).apply(&mut doc),
        Err(CommandError::InvalidArgument { .. })
    ));
    assert!(matches!(
        SubdividePathCommand::new(path, 2).apply(&mut doc),
        Err(CommandError::UnsupportedOperation { .. })
    ));
    assert_eq!(path_nodes(&doc, path).len(), 4);
}

fn coord() -> impl Strategy<Value = f64> {
    -1000.0..1000.0f64
}

fn point() -> impl Strategy<Value = Point> {
    (coord(), coord()).prop_map(|(x, y)| Point::new(x, y))
}

proptest! {
    #[test]
    fn prop_cubic_subdivision_preserves_shape(p0 in point(), c1 in point(), c2 in point(), p3 in point()) {
        let (mut doc, path) = path_doc(vec![
            PathNode::line(p0).with_outgoing(c1),
            PathNode::cubic(c2, p3),
        ]);
        let original = path_nodes(&doc, path);

        let mut command = SubdividePathCommand::new(path, 0);
        command.apply(&mut doc).unwrap();
        let n = path_nodes(&doc, path);
        let first = [n[0].position, n[0].outgoing.unwrap(), n[1].incoming.unwrap(), n[1].position];
        let second = [n[1].position, n[1].outgoing.unwrap(), n[2].incoming.unwrap(), n[2].position];
        let curve = [p0, c1, c2, p3];

        let tolerance = 1e-9 * 1000.0;
        let a = eval_cubic(first, 0.5);
        let b = eval_cubic(curve, 0.25);
        prop_assert!((a.x - b.x).abs() < tolerance && (a.y - b.y).abs() < tolerance);
        let a = eval_cubic(second, 0.5);
        let b = eval_cubic(curve, 0.75);
        prop_assert!((a.x - b.x).abs() < tolerance && (a.y - b.y).abs() < tolerance);

        command.revert(&mut doc).unwrap();
        // bit-for-bit restore of the endpoint handles
        prop_assert_eq!(path_nodes(&doc, path), original);
    }
}
