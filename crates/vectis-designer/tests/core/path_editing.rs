use vectis_core::{CommandError, LayerId, SceneError};
use vectis_designer::geometry::{FigureEnd, PathNode, Point};
use vectis_designer::{Command, Document, Layer, ModifyPathCommand, PathOperation};

use crate::support::{assert_undo_identity, path_nodes, rect, snapshot};

/// Two figures: a closed triangle and an open two-node stroke.
fn two_figures() -> (Document, LayerId) {
    let nodes = vec![
        PathNode::line(Point::new(0.0, 0.0)),
        PathNode::line(Point::new(10.0, 0.0)).with_outgoing(Point::new(12.0, 2.0)),
        PathNode::cubic(Point::new(12.0, 8.0), Point::new(10.0, 10.0)).with_end(FigureEnd::Closed),
        PathNode::line(Point::new(20.0, 20.0)),
        PathNode::line(Point::new(30.0, 20.0)).with_end(FigureEnd::Open),
    ];
    let mut doc = Document::new();
    let root = doc.root();
    let path = doc.add_layer(root, Layer::path("p", nodes)).unwrap();
    (doc, path)
}

fn assert_dense(nodes: &[PathNode]) {
    for (i, node) in nodes.iter().enumerate() {
        assert_eq!(node.index, i);
    }
}

#[test]
fn test_add_moves_figure_end_forward() {
    let (mut doc, path) = two_figures();
    let mut add = ModifyPathCommand::new(
        path,
        PathOperation::Add {
            index: 3,
            nodes: vec![PathNode::line(Point::new(0.0, 10.0))],
        },
    );
    assert_undo_identity(&mut doc, &mut add);

    add.apply(&mut doc).unwrap();
    let nodes = path_nodes(&doc, path);
    assert_eq!(nodes.len(), 6);
    assert_eq!(nodes[2].end, None);
    assert_eq!(nodes[3].position, Point::new(0.0, 10.0));
    assert_eq!(nodes[3].end, Some(FigureEnd::Closed));
    assert_dense(&nodes);
}

#[test]
fn test_add_at_front_and_end() {
    let (mut doc, path) = two_figures();
    let mut front = ModifyPathCommand::new(
        path,
        PathOperation::Add {
            index: 0,
            nodes: vec![PathNode::line(Point::new(-5.0, 0.0))],
        },
    );
    assert_undo_identity(&mut doc, &mut front);

    let mut end = ModifyPathCommand::new(
        path,
        PathOperation::Add {
            index: 5,
            nodes: vec![
                PathNode::line(Point::new(40.0, 20.0)),
                PathNode::line(Point::new(50.0, 20.0)),
            ],
        },
    );
    end.apply(&mut doc).unwrap();
    let nodes = path_nodes(&doc, path);
    assert_eq!(nodes[4].end, None);
    assert_eq!(nodes[6].end, Some(FigureEnd::Open));
    end.revert(&mut doc).unwrap();
    assert_eq!(path_nodes(&doc, path)[4].end, Some(FigureEnd::Open));
}

#[test]
fn test_remove_retags_predecessor() {
    let (mut doc, path) = two_figures();
    let original = path_nodes(&doc, path);
    let mut remove = ModifyPathCommand::new(
        path,
        PathOperation::Remove {
            indices: vec![2],
            delta: Point::new(1.0, 1.0),
        },
    );
    assert_undo_identity(&mut doc, &mut remove);

    remove.apply(&mut doc).unwrap();
    let nodes = path_nodes(&doc, path);
    assert_eq!(nodes.len(), 4);
    assert_eq!(nodes[1].end, Some(FigureEnd::Closed));
    assert_eq!(nodes[1].position, Point::new(11.0, 1.0));
    assert_eq!(nodes[1].outgoing, Some(Point::new(13.0, 3.0)));
    assert_dense(&nodes);

    remove.revert(&mut doc).unwrap();
    assert_eq!(path_nodes(&doc, path), original);
}

#[test]
fn test_remove_several_nodes() {
    let (mut doc, path) = two_figures();
    let mut remove = ModifyPathCommand::new(
        path,
        PathOperation::Remove {
            indices: vec![0, 4],
            delta: Point::ZERO,
        },
    );
    assert_undo_identity(&mut doc, &mut remove);

    remove.apply(&mut doc).unwrap();
    let nodes = path_nodes(&doc, path);
    assert_eq!(nodes.len(), 3);
    assert_eq!(nodes[0].position, Point::new(10.0, 0.0));
    assert_eq!(nodes[2].end, Some(FigureEnd::Open));
}

#[test]
fn test_move_and_handles() {
    let (mut doc, path) = two_figures();
    let delta = Point::new(2.0, -1.0);

    let mut move_nodes = ModifyPathCommand::new(
        path,
        PathOperation::Move {
            indices: vec![1],
            delta,
        },
    );
    assert_undo_identity(&mut doc, &mut move_nodes);
    move_nodes.apply(&mut doc).unwrap();
    let node = path_nodes(&doc, path)[1];
    assert_eq!(node.position, Point::new(12.0, -1.0));
    assert_eq!(node.outgoing, Some(Point::new(14.0, 1.0)));
    move_nodes.revert(&mut doc).unwrap();

    let mut incoming = ModifyPathCommand::new(
        path,
        PathOperation::MoveInHandle {
            indices: vec![2],
            delta,
        },
    );
    assert_undo_identity(&mut doc, &mut incoming);
    incoming.apply(&mut doc).unwrap();
    let node = path_nodes(&doc, path)[2];
    assert_eq!(node.incoming, Some(Point::new(14.0, 7.0)));
    assert_eq!(node.position, Point::new(10.0, 10.0));
    incoming.revert(&mut doc).unwrap();

    let mut outgoing = ModifyPathCommand::new(
        path,
        PathOperation::MoveOutHandle {
            indices: vec![1, 3],
            delta,
        },
    );
    assert_undo_identity(&mut doc, &mut outgoing);
}

#[test]
fn test_end_figure_toggles() {
    let (mut doc, path) = two_figures();
    let mut close = ModifyPathCommand::new(
        path,
        PathOperation::EndFigureClosed {
            indices: vec![4],
            delta: Point::ZERO,
        },
    );
    assert_undo_identity(&mut doc, &mut close);
    close.apply(&mut doc).unwrap();
    assert_eq!(path_nodes(&doc, path)[4].end, Some(FigureEnd::Closed));

    let mut open = ModifyPathCommand::new(
        path,
        PathOperation::EndFigureOpen {
            indices: vec![1],
            delta: Point::new(0.5, 0.0),
        },
    );
    assert_undo_identity(&mut doc, &mut open);
    open.apply(&mut doc).unwrap();
    let node = path_nodes(&doc, path)[1];
    assert_eq!(node.end, Some(FigureEnd::Open));
    assert_eq!(node.position, Point::new(10.5, 0.0));
}

#[test]
fn test_out_of_range_is_rejected_before_mutation() {
    let (mut doc, path) = two_figures();
    let before = snapshot(&doc);
    let err = ModifyPathCommand::new(
        path,
        PathOperation::Move {
            indices: vec![1, 9],
            delta: Point::new(1.0, 1.0),
        },
    )
    .apply(&mut doc)
    .unwrap_err();
    assert_eq!(
        err,
        CommandError::Scene(SceneError::IndexOutOfRange { index: 9, len: 5 })
    );
    assert_eq!(snapshot(&doc), before);
}

#[test]
fn test_non_path_layer_is_rejected() {
    let mut doc = Document::new();
    let root = doc.root();
    let shape = doc.add_layer(root, rect("r", 1.0, 1.0)).unwrap();
    let err = ModifyPathCommand::new(
        shape,
        PathOperation::Move {
            indices: vec![0],
            delta: Point::ZERO,
        },
    )
    .apply(&mut doc)
    .unwrap_err();
    assert!(matches!(
        err,
        CommandError::Scene(SceneError::WrongLayerKind { .. })
    ));
}

#[test]
fn test_move_merge_sums_deltas() {
    let (mut doc, path) = two_figures();
    let original = snapshot(&doc);
    let mut first = ModifyPathCommand::new(
        path,
        PathOperation::Move {
            indices: vec![0, 1],
            delta: Point::new(1.0, 0.0),
        },
    );
    let mut second = ModifyPathCommand::new(
        path,
        PathOperation::Move {
            indices: vec![0, 1],
            delta: Point::new(0.0, 2.0),
        },
    );
    first.apply(&mut doc).unwrap();
    second.apply(&mut doc).unwrap();

    let mut merged = first.merge(&second).unwrap();
    let ops = merged
        .as_any()
        .downcast_ref::<ModifyPathCommand>()
        .map(|c| c.operations().to_vec())
        .unwrap();
    assert_eq!(
        ops,
        vec![PathOperation::Move {
            indices: vec![0, 1],
            delta: Point::new(1.0, 2.0)
        }]
    );
    merged.revert(&mut doc).unwrap();
    assert_eq!(snapshot(&doc), original);

    let other = ModifyPathCommand::new(
        path,
        PathOperation::Move {
            indices: vec![0],
            delta: Point::ZERO,
        },
    );
    assert!(first.merge(&other).is_none());
}

#[test]
fn test_add_merge_combines_nodes() {
    let (mut doc, path) = two_figures();
    let original = snapshot(&doc);
    let older = PathNode::line(Point::new(100.0, 0.0));
    let newer = PathNode::line(Point::new(200.0, 0.0));

    let mut first = ModifyPathCommand::new(
        path,
        PathOperation::Add {
            index: 3,
            nodes: vec![older],
        },
    );
    let mut second = ModifyPathCommand::new(
        path,
        PathOperation::Add {
            index: 3,
            nodes: vec![newer],
        },
    );
    first.apply(&mut doc).unwrap();
    second.apply(&mut doc).unwrap();
    let applied = path_nodes(&doc, path);

    let mut merged = first.merge(&second).unwrap();
    merged.revert(&mut doc).unwrap();
    assert_eq!(snapshot(&doc), original);

    merged.apply(&mut doc).unwrap();
    let nodes = path_nodes(&doc, path);
    assert_eq!(nodes[3].position, newer.position);
    assert_eq!(nodes[4].position, older.position);
    assert_eq!(nodes, applied);
}

#[test]
fn test_remove_merge_concatenates() {
    let (mut doc, path) = two_figures();
    let original = snapshot(&doc);
    let mut first = ModifyPathCommand::new(
        path,
        PathOperation::Remove {
            indices: vec![4],
            delta: Point::ZERO,
        },
    );
    let mut second = ModifyPathCommand::new(
        path,
        PathOperation::Remove {
            indices: vec![3],
            delta: Point::ZERO,
        },
    );
    first.apply(&mut doc).unwrap();
    second.apply(&mut doc).unwrap();
    assert_eq!(path_nodes(&doc, path).len(), 3);

    let mut merged = first.merge(&second).unwrap();
    merged.revert(&mut doc).unwrap();
    assert_eq!(snapshot(&doc), original);
}
