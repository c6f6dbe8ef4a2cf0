use lyon::geom::euclid::Angle;
use std::sync::Arc;
use vectis_core::{CommandError, SceneError};
use vectis_designer::geometry::{matrix_approx_eq, Matrix, Point, TransformComponents};
use vectis_designer::{
    AddLayerCommand, AlignCommand, Alignment, ApplyFillCommand, ApplyStrokeCommand, Brush,
    ChangeZIndexCommand, Color, Command, CompoundCommand, ConvertToPathCommand, Document,
    Gradient, GradientOperation, GradientStop, GroupCommand, Layer, LayerKind,
    ModifyGradientCommand, Pen, RemoveLayerCommand, TransformCommand, UngroupCommand,
    VectorResolver,
};

use crate::support::{assert_undo_identity, rect, snapshot, three_rects};

fn children(doc: &Document) -> Vec<vectis_core::LayerId> {
    doc.children(doc.root()).unwrap().to_vec()
}

fn two_stop_gradient() -> Gradient {
    Gradient::linear(
        Point::new(0.0, 0.0),
        Point::new(100.0, 0.0),
        vec![
            GradientStop::new(0.0, Color::BLACK),
            GradientStop::new(0.8, Color::rgb(0.5, 0.5, 0.5)),
        ],
    )
}

#[test]
fn test_add_layer_identity() {
    let (mut doc, _) = three_rects();
    let root = doc.root();
    let mut add = AddLayerCommand::insert(root, 1, rect("new", 5.0, 5.0));
    assert_undo_identity(&mut doc, &mut add);

    add.apply(&mut doc).unwrap();
    assert_eq!(children(&doc)[1], add.child());
}

#[test]
fn test_add_existing_twice_fails() {
    let mut doc = Document::new();
    let root = doc.root();
    let child = doc.create_layer(Layer::plain("a"));

    AddLayerCommand::existing(root, child).apply(&mut doc).unwrap();
    let err = AddLayerCommand::existing(root, child)
        .apply(&mut doc)
        .unwrap_err();
    assert!(matches!(
        err,
        CommandError::Scene(SceneError::AlreadyParented { .. })
    ));
    assert_eq!(children(&doc), vec![child]);
}

#[test]
fn test_remove_layer_identity() {
    let (mut doc, [_, b, _]) = three_rects();
    let mut remove = RemoveLayerCommand::new(b);
    assert_undo_identity(&mut doc, &mut remove);

    remove.apply(&mut doc).unwrap();
    assert_eq!(children(&doc).len(), 2);
    assert!(doc.contains(b));
}

#[test]
fn test_revert_before_apply_fails() {
    let (mut doc, [a, _, _]) = three_rects();
    let mut remove = RemoveLayerCommand::new(a);
    assert!(matches!(
        remove.revert(&mut doc),
        Err(CommandError::NotApplied { .. })
    ));
}

#[test]
fn test_group_identity_and_placement() {
    let (mut doc, [a, b, c]) = three_rects();
    let mut group = GroupCommand::new(vec![c, a], "g");
    assert_undo_identity(&mut doc, &mut group);

    group.apply(&mut doc).unwrap();
    let g = group.group();
    assert_eq!(children(&doc), vec![b, g]);
    assert_eq!(doc.children(g).unwrap(), &[a, c]);
}

#[test]
fn test_group_requires_shared_parent() {
    let (mut doc, [a, b, _]) = three_rects();
    let root = doc.root();
    let inner = doc.add_layer(root, Layer::group("inner")).unwrap();
    doc.detach(b).unwrap();
    doc.add_child(inner, b).unwrap();

    let before = snapshot(&doc);
    let mut group = GroupCommand::new(vec![a, b], "g");
    assert!(matches!(
        group.apply(&mut doc),
        Err(CommandError::InvalidArgument { .. })
    ));
    assert_eq!(snapshot(&doc), before);
}

#[test]
fn test_ungroup_keeps_world_bounds() {
    let mut doc = Document::new();
    let root = doc.root();
    let g = doc
        .add_layer(
            root,
            Layer::group("g").with_transform(TransformComponents {
                position: Point::new(10.0, 0.0),
                scale: Point::new(2.0, 2.0),
                rotation: 30.0,
                ..TransformComponents::default()
            }),
        )
        .unwrap();
    let a = doc
        .add_layer(g, rect("a", 10.0, 10.0).with_position(Point::new(5.0, 0.0)))
        .unwrap();
    let b = doc.add_layer(g, rect("b", 4.0, 4.0)).unwrap();

    let resolver = VectorResolver;
    let before = doc.world_bounds(a, &resolver).unwrap();

    let mut ungroup = UngroupCommand::new(vec![g]);
    assert_undo_identity(&mut doc, &mut ungroup);

    ungroup.apply(&mut doc).unwrap();
    assert_eq!(children(&doc), vec![a, b]);
    let after = doc.world_bounds(a, &resolver).unwrap();
    assert!((after.min_x - before.min_x).abs() < 1e-4);
    assert!((after.max_y - before.max_y).abs() < 1e-4);
}

#[test]
fn test_ungroup_rejects_non_group() {
    let (mut doc, [a, _, _]) = three_rects();
    let err = UngroupCommand::new(vec![a]).apply(&mut doc).unwrap_err();
    assert!(matches!(
        err,
        CommandError::Scene(SceneError::WrongLayerKind { .. })
    ));
}

#[test]
fn test_transform_identity() {
    let (mut doc, [a, b, _]) = three_rects();
    let mut local = TransformCommand::local(vec![a, b], Matrix::rotation(Angle::degrees(15.0)));
    assert_undo_identity(&mut doc, &mut local);

    let mut moved = TransformCommand::translate(vec![a], Point::new(3.0, 4.0));
    assert_undo_identity(&mut doc, &mut moved);
    moved.apply(&mut doc).unwrap();
    assert_eq!(
        doc.layer(a).unwrap().transform().position,
        Point::new(3.0, 4.0)
    );
}

#[test]
fn test_transform_merge_matches_composed() {
    let (mut doc, [a, _, _]) = three_rects();
    let mut other = Document::new();
    let root = other.root();
    let twin = other.add_layer(root, rect("a", 10.0, 10.0)).unwrap();

    let m1 = Matrix::scale(2.0, 1.5);
    let m2 = Matrix::translation(4.0, -2.0).then(&Matrix::rotation(Angle::degrees(20.0)));

    let original = snapshot(&doc);
    let mut first = TransformCommand::local(vec![a], m1);
    let mut second = TransformCommand::local(vec![a], m2);
    first.apply(&mut doc).unwrap();
    second.apply(&mut doc).unwrap();

    let mut merged = first.merge(&second).expect("same targets merge");
    let composed = merged
        .as_any()
        .downcast_ref::<TransformCommand>()
        .and_then(|t| t.local_matrix().copied())
        .unwrap();
    assert!(matrix_approx_eq(&composed, &m1.then(&m2), 1e-12));

    TransformCommand::local(vec![twin], m1.then(&m2))
        .apply(&mut other)
        .unwrap();
    assert!(doc
        .layer(a)
        .unwrap()
        .transform()
        .approx_eq(other.layer(twin).unwrap().transform(), 1e-9));

    merged.revert(&mut doc).unwrap();
    assert_eq!(snapshot(&doc), original);
}

#[test]
fn test_transform_merge_requires_same_slot_and_targets() {
    let (_, [a, b, _]) = three_rects();
    let local = TransformCommand::local(vec![a], Matrix::scale(2.0, 2.0));
    let global = TransformCommand::global(vec![a], Matrix::scale(2.0, 2.0));
    let other = TransformCommand::local(vec![b], Matrix::scale(2.0, 2.0));
    assert!(local.merge(&global).is_none());
    assert!(local.merge(&other).is_none());
    assert!(local.merge(&RemoveLayerCommand::new(a)).is_none());
}

#[test]
fn test_z_index_clamped_scenario() {
    let (mut doc, [a, b, c]) = three_rects();

    let mut forward = ChangeZIndexCommand::new(vec![a], 1);
    forward.apply(&mut doc).unwrap();
    assert_eq!(children(&doc), vec![b, a, c]);
    forward.revert(&mut doc).unwrap();
    assert_eq!(children(&doc), vec![a, b, c]);

    let mut past_end = ChangeZIndexCommand::new(vec![b], 5);
    past_end.apply(&mut doc).unwrap();
    assert_eq!(children(&doc), vec![a, c, b]);
    past_end.revert(&mut doc).unwrap();
    assert_eq!(children(&doc), vec![a, b, c]);

    let mut at_top = ChangeZIndexCommand::new(vec![c], 1);
    assert_undo_identity(&mut doc, &mut at_top);
}

#[test]
fn test_z_index_multiple_targets() {
    let (mut doc, [a, b, c]) = three_rects();
    let mut back = ChangeZIndexCommand::new(vec![c, b], -1);
    back.apply(&mut doc).unwrap();
    assert_eq!(children(&doc), vec![b, c, a]);
    back.revert(&mut doc).unwrap();
    assert_eq!(children(&doc), vec![a, b, c]);
}

#[test]
fn test_z_index_merge() {
    let (mut doc, [a, b, c]) = three_rects();
    let mut first = ChangeZIndexCommand::new(vec![a], 1);
    let mut second = ChangeZIndexCommand::new(vec![a], 1);
    first.apply(&mut doc).unwrap();
    second.apply(&mut doc).unwrap();
    assert_eq!(children(&doc), vec![b, c, a]);

    let mut merged = first.merge(&second).unwrap();
    merged.revert(&mut doc).unwrap();
    assert_eq!(children(&doc), vec![a, b, c]);

    // a clamped push followed by a step back replays exactly
    let mut up = ChangeZIndexCommand::new(vec![a], 5);
    let mut down = ChangeZIndexCommand::new(vec![a], -1);
    up.apply(&mut doc).unwrap();
    down.apply(&mut doc).unwrap();
    assert_eq!(children(&doc), vec![b, a, c]);

    let mut merged = up.merge(&down).unwrap();
    merged.revert(&mut doc).unwrap();
    assert_eq!(children(&doc), vec![a, b, c]);
    merged.apply(&mut doc).unwrap();
    assert_eq!(children(&doc), vec![b, a, c]);
}

#[test]
fn test_fill_and_stroke_identity() {
    let (mut doc, [a, b, _]) = three_rects();
    let gradient = doc.add_gradient(two_stop_gradient());

    let mut fill = ApplyFillCommand::new(vec![a, b], Some(Brush::Gradient(gradient)));
    assert_undo_identity(&mut doc, &mut fill);

    let mut stroke = ApplyStrokeCommand::new(vec![a], Some(Pen::solid(Color::WHITE, 3.0)));
    assert_undo_identity(&mut doc, &mut stroke);

    let mut clear = ApplyFillCommand::new(vec![b], None);
    clear.apply(&mut doc).unwrap();
    assert!(doc.layer(b).unwrap().fill().is_none());
}

#[test]
fn test_fill_rejects_groups_and_unknown_gradients() {
    let (mut doc, [a, _, _]) = three_rects();
    let root = doc.root();

    let err = ApplyFillCommand::new(vec![root], Some(Brush::Solid(Color::WHITE)))
        .apply(&mut doc)
        .unwrap_err();
    assert!(matches!(
        err,
        CommandError::Scene(SceneError::WrongLayerKind { .. })
    ));

    let missing = Gradient::linear(Point::ZERO, Point::new(1.0, 0.0), vec![]);
    let err = ApplyFillCommand::new(vec![a], Some(Brush::Gradient(missing.id)))
        .apply(&mut doc)
        .unwrap_err();
    assert!(matches!(
        err,
        CommandError::Scene(SceneError::GradientNotFound { .. })
    ));
}

#[test]
fn test_paint_merge_keeps_first_previous() {
    let (mut doc, [a, _, _]) = three_rects();
    let original = snapshot(&doc);
    let red = Brush::Solid(Color::rgb(1.0, 0.0, 0.0));
    let blue = Brush::Solid(Color::rgb(0.0, 0.0, 1.0));

    let mut first = ApplyFillCommand::new(vec![a], Some(red));
    let mut second = ApplyFillCommand::new(vec![a], Some(blue.clone()));
    first.apply(&mut doc).unwrap();
    second.apply(&mut doc).unwrap();

    let mut merged = first.merge(&second).unwrap();
    merged.revert(&mut doc).unwrap();
    assert_eq!(snapshot(&doc), original);
    merged.apply(&mut doc).unwrap();
    assert_eq!(doc.layer(a).unwrap().fill(), Some(&blue));
}

#[test]
fn test_gradient_operations_identity() {
    let mut doc = Document::new();
    let gradient = doc.add_gradient(two_stop_gradient());

    let operations = vec![
        GradientOperation::MoveStart(Point::new(5.0, 5.0)),
        GradientOperation::MoveEnd(Point::new(-5.0, 0.0)),
        GradientOperation::ChangeStopOffset {
            index: 1,
            delta: 0.5,
        },
        GradientOperation::ChangeStopColor {
            index: 0,
            delta: Color::rgba(0.7, 0.2, 0.1, 0.0),
        },
        GradientOperation::InsertStop {
            index: 1,
            stop: GradientStop::new(0.4, Color::WHITE),
        },
        GradientOperation::RemoveStop { index: 0 },
    ];
    for op in operations {
        let mut command = ModifyGradientCommand::new(gradient, op);
        assert_undo_identity(&mut doc, &mut command);
    }
}

#[test]
fn test_gradient_offset_is_clamped() {
    let mut doc = Document::new();
    let gradient = doc.add_gradient(two_stop_gradient());
    let mut command = ModifyGradientCommand::new(
        gradient,
        GradientOperation::ChangeStopOffset {
            index: 1,
            delta: 0.5,
        },
    );
    command.apply(&mut doc).unwrap();
    assert_eq!(doc.gradient(gradient).unwrap().stops[1].offset, 1.0);
    command.revert(&mut doc).unwrap();
    assert_eq!(doc.gradient(gradient).unwrap().stops[1].offset, 0.8);
}

#[test]
fn test_gradient_focus_unsupported_on_linear() {
    let mut doc = Document::new();
    let gradient = doc.add_gradient(two_stop_gradient());
    let before = snapshot(&doc);

    let err = ModifyGradientCommand::new(gradient, GradientOperation::MoveFocus(Point::new(1.0, 1.0)))
        .apply(&mut doc)
        .unwrap_err();
    match err {
        CommandError::UnsupportedOperation { operation, .. } => {
            assert_eq!(operation, "move_focus")
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(snapshot(&doc), before);
}

#[test]
fn test_gradient_merge_keeps_requests() {
    let mut doc = Document::new();
    let gradient = doc.add_gradient(two_stop_gradient());
    let original = snapshot(&doc);

    let mut first = ModifyGradientCommand::new(gradient, GradientOperation::MoveEnd(Point::new(1.0, 0.0)));
    let mut second = ModifyGradientCommand::new(gradient, GradientOperation::MoveEnd(Point::new(2.0, 1.0)));
    first.apply(&mut doc).unwrap();
    second.apply(&mut doc).unwrap();

    let mut merged = first.merge(&second).unwrap();
    let combined = merged
        .as_any()
        .downcast_ref::<ModifyGradientCommand>()
        .unwrap();
    assert_eq!(combined.operations().len(), 2);
    assert_eq!(
        combined.requested(),
        Some(GradientOperation::MoveEnd(Point::new(3.0, 1.0)))
    );
    merged.revert(&mut doc).unwrap();
    assert_eq!(snapshot(&doc), original);

    let offset = ModifyGradientCommand::new(gradient, GradientOperation::ChangeStopOffset { index: 0, delta: 0.1 });
    let other_stop = ModifyGradientCommand::new(gradient, GradientOperation::ChangeStopOffset { index: 1, delta: 0.1 });
    assert!(offset.merge(&other_stop).is_none());
}

#[test]
fn test_align_left_and_bottom() {
    let (mut doc, [a, b, c]) = three_rects();
    doc.set_transform(
        b,
        TransformComponents {
            position: Point::new(20.0, 15.0),
            ..TransformComponents::default()
        },
    )
    .unwrap();
    let resolver = Arc::new(VectorResolver);

    let mut left = AlignCommand::new(vec![a, b, c], Alignment::Left, resolver.clone());
    assert_undo_identity(&mut doc, &mut left);
    left.apply(&mut doc).unwrap();
    for id in [a, b, c] {
        assert_eq!(doc.world_bounds(id, resolver.as_ref()).unwrap().min_x, 0.0);
    }

    let mut bottom = AlignCommand::new(vec![a, b, c], Alignment::Bottom, resolver.clone());
    bottom.apply(&mut doc).unwrap();
    for id in [a, b, c] {
        assert_eq!(doc.world_bounds(id, resolver.as_ref()).unwrap().max_y, 25.0);
    }
}

#[test]
fn test_convert_to_path_identity() {
    let (mut doc, [a, b, c]) = three_rects();
    let mut convert = ConvertToPathCommand::new(vec![b], Arc::new(VectorResolver));
    assert_undo_identity(&mut doc, &mut convert);

    convert.apply(&mut doc).unwrap();
    let path = convert.paths()[0];
    assert_eq!(children(&doc), vec![a, path, c]);

    let layer = doc.layer(path).unwrap();
    assert_eq!(layer.nodes().map(|n| n.len()), Some(4));
    assert_eq!(layer.fill(), Some(&Brush::Solid(Color::BLACK)));
    assert_eq!(layer.transform(), doc.layer(b).unwrap().transform());

    // redo reuses the same path layer
    convert.revert(&mut doc).unwrap();
    convert.apply(&mut doc).unwrap();
    assert_eq!(convert.paths()[0], path);
}

#[test]
fn test_convert_text_without_geometry_fails() {
    let mut doc = Document::new();
    let root = doc.root();
    let text = doc.add_layer(root, Layer::text("t", "Hi", "Sans", 10.0)).unwrap();
    let before = snapshot(&doc);

    let err = ConvertToPathCommand::new(vec![text], Arc::new(VectorResolver))
        .apply(&mut doc)
        .unwrap_err();
    assert_eq!(err, CommandError::GeometryUnavailable { id: text });
    assert_eq!(snapshot(&doc), before);
    assert!(matches!(
        doc.layer(text).unwrap().kind(),
        LayerKind::Text { .. }
    ));
}

#[test]
fn test_compound_applies_in_order_and_reverts_in_reverse() {
    let (mut doc, [a, b, _]) = three_rects();
    let mut compound = CompoundCommand::new(
        "Move and recolour",
        vec![
            Box::new(TransformCommand::translate(vec![a], Point::new(1.0, 1.0))),
            Box::new(ChangeZIndexCommand::new(vec![a], 1)),
            Box::new(ApplyFillCommand::new(vec![a, b], Some(Brush::Solid(Color::WHITE)))),
        ],
    );
    assert_eq!(compound.targets().len(), 2);
    assert_undo_identity(&mut doc, &mut compound);
}

#[test]
fn test_compound_rolls_back_on_failure() {
    let (mut doc, [a, _, _]) = three_rects();
    let before = snapshot(&doc);
    let detached = doc.create_layer(Layer::plain("loose"));

    let mut compound = CompoundCommand::new(
        "Move and remove",
        vec![
            Box::new(TransformCommand::translate(vec![a], Point::new(3.0, 0.0))),
            Box::new(RemoveLayerCommand::new(detached)),
        ],
    );
    assert!(matches!(
        compound.apply(&mut doc),
        Err(CommandError::InvalidArgument { .. })
    ));
    assert_eq!(snapshot(&doc), before);
}
