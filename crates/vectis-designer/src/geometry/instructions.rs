//! Flat path instruction streams and their conversion to and from nodes.

use lyon::geom::{ArcFlags, QuadraticBezierSegment, SvgArc};
use lyon::math::{vector, Angle};
use lyon::path::Path;
use serde::{Deserialize, Serialize};

use super::math::Point;
use super::node::{renumber, ArcSegment, FigureEnd, NodeKind, PathNode};

/// One drawing instruction of a resolved outline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PathInstruction {
    MoveTo(Point),
    LineTo(Point),
    QuadraticTo {
        control: Point,
        to: Point,
    },
    CubicTo {
        control1: Point,
        control2: Point,
        to: Point,
    },
    ArcTo {
        arc: ArcSegment,
        to: Point,
    },
    Close,
}

impl PathInstruction {
    /// End point of the instruction, if it has one.
    pub fn end_point(&self) -> Option<Point> {
        match *self {
            PathInstruction::MoveTo(p) | PathInstruction::LineTo(p) => Some(p),
            PathInstruction::QuadraticTo { to, .. }
            | PathInstruction::CubicTo { to, .. }
            | PathInstruction::ArcTo { to, .. } => Some(to),
            PathInstruction::Close => None,
        }
    }
}

/// Build a node list from an instruction stream.
pub fn nodes_from_instructions(instructions: &[PathInstruction]) -> Vec<PathNode> {
    let mut nodes: Vec<PathNode> = Vec::with_capacity(instructions.len());

    for instruction in instructions {
        match *instruction {
            PathInstruction::MoveTo(p) => {
                if let Some(last) = nodes.last_mut() {
                    if last.end.is_none() {
                        last.end = Some(FigureEnd::Open);
                    }
                }
                nodes.push(PathNode::line(p));
            }
            PathInstruction::LineTo(p) => nodes.push(PathNode::line(p)),
            PathInstruction::QuadraticTo { control, to } => {
                nodes.push(PathNode::quadratic(control, to));
            }
            PathInstruction::CubicTo {
                control1,
                control2,
                to,
            } => {
                if let Some(last) = nodes.last_mut() {
                    last.outgoing = Some(control1);
                }
                nodes.push(PathNode::cubic(control2, to));
            }
            PathInstruction::ArcTo { arc, to } => nodes.push(PathNode::arc(arc, to)),
            PathInstruction::Close => {
                if let Some(last) = nodes.last_mut() {
                    if last.end.is_none() {
                        last.end = Some(FigureEnd::Closed);
                    }
                }
            }
        }
    }

    if let Some(last) = nodes.last_mut() {
        if last.end.is_none() {
            last.end = Some(FigureEnd::Open);
        }
    }

    renumber(&mut nodes, 0);
    nodes
}

/// Emit the instruction stream described by a node list.
pub fn instructions_from_nodes(nodes: &[PathNode]) -> Vec<PathInstruction> {
    let mut out = Vec::with_capacity(nodes.len() + 2);
    let mut first: Option<&PathNode> = None;
    let mut prev: Option<&PathNode> = None;

    for node in nodes {
        if node.is_terminator() {
            if first.is_some() && node.end != Some(FigureEnd::Open) {
                out.push(PathInstruction::Close);
            }
            first = None;
            prev = None;
            continue;
        }

        match (first, prev) {
            (Some(_), Some(p)) => out.push(segment(p, node)),
            _ => {
                out.push(PathInstruction::MoveTo(node.position));
                first = Some(node);
            }
        }
        prev = Some(node);

        match node.end {
            Some(FigureEnd::Closed) => {
                if let Some(start) = first {
                    if let Some(closing) = closing_segment(node, start) {
                        out.push(closing);
                    }
                }
                out.push(PathInstruction::Close);
                first = None;
                prev = None;
            }
            Some(FigureEnd::Open) => {
                first = None;
                prev = None;
            }
            None => {}
        }
    }

    out
}

fn segment(prev: &PathNode, node: &PathNode) -> PathInstruction {
    if let NodeKind::Arc(arc) = node.kind {
        return PathInstruction::ArcTo {
            arc,
            to: node.position,
        };
    }
    curve_between(prev.outgoing, node.incoming, node.position)
}

fn closing_segment(last: &PathNode, start: &PathNode) -> Option<PathInstruction> {
    if last.outgoing.is_none() && start.incoming.is_none() {
        return None;
    }
    Some(curve_between(last.outgoing, start.incoming, start.position))
}

fn curve_between(outgoing: Option<Point>, incoming: Option<Point>, to: Point) -> PathInstruction {
    match (outgoing, incoming) {
        (None, None) => PathInstruction::LineTo(to),
        (Some(control), None) | (None, Some(control)) => PathInstruction::QuadraticTo { control, to },
        (Some(control1), Some(control2)) => PathInstruction::CubicTo {
            control1,
            control2,
            to,
        },
    }
}

/// Build a lyon path for bounds, hit testing and flattening.
pub fn to_lyon_path(instructions: &[PathInstruction]) -> Path {
    let mut builder = Path::builder();
    let mut open = false;
    let mut start = Point::ZERO;
    let mut current = Point::ZERO;

    for instruction in instructions {
        if let PathInstruction::MoveTo(p) = *instruction {
            if open {
                builder.end(false);
            }
            builder.begin(p.to_lyon());
            open = true;
            start = p;
            current = p;
            continue;
        }

        if !open {
            if matches!(instruction, PathInstruction::Close) {
                continue;
            }
            builder.begin(current.to_lyon());
            open = true;
            start = current;
        }

        match *instruction {
            PathInstruction::LineTo(p) => {
                builder.line_to(p.to_lyon());
                current = p;
            }
            PathInstruction::QuadraticTo { control, to } => {
                builder.quadratic_bezier_to(control.to_lyon(), to.to_lyon());
                current = to;
            }
            PathInstruction::CubicTo {
                control1,
                control2,
                to,
            } => {
                builder.cubic_bezier_to(control1.to_lyon(), control2.to_lyon(), to.to_lyon());
                current = to;
            }
            PathInstruction::ArcTo { arc, to } => {
                let svg_arc = SvgArc {
                    from: current.to_lyon(),
                    to: to.to_lyon(),
                    radii: vector(arc.radii.x as f32, arc.radii.y as f32),
                    x_rotation: Angle::degrees(arc.x_rotation as f32),
                    flags: ArcFlags {
                        large_arc: arc.large_arc,
                        sweep: arc.sweep,
                    },
                };
                if svg_arc.is_straight_line() {
                    builder.line_to(to.to_lyon());
                } else {
                    svg_arc.for_each_quadratic_bezier(&mut |q: &QuadraticBezierSegment<f32>| {
                        builder.quadratic_bezier_to(q.ctrl, q.to);
                    });
                }
                current = to;
            }
            PathInstruction::Close => {
                builder.end(true);
                open = false;
                current = start;
            }
            PathInstruction::MoveTo(_) => {}
        }
    }

    if open {
        builder.end(false);
    }
    builder.build()
}
