//! Bezier subdivision with De Casteljau's algorithm.

use vectis_core::{CommandError, SceneError};

use super::math::Point;
use super::node::{NodeKind, PathNode};

/// Which side of a single-handle segment had no control point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingHandle {
    /// The left node had no outgoing handle.
    Outgoing,
    /// The right node had no incoming handle.
    Incoming,
}

/// Shape of the segment that was split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentShape {
    Line,
    Cubic,
    /// One handle only; promoted to a cubic before splitting.
    Mixed(MissingHandle),
}

/// Replacement nodes for a split edge.
#[derive(Debug, Clone, PartialEq)]
pub struct Subdivision {
    pub shape: SegmentShape,
    pub left: PathNode,
    pub middle: PathNode,
    pub right: PathNode,
}

/// Split a cubic Bezier at `t`, returning both halves.
pub fn split_cubic(curve: [Point; 4], t: f64) -> ([Point; 4], [Point; 4]) {
    let [p0, p1, p2, p3] = curve;
    let p01 = p0.lerp(p1, t);
    let p12 = p1.lerp(p2, t);
    let p23 = p2.lerp(p3, t);
    let p012 = p01.lerp(p12, t);
    let p123 = p12.lerp(p23, t);
    let mid = p012.lerp(p123, t);
    ([p0, p01, p012, mid], [mid, p123, p23, p3])
}

/// Evaluate a cubic Bezier at `t`.
pub fn eval_cubic(curve: [Point; 4], t: f64) -> Point {
    split_cubic(curve, t).0[3]
}

/// Control points of the cubic equivalent to the quadratic `p0, control, p3`.
pub fn promote_quadratic(p0: Point, control: Point, p3: Point) -> (Point, Point) {
    let c1 = p0 + (control - p0) * (2.0 / 3.0);
    let c2 = p3 + (control - p3) * (2.0 / 3.0);
    (c1, c2)
}

/// Plan the split of the segment `edge -> edge + 1` at t = 0.5.
pub fn plan_subdivision(nodes: &[PathNode], edge: usize) -> Result<Subdivision, CommandError> {
    if edge + 1 >= nodes.len() {
        return Err(SceneError::IndexOutOfRange {
            index: edge + 1,
            len: nodes.len(),
        }
        .into());
    }

    let left = nodes[edge];
    let right = nodes[edge + 1];

    if left.end.is_some() || left.is_terminator() || right.is_terminator() {
        return Err(CommandError::InvalidArgument {
            reason: format!("edge {} crosses a figure end", edge),
        });
    }
    if let NodeKind::Arc(_) = right.kind {
        return Err(CommandError::UnsupportedOperation {
            operation: "subdivide".to_string(),
            reason: format!("edge {} is an arc segment", edge),
        });
    }

    let p0 = left.position;
    let p3 = right.position;

    let (shape, curve) = match (left.outgoing, right.incoming) {
        (None, None) => {
            let middle = PathNode {
                index: edge + 1,
                ..PathNode::line(p0.lerp(p3, 0.5))
            };
            return Ok(Subdivision {
                shape: SegmentShape::Line,
                left,
                middle,
                right,
            });
        }
        (Some(c1), Some(c2)) => (SegmentShape::Cubic, [p0, c1, c2, p3]),
        (Some(c), None) => {
            let (c1, c2) = promote_quadratic(p0, c, p3);
            (SegmentShape::Mixed(MissingHandle::Incoming), [p0, c1, c2, p3])
        }
        (None, Some(c)) => {
            let (c1, c2) = promote_quadratic(p0, c, p3);
            (SegmentShape::Mixed(MissingHandle::Outgoing), [p0, c1, c2, p3])
        }
    };

    let (first, second) = split_cubic(curve, 0.5);

    let new_left = PathNode {
        outgoing: Some(first[1]),
        ..left
    };
    let middle = PathNode {
        index: edge + 1,
        incoming: Some(first[2]),
        outgoing: Some(second[1]),
        ..PathNode::new(NodeKind::Cubic, first[3])
    };
    let new_right = PathNode {
        incoming: Some(second[2]),
        kind: NodeKind::Cubic,
        ..right
    };

    Ok(Subdivision {
        shape,
        left: new_left,
        middle,
        right: new_right,
    })
}
