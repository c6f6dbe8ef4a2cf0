//! Path node model.
//!
//! A path layer stores its outline as a dense list of [`PathNode`]s. Each node
//! describes the segment arriving at it; the first node of a figure is the
//! move point. Figure boundaries are carried by the optional [`FigureEnd`] tag
//! on the last node of each figure.

use serde::{Deserialize, Serialize};

use super::math::Point;

/// How a figure ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FigureEnd {
    /// The figure joins back to its move point.
    Closed,
    /// The figure is left open.
    Open,
}

impl FigureEnd {
    pub fn opposite(self) -> Self {
        match self {
            FigureEnd::Closed => FigureEnd::Open,
            FigureEnd::Open => FigureEnd::Closed,
        }
    }
}

/// Elliptical arc parameters for an arriving arc segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcSegment {
    pub radii: Point,
    /// X axis rotation in degrees.
    pub x_rotation: f64,
    pub large_arc: bool,
    pub sweep: bool,
}

/// Node variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    Line,
    Quadratic,
    Cubic,
    Arc(ArcSegment),
    /// Explicit figure end; position is ignored.
    Terminator,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Line => "line",
            NodeKind::Quadratic => "quadratic",
            NodeKind::Cubic => "cubic",
            NodeKind::Arc(_) => "arc",
            NodeKind::Terminator => "terminator",
        }
    }
}

/// A vertex of a path layer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathNode {
    pub index: usize,
    pub position: Point,
    pub incoming: Option<Point>,
    pub outgoing: Option<Point>,
    pub end: Option<FigureEnd>,
    pub kind: NodeKind,
}

impl PathNode {
    pub fn new(kind: NodeKind, position: Point) -> Self {
        Self {
            index: 0,
            position,
            incoming: None,
            outgoing: None,
            end: None,
            kind,
        }
    }

    pub fn line(position: Point) -> Self {
        Self::new(NodeKind::Line, position)
    }

    pub fn quadratic(control: Point, position: Point) -> Self {
        Self {
            incoming: Some(control),
            ..Self::new(NodeKind::Quadratic, position)
        }
    }

    /// Cubic node; the first control point lives on the previous node.
    pub fn cubic(incoming: Point, position: Point) -> Self {
        Self {
            incoming: Some(incoming),
            ..Self::new(NodeKind::Cubic, position)
        }
    }

    pub fn arc(arc: ArcSegment, position: Point) -> Self {
        Self::new(NodeKind::Arc(arc), position)
    }

    pub fn terminator() -> Self {
        Self::new(NodeKind::Terminator, Point::ZERO)
    }

    pub fn with_outgoing(mut self, outgoing: Point) -> Self {
        self.outgoing = Some(outgoing);
        self
    }

    pub fn with_end(mut self, end: FigureEnd) -> Self {
        self.end = Some(end);
        self
    }

    pub fn is_terminator(&self) -> bool {
        matches!(self.kind, NodeKind::Terminator)
    }

    /// Translate the position together with both handles.
    pub fn translate(&mut self, delta: Point) {
        self.position += delta;
        if let Some(h) = self.incoming.as_mut() {
            *h += delta;
        }
        if let Some(h) = self.outgoing.as_mut() {
            *h += delta;
        }
    }
}

/// Restore the dense index invariant from `start` onwards.
pub fn renumber(nodes: &mut [PathNode], start: usize) {
    for (i, node) in nodes.iter_mut().enumerate().skip(start) {
        node.index = i;
    }
}

/// Whether `nodes[index]` starts a figure.
pub fn starts_figure(nodes: &[PathNode], index: usize) -> bool {
    index == 0 || nodes.get(index - 1).is_some_and(|prev| prev.end.is_some())
}
