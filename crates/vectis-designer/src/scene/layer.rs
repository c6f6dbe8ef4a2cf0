//! Layer entity and its variants.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use vectis_core::LayerId;

use super::paint::{Brush, Pen};
use crate::geometry::{Matrix, PathInstruction, PathNode, Point, TransformComponents};

/// Bezier handle length for a quarter circle of radius 1.
const KAPPA: f64 = 0.552_284_749_830_793_4;

/// Optional fill and stroke of a paintable layer.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Paint {
    pub fill: Option<Brush>,
    pub stroke: Option<Pen>,
}

/// Parametric shape geometry, in local coordinates with the top-left of the
/// bounding box at the origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ShapeGeometry {
    Rectangle {
        width: f64,
        height: f64,
        corner_radius: f64,
    },
    Ellipse {
        radius_x: f64,
        radius_y: f64,
    },
    /// Regular polygon with the first vertex at the top.
    Polygon { sides: u32, radius: f64 },
}

impl ShapeGeometry {
    pub fn name(&self) -> &'static str {
        match self {
            ShapeGeometry::Rectangle { .. } => "Rectangle",
            ShapeGeometry::Ellipse { .. } => "Ellipse",
            ShapeGeometry::Polygon { .. } => "Polygon",
        }
    }

    /// Outline as a closed instruction stream.
    pub fn instructions(&self) -> Vec<PathInstruction> {
        match *self {
            ShapeGeometry::Rectangle {
                width,
                height,
                corner_radius,
            } => rectangle(width, height, corner_radius),
            ShapeGeometry::Ellipse { radius_x, radius_y } => {
                ellipse(Point::new(radius_x, radius_y), radius_x, radius_y)
            }
            ShapeGeometry::Polygon { sides, radius } => polygon(sides.max(3), radius),
        }
    }
}

fn rectangle(width: f64, height: f64, corner_radius: f64) -> Vec<PathInstruction> {
    let r = corner_radius.clamp(0.0, width.min(height) / 2.0);
    if r <= 0.0 {
        return vec![
            PathInstruction::MoveTo(Point::new(0.0, 0.0)),
            PathInstruction::LineTo(Point::new(width, 0.0)),
            PathInstruction::LineTo(Point::new(width, height)),
            PathInstruction::LineTo(Point::new(0.0, height)),
            PathInstruction::Close,
        ];
    }

    let k = r * (1.0 - KAPPA);
    let corner = |c1: Point, c2: Point, to: Point| PathInstruction::CubicTo {
        control1: c1,
        control2: c2,
        to,
    };
    vec![
        PathInstruction::MoveTo(Point::new(r, 0.0)),
        PathInstruction::LineTo(Point::new(width - r, 0.0)),
        corner(
            Point::new(width - k, 0.0),
            Point::new(width, k),
            Point::new(width, r),
        ),
        PathInstruction::LineTo(Point::new(width, height - r)),
        corner(
            Point::new(width, height - k),
            Point::new(width - k, height),
            Point::new(width - r, height),
        ),
        PathInstruction::LineTo(Point::new(r, height)),
        corner(
            Point::new(k, height),
            Point::new(0.0, height - k),
            Point::new(0.0, height - r),
        ),
        PathInstruction::LineTo(Point::new(0.0, r)),
        corner(Point::new(0.0, k), Point::new(k, 0.0), Point::new(r, 0.0)),
        PathInstruction::Close,
    ]
}

fn ellipse(center: Point, rx: f64, ry: f64) -> Vec<PathInstruction> {
    let (kx, ky) = (rx * KAPPA, ry * KAPPA);
    let (cx, cy) = (center.x, center.y);
    let quarter = |c1: (f64, f64), c2: (f64, f64), to: (f64, f64)| PathInstruction::CubicTo {
        control1: Point::new(c1.0, c1.1),
        control2: Point::new(c2.0, c2.1),
        to: Point::new(to.0, to.1),
    };
    vec![
        PathInstruction::MoveTo(Point::new(cx + rx, cy)),
        quarter((cx + rx, cy + ky), (cx + kx, cy + ry), (cx, cy + ry)),
        quarter((cx - kx, cy + ry), (cx - rx, cy + ky), (cx - rx, cy)),
        quarter((cx - rx, cy - ky), (cx - kx, cy - ry), (cx, cy - ry)),
        quarter((cx + kx, cy - ry), (cx + rx, cy - ky), (cx + rx, cy)),
        PathInstruction::Close,
    ]
}

fn polygon(sides: u32, radius: f64) -> Vec<PathInstruction> {
    let center = Point::new(radius, radius);
    let mut out = Vec::with_capacity(sides as usize + 1);
    for i in 0..sides {
        let angle = -PI / 2.0 + 2.0 * PI * i as f64 / sides as f64;
        let p = center + Point::new(angle.cos(), angle.sin()) * radius;
        out.push(if i == 0 {
            PathInstruction::MoveTo(p)
        } else {
            PathInstruction::LineTo(p)
        });
    }
    out.push(PathInstruction::Close);
    out
}

/// Layer variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LayerKind {
    Plain,
    /// Children in z-order; later entries draw on top.
    Group { children: Vec<LayerId> },
    Shape {
        geometry: ShapeGeometry,
        paint: Paint,
    },
    Path {
        nodes: Vec<PathNode>,
        paint: Paint,
    },
    /// Glyph outlines come from an external resolver.
    Text {
        text: String,
        font_family: String,
        font_size: f64,
        paint: Paint,
    },
    /// Draws the geometry and paint of another layer.
    Clone { source: LayerId },
}

impl LayerKind {
    pub fn name(&self) -> &'static str {
        match self {
            LayerKind::Plain => "plain",
            LayerKind::Group { .. } => "group",
            LayerKind::Shape { .. } => "shape",
            LayerKind::Path { .. } => "path",
            LayerKind::Text { .. } => "text",
            LayerKind::Clone { .. } => "clone",
        }
    }
}

/// A node of the scene graph.
///
/// Layers live in a [`Document`](super::Document) arena. The parent link is
/// an id; the owning group's child list is the only owning edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub(crate) id: LayerId,
    pub(crate) name: String,
    pub(crate) opacity: f64,
    pub(crate) visible: bool,
    pub(crate) selected: bool,
    pub(crate) transform: TransformComponents,
    pub(crate) parent: Option<LayerId>,
    pub(crate) kind: LayerKind,
}

impl Layer {
    pub fn new(name: impl Into<String>, kind: LayerKind) -> Self {
        Self {
            id: LayerId::new(),
            name: name.into(),
            opacity: 1.0,
            visible: true,
            selected: false,
            transform: TransformComponents::default(),
            parent: None,
            kind,
        }
    }

    pub fn plain(name: impl Into<String>) -> Self {
        Self::new(name, LayerKind::Plain)
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(
            name,
            LayerKind::Group {
                children: Vec::new(),
            },
        )
    }

    pub fn shape(name: impl Into<String>, geometry: ShapeGeometry) -> Self {
        Self::new(
            name,
            LayerKind::Shape {
                geometry,
                paint: Paint::default(),
            },
        )
    }

    pub fn path(name: impl Into<String>, mut nodes: Vec<PathNode>) -> Self {
        crate::geometry::renumber(&mut nodes, 0);
        Self::new(
            name,
            LayerKind::Path {
                nodes,
                paint: Paint::default(),
            },
        )
    }

    pub fn text(
        name: impl Into<String>,
        text: impl Into<String>,
        font_family: impl Into<String>,
        font_size: f64,
    ) -> Self {
        Self::new(
            name,
            LayerKind::Text {
                text: text.into(),
                font_family: font_family.into(),
                font_size,
                paint: Paint::default(),
            },
        )
    }

    pub fn clone_of(name: impl Into<String>, source: LayerId) -> Self {
        Self::new(name, LayerKind::Clone { source })
    }

    pub fn with_fill(mut self, brush: Brush) -> Self {
        if let Some(paint) = self.paint_mut() {
            paint.fill = Some(brush);
        }
        self
    }

    pub fn with_stroke(mut self, pen: Pen) -> Self {
        if let Some(paint) = self.paint_mut() {
            paint.stroke = Some(pen);
        }
        self
    }

    pub fn with_transform(mut self, transform: TransformComponents) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_position(mut self, position: Point) -> Self {
        self.transform.position = position;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn parent(&self) -> Option<LayerId> {
        self.parent
    }

    pub fn kind(&self) -> &LayerKind {
        &self.kind
    }

    pub fn transform(&self) -> &TransformComponents {
        &self.transform
    }

    /// Local transform matrix derived from the stored components.
    pub fn local_matrix(&self) -> Matrix {
        self.transform.matrix()
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, LayerKind::Group { .. })
    }

    pub fn children(&self) -> Option<&[LayerId]> {
        match &self.kind {
            LayerKind::Group { children } => Some(children),
            _ => None,
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<LayerId>> {
        match &mut self.kind {
            LayerKind::Group { children } => Some(children),
            _ => None,
        }
    }

    pub fn nodes(&self) -> Option<&[PathNode]> {
        match &self.kind {
            LayerKind::Path { nodes, .. } => Some(nodes),
            _ => None,
        }
    }

    /// Own paint of shape, path and text layers.
    pub fn paint(&self) -> Option<&Paint> {
        match &self.kind {
            LayerKind::Shape { paint, .. }
            | LayerKind::Path { paint, .. }
            | LayerKind::Text { paint, .. } => Some(paint),
            _ => None,
        }
    }

    pub(crate) fn paint_mut(&mut self) -> Option<&mut Paint> {
        match &mut self.kind {
            LayerKind::Shape { paint, .. }
            | LayerKind::Path { paint, .. }
            | LayerKind::Text { paint, .. } => Some(paint),
            _ => None,
        }
    }

    pub fn fill(&self) -> Option<&Brush> {
        self.paint().and_then(|p| p.fill.as_ref())
    }

    pub fn stroke(&self) -> Option<&Pen> {
        self.paint().and_then(|p| p.stroke.as_ref())
    }
}
