//! Brushes, pens and gradient swatches.

use serde::{Deserialize, Serialize};
use vectis_core::GradientId;

use crate::geometry::Point;

/// RGBA colour with components in 0..=1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0.0, 0.0, 0.0);
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    pub const fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Component-wise sum, clamped to 0..=1.
    pub fn offset(&self, delta: &Color) -> Color {
        let c = |v: f64| v.clamp(0.0, 1.0);
        Color {
            r: c(self.r + delta.r),
            g: c(self.g + delta.g),
            b: c(self.b + delta.b),
            a: c(self.a + delta.a),
        }
    }
}

/// Fill paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Brush {
    Solid(Color),
    /// Reference into the document swatch list.
    Gradient(GradientId),
}

/// Stroke paint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pen {
    pub brush: Brush,
    pub width: f64,
}

impl Pen {
    pub fn new(brush: Brush, width: f64) -> Self {
        Self { brush, width }
    }

    pub fn solid(color: Color, width: f64) -> Self {
        Self::new(Brush::Solid(color), width)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradientKind {
    Linear,
    Radial,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    pub offset: f64,
    pub color: Color,
}

impl GradientStop {
    pub fn new(offset: f64, color: Color) -> Self {
        Self { offset, color }
    }
}

/// Gradient resource owned by a document.
///
/// `focus` only matters for radial gradients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    pub id: GradientId,
    pub kind: GradientKind,
    pub start: Point,
    pub end: Point,
    pub focus: Point,
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    pub fn linear(start: Point, end: Point, stops: Vec<GradientStop>) -> Self {
        Self {
            id: GradientId::new(),
            kind: GradientKind::Linear,
            start,
            end,
            focus: start,
            stops,
        }
    }

    pub fn radial(center: Point, edge: Point, focus: Point, stops: Vec<GradientStop>) -> Self {
        Self {
            id: GradientId::new(),
            kind: GradientKind::Radial,
            start: center,
            end: edge,
            focus,
            stops,
        }
    }
}
