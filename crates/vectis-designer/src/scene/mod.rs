//! Scene graph.
//!
//! Layers live in a [`Document`] arena addressed by [`LayerId`](vectis_core::LayerId).
//! Groups own their children; every other link is a plain id.

pub mod document;
pub mod layer;
pub mod paint;
mod query;
pub mod resolver;

pub use document::Document;
pub use layer::{Layer, LayerKind, Paint, ShapeGeometry};
pub use paint::{Brush, Color, Gradient, GradientKind, GradientStop, Pen};
pub use resolver::{GeometryResolver, VectorResolver};
