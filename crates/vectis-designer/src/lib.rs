//! # Vectis Designer
//!
//! The editing core of a vector-graphics authoring tool: a layer scene graph,
//! a node-based path model and a transactional command history.
//!
//! ## Architecture
//!
//! ```text
//! Document (layer arena + swatches + event bus)
//!   ├── Layers (groups, shapes, paths, text, clones)
//!   └── Gradients
//!
//! Commands (transform, z-order, paint, path edits, subdivide, ...)
//!   └── History (undo/redo stacks, merge, position replay)
//! ```
//!
//! Every mutation an interactive tool makes is a [`Command`] executed through
//! a [`History`]. Changes are published on the document's
//! [`EventBus`](vectis_core::EventBus).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vectis_designer::{Document, History, Layer, ShapeGeometry, TransformCommand};
//! use vectis_designer::geometry::Point;
//!
//! let mut doc = Document::new();
//! let rect = doc.add_layer(
//!     doc.root(),
//!     Layer::shape("Rect", ShapeGeometry::Rectangle { width: 10.0, height: 10.0, corner_radius: 0.0 }),
//! )?;
//!
//! let history = History::new();
//! history.execute(&mut doc, Box::new(TransformCommand::translate(vec![rect], Point::new(5.0, 0.0))))?;
//! history.undo(&mut doc)?;
//! ```

pub mod commands;
pub mod geometry;
pub mod history;
pub mod scene;

pub use commands::{
    AddLayerCommand, AlignCommand, Alignment, ApplyFillCommand, ApplyStrokeCommand,
    ChangeZIndexCommand, Command, CommandMeta, CompoundCommand, ConvertToPathCommand,
    GradientOperation, GroupCommand, ModifyGradientCommand, ModifyPathCommand, PathOperation,
    RemoveLayerCommand, SubdividePathCommand, Target, TransformCommand, UngroupCommand,
};
pub use geometry::{Bounds, Matrix, PathInstruction, PathNode, Point, TransformComponents};
pub use history::{History, HistoryEntry};
pub use scene::{
    Brush, Color, Document, GeometryResolver, Gradient, GradientKind, GradientStop, Layer,
    LayerKind, Paint, Pen, ShapeGeometry, VectorResolver,
};
