//! Geometry and node model.
//!
//! Pure data and pure functions: points, rectangles, affine transforms, path
//! nodes, instruction streams and curve subdivision.

pub mod instructions;
pub mod math;
pub mod node;
pub mod subdivide;

pub use instructions::{
    instructions_from_nodes, nodes_from_instructions, to_lyon_path, PathInstruction,
};
pub use math::{
    matrix_approx_eq, normalize_degrees, skew, translation, Bounds, Matrix, Point,
    TransformComponents,
};
pub use node::{renumber, starts_figure, ArcSegment, FigureEnd, NodeKind, PathNode};
pub use subdivide::{
    eval_cubic, plan_subdivision, promote_quadratic, split_cubic, MissingHandle, SegmentShape,
    Subdivision,
};
