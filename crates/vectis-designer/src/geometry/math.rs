//! Points, rectangles and affine transforms.
//!
//! All editing geometry is kept in `f64`. Matrices use the row-vector
//! convention of `euclid` (re-exported by lyon): `a.then(&b)` applies `a`
//! first, which matches the left-to-right products used by layer transforms.

use lyon::geom::euclid;
use serde::{Deserialize, Serialize};
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use vectis_core::SceneError;

/// 2-D affine matrix in row-vector convention.
pub type Matrix = euclid::default::Transform2D<f64>;

const EPSILON: f64 = 1e-12;

/// Represents a 2D point (or displacement) with X and Y coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Linear interpolation towards `other`.
    pub fn lerp(&self, other: Point, t: f64) -> Point {
        Point::new(
            self.x + (other.x - self.x) * t,
            self.y + (other.y - self.y) * t,
        )
    }

    pub fn dot(&self, other: Point) -> f64 {
        self.x * other.x + self.y * other.y
    }

    pub fn length(&self) -> f64 {
        self.dot(*self).sqrt()
    }

    /// Map this point through `matrix` (translation included).
    pub fn transform(&self, matrix: &Matrix) -> Point {
        let p = matrix.transform_point(euclid::default::Point2D::new(self.x, self.y));
        Point::new(p.x, p.y)
    }

    /// Map this point through the linear part of `matrix` only.
    pub fn transform_vector(&self, matrix: &Matrix) -> Point {
        let v = matrix.transform_vector(euclid::default::Vector2D::new(self.x, self.y));
        Point::new(v.x, v.y)
    }

    pub(crate) fn to_lyon(self) -> lyon::math::Point {
        lyon::math::point(self.x as f32, self.y as f32)
    }

    pub(crate) fn from_lyon(p: lyon::math::Point) -> Point {
        Point::new(p.x as f64, p.y as f64)
    }
}

impl Add for Point {
    type Output = Point;
    fn add(self, rhs: Point) -> Point {
        Point::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Point {
    fn add_assign(&mut self, rhs: Point) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Point {
    type Output = Point;
    fn sub(self, rhs: Point) -> Point {
        Point::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point {
    type Output = Point;
    fn mul(self, rhs: f64) -> Point {
        Point::new(self.x * rhs, self.y * rhs)
    }
}

impl Neg for Point {
    type Output = Point;
    fn neg(self) -> Point {
        Point::new(-self.x, -self.y)
    }
}

/// Axis-aligned rectangle.
///
/// `Bounds::EMPTY` is the all-zero rectangle reported for content-less layers.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    pub const EMPTY: Bounds = Bounds {
        min_x: 0.0,
        min_y: 0.0,
        max_x: 0.0,
        max_y: 0.0,
    };

    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    pub fn from_points<I: IntoIterator<Item = Point>>(points: I) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Bounds::new(first.x, first.y, first.x, first.y);
        for p in iter {
            bounds.min_x = bounds.min_x.min(p.x);
            bounds.min_y = bounds.min_y.min(p.y);
            bounds.max_x = bounds.max_x.max(p.x);
            bounds.max_y = bounds.max_y.max(p.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn is_empty(&self) -> bool {
        *self == Bounds::EMPTY
    }

    pub fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Axis-aligned bounds of this rectangle after mapping through `matrix`.
    pub fn transform(&self, matrix: &Matrix) -> Bounds {
        Bounds::from_points(self.corners().iter().map(|c| c.transform(matrix)))
            .unwrap_or(Bounds::EMPTY)
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// The five stored transform components of a layer.
///
/// Angles are in degrees. Only the x component of `shear` survives
/// decomposition; a y shear can be composed but is folded into the others.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformComponents {
    pub origin: Point,
    pub position: Point,
    pub scale: Point,
    pub rotation: f64,
    pub shear: Point,
}

impl Default for TransformComponents {
    fn default() -> Self {
        Self {
            origin: Point::ZERO,
            position: Point::ZERO,
            scale: Point::new(1.0, 1.0),
            rotation: 0.0,
            shear: Point::ZERO,
        }
    }
}

impl TransformComponents {
    /// `Translate(-origin) · Scale · Skew · Rotate · Translate(origin) · Translate(position)`
    pub fn matrix(&self) -> Matrix {
        Matrix::translation(-self.origin.x, -self.origin.y)
            .then(&self.linear())
            .then_translate(euclid::default::Vector2D::new(
                self.origin.x + self.position.x,
                self.origin.y + self.position.y,
            ))
    }

    /// `Scale · Skew · Rotate` without any translation.
    pub fn linear(&self) -> Matrix {
        Matrix::scale(self.scale.x, self.scale.y)
            .then(&skew(self.shear.x, self.shear.y))
            .then(&Matrix::rotation(euclid::Angle::degrees(self.rotation)))
    }

    /// Decompose `matrix` into components sharing the given origin.
    ///
    /// Exact for translation, scale, rotation and x skew. A reflection comes
    /// back as a rotation with a negative `scale.y` that composes to the same
    /// matrix; singular matrices fail.
    pub fn decompose(matrix: &Matrix, origin: Point) -> Result<Self, SceneError> {
        let det = matrix.determinant();
        if !det.is_finite() || det.abs() < EPSILON {
            return Err(SceneError::SingularTransform);
        }

        let row1 = Point::new(matrix.m11, matrix.m12);
        let row2 = Point::new(matrix.m21, matrix.m22);

        let scale_x = row1.length();
        let angle = row1.y.atan2(row1.x);
        let (s, c) = angle.sin_cos();
        let scale_y = row2.dot(Point::new(-s, c));
        let skew_tan = row2.dot(Point::new(c, s)) / scale_y;

        let components = TransformComponents {
            origin,
            position: Point::ZERO,
            scale: Point::new(scale_x, scale_y),
            rotation: angle.to_degrees(),
            shear: Point::new(skew_tan.atan().to_degrees(), 0.0),
        };

        // translation = -origin·L + origin + position
        let translation = Point::new(matrix.m31, matrix.m32);
        let position = translation - origin + origin.transform_vector(&components.linear());

        Ok(TransformComponents {
            position,
            ..components
        })
    }

    /// Shift position by `delta` (in the parent's space).
    pub fn translated(&self, delta: Point) -> Self {
        Self {
            position: self.position + delta,
            ..*self
        }
    }

    /// Component-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &Self, tolerance: f64) -> bool {
        let close = |a: f64, b: f64| (a - b).abs() <= tolerance;
        let close_pt = |a: Point, b: Point| close(a.x, b.x) && close(a.y, b.y);
        close_pt(self.origin, other.origin)
            && close_pt(self.position, other.position)
            && close_pt(self.scale, other.scale)
            && close(normalize_degrees(self.rotation), normalize_degrees(other.rotation))
            && close_pt(self.shear, other.shear)
    }
}

/// Skew matrix from shear angles in degrees.
pub fn skew(x_degrees: f64, y_degrees: f64) -> Matrix {
    Matrix::new(
        1.0,
        y_degrees.to_radians().tan(),
        x_degrees.to_radians().tan(),
        1.0,
        0.0,
        0.0,
    )
}

/// Translation matrix for a displacement.
pub fn translation(delta: Point) -> Matrix {
    Matrix::translation(delta.x, delta.y)
}

/// Entry-wise matrix comparison within `tolerance`.
pub fn matrix_approx_eq(a: &Matrix, b: &Matrix, tolerance: f64) -> bool {
    a.to_array()
        .iter()
        .zip(b.to_array().iter())
        .all(|(x, y)| (x - y).abs() <= tolerance)
}

/// Map an angle into (-180, 180].
pub fn normalize_degrees(angle: f64) -> f64 {
    let mut a = angle % 360.0;
    if a <= -180.0 {
        a += 360.0;
    } else if a > 180.0 {
        a -= 360.0;
    }
    a
}
