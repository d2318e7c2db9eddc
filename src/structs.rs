//! # Core Data Structures
//!
//! This module defines the fundamental data types used throughout the library:
//!
//! - **Point**: 2D position in continuous space
//! - **Vector2D**: 2D velocity/direction vector with arithmetic operations
//! - **OrcaLine**: directed half-plane constraint in velocity space
//!
//! plus the small set of geometric predicates the rest of the crate is built
//! on (`left_of`, `dist_sq_point_segment`). All operations are pure, operate
//! on `f64` coordinates, and allocate nothing beyond their return value.

use std::ops::{Add, Mul, Neg, Sub};

/// Numerical tolerance used in every boundary comparison of the solver and
/// the constraint builders.
///
/// This is a correctness-affecting parameter, not a cosmetic one: an overly
/// tight tolerance makes the solver oscillate at degenerate tangencies, an
/// overly loose one permits visible interpenetration between agents.
pub const EPSILON: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        self.distance_sq(other).sqrt()
    }

    pub fn distance_sq(&self, other: &Point) -> f64 {
        (self.x - other.x).powi(2) + (self.y - other.y).powi(2)
    }
}

impl Sub for Point {
    type Output = Vector2D;

    fn sub(self, other: Point) -> Vector2D {
        Vector2D {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Add<Vector2D> for Point {
    type Output = Point;

    fn add(self, other: Vector2D) -> Point {
        Point {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2D {
    pub x: f64,
    pub y: f64,
}

impl Vector2D {
    pub fn new(x: f64, y: f64) -> Self {
        Vector2D { x, y }
    }

    pub fn zero() -> Self {
        Vector2D { x: 0.0, y: 0.0 }
    }

    pub fn magnitude(&self) -> f64 {
        self.magnitude_sq().sqrt()
    }

    pub fn magnitude_sq(&self) -> f64 {
        self.x * self.x + self.y * self.y
    }

    /// Returns the unit vector in this direction, or the zero vector if this
    /// vector has zero length.
    pub fn normalize(&self) -> Vector2D {
        let mag = self.magnitude();
        if mag > 0.0 {
            Vector2D {
                x: self.x / mag,
                y: self.y / mag,
            }
        } else {
            Vector2D::zero()
        }
    }

    pub fn dot(&self, other: &Vector2D) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 2D cross product (determinant). Positive when `other` lies
    /// counterclockwise of `self`.
    pub fn det(&self, other: &Vector2D) -> f64 {
        self.x * other.y - self.y * other.x
    }

    /// Counterclockwise perpendicular.
    pub fn perpendicular(&self) -> Vector2D {
        Vector2D {
            x: -self.y,
            y: self.x,
        }
    }
}

impl Add for Vector2D {
    type Output = Vector2D;

    fn add(self, other: Vector2D) -> Vector2D {
        Vector2D {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

impl Sub for Vector2D {
    type Output = Vector2D;

    fn sub(self, other: Vector2D) -> Vector2D {
        Vector2D {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }
}

impl Mul<f64> for Vector2D {
    type Output = Vector2D;

    fn mul(self, scalar: f64) -> Vector2D {
        Vector2D {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }
}

impl Neg for Vector2D {
    type Output = Vector2D;

    fn neg(self) -> Vector2D {
        Vector2D {
            x: -self.x,
            y: -self.y,
        }
    }
}

/// Represents an avoidance constraint as a directed line in velocity space.
///
/// The feasible region is the half-plane to the *left* of the line through
/// `point` with direction `direction`: a velocity `v` satisfies the
/// constraint when `direction.det(&(v - point)) >= 0`.
#[derive(Debug, Clone, Copy)]
pub struct OrcaLine {
    /// A point on the dividing line of the half-plane
    pub point: Vector2D,
    /// The direction of the dividing line (normalized)
    pub direction: Vector2D,
}

impl OrcaLine {
    pub fn new(point: Vector2D, direction: Vector2D) -> Self {
        OrcaLine { point, direction }
    }
}

/// Signed "left-of" test: positive when `c` lies strictly to the left of the
/// directed line from `a` through `b`, zero when collinear.
pub fn left_of(a: Point, b: Point, c: Point) -> f64 {
    (b - a).det(&(c - a))
}

/// Squared distance from point `c` to the line segment `ab`.
pub fn dist_sq_point_segment(a: Point, b: Point, c: Point) -> f64 {
    let seg = b - a;
    let seg_len_sq = seg.magnitude_sq();
    if seg_len_sq == 0.0 {
        return c.distance_sq(&a);
    }

    let r = (c - a).dot(&seg) / seg_len_sq;
    if r < 0.0 {
        c.distance_sq(&a)
    } else if r > 1.0 {
        c.distance_sq(&b)
    } else {
        c.distance_sq(&(a + seg * r))
    }
}
