//! Region Quadtree of circles and rectangles that keeps track of which stored shapes overlap.
//! # Contracts:
//! - Shapes are routed by their center point only; a center on a shared boundary belongs to the
//!   first quadrant (LU, RU, LD, RD) that contains it
//! - `min_node_radius` is also the largest shape extent the overlap broad-phase accounts for
//! - Single threaded; wrap the whole tree in a lock if you need to share it
//!
pub mod error;
pub mod quadtree;
pub mod shape;

pub use error::Error;
pub use quadtree::{Config, Dump, NodeId, QuadTree, Quadrant};
pub use shape::{Boundary, Circle, Rectangle, Shape};

use std::ops::{Add, AddAssign, Deref, Mul, Sub};

/// Comparison is exact, no epsilon. Node routing relies on it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point(pub [f32; 2]);

impl AddAssign for Point {
    fn add_assign(&mut self, p: Self) {
        self.0[0] += p.0[0];
        self.0[1] += p.0[1];
    }
}

impl Deref for Point {
    type Target = [f32; 2];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Add for Point {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self([self[0] - rhs[0], self[1] - rhs[1]])
    }
}

impl Mul<f32> for Point {
    type Output = Self;

    fn mul(self, rhs: f32) -> Self {
        Self([self[0] * rhs, self[1] * rhs])
    }
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self([x, y])
    }

    pub fn x(&self) -> f32 {
        self[0]
    }

    pub fn y(&self) -> f32 {
        self[1]
    }

    pub fn norm(&self) -> f32 {
        self[0].hypot(self[1])
    }

    /// Unit vector in the direction of `self`.
    ///
    /// Returns `None` for the zero vector instead of dividing by zero, callers decide what a
    /// direction-less projection means for them.
    pub fn normalize(&self) -> Option<Self> {
        let norm = self.norm();
        if norm == 0.0 || !norm.is_finite() {
            return None;
        }
        Some(Self([self[0] / norm, self[1] / norm]))
    }

    pub fn dist(&self, rhs: &Self) -> f32 {
        (*self - *rhs).norm()
    }
}

/// Handle of a shape owned by a [`QuadTree`]. Never reused within one tree.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ShapeId(pub u64);
