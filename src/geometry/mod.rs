//! Planar and polar geometry primitives.
//!
//! Angles are radians. Polar angles are stored wrapped into `[0, 2π)`;
//! algorithms that need a continuous frame around a reference angle use
//! [`wrap_angle_from`] to unwrap into `[β, β + 2π)`.

mod circle;

pub use circle::{Circle, smallest_enclosing_circle};

use std::f64::consts::TAU;

use serde::Serialize;

/// A point in the plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// A point in polar coordinates around the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PolarPoint {
    pub r: f64,
    /// Angle in `[0, 2π)`.
    pub phi: f64,
}

impl PolarPoint {
    /// Create a polar point; `phi` is wrapped into `[0, 2π)`.
    #[inline]
    pub fn new(r: f64, phi: f64) -> Self {
        Self {
            r,
            phi: wrap_angle(phi),
        }
    }

    pub fn from_cartesian(p: Point) -> Self {
        Self::new(p.x.hypot(p.y), p.y.atan2(p.x))
    }

    pub fn to_cartesian(self) -> Point {
        Point::new(self.r * self.phi.cos(), self.r * self.phi.sin())
    }
}

/// Wrap an angle into `[0, 2π)`.
#[inline]
pub fn wrap_angle(alpha: f64) -> f64 {
    wrap_angle_from(alpha, 0.0)
}

/// Wrap an angle into `[beta, beta + 2π)`.
#[inline]
pub fn wrap_angle_from(alpha: f64, beta: f64) -> f64 {
    let wrapped = (alpha - beta).rem_euclid(TAU) + beta;
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= beta + TAU { beta } else { wrapped }
}

/// Shortest angular distance between two angles, in `[0, π]`.
#[inline]
pub fn angular_distance(a: f64, b: f64) -> f64 {
    let d = wrap_angle(a - b);
    d.min(TAU - d)
}

/// A counter-clockwise arc `[from, to]` on the circle.
///
/// `from` is kept in `[0, 2π)` and `to` in `[from, from + 2π]`, so the
/// arc never has to be split. An arc spanning at least a full turn is
/// stored as the full circle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CircularRange {
    from: f64,
    to: f64,
}

impl CircularRange {
    pub fn new(from: f64, to: f64) -> Self {
        if to - from >= TAU {
            return Self::full();
        }
        let from = wrap_angle(from);
        Self {
            from,
            to: wrap_angle_from(to, from),
        }
    }

    pub fn full() -> Self {
        Self { from: 0.0, to: TAU }
    }

    pub fn from(&self) -> f64 {
        self.from
    }

    pub fn to(&self) -> f64 {
        self.to
    }

    pub fn length(&self) -> f64 {
        self.to - self.from
    }

    pub fn midpoint(&self) -> f64 {
        wrap_angle(self.from + self.length() / 2.0)
    }

    /// Whether `angle` lies on the arc, endpoints included.
    pub fn contains(&self, angle: f64) -> bool {
        wrap_angle_from(angle, self.from) <= self.to
    }
}

impl Default for CircularRange {
    fn default() -> Self {
        Self::full()
    }
}
