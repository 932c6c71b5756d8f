//! Smallest enclosing circle of a point set.
//!
//! Incremental (Welzl-style) construction: whenever a point falls outside
//! the current circle, the circle is rebuilt with that point on its
//! boundary, recursing on up to three boundary points. Points are taken
//! in input order, so the result is deterministic. Expected linear time
//! on shuffled input, cubic worst case; both are fine for site counts of
//! a phylogeny.

use serde::Serialize;

use super::Point;

const EPS: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
}

impl Circle {
    pub fn contains(&self, p: Point) -> bool {
        self.center.distance(p) <= self.radius * (1.0 + EPS) + EPS
    }

    fn from_two(a: Point, b: Point) -> Self {
        let center = Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
        Self {
            center,
            radius: center.distance(a),
        }
    }

    /// Circumcircle of three points, or `None` if they are collinear.
    fn from_three(a: Point, b: Point, c: Point) -> Option<Self> {
        let d = 2.0 * (a.x * (b.y - c.y) + b.x * (c.y - a.y) + c.x * (a.y - b.y));
        if d.abs() < f64::EPSILON {
            return None;
        }
        let a2 = a.x * a.x + a.y * a.y;
        let b2 = b.x * b.x + b.y * b.y;
        let c2 = c.x * c.x + c.y * c.y;
        let center = Point::new(
            (a2 * (b.y - c.y) + b2 * (c.y - a.y) + c2 * (a.y - b.y)) / d,
            (a2 * (c.x - b.x) + b2 * (a.x - c.x) + c2 * (b.x - a.x)) / d,
        );
        Some(Self {
            center,
            radius: center.distance(a),
        })
    }
}

/// Smallest circle containing every point. `None` for an empty slice.
pub fn smallest_enclosing_circle(points: &[Point]) -> Option<Circle> {
    let (&first, rest) = points.split_first()?;
    let mut circle = Circle {
        center: first,
        radius: 0.0,
    };
    for (i, &p) in rest.iter().enumerate() {
        if !circle.contains(p) {
            circle = with_one_boundary(&points[..=i], p);
        }
    }
    Some(circle)
}

fn with_one_boundary(points: &[Point], p: Point) -> Circle {
    let mut circle = Circle {
        center: p,
        radius: 0.0,
    };
    for (i, &q) in points.iter().enumerate() {
        if !circle.contains(q) {
            circle = with_two_boundary(&points[..i], p, q);
        }
    }
    circle
}

fn with_two_boundary(points: &[Point], p: Point, q: Point) -> Circle {
    let mut circle = Circle::from_two(p, q);
    for &r in points {
        if !circle.contains(r) {
            // Collinear triples: the widest pair spans the others.
            circle = Circle::from_three(p, q, r).unwrap_or_else(|| {
                [
                    Circle::from_two(p, q),
                    Circle::from_two(p, r),
                    Circle::from_two(q, r),
                ]
                .into_iter()
                .fold(Circle::from_two(p, q), |best, c| {
                    if c.radius > best.radius { c } else { best }
                })
            });
        }
    }
    circle
}
