//! Geographic sites and their feasibility intervals.

use serde::Serialize;

use crate::geometry::{CircularRange, Point, PolarPoint};

/// A closed linear range `[from, to]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Interval {
    pub from: f64,
    pub to: f64,
}

impl Interval {
    #[inline]
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    /// Interval of half-width `half` around `center`.
    #[inline]
    pub fn around(center: f64, half: f64) -> Self {
        Self::new(center - half, center + half)
    }

    #[inline]
    pub fn midpoint(&self) -> f64 {
        (self.from + self.to) * 0.5
    }

    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        self.from <= value && value <= self.to
    }
}

/// A fixed anchor point for one leaf.
///
/// The position never changes once the layout context is built. The
/// intervals are written by the feasibility computation of the
/// continuous pipeline; rectangular layouts use `interval`, circular
/// layouts use `circular_interval` (absolute angles) and
/// `translated_interval` (angles relative to the reference site).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub position: Point,
    pub interval: Interval,
    pub circular_interval: CircularRange,
    pub translated_interval: Interval,
}

impl Site {
    pub fn new(x: f64, y: f64) -> Self {
        let position = Point::new(x, y);
        Self {
            position,
            interval: Interval::new(x, x),
            circular_interval: CircularRange::full(),
            translated_interval: Interval::default(),
        }
    }

    #[inline]
    pub fn x(&self) -> f64 {
        self.position.x
    }

    #[inline]
    pub fn y(&self) -> f64 {
        self.position.y
    }

    #[inline]
    pub fn polar(&self) -> PolarPoint {
        PolarPoint::from_cartesian(self.position)
    }
}

/// Build sites from a flat `[x0, y0, x1, y1, ...]` buffer.
pub fn sites_from_flat(coords: &[f64]) -> Vec<Site> {
    coords
        .chunks_exact(2)
        .map(|pair| Site::new(pair[0], pair[1]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interval_around() {
        let interval = Interval::around(2.0, 0.5);
        assert_eq!(interval, Interval::new(1.5, 2.5));
        assert_eq!(interval.midpoint(), 2.0);
        assert!(interval.contains(1.5));
        assert!(interval.contains(2.5));
        assert!(!interval.contains(2.6));
    }

    #[test]
    fn test_new_site_interval_is_degenerate() {
        let site = Site::new(3.0, -1.0);
        assert_eq!(site.interval, Interval::new(3.0, 3.0));
        assert_eq!(site.x(), 3.0);
        assert_eq!(site.y(), -1.0);
    }

    #[test]
    fn test_sites_from_flat_ignores_trailing_value() {
        let sites = sites_from_flat(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[1].position, Point::new(2.0, 3.0));
    }
}
