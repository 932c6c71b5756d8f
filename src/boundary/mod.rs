//! Drawing boundaries leaves are placed on.
//!
//! A boundary context owns the tree and its (normalized) sites and
//! derives the surface the leaves live on:
//!
//! - [`RectangularGeophylogeny`]: the top edge of a box around the sites;
//!   positions are x-coordinates.
//! - [`CircularGeophylogeny`]: a circle around the sites' smallest
//!   enclosing circle; positions are angles.
//!
//! Both expose `n` equally spaced discrete slots through [`SlotBoundary`],
//! which is all the discrete ordering needs to know about the shape.

mod circular;
mod rectangular;

pub use circular::CircularGeophylogeny;
pub use rectangular::{BoundingBox, RectangularGeophylogeny};

use serde::{Deserialize, Serialize};

use crate::config::CostKind;
use crate::error::{LayoutError, Result};
use crate::geometry::Point;
use crate::tree::{NodeId, PhyloTree, Side, Site};

/// Longest site extent after normalization.
pub const NORMALIZED_EXTENT: f64 = 10.0;

/// Shape of the leaf boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoundaryKind {
    #[default]
    Rectangular,
    Circular,
}

impl BoundaryKind {
    /// Whether the discrete ordering can use `cost` on this boundary.
    pub fn supports(self, cost: CostKind) -> bool {
        match (self, cost) {
            (_, CostKind::Euclidean) => true,
            (BoundaryKind::Rectangular, CostKind::Horizontal) => true,
            (BoundaryKind::Circular, CostKind::Radial) => true,
            _ => false,
        }
    }
}

/// A boundary with `n` discrete leaf slots.
pub trait SlotBoundary {
    const KIND: BoundaryKind;
    /// Whether slot arithmetic wraps around modulo the slot count.
    const WRAPS: bool;
    /// Which child-order flag orderings on this boundary write.
    const SIDE: Side;

    fn tree(&self) -> &PhyloTree;

    fn tree_mut(&mut self) -> &mut PhyloTree;

    fn sites(&self) -> &[Site];

    /// Number of slots; one per leaf.
    fn slot_count(&self) -> usize {
        self.tree().leaf_count()
    }

    /// Cartesian position of a slot.
    fn slot_point(&self, slot: usize) -> Point;

    /// Cost of putting `site`'s leaf into `slot`. Infinite for cost kinds
    /// the boundary does not support.
    fn slot_cost(&self, site: &Site, slot: usize, cost: CostKind) -> f64;

    /// Move a leaf onto a slot.
    fn place_leaf(&mut self, leaf: NodeId, slot: usize);
}

/// Scale sites uniformly so the x-extent becomes [`NORMALIZED_EXTENT`].
///
/// Falls back to the y-extent when every site shares the same x, and
/// leaves the sites untouched when they all coincide.
pub fn normalize_sites(sites: &mut [Site]) {
    let extent = |coord: fn(&Site) -> f64| {
        let (min, max) = sites
            .iter()
            .map(coord)
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        max - min
    };
    let (extent_x, extent_y) = (extent(Site::x), extent(Site::y));

    let scale = if extent_x > 0.0 {
        NORMALIZED_EXTENT / extent_x
    } else if extent_y > 0.0 {
        NORMALIZED_EXTENT / extent_y
    } else {
        return;
    };

    for site in sites.iter_mut() {
        *site = Site::new(site.x() * scale, site.y() * scale);
    }
}

/// Shared construction checks: sites match the leaves and are finite.
fn check_sites(tree: &PhyloTree, sites: &[Site]) -> Result<()> {
    tree.validate_sites(sites.len())?;
    match sites.iter().position(|site| !site.position.is_finite()) {
        Some(index) => Err(LayoutError::NonFiniteSite(index)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supports() {
        assert!(BoundaryKind::Rectangular.supports(CostKind::Euclidean));
        assert!(BoundaryKind::Rectangular.supports(CostKind::Horizontal));
        assert!(!BoundaryKind::Rectangular.supports(CostKind::Radial));
        assert!(BoundaryKind::Circular.supports(CostKind::Radial));
        assert!(!BoundaryKind::Circular.supports(CostKind::Horizontal));
    }

    #[test]
    fn test_normalize_uniform_scale() {
        let mut sites = vec![Site::new(0.0, 0.0), Site::new(2.0, 1.0), Site::new(4.0, -1.0)];
        normalize_sites(&mut sites);
        assert!((sites[2].x() - 10.0).abs() < 1e-12);
        assert!((sites[1].y() - 2.5).abs() < 1e-12, "y uses the x scale");
        assert!((sites[2].y() + 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_falls_back_to_y() {
        let mut sites = vec![Site::new(1.0, 0.0), Site::new(1.0, 5.0)];
        normalize_sites(&mut sites);
        assert!((sites[1].y() - 10.0).abs() < 1e-12);
        assert!((sites[0].x() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_coincident_sites_untouched() {
        let mut sites = vec![Site::new(3.0, 4.0), Site::new(3.0, 4.0)];
        normalize_sites(&mut sites);
        assert_eq!(sites[0].position, Point::new(3.0, 4.0));
        assert!(sites.iter().all(|s| s.position.is_finite()));
    }
}
