//! Circular boundary: leaves on a circle around the sites.

use std::f64::consts::TAU;

use tracing::debug;

use super::{BoundaryKind, SlotBoundary, check_sites, normalize_sites};
use crate::config::{CostKind, SlidingConfig};
use crate::error::Result;
use crate::geometry::{Circle, Point, PolarPoint, angular_distance, smallest_enclosing_circle};
use crate::layout::{self, DiscreteReport, SlidingReport};
use crate::tree::{NodeId, PhyloTree, Side, Site};

/// Gap between the farthest site and the boundary circle.
const RADIUS_PAD: f64 = 1.0;

/// Layout context for a circular boundary.
///
/// Sites are translated so the center of their smallest enclosing circle
/// is the origin. Leaves live on the circle of radius `radius` around the
/// origin; a leaf position is its polar angle. Slot `i` sits at angle
/// `i * leaf_step`.
#[derive(Debug, Clone)]
pub struct CircularGeophylogeny {
    tree: PhyloTree,
    sites: Vec<Site>,
    radius: f64,
    leaf_step: f64,
    /// Translation applied to the normalized sites.
    offset: Point,
}

impl CircularGeophylogeny {
    /// Normalize and center the sites and derive the circle.
    pub fn new(tree: PhyloTree, mut sites: Vec<Site>) -> Result<Self> {
        check_sites(&tree, &sites)?;
        normalize_sites(&mut sites);

        let points: Vec<Point> = sites.iter().map(|site| site.position).collect();
        let center = smallest_enclosing_circle(&points)
            .map(|circle| circle.center)
            .unwrap_or_default();
        for site in sites.iter_mut() {
            *site = Site::new(site.x() - center.x, site.y() - center.y);
        }

        let max_r = sites
            .iter()
            .map(|site| site.polar().r)
            .fold(0.0_f64, f64::max);
        let radius = max_r + RADIUS_PAD;
        let leaf_step = TAU / tree.leaf_count() as f64;
        debug!(leaves = tree.leaf_count(), radius, leaf_step, "circular boundary");

        let mut geo = Self {
            tree,
            sites,
            radius,
            leaf_step,
            offset: Point::new(-center.x, -center.y),
        };
        let leaves = geo.tree.leaves().to_vec();
        for leaf in leaves {
            let phi = geo.sites[geo.tree.site_of(leaf)].polar().phi;
            geo.set_leaf_phi(leaf, phi);
        }
        Ok(geo)
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Angular spacing between consecutive slots.
    pub fn leaf_step(&self) -> f64 {
        self.leaf_step
    }

    /// Translation that was applied to the normalized sites.
    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn circle(&self) -> Circle {
        Circle {
            center: Point::default(),
            radius: self.radius,
        }
    }

    /// Configured margin, as an angle on the boundary, capped so that `n`
    /// leaves still fit around the circle.
    pub fn interval_margin(&self, margin: f64) -> f64 {
        (margin / self.radius).min(TAU / (self.tree.leaf_count() - 1) as f64)
    }

    /// Leaves in counter-clockwise drawing order.
    pub fn leaf_order(&self) -> Vec<NodeId> {
        self.tree.ordered_leaves(Side::Right)
    }

    /// Optimal discrete order; see [`layout::discrete`].
    pub fn run_discrete_ordering(&mut self, cost: CostKind) -> Result<DiscreteReport> {
        layout::discrete::order_leaves(self, cost)
    }

    /// Continuous pipeline; see [`layout::sliding`].
    pub fn run_continuous_ordering(&mut self, config: &SlidingConfig) -> Result<SlidingReport> {
        layout::sliding::run_circular(self, config)
    }

    /// Place inner nodes outside their children.
    pub fn propagate_inner_positions(&mut self, offset: f64) {
        layout::propagate::circular(&mut self.tree, offset);
    }

    pub(crate) fn sites_mut(&mut self) -> &mut [Site] {
        &mut self.sites
    }

    #[inline]
    pub(crate) fn leaf_phi(&self, leaf: NodeId) -> f64 {
        self.tree
            .get(leaf)
            .polar
            .map_or(0.0, |polar| polar.phi)
    }

    #[inline]
    pub(crate) fn set_leaf_phi(&mut self, leaf: NodeId, phi: f64) {
        let polar = PolarPoint::new(self.radius, phi);
        self.tree.get_mut(leaf).set_polar(polar);
    }

    #[inline]
    pub(crate) fn site(&self, leaf: NodeId) -> &Site {
        &self.sites[self.tree.site_of(leaf)]
    }
}

impl SlotBoundary for CircularGeophylogeny {
    const KIND: BoundaryKind = BoundaryKind::Circular;
    const WRAPS: bool = true;
    const SIDE: Side = Side::Right;

    fn tree(&self) -> &PhyloTree {
        &self.tree
    }

    fn tree_mut(&mut self) -> &mut PhyloTree {
        &mut self.tree
    }

    fn sites(&self) -> &[Site] {
        &self.sites
    }

    fn slot_point(&self, slot: usize) -> Point {
        PolarPoint::new(self.radius, slot as f64 * self.leaf_step).to_cartesian()
    }

    fn slot_cost(&self, site: &Site, slot: usize, cost: CostKind) -> f64 {
        match cost {
            CostKind::Euclidean => site.position.distance(self.slot_point(slot)),
            CostKind::Radial => {
                let polar = site.polar();
                angular_distance(polar.phi, slot as f64 * self.leaf_step) * polar.r
            }
            CostKind::Horizontal => f64::INFINITY,
        }
    }

    fn place_leaf(&mut self, leaf: NodeId, slot: usize) {
        self.set_leaf_phi(leaf, slot as f64 * self.leaf_step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeSpec;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn square() -> CircularGeophylogeny {
        let tree = PhyloTree::from_spec(&TreeSpec::caterpillar(4)).unwrap();
        let sites = vec![
            Site::new(1.0, 1.0),
            Site::new(3.0, 1.0),
            Site::new(3.0, 3.0),
            Site::new(1.0, 3.0),
        ];
        CircularGeophylogeny::new(tree, sites).unwrap()
    }

    #[test]
    fn test_sites_centered_on_enclosing_circle() {
        let geo = square();
        // Normalized to a 10x10 square centered on the origin.
        assert!((geo.sites()[0].x() + 5.0).abs() < 1e-9);
        assert!((geo.sites()[2].y() - 5.0).abs() < 1e-9);
        let expected = 50f64.sqrt() + 1.0;
        assert!((geo.radius() - expected).abs() < 1e-9);
        assert!((geo.leaf_step() - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn test_slot_points_on_circle() {
        let geo = square();
        for slot in 0..4 {
            let p = geo.slot_point(slot);
            assert!((p.x.hypot(p.y) - geo.radius()).abs() < 1e-9);
        }
        let p = geo.slot_point(2);
        assert!((p.x + geo.radius()).abs() < 1e-9);
    }

    #[test]
    fn test_radial_cost_wraps() {
        let geo = square();
        // Site at angle -0.1 (just below the positive x-axis).
        let site = Site::new(2.0 * (-0.1f64).cos(), 2.0 * (-0.1f64).sin());
        let cost = geo.slot_cost(&site, 0, CostKind::Radial);
        assert!((cost - 0.2).abs() < 1e-9, "0.1 rad at radius 2, got {}", cost);

        let cost = geo.slot_cost(&site, 2, CostKind::Radial);
        assert!((cost - 2.0 * (PI - 0.1)).abs() < 1e-9);
        assert_eq!(geo.slot_cost(&site, 0, CostKind::Horizontal), f64::INFINITY);
    }

    #[test]
    fn test_interval_margin() {
        let geo = square();
        assert!((geo.interval_margin(0.5) - 0.5 / geo.radius()).abs() < 1e-12);
        assert!((geo.interval_margin(1e6) - TAU / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_place_leaf_sets_polar_and_cartesian() {
        let mut geo = square();
        let leaf = geo.tree().leaves()[0];
        geo.place_leaf(leaf, 1);
        assert!((geo.leaf_phi(leaf) - FRAC_PI_2).abs() < 1e-12);
        let p = geo.tree().get(leaf).position();
        assert!(p.x.abs() < 1e-9);
        assert!((p.y - geo.radius()).abs() < 1e-9);
    }
}
