//! Rectangular boundary: leaves on the top edge of a box around the sites.

use serde::Serialize;
use tracing::debug;

use super::{SlotBoundary, BoundaryKind, check_sites, normalize_sites};
use crate::config::{CostKind, SlidingConfig};
use crate::error::Result;
use crate::geometry::Point;
use crate::layout::{self, DiscreteReport, SlidingReport};
use crate::tree::{NodeId, PhyloTree, Side, Site};

/// Horizontal padding between the outermost sites and the box.
const PAD_X: f64 = 2.0;
/// Vertical padding between the outermost sites and the box.
const PAD_Y: f64 = 1.0;

/// Axis-aligned box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundingBox {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl BoundingBox {
    /// Box around `sites`, padded on every side.
    fn around(sites: &[Site]) -> Self {
        let mut bbox = Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        };
        for site in sites {
            bbox.min_x = bbox.min_x.min(site.x());
            bbox.min_y = bbox.min_y.min(site.y());
            bbox.max_x = bbox.max_x.max(site.x());
            bbox.max_y = bbox.max_y.max(site.y());
        }
        bbox.min_x -= PAD_X;
        bbox.max_x += PAD_X;
        bbox.min_y -= PAD_Y;
        bbox.max_y += PAD_Y;
        bbox
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }
}

/// Layout context for a rectangular boundary.
///
/// Leaves live on the line `y = max_y`; a leaf position is its
/// x-coordinate. Slot `i` sits at `min_x + i * leaf_step`, so the first
/// and last slot touch the box corners.
#[derive(Debug, Clone)]
pub struct RectangularGeophylogeny {
    tree: PhyloTree,
    sites: Vec<Site>,
    bbox: BoundingBox,
    leaf_step: f64,
}

impl RectangularGeophylogeny {
    /// Normalize the sites and derive the box.
    pub fn new(tree: PhyloTree, mut sites: Vec<Site>) -> Result<Self> {
        check_sites(&tree, &sites)?;
        normalize_sites(&mut sites);

        let bbox = BoundingBox::around(&sites);
        let leaf_step = bbox.width() / (tree.leaf_count() - 1) as f64;
        debug!(
            leaves = tree.leaf_count(),
            width = bbox.width(),
            leaf_step,
            "rectangular boundary"
        );

        let mut geo = Self {
            tree,
            sites,
            bbox,
            leaf_step,
        };
        let leaves = geo.tree.leaves().to_vec();
        for leaf in leaves {
            let x = geo.sites[geo.tree.site_of(leaf)].x();
            geo.set_leaf_x(leaf, x);
        }
        Ok(geo)
    }

    pub fn bbox(&self) -> BoundingBox {
        self.bbox
    }

    /// Spacing between consecutive slots.
    pub fn leaf_step(&self) -> f64 {
        self.leaf_step
    }

    /// The y-coordinate of the edge leaves are placed on.
    #[inline]
    pub fn leaf_y(&self) -> f64 {
        self.bbox.max_y
    }

    /// Configured margin capped so that `n` leaves still fit on the edge.
    pub fn interval_margin(&self, margin: f64) -> f64 {
        margin.min(self.leaf_step)
    }

    /// Leaves in left-to-right drawing order.
    pub fn leaf_order(&self) -> Vec<NodeId> {
        self.tree.ordered_leaves(Side::Left)
    }

    /// Optimal discrete order; see [`layout::discrete`].
    pub fn run_discrete_ordering(&mut self, cost: CostKind) -> Result<DiscreteReport> {
        layout::discrete::order_leaves(self, cost)
    }

    /// Continuous pipeline; see [`layout::sliding`].
    pub fn run_continuous_ordering(&mut self, config: &SlidingConfig) -> Result<SlidingReport> {
        layout::sliding::run_rectangular(self, config)
    }

    /// Place inner nodes above their children.
    pub fn propagate_inner_positions(&mut self, offset: f64) {
        layout::propagate::rectangular(&mut self.tree, offset);
    }

    pub(crate) fn sites_mut(&mut self) -> &mut [Site] {
        &mut self.sites
    }

    #[inline]
    pub(crate) fn leaf_x(&self, leaf: NodeId) -> f64 {
        self.tree.get(leaf).position.x
    }

    #[inline]
    pub(crate) fn set_leaf_x(&mut self, leaf: NodeId, x: f64) {
        let y = self.leaf_y();
        self.tree.get_mut(leaf).set_position(Point::new(x, y));
    }

    /// Site of a leaf.
    #[inline]
    pub(crate) fn site(&self, leaf: NodeId) -> &Site {
        &self.sites[self.tree.site_of(leaf)]
    }
}

impl SlotBoundary for RectangularGeophylogeny {
    const KIND: BoundaryKind = BoundaryKind::Rectangular;
    const WRAPS: bool = false;
    const SIDE: Side = Side::Left;

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
        Point::new(self.bbox.min_x + slot as f64 * self.leaf_step, self.leaf_y())
    }

    fn slot_cost(&self, site: &Site, slot: usize, cost: CostKind) -> f64 {
        let slot = self.slot_point(slot);
        match cost {
            CostKind::Euclidean => site.position.distance(slot),
            CostKind::Horizontal => (site.x() - slot.x).abs(),
            CostKind::Radial => f64::INFINITY,
        }
    }

    fn place_leaf(&mut self, leaf: NodeId, slot: usize) {
        let x = self.slot_point(slot).x;
        self.set_leaf_x(leaf, x);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LayoutError;
    use crate::tree::TreeSpec;

    fn three_leaves() -> RectangularGeophylogeny {
        let tree = PhyloTree::from_spec(&TreeSpec::caterpillar(3)).unwrap();
        let sites = vec![Site::new(0.0, 3.0), Site::new(3.0, 0.0), Site::new(6.0, 0.0)];
        RectangularGeophylogeny::new(tree, sites).unwrap()
    }

    #[test]
    fn test_box_and_leaf_step() {
        let geo = three_leaves();
        let bbox = geo.bbox();
        // Sites scale by 10 / 6.
        assert!((bbox.min_x + 2.0).abs() < 1e-12);
        assert!((bbox.max_x - 12.0).abs() < 1e-12);
        assert!((bbox.max_y - 6.0).abs() < 1e-12);
        assert!((bbox.min_y + 1.0).abs() < 1e-12);
        assert!((geo.leaf_step() - 7.0).abs() < 1e-12);
    }

    #[test]
    fn test_slots_span_the_top_edge() {
        let geo = three_leaves();
        assert_eq!(geo.slot_point(0), Point::new(-2.0, geo.leaf_y()));
        assert!((geo.slot_point(2).x - 12.0).abs() < 1e-12);
    }

    #[test]
    fn test_slot_costs() {
        let geo = three_leaves();
        let site = Site::new(5.0, 2.0);
        assert!((geo.slot_cost(&site, 1, CostKind::Horizontal) - 0.0).abs() < 1e-12);
        assert!((geo.slot_cost(&site, 1, CostKind::Euclidean) - 4.0).abs() < 1e-12);
        assert_eq!(geo.slot_cost(&site, 1, CostKind::Radial), f64::INFINITY);
    }

    #[test]
    fn test_interval_margin_capped_by_leaf_step() {
        let geo = three_leaves();
        assert_eq!(geo.interval_margin(0.5), 0.5);
        assert_eq!(geo.interval_margin(100.0), geo.leaf_step());
    }

    #[test]
    fn test_leaves_start_above_their_sites() {
        let geo = three_leaves();
        for &leaf in geo.tree().leaves() {
            assert_eq!(geo.leaf_x(leaf), geo.site(leaf).x());
            assert_eq!(geo.tree().get(leaf).position().y, geo.leaf_y());
        }
    }

    #[test]
    fn test_rejects_non_finite_site() {
        let tree = PhyloTree::from_spec(&TreeSpec::caterpillar(2)).unwrap();
        let sites = vec![Site::new(0.0, 0.0), Site::new(f64::NAN, 1.0)];
        assert_eq!(
            RectangularGeophylogeny::new(tree, sites).unwrap_err(),
            LayoutError::NonFiniteSite(1)
        );
    }
}
