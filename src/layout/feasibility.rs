//! Feasibility intervals for the continuous (sliding) layout.
//!
//! # Algorithm Overview
//!
//! 1. **Separation:** for every inner node and every pair of leaves drawn
//!    from its two subtrees, compute the value at which the connectors from
//!    the two sites to the boundary stop crossing. Each node keeps the
//!    cheaper of its two child orders (written to its flag) and the
//!    global separation is the maximum of the per-node minima.
//!    - Rectangular: `atan(l / (a + b))`, `l` the horizontal gap and `a`,
//!      `b` the sites' distances to the leaf edge.
//!    - Circular: `β · R / (a + b)`, `β` the angular gap measured from a
//!      reference site and `a`, `b` the distances to the circle. Every site
//!      is tried as the reference; the smallest separation wins.
//! 2. **Intervals:** each site gets a symmetric interval whose half-width
//!    grows with its distance to the boundary.
//! 3. **Margin widening:** for every ordered pair of leaves `i < j`, if the
//!    span from `i`'s interval start to `j`'s interval end cannot hold the
//!    `j - i` gaps of the minimum margin, the separation is raised to the
//!    crossing value with that margin added to the gap. Intervals are then
//!    recomputed.

use std::f64::consts::PI;

use tracing::debug;

use crate::boundary::{CircularGeophylogeny, RectangularGeophylogeny, SlotBoundary};
use crate::geometry::{CircularRange, wrap_angle};
use crate::tree::{Interval, NodeId, PhyloTree, Side};

/// Largest circular half-interval; keeps intervals below a full turn.
const MAX_HALF_ARC: f64 = PI - 1e-4;

/// Result of the feasibility computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Separation {
    /// Separation after margin widening.
    pub value: f64,
    /// Separation required by non-crossing alone.
    pub raw_value: f64,
    /// Inner nodes whose best child order still needs a positive separation.
    pub conflicts: usize,
    /// Reference site of a circular layout.
    pub reference_site: Option<usize>,
}

/// Leaves of each subtree under every inner node, split by child.
struct SubtreeLeaves {
    nodes: Vec<(NodeId, Vec<usize>, Vec<usize>)>,
}

impl SubtreeLeaves {
    /// Collect site indices under the first and second child of every
    /// inner node.
    fn collect(tree: &PhyloTree) -> Self {
        let sites = |id: NodeId| -> Vec<usize> {
            tree.subtree_leaves(id)
                .into_iter()
                .map(|leaf| tree.site_of(leaf))
                .collect()
        };
        let nodes = tree
            .inner_nodes()
            .iter()
            .filter_map(|&node| {
                tree.children(node)
                    .map(|[first, second]| (node, sites(first), sites(second)))
            })
            .collect();
        Self { nodes }
    }

    /// For every inner node: whether the first child leads and the node's
    /// required separation. `before(a, b)` says site `a` lies before site
    /// `b` along the boundary; `value(a, b)` is their crossing value.
    fn decide(
        &self,
        before: impl Fn(usize, usize) -> bool,
        value: impl Fn(usize, usize) -> f64,
    ) -> Vec<(NodeId, bool, f64)> {
        self.nodes
            .iter()
            .map(|(node, first, second)| {
                let mut first_second = 0.0_f64;
                let mut second_first = 0.0_f64;
                for &a in first {
                    for &b in second {
                        if before(a, b) {
                            first_second = first_second.max(value(a, b));
                        }
                        if before(b, a) {
                            second_first = second_first.max(value(a, b));
                        }
                    }
                }
                (*node, second_first <= first_second, first_second.min(second_first))
            })
            .collect()
    }
}

/// Summarize per-node decisions: global maximum and conflict count.
fn summarize(decisions: &[(NodeId, bool, f64)]) -> (f64, usize) {
    decisions
        .iter()
        .fold((0.0_f64, 0usize), |(max, conflicts), &(_, _, value)| {
            (max.max(value), conflicts + usize::from(value > 0.0))
        })
}

// =============================================================================
// Rectangular
// =============================================================================

/// Crossing angle of two sites with horizontal gap `gap`.
fn crossing_angle(gap: f64, a: f64, b: f64) -> f64 {
    (gap / (a + b)).atan()
}

/// Separation angle required by non-crossing; writes the left-side flags.
pub fn rectangular_separation(geo: &mut RectangularGeophylogeny) -> (f64, usize) {
    let leaf_y = geo.leaf_y();
    let decisions = {
        let sites = geo.sites();
        let depth = |s: usize| (leaf_y - sites[s].y()).abs();
        SubtreeLeaves::collect(geo.tree()).decide(
            |a, b| sites[a].x() < sites[b].x(),
            |a, b| crossing_angle((sites[a].x() - sites[b].x()).abs(), depth(a), depth(b)),
        )
    };

    let tree = geo.tree_mut();
    for &(node, first_leads, _) in &decisions {
        tree.set_first_leads(node, Side::Left, first_leads);
    }
    summarize(&decisions)
}

/// Write every site's interval for separation angle `angle`.
pub fn rectangular_intervals(geo: &mut RectangularGeophylogeny, angle: f64) {
    let leaf_y = geo.leaf_y();
    let tan = angle.tan();
    for site in geo.sites_mut() {
        let half = (tan * (leaf_y - site.y()).abs()).abs();
        site.interval = Interval::around(site.x(), half);
    }
}

/// Full rectangular feasibility: separation, margin widening, intervals.
///
/// `margin` is the effective interval margin (already capped).
pub fn rectangular(geo: &mut RectangularGeophylogeny, margin: f64) -> Separation {
    let (raw_value, conflicts) = rectangular_separation(geo);
    rectangular_intervals(geo, raw_value);

    let bbox = geo.bbox();
    let leaf_y = geo.leaf_y();
    let order = geo.leaf_order();
    let mut value = raw_value;

    for (i, &leaf) in order.iter().enumerate() {
        let site = geo.site(leaf);
        let left = bbox.min_x.max(site.interval.from);
        let mut count = 1.0;
        for &other in &order[i + 1..] {
            let other_site = geo.site(other);
            let right = bbox.max_x.min(other_site.interval.to);
            if (right - left) / count < margin {
                let gap = (site.x() - other_site.x()).abs() + margin * count;
                value = value.max(crossing_angle(
                    gap,
                    (leaf_y - site.y()).abs(),
                    (leaf_y - other_site.y()).abs(),
                ));
            }
            count += 1.0;
        }
    }

    rectangular_intervals(geo, value);
    debug!(
        raw_angle = raw_value.to_degrees(),
        angle = value.to_degrees(),
        conflicts,
        "rectangular feasibility"
    );
    Separation {
        value,
        raw_value,
        conflicts,
        reference_site: None,
    }
}

// =============================================================================
// Circular
// =============================================================================

/// Crossing value of two sites with angular gap `beta`.
fn crossing_value(beta: f64, a: f64, b: f64, radius: f64) -> f64 {
    beta * radius / (a + b)
}

/// Angles of all sites relative to `reference`, wrapped into `[0, 2π)`.
fn translated_angles(phis: &[f64], reference: f64) -> Vec<f64> {
    phis.iter().map(|&phi| wrap_angle(phi - reference)).collect()
}

/// Separation value required by non-crossing, minimized over the choice
/// of reference site; writes the right-side flags of the best reference.
///
/// Returns `(value, conflicts, reference site)`.
pub fn circular_separation(geo: &mut CircularGeophylogeny) -> (f64, usize, usize) {
    let radius = geo.radius();
    let polars: Vec<_> = geo.sites().iter().map(|site| site.polar()).collect();
    let phis: Vec<f64> = polars.iter().map(|p| p.phi).collect();
    let depth = |s: usize| radius - polars[s].r;
    let subtrees = SubtreeLeaves::collect(geo.tree());

    let mut best: Option<(f64, usize, Vec<(NodeId, bool, f64)>)> = None;
    for reference in 0..phis.len() {
        let trans = translated_angles(&phis, phis[reference]);
        let decisions = subtrees.decide(
            |a, b| trans[a] < trans[b],
            |a, b| crossing_value((trans[a] - trans[b]).abs(), depth(a), depth(b), radius),
        );
        let (value, _) = summarize(&decisions);
        if best.as_ref().is_none_or(|(best_value, _, _)| value < *best_value) {
            best = Some((value, reference, decisions));
        }
    }

    let Some((value, reference, decisions)) = best else {
        return (0.0, 0, 0);
    };
    let tree = geo.tree_mut();
    for &(node, first_leads, _) in &decisions {
        tree.set_first_leads(node, Side::Right, first_leads);
    }
    let (_, conflicts) = summarize(&decisions);
    (value, conflicts, reference)
}

/// Write every site's absolute and translated interval for separation
/// `value` around reference angle `reference_phi`.
///
/// Translated intervals are left unclipped so that the margin guarantee
/// holds in the translated frame.
pub fn circular_intervals(geo: &mut CircularGeophylogeny, value: f64, reference_phi: f64) {
    let radius = geo.radius();
    for site in geo.sites_mut() {
        let polar = site.polar();
        let half = (radius - polar.r) * (value / radius);
        let trans = wrap_angle(polar.phi - reference_phi);
        site.translated_interval = Interval::around(trans, half);
        let capped = half.min(MAX_HALF_ARC);
        site.circular_interval = CircularRange::new(polar.phi - capped, polar.phi + capped);
    }
}

/// Full circular feasibility: reference choice, separation, margin
/// widening, intervals.
///
/// `margin` is the effective angular interval margin (already capped).
pub fn circular(geo: &mut CircularGeophylogeny, margin: f64) -> Separation {
    let (raw_value, conflicts, reference) = circular_separation(geo);
    let reference_phi = geo.sites()[reference].polar().phi;
    circular_intervals(geo, raw_value, reference_phi);

    let radius = geo.radius();
    let order = geo.leaf_order();
    let mut value = raw_value;

    for (i, &leaf) in order.iter().enumerate() {
        let site = geo.site(leaf);
        let polar = site.polar();
        let trans = wrap_angle(polar.phi - reference_phi);
        let left = site.translated_interval.from;
        let mut count = 1.0;
        for &other in &order[i + 1..] {
            let other_site = geo.site(other);
            let right = other_site.translated_interval.to;
            if (right - left) / count < margin {
                let other_polar = other_site.polar();
                let other_trans = wrap_angle(other_polar.phi - reference_phi);
                let beta = (trans - other_trans).abs() + margin * count;
                value = value.max(crossing_value(
                    beta,
                    radius - polar.r,
                    radius - other_polar.r,
                    radius,
                ));
            }
            count += 1.0;
        }
    }

    circular_intervals(geo, value, reference_phi);
    debug!(raw_value, value, conflicts, reference, "circular feasibility");
    Separation {
        value,
        raw_value,
        conflicts,
        reference_site: Some(reference),
    }
}
