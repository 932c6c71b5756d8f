//! Optimal discrete leaf ordering by dynamic programming.
//!
//! Finds, over all child orders consistent with the tree, the assignment of
//! leaves to the `n` boundary slots that minimizes the total leaf-to-site
//! cost.
//!
//! # Algorithm Overview
//!
//! 1. **Leaf costs:** `cost[leaf][slot]` is the configured distance between
//!    the leaf's site and the slot.
//! 2. **Forward pass (post-order):** an inner node starting at slot `p`
//!    places one child's block at `p` and the other's right after it:
//!    `cost(first, p) + cost(second, p + |first|)` versus the swap. The
//!    cheaper arrangement wins, ties go to the first child.
//! 3. **Root slot:** circular boundaries try every start slot and keep the
//!    first minimum; rectangular boundaries start at slot 0.
//! 4. **Recovery (top-down):** replay the recorded decisions from the root,
//!    writing each inner node's child-order flag and each leaf's slot.
//!
//! Slot arithmetic wraps modulo `n` on circular boundaries. On rectangular
//! boundaries it does not wrap: a block running past the last slot costs
//! infinity. `O(n²)` time and space.

use serde::Serialize;
use tracing::debug;

use crate::boundary::SlotBoundary;
use crate::config::CostKind;
use crate::error::{LayoutError, Result};
use crate::tree::{NodeId, PhyloTree};

/// Outcome of the discrete ordering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscreteReport {
    /// Minimal total leaf-to-slot cost.
    pub cost: f64,
    /// Slot the root's block starts at.
    pub root_slot: usize,
    /// Slot of every leaf, in drawing order.
    pub leaf_slots: Vec<(NodeId, usize)>,
}

/// Memoized costs and decisions, indexed `[node * slots + slot]`.
struct CostTable {
    slots: usize,
    wraps: bool,
    cost: Vec<f64>,
    first_leads: Vec<bool>,
}

impl CostTable {
    fn new(node_count: usize, slots: usize, wraps: bool) -> Self {
        Self {
            slots,
            wraps,
            cost: vec![f64::INFINITY; node_count * slots],
            first_leads: vec![true; node_count * slots],
        }
    }

    #[inline]
    fn at(&self, node: NodeId, slot: usize) -> usize {
        node.index() * self.slots + slot
    }

    /// Slot `k` places after `slot`, or `None` past the end of a
    /// non-wrapping boundary.
    #[inline]
    fn shift(&self, slot: usize, k: usize) -> Option<usize> {
        let next = slot + k;
        if self.wraps {
            Some(next % self.slots)
        } else if next < self.slots {
            Some(next)
        } else {
            None
        }
    }

    #[inline]
    fn cost(&self, node: NodeId, slot: Option<usize>) -> f64 {
        slot.map_or(f64::INFINITY, |slot| self.cost[self.at(node, slot)])
    }

    fn fill<B: SlotBoundary>(&mut self, geo: &B, cost: CostKind) {
        let tree = geo.tree();
        for &leaf in tree.leaves() {
            let site = &geo.sites()[tree.site_of(leaf)];
            for slot in 0..self.slots {
                let at = self.at(leaf, slot);
                self.cost[at] = geo.slot_cost(site, slot, cost);
            }
        }

        for &node in tree.inner_nodes() {
            let Some([first, second]) = tree.get(node).children else {
                continue;
            };
            let (first_size, second_size) = (tree.clade_size(first), tree.clade_size(second));
            for slot in 0..self.slots {
                let first_lead = self.cost(first, Some(slot))
                    + self.cost(second, self.shift(slot, first_size));
                let second_lead = self.cost(second, Some(slot))
                    + self.cost(first, self.shift(slot, second_size));
                let at = self.at(node, slot);
                self.first_leads[at] = first_lead <= second_lead;
                self.cost[at] = first_lead.min(second_lead);
            }
        }
    }

    /// Cheapest start slot for the root.
    fn root_slot(&self, root: NodeId) -> (usize, f64) {
        if !self.wraps {
            return (0, self.cost(root, Some(0)));
        }
        let mut best = (0, f64::INFINITY);
        for slot in 0..self.slots {
            let cost = self.cost(root, Some(slot));
            if cost < best.1 {
                best = (slot, cost);
            }
        }
        best
    }
}

/// Run the dynamic program and write the result into the tree.
///
/// Afterwards every inner node's flag for the boundary's side reflects
/// the optimal order and every leaf sits on its slot.
pub fn order_leaves<B: SlotBoundary>(geo: &mut B, cost: CostKind) -> Result<DiscreteReport> {
    if !B::KIND.supports(cost) {
        return Err(LayoutError::UnsupportedCost {
            cost,
            boundary: B::KIND,
        });
    }

    let slots = geo.slot_count();
    let mut table = CostTable::new(geo.tree().node_count(), slots, B::WRAPS);
    table.fill(geo, cost);

    let root = geo.tree().root();
    let (root_slot, total) = table.root_slot(root);
    debug!(?cost, slots, root_slot, total, "discrete ordering");

    let leaf_slots = recover(geo, &table, root, root_slot);
    Ok(DiscreteReport {
        cost: total,
        root_slot,
        leaf_slots,
    })
}

/// Replay the recorded decisions from the root with an explicit stack.
fn recover<B: SlotBoundary>(
    geo: &mut B,
    table: &CostTable,
    root: NodeId,
    root_slot: usize,
) -> Vec<(NodeId, usize)> {
    let mut leaf_slots = Vec::with_capacity(table.slots);
    let mut stack = vec![(root, root_slot)];

    while let Some((node, slot)) = stack.pop() {
        let children = geo.tree().get(node).children;
        match children {
            None => {
                geo.place_leaf(node, slot);
                leaf_slots.push((node, slot));
            }
            Some([first, second]) => {
                let first_leads = table.first_leads[table.at(node, slot)];
                geo.tree_mut().set_first_leads(node, B::SIDE, first_leads);
                let (lead, follow) = if first_leads {
                    (first, second)
                } else {
                    (second, first)
                };
                let tree: &PhyloTree = geo.tree();
                // The recorded cost is finite, so the follower's slot exists.
                if let Some(next) = table.shift(slot, tree.clade_size(lead)) {
                    stack.push((follow, next));
                }
                stack.push((lead, slot));
            }
        }
    }

    leaf_slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::{CircularGeophylogeny, RectangularGeophylogeny};
    use crate::tree::{Side, Site, TreeSpec};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_sites(rng: &mut StdRng, n: usize) -> Vec<Site> {
        (0..n)
            .map(|_| Site::new(rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0)))
            .collect()
    }

    /// Minimum over every flag assignment and (when wrapping) every
    /// rotation of the consecutive slot assignment.
    fn brute_force<B: SlotBoundary + Clone>(geo: &B, cost: CostKind) -> f64 {
        let inner: Vec<NodeId> = geo.tree().inner_nodes().to_vec();
        let n = geo.slot_count();
        let rotations = if B::WRAPS { n } else { 1 };
        let mut best = f64::INFINITY;

        for mask in 0u32..(1 << inner.len()) {
            let mut candidate = geo.clone();
            for (bit, &node) in inner.iter().enumerate() {
                candidate
                    .tree_mut()
                    .set_first_leads(node, B::SIDE, mask & (1 << bit) != 0);
            }
            let order = candidate.tree().ordered_leaves(B::SIDE);
            for rotation in 0..rotations {
                let total: f64 = order
                    .iter()
                    .enumerate()
                    .map(|(i, &leaf)| {
                        let site = &candidate.sites()[candidate.tree().site_of(leaf)];
                        candidate.slot_cost(site, (rotation + i) % n, cost)
                    })
                    .sum();
                best = best.min(total);
            }
        }
        best
    }

    fn assert_consecutive<B: SlotBoundary>(geo: &B, report: &DiscreteReport) {
        let n = geo.slot_count();
        let order = geo.tree().ordered_leaves(B::SIDE);
        assert_eq!(order.len(), report.leaf_slots.len());

        let mut seen = vec![false; n];
        for (i, &leaf) in order.iter().enumerate() {
            let slot = report
                .leaf_slots
                .iter()
                .find(|(id, _)| *id == leaf)
                .map(|&(_, slot)| slot)
                .unwrap();
            assert_eq!(slot, (report.root_slot + i) % n, "leaf {} out of sequence", leaf);
            assert!(!seen[slot], "slot {} used twice", slot);
            seen[slot] = true;
        }
        assert!(seen.iter().all(|&s| s), "every slot must be used");
    }

    #[test]
    fn test_monotonic_sites_keep_order() {
        let tree = PhyloTree::from_spec(&TreeSpec::caterpillar(3)).unwrap();
        let sites = vec![Site::new(0.0, 3.0), Site::new(3.0, 0.0), Site::new(6.0, 0.0)];
        let mut geo = RectangularGeophylogeny::new(tree, sites).unwrap();

        let report = order_leaves(&mut geo, CostKind::Euclidean).unwrap();
        assert_eq!(report.root_slot, 0);

        let order: Vec<usize> = geo
            .leaf_order()
            .iter()
            .map(|&leaf| geo.tree().site_of(leaf))
            .collect();
        assert_eq!(order, vec![0, 1, 2]);

        let xs: Vec<f64> = geo
            .leaf_order()
            .iter()
            .map(|&leaf| geo.tree().get(leaf).position().x)
            .collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_reversed_sites_flip_root() {
        let tree = PhyloTree::from_spec(&TreeSpec::caterpillar(3)).unwrap();
        let sites = vec![Site::new(6.0, 0.0), Site::new(3.0, 0.0), Site::new(0.0, 0.0)];
        let mut geo = RectangularGeophylogeny::new(tree, sites).unwrap();

        order_leaves(&mut geo, CostKind::Horizontal).unwrap();
        let order: Vec<usize> = geo
            .leaf_order()
            .iter()
            .map(|&leaf| geo.tree().site_of(leaf))
            .collect();
        assert_eq!(order, vec![2, 1, 0]);
        assert!(!geo.tree().get(geo.tree().root()).state().first_leads(Side::Left));
    }

    #[test]
    fn test_unsupported_cost() {
        let tree = PhyloTree::from_spec(&TreeSpec::caterpillar(2)).unwrap();
        let sites = vec![Site::new(0.0, 0.0), Site::new(1.0, 0.0)];
        let mut geo = RectangularGeophylogeny::new(tree, sites).unwrap();
        assert!(matches!(
            order_leaves(&mut geo, CostKind::Radial),
            Err(LayoutError::UnsupportedCost { .. })
        ));
    }

    #[test]
    fn test_rectangular_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(11);
        for n in 2..=8 {
            for _ in 0..4 {
                let tree = PhyloTree::from_spec(&TreeSpec::random(&mut rng, n)).unwrap();
                let geo = RectangularGeophylogeny::new(tree, random_sites(&mut rng, n)).unwrap();
                for cost in [CostKind::Euclidean, CostKind::Horizontal] {
                    let expected = brute_force(&geo, cost);
                    let mut solved = geo.clone();
                    let report = order_leaves(&mut solved, cost).unwrap();
                    assert!(
                        (report.cost - expected).abs() < 1e-9,
                        "n={} {:?}: dp {} vs brute force {}",
                        n,
                        cost,
                        report.cost,
                        expected
                    );
                    assert_consecutive(&solved, &report);
                }
            }
        }
    }

    #[test]
    fn test_circular_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(23);
        for n in 2..=8 {
            for _ in 0..4 {
                let tree = PhyloTree::from_spec(&TreeSpec::random(&mut rng, n)).unwrap();
                let geo = CircularGeophylogeny::new(tree, random_sites(&mut rng, n)).unwrap();
                for cost in [CostKind::Euclidean, CostKind::Radial] {
                    let expected = brute_force(&geo, cost);
                    let mut solved = geo.clone();
                    let report = order_leaves(&mut solved, cost).unwrap();
                    assert!(
                        (report.cost - expected).abs() < 1e-9,
                        "n={} {:?}: dp {} vs brute force {}",
                        n,
                        cost,
                        report.cost,
                        expected
                    );
                    assert_consecutive(&solved, &report);
                }
            }
        }
    }

    #[test]
    fn test_recovered_cost_matches_placement() {
        let mut rng = StdRng::seed_from_u64(5);
        let tree = PhyloTree::from_spec(&TreeSpec::random(&mut rng, 12)).unwrap();
        let mut geo = CircularGeophylogeny::new(tree, random_sites(&mut rng, 12)).unwrap();
        let report = order_leaves(&mut geo, CostKind::Euclidean).unwrap();

        let placed: f64 = report
            .leaf_slots
            .iter()
            .map(|&(leaf, _)| {
                geo.tree()
                    .get(leaf)
                    .position()
                    .distance(geo.sites()[geo.tree().site_of(leaf)].position)
            })
            .sum();
        assert!((placed - report.cost).abs() < 1e-9);
    }
}
