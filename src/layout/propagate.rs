//! Inner-node positions derived from the placed leaves.
//!
//! Inner nodes are visited in post-order so both children are final before
//! their parent. A parent sits halfway between its children along the
//! boundary and `offset` further out than the outermost child.

use std::f64::consts::TAU;

use crate::geometry::{Point, PolarPoint};
use crate::tree::{NodeId, PhyloTree, Side};

/// Rectangular: midpoint x, `offset` above the higher child.
pub fn rectangular(tree: &mut PhyloTree, offset: f64) {
    let inner: Vec<NodeId> = tree.inner_nodes().to_vec();
    for node in inner {
        let Some([first, second]) = tree.children(node) else {
            continue;
        };
        let a = tree.get(first).position();
        let b = tree.get(second).position();
        let position = Point::new((a.x + b.x) / 2.0, a.y.max(b.y) + offset);
        tree.get_mut(node).set_position(position);
    }
}

/// Angle halfway from `a` counter-clockwise to `b`.
fn mid_angle(a: f64, b: f64) -> f64 {
    if b < a {
        a + (b + TAU - a) / 2.0
    } else {
        a + (b - a) / 2.0
    }
}

/// Circular: the children are taken in counter-clockwise order (the
/// right-side flag), the parent sits at their angular midpoint, `offset`
/// beyond the larger radius.
pub fn circular(tree: &mut PhyloTree, offset: f64) {
    let inner: Vec<NodeId> = tree.inner_nodes().to_vec();
    for node in inner {
        let Some([a, b]) = tree.get(node).ordered_children(Side::Right) else {
            continue;
        };
        let polar = |id: NodeId| {
            let child = tree.get(id);
            child
                .polar()
                .unwrap_or_else(|| PolarPoint::from_cartesian(child.position()))
        };
        let (a, b) = (polar(a), polar(b));
        let position = PolarPoint::new(a.r.max(b.r) + offset, mid_angle(a.phi, b.phi));
        tree.get_mut(node).set_polar(position);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeSpec;
    use std::f64::consts::{FRAC_PI_2, PI};

    fn balanced() -> PhyloTree {
        PhyloTree::from_spec(&TreeSpec::inner(
            TreeSpec::inner(TreeSpec::leaf(0), TreeSpec::leaf(1)),
            TreeSpec::inner(TreeSpec::leaf(2), TreeSpec::leaf(3)),
        ))
        .unwrap()
    }

    #[test]
    fn test_rectangular_midpoints_and_heights() {
        let mut tree = balanced();
        let leaves = tree.leaves().to_vec();
        for (i, &leaf) in leaves.iter().enumerate() {
            tree.get_mut(leaf)
                .set_position(Point::new(i as f64 * 2.0, 10.0));
        }
        rectangular(&mut tree, 0.5);

        let root = tree.get(tree.root()).position();
        assert!((root.x - 3.0).abs() < 1e-12);
        assert!((root.y - 11.0).abs() < 1e-12);
        for &node in tree.inner_nodes() {
            let [a, b] = tree.children(node).unwrap();
            let p = tree.get(node).position();
            assert!(p.y > tree.get(a).position().y);
            assert!(p.y > tree.get(b).position().y);
        }
    }

    #[test]
    fn test_mid_angle_wraps() {
        assert!((mid_angle(0.0, FRAC_PI_2) - FRAC_PI_2 / 2.0).abs() < 1e-12);
        assert!((mid_angle(3.0 * FRAC_PI_2, FRAC_PI_2) - 2.0 * PI).abs() < 1e-12);
    }

    #[test]
    fn test_circular_parent_outside_children() {
        let mut tree = balanced();
        let leaves = tree.leaves().to_vec();
        for (i, &leaf) in leaves.iter().enumerate() {
            tree.get_mut(leaf)
                .set_polar(PolarPoint::new(5.0, i as f64 * FRAC_PI_2));
        }
        circular(&mut tree, 1.0);

        let root = tree.get(tree.root()).polar().unwrap();
        assert!((root.r - 7.0).abs() < 1e-12);
        let [left, _] = tree.children(tree.root()).unwrap();
        let left = tree.get(left).polar().unwrap();
        assert!((left.r - 6.0).abs() < 1e-12);
        assert!((left.phi - PI / 4.0).abs() < 1e-12);
    }
}
