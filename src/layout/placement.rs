//! Greedy initial placement of leaves inside their feasibility intervals.
//!
//! Walks the leaves in drawing order. The first leaf is pinned to the start
//! of its interval and the last to the end of its. An interior leaf whose
//! interval starts past the last pin is pinned there too (at least one
//! margin per waiting leaf beyond that pin); every leaf that was waiting
//! since the previous pin is then spread between the two pins, from the
//! right pin inwards. The result is a non-crossing starting configuration
//! for the force refinement.

use std::f64::consts::TAU;

use crate::boundary::{CircularGeophylogeny, RectangularGeophylogeny};
use crate::geometry::wrap_angle_from;
use crate::tree::Interval;

/// Place the `pending` leaves (indices into `intervals`) between the pins
/// `left` and `right`.
///
/// The last pending leaf goes one step left of `right`, or to the end of
/// its interval if that is further left, and becomes the right pin for the
/// rest. With `wraps` the right pin is first lifted to at least `left` by
/// whole turns.
fn spread_between(
    pending: &[usize],
    left: f64,
    mut right: f64,
    wraps: bool,
    intervals: &[Interval],
    place: &mut impl FnMut(usize, f64),
) {
    for (k, &i) in pending.iter().enumerate().rev() {
        if wraps {
            right = wrap_angle_from(right, left);
        }
        let step = (right - left).abs() / (k + 2) as f64;
        let stepped = right - step;
        let to = intervals[i].to;
        let mut position = if to < stepped { to } else { stepped };
        // An interval ending before the left pin would stack leaves on it.
        if position <= left {
            position = stepped;
        }
        place(i, position);
        right = position;
    }
}

/// Pinning walk shared by both boundaries.
///
/// `intervals` are the leaves' intervals in drawing order, in a frame where
/// drawing order is increasing; `floor`/`ceil` bound the first and last
/// pin. `place` receives the leaf's index in drawing order.
fn pin_and_spread(
    intervals: &[Interval],
    margin: f64,
    floor: f64,
    ceil: f64,
    wraps: bool,
    mut place: impl FnMut(usize, f64),
) {
    let Some(last) = intervals.len().checked_sub(1) else {
        return;
    };
    let mut pending: Vec<usize> = Vec::new();
    let mut pin = floor;

    for (i, range) in intervals.iter().enumerate() {
        if i == 0 {
            pin = floor.max(range.from);
            place(i, pin);
        } else if i == last {
            let end = ceil.min(range.to);
            place(i, end);
            spread_between(&pending, pin, end, wraps, intervals, &mut place);
        } else if range.from > pin {
            let forced = floor
                .max(range.from)
                .max(pin + margin * (pending.len() + 1) as f64);
            place(i, forced);
            spread_between(&pending, pin, forced, wraps, intervals, &mut place);
            pending.clear();
            pin = forced;
        } else {
            pending.push(i);
        }
    }
}

/// Initial x-positions on a rectangular boundary.
///
/// With `allow_outside` the leaves are simply spaced one slot apart.
pub fn rectangular(geo: &mut RectangularGeophylogeny, margin: f64, allow_outside: bool) {
    let order = geo.leaf_order();
    let bbox = geo.bbox();

    if allow_outside {
        let step = geo.leaf_step();
        for (i, &leaf) in order.iter().enumerate() {
            geo.set_leaf_x(leaf, bbox.min_x + i as f64 * step);
        }
        return;
    }

    let intervals: Vec<Interval> = order.iter().map(|&leaf| geo.site(leaf).interval).collect();
    let mut xs = vec![0.0; order.len()];
    pin_and_spread(&intervals, margin, bbox.min_x, bbox.max_x, false, |i, x| {
        xs[i] = x
    });
    for (&leaf, x) in order.iter().zip(xs) {
        geo.set_leaf_x(leaf, x);
    }
}

/// Initial angles on a circular boundary.
///
/// Placement runs in the frame translated by `reference_phi` (where the
/// translated intervals live) and is rotated back afterwards. The first and
/// last pins stay inside one turn of that frame, `[0, 2π]`.
pub fn circular(
    geo: &mut CircularGeophylogeny,
    margin: f64,
    allow_outside: bool,
    reference_phi: f64,
) {
    let order = geo.leaf_order();
    let Some(&first) = order.first() else {
        return;
    };

    let mut phis = vec![0.0; order.len()];
    if allow_outside {
        let start = geo.site(first).translated_interval.from;
        let step = geo.leaf_step();
        for (i, phi) in phis.iter_mut().enumerate() {
            *phi = start + i as f64 * step;
        }
    } else {
        let intervals: Vec<Interval> = order
            .iter()
            .map(|&leaf| geo.site(leaf).translated_interval)
            .collect();
        pin_and_spread(&intervals, margin, 0.0, TAU, true, |i, phi| phis[i] = phi);
    }

    for (&leaf, phi) in order.iter().zip(phis) {
        geo.set_leaf_phi(leaf, phi + reference_phi);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boundary::SlotBoundary;
    use crate::layout::feasibility;
    use crate::tree::{PhyloTree, Site, TreeSpec};

    fn placed_xs(geo: &RectangularGeophylogeny) -> Vec<f64> {
        geo.leaf_order().iter().map(|&leaf| geo.leaf_x(leaf)).collect()
    }

    #[test]
    fn test_spread_between_even_steps() {
        let intervals = [Interval::new(-10.0, 10.0); 3];
        let mut out = Vec::new();
        spread_between(&[0, 1, 2], 0.0, 4.0, false, &intervals, &mut |i, x| {
            out.push((i, x))
        });
        assert_eq!(out, vec![(2, 3.0), (1, 2.0), (0, 1.0)]);
    }

    #[test]
    fn test_spread_between_respects_interval_end() {
        let mut out = Vec::new();
        spread_between(&[0], 0.0, 4.0, false, &[Interval::new(0.0, 1.0)], &mut |i, x| {
            out.push((i, x))
        });
        assert_eq!(out, vec![(0, 1.0)]);
    }

    #[test]
    fn test_circular_pins_stay_within_one_turn() {
        let intervals = [
            Interval::new(-2.983, 2.983),
            Interval::new(1.0, 3.0),
            Interval::new(0.5, 2.0),
            Interval::new(3.712, 8.696),
        ];
        let mut phis = vec![f64::NAN; intervals.len()];
        pin_and_spread(&intervals, 0.3, 0.0, TAU, true, |i, phi| phis[i] = phi);

        assert_eq!(phis[0], 0.0);
        assert_eq!(phis[1], 1.0);
        assert_eq!(phis[2], 2.0);
        assert_eq!(phis[3], TAU);
    }

    #[test]
    fn test_rectangular_placement_inside_intervals_and_ordered() {
        let tree = PhyloTree::from_spec(&TreeSpec::caterpillar(6)).unwrap();
        let sites = (0..6)
            .map(|i| Site::new(i as f64 * 2.0, (i % 3) as f64))
            .collect();
        let mut geo = RectangularGeophylogeny::new(tree, sites).unwrap();
        let margin = geo.interval_margin(0.5);
        feasibility::rectangular(&mut geo, margin);
        rectangular(&mut geo, margin, false);

        let xs = placed_xs(&geo);
        assert!(xs.windows(2).all(|w| w[0] <= w[1]), "non-crossing order: {:?}", xs);
        let bbox = geo.bbox();
        for &leaf in &geo.leaf_order() {
            let x = geo.leaf_x(leaf);
            let interval = geo.site(leaf).interval;
            assert!(x >= bbox.min_x.max(interval.from) - 1e-9);
            assert!(x <= bbox.max_x.min(interval.to) + 1e-9);
        }
    }

    #[test]
    fn test_allow_outside_spaces_by_leaf_step() {
        let tree = PhyloTree::from_spec(&TreeSpec::caterpillar(4)).unwrap();
        let sites = vec![
            Site::new(0.0, 0.0),
            Site::new(1.0, 0.0),
            Site::new(2.0, 0.0),
            Site::new(3.0, 0.0),
        ];
        let mut geo = RectangularGeophylogeny::new(tree, sites).unwrap();
        rectangular(&mut geo, 0.5, true);
        let xs = placed_xs(&geo);
        let step = geo.leaf_step();
        for (i, x) in xs.iter().enumerate() {
            assert!((x - (geo.bbox().min_x + i as f64 * step)).abs() < 1e-12);
        }
        assert!((xs[3] - geo.bbox().max_x).abs() < 1e-9);
    }

    #[test]
    fn test_circular_placement_increasing_in_translated_frame() {
        let tree = PhyloTree::from_spec(&TreeSpec::caterpillar(5)).unwrap();
        let sites = (0..5)
            .map(|i| {
                let angle = i as f64 * 1.1;
                Site::new(3.0 * angle.cos(), 3.0 * angle.sin())
            })
            .collect();
        let mut geo = CircularGeophylogeny::new(tree, sites).unwrap();
        let margin = geo.interval_margin(0.5);
        let separation = feasibility::circular(&mut geo, margin);
        let reference = separation.reference_site.unwrap();
        let reference_phi = geo.sites()[reference].polar().phi;
        circular(&mut geo, margin, false, reference_phi);

        let order = geo.leaf_order();
        let first = geo.leaf_phi(order[0]);
        let mut previous = 0.0;
        for &leaf in &order {
            let unwrapped = wrap_angle_from(geo.leaf_phi(leaf), first) - first;
            assert!(unwrapped >= previous - 1e-9, "leaves must not cross");
            previous = unwrapped;
        }
    }
}
