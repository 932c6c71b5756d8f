//! Force-based refinement of continuous leaf positions.
//!
//! # Algorithm Overview
//!
//! A fixed number of passes; each pass visits the leaves in reverse drawing
//! order. For one leaf:
//!
//! 1. Take the current positions of its two neighbors (the box edges or the
//!    interval ends at the ends of a rectangular boundary, the wrapped
//!    neighbors on a circle) and pull both inward by the smaller of the
//!    margin and just under half their gap.
//! 2. Solve the cubic equilibrium of the aversion/centroid force between
//!    the shrunk neighbors (see [`cubic::equilibrium`]). Without a root
//!    strictly inside, fall back to the centroid clamped into range.
//! 3. Keep the leaf inside its feasibility interval (or the box, when
//!    leaving the interval is allowed), then inside the neighbor range.
//!
//! Updates are written in place: a leaf sees the position its right
//! neighbor received earlier in the same pass.

use std::f64::consts::{PI, TAU};

use tracing::{debug, warn};

use super::cubic;
use crate::boundary::{CircularGeophylogeny, RectangularGeophylogeny};
use crate::config::SlidingConfig;
use crate::error::{LayoutError, Result};
use crate::geometry::{CircularRange, wrap_angle, wrap_angle_from};
use crate::tree::NodeId;

/// Neighbors closer than this never fully collapse the shrunk range.
const SHRINK_SLACK: f64 = 0.001;

/// Parameters of one refinement run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefineParams {
    pub cycles: u32,
    pub aversion_ratio: f64,
    /// Effective margin in the coordinate being optimized.
    pub margin: f64,
    pub allow_outside: bool,
}

impl RefineParams {
    pub fn new(config: &SlidingConfig, margin: f64) -> Self {
        Self {
            cycles: config.cycles,
            aversion_ratio: config.aversion_ratio,
            margin,
            allow_outside: config.allow_outside_interval,
        }
    }
}

/// One leaf update: the neighbor frame it was computed in and the result.
///
/// On a circle `right` and `position` are unwrapped relative to `left`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub left: f64,
    pub right: f64,
    pub position: f64,
}

/// Equilibrium between `left` and `right` after shrinking, passed through
/// `constrain` and finally held inside the shrunk range (never past a
/// neighbor).
fn relax_leaf(
    leaf: NodeId,
    left: f64,
    right: f64,
    centroid: f64,
    params: &RefineParams,
    constrain: impl FnOnce(f64) -> f64,
) -> Result<f64> {
    let shrink = ((right - left) / 2.0 - SHRINK_SLACK).min(params.margin);
    let lo = left + shrink;
    let hi = right - shrink;
    if lo.is_nan() || hi.is_nan() || hi <= lo {
        return Err(LayoutError::MarginInversion {
            leaf,
            left: lo,
            right: hi,
        });
    }

    let x = cubic::equilibrium(lo, hi, centroid, params.aversion_ratio).unwrap_or_else(|| {
        warn!(%leaf, lo, hi, centroid, "no equilibrium between neighbors, clamping centroid");
        centroid.max(lo).min(hi)
    });
    Ok(constrain(x).max(lo.max(left)).min(hi.min(right)))
}

// =============================================================================
// Rectangular
// =============================================================================

/// Run all passes on a rectangular boundary, reporting every update to
/// `observe`.
pub fn relax_rectangular(
    geo: &mut RectangularGeophylogeny,
    params: &RefineParams,
    mut observe: impl FnMut(NodeId, Step),
) -> Result<()> {
    let order = geo.leaf_order();
    let n = order.len();
    let bbox = geo.bbox();

    for _ in 0..params.cycles {
        for i in (0..n).rev() {
            let leaf = order[i];
            let interval = geo.site(leaf).interval;
            let left = if i == 0 {
                interval.from.min(bbox.min_x)
            } else {
                geo.leaf_x(order[i - 1])
            };
            let right = if i + 1 == n {
                interval.to.max(bbox.max_x)
            } else {
                geo.leaf_x(order[i + 1])
            };

            let position = relax_leaf(leaf, left, right, interval.midpoint(), params, |x| {
                if params.allow_outside {
                    x.max(bbox.min_x).min(bbox.max_x)
                } else {
                    x.max(bbox.min_x.max(interval.from))
                        .min(bbox.max_x.min(interval.to))
                }
            })?;
            geo.set_leaf_x(leaf, position);
            observe(
                leaf,
                Step {
                    left,
                    right,
                    position,
                },
            );
        }
    }
    Ok(())
}

/// Refine the leaves of a rectangular layout.
pub fn rectangular(geo: &mut RectangularGeophylogeny, params: &RefineParams) -> Result<()> {
    relax_rectangular(geo, params, |_, _| {})?;
    debug!(cycles = params.cycles, "rectangular refinement done");
    Ok(())
}

// =============================================================================
// Circular
// =============================================================================

/// Lift `centroid` into the frame `[left, left + 2π)`. A centroid beyond
/// `right` goes to whichever side of the frame is angularly nearer.
fn frame_centroid(centroid: f64, left: f64, right: f64) -> f64 {
    let lifted = wrap_angle_from(centroid, left);
    if lifted <= right {
        return lifted;
    }
    let past_right = lifted - right;
    let before_left = left + TAU - lifted;
    if past_right < before_left {
        lifted
    } else {
        lifted - TAU
    }
}

/// Endpoint of `range` angularly nearest to `x`, expressed next to `x`.
fn nearest_endpoint(range: &CircularRange, x: f64) -> f64 {
    let signed = |target: f64| wrap_angle(target - x + PI) - PI;
    let to_from = signed(range.from());
    let to_to = signed(range.to());
    if to_from.abs() <= to_to.abs() {
        x + to_from
    } else {
        x + to_to
    }
}

/// Run all passes on a circular boundary, reporting every update to
/// `observe`.
pub fn relax_circular(
    geo: &mut CircularGeophylogeny,
    params: &RefineParams,
    mut observe: impl FnMut(NodeId, Step),
) -> Result<()> {
    let order = geo.leaf_order();
    let n = order.len();

    for _ in 0..params.cycles {
        for i in (0..n).rev() {
            let leaf = order[i];
            let left = geo.leaf_phi(order[(i + n - 1) % n]);
            let mut right = wrap_angle_from(geo.leaf_phi(order[(i + 1) % n]), left);
            if n == 2 && right == left {
                right += TAU;
            }

            let site = geo.site(leaf);
            let range = site.circular_interval;
            let centroid = frame_centroid(site.polar().phi, left, right);

            let position = relax_leaf(leaf, left, right, centroid, params, |x| {
                if params.allow_outside || range.contains(wrap_angle(x)) {
                    x
                } else {
                    nearest_endpoint(&range, x)
                }
            })?;
            geo.set_leaf_phi(leaf, position);
            observe(
                leaf,
                Step {
                    left,
                    right,
                    position,
                },
            );
        }
    }
    Ok(())
}

/// Refine the leaves of a circular layout.
pub fn circular(geo: &mut CircularGeophylogeny, params: &RefineParams) -> Result<()> {
    relax_circular(geo, params, |_, _| {})?;
    debug!(cycles = params.cycles, "circular refinement done");
    Ok(())
}
