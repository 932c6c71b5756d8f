//! Continuous ("sliding") leaf positions.
//!
//! Feasibility intervals, greedy placement inside them, then force
//! refinement. Each stage writes into the geophylogeny in place.

use serde::Serialize;
use tracing::info;

use super::refine::RefineParams;
use super::{feasibility, placement, refine};
use crate::boundary::{CircularGeophylogeny, RectangularGeophylogeny, SlotBoundary};
use crate::config::SlidingConfig;
use crate::error::Result;

/// Summary of a continuous layout run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlidingReport {
    /// Separation after margin widening (an angle on a rectangular
    /// boundary, a scaled arc on a circular one).
    pub separation: f64,
    /// Separation required by non-crossing alone.
    pub raw_separation: f64,
    /// Inner nodes whose child order needs a positive separation.
    pub conflicts: usize,
    /// Reference site chosen for a circular layout.
    pub reference_site: Option<usize>,
    /// Effective margin between neighboring leaves.
    pub interval_margin: f64,
}

impl SlidingReport {
    fn new(separation: feasibility::Separation, interval_margin: f64) -> Self {
        Self {
            separation: separation.value,
            raw_separation: separation.raw_value,
            conflicts: separation.conflicts,
            reference_site: separation.reference_site,
            interval_margin,
        }
    }
}

/// Run the continuous pipeline on a rectangular boundary.
pub fn run_rectangular(
    geo: &mut RectangularGeophylogeny,
    config: &SlidingConfig,
) -> Result<SlidingReport> {
    config.validate()?;
    let margin = geo.interval_margin(config.margin);

    let separation = feasibility::rectangular(geo, margin);
    placement::rectangular(geo, margin, config.allow_outside_interval);
    refine::rectangular(geo, &RefineParams::new(config, margin))?;

    let report = SlidingReport::new(separation, margin);
    info!(
        leaves = geo.tree().leaf_count(),
        separation = report.separation,
        conflicts = report.conflicts,
        "rectangular sliding layout done"
    );
    Ok(report)
}

/// Run the continuous pipeline on a circular boundary.
///
/// Placement works in the frame of the chosen reference site, so that site
/// anchors the start of the drawing order.
pub fn run_circular(
    geo: &mut CircularGeophylogeny,
    config: &SlidingConfig,
) -> Result<SlidingReport> {
    config.validate()?;
    let margin = geo.interval_margin(config.margin);

    let separation = feasibility::circular(geo, margin);
    let reference_phi = separation
        .reference_site
        .map_or(0.0, |site| geo.sites()[site].polar().phi);
    placement::circular(geo, margin, config.allow_outside_interval, reference_phi);
    refine::circular(geo, &RefineParams::new(config, margin))?;

    let report = SlidingReport::new(separation, margin);
    info!(
        leaves = geo.tree().leaf_count(),
        separation = report.separation,
        conflicts = report.conflicts,
        reference = ?report.reference_site,
        "circular sliding layout done"
    );
    Ok(report)
}
