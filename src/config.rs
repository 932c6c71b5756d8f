//! Layout configuration.
//!
//! The configuration is deserialized from a plain JS object on the wasm
//! side, so every field has a default and names are camelCase.

use serde::{Deserialize, Serialize};

use crate::boundary::BoundaryKind;
use crate::error::{LayoutError, Result};

/// Whether leaves snap to evenly spaced slots or slide freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PositionKind {
    /// Leaves occupy the `n` equally spaced slots (dynamic program).
    #[default]
    Discrete,
    /// Leaves slide within feasibility intervals (force refinement).
    Continuous,
}

/// Leaf-to-slot cost used by the discrete ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CostKind {
    /// Straight-line distance between site and slot.
    #[default]
    Euclidean,
    /// Horizontal offset; rectangular boundaries only.
    Horizontal,
    /// Angular offset scaled by the site's radius; circular boundaries only.
    Radial,
}

/// Parameters of the continuous (sliding) pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlidingConfig {
    /// Number of refinement passes over all leaves (default: 100).
    pub cycles: u32,
    /// Weight of the neighbor repulsion; the centroid pull gets
    /// `1 - aversion_ratio` (default: 0.5).
    pub aversion_ratio: f64,
    /// Minimum separation between neighboring leaves (default: 0.5).
    pub margin: f64,
    /// Let leaves leave their feasibility interval (default: false).
    pub allow_outside_interval: bool,
}

impl Default for SlidingConfig {
    fn default() -> Self {
        Self {
            cycles: 100,
            aversion_ratio: 0.5,
            margin: 0.5,
            allow_outside_interval: false,
        }
    }
}

impl SlidingConfig {
    pub fn centroid_ratio(&self) -> f64 {
        1.0 - self.aversion_ratio
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.aversion_ratio) {
            return Err(LayoutError::InvalidConfig(format!(
                "aversion ratio must lie in [0, 1), got {}",
                self.aversion_ratio
            )));
        }
        if !self.margin.is_finite() || self.margin < 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "margin must be finite and non-negative, got {}",
                self.margin
            )));
        }
        Ok(())
    }
}

/// Full layout configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LayoutConfig {
    /// Shape of the leaf boundary (default: Rectangular).
    pub boundary: BoundaryKind,
    /// Discrete slots or continuous positions (default: Discrete).
    pub positions: PositionKind,
    /// Cost used by the discrete ordering (default: Euclidean).
    pub cost: CostKind,
    /// Parameters of the continuous pipeline.
    pub sliding: SlidingConfig,
    /// Height (or radius) added per tree level when placing inner nodes
    /// (default: 0.3).
    pub inner_node_offset: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            boundary: BoundaryKind::Rectangular,
            positions: PositionKind::Discrete,
            cost: CostKind::Euclidean,
            sliding: SlidingConfig::default(),
            inner_node_offset: 0.3,
        }
    }
}

impl LayoutConfig {
    /// Check the numeric parameters and the cost/boundary pairing.
    pub fn validate(&self) -> Result<()> {
        self.sliding.validate()?;
        if !self.inner_node_offset.is_finite() || self.inner_node_offset < 0.0 {
            return Err(LayoutError::InvalidConfig(format!(
                "inner node offset must be finite and non-negative, got {}",
                self.inner_node_offset
            )));
        }
        if self.positions == PositionKind::Discrete && !self.boundary.supports(self.cost) {
            return Err(LayoutError::UnsupportedCost {
                cost: self.cost,
                boundary: self.boundary,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LayoutConfig::default();
        assert_eq!(config.sliding.cycles, 100);
        assert_eq!(config.sliding.aversion_ratio, 0.5);
        assert_eq!(config.sliding.margin, 0.5);
        assert!(!config.sliding.allow_outside_interval);
        assert_eq!(config.inner_node_offset, 0.3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_json() {
        let config: LayoutConfig = serde_json::from_str(
            r#"{
                "boundary": "circular",
                "positions": "continuous",
                "sliding": { "cycles": 20, "allowOutsideInterval": true }
            }"#,
        )
        .unwrap();

        assert_eq!(config.boundary, BoundaryKind::Circular);
        assert_eq!(config.positions, PositionKind::Continuous);
        assert_eq!(config.cost, CostKind::Euclidean);
        assert_eq!(config.sliding.cycles, 20);
        assert!(config.sliding.allow_outside_interval);
        assert_eq!(config.sliding.margin, 0.5, "unspecified fields keep defaults");
    }

    #[test]
    fn test_parse_empty_object() {
        let config: LayoutConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, LayoutConfig::default());
    }

    #[test]
    fn test_rejects_bad_aversion_ratio() {
        let mut config = LayoutConfig::default();
        config.sliding.aversion_ratio = 1.0;
        assert!(matches!(
            config.validate(),
            Err(LayoutError::InvalidConfig(_))
        ));

        config.sliding.aversion_ratio = -0.1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_margin() {
        let mut config = LayoutConfig::default();
        config.sliding.margin = -1.0;
        assert!(config.validate().is_err());

        config.sliding.margin = f64::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_cycles_allowed() {
        let mut config = LayoutConfig::default();
        config.sliding.cycles = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cost_must_fit_boundary() {
        let config = LayoutConfig {
            boundary: BoundaryKind::Circular,
            cost: CostKind::Horizontal,
            ..LayoutConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(LayoutError::UnsupportedCost {
                cost: CostKind::Horizontal,
                boundary: BoundaryKind::Circular,
            })
        );

        let config = LayoutConfig {
            cost: CostKind::Radial,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_err());

        let config = LayoutConfig {
            cost: CostKind::Radial,
            positions: PositionKind::Continuous,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_ok(), "cost is unused by the continuous path");
    }
}
