//! Boundary-agnostic layout context and its serializable result.
//!
//! [`Geophylogeny`] picks the boundary from a [`LayoutConfig`] and runs the
//! configured pipeline: the discrete ordering or the continuous one,
//! followed by inner-node propagation.

use serde::Serialize;
use tracing::info;

use crate::boundary::{
    BoundaryKind, BoundingBox, CircularGeophylogeny, RectangularGeophylogeny, SlotBoundary,
};
use crate::config::{CostKind, LayoutConfig, PositionKind, SlidingConfig};
use crate::error::{LayoutError, Result};
use crate::geometry::{Circle, Point, PolarPoint};
use crate::layout::{DiscreteReport, SlidingReport};
use crate::spatial::SpatialIndex;
use crate::tree::{NodeId, NodeKind, PhyloTree, Site};

#[derive(Debug, Clone)]
enum Context {
    Rectangular(RectangularGeophylogeny),
    Circular(CircularGeophylogeny),
}

/// A tree, its sites and a boundary, ready to be laid out.
#[derive(Debug, Clone)]
pub struct Geophylogeny {
    config: LayoutConfig,
    context: Context,
}

impl Geophylogeny {
    /// Validate `config`, then build the boundary context it names.
    pub fn new(tree: PhyloTree, sites: Vec<Site>, config: LayoutConfig) -> Result<Self> {
        config.validate()?;
        let context = match config.boundary {
            BoundaryKind::Rectangular => {
                Context::Rectangular(RectangularGeophylogeny::new(tree, sites)?)
            }
            BoundaryKind::Circular => Context::Circular(CircularGeophylogeny::new(tree, sites)?),
        };
        Ok(Self { config, context })
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn boundary_kind(&self) -> BoundaryKind {
        self.config.boundary
    }

    pub fn tree(&self) -> &PhyloTree {
        match &self.context {
            Context::Rectangular(geo) => geo.tree(),
            Context::Circular(geo) => geo.tree(),
        }
    }

    /// Sites after normalization (and centering, on a circle).
    pub fn sites(&self) -> &[Site] {
        match &self.context {
            Context::Rectangular(geo) => geo.sites(),
            Context::Circular(geo) => geo.sites(),
        }
    }

    /// Leaves in drawing order along the boundary.
    pub fn leaf_order(&self) -> Vec<NodeId> {
        match &self.context {
            Context::Rectangular(geo) => geo.leaf_order(),
            Context::Circular(geo) => geo.leaf_order(),
        }
    }

    fn require(&self, requested: PositionKind) -> Result<()> {
        if self.config.positions == requested {
            Ok(())
        } else {
            Err(LayoutError::PositionKindMismatch {
                configured: self.config.positions,
                requested,
            })
        }
    }

    /// Optimal discrete order for `cost`.
    pub fn run_discrete_ordering(&mut self, cost: CostKind) -> Result<DiscreteReport> {
        self.require(PositionKind::Discrete)?;
        match &mut self.context {
            Context::Rectangular(geo) => geo.run_discrete_ordering(cost),
            Context::Circular(geo) => geo.run_discrete_ordering(cost),
        }
    }

    /// Continuous positions with the given sliding parameters.
    pub fn run_continuous_ordering(&mut self, config: &SlidingConfig) -> Result<SlidingReport> {
        self.require(PositionKind::Continuous)?;
        match &mut self.context {
            Context::Rectangular(geo) => geo.run_continuous_ordering(config),
            Context::Circular(geo) => geo.run_continuous_ordering(config),
        }
    }

    /// Place inner nodes from the current leaf positions.
    pub fn propagate_inner_positions(&mut self) {
        let offset = self.config.inner_node_offset;
        match &mut self.context {
            Context::Rectangular(geo) => geo.propagate_inner_positions(offset),
            Context::Circular(geo) => geo.propagate_inner_positions(offset),
        }
    }

    /// Run the configured pipeline end to end.
    pub fn run(&mut self) -> Result<LayoutResult> {
        let report = match self.config.positions {
            PositionKind::Discrete => {
                LayoutReport::Discrete(self.run_discrete_ordering(self.config.cost)?)
            }
            PositionKind::Continuous => {
                let sliding = self.config.sliding.clone();
                LayoutReport::Sliding(self.run_continuous_ordering(&sliding)?)
            }
        };
        self.propagate_inner_positions();
        info!(
            boundary = ?self.config.boundary,
            positions = ?self.config.positions,
            nodes = self.tree().node_count(),
            "layout complete"
        );
        Ok(self.result(Some(report)))
    }

    /// Snapshot of the current node positions.
    pub fn result(&self, report: Option<LayoutReport>) -> LayoutResult {
        let nodes = self
            .tree()
            .nodes()
            .iter()
            .map(|node| NodeLayout {
                id: node.id(),
                kind: node.kind(),
                position: node.position(),
                polar: node.polar(),
            })
            .collect();
        let boundary = match &self.context {
            Context::Rectangular(geo) => LayoutBoundary::Box(geo.bbox()),
            Context::Circular(geo) => LayoutBoundary::Circle(geo.circle()),
        };
        LayoutResult {
            nodes,
            leaf_order: self.leaf_order(),
            boundary,
            report,
        }
    }

    /// Node positions as `[x0, y0, x1, y1, ...]`, indexed by node id.
    pub fn positions(&self) -> Vec<f64> {
        self.tree()
            .nodes()
            .iter()
            .flat_map(|node| {
                let p = node.position();
                [p.x, p.y]
            })
            .collect()
    }

    /// R-tree over the current node positions.
    pub fn spatial_index(&self) -> SpatialIndex {
        SpatialIndex::from_points(
            self.tree()
                .nodes()
                .iter()
                .map(|node| (node.id(), node.position())),
        )
    }
}

/// Which pipeline produced a layout, with its summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum LayoutReport {
    Discrete(DiscreteReport),
    Sliding(SlidingReport),
}

/// Surface the leaves were placed on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "camelCase")]
pub enum LayoutBoundary {
    Box(BoundingBox),
    Circle(Circle),
}

/// Final placement of one node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NodeLayout {
    pub id: NodeId,
    pub kind: NodeKind,
    pub position: Point,
    pub polar: Option<PolarPoint>,
}

/// Everything a renderer needs from a finished layout.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    /// Indexed by node id.
    pub nodes: Vec<NodeLayout>,
    pub leaf_order: Vec<NodeId>,
    pub boundary: LayoutBoundary,
    pub report: Option<LayoutReport>,
}
