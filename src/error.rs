//! Error type shared by tree construction and the layout pipelines.

use thiserror::Error;

use crate::boundary::BoundaryKind;
use crate::config::{CostKind, PositionKind};
use crate::tree::NodeId;

/// Everything that can stop a layout from being computed.
///
/// Construction errors are reported before any layout work starts.
/// Numerical degeneracy inside the cubic solver is not an error: it is
/// clamped and logged.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("a geophylogeny needs at least two leaves, found {0}")]
    TooFewLeaves(usize),

    #[error("{node} has {children} children; only binary trees are supported")]
    NotBinary { node: NodeId, children: usize },

    #[error("tree must have exactly one root, found {0}")]
    RootCount(usize),

    #[error("tree topology contains a cycle")]
    Cyclic,

    #[error("{0} has more than one parent")]
    MultipleParents(NodeId),

    #[error("{0} is not reachable from the root")]
    Unreachable(NodeId),

    #[error("edge references node {node} but only {count} nodes exist")]
    NodeOutOfRange { node: u32, count: usize },

    #[error("{leaf} has no site assigned")]
    MissingSite { leaf: NodeId },

    #[error("{leaf} references site {site} but only {count} sites exist")]
    SiteOutOfRange { leaf: NodeId, site: usize, count: usize },

    #[error("site {0} is assigned to more than one leaf")]
    DuplicateSite(usize),

    #[error("tree has {leaves} leaves but {sites} sites were supplied")]
    SiteCountMismatch { leaves: usize, sites: usize },

    #[error("site {0} has a non-finite coordinate")]
    NonFiniteSite(usize),

    #[error("{cost:?} cost is not defined on a {boundary:?} boundary")]
    UnsupportedCost { cost: CostKind, boundary: BoundaryKind },

    #[error("layout was built for {configured:?} positions, not {requested:?}")]
    PositionKindMismatch {
        configured: PositionKind,
        requested: PositionKind,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("margin inversion at {leaf}: right boundary {right} <= left boundary {left}")]
    MarginInversion { leaf: NodeId, left: f64, right: f64 },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_offender() {
        let err = LayoutError::NotBinary {
            node: NodeId(4),
            children: 1,
        };
        assert_eq!(
            err.to_string(),
            "Node(4) has 1 children; only binary trees are supported"
        );

        let err = LayoutError::SiteOutOfRange {
            leaf: NodeId(2),
            site: 9,
            count: 3,
        };
        assert!(err.to_string().contains("site 9"));
    }

    #[test]
    fn test_margin_inversion_message() {
        let err = LayoutError::MarginInversion {
            leaf: NodeId(0),
            left: 1.5,
            right: 1.0,
        };
        assert!(err.to_string().starts_with("margin inversion at Node(0)"));
    }
}
