//! Tree and site model.
//!
//! This module provides the binary phylogenetic tree (a node arena with
//! cached post-order traversals), the per-node child-order flags written
//! by the ordering algorithms, and the geographic sites leaves are
//! anchored to.

mod node;
mod phylo_tree;
mod site;
mod spec;

pub use node::{Node, NodeId, NodeKind, NodeState, Side};
pub use phylo_tree::PhyloTree;
pub use site::{Interval, Site, sites_from_flat};
pub use spec::TreeSpec;
