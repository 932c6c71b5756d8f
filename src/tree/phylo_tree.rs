//! Binary tree arena.
//!
//! Nodes live in a flat `Vec` indexed by [`NodeId`]. Ids are assigned in
//! post-order, so the arena order is itself the cached post-order
//! traversal and every child id is smaller than its parent's. Parents are
//! plain indices written once during construction.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::algo::is_cyclic_directed;
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::DfsPostOrder;
use tracing::warn;

use super::node::{Node, NodeId, NodeKind, Side};
use super::spec::TreeSpec;
use crate::error::{LayoutError, Result};

/// A strictly binary tree whose leaves reference sites by index.
#[derive(Debug, Clone)]
pub struct PhyloTree {
    nodes: Vec<Node>,
    root: NodeId,
    /// Leaves in post-order.
    leaves: Vec<NodeId>,
    /// Inner nodes (root included) in post-order.
    inner: Vec<NodeId>,
}

impl PhyloTree {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Build a tree from nested data.
    pub fn from_spec(spec: &TreeSpec) -> Result<Self> {
        enum Frame<'a> {
            Enter(&'a TreeSpec),
            Exit(usize),
        }

        let mut nodes: Vec<Node> = Vec::new();
        let mut finished: Vec<NodeId> = Vec::new();
        let mut stack = vec![Frame::Enter(spec)];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(TreeSpec::Leaf { site }) => {
                    let id = next_id(&nodes);
                    nodes.push(Node::leaf(id, *site));
                    finished.push(id);
                }
                Frame::Enter(TreeSpec::Inner { children }) => {
                    stack.push(Frame::Exit(children.len()));
                    for child in children.iter().rev() {
                        stack.push(Frame::Enter(child));
                    }
                }
                Frame::Exit(count) => {
                    let id = next_id(&nodes);
                    if count != 2 {
                        return Err(LayoutError::NotBinary {
                            node: id,
                            children: count,
                        });
                    }
                    let second = finished.pop();
                    let first = finished.pop();
                    let (Some(first), Some(second)) = (first, second) else {
                        return Err(LayoutError::NotBinary {
                            node: id,
                            children: count,
                        });
                    };
                    let clade_size =
                        nodes[first.index()].clade_size + nodes[second.index()].clade_size;
                    nodes.push(Node::inner(id, first, second, clade_size));
                    finished.push(id);
                }
            }
        }

        Self::from_post_order(nodes)
    }

    /// Build a tree from flat directed edge pairs `[p0, c0, p1, c1, ...]`
    /// and flat leaf/site pairs `[leaf0, site0, leaf1, site1, ...]`.
    ///
    /// Node numbers in the input are arbitrary; the tree renumbers them in
    /// post-order. For each parent, the edge listed first names its first
    /// child. Errors refer to the input numbering.
    pub fn from_edges(edges: &[u32], leaf_sites: &[u32]) -> Result<Self> {
        let node_count = edges.iter().map(|&n| n as usize + 1).max().unwrap_or(0);

        let mut graph: StableGraph<(), (), petgraph::Directed> =
            StableGraph::with_capacity(node_count, edges.len() / 2);
        let indices: Vec<NodeIndex> = (0..node_count).map(|_| graph.add_node(())).collect();
        let mut children: Vec<Vec<u32>> = vec![Vec::new(); node_count];

        for pair in edges.chunks_exact(2) {
            let (parent, child) = (pair[0], pair[1]);
            graph.add_edge(indices[parent as usize], indices[child as usize], ());
            children[parent as usize].push(child);
        }

        for (raw, &index) in indices.iter().enumerate() {
            if graph.neighbors_directed(index, Direction::Incoming).count() > 1 {
                return Err(LayoutError::MultipleParents(NodeId(raw as u32)));
            }
        }

        if is_cyclic_directed(&graph) {
            return Err(LayoutError::Cyclic);
        }

        // Numbers that appear in no edge are stray nodes, not extra roots.
        let touched = |index: NodeIndex| {
            graph.neighbors_undirected(index).next().is_some()
        };
        let roots: Vec<NodeIndex> = indices
            .iter()
            .copied()
            .filter(|&index| {
                touched(index)
                    && graph
                        .neighbors_directed(index, Direction::Incoming)
                        .next()
                        .is_none()
            })
            .collect();
        let [root] = roots[..] else {
            return Err(LayoutError::RootCount(roots.len()));
        };

        for (raw, list) in children.iter().enumerate() {
            if !list.is_empty() && list.len() != 2 {
                return Err(LayoutError::NotBinary {
                    node: NodeId(raw as u32),
                    children: list.len(),
                });
            }
        }

        let mut sites: HashMap<u32, usize> = HashMap::new();
        for pair in leaf_sites.chunks_exact(2) {
            let (leaf, site) = (pair[0], pair[1] as usize);
            if leaf as usize >= node_count {
                return Err(LayoutError::NodeOutOfRange {
                    node: leaf,
                    count: node_count,
                });
            }
            if !children[leaf as usize].is_empty() {
                warn!(node = leaf, site, "ignoring site assigned to an inner node");
                continue;
            }
            sites.insert(leaf, site);
        }

        let mut order: Vec<u32> = Vec::with_capacity(node_count);
        let mut dfs = DfsPostOrder::new(&graph, root);
        while let Some(index) = dfs.next(&graph) {
            order.push(index.index() as u32);
        }
        if order.len() != node_count {
            let mut visited = vec![false; node_count];
            for &raw in &order {
                visited[raw as usize] = true;
            }
            if let Some(raw) = visited.iter().position(|seen| !seen) {
                return Err(LayoutError::Unreachable(NodeId(raw as u32)));
            }
        }

        let mut renumber: HashMap<u32, NodeId> = HashMap::with_capacity(node_count);
        let mut nodes: Vec<Node> = Vec::with_capacity(node_count);
        for raw in order {
            let id = next_id(&nodes);
            let node = match children[raw as usize][..] {
                [] => {
                    let site = sites.get(&raw).copied().ok_or(LayoutError::MissingSite {
                        leaf: NodeId(raw),
                    })?;
                    Node::leaf(id, site)
                }
                [first, second] => {
                    let (Some(&first), Some(&second)) =
                        (renumber.get(&first), renumber.get(&second))
                    else {
                        return Err(LayoutError::Cyclic);
                    };
                    let clade_size =
                        nodes[first.index()].clade_size + nodes[second.index()].clade_size;
                    Node::inner(id, first, second, clade_size)
                }
                _ => {
                    return Err(LayoutError::NotBinary {
                        node: NodeId(raw),
                        children: children[raw as usize].len(),
                    });
                }
            };
            renumber.insert(raw, id);
            nodes.push(node);
        }

        Self::from_post_order(nodes)
    }

    /// Wire parents and cache traversals for nodes already in post-order.
    fn from_post_order(mut nodes: Vec<Node>) -> Result<Self> {
        let Some(root) = nodes.last().map(|node| node.id) else {
            return Err(LayoutError::TooFewLeaves(0));
        };

        for index in 0..nodes.len() {
            if let Some([first, second]) = nodes[index].children {
                let parent = nodes[index].id;
                nodes[first.index()].parent = Some(parent);
                nodes[second.index()].parent = Some(parent);
            }
        }

        let (leaves, inner): (Vec<NodeId>, Vec<NodeId>) = nodes
            .iter()
            .map(|node| node.id)
            .partition(|id| nodes[id.index()].is_leaf());

        if leaves.len() < 2 {
            return Err(LayoutError::TooFewLeaves(leaves.len()));
        }

        Ok(Self {
            nodes,
            root,
            leaves,
            inner,
        })
    }

    /// Check that the leaves reference each of `site_count` sites exactly
    /// once.
    pub fn validate_sites(&self, site_count: usize) -> Result<()> {
        if self.leaves.len() != site_count {
            return Err(LayoutError::SiteCountMismatch {
                leaves: self.leaves.len(),
                sites: site_count,
            });
        }
        let mut used = vec![false; site_count];
        for &leaf in &self.leaves {
            let Some(site) = self.get(leaf).site else {
                return Err(LayoutError::MissingSite { leaf });
            };
            if site >= site_count {
                return Err(LayoutError::SiteOutOfRange {
                    leaf,
                    site,
                    count: site_count,
                });
            }
            if std::mem::replace(&mut used[site], true) {
                return Err(LayoutError::DuplicateSite(site));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// All nodes in post-order (children before parents).
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Leaves in post-order.
    pub fn leaves(&self) -> &[NodeId] {
        &self.leaves
    }

    /// Inner nodes, root included, in post-order.
    pub fn inner_nodes(&self) -> &[NodeId] {
        &self.inner
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).and_then(|node| node.parent)
    }

    pub fn children(&self, id: NodeId) -> Option<[NodeId; 2]> {
        self.node(id).and_then(|node| node.children)
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(Node::kind)
    }

    /// Number of leaves below `id` (1 for a leaf).
    pub fn clade_size(&self, id: NodeId) -> usize {
        self.get(id).clade_size
    }

    /// Site index of every leaf, in the order of [`leaves`](Self::leaves).
    pub fn site_indices(&self) -> Vec<usize> {
        self.leaves
            .iter()
            .filter_map(|&leaf| self.get(leaf).site)
            .collect()
    }

    /// Leaves below `id`, first child's subtree before the second's.
    pub fn subtree_leaves(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.node(id).map_or(0, |n| n.clade_size));
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            match self.node(current).and_then(|node| node.children) {
                Some([first, second]) => {
                    stack.push(second);
                    stack.push(first);
                }
                None if self.node(current).is_some() => out.push(current),
                None => {}
            }
        }
        out
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        let mut max_depth = 0;
        // Reverse post-order visits parents before children.
        for node in self.nodes.iter().rev() {
            if let Some(parent) = node.parent {
                depths[node.id.index()] = depths[parent.index()] + 1;
                max_depth = max_depth.max(depths[node.id.index()]);
            }
        }
        max_depth
    }

    /// Leaves in drawing order for the given side: at every inner node the
    /// child selected by its flag is visited first.
    pub fn ordered_leaves(&self, side: Side) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.leaves.len());
        let mut stack = vec![self.root];
        while let Some(current) = stack.pop() {
            match self.get(current).ordered_children(side) {
                Some([lead, follow]) => {
                    stack.push(follow);
                    stack.push(lead);
                }
                None => out.push(current),
            }
        }
        out
    }

    // =========================================================================
    // Crate-internal access
    // =========================================================================

    /// Node by id. Ids handed out by this tree are always valid.
    #[inline]
    pub(crate) fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    /// Site index of a leaf. Only called on leaves.
    #[inline]
    pub(crate) fn site_of(&self, leaf: NodeId) -> usize {
        self.get(leaf).site.unwrap_or_default()
    }

    pub(crate) fn set_first_leads(&mut self, id: NodeId, side: Side, first: bool) {
        self.get_mut(id).state.set_first_leads(side, first);
    }
}

#[inline]
fn next_id(nodes: &[Node]) -> NodeId {
    NodeId(nodes.len() as u32)
}
