//! Node type and related structures.
//!
//! Nodes are the vertices of the binary tree. Each node has:
//! - A stable identifier (its index in the tree's node arena)
//! - A parent back-reference and, for inner nodes, two owned children
//! - A clade size (number of leaves below it)
//! - Child-order flags written by the ordering algorithms
//! - A position (Cartesian, plus polar for circular layouts)

use std::fmt;

use serde::Serialize;

use crate::geometry::{Point, PolarPoint};

/// Stable node identifier.
///
/// Ids index the tree's node arena directly. They are assigned in
/// post-order at construction, so every child has a smaller id than its
/// parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Create a new NodeId from a raw u32.
    #[inline]
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Arena index of this node.
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl From<u32> for NodeId {
    #[inline]
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<NodeId> for u32 {
    #[inline]
    fn from(id: NodeId) -> Self {
        id.0
    }
}

/// Classification of a node by its connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeKind {
    /// The only node without a parent.
    Root,
    /// A node without children; carries a site.
    Leaf,
    /// A node with exactly two children.
    Inner,
}

/// Which traversal convention a child-order flag belongs to.
///
/// Rectangular layouts read leaves left to right using the `Left` flag;
/// circular layouts run the other way round the boundary and use the
/// `Right` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Node layout flags packed into a single byte.
///
/// Both "first child" flags start out set: the first child is visited
/// first in either direction until an ordering algorithm decides
/// otherwise.
#[derive(Debug, Clone, Copy)]
pub struct NodeState {
    flags: u8,
}

impl NodeState {
    const FIRST_AS_LEFT: u8 = 0b0000_0001;
    const FIRST_AS_RIGHT: u8 = 0b0000_0010;

    /// Create a new default node state.
    #[inline]
    pub fn new() -> Self {
        Self {
            flags: Self::FIRST_AS_LEFT | Self::FIRST_AS_RIGHT,
        }
    }

    /// Whether the first child is visited first for the given side.
    #[inline]
    pub fn first_leads(self, side: Side) -> bool {
        self.flags & Self::mask(side) != 0
    }

    /// Set whether the first child is visited first for the given side.
    #[inline]
    pub fn set_first_leads(&mut self, side: Side, first: bool) {
        if first {
            self.flags |= Self::mask(side);
        } else {
            self.flags &= !Self::mask(side);
        }
    }

    #[inline]
    fn mask(side: Side) -> u8 {
        match side {
            Side::Left => Self::FIRST_AS_LEFT,
            Side::Right => Self::FIRST_AS_RIGHT,
        }
    }
}

impl Default for NodeState {
    fn default() -> Self {
        Self::new()
    }
}

/// A node in the tree arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: NodeId,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Option<[NodeId; 2]>,
    pub(crate) site: Option<usize>,
    pub(crate) clade_size: usize,
    pub(crate) state: NodeState,
    pub(crate) position: Point,
    pub(crate) polar: Option<PolarPoint>,
}

impl Node {
    pub(crate) fn leaf(id: NodeId, site: usize) -> Self {
        Self {
            id,
            parent: None,
            children: None,
            site: Some(site),
            clade_size: 1,
            state: NodeState::new(),
            position: Point::default(),
            polar: None,
        }
    }

    pub(crate) fn inner(id: NodeId, first: NodeId, second: NodeId, clade_size: usize) -> Self {
        Self {
            id,
            parent: None,
            children: Some([first, second]),
            site: None,
            clade_size,
            state: NodeState::new(),
            position: Point::default(),
            polar: None,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// The first and second child, or `None` for a leaf.
    pub fn children(&self) -> Option<[NodeId; 2]> {
        self.children
    }

    /// Index of the site this leaf is anchored to.
    pub fn site(&self) -> Option<usize> {
        self.site
    }

    /// Number of leaves in the subtree rooted here.
    pub fn clade_size(&self) -> usize {
        self.clade_size
    }

    pub fn state(&self) -> NodeState {
        self.state
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_none()
    }

    pub fn kind(&self) -> NodeKind {
        if self.parent.is_none() {
            NodeKind::Root
        } else if self.children.is_none() {
            NodeKind::Leaf
        } else {
            NodeKind::Inner
        }
    }

    pub fn position(&self) -> Point {
        self.position
    }

    /// Polar position; only set by circular layouts.
    pub fn polar(&self) -> Option<PolarPoint> {
        self.polar
    }

    /// Children in the order the given side visits them.
    pub fn ordered_children(&self, side: Side) -> Option<[NodeId; 2]> {
        self.children.map(|[first, second]| {
            if self.state.first_leads(side) {
                [first, second]
            } else {
                [second, first]
            }
        })
    }

    pub(crate) fn set_position(&mut self, position: Point) {
        self.position = position;
        self.polar = None;
    }

    pub(crate) fn set_polar(&mut self, polar: PolarPoint) {
        self.polar = Some(polar);
        self.position = polar.to_cartesian();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id() {
        let id = NodeId::new(42);
        assert_eq!(id.raw(), 42);
        assert_eq!(id.index(), 42);
        assert_eq!(format!("{}", id), "Node(42)");
    }

    #[test]
    fn test_node_id_conversion() {
        let id: NodeId = 123.into();
        let raw: u32 = id.into();
        assert_eq!(raw, 123);
    }

    #[test]
    fn test_node_state_default() {
        let state = NodeState::new();
        assert!(state.first_leads(Side::Left));
        assert!(state.first_leads(Side::Right));
    }

    #[test]
    fn test_node_state_sides_are_independent() {
        let mut state = NodeState::new();
        state.set_first_leads(Side::Left, false);
        assert!(!state.first_leads(Side::Left));
        assert!(state.first_leads(Side::Right));

        state.set_first_leads(Side::Right, false);
        state.set_first_leads(Side::Left, true);
        assert!(state.first_leads(Side::Left));
        assert!(!state.first_leads(Side::Right));
    }

    #[test]
    fn test_ordered_children_follows_flag() {
        let mut node = Node::inner(NodeId(2), NodeId(0), NodeId(1), 2);
        assert_eq!(node.ordered_children(Side::Left), Some([NodeId(0), NodeId(1)]));

        node.state.set_first_leads(Side::Left, false);
        assert_eq!(node.ordered_children(Side::Left), Some([NodeId(1), NodeId(0)]));
        assert_eq!(node.ordered_children(Side::Right), Some([NodeId(0), NodeId(1)]));
    }

    #[test]
    fn test_kind() {
        let mut leaf = Node::leaf(NodeId(0), 0);
        assert_eq!(leaf.kind(), NodeKind::Root);
        leaf.parent = Some(NodeId(2));
        assert_eq!(leaf.kind(), NodeKind::Leaf);

        let mut inner = Node::inner(NodeId(2), NodeId(0), NodeId(1), 2);
        assert_eq!(inner.kind(), NodeKind::Root);
        inner.parent = Some(NodeId(4));
        assert_eq!(inner.kind(), NodeKind::Inner);
    }

    #[test]
    fn test_set_polar_updates_cartesian() {
        let mut leaf = Node::leaf(NodeId(0), 0);
        leaf.set_polar(PolarPoint::new(2.0, std::f64::consts::FRAC_PI_2));
        assert!(leaf.position().x.abs() < 1e-12);
        assert!((leaf.position().y - 2.0).abs() < 1e-12);

        leaf.set_position(Point::new(1.0, 1.0));
        assert!(leaf.polar().is_none());
    }
}
