//! R-tree over laid-out node positions, backed by rstar.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use crate::geometry::Point;
use crate::tree::NodeId;

/// A node position stored in the index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePoint {
    pub id: NodeId,
    pub position: Point,
}

impl NodePoint {
    pub fn new(id: NodeId, position: Point) -> Self {
        Self { id, position }
    }

    fn coords(&self) -> [f64; 2] {
        [self.position.x, self.position.y]
    }
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.coords())
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position.x - point[0];
        let dy = self.position.y - point[1];
        dx * dx + dy * dy
    }

    fn contains_point(&self, point: &[f64; 2]) -> bool {
        self.distance_2(point) <= f64::EPSILON * f64::EPSILON
    }
}

/// Immutable spatial index over the nodes of one layout.
///
/// Bulk loaded once; a layout is never edited afterwards.
#[derive(Clone)]
pub struct SpatialIndex {
    tree: RTree<NodePoint>,
}

impl SpatialIndex {
    /// Bulk load the index from `(id, position)` pairs. Non-finite
    /// positions are skipped.
    pub fn from_points(points: impl IntoIterator<Item = (NodeId, Point)>) -> Self {
        let points: Vec<NodePoint> = points
            .into_iter()
            .filter(|(_, position)| position.is_finite())
            .map(|(id, position)| NodePoint::new(id, position))
            .collect();
        Self {
            tree: RTree::bulk_load(points),
        }
    }

    /// Nearest node to `(x, y)`.
    pub fn nearest(&self, x: f64, y: f64) -> Option<NodeId> {
        self.tree.nearest_neighbor(&[x, y]).map(|point| point.id)
    }

    /// Nearest node no farther than `max_distance` from `(x, y)`.
    pub fn nearest_within(&self, x: f64, y: f64, max_distance: f64) -> Option<NodeId> {
        let max_distance_sq = max_distance * max_distance;
        self.tree
            .nearest_neighbor(&[x, y])
            .filter(|point| point.distance_2(&[x, y]) <= max_distance_sq)
            .map(|point| point.id)
    }

    /// All nodes inside the axis-aligned rectangle.
    pub fn in_rect(&self, min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Vec<NodeId> {
        let envelope = AABB::from_corners([min_x, min_y], [max_x, max_y]);
        self.tree
            .locate_in_envelope(&envelope)
            .map(|point| point.id)
            .collect()
    }

    /// All nodes within `radius` of `(x, y)`.
    pub fn in_radius(&self, x: f64, y: f64, radius: f64) -> Vec<NodeId> {
        self.tree
            .locate_within_distance([x, y], radius * radius)
            .map(|point| point.id)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
