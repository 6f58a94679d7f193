//! R-tree based spatial index using the rstar crate.
//!
//! Backs the interactive picking path: the input layer translates a cursor
//! ray point into "which node is this" via nearest-neighbor lookup instead
//! of scanning every node.

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use crate::graph::NodeId;
use crate::math::Vec3;

/// A 3D point in the spatial index with its node id.
#[derive(Debug, Clone, Copy, PartialEq)]
struct NodePoint {
    id: NodeId,
    pos: [f64; 3],
}

impl NodePoint {
    fn new(id: NodeId, pos: Vec3) -> Self {
        Self {
            id,
            pos: [pos.x, pos.y, pos.z],
        }
    }
}

impl RTreeObject for NodePoint {
    type Envelope = AABB<[f64; 3]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.pos)
    }
}

impl PointDistance for NodePoint {
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.pos[0] - point[0];
        let dy = self.pos[1] - point[1];
        let dz = self.pos[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

/// Spatial index over node positions.
///
/// Positions move every relaxation step, so the index is rebuilt in bulk
/// rather than maintained incrementally; queries answer from the last
/// rebuild.
pub struct SpatialIndex {
    tree: RTree<NodePoint>,
}

impl SpatialIndex {
    /// Create a new empty spatial index.
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    /// Nearest node to a point.
    pub fn nearest(&self, point: Vec3) -> Option<NodeId> {
        self.tree
            .nearest_neighbor(&[point.x, point.y, point.z])
            .map(|p| p.id)
    }

    /// Nodes in ascending distance from a point, with squared distances.
    ///
    /// Lets callers skip entries they know are stale (e.g. ids removed
    /// from the graph since the last rebuild) and take the next-nearest.
    pub fn nearest_iter(&self, point: Vec3) -> impl Iterator<Item = (NodeId, f64)> + '_ {
        self.tree
            .nearest_neighbor_iter_with_distance_2(&[point.x, point.y, point.z])
            .map(|(p, d2)| (p.id, d2))
    }

    /// Nearest node within a maximum distance of a point.
    pub fn nearest_within(&self, point: Vec3, max_distance: f64) -> Option<NodeId> {
        let query = [point.x, point.y, point.z];
        self.tree
            .nearest_neighbor(&query)
            .filter(|p| p.distance_2(&query) <= max_distance * max_distance)
            .map(|p| p.id)
    }

    /// All nodes within a radius of a point.
    pub fn in_radius(&self, point: Vec3, radius: f64) -> Vec<NodeId> {
        self.tree
            .locate_within_distance([point.x, point.y, point.z], radius * radius)
            .map(|p| p.id)
            .collect()
    }

    /// Rebuild the index from `(id, position)` pairs in one bulk load.
    pub fn rebuild(&mut self, points: &[(NodeId, Vec3)]) {
        let node_points: Vec<_> = points
            .iter()
            .map(|&(id, pos)| NodePoint::new(id, pos))
            .collect();
        self.tree = RTree::bulk_load(node_points);
    }

    /// Drop all indexed points.
    pub fn clear(&mut self) {
        self.tree = RTree::new();
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
