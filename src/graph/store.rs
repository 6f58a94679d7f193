//! The graph store: nodes, edges, adjacency, positions.
//!
//! Topology lives in petgraph's `StableGraph`; node values, positions, and
//! pin flags live in slot-indexed side arrays (SoA) so the per-frame force
//! loops touch contiguous memory. Externally everything is addressed by
//! stable [`NodeId`] / [`EdgeId`] values, which survive unrelated removals.
//!
//! Directedness is a property of the whole graph, fixed at construction.
//! Edges inherit it: an undirected graph treats the endpoint pair as
//! unordered for equality and adjacency, a directed graph does not.

use std::collections::{HashMap, HashSet};

use log::{debug, trace};
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};

use super::ids::{EdgeId, IdAllocator, NodeId};
use crate::math::Vec3;
use crate::spatial::SpatialIndex;

/// A graph of value-carrying nodes with 3D positions.
///
/// `N` is the node payload (logical value plus any display metadata the
/// renderer wants to carry, e.g. a sprite path); `E` is the optional edge
/// payload. Both are opaque to the layout machinery.
pub struct Graph<N, E = ()> {
    /// Topology. Node weights are the stable ids; edge weights hold the
    /// optional edge value.
    topology: StableGraph<NodeId, Option<E>, Directed>,

    /// Map from stable NodeId to petgraph NodeIndex.
    node_index: HashMap<NodeId, NodeIndex>,

    /// Map from stable EdgeId to petgraph EdgeIndex.
    edge_index: HashMap<EdgeId, EdgeIndex>,

    /// Reverse map for O(1) lookup during removal and snapshots.
    edge_ids: HashMap<EdgeIndex, EdgeId>,

    /// Id source owned by this graph.
    ids: IdAllocator,

    /// Whether edges are ordered pairs.
    directed: bool,

    /// Node values, slot-indexed. `None` marks a vacated slot.
    values: Vec<Option<N>>,

    /// Positions in SoA layout, slot-indexed.
    pos_x: Vec<f64>,
    pos_y: Vec<f64>,
    pos_z: Vec<f64>,

    /// Pin flags; pinned nodes are excluded from relaxation.
    pinned: Vec<bool>,

    /// Spatial index for nearest-node picking. Serves queries from the
    /// last rebuild.
    spatial: SpatialIndex,
}

impl<N, E> Graph<N, E> {
    fn new(directed: bool) -> Self {
        Self {
            topology: StableGraph::new(),
            node_index: HashMap::new(),
            edge_index: HashMap::new(),
            edge_ids: HashMap::new(),
            ids: IdAllocator::new(),
            directed,
            values: Vec::new(),
            pos_x: Vec::new(),
            pos_y: Vec::new(),
            pos_z: Vec::new(),
            pinned: Vec::new(),
            spatial: SpatialIndex::new(),
        }
    }

    /// Create an empty undirected graph.
    pub fn new_undirected() -> Self {
        Self::new(false)
    }

    /// Create an empty directed graph.
    pub fn new_directed() -> Self {
        Self::new(true)
    }

    /// Whether edges are ordered pairs.
    pub fn is_directed(&self) -> bool {
        self.directed
    }

    // =========================================================================
    // Node Operations
    // =========================================================================

    /// Add a node with the given value at the origin.
    ///
    /// The position is meaningless until the layout engine places it (or the
    /// caller sets it explicitly). Always succeeds.
    pub fn add_node(&mut self, value: N) -> NodeId {
        let id = self.ids.fresh_node();
        let index = self.topology.add_node(id);
        self.node_index.insert(id, index);

        let i = index.index();
        self.ensure_slot(i);
        self.values[i] = Some(value);
        self.pos_x[i] = 0.0;
        self.pos_y[i] = 0.0;
        self.pos_z[i] = 0.0;
        self.pinned[i] = false;

        trace!("added {id}");
        id
    }

    /// Add a node and connect it to each listed neighbor.
    ///
    /// One edge is created per distinct neighbor, running new -> neighbor.
    /// In an undirected graph that single edge already makes the adjacency
    /// mutual. Neighbors not present in the graph are skipped.
    pub fn add_node_connected(&mut self, value: N, neighbors: &[NodeId]) -> NodeId {
        let id = self.add_node(value);
        let mut seen = HashSet::with_capacity(neighbors.len());
        for &neighbor in neighbors {
            if !seen.insert(neighbor) {
                continue;
            }
            let (Some(&ai), Some(&bi)) =
                (self.node_index.get(&id), self.node_index.get(&neighbor))
            else {
                continue;
            };
            self.attach_edge(ai, bi, None);
        }
        id
    }

    /// Membership test by id.
    pub fn contains(&self, id: NodeId) -> bool {
        self.node_index.contains_key(&id)
    }

    /// Remove a node and every edge incident to it.
    ///
    /// Returns true if the node was present. Remaining nodes' adjacency no
    /// longer mentions it, and its id is never handed out again. The
    /// spatial index is not rebuilt here; picking queries filter the dead
    /// id out until the next [`Graph::rebuild_spatial_index`].
    pub fn remove_node(&mut self, id: NodeId) -> bool {
        let Some(index) = self.node_index.remove(&id) else {
            return false;
        };

        let incident: Vec<EdgeIndex> = self
            .topology
            .edges_directed(index, Direction::Outgoing)
            .chain(self.topology.edges_directed(index, Direction::Incoming))
            .map(|e| e.id())
            .collect();
        for edge_index in incident {
            if let Some(edge_id) = self.edge_ids.remove(&edge_index) {
                self.edge_index.remove(&edge_id);
            }
        }

        let i = index.index();
        if i < self.values.len() {
            self.values[i] = None;
            self.pos_x[i] = 0.0;
            self.pos_y[i] = 0.0;
            self.pos_z[i] = 0.0;
            self.pinned[i] = false;
        }

        self.topology.remove_node(index);
        debug!("removed {id}");
        true
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.topology.node_count()
    }

    /// Snapshot of all node ids, insertion order.
    ///
    /// Ids are monotonic, so ascending id is insertion order. Raw slot
    /// order is not: StableGraph reuses vacated slots, so after a removal
    /// a newer node can occupy an older index.
    pub fn nodes(&self) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self
            .topology
            .node_indices()
            .map(|i| self.topology[i])
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Borrow a node's value.
    pub fn value(&self, id: NodeId) -> Option<&N> {
        let index = self.node_index.get(&id)?;
        self.values.get(index.index())?.as_ref()
    }

    /// Mutably borrow a node's value.
    pub fn value_mut(&mut self, id: NodeId) -> Option<&mut N> {
        let index = self.node_index.get(&id)?;
        self.values.get_mut(index.index())?.as_mut()
    }

    /// A node's current position.
    pub fn position(&self, id: NodeId) -> Option<Vec3> {
        self.node_index.get(&id).map(|&index| {
            let i = index.index();
            Vec3::new(self.pos_x[i], self.pos_y[i], self.pos_z[i])
        })
    }

    /// Overwrite a node's position. No-op for unknown ids.
    ///
    /// Mutation path for the layout engine and for external overrides such
    /// as drag-to-place.
    pub fn set_position(&mut self, id: NodeId, position: Vec3) {
        if let Some(&index) = self.node_index.get(&id) {
            let i = index.index();
            self.pos_x[i] = position.x;
            self.pos_y[i] = position.y;
            self.pos_z[i] = position.z;
        }
    }

    /// Snapshot of all `(id, position)` pairs, insertion order.
    pub fn positions(&self) -> Vec<(NodeId, Vec3)> {
        let mut out: Vec<(NodeId, Vec3)> = self
            .topology
            .node_indices()
            .map(|index| {
                let i = index.index();
                (
                    self.topology[index],
                    Vec3::new(self.pos_x[i], self.pos_y[i], self.pos_z[i]),
                )
            })
            .collect();
        out.sort_unstable_by_key(|&(id, _)| id);
        out
    }

    /// Pin a node in place; the layout engine will not move it.
    pub fn pin_node(&mut self, id: NodeId) {
        if let Some(&index) = self.node_index.get(&id) {
            self.pinned[index.index()] = true;
        }
    }

    /// Release a pinned node back to the simulation.
    pub fn unpin_node(&mut self, id: NodeId) {
        if let Some(&index) = self.node_index.get(&id) {
            self.pinned[index.index()] = false;
        }
    }

    /// Check if a node is pinned.
    pub fn is_node_pinned(&self, id: NodeId) -> bool {
        self.node_index
            .get(&id)
            .map(|&index| self.pinned[index.index()])
            .unwrap_or(false)
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add an edge between two nodes, carrying no value.
    ///
    /// Idempotent: if an equal edge exists (same ordered pair when directed,
    /// either order when undirected) its id is returned and nothing is
    /// inserted. `None` only when an endpoint is not in the graph.
    pub fn add_edge(&mut self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        self.insert_edge(a, b, None)
    }

    /// Add an edge carrying a value.
    ///
    /// Same idempotence as [`Graph::add_edge`]; a pre-existing equal edge is
    /// returned with its original value intact.
    pub fn add_edge_with_value(&mut self, a: NodeId, b: NodeId, value: E) -> Option<EdgeId> {
        self.insert_edge(a, b, Some(value))
    }

    fn insert_edge(&mut self, a: NodeId, b: NodeId, value: Option<E>) -> Option<EdgeId> {
        let &ai = self.node_index.get(&a)?;
        let &bi = self.node_index.get(&b)?;

        if let Some(existing) = self.find_edge_between(ai, bi) {
            return self.edge_ids.get(&existing).copied();
        }
        Some(self.attach_edge(ai, bi, value))
    }

    fn attach_edge(&mut self, ai: NodeIndex, bi: NodeIndex, value: Option<E>) -> EdgeId {
        let id = self.ids.fresh_edge();
        let index = self.topology.add_edge(ai, bi, value);
        self.edge_index.insert(id, index);
        self.edge_ids.insert(index, id);
        trace!("added {id}");
        id
    }

    fn find_edge_between(&self, ai: NodeIndex, bi: NodeIndex) -> Option<EdgeIndex> {
        self.topology.find_edge(ai, bi).or_else(|| {
            if self.directed {
                None
            } else {
                self.topology.find_edge(bi, ai)
            }
        })
    }

    /// Remove an edge by id.
    pub fn remove_edge(&mut self, id: EdgeId) -> bool {
        if let Some(index) = self.edge_index.remove(&id) {
            self.edge_ids.remove(&index);
            self.topology.remove_edge(index);
            true
        } else {
            false
        }
    }

    /// Remove the edge between two nodes, honoring the graph's directedness.
    ///
    /// The arena rendition of dropping one adjacency relation. Returns true
    /// if such an edge existed.
    pub fn remove_edge_between(&mut self, a: NodeId, b: NodeId) -> bool {
        let (Some(&ai), Some(&bi)) = (self.node_index.get(&a), self.node_index.get(&b)) else {
            return false;
        };
        let Some(index) = self.find_edge_between(ai, bi) else {
            return false;
        };
        if let Some(edge_id) = self.edge_ids.remove(&index) {
            self.edge_index.remove(&edge_id);
        }
        self.topology.remove_edge(index);
        true
    }

    /// Number of live edges.
    pub fn edge_count(&self) -> usize {
        self.topology.edge_count()
    }

    /// Snapshot of all edge ids, insertion order.
    ///
    /// Sorted ascending for the same slot-reuse reason as [`Graph::nodes`].
    pub fn edges(&self) -> Vec<EdgeId> {
        let mut ids: Vec<EdgeId> = self
            .topology
            .edge_indices()
            .filter_map(|i| self.edge_ids.get(&i).copied())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// An edge's endpoints as stored (first, second).
    pub fn endpoints(&self, id: EdgeId) -> Option<(NodeId, NodeId)> {
        let &index = self.edge_index.get(&id)?;
        let (a, b) = self.topology.edge_endpoints(index)?;
        Some((self.topology[a], self.topology[b]))
    }

    /// Borrow an edge's value, if it carries one.
    pub fn edge_value(&self, id: EdgeId) -> Option<&E> {
        let &index = self.edge_index.get(&id)?;
        self.topology.edge_weight(index)?.as_ref()
    }

    /// Adjacent node ids.
    ///
    /// For a directed graph this follows edges outward only; for an
    /// undirected graph both endpoints see each other. Set semantics: each
    /// neighbor appears once, a self-loop contributes the node itself once.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&index) = self.node_index.get(&id) else {
            return Vec::new();
        };

        let adjacent: Vec<NodeIndex> = if self.directed {
            self.topology.neighbors(index).collect()
        } else {
            self.topology.neighbors_undirected(index).collect()
        };

        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for idx in adjacent {
            let nid = self.topology[idx];
            if seen.insert(nid) {
                out.push(nid);
            }
        }
        out
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Rebuild the spatial index from current positions.
    ///
    /// Queries answer from the last rebuild; call this after a relaxation
    /// step or bulk position change before picking.
    pub fn rebuild_spatial_index(&mut self) {
        let points: Vec<_> = self
            .node_index
            .iter()
            .map(|(&id, &index)| {
                let i = index.index();
                (id, Vec3::new(self.pos_x[i], self.pos_y[i], self.pos_z[i]))
            })
            .collect();
        self.spatial.rebuild(&points);
    }

    /// Nearest live node to a point, from the last index rebuild.
    ///
    /// Nodes removed since that rebuild are still indexed at their old
    /// positions; they are skipped here so the caller never receives a
    /// dead id.
    pub fn find_nearest_node(&self, point: Vec3) -> Option<NodeId> {
        self.spatial
            .nearest_iter(point)
            .map(|(id, _)| id)
            .find(|id| self.node_index.contains_key(id))
    }

    /// Nearest live node within `max_distance` of a point.
    pub fn find_nearest_node_within(&self, point: Vec3, max_distance: f64) -> Option<NodeId> {
        self.spatial
            .nearest_iter(point)
            .take_while(|&(_, d2)| d2 <= max_distance * max_distance)
            .map(|(id, _)| id)
            .find(|id| self.node_index.contains_key(id))
    }

    /// All live nodes within `radius` of a point.
    pub fn find_nodes_in_radius(&self, point: Vec3, radius: f64) -> Vec<NodeId> {
        self.spatial
            .in_radius(point, radius)
            .into_iter()
            .filter(|id| self.node_index.contains_key(id))
            .collect()
    }

    // =========================================================================
    // Utilities
    // =========================================================================

    /// Axis-aligned bounding box of live node positions.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        if self.topology.node_count() == 0 {
            return None;
        }

        let mut min = Vec3::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        let mut max = Vec3::new(f64::NEG_INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY);

        for index in self.topology.node_indices() {
            let i = index.index();
            min.x = min.x.min(self.pos_x[i]);
            min.y = min.y.min(self.pos_y[i]);
            min.z = min.z.min(self.pos_z[i]);
            max.x = max.x.max(self.pos_x[i]);
            max.y = max.y.max(self.pos_y[i]);
            max.z = max.z.max(self.pos_z[i]);
        }

        Some((min, max))
    }

    /// Remove everything and restart id numbering.
    pub fn clear(&mut self) {
        self.topology.clear();
        self.node_index.clear();
        self.edge_index.clear();
        self.edge_ids.clear();
        self.ids.reset();
        self.values.clear();
        self.pos_x.clear();
        self.pos_y.clear();
        self.pos_z.clear();
        self.pinned.clear();
        self.spatial.clear();
    }

    /// Grow the side arrays to cover slot `i`. StableGraph reuses vacated
    /// slots, so `i` may also land inside the current range.
    fn ensure_slot(&mut self, i: usize) {
        if i >= self.pos_x.len() {
            let n = i + 1;
            self.values.resize_with(n, || None);
            self.pos_x.resize(n, 0.0);
            self.pos_y.resize(n, 0.0);
            self.pos_z.resize(n, 0.0);
            self.pinned.resize(n, false);
        }
    }
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self::new_undirected()
    }
}
