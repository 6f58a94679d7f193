//! Stable identifiers for nodes and edges.
//!
//! Ids are allocated by an [`IdAllocator`] owned by the graph, never by
//! process-wide state, so independent graphs number their entities
//! independently. An id is never reused while its allocator lives, even
//! after the entity it names is removed.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable node identifier.
///
/// Remains valid across unrelated insertions and removals. Two nodes are
/// equal exactly when their ids are equal, regardless of value or position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u32);

/// Stable edge identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub u32);

impl NodeId {
    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl EdgeId {
    /// Get the raw u32 value.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Edge({})", self.0)
    }
}

/// Monotonic id source for one graph.
///
/// Reset only via [`IdAllocator::reset`], which the graph calls when it is
/// cleared wholesale; removals never return ids to the pool.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    next_node: u32,
    next_edge: u32,
}

impl IdAllocator {
    /// Create an allocator starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next node id.
    pub fn fresh_node(&mut self) -> NodeId {
        let id = NodeId(self.next_node);
        self.next_node += 1;
        id
    }

    /// Allocate the next edge id.
    pub fn fresh_edge(&mut self) -> EdgeId {
        let id = EdgeId(self.next_edge);
        self.next_edge += 1;
        id
    }

    /// Restart numbering from zero.
    pub fn reset(&mut self) {
        self.next_node = 0;
        self.next_edge = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_strictly_increasing() {
        let mut alloc = IdAllocator::new();
        let ids: Vec<_> = (0..8).map(|_| alloc.fresh_node()).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_node_and_edge_ids_independent() {
        let mut alloc = IdAllocator::new();
        let n = alloc.fresh_node();
        let e = alloc.fresh_edge();
        assert_eq!(n.raw(), 0);
        assert_eq!(e.raw(), 0);
    }

    #[test]
    fn test_reset_restarts_numbering() {
        let mut alloc = IdAllocator::new();
        alloc.fresh_node();
        alloc.fresh_node();
        alloc.fresh_edge();
        alloc.reset();
        assert_eq!(alloc.fresh_node(), NodeId(0));
        assert_eq!(alloc.fresh_edge(), EdgeId(0));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", NodeId(42)), "Node(42)");
        assert_eq!(format!("{}", EdgeId(7)), "Edge(7)");
    }
}
