//! Graph data structures and operations.
//!
//! This module provides the core graph store using petgraph's StableGraph
//! for stable node/edge ids, with Structure of Arrays (SoA) layout for
//! positions to give the relaxation loop cache-friendly access.

mod ids;
mod store;

pub use ids::{EdgeId, IdAllocator, NodeId};
pub use store::Graph;
