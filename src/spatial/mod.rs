//! Spatial indexing for O(log n) node picking.
//!
//! This module provides an R-tree based spatial index for efficient
//! nearest-neighbor and radius queries over node positions in 3D.

mod rtree;

pub use rtree::SpatialIndex;
