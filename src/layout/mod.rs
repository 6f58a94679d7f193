//! Force-directed layout for graph visualization.
//!
//! This module provides the iterative relaxation engine that computes 3D
//! node positions: mutual repulsion between all node pairs, spring-like
//! attraction along edges, run once per display frame so the layout
//! animates toward equilibrium.

mod expanding;

pub use expanding::{ExpandingLayout, LayoutConfig};
