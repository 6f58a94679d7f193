//! Expanding Graph
//!
//! A self-expanding graph: a stable-id graph store paired with a
//! force-directed layout engine that computes 3D node positions for an
//! external renderer. Connected nodes cluster, unconnected nodes separate,
//! and repeated relaxation steps settle the structure into a visually
//! stable layout that the renderer can orbit.
//!
//! # Architecture
//!
//! - `graph`: graph store (nodes, edges, adjacency, positions) on
//!   petgraph's StableGraph
//! - `layout`: the expanding relaxation engine (placement, per-frame
//!   update, rotation, force tuning)
//! - `math`: 3D vector helpers
//! - `spatial`: R-tree spatial indexing for nearest-node picking
//!
//! # Example
//!
//! ```
//! use expanding_graph::{ExpandingLayout, Graph, LayoutConfig};
//!
//! let mut graph: Graph<&str> = Graph::new_undirected();
//! let a = graph.add_node("a");
//! let b = graph.add_node_connected("b", &[a]);
//! let _c = graph.add_node_connected("c", &[a, b]);
//!
//! let mut layout = ExpandingLayout::new(&mut graph, LayoutConfig::new(700.0, 700.0));
//! for _ in 0..100 {
//!     layout.update(&mut graph);
//! }
//! // the renderer now reads graph.position(id) / graph.neighbors(id)
//! ```

pub mod graph;
pub mod layout;
pub mod math;
pub mod spatial;

pub use graph::{EdgeId, Graph, NodeId};
pub use layout::{ExpandingLayout, LayoutConfig};
pub use math::{rotate_about_axis, Axis, Vec3};
pub use spatial::SpatialIndex;

#[cfg(test)]
mod integration_tests {
    use super::*;

    /// The classic driver scenario: A, B adjacent to A, C adjacent to B,
    /// D adjacent to A and C. Four edges total (A-B, B-C, D-A, D-C) and A
    /// ends up adjacent to B and D.
    #[test]
    fn test_build_small_undirected_graph() {
        let mut graph: Graph<&str> = Graph::new_undirected();
        let a = graph.add_node("green");
        let b = graph.add_node_connected("blue", &[a]);
        let c = graph.add_node_connected("yellow", &[b]);
        let d = graph.add_node_connected("cyan", &[a, c]);

        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 4);

        let mut adj_a = graph.neighbors(a);
        adj_a.sort();
        assert_eq!(adj_a, vec![b, d]);

        let mut adj_c = graph.neighbors(c);
        adj_c.sort();
        assert_eq!(adj_c, vec![b, d]);

        let endpoints: Vec<_> = graph
            .edges()
            .iter()
            .filter_map(|&e| graph.endpoints(e))
            .collect();
        assert_eq!(endpoints, vec![(b, a), (c, b), (d, a), (d, c)]);
    }

    /// Drive the whole pipeline the way a rendering loop would: populate,
    /// place, relax, read back positions each frame.
    #[test]
    fn test_layout_separates_clusters() {
        let mut graph: Graph<u32> = Graph::new_undirected();

        // two triangles joined by nothing
        let a0 = graph.add_node(0);
        let a1 = graph.add_node_connected(1, &[a0]);
        let _a2 = graph.add_node_connected(2, &[a0, a1]);
        let b0 = graph.add_node(10);
        let b1 = graph.add_node_connected(11, &[b0]);
        let _b2 = graph.add_node_connected(12, &[b0, b1]);

        let mut layout = ExpandingLayout::with_seed(&mut graph, LayoutConfig::default(), 17);
        for _ in 0..500 {
            layout.update(&mut graph);
        }

        // a connected pair sits near the force equilibrium; the unconnected
        // pair is pushed well beyond it
        let eq = layout.rejection_factor().powf(4.0 / 3.0);
        let connected = (graph.position(a0).unwrap() - graph.position(a1).unwrap()).length();
        let separated = (graph.position(a0).unwrap() - graph.position(b0).unwrap()).length();
        assert!(connected < eq * 2.0, "connected pair at {connected}, eq {eq}");
        assert!(separated > connected, "clusters should separate");
    }

    #[test]
    fn test_mutation_between_updates() {
        let mut graph: Graph<u32> = Graph::new_undirected();
        let a = graph.add_node(0);
        let b = graph.add_node_connected(1, &[a]);
        let mut layout = ExpandingLayout::with_seed(&mut graph, LayoutConfig::default(), 23);

        for _ in 0..50 {
            layout.update(&mut graph);
        }

        // insert mid-flight at a chosen spot, as a click-to-insert driver does
        let c = graph.add_node_connected(2, &[a, b]);
        graph.set_position(c, layout.config().center());
        layout.update(&mut graph);
        assert!((graph.position(c).unwrap() - layout.config().center()).length() > 0.0);

        // and remove mid-flight
        assert!(graph.remove_node(b));
        for _ in 0..50 {
            layout.update(&mut graph);
        }
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.neighbors(a), vec![c]);
    }

    #[test]
    fn test_picking_after_relaxation() {
        let mut graph: Graph<&str> = Graph::new_undirected();
        let a = graph.add_node("a");
        let b = graph.add_node_connected("b", &[a]);
        let mut layout = ExpandingLayout::with_seed(&mut graph, LayoutConfig::default(), 31);

        for _ in 0..200 {
            layout.update(&mut graph);
        }
        graph.rebuild_spatial_index();

        let at_b = graph.position(b).unwrap();
        assert_eq!(graph.find_nearest_node(at_b), Some(b));
        assert_eq!(
            graph.find_nearest_node_within(at_b + Vec3::new(1.0, 0.0, 0.0), 5.0),
            Some(b)
        );
    }

    #[test]
    fn test_orbit_then_relax_keeps_structure() {
        let mut graph: Graph<()> = Graph::new_undirected();
        let a = graph.add_node(());
        let b = graph.add_node_connected((), &[a]);
        let mut layout = ExpandingLayout::with_seed(&mut graph, LayoutConfig::default(), 41);

        for _ in 0..1000 {
            layout.update(&mut graph);
        }
        let settled = (graph.position(a).unwrap() - graph.position(b).unwrap()).length();

        // orbiting is a pure view transform; the equilibrium survives it
        layout.turn_around_axis(&mut graph, Axis::Y, 1.0);
        layout.update(&mut graph);
        let after = (graph.position(a).unwrap() - graph.position(b).unwrap()).length();
        assert!((settled - after).abs() < 0.5);
    }
}
