//! The expanding-graph relaxation engine.
//!
//! Two phases: **placement** scatters every node uniformly at random inside
//! a cube around the viewing-volume center, then each **relaxation** step
//! nudges every node by the sum of two forces:
//!
//! - repulsion `rejection_factor^2 / d` away from every other node, and
//! - attraction `sqrt(d)` toward each adjacent node.
//!
//! Both laws meet at an equilibrium spacing of `rejection_factor^(4/3)` for
//! a connected pair, so the layout settles instead of collapsing or flying
//! apart. A step computes all movement deltas from one snapshot of the old
//! positions and only then applies them; for directed graphs the reverse
//! pull on the edge target is accumulated the same deferred way, so node
//! iteration order never changes the result.

use std::collections::HashMap;

use log::{debug, trace};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::Graph;
use crate::math::{rotate_about_axis, Axis, Vec3};

/// Tuning for [`ExpandingLayout`].
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LayoutConfig {
    /// Width of the viewing volume.
    pub width: f64,
    /// Height of the viewing volume.
    pub height: f64,
    /// Depth of the viewing volume; `None` means use `width`.
    pub depth: Option<f64>,
    /// Half-extent of the random placement cube around the volume center
    /// (default: 100.0).
    pub scatter_half_extent: f64,
    /// Initial repulsion strength (default: 50.0).
    pub rejection_factor: f64,
}

impl LayoutConfig {
    /// Config for a viewing volume of the given width and height, depth
    /// defaulting to the width.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    /// Center of the viewing volume; placement and rotation both pivot here.
    pub fn center(&self) -> Vec3 {
        Vec3::new(
            self.width / 2.0,
            self.height / 2.0,
            self.depth.unwrap_or(self.width) / 2.0,
        )
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 700.0,
            height: 700.0,
            depth: None,
            scatter_half_extent: 100.0,
            rejection_factor: 50.0,
        }
    }
}

/// The force-directed layout engine.
///
/// Never owns the graph it lays out; construction places the graph's current
/// nodes, and each [`ExpandingLayout::update`] call reads and rewrites node
/// positions through the graph's public surface. The engine itself carries
/// only tuning state and the RNG.
pub struct ExpandingLayout {
    config: LayoutConfig,
    rejection_factor: f64,
    rng: StdRng,
}

impl ExpandingLayout {
    /// Create an engine and place the graph's nodes, seeding the RNG from
    /// system entropy.
    pub fn new<N, E>(graph: &mut Graph<N, E>, config: LayoutConfig) -> Self {
        Self::with_rng(graph, config, StdRng::from_entropy())
    }

    /// Create an engine with a fixed RNG seed for reproducible placement.
    pub fn with_seed<N, E>(graph: &mut Graph<N, E>, config: LayoutConfig, seed: u64) -> Self {
        Self::with_rng(graph, config, StdRng::seed_from_u64(seed))
    }

    fn with_rng<N, E>(graph: &mut Graph<N, E>, config: LayoutConfig, rng: StdRng) -> Self {
        let mut layout = Self {
            rejection_factor: config.rejection_factor,
            config,
            rng,
        };
        layout.place(graph);
        layout
    }

    /// The engine's configuration.
    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Current repulsion strength.
    pub fn rejection_factor(&self) -> f64 {
        self.rejection_factor
    }

    /// Additively tune the repulsion strength, clamped at zero.
    ///
    /// A negative factor would invert separation and a zero factor nullifies
    /// it; the clamp keeps wheel-scroll drivers from pushing the simulation
    /// into either regime.
    pub fn adjust_rejection_factor(&mut self, delta: f64) {
        self.rejection_factor = (self.rejection_factor + delta).max(0.0);
        trace!("rejection factor now {}", self.rejection_factor);
    }

    /// Scatter every node uniformly at random inside the placement cube.
    ///
    /// Runs at construction; callable again to restart relaxation from a
    /// fresh seed state. A zero-node graph is left untouched.
    pub fn place<N, E>(&mut self, graph: &mut Graph<N, E>) {
        let nodes = graph.nodes();
        if nodes.is_empty() {
            return;
        }

        let center = self.config.center();
        let h = self.config.scatter_half_extent;
        for id in &nodes {
            let offset = Vec3::new(
                self.rng.gen_range(-h..=h),
                self.rng.gen_range(-h..=h),
                self.rng.gen_range(-h..=h),
            );
            graph.set_position(*id, center + offset);
        }
        debug!("placed {} nodes around {center}", nodes.len());
    }

    /// One relaxation step.
    ///
    /// All deltas are computed from a snapshot of the old positions, then
    /// applied at once. Coincident pairs have no defined direction and are
    /// skipped; pinned nodes accumulate forces on others but do not move.
    pub fn update<N, E>(&mut self, graph: &mut Graph<N, E>) {
        let nodes = graph.nodes();
        if nodes.is_empty() {
            return;
        }

        let positions: Vec<Vec3> = nodes
            .iter()
            .map(|&id| graph.position(id).unwrap_or_default())
            .collect();
        let slot: HashMap<_, _> = nodes.iter().enumerate().map(|(i, &id)| (id, i)).collect();

        let mut deltas = vec![Vec3::ZERO; nodes.len()];
        let rejection_sq = self.rejection_factor * self.rejection_factor;

        for (i, &id) in nodes.iter().enumerate() {
            let pos = positions[i];

            // repulsion from every other node
            for (j, &other) in positions.iter().enumerate() {
                if i == j {
                    continue;
                }
                let away = pos - other;
                let d = away.length();
                let Some(dir) = away.normalized() else {
                    continue;
                };
                deltas[i] += dir * (rejection_sq / d);
            }

            // attraction along adjacency
            for neighbor in graph.neighbors(id) {
                let Some(&j) = slot.get(&neighbor) else {
                    continue;
                };
                if j == i {
                    continue;
                }
                let toward = positions[j] - pos;
                let d = toward.length();
                let Some(dir) = toward.normalized() else {
                    continue;
                };
                let pull = dir * d.sqrt();
                deltas[i] += pull;
                if graph.is_directed() {
                    // adjacency is one-way here, so the symmetric pull on
                    // the target is accumulated explicitly
                    deltas[j] -= pull;
                }
            }
        }

        for (i, &id) in nodes.iter().enumerate() {
            if graph.is_node_pinned(id) {
                continue;
            }
            graph.set_position(id, positions[i] + deltas[i]);
        }
    }

    /// Rotate the whole layout about an axis through the volume center.
    ///
    /// A pure view transform: pairwise distances are preserved, so the next
    /// relaxation step sees the same forces.
    pub fn turn_around_axis<N, E>(&self, graph: &mut Graph<N, E>, axis: Axis, angle: f64) {
        let center = self.config.center();
        for (id, pos) in graph.positions() {
            graph.set_position(id, center + rotate_about_axis(pos - center, axis, angle));
        }
    }
}
