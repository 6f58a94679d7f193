//! 3D vector helpers for the layout engine.
//!
//! This module provides the small amount of linear algebra the force
//! simulation needs: Euclidean length, safe normalization, and rotation
//! about a principal axis.

mod vec3;

pub use vec3::{rotate_about_axis, Axis, Vec3};
