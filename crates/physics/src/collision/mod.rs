//! Collision detection against static triangle geometry.
//!
//! The actor is a vertical capsule; the world is a merged triangle mesh with
//! a broad-phase index on top. Three queries are answered:
//!
//! - **Ground probe**: a short downward sweep reporting the surface below
//! - **Capsule trace**: a swept query along a straight segment
//! - **Overlap resolution**: pushes a stationary capsule out of geometry
//!
//! # Key Types
//!
//! - [`CollisionWorld`]: The triangle mesh plus its spatial index
//! - [`CollisionQuery`]: The contract the movement controller consumes
//! - [`TriangleSoup`]: Builder for collision meshes
//! - [`TraceResult`], [`GroundProbe`], [`OverlapResult`]: Query outputs
//!
//! # Tracing Algorithm
//!
//! Sweeps sample the path at a fixed number of coarse steps, then bisect
//! between the last clear and the first colliding sample. Step counts are
//! fixed so every query costs a bounded amount of work.

mod geometry;
mod index;
mod query;
mod trace;
mod world;

pub use geometry::{SurfRamp, Triangle, TriangleSoup};
pub use index::{BvhIndex, LinearIndex, TriangleIndex};
pub use query::CollisionQuery;
pub use trace::{Capsule, GroundProbe, OverlapResult, TraceResult};
pub use world::{
    CollisionError, CollisionWorld, BISECTION_STEPS, COARSE_TRACE_STEPS, OVERLAP_PASSES, TRACE_SKIN,
};
