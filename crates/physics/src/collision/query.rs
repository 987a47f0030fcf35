//! The collision contract consumed by the movement controller.

use glam::Vec3;

use super::trace::{Capsule, GroundProbe, OverlapResult, TraceResult};

/// Geometric queries the movement controller needs from the world.
///
/// Any geometry provider can implement this: the triangle-mesh
/// [`CollisionWorld`](super::CollisionWorld), a precomputed index or a
/// synthetic test world. The controller never sees how geometry is stored.
pub trait CollisionQuery {
    /// Sweep the capsule straight down by `probe_distance`.
    ///
    /// Returns `None` when nothing is within reach.
    fn query_ground(
        &self,
        feet: Vec3,
        capsule: Capsule,
        probe_distance: f32,
    ) -> Option<GroundProbe>;

    /// Sweep the capsule from `start` to `end` (both feet positions).
    fn trace_capsule(&self, start: Vec3, end: Vec3, capsule: Capsule) -> TraceResult;

    /// Push a stationary capsule out of any geometry it overlaps.
    fn resolve_capsule_position(&self, feet: Vec3, capsule: Capsule) -> OverlapResult;
}
