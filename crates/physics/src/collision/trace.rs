//! Query results and the capsule shape used for collision queries.

use glam::Vec3;
use parry3d::bounding_volume::Aabb;
use serde::{Deserialize, Serialize};

use super::geometry::{aabb_from, to_point};

/// A vertical capsule anchored at the feet.
///
/// Modeled as the segment from `feet + radius` to `feet + height - radius`
/// inflated by `radius`, so the lowest point of the shape is the feet
/// position itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Capsule {
    /// Radius of the cylinder and end caps.
    pub radius: f32,
    /// Total height from the bottom of the lower cap to the top of the upper cap.
    pub height: f32,
}

impl Capsule {
    /// Standing player capsule.
    pub const PLAYER: Self = Self {
        radius: 0.4,  // 40cm radius
        height: 1.8,  // 180cm tall
    };

    pub const fn new(radius: f32, height: f32) -> Self {
        Self { radius, height }
    }

    /// Inner segment endpoints (bottom, top) for a capsule standing at `feet`.
    pub fn segment(&self, feet: Vec3) -> (Vec3, Vec3) {
        let bottom = feet + Vec3::Y * self.radius;
        let top = feet + Vec3::Y * (self.height - self.radius).max(self.radius);
        (bottom, top)
    }

    /// The capsule standing at `feet` as a parry3d shape in world space.
    pub fn to_shape(&self, feet: Vec3) -> parry3d::shape::Capsule {
        let (bottom, top) = self.segment(feet);
        parry3d::shape::Capsule::new(to_point(bottom), to_point(top), self.radius)
    }

    /// Bounds of the capsule at `feet`, grown by `margin` on every side.
    pub fn bounds(&self, feet: Vec3, margin: f32) -> Aabb {
        let (bottom, top) = self.segment(feet);
        let grow = Vec3::splat(self.radius + margin);
        aabb_from(bottom.min(top) - grow, bottom.max(top) + grow)
    }
}

impl Default for Capsule {
    fn default() -> Self {
        Self::PLAYER
    }
}

/// Result of a swept capsule trace.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TraceResult {
    /// Whether anything was hit along the path.
    pub hit: bool,

    /// How far along the path the capsule got before the impact.
    ///
    /// - `1.0` = traveled the full distance (no collision)
    /// - `0.0` = touching at the start
    pub fraction: f32,

    /// Surface normal at the impact, world up when nothing better is known.
    pub normal: Vec3,

    /// Resolved feet position: the safe position just before impact on a
    /// hit, otherwise the end of the path.
    pub end_position: Vec3,
}

impl TraceResult {
    /// Create a trace result indicating no collision occurred.
    pub fn no_hit(end_position: Vec3) -> Self {
        Self {
            hit: false,
            fraction: 1.0,
            normal: Vec3::Y,
            end_position,
        }
    }

    /// Create a trace result indicating a collision occurred.
    pub fn hit(fraction: f32, end_position: Vec3, normal: Vec3) -> Self {
        Self {
            hit: true,
            fraction,
            normal,
            end_position,
        }
    }
}

/// Short downward sweep under the feet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroundProbe {
    /// Distance travelled down before touching the surface.
    pub distance: f32,
    /// Feet position resting on the surface.
    pub position: Vec3,
    /// Surface normal.
    pub normal: Vec3,
    /// Angle between `normal` and world up, in degrees.
    pub slope_angle_deg: f32,
}

/// Result of a stationary penetration query.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlapResult {
    pub collided: bool,
    /// Deepest penetration found at the original position.
    pub depth: f32,
    /// Combined push-out direction; world up when not collided.
    pub normal: Vec3,
    /// Corrected feet position.
    pub position: Vec3,
}

impl OverlapResult {
    pub fn clear(position: Vec3) -> Self {
        Self {
            collided: false,
            depth: 0.0,
            normal: Vec3::Y,
            position,
        }
    }
}
