//! Per-tick observable snapshot for HUD and diagnostics.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::MovementMode;
use crate::math::{horizontal, VECTOR_EPSILON};

/// Which strafe key keeps the actor pressed into the ramp.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrafeHint {
    #[default]
    None,
    Left,
    Right,
}

impl StrafeHint {
    /// Hint for a surfing actor: the side of its heading the ramp lies on.
    pub fn for_surf(velocity: Vec3, surf_normal: Vec3) -> Self {
        let heading = horizontal(velocity);
        let into_ramp = -horizontal(surf_normal);
        if heading.length_squared() < VECTOR_EPSILON
            || into_ramp.length_squared() < VECTOR_EPSILON
        {
            return Self::None;
        }

        let heading = heading.normalize();
        let right_of_heading = Vec3::new(-heading.z, 0.0, heading.x);
        let side = right_of_heading.dot(into_ramp.normalize());
        if side > 0.05 {
            Self::Right
        } else if side < -0.05 {
            Self::Left
        } else {
            Self::None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "-",
            Self::Left => "A",
            Self::Right => "D",
        }
    }
}

/// Snapshot published after every tick. Overwritten wholesale each tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovementDebug {
    /// Horizontal speed (m/s).
    pub speed: f32,
    pub vertical_speed: f32,
    /// Final mode of the tick.
    pub mode: MovementMode,
    pub surfing: bool,
    /// Slope under the actor after the move, if any surface is in reach.
    pub slope_angle_deg: Option<f32>,
    pub wish_dir: Vec3,
    pub wish_speed: f32,
    /// Surface the actor ended the tick on (ramp or ground).
    pub surface_normal: Option<Vec3>,
    pub contact_point: Option<Vec3>,
    pub friction_applied: bool,

    /// Speed entering the sliding collision loop.
    pub collision_speed_before: f32,
    /// Speed after collision handling and recovery.
    pub collision_speed_after: f32,
    /// More than half the speed was lost in collision this tick.
    pub speed_drop_warning: bool,

    pub last_collision_normal: Option<Vec3>,
    /// Angle of `last_collision_normal` from world up (degrees).
    pub last_collision_angle_deg: Option<f32>,

    pub strafe_hint: StrafeHint,
    pub surf_grace_ticks: u32,
    pub jumped: bool,
    pub edge_recovery: bool,
    pub edge_clip: bool,
}
