//! Movement state and input structures.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use super::jump::JumpState;
use crate::math::horizontal;

/// Camera eye height above the feet (meters).
pub const EYE_HEIGHT: f32 = 1.6;

/// Movement mode, derived every tick from the ground probe and surf memory.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementMode {
    Ground,
    #[default]
    Air,
    Surf,
}

impl MovementMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ground => "ground",
            Self::Air => "air",
            Self::Surf => "surf",
        }
    }
}

/// Short-lived memory of the last real ramp contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfMemory {
    /// Normal of the last surf contact.
    pub normal: Vec3,
    /// Ticks left before the memory expires.
    pub grace_ticks: u32,
}

impl Default for SurfMemory {
    fn default() -> Self {
        Self {
            normal: Vec3::Y,
            grace_ticks: 0,
        }
    }
}

impl SurfMemory {
    #[inline]
    pub fn active(&self) -> bool {
        self.grace_ticks > 0
    }
}

/// Kinematic state of one actor.
///
/// Owned by the caller and mutated only by
/// [`PlayerController::update`](super::PlayerController::update).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementState {
    /// Position in world space (feet/bottom of collision shape).
    pub position: Vec3,

    /// Velocity in world space (meters/second).
    pub velocity: Vec3,

    /// Yaw in radians, wrapped to (-PI, PI].
    pub yaw: f32,

    /// Pitch in radians, positive looks down.
    pub pitch: f32,

    /// Surf contact memory.
    pub surf: SurfMemory,

    /// Jump input edge detection.
    pub jump: JumpState,
}

impl Default for MovementState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            yaw: 0.0,
            pitch: 0.0,
            surf: SurfMemory::default(),
            jump: JumpState::default(),
        }
    }
}

impl MovementState {
    /// Create a new movement state at the given position.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_yaw(mut self, yaw: f32) -> Self {
        self.yaw = yaw;
        self
    }

    /// Get the eye position (for camera placement).
    pub fn eye_position(&self) -> Vec3 {
        self.position + Vec3::Y * EYE_HEIGHT
    }

    /// Get the forward direction from yaw (horizontal only).
    pub fn forward(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(cos_yaw, 0.0, sin_yaw)
    }

    /// Get the right direction from yaw (horizontal only).
    pub fn right(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        Vec3::new(-sin_yaw, 0.0, cos_yaw)
    }

    /// Get the full forward direction including pitch.
    pub fn look_direction(&self) -> Vec3 {
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();

        Vec3::new(cos_pitch * cos_yaw, -sin_pitch, cos_pitch * sin_yaw)
    }

    /// Get current horizontal speed.
    pub fn horizontal_speed(&self) -> f32 {
        horizontal(self.velocity).length()
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Input command from the player for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerCommand {
    /// Forward/backward movement (-1.0 to 1.0).
    /// Positive = forward, negative = backward.
    pub forward_move: f32,

    /// Strafe left/right (-1.0 to 1.0).
    /// Positive = right, negative = left.
    pub side_move: f32,

    /// Accumulated look delta since the last tick (radians).
    /// (yaw_delta, pitch_delta)
    pub look_delta: Vec2,

    /// Button states.
    pub buttons: CommandButtons,
}

impl PlayerCommand {
    pub fn new(forward_move: f32, side_move: f32) -> Self {
        Self {
            forward_move,
            side_move,
            ..Default::default()
        }
    }

    pub fn with_look_delta(mut self, yaw_delta: f32, pitch_delta: f32) -> Self {
        self.look_delta = Vec2::new(yaw_delta, pitch_delta);
        self
    }

    pub fn with_jump(mut self, held: bool) -> Self {
        if held {
            self.buttons.press(CommandButtons::JUMP);
        } else {
            self.buttons.release(CommandButtons::JUMP);
        }
        self
    }

    /// Check if jump is held.
    #[inline]
    pub fn wants_jump(&self) -> bool {
        self.buttons.pressed(CommandButtons::JUMP)
    }

    /// Check if any movement input is active.
    #[inline]
    pub fn has_movement_input(&self) -> bool {
        self.forward_move.abs() > 0.01 || self.side_move.abs() > 0.01
    }
}

/// Button state flags for player commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandButtons(pub u16);

impl CommandButtons {
    /// Jump button.
    pub const JUMP: u16 = 1 << 0;

    /// Check if a button is pressed.
    #[inline]
    pub fn pressed(self, button: u16) -> bool {
        (self.0 & button) != 0
    }

    /// Press a button.
    #[inline]
    pub fn press(&mut self, button: u16) {
        self.0 |= button;
    }

    /// Release a button.
    #[inline]
    pub fn release(&mut self, button: u16) {
        self.0 &= !button;
    }
}
