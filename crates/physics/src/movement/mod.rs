//! Player movement physics.
//!
//! This module implements Source-style first-person movement with:
//!
//! - Ground acceleration and friction
//! - Air strafing and bunnyhopping
//! - Ramp surfing, including contact memory across ramp seams
//! - Multi-plane collision sliding
//!
//! # Design
//!
//! Movement is driven by the [`PlayerController`], which takes one
//! [`PlayerCommand`] per fixed tick and advances the actor's
//! [`MovementState`] through any [`CollisionQuery`](crate::collision::CollisionQuery)
//! implementation. Each tick classifies the actor as ground, air or surf
//! twice: once before moving and once after.
//!
//! All movement is deterministic: the same state, input, time step and
//! geometry always produce the same result.

mod classify;
mod config;
mod controller;
mod debug;
mod jump;
mod slide_move;
mod state;
mod surf;

pub use config::{
    CvarError, CvarValue, MovementConfig, CVAR_NAMES, EDGE_CLIP_MAX_UPWARD_SPEED,
    EDGE_CLIP_MIN_INTO, EDGE_CLIP_MIN_SPEED, EDGE_CLIP_PASSTHROUGH, EDGE_SURF_MIN_SLOPE_DEG,
    EDGE_SURF_MIN_SPEED, GROUND_PROBE_DISTANCE, GROUND_SNAP_DISTANCE, LAUNCH_MAX_VERTICAL_SPEED,
    LAUNCH_SPEED_FRACTION, LEAVE_SURFACE_SPEED, MAX_BUMPS, MAX_CLIP_PLANES, PITCH_LIMIT_DEG,
    RECOVERY_MIN_GAIN, RECOVERY_SPEED_CAP, RECOVERY_TRIGGER_RATIO, SEVERE_WALL_DROP_RATIO,
    SPEED_DROP_WARNING_RATIO, STALL_FRACTION, STALL_NUDGE, SURF_GRACE_HOLD_MIN, SURF_GRACE_TICKS,
    WALKABLE_ANGLE_CAP_DEG, WALKABLE_SURF_MARGIN_DEG, WALL_NORMAL_MAX_Y, WALL_SLIDE_MIN_SPEED,
};
pub use controller::PlayerController;
pub use debug::{MovementDebug, StrafeHint};
pub use jump::JumpState;
pub use state::{
    CommandButtons, MovementMode, MovementState, PlayerCommand, SurfMemory, EYE_HEIGHT,
};
