//! Surfmove Physics Engine
//!
//! A deterministic kinematic movement core reproducing Source-style
//! first-person locomotion: ground movement, air strafing, bunnyhopping and
//! ramp surfing against static triangle geometry.
//!
//! # Architecture
//!
//! The engine is split into three parts:
//!
//! - **Math**: Pure vector kinematics (acceleration, friction, clipping)
//! - **Collision**: Sweeps a capsule through a triangle mesh indexed by a BVH
//! - **Movement**: Uses collision queries to run the per-tick movement protocol
//!
//! Everything runs single-threaded on a fixed time step supplied by the
//! caller. Geometry may only be replaced between ticks.

pub mod collision;
pub mod math;
pub mod movement;

// Re-export commonly used types
pub use collision::{
    Capsule, CollisionError, CollisionQuery, CollisionWorld, GroundProbe, OverlapResult, SurfRamp,
    TraceResult, Triangle, TriangleSoup,
};
pub use movement::{
    CommandButtons, CvarError, CvarValue, MovementConfig, MovementDebug, MovementMode,
    MovementState, PlayerCommand, PlayerController, StrafeHint,
};
