//! Synthetic worlds and scripted input for the headless driver.

use std::f32::consts::PI;

use anyhow::Result;
use clap::ValueEnum;
use glam::Vec3;
use surfmove_physics::{
    Capsule, CollisionWorld, MovementState, PlayerCommand, SurfRamp, TriangleSoup,
};

/// Which scripted run to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScenarioKind {
    /// Accelerate on flat ground, then chain jumps while strafing.
    Bhop,
    /// Ride a 55° ramp holding into it.
    Surf,
    /// Air-strafe from a standing start in the air.
    Strafe,
}

/// Ticks of plain forward acceleration before the bhop script starts hopping.
const BHOP_RUNUP_TICKS: u64 = 100;
/// Ticks between strafe direction swaps.
const STRAFE_SWAP_TICKS: u64 = 20;
/// Half width of the scenario floors (meters).
const FLOOR_HALF_EXTENT: f32 = 500.0;

/// Surf ramp used by the surf scenario.
pub const SURF_RAMP: SurfRamp = SurfRamp {
    start_x: 0.0,
    end_x: -200.0,
    base_y: 0.0,
    base_z: 0.0,
    height: 60.0,
    angle_deg: 55.0,
};

/// A world, a starting state and an input script.
#[derive(Debug)]
pub struct Scenario {
    pub kind: ScenarioKind,
    pub world: CollisionWorld,
    pub start: MovementState,
}

impl Scenario {
    pub fn build(kind: ScenarioKind, capsule: Capsule) -> Result<Self> {
        let (world, start) = match kind {
            ScenarioKind::Bhop => {
                let world: CollisionWorld =
                    CollisionWorld::from_soup(&TriangleSoup::flat_floor(FLOOR_HALF_EXTENT))?;
                (world, MovementState::new(Vec3::ZERO))
            }
            ScenarioKind::Surf => {
                // Floor catches the actor when it slides off the low edge
                let mut soup = TriangleSoup::surf_ramp(&SURF_RAMP);
                soup.extend(&TriangleSoup::flat_floor(FLOOR_HALF_EXTENT));
                let world: CollisionWorld = CollisionWorld::from_soup(&soup)?;
                let feet = SURF_RAMP.face_point(-0.5, 20.0)
                    + SURF_RAMP.face_normal() * (capsule.radius + 0.001)
                    - Vec3::Y * capsule.radius;
                let start = MovementState::new(feet)
                    .with_velocity(Vec3::new(-11.0, 0.0, 3.35))
                    .with_yaw(PI);
                (world, start)
            }
            ScenarioKind::Strafe => {
                let world: CollisionWorld =
                    CollisionWorld::from_soup(&TriangleSoup::flat_floor(FLOOR_HALF_EXTENT))?;
                let start = MovementState::new(Vec3::new(0.0, 200.0, 0.0))
                    .with_velocity(Vec3::new(6.0, 0.0, 0.0));
                (world, start)
            }
        };

        log::info!(
            "Scenario {:?}: {} triangles, start {:?}",
            kind,
            world.triangle_count(),
            start.position
        );

        Ok(Self { kind, world, start })
    }

    /// Input for the given tick.
    pub fn command(&self, tick: u64, state: &MovementState) -> PlayerCommand {
        match self.kind {
            ScenarioKind::Bhop => {
                if tick < BHOP_RUNUP_TICKS {
                    return PlayerCommand::new(1.0, 0.0);
                }
                let side = alternating(tick - BHOP_RUNUP_TICKS);
                // Re-press every other tick so hops chain without auto-bhop
                PlayerCommand::new(0.0, side).with_jump(tick % 2 == 0)
            }
            ScenarioKind::Surf => {
                PlayerCommand::new(0.0, -1.0).with_look_delta(0.1f32.to_radians(), 0.0)
            }
            ScenarioKind::Strafe => {
                let heading = state.velocity.z.atan2(state.velocity.x);
                PlayerCommand::new(0.0, 1.0).with_look_delta(heading - state.yaw, 0.0)
            }
        }
    }

    /// Synthetic render frame durations, cycled by the runner.
    pub fn frame_times(&self) -> &'static [f32] {
        &[1.0 / 60.0, 1.0 / 144.0, 1.0 / 90.0, 1.0 / 240.0]
    }
}

fn alternating(tick: u64) -> f32 {
    if (tick / STRAFE_SWAP_TICKS) % 2 == 0 {
        1.0
    } else {
        -1.0
    }
}
