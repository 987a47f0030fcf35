//! Player movement controller.
//!
//! This is the main entry point for player movement. It takes input commands
//! and advances one actor's [`MovementState`] through a collision world,
//! one fixed tick at a time.

use glam::{Vec2, Vec3};

use crate::collision::{Capsule, CollisionQuery, GroundProbe};
use crate::math::{
    accelerate, angle_from_up_deg, apply_friction, clamp_horizontal_speed, clip_velocity,
    horizontal, project_direction_on_plane, remove_into_plane, VECTOR_EPSILON,
};

use super::classify::{classify, Classification};
use super::config::{
    MovementConfig, GROUND_PROBE_DISTANCE, GROUND_SNAP_DISTANCE, LEAVE_SURFACE_SPEED,
    PITCH_LIMIT_DEG, SPEED_DROP_WARNING_RATIO,
};
use super::debug::{MovementDebug, StrafeHint};
use super::slide_move::{slide_move, SlideContext, SlideOutcome};
use super::state::{MovementMode, MovementState, PlayerCommand, SurfMemory};
use super::surf::{update_surf_contact, SurfContact};

/// Player movement controller.
///
/// Handles all player movement physics including:
/// - Ground acceleration and friction
/// - Air strafing and bunnyhopping
/// - Ramp surfing with edge heuristics
/// - Collision response
///
/// The controller itself is immutable during a tick; all per-actor data
/// lives in the [`MovementState`] passed to [`update`](Self::update).
///
/// # Example
///
/// ```ignore
/// let controller = PlayerController::new(MovementConfig::default());
/// let mut state = MovementState::new(spawn_position);
///
/// // Each fixed tick:
/// let debug = controller.update(&mut state, &command, &world, 1.0 / 128.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct PlayerController {
    /// Movement configuration (cvars).
    pub config: MovementConfig,
    /// Collision shape of the actor.
    pub capsule: Capsule,
}

/// Wish vector derived from input and view yaw.
#[derive(Debug, Clone, Copy)]
struct Wish {
    dir: Vec3,
    speed: f32,
}

impl PlayerController {
    /// Create a new player controller with the given configuration.
    pub fn new(config: MovementConfig) -> Self {
        Self {
            config,
            capsule: Capsule::PLAYER,
        }
    }

    /// Create a controller with default configuration.
    pub fn with_default_config() -> Self {
        Self::new(MovementConfig::default())
    }

    pub fn with_capsule(mut self, capsule: Capsule) -> Self {
        self.capsule = capsule;
        self
    }

    /// Place an actor at a spawn point.
    ///
    /// Traces down from slightly above the spawn point and rests the actor on
    /// whatever it finds. Velocity and surf memory are reset.
    pub fn spawn_at<W: CollisionQuery + ?Sized>(
        &self,
        state: &mut MovementState,
        spawn_pos: Vec3,
        world: &W,
    ) {
        let trace_start = spawn_pos + Vec3::new(0.0, 1.0, 0.0);
        let trace_end = spawn_pos - Vec3::new(0.0, 2.0, 0.0);

        let trace = world.trace_capsule(trace_start, trace_end, self.capsule);
        state.position = if trace.hit {
            trace.end_position
        } else {
            spawn_pos
        };
        state.velocity = Vec3::ZERO;
        state.surf = SurfMemory::default();

        log::debug!("Spawned at {:?} (ground found: {})", state.position, trace.hit);
    }

    /// Advance the actor by one tick.
    ///
    /// # Arguments
    ///
    /// * `state` - The actor's movement state (will be modified)
    /// * `command` - Input for this tick
    /// * `world` - Static collision geometry
    /// * `delta_time` - Fixed time step in seconds
    ///
    /// Returns the debug snapshot for this tick.
    pub fn update<W: CollisionQuery + ?Sized>(
        &self,
        state: &mut MovementState,
        command: &PlayerCommand,
        world: &W,
        delta_time: f32,
    ) -> MovementDebug {
        self.update_view_angles(state, command.look_delta);
        let jump_request = state.jump.update(command.wants_jump(), self.config.auto_bhop);

        let wish = self.wish(state, command);
        if delta_time <= 0.0 || !delta_time.is_finite() {
            let probe = world.query_ground(state.position, self.capsule, GROUND_PROBE_DISTANCE);
            let class = classify(probe.as_ref(), state, &self.config);
            return self.snapshot(state, &class, probe.as_ref(), wish);
        }

        // Pre-move classification
        let probe = world.query_ground(state.position, self.capsule, GROUND_PROBE_DISTANCE);
        let class = classify(probe.as_ref(), state, &self.config);
        let mut mode = class.mode;

        let jumped = self.config.bhop
            && jump_request
            && matches!(mode, MovementMode::Ground | MovementMode::Surf);
        if jumped {
            state.velocity.y = self.config.jump_impulse;
            state.surf.grace_ticks = 0;
            mode = MovementMode::Air;
            log::trace!("Jump from {} at {:.2} m/s", class.mode.as_str(), state.horizontal_speed());
        }

        let friction_applied = match mode {
            MovementMode::Ground => self.ground_move(state, wish, delta_time),
            MovementMode::Surf => {
                let normal = class.surf_normal.unwrap_or(state.surf.normal);
                self.surf_move(state, wish, normal, delta_time);
                false
            }
            MovementMode::Air => {
                self.air_move(state, wish, delta_time);
                false
            }
        };

        if mode != MovementMode::Ground {
            state.velocity.y -= self.config.gravity * delta_time;
        }

        // Sliding collision
        let pre_velocity = state.velocity;
        let slide = slide_move(
            world,
            self.capsule,
            &self.config,
            &mut state.position,
            &mut state.velocity,
            delta_time,
            SlideContext {
                surfing: mode == MovementMode::Surf,
                grace_active: state.surf.active(),
            },
        );

        let post_probe = world.query_ground(state.position, self.capsule, GROUND_PROBE_DISTANCE);
        let contact = if jumped {
            SurfContact::default()
        } else {
            update_surf_contact(
                state,
                &self.config,
                post_probe.as_ref(),
                &slide,
                pre_velocity,
                mode == MovementMode::Surf && !class.from_grace,
            )
        };

        // Ground snap and final mode
        let landing = classify(post_probe.as_ref(), state, &self.config);
        if !jumped && landing.mode == MovementMode::Ground {
            if let Some(p) = post_probe.as_ref() {
                if p.distance <= GROUND_SNAP_DISTANCE && state.velocity.y <= LEAVE_SURFACE_SPEED {
                    state.position = p.position;
                    if state.velocity.y < 0.0 {
                        state.velocity.y = 0.0;
                    }
                }
            }
        }
        let final_class = classify(post_probe.as_ref(), state, &self.config);

        if final_class.mode != class.mode {
            log::trace!(
                "Mode {} -> {} at {:?}",
                class.mode.as_str(),
                final_class.mode.as_str(),
                state.position
            );
        }

        let mut debug = self.snapshot(state, &final_class, post_probe.as_ref(), wish);
        debug.friction_applied = friction_applied;
        debug.jumped = jumped;
        self.record_collision(&mut debug, &slide, &contact, pre_velocity, state.velocity);
        debug
    }

    // ========================================================================
    // View Angles
    // ========================================================================

    fn update_view_angles(&self, state: &mut MovementState, look_delta: Vec2) {
        use std::f32::consts::PI;

        state.yaw += look_delta.x;
        state.pitch += look_delta.y;

        let pitch_limit = PITCH_LIMIT_DEG.to_radians();
        state.pitch = state.pitch.clamp(-pitch_limit, pitch_limit);

        // Normalize yaw to (-PI, PI]
        if state.yaw.is_finite() {
            while state.yaw > PI {
                state.yaw -= 2.0 * PI;
            }
            while state.yaw <= -PI {
                state.yaw += 2.0 * PI;
            }
        } else {
            state.yaw = 0.0;
        }
    }

    fn wish(&self, state: &MovementState, command: &PlayerCommand) -> Wish {
        if !command.has_movement_input() {
            return Wish { dir: Vec3::ZERO, speed: 0.0 };
        }
        let input = Vec2::new(command.forward_move, command.side_move);
        let direction = state.forward() * input.x + state.right() * input.y;
        let dir = if direction.length_squared() > VECTOR_EPSILON {
            direction.normalize()
        } else {
            Vec3::ZERO
        };
        let speed = (input.length() * self.config.max_speed).min(self.config.max_speed);
        Wish { dir, speed }
    }

    // ========================================================================
    // Mode-specific velocity updates
    // ========================================================================

    /// Returns true when friction was applied.
    fn ground_move(&self, state: &mut MovementState, wish: Wish, delta_time: f32) -> bool {
        let config = &self.config;
        let mut velocity =
            apply_friction(state.velocity, delta_time, config.friction, config.stop_speed);
        velocity = accelerate(velocity, wish.dir, wish.speed, config.accelerate, delta_time, 1.0);
        velocity = clamp_horizontal_speed(velocity, config.max_speed);
        if velocity.y < 0.0 {
            velocity.y = 0.0;
        }
        state.velocity = velocity;
        true
    }

    fn surf_move(&self, state: &mut MovementState, wish: Wish, normal: Vec3, delta_time: f32) {
        let config = &self.config;
        let clipped = clip_velocity(state.velocity, normal, config.overbounce);
        let mut velocity = remove_into_plane(clipped, normal);

        let ramp_dir = project_direction_on_plane(wish.dir, normal);
        velocity = accelerate(
            velocity,
            ramp_dir,
            wish.speed,
            config.air_accelerate,
            delta_time,
            1.0,
        );
        velocity = remove_into_plane(velocity, normal);

        if config.surf_friction > 0.0 {
            velocity *= (1.0 - config.surf_friction * delta_time).max(0.0);
        }
        state.velocity = velocity;
    }

    fn air_move(&self, state: &mut MovementState, wish: Wish, delta_time: f32) {
        state.velocity = accelerate(
            state.velocity,
            wish.dir,
            wish.speed,
            self.config.air_accelerate,
            delta_time,
            1.0,
        );
    }

    // ========================================================================
    // Debug snapshot
    // ========================================================================

    fn snapshot(
        &self,
        state: &MovementState,
        class: &Classification,
        probe: Option<&GroundProbe>,
        wish: Wish,
    ) -> MovementDebug {
        let surfing = class.mode == MovementMode::Surf;
        let strafe_hint = match class.surf_normal {
            Some(normal) if surfing => StrafeHint::for_surf(state.velocity, normal),
            _ => StrafeHint::None,
        };

        MovementDebug {
            speed: horizontal(state.velocity).length(),
            vertical_speed: state.velocity.y,
            mode: class.mode,
            surfing,
            slope_angle_deg: probe.map(|p| p.slope_angle_deg),
            wish_dir: wish.dir,
            wish_speed: wish.speed,
            surface_normal: class.surf_normal.or(probe.map(|p| p.normal)),
            contact_point: probe.map(|p| p.position),
            strafe_hint,
            surf_grace_ticks: state.surf.grace_ticks,
            ..Default::default()
        }
    }

    fn record_collision(
        &self,
        debug: &mut MovementDebug,
        slide: &SlideOutcome,
        contact: &SurfContact,
        pre_velocity: Vec3,
        post_velocity: Vec3,
    ) {
        let before = pre_velocity.length();
        let after = post_velocity.length();
        debug.collision_speed_before = before;
        debug.collision_speed_after = after;
        debug.speed_drop_warning =
            before > VECTOR_EPSILON && after < before * SPEED_DROP_WARNING_RATIO;
        debug.last_collision_normal = slide.last_normal;
        debug.last_collision_angle_deg = slide.last_normal.map(angle_from_up_deg);
        debug.edge_recovery = contact.recovered;
        debug.edge_clip = slide.edge_clip_used;
    }
}
