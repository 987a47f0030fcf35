//! Slide move algorithm for collision response.
//!
//! This implements the classic Quake bump loop that lets the actor slide
//! along walls, into corners and across ramps within a single tick.
//! Ramps are special: their normal always redirects velocity directly and
//! is never accumulated with other blocking planes.

use glam::Vec3;

use super::config::{
    MovementConfig, EDGE_CLIP_MAX_UPWARD_SPEED, EDGE_CLIP_MIN_INTO, EDGE_CLIP_MIN_SPEED,
    EDGE_CLIP_PASSTHROUGH, MAX_BUMPS, MAX_CLIP_PLANES, STALL_FRACTION, STALL_NUDGE,
    WALL_NORMAL_MAX_Y,
};
use crate::collision::{Capsule, CollisionQuery};
use crate::math::{clip_velocity, horizontal, remove_into_plane, VECTOR_EPSILON};

/// Velocity components into a plane smaller than this are ignored (m/s).
const PLANE_EPSILON: f32 = 1e-4;

/// Normals this close are the same plane hit twice.
const SAME_PLANE_DOT: f32 = 0.99;

/// Below this speed the loop stops moving (m/s).
const MIN_MOVE_SPEED: f32 = 1e-3;

/// Context the bump loop needs from the controller.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SlideContext {
    /// The actor is in surf mode this tick.
    pub surfing: bool,
    /// Surf grace memory is still active.
    pub grace_active: bool,
}

/// What happened during one bump loop.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SlideOutcome {
    pub hit_any: bool,
    /// Surf-qualifying normal hit with the largest impact speed.
    pub strongest_surf_normal: Option<Vec3>,
    pub last_normal: Option<Vec3>,
    /// Touched a near-vertical surface.
    pub wall_contact: bool,
    pub edge_clip_used: bool,
}

/// Near-vertical surfaces such as ramp side edges and walls.
#[inline]
pub(crate) fn is_wall_like(normal: Vec3) -> bool {
    normal.y.abs() < WALL_NORMAL_MAX_Y
}

fn edge_clip_applies(velocity: Vec3, normal: Vec3, config: &MovementConfig) -> bool {
    if config.edge_clip_assist <= 0.0 {
        return false;
    }
    let speed = velocity.length();
    if speed < VECTOR_EPSILON {
        return false;
    }

    horizontal(velocity).length() > EDGE_CLIP_MIN_SPEED
        && velocity.y < EDGE_CLIP_MAX_UPWARD_SPEED
        && -(velocity / speed).dot(normal) > EDGE_CLIP_MIN_INTO
}

/// Find a velocity that leaves every accumulated plane.
///
/// Each plane is tried alone against the original velocity; the first clip
/// that enters no other plane wins. Failing that, two planes slide the
/// velocity along their crease and three or more stop the actor.
pub(crate) fn resolve_planes(velocity: Vec3, planes: &[Vec3], overbounce: f32) -> Vec3 {
    if planes.is_empty() {
        return velocity;
    }

    for (i, &plane) in planes.iter().enumerate() {
        let clipped = clip_velocity(velocity, plane, overbounce);
        let blocked = planes
            .iter()
            .enumerate()
            .any(|(j, other)| j != i && clipped.dot(*other) < -PLANE_EPSILON);
        if !blocked {
            return clipped;
        }
    }

    let [first, second] = planes else {
        return Vec3::ZERO;
    };
    let crease = first.cross(*second);
    if crease.length_squared() < VECTOR_EPSILON {
        return Vec3::ZERO;
    }
    let crease = crease.normalize();
    crease * crease.dot(velocity)
}

/// Move through the world for `delta_time`, sliding along whatever is hit.
///
/// # Arguments
///
/// * `world` - The collision world to trace through
/// * `capsule` - Actor collision shape
/// * `config` - Movement configuration
/// * `position` - Current feet position (will be updated)
/// * `velocity` - Current velocity (will be updated)
/// * `delta_time` - Time step in seconds
/// * `ctx` - Surf state of the current tick
pub(crate) fn slide_move<W: CollisionQuery + ?Sized>(
    world: &W,
    capsule: Capsule,
    config: &MovementConfig,
    position: &mut Vec3,
    velocity: &mut Vec3,
    delta_time: f32,
    ctx: SlideContext,
) -> SlideOutcome {
    let mut outcome = SlideOutcome::default();
    let mut time_left = delta_time;
    let mut planes = [Vec3::ZERO; MAX_CLIP_PLANES];
    let mut num_planes = 0;
    let mut strongest_impact = 0.0_f32;
    let primal_velocity = *velocity;

    for _ in 0..MAX_BUMPS {
        if time_left <= 0.0 || velocity.length() < MIN_MOVE_SPEED {
            break;
        }

        let target = *position + *velocity * time_left;
        let trace = world.trace_capsule(*position, target, capsule);
        *position = trace.end_position;
        if !trace.hit {
            break;
        }
        outcome.hit_any = true;

        // Oppose the motion
        let mut normal = trace.normal;
        if normal.dot(*velocity) > 0.0 {
            normal = -normal;
        }
        outcome.last_normal = Some(normal);

        let ramp = config.is_surf_normal(normal);
        if ramp || ctx.surfing {
            let impact = -velocity.dot(normal);
            if ramp && impact > strongest_impact {
                strongest_impact = impact;
                outcome.strongest_surf_normal = Some(normal);
            }
            let clipped = clip_velocity(*velocity, normal, config.overbounce);
            *velocity = remove_into_plane(clipped, normal);
        } else if is_wall_like(normal)
            && ctx.grace_active
            && edge_clip_applies(*velocity, normal, config)
        {
            // Slip past the seam at a ramp's side edge instead of stopping on it
            let direction = velocity.normalize_or_zero();
            *position += direction * EDGE_CLIP_PASSTHROUGH * config.edge_clip_assist;
            outcome.wall_contact = true;
            outcome.edge_clip_used = true;
            log::trace!("Edge clip passthrough at {:?}", *position);
        } else {
            if is_wall_like(normal) {
                outcome.wall_contact = true;
            }
            let known = planes[..num_planes]
                .iter()
                .any(|p| p.dot(normal) > SAME_PLANE_DOT);
            if !known {
                if num_planes < MAX_CLIP_PLANES {
                    planes[num_planes] = normal;
                    num_planes += 1;
                } else {
                    planes[MAX_CLIP_PLANES - 1] = normal;
                }
            }
            *velocity = resolve_planes(*velocity, &planes[..num_planes], config.overbounce);

            // Turned back against the original motion: stop dead in the corner
            if velocity.dot(primal_velocity) <= 0.0 {
                *velocity = Vec3::ZERO;
            }
        }

        time_left -= time_left * trace.fraction;
        if trace.fraction < STALL_FRACTION {
            *position += velocity.normalize_or_zero() * STALL_NUDGE;
            time_left *= 0.5;
        }
    }

    let overlap = world.resolve_capsule_position(*position, capsule);
    if overlap.collided {
        *position = overlap.position;
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{
        CollisionWorld, GroundProbe, OverlapResult, SurfRamp, TraceResult, TriangleSoup,
    };

    const DT: f32 = 1.0 / 128.0;

    fn ground_ctx() -> SlideContext {
        SlideContext {
            surfing: false,
            grace_active: false,
        }
    }

    /// Infinitely thin wall across the +X path at `x`, nothing else.
    struct ThinWall {
        x: f32,
    }

    impl CollisionQuery for ThinWall {
        fn query_ground(
            &self,
            _feet: Vec3,
            _capsule: Capsule,
            _distance: f32,
        ) -> Option<GroundProbe> {
            None
        }

        fn trace_capsule(&self, start: Vec3, end: Vec3, _capsule: Capsule) -> TraceResult {
            if start.x < self.x && end.x >= self.x {
                let fraction = (self.x - start.x) / (end.x - start.x);
                TraceResult::hit(fraction, start + (end - start) * fraction, Vec3::NEG_X)
            } else {
                TraceResult::no_hit(end)
            }
        }

        fn resolve_capsule_position(&self, feet: Vec3, _capsule: Capsule) -> OverlapResult {
            OverlapResult::clear(feet)
        }
    }

    fn room() -> CollisionWorld {
        let mut soup = TriangleSoup::flat_floor(50.0);
        // Wall at x = 5 (face at 4.5) and wall at z = 5 (face at 4.5)
        soup.add_box(Vec3::new(5.0, 2.0, 0.0), Vec3::new(0.5, 2.0, 20.0));
        soup.add_box(Vec3::new(0.0, 2.0, 5.0), Vec3::new(20.0, 2.0, 0.5));
        CollisionWorld::from_soup(&soup).unwrap()
    }

    #[test]
    fn test_resolve_single_plane() {
        let v = resolve_planes(Vec3::new(10.0, 0.0, 5.0), &[Vec3::NEG_X], 1.0);
        assert!(v.x.abs() < 1e-4);
        assert!((v.z - 5.0).abs() < 1e-4);
    }

    #[test]
    fn test_resolve_crease_between_walls() {
        // Two walls meeting at an acute angle; slide along their shared edge
        let a = Vec3::new(-1.0, 0.0, 0.3).normalize();
        let b = Vec3::new(-1.0, 0.0, -0.3).normalize();
        let v = resolve_planes(Vec3::new(10.0, -2.0, 0.0), &[a, b], 1.0);
        assert!(v.x.abs() < 1e-3 && v.z.abs() < 1e-3, "got {:?}", v);
        assert!(v.dot(a) >= -1e-3 && v.dot(b) >= -1e-3);
    }

    #[test]
    fn test_resolve_v_corner_never_reverses() {
        let a = Vec3::new(-1.0, 0.0, 0.3).normalize();
        let b = Vec3::new(-1.0, 0.0, -0.3).normalize();
        let v = resolve_planes(Vec3::new(10.0, 0.0, 0.0), &[a, b], 1.001);
        assert!(v.x >= -1e-3, "bounced back out of the corner: {:?}", v);
        assert!(v.length() < 1e-3, "nothing left to slide along: {:?}", v);
    }

    #[test]
    fn test_resolve_prefers_single_plane_clip() {
        // Floor plus a wall: clipping against the wall alone already clears the floor
        let v = resolve_planes(Vec3::new(5.0, 0.0, 3.0), &[Vec3::Y, Vec3::NEG_X], 1.0);
        assert!(v.x.abs() < 1e-4 && (v.z - 3.0).abs() < 1e-4, "got {:?}", v);
    }

    #[test]
    fn test_resolve_three_way_corner_stops() {
        let planes = [Vec3::NEG_X, Vec3::NEG_Z, Vec3::NEG_Y];
        let v = resolve_planes(Vec3::new(5.0, 5.0, 5.0), &planes, 1.0);
        assert!(v.length() < 1e-3, "got {:?}", v);
    }

    #[test]
    fn test_slide_along_wall() {
        let world = room();
        let config = MovementConfig::default();
        let mut position = Vec3::new(3.5, 0.002, -5.0);
        let mut velocity = Vec3::new(10.0, 0.0, 5.0);

        for _ in 0..64 {
            slide_move(
                &world,
                Capsule::PLAYER,
                &config,
                &mut position,
                &mut velocity,
                DT,
                ground_ctx(),
            );
        }

        assert!(position.x < 4.1 + 1e-3, "went through the wall: {:?}", position);
        assert!(velocity.x.abs() < 0.02);
        assert!((velocity.z - 5.0).abs() < 0.05, "tangential speed lost: {:?}", velocity);
        assert!(position.z > -3.0, "did not slide: {:?}", position);
    }

    #[test]
    fn test_corner_stops_cleanly() {
        let world = room();
        let config = MovementConfig::default();
        let mut position = Vec3::new(3.0, 0.002, 3.0);
        let mut velocity = Vec3::new(8.0, 0.0, 8.0);

        for _ in 0..64 {
            slide_move(
                &world,
                Capsule::PLAYER,
                &config,
                &mut position,
                &mut velocity,
                DT,
                ground_ctx(),
            );
        }

        assert!(position.x <= 4.1 + 1e-3 && position.z <= 4.1 + 1e-3, "tunneled: {:?}", position);
        assert!(velocity.length() < 0.05, "should be wedged: {:?}", velocity);
        assert!(!world.resolve_capsule_position(position, Capsule::PLAYER).collided);
    }

    #[test]
    fn test_landing_removes_downward_speed() {
        let world = room();
        let config = MovementConfig::default();
        let mut position = Vec3::new(0.0, 0.05, 0.0);
        let mut velocity = Vec3::new(2.0, -10.0, 0.0);

        let outcome = slide_move(
            &world,
            Capsule::PLAYER,
            &config,
            &mut position,
            &mut velocity,
            DT,
            ground_ctx(),
        );

        assert!(outcome.hit_any);
        // Only the overbounce remains
        assert!(velocity.y.abs() < 0.02);
        assert!((velocity.x - 2.0).abs() < 1e-3);
        assert!(position.y >= 0.0 && position.y < 0.01);
    }

    #[test]
    fn test_ramp_hit_reports_surf_normal() {
        let ramp = SurfRamp {
            start_x: 10.0,
            end_x: -10.0,
            base_y: 0.0,
            base_z: 0.0,
            height: 8.0,
            angle_deg: 55.0,
        };
        let world: CollisionWorld =
            CollisionWorld::from_soup(&TriangleSoup::surf_ramp(&ramp)).unwrap();
        let config = MovementConfig::default();

        // Falling onto the face from in front of it
        let face = ramp.face_point(0.0, 4.0);
        let mut position = face + ramp.face_normal() * 0.42 - Vec3::Y * Capsule::PLAYER.radius;
        let mut velocity = Vec3::new(-5.0, -10.0, 0.0);

        let outcome = slide_move(
            &world,
            Capsule::PLAYER,
            &config,
            &mut position,
            &mut velocity,
            DT,
            ground_ctx(),
        );

        let normal = outcome.strongest_surf_normal.expect("ramp should qualify as surf");
        assert!((normal - ramp.face_normal()).length() < 0.02);
        assert!(velocity.dot(ramp.face_normal()) >= -1e-3);
        assert!(velocity.x < -4.9, "tangential speed along the ramp kept: {:?}", velocity);
    }

    #[test]
    fn test_open_space_moves_fully() {
        let world: CollisionWorld = CollisionWorld::new();
        let config = MovementConfig::default();
        let mut position = Vec3::ZERO;
        let mut velocity = Vec3::new(8.0, 0.0, 0.0);

        let outcome = slide_move(
            &world,
            Capsule::PLAYER,
            &config,
            &mut position,
            &mut velocity,
            0.5,
            ground_ctx(),
        );
        assert!(!outcome.hit_any);
        assert_eq!(position, Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_edge_clip_passes_thin_wall_during_grace() {
        let wall = ThinWall { x: 0.0 };
        let config = MovementConfig::default().with_edge_clip_assist(1.5);
        let start = Vec3::new(-0.05, 0.0, 0.0);
        let mut position = start;
        let mut velocity = Vec3::new(10.0, 0.0, 0.0);
        let ctx = SlideContext {
            surfing: false,
            grace_active: true,
        };

        let outcome = slide_move(
            &wall,
            Capsule::PLAYER,
            &config,
            &mut position,
            &mut velocity,
            DT,
            ctx,
        );

        assert!(outcome.edge_clip_used);
        assert!(outcome.wall_contact);
        assert_eq!(velocity, Vec3::new(10.0, 0.0, 0.0), "speed must survive the seam");
        let expected = start.x + 10.0 * DT + EDGE_CLIP_PASSTHROUGH * 1.5;
        assert!(
            (position.x - expected).abs() < 1e-4,
            "expected x {}, got {}",
            expected,
            position.x
        );
    }

    #[test]
    fn test_edge_clip_disabled_stops_at_wall() {
        let wall = ThinWall { x: 0.0 };
        let with_grace = SlideContext {
            surfing: false,
            grace_active: true,
        };
        let without_grace = SlideContext {
            grace_active: false,
            ..with_grace
        };

        // No assist, or assist without surf grace
        for (config, ctx) in [
            (MovementConfig::default().with_edge_clip_assist(0.0), with_grace),
            (MovementConfig::default(), without_grace),
        ] {
            let mut position = Vec3::new(-0.05, 0.0, 0.0);
            let mut velocity = Vec3::new(10.0, 0.0, 0.0);

            let outcome = slide_move(
                &wall,
                Capsule::PLAYER,
                &config,
                &mut position,
                &mut velocity,
                DT,
                ctx,
            );

            assert!(!outcome.edge_clip_used);
            assert!(outcome.wall_contact);
            assert!(position.x <= 1e-4, "passed the wall: {:?}", position);
            assert!(velocity.x <= 1e-3, "still moving into the wall: {:?}", velocity);
        }
    }
}
