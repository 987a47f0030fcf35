//! Stateless vector kinematics used by the movement controller.
//!
//! Velocities are in meters/second, Y is up and "horizontal" always means
//! the XZ plane. Every function here is pure.

use glam::Vec3;

/// Vectors shorter than this are treated as zero instead of being normalized.
pub const VECTOR_EPSILON: f32 = 1e-6;

/// Horizontal speeds below this are snapped to zero by [`apply_friction`].
pub const FRICTION_STOP_EPSILON: f32 = 1e-4;

/// id-engine style acceleration toward `wish_dir`.
///
/// Only the speed *missing* along `wish_dir` is added, which is what lets
/// air-strafing gain speed: a wish direction perpendicular to the current
/// velocity always has the full `wish_speed` left to add.
pub fn accelerate(
    velocity: Vec3,
    wish_dir: Vec3,
    wish_speed: f32,
    acceleration: f32,
    delta_time: f32,
    surface_friction: f32,
) -> Vec3 {
    let current_speed = velocity.dot(wish_dir);
    let add_speed = wish_speed - current_speed;
    if add_speed <= 0.0 {
        return velocity;
    }

    let accel_speed = (acceleration * delta_time * wish_speed * surface_friction).min(add_speed);
    velocity + wish_dir * accel_speed
}

/// Ground friction on the horizontal component only.
///
/// Below `stop_speed` the drop is computed as if moving at `stop_speed`,
/// so slow actors come to rest quickly instead of creeping forever.
pub fn apply_friction(velocity: Vec3, delta_time: f32, friction: f32, stop_speed: f32) -> Vec3 {
    let speed = horizontal(velocity).length();
    if speed < FRICTION_STOP_EPSILON {
        return Vec3::new(0.0, velocity.y, 0.0);
    }

    let control = speed.max(stop_speed);
    let drop = control * friction * delta_time;
    let new_speed = (speed - drop).max(0.0);
    let scale = new_speed / speed;

    Vec3::new(velocity.x * scale, velocity.y, velocity.z * scale)
}

/// Clip velocity against a surface normal.
///
/// The overbounce factor slightly over- or under-rotates the result, so a
/// second pass removes whatever is still pointing into the surface.
pub fn clip_velocity(velocity: Vec3, normal: Vec3, overbounce: f32) -> Vec3 {
    let backoff = velocity.dot(normal) * overbounce;
    let clipped = velocity - normal * backoff;
    remove_into_plane(clipped, normal)
}

/// Remove only the component of `velocity` pointing into the plane.
///
/// Velocity leaving the surface is returned untouched.
pub fn remove_into_plane(velocity: Vec3, normal: Vec3) -> Vec3 {
    let into = velocity.dot(normal);
    if into < 0.0 {
        velocity - normal * into
    } else {
        velocity
    }
}

/// Scale the horizontal component down to `max_speed`; Y is left alone.
pub fn clamp_horizontal_speed(velocity: Vec3, max_speed: f32) -> Vec3 {
    let speed = horizontal(velocity).length();
    if speed <= max_speed || speed < VECTOR_EPSILON {
        return velocity;
    }

    let scale = max_speed.max(0.0) / speed;
    Vec3::new(velocity.x * scale, velocity.y, velocity.z * scale)
}

/// Project a direction onto a plane and re-normalize it.
///
/// Returns [`Vec3::ZERO`] when the direction is (nearly) parallel to the
/// normal and nothing meaningful is left.
pub fn project_direction_on_plane(direction: Vec3, normal: Vec3) -> Vec3 {
    let projected = direction - normal * direction.dot(normal);
    if projected.length_squared() < VECTOR_EPSILON * VECTOR_EPSILON {
        Vec3::ZERO
    } else {
        projected.normalize()
    }
}

/// The XZ part of a vector.
#[inline]
pub fn horizontal(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Angle between a normal and world up, in degrees within `[0, 180]`.
#[inline]
pub fn angle_from_up_deg(normal: Vec3) -> f32 {
    let n = normal.normalize_or_zero();
    if n == Vec3::ZERO {
        return 0.0;
    }
    n.y.clamp(-1.0, 1.0).acos().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 128.0;

    #[test]
    fn test_accelerate_adds_missing_speed_only() {
        let v = accelerate(Vec3::ZERO, Vec3::X, 8.0, 10.0, DT, 1.0);
        assert!((v.x - 10.0 * DT * 8.0).abs() < 1e-6);

        // Already faster than the wish speed along the wish direction
        let fast = Vec3::new(12.0, 0.0, 0.0);
        assert_eq!(accelerate(fast, Vec3::X, 8.0, 10.0, DT, 1.0), fast);
    }

    #[test]
    fn test_accelerate_caps_at_add_speed() {
        let v = accelerate(Vec3::new(7.9, 0.0, 0.0), Vec3::X, 8.0, 100.0, DT, 1.0);
        assert!((v.x - 8.0).abs() < 1e-5, "got {}", v.x);
    }

    #[test]
    fn test_accelerate_perpendicular_gains_speed() {
        let v0 = Vec3::new(6.0, 0.0, 0.0);
        let v1 = accelerate(v0, Vec3::Z, 8.0, 10.0, DT, 1.0);
        assert!(v1.length() > v0.length());
        assert_eq!(v1.x, 6.0);
    }

    #[test]
    fn test_surface_friction_scales_acceleration() {
        let full = accelerate(Vec3::ZERO, Vec3::X, 8.0, 10.0, DT, 1.0);
        let half = accelerate(Vec3::ZERO, Vec3::X, 8.0, 10.0, DT, 0.5);
        assert!((half.x * 2.0 - full.x).abs() < 1e-6);
    }

    #[test]
    fn test_friction_strictly_reduces_above_stop_speed() {
        for speed in [3.0_f32, 8.0, 20.0] {
            let v = Vec3::new(speed, 1.5, 0.0);
            let after = apply_friction(v, DT, 4.0, 2.5);
            let after_speed = horizontal(after).length();
            assert!(after_speed < speed, "speed {} did not drop ({})", speed, after_speed);
            assert_eq!(after.y, 1.5, "vertical velocity must be untouched");
        }
    }

    #[test]
    fn test_friction_zeroes_tiny_speed() {
        let v = apply_friction(Vec3::new(1e-6, -2.0, 1e-6), DT, 4.0, 2.5);
        assert_eq!(v.x, 0.0);
        assert_eq!(v.z, 0.0);
        assert_eq!(v.y, -2.0);
    }

    #[test]
    fn test_friction_never_reverses() {
        let v = apply_friction(Vec3::new(0.01, 0.0, 0.0), 1.0, 10.0, 2.5);
        assert_eq!(v.x, 0.0);
    }

    #[test]
    fn test_clip_velocity_never_points_into_surface() {
        let normals = [
            Vec3::Y,
            Vec3::new(0.0, 0.574, -0.819).normalize(),
            Vec3::new(-1.0, 0.0, 0.0),
            Vec3::new(0.3, 0.9, 0.3).normalize(),
        ];
        let velocities = [
            Vec3::new(10.0, -5.0, 3.0),
            Vec3::new(-11.0, 0.0, 3.35),
            Vec3::new(0.0, -20.0, 0.0),
            Vec3::new(4.0, 2.0, -7.0),
        ];

        for n in normals {
            for v in velocities {
                for overbounce in [1.0, 1.001, 0.9] {
                    let clipped = clip_velocity(v, n, overbounce);
                    assert!(
                        clipped.dot(n) >= -1e-5,
                        "clip({:?}, {:?}, {}) -> {:?} points into surface",
                        v, n, overbounce, clipped
                    );
                }
            }
        }
    }

    #[test]
    fn test_clip_velocity_wall() {
        let clipped = clip_velocity(Vec3::new(10.0, 0.0, 5.0), Vec3::NEG_X, 1.0);
        assert!(clipped.x.abs() < 1e-5);
        assert!((clipped.z - 5.0).abs() < 1e-5);
    }

    #[test]
    fn test_remove_into_plane_keeps_leaving_velocity() {
        let v = Vec3::new(1.0, 3.0, 0.0);
        assert_eq!(remove_into_plane(v, Vec3::Y), v);
        let down = remove_into_plane(Vec3::new(1.0, -3.0, 0.0), Vec3::Y);
        assert_eq!(down, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_clamp_horizontal_speed() {
        let v = clamp_horizontal_speed(Vec3::new(6.0, -3.0, 8.0), 5.0);
        assert!((horizontal(v).length() - 5.0).abs() < 1e-5);
        assert_eq!(v.y, -3.0);

        let slow = Vec3::new(1.0, 9.0, 1.0);
        assert_eq!(clamp_horizontal_speed(slow, 5.0), slow);
    }

    #[test]
    fn test_project_direction_on_plane() {
        let ramp = Vec3::new(0.0, 0.574, -0.819).normalize();
        let projected = project_direction_on_plane(Vec3::Z, ramp);
        assert!((projected.length() - 1.0).abs() < 1e-5);
        assert!(projected.dot(ramp).abs() < 1e-5);
        assert!(projected.y > 0.0, "pushing into the ramp should point up-slope");

        assert_eq!(project_direction_on_plane(Vec3::Y, Vec3::Y), Vec3::ZERO);
    }

    #[test]
    fn test_angle_from_up() {
        assert!(angle_from_up_deg(Vec3::Y).abs() < 1e-3);
        assert!((angle_from_up_deg(Vec3::X) - 90.0).abs() < 1e-3);
        assert!((angle_from_up_deg(Vec3::NEG_Y) - 180.0).abs() < 1e-3);
        let ramp = Vec3::new(0.0, 55f32.to_radians().cos(), -55f32.to_radians().sin());
        assert!((angle_from_up_deg(ramp) - 55.0).abs() < 1e-3);
    }
}
