//! Ground / air / surf classification.
//!
//! The base mode comes from the ground probe alone. Surf memory then
//! overrides it in three situations around ramp edges: a probe miss right
//! after surfing, a nearly flat probe while still fast at a ramp edge, and a
//! fast level exit off a ramp that ground friction would otherwise kill.

use glam::Vec3;

use super::config::{
    MovementConfig, EDGE_SURF_MIN_SLOPE_DEG, EDGE_SURF_MIN_SPEED, LAUNCH_MAX_VERTICAL_SPEED,
    LAUNCH_SPEED_FRACTION, LEAVE_SURFACE_SPEED,
};
use super::state::{MovementMode, MovementState};
use crate::collision::GroundProbe;
use crate::math::{angle_from_up_deg, horizontal};

/// Outcome of classifying one probe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Classification {
    pub mode: MovementMode,
    /// Active ramp normal when `mode` is surf.
    pub surf_normal: Option<Vec3>,
    /// Surf came from memory rather than a real contact.
    pub from_grace: bool,
    /// Forced to air to keep a ramp launch.
    pub launch_preserved: bool,
}

impl Classification {
    fn new(mode: MovementMode, surf_normal: Option<Vec3>) -> Self {
        Self {
            mode,
            surf_normal,
            from_grace: false,
            launch_preserved: false,
        }
    }
}

impl MovementConfig {
    /// Whether a contact normal is a surfable ramp.
    pub fn is_surf_normal(&self, normal: Vec3) -> bool {
        self.is_surf_angle(angle_from_up_deg(normal))
    }

    /// Whether a slope angle (degrees from up) is walkable ground.
    pub fn is_walkable_angle(&self, angle_deg: f32) -> bool {
        angle_deg <= self.walkable_angle_deg()
    }
}

/// Classify the actor against a ground probe, applying surf memory overrides.
///
/// A walkable probe gives ground only while the upward speed is at most
/// [`LEAVE_SURFACE_SPEED`]; a surfable probe gives surf only while the speed
/// along its normal is at most that value. Anything faster leaving the
/// surface is air.
pub(crate) fn classify(
    probe: Option<&GroundProbe>,
    state: &MovementState,
    config: &MovementConfig,
) -> Classification {
    let velocity = state.velocity;

    let mut class = match probe {
        Some(p)
            if config.is_walkable_angle(p.slope_angle_deg) && velocity.y <= LEAVE_SURFACE_SPEED =>
        {
            Classification::new(MovementMode::Ground, None)
        }
        Some(p)
            if config.is_surf_angle(p.slope_angle_deg)
                && velocity.dot(p.normal) <= LEAVE_SURFACE_SPEED =>
        {
            Classification::new(MovementMode::Surf, Some(p.normal))
        }
        _ => Classification::new(MovementMode::Air, None),
    };

    let memory = state.surf;
    if !memory.active() {
        return class;
    }

    let horizontal_speed = horizontal(velocity).length();
    match (class.mode, probe) {
        // Probe missed right after a ramp: keep surfing on the remembered normal
        (MovementMode::Air, None) if velocity.dot(memory.normal) <= LEAVE_SURFACE_SPEED => {
            class = Classification {
                from_grace: true,
                ..Classification::new(MovementMode::Surf, Some(memory.normal))
            };
        }
        (MovementMode::Ground, Some(p)) => {
            let level = velocity.y.abs() < LAUNCH_MAX_VERTICAL_SPEED;
            if horizontal_speed > EDGE_SURF_MIN_SPEED
                && p.slope_angle_deg > EDGE_SURF_MIN_SLOPE_DEG
            {
                class = Classification {
                    from_grace: true,
                    ..Classification::new(MovementMode::Surf, Some(memory.normal))
                };
            } else if horizontal_speed > LAUNCH_SPEED_FRACTION * config.max_speed && level {
                class = Classification {
                    launch_preserved: true,
                    ..Classification::new(MovementMode::Air, None)
                };
            }
        }
        _ => {}
    }

    class
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::movement::state::SurfMemory;

    fn probe(normal: Vec3) -> GroundProbe {
        let normal = normal.normalize();
        GroundProbe {
            distance: 0.05,
            position: Vec3::ZERO,
            normal,
            slope_angle_deg: angle_from_up_deg(normal),
        }
    }

    fn ramp_normal() -> Vec3 {
        let angle = 55f32.to_radians();
        Vec3::new(0.0, angle.cos(), -angle.sin())
    }

    fn state(velocity: Vec3, grace_ticks: u32) -> MovementState {
        let mut state = MovementState::new(Vec3::ZERO).with_velocity(velocity);
        state.surf = SurfMemory {
            normal: ramp_normal(),
            grace_ticks,
        };
        state
    }

    #[test]
    fn test_base_classification() {
        let config = MovementConfig::default();
        let still = state(Vec3::ZERO, 0);

        let flat = probe(Vec3::Y);
        assert_eq!(classify(Some(&flat), &still, &config).mode, MovementMode::Ground);

        let ramp = probe(ramp_normal());
        let class = classify(Some(&ramp), &still, &config);
        assert_eq!(class.mode, MovementMode::Surf);
        assert_eq!(class.surf_normal, Some(ramp.normal));
        assert!(!class.from_grace);

        // 42° is neither walkable nor surfable
        let between = probe(Vec3::new(0.0, 42f32.to_radians().cos(), -42f32.to_radians().sin()));
        assert_eq!(classify(Some(&between), &still, &config).mode, MovementMode::Air);

        assert_eq!(classify(None, &still, &config).mode, MovementMode::Air);
    }

    #[test]
    fn test_rising_actor_leaves_ground() {
        let config = MovementConfig::default();
        let jumping = state(Vec3::new(0.0, 6.0, 0.0), 0);
        assert_eq!(
            classify(Some(&probe(Vec3::Y)), &jumping, &config).mode,
            MovementMode::Air
        );
    }

    #[test]
    fn test_separating_from_ramp_is_air() {
        let config = MovementConfig::default();
        let ramp = probe(ramp_normal());

        let at_limit = state(ramp_normal() * LEAVE_SURFACE_SPEED * 0.9, 0);
        assert_eq!(classify(Some(&ramp), &at_limit, &config).mode, MovementMode::Surf);

        let leaving = state(ramp_normal() * (LEAVE_SURFACE_SPEED + 0.5), 0);
        assert_eq!(classify(Some(&ramp), &leaving, &config).mode, MovementMode::Air);
    }

    #[test]
    fn test_grace_bridges_probe_miss() {
        let config = MovementConfig::default();
        let class = classify(None, &state(Vec3::new(-10.0, 0.0, 0.0), 5), &config);
        assert_eq!(class.mode, MovementMode::Surf);
        assert_eq!(class.surf_normal, Some(ramp_normal()));
        assert!(class.from_grace);
    }

    #[test]
    fn test_grace_does_not_hold_separating_actor() {
        let config = MovementConfig::default();
        let away = ramp_normal() * 5.0;
        let class = classify(None, &state(away, 5), &config);
        assert_eq!(class.mode, MovementMode::Air);
    }

    #[test]
    fn test_ramp_launch_preserved() {
        let config = MovementConfig::default();
        let fast = state(Vec3::new(-10.0, 0.0, 0.0), 5);
        let class = classify(Some(&probe(Vec3::Y)), &fast, &config);
        assert_eq!(class.mode, MovementMode::Air);
        assert!(class.launch_preserved);

        // Without surf memory the same probe is plain ground
        let no_memory = state(Vec3::new(-10.0, 0.0, 0.0), 0);
        assert_eq!(
            classify(Some(&probe(Vec3::Y)), &no_memory, &config).mode,
            MovementMode::Ground
        );
    }

    #[test]
    fn test_edge_probe_keeps_surf() {
        let config = MovementConfig::default();
        // Slower than the launch threshold, nearly flat probe at a ramp lip
        let moving = state(Vec3::new(-3.0, 0.0, 0.0), 5);
        let lip = probe(Vec3::new(0.0, 1.0, -0.05));
        let class = classify(Some(&lip), &moving, &config);
        assert_eq!(class.mode, MovementMode::Surf);
        assert!(class.from_grace);

        // Perfectly flat ground does not trigger it
        let flat = classify(Some(&probe(Vec3::Y)), &moving, &config);
        assert_eq!(flat.mode, MovementMode::Ground);
    }
}
