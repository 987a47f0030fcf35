//! Post-collision surf handling: contact memory and edge speed recovery.
//!
//! The bump loop works in discrete sweeps, so an actor crossing a seam
//! between two ramp pieces can lose most of its speed against a sliver of
//! geometry it should have glided over. After the loop, the surf contact is
//! re-established and, when the speed loss looks like such an artifact, the
//! velocity is rebuilt from the pre-collision velocity instead.

use glam::Vec3;

use super::config::{
    MovementConfig, LEAVE_SURFACE_SPEED, RECOVERY_MIN_GAIN, RECOVERY_SPEED_CAP,
    RECOVERY_TRIGGER_RATIO, SEVERE_WALL_DROP_RATIO, SURF_GRACE_HOLD_MIN, SURF_GRACE_TICKS,
    WALL_SLIDE_MIN_SPEED,
};
use super::slide_move::SlideOutcome;
use super::state::{MovementState, SurfMemory};
use crate::collision::GroundProbe;
use crate::math::{clip_velocity, horizontal, remove_into_plane, VECTOR_EPSILON};

/// A rebuilt velocity must also beat the clipped one by this much (m/s).
const RECOVERY_MIN_DELTA: f32 = 0.05;

/// Result of post-collision surf handling.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub(crate) struct SurfContact {
    /// Ramp normal the actor is in contact with after the move.
    pub normal: Option<Vec3>,
    pub recovered: bool,
}

/// Rebuild velocity from `pre_velocity` when collision over-decelerated it.
///
/// Returns true when the rebuilt velocity was adopted.
pub(crate) fn recover_edge_speed(
    velocity: &mut Vec3,
    pre_velocity: Vec3,
    normal: Vec3,
    overbounce: f32,
) -> bool {
    let before = pre_velocity.length();
    let after = velocity.length();
    if before < VECTOR_EPSILON || after >= before * RECOVERY_TRIGGER_RATIO {
        return false;
    }

    let mut rebuilt = remove_into_plane(clip_velocity(pre_velocity, normal, overbounce), normal);
    let rebuilt_speed = rebuilt.length();
    if rebuilt_speed <= after * RECOVERY_MIN_GAIN + RECOVERY_MIN_DELTA {
        return false;
    }

    let cap = before * RECOVERY_SPEED_CAP;
    if rebuilt_speed > cap {
        rebuilt *= cap / rebuilt_speed;
    }

    log::trace!(
        "Edge speed recovery: {:.2} -> {:.2} m/s (was {:.2})",
        after,
        rebuilt.length(),
        before
    );
    *velocity = rebuilt;
    true
}

/// Re-establish surf contact after the bump loop.
///
/// Candidate normals in priority order: the fresh probe, the strongest
/// ramp normal hit during the loop, and the previous normal when the tick
/// started surfing on a real contact.
pub(crate) fn update_surf_contact(
    state: &mut MovementState,
    config: &MovementConfig,
    probe: Option<&GroundProbe>,
    slide: &SlideOutcome,
    pre_velocity: Vec3,
    surfing_on_contact: bool,
) -> SurfContact {
    let probe_normal = probe
        .filter(|p| config.is_surf_angle(p.slope_angle_deg))
        .filter(|p| state.velocity.dot(p.normal) <= LEAVE_SURFACE_SPEED)
        .map(|p| p.normal);
    let candidate = probe_normal
        .or(slide.strongest_surf_normal)
        .or_else(|| surfing_on_contact.then_some(state.surf.normal));

    if let Some(normal) = candidate {
        if !state.surf.active() {
            log::trace!("Surf contact acquired, normal {:?}", normal);
        }
        state.surf = SurfMemory {
            normal,
            grace_ticks: SURF_GRACE_TICKS,
        };
        if state.velocity.dot(normal) < 0.0 {
            state.velocity = clip_velocity(state.velocity, normal, config.overbounce);
        }
        let recovered = slide.hit_any
            && recover_edge_speed(&mut state.velocity, pre_velocity, normal, config.overbounce);
        return SurfContact {
            normal: Some(normal),
            recovered,
        };
    }

    if !state.surf.active() {
        return SurfContact::default();
    }

    let before = pre_velocity.length();
    let after = state.velocity.length();
    let severe_wall_drop =
        slide.hit_any && slide.wall_contact && after < before * SEVERE_WALL_DROP_RATIO;

    let mut recovered = false;
    if severe_wall_drop {
        recovered = recover_edge_speed(
            &mut state.velocity,
            pre_velocity,
            state.surf.normal,
            config.overbounce,
        );
        state.surf.grace_ticks -= 1;
    } else if slide.wall_contact && horizontal(state.velocity).length() > WALL_SLIDE_MIN_SPEED {
        state.surf.grace_ticks = (state.surf.grace_ticks - 1).max(SURF_GRACE_HOLD_MIN);
    } else {
        state.surf.grace_ticks -= 1;
        if state.surf.grace_ticks == 0 {
            log::trace!("Surf grace expired");
        }
    }

    SurfContact {
        normal: None,
        recovered,
    }
}
