//! Movement configuration (cvars) and fixed tuning constants.
//!
//! [`MovementConfig`] holds everything a console or menu may change between
//! ticks. The constants further down are empirically tuned heuristics that
//! are not exposed as cvars; changing any of them is a tuning decision.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Fixed tuning constants
// ============================================================================

/// Downward reach of the ground probe (meters).
pub const GROUND_PROBE_DISTANCE: f32 = 0.18;

/// Upper bound for the walkable slope angle (degrees).
pub const WALKABLE_ANGLE_CAP_DEG: f32 = 40.0;

/// Gap kept between the walkable angle and the surf minimum (degrees).
pub const WALKABLE_SURF_MARGIN_DEG: f32 = 0.5;

/// Ticks of surf-contact memory after the last real ramp contact.
pub const SURF_GRACE_TICKS: u32 = 20;

/// Grace floor while still sliding fast along a wall-like surface.
pub const SURF_GRACE_HOLD_MIN: u32 = 2;

/// Separating speed along a contact normal above which the contact is
/// treated as left behind (m/s).
pub const LEAVE_SURFACE_SPEED: f32 = 1.0;

/// Horizontal speed needed to keep surfing over a nearly flat probe at a
/// ramp edge (m/s).
pub const EDGE_SURF_MIN_SPEED: f32 = 1.0;

/// Probe slope above which the edge surf override may apply (degrees).
pub const EDGE_SURF_MIN_SLOPE_DEG: f32 = 1.0;

/// Fraction of max speed above which a ramp exit keeps its launch.
pub const LAUNCH_SPEED_FRACTION: f32 = 0.9;

/// Vertical speed below which a ramp exit counts as level (m/s).
pub const LAUNCH_MAX_VERTICAL_SPEED: f32 = 0.5;

/// Iterations of the sliding collision loop per tick.
pub const MAX_BUMPS: usize = 4;

/// Blocking planes remembered within one tick.
pub const MAX_CLIP_PLANES: usize = 4;

/// Trace fractions below this count as a stall.
pub const STALL_FRACTION: f32 = 1e-3;

/// Forward nudge applied on a stall (meters).
pub const STALL_NUDGE: f32 = 0.005;

/// Normals with |y| below this are wall-like (roughly steeper than 80°).
pub const WALL_NORMAL_MAX_Y: f32 = 0.17;

/// Horizontal speed needed for the ramp-side edge passthrough (m/s).
pub const EDGE_CLIP_MIN_SPEED: f32 = 4.0;

/// Upward speed above which the edge passthrough is not attempted (m/s).
pub const EDGE_CLIP_MAX_UPWARD_SPEED: f32 = 2.0;

/// How squarely the velocity must point into the wall, as -v̂·n.
pub const EDGE_CLIP_MIN_INTO: f32 = 0.3;

/// Passthrough distance at `sv_edgeclip_assist = 1` (meters).
pub const EDGE_CLIP_PASSTHROUGH: f32 = 0.04;

/// Edge speed recovery runs when speed falls below this share of the
/// pre-collision speed.
pub const RECOVERY_TRIGGER_RATIO: f32 = 0.6;

/// Recovered speed never exceeds this share of the pre-collision speed.
pub const RECOVERY_SPEED_CAP: f32 = 0.97;

/// A rebuilt velocity must beat the clipped one by this factor.
pub const RECOVERY_MIN_GAIN: f32 = 1.05;

/// Speed loss share that counts as severe against a wall with no surf contact.
pub const SEVERE_WALL_DROP_RATIO: f32 = 0.5;

/// Horizontal speed that keeps grace held while sliding along a wall (m/s).
pub const WALL_SLIDE_MIN_SPEED: f32 = 4.0;

/// Walkable ground within this distance is snapped onto (meters).
pub const GROUND_SNAP_DISTANCE: f32 = 0.12;

/// Debug warning when more than this share of speed is lost in collision.
pub const SPEED_DROP_WARNING_RATIO: f32 = 0.5;

/// Pitch limit in degrees.
pub const PITCH_LIMIT_DEG: f32 = 89.0;

// ============================================================================
// Cvars
// ============================================================================

/// Every cvar name accepted by [`MovementConfig::set_cvar`].
pub const CVAR_NAMES: &[&str] = &[
    "sv_gravity",
    "sv_accelerate",
    "sv_airaccelerate",
    "sv_friction",
    "sv_stopspeed",
    "sv_maxspeed",
    "sv_jump_impulse",
    "sv_bhop",
    "sv_autobhop",
    "sv_surf_min_angle",
    "sv_surf_max_angle",
    "sv_surf_friction",
    "sv_edgeclip_assist",
    "sv_overbounce",
];

/// Errors from named cvar access.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CvarError {
    #[error("unknown cvar `{0}`")]
    UnknownCvar(String),

    #[error("invalid value `{value}` for cvar `{name}`")]
    InvalidValue { name: String, value: String },
}

/// Value of a single cvar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CvarValue {
    Float(f32),
    Bool(bool),
}

impl fmt::Display for CvarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float(v) => write!(f, "{}", v),
            Self::Bool(v) => write!(f, "{}", u8::from(*v)),
        }
    }
}

/// Tunable movement parameters.
///
/// All values use metric units (meters, seconds, degrees). Serialized keys
/// use the Source-style cvar names; missing keys fall back to defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    // ========================================================================
    // Physics
    // ========================================================================
    /// Gravity acceleration (meters/second²).
    #[serde(rename = "sv_gravity")]
    pub gravity: f32,

    /// Ground acceleration factor.
    #[serde(rename = "sv_accelerate")]
    pub accelerate: f32,

    /// Air (and surf) acceleration factor.
    #[serde(rename = "sv_airaccelerate")]
    pub air_accelerate: f32,

    /// Ground friction coefficient.
    #[serde(rename = "sv_friction")]
    pub friction: f32,

    /// Friction control speed floor (meters/second).
    #[serde(rename = "sv_stopspeed")]
    pub stop_speed: f32,

    /// Wish speed cap and ground speed cap (meters/second).
    #[serde(rename = "sv_maxspeed")]
    pub max_speed: f32,

    /// Vertical velocity set by a jump (meters/second).
    #[serde(rename = "sv_jump_impulse")]
    pub jump_impulse: f32,

    // ========================================================================
    // Bunnyhop
    // ========================================================================
    /// Jumping enabled.
    #[serde(rename = "sv_bhop")]
    pub bhop: bool,

    /// Holding jump re-jumps on every landing.
    #[serde(rename = "sv_autobhop")]
    pub auto_bhop: bool,

    // ========================================================================
    // Surf
    // ========================================================================
    /// Shallowest surfable slope (degrees from up).
    #[serde(rename = "sv_surf_min_angle")]
    pub surf_min_angle_deg: f32,

    /// Steepest surfable slope (degrees from up).
    #[serde(rename = "sv_surf_max_angle")]
    pub surf_max_angle_deg: f32,

    /// Per-tick velocity loss on a ramp; 0 disables it.
    #[serde(rename = "sv_surf_friction")]
    pub surf_friction: f32,

    /// Scale of the ramp side edge passthrough; 0 disables it.
    #[serde(rename = "sv_edgeclip_assist")]
    pub edge_clip_assist: f32,

    // ========================================================================
    // Collision
    // ========================================================================
    /// Overbounce factor for velocity clipping (prevents sticking).
    #[serde(rename = "sv_overbounce")]
    pub overbounce: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            gravity: 20.0,
            accelerate: 10.0,
            air_accelerate: 10.0,
            friction: 4.0,
            stop_speed: 2.5,
            max_speed: 8.0,       // ~29 km/h running
            jump_impulse: 6.5,    // Gives ~1m jump height

            bhop: true,
            auto_bhop: false,

            surf_min_angle_deg: 45.0,
            surf_max_angle_deg: 85.0,
            surf_friction: 0.0,
            edge_clip_assist: 1.0,

            overbounce: 1.001,
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

impl MovementConfig {
    /// Slopes up to this angle are walkable ground.
    pub fn walkable_angle_deg(&self) -> f32 {
        WALKABLE_ANGLE_CAP_DEG.min(self.surf_min_angle_deg - WALKABLE_SURF_MARGIN_DEG)
    }

    /// Whether a slope angle (degrees from up) is a surfable ramp.
    pub fn is_surf_angle(&self, angle_deg: f32) -> bool {
        angle_deg > self.walkable_angle_deg()
            && angle_deg >= self.surf_min_angle_deg
            && angle_deg <= self.surf_max_angle_deg
    }

    /// Set a cvar from console text.
    pub fn set_cvar(&mut self, name: &str, value: &str) -> Result<(), CvarError> {
        let invalid = || CvarError::InvalidValue {
            name: name.to_string(),
            value: value.to_string(),
        };
        let float = || {
            value
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(invalid)
        };
        let boolean = || parse_bool(value).ok_or_else(invalid);

        match name {
            "sv_gravity" => self.gravity = float()?,
            "sv_accelerate" => self.accelerate = float()?,
            "sv_airaccelerate" => self.air_accelerate = float()?,
            "sv_friction" => self.friction = float()?,
            "sv_stopspeed" => self.stop_speed = float()?,
            "sv_maxspeed" => self.max_speed = float()?,
            "sv_jump_impulse" => self.jump_impulse = float()?,
            "sv_bhop" => self.bhop = boolean()?,
            "sv_autobhop" => self.auto_bhop = boolean()?,
            "sv_surf_min_angle" => self.surf_min_angle_deg = float()?,
            "sv_surf_max_angle" => self.surf_max_angle_deg = float()?,
            "sv_surf_friction" => self.surf_friction = float()?,
            "sv_edgeclip_assist" => self.edge_clip_assist = float()?,
            "sv_overbounce" => self.overbounce = float()?,
            _ => return Err(CvarError::UnknownCvar(name.to_string())),
        }
        Ok(())
    }

    /// Read a cvar by name.
    pub fn get_cvar(&self, name: &str) -> Option<CvarValue> {
        let value = match name {
            "sv_gravity" => CvarValue::Float(self.gravity),
            "sv_accelerate" => CvarValue::Float(self.accelerate),
            "sv_airaccelerate" => CvarValue::Float(self.air_accelerate),
            "sv_friction" => CvarValue::Float(self.friction),
            "sv_stopspeed" => CvarValue::Float(self.stop_speed),
            "sv_maxspeed" => CvarValue::Float(self.max_speed),
            "sv_jump_impulse" => CvarValue::Float(self.jump_impulse),
            "sv_bhop" => CvarValue::Bool(self.bhop),
            "sv_autobhop" => CvarValue::Bool(self.auto_bhop),
            "sv_surf_min_angle" => CvarValue::Float(self.surf_min_angle_deg),
            "sv_surf_max_angle" => CvarValue::Float(self.surf_max_angle_deg),
            "sv_surf_friction" => CvarValue::Float(self.surf_friction),
            "sv_edgeclip_assist" => CvarValue::Float(self.edge_clip_assist),
            "sv_overbounce" => CvarValue::Float(self.overbounce),
            _ => return None,
        };
        Some(value)
    }

    pub fn with_gravity(mut self, gravity: f32) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn with_accelerate(mut self, accelerate: f32) -> Self {
        self.accelerate = accelerate;
        self
    }

    pub fn with_air_accelerate(mut self, air_accelerate: f32) -> Self {
        self.air_accelerate = air_accelerate;
        self
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction;
        self
    }

    pub fn with_max_speed(mut self, max_speed: f32) -> Self {
        self.max_speed = max_speed;
        self
    }

    pub fn with_jump_impulse(mut self, jump_impulse: f32) -> Self {
        self.jump_impulse = jump_impulse;
        self
    }

    pub fn with_bhop(mut self, bhop: bool) -> Self {
        self.bhop = bhop;
        self
    }

    pub fn with_auto_bhop(mut self, auto_bhop: bool) -> Self {
        self.auto_bhop = auto_bhop;
        self
    }

    pub fn with_surf_angles(mut self, min_deg: f32, max_deg: f32) -> Self {
        self.surf_min_angle_deg = min_deg;
        self.surf_max_angle_deg = max_deg;
        self
    }

    pub fn with_surf_friction(mut self, surf_friction: f32) -> Self {
        self.surf_friction = surf_friction;
        self
    }

    pub fn with_edge_clip_assist(mut self, edge_clip_assist: f32) -> Self {
        self.edge_clip_assist = edge_clip_assist;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MovementConfig::default();
        assert!(config.max_speed > 0.0);
        assert!(config.gravity > 0.0);
        assert!(config.surf_min_angle_deg < config.surf_max_angle_deg);
    }

    #[test]
    fn test_walkable_angle() {
        let config = MovementConfig::default();
        assert_eq!(config.walkable_angle_deg(), 40.0);

        let low = MovementConfig::default().with_surf_angles(30.0, 80.0);
        assert_eq!(low.walkable_angle_deg(), 29.5);
    }

    #[test]
    fn test_surf_angle_range() {
        let config = MovementConfig::default();
        assert!(!config.is_surf_angle(30.0));
        assert!(!config.is_surf_angle(44.0));
        assert!(config.is_surf_angle(45.0));
        assert!(config.is_surf_angle(55.0));
        assert!(config.is_surf_angle(85.0));
        assert!(!config.is_surf_angle(88.0));
    }

    #[test]
    fn test_set_and_get_cvars() {
        let mut config = MovementConfig::default();
        config.set_cvar("sv_maxspeed", "9").unwrap();
        config.set_cvar("sv_autobhop", "1").unwrap();
        config.set_cvar("sv_bhop", "off").unwrap();

        assert_eq!(config.max_speed, 9.0);
        assert!(config.auto_bhop);
        assert!(!config.bhop);
        assert_eq!(config.get_cvar("sv_maxspeed"), Some(CvarValue::Float(9.0)));
        assert_eq!(config.get_cvar("sv_autobhop"), Some(CvarValue::Bool(true)));
    }

    #[test]
    fn test_cvar_errors() {
        let mut config = MovementConfig::default();
        assert_eq!(
            config.set_cvar("sv_cheats", "1"),
            Err(CvarError::UnknownCvar("sv_cheats".into()))
        );
        assert!(matches!(
            config.set_cvar("sv_gravity", "heavy"),
            Err(CvarError::InvalidValue { .. })
        ));
        assert!(config.set_cvar("sv_gravity", "NaN").is_err());
        assert!(config.set_cvar("sv_autobhop", "maybe").is_err());
        assert_eq!(config, MovementConfig::default(), "failed sets must not change anything");
    }

    #[test]
    fn test_every_cvar_name_round_trips() {
        let mut config = MovementConfig::default();
        for name in CVAR_NAMES {
            let value = config.get_cvar(name).expect("listed cvar must be readable");
            config
                .set_cvar(name, &value.to_string())
                .expect("displayed value must parse back");
        }
        assert_eq!(config, MovementConfig::default());
    }

    #[test]
    fn test_builders() {
        let config = MovementConfig::default()
            .with_max_speed(9.0)
            .with_auto_bhop(true)
            .with_edge_clip_assist(0.0);
        assert_eq!(config.max_speed, 9.0);
        assert!(config.auto_bhop);
        assert_eq!(config.edge_clip_assist, 0.0);
    }
}
