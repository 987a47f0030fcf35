//! Fixed-timestep driver loop.
//!
//! Frame times come from the scenario's synthetic wall clock. Each frame adds
//! its duration to an accumulator and runs as many fixed ticks as fit, so the
//! simulation never sees anything but the configured tick length.

use glam::Vec3;
use surfmove_physics::{MovementMode, MovementState, PlayerController};

use crate::scenario::Scenario;

/// Collision speed ratio counted as a severe drop in the run summary.
const SEVERE_DROP_RATIO: f32 = 0.25;
/// Minimum pre-collision speed for a drop to count.
const SEVERE_DROP_MIN_SPEED: f32 = 1.0;

/// Aggregate results of a run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunStats {
    pub ticks: u64,
    pub frames: u64,
    pub peak_speed: f32,
    pub final_speed: f32,
    pub final_position: Vec3,
    pub final_look: Vec3,
    pub surf_ticks: u64,
    pub ground_ticks: u64,
    pub jumps: u64,
    pub severe_drops: u64,
    pub edge_recoveries: u64,
}

pub struct Runner<'a> {
    controller: &'a PlayerController,
    scenario: &'a Scenario,
    state: MovementState,
    tick_duration: f32,
    accumulated_time: f32,
    hud_every: u64,
}

impl<'a> Runner<'a> {
    pub fn new(
        controller: &'a PlayerController,
        scenario: &'a Scenario,
        tick_rate: u32,
        hud_every: u64,
    ) -> Self {
        Self {
            controller,
            scenario,
            state: scenario.start.clone(),
            tick_duration: 1.0 / tick_rate.max(1) as f32,
            accumulated_time: 0.0,
            hud_every,
        }
    }

    pub fn state(&self) -> &MovementState {
        &self.state
    }

    /// Run until `ticks` fixed ticks have been simulated.
    pub fn run(&mut self, ticks: u64) -> RunStats {
        let mut stats = RunStats::default();
        let frame_times = self.scenario.frame_times();

        while stats.ticks < ticks {
            let frame_time = frame_times[(stats.frames as usize) % frame_times.len()];
            stats.frames += 1;
            self.accumulated_time += frame_time;

            while self.accumulated_time >= self.tick_duration && stats.ticks < ticks {
                self.tick(&mut stats);
                self.accumulated_time -= self.tick_duration;
            }
        }

        stats.final_speed = self.state.horizontal_speed();
        stats.final_position = self.state.position;
        stats.final_look = self.state.look_direction();
        stats
    }

    fn tick(&mut self, stats: &mut RunStats) {
        let command = self.scenario.command(stats.ticks, &self.state);
        let debug = self
            .controller
            .update(&mut self.state, &command, &self.scenario.world, self.tick_duration);
        stats.ticks += 1;

        stats.peak_speed = stats.peak_speed.max(debug.speed);
        match debug.mode {
            MovementMode::Surf => stats.surf_ticks += 1,
            MovementMode::Ground => stats.ground_ticks += 1,
            MovementMode::Air => {}
        }
        stats.jumps += u64::from(debug.jumped);
        stats.edge_recoveries += u64::from(debug.edge_recovery);
        if debug.collision_speed_before > SEVERE_DROP_MIN_SPEED
            && debug.collision_speed_after < debug.collision_speed_before * SEVERE_DROP_RATIO
        {
            stats.severe_drops += 1;
            log::warn!(
                "Tick {}: collision speed {:.2} -> {:.2}",
                stats.ticks,
                debug.collision_speed_before,
                debug.collision_speed_after
            );
        }

        if self.hud_every > 0 && stats.ticks % self.hud_every == 0 {
            log::info!(
                "[{:>5}] {:>6} speed {:6.2} vz {:6.2} slope {} strafe {} grace {}",
                stats.ticks,
                debug.mode.as_str(),
                debug.speed,
                debug.vertical_speed,
                debug
                    .slope_angle_deg
                    .map(|a| format!("{a:5.1}"))
                    .unwrap_or_else(|| "  -  ".to_string()),
                debug.strafe_hint.as_str(),
                debug.surf_grace_ticks
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::ScenarioKind;
    use surfmove_physics::MovementConfig;

    #[test]
    fn test_runs_exact_tick_count() {
        let controller = PlayerController::with_default_config();
        let scenario = Scenario::build(ScenarioKind::Strafe, controller.capsule).unwrap();
        let mut runner = Runner::new(&controller, &scenario, 128, 0);

        let stats = runner.run(50);
        assert_eq!(stats.ticks, 50);
        assert!(stats.frames > 0);
        assert_eq!(stats.final_position, runner.state().position);
        assert_eq!(stats.final_look, runner.state().look_direction());
        assert!((stats.final_look.length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_strafe_run_gains_speed() {
        let controller = PlayerController::with_default_config();
        let scenario = Scenario::build(ScenarioKind::Strafe, controller.capsule).unwrap();
        let stats = Runner::new(&controller, &scenario, 128, 0).run(160);

        assert!(stats.final_speed > 6.25, "Strafing should gain speed, got {}", stats.final_speed);
        assert_eq!(stats.ground_ticks, 0);
    }

    #[test]
    fn test_bhop_run_hops() {
        let controller = PlayerController::new(MovementConfig::default().with_max_speed(9.0));
        let scenario = Scenario::build(ScenarioKind::Bhop, controller.capsule).unwrap();
        let stats = Runner::new(&controller, &scenario, 128, 0).run(460);

        assert!(stats.jumps >= 3, "Expected chained hops, got {}", stats.jumps);
        assert!(stats.peak_speed > 8.5);
    }
}
