//! Surfmove - headless driver for the movement core.
//!
//! Runs scripted scenarios against synthetic geometry and logs a HUD line
//! every few ticks. Set `RUST_LOG=info` (or `trace` for per-tick mode
//! transitions) to see output.

mod runner;
mod scenario;
mod settings;

use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::{Parser, Subcommand};
use surfmove_physics::movement::CVAR_NAMES;
use surfmove_physics::PlayerController;

use crate::runner::Runner;
use crate::scenario::{Scenario, ScenarioKind};

#[derive(Parser)]
#[command(name = "surfmove")]
#[command(about = "Source-style movement core driver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a scripted scenario
    Run {
        #[arg(long, value_enum, default_value_t = ScenarioKind::Surf)]
        scenario: ScenarioKind,
        /// Number of fixed ticks to simulate
        #[arg(long, default_value_t = 600)]
        ticks: u64,
        /// Simulation ticks per second
        #[arg(long, default_value_t = 128)]
        tick_rate: u32,
        /// TOML file of cvars
        #[arg(long)]
        config: Option<PathBuf>,
        /// Cvar override as name=value (repeatable)
        #[arg(long = "set", value_parser = settings::parse_override)]
        overrides: Vec<(String, String)>,
        /// Log a HUD line every N ticks (0 disables)
        #[arg(long, default_value_t = 32)]
        hud_every: u64,
    },
    /// Print every cvar and its value
    Cvars {
        /// TOML file of cvars
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            scenario,
            ticks,
            tick_rate,
            config,
            overrides,
            hud_every,
        } => {
            ensure!(tick_rate > 0, "tick rate must be positive");
            let config = settings::load_config(config.as_deref(), &overrides)?;
            let controller = PlayerController::new(config);
            let scenario = Scenario::build(scenario, controller.capsule)?;

            let stats = Runner::new(&controller, &scenario, tick_rate, hud_every).run(ticks);
            log::info!(
                "Done: {} ticks over {} frames, peak {:.2} m/s, final {:.2} m/s at {:?}",
                stats.ticks,
                stats.frames,
                stats.peak_speed,
                stats.final_speed,
                stats.final_position
            );
            log::info!("Final look direction {:?}", stats.final_look);
            log::info!(
                "Surf ticks {}, ground ticks {}, jumps {}, severe drops {}, edge recoveries {}",
                stats.surf_ticks,
                stats.ground_ticks,
                stats.jumps,
                stats.severe_drops,
                stats.edge_recoveries
            );
        }
        Commands::Cvars { config } => {
            let config = settings::load_config(config.as_deref(), &[])?;
            for name in CVAR_NAMES {
                if let Some(value) = config.get_cvar(name) {
                    println!("{name} {value}");
                }
            }
        }
    }

    Ok(())
}
