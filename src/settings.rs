//! Cvar loading for the headless driver.

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use surfmove_physics::MovementConfig;

/// Parse a `name=value` cvar override from the command line.
pub fn parse_override(text: &str) -> Result<(String, String)> {
    let (name, value) = text
        .split_once('=')
        .ok_or_else(|| anyhow!("expected name=value, got `{text}`"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(anyhow!("missing cvar name in `{text}`"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Parse a TOML cvar file. Missing keys keep their defaults.
pub fn parse_config(content: &str) -> Result<MovementConfig> {
    toml::from_str(content).context("invalid cvar file")
}

/// Build the movement config from an optional file plus overrides, applied in order.
pub fn load_config(path: Option<&Path>, overrides: &[(String, String)]) -> Result<MovementConfig> {
    let mut config = match path {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            let config = parse_config(&content).with_context(|| format!("in {}", path.display()))?;
            log::info!("Loaded cvars from {}", path.display());
            config
        }
        None => MovementConfig::default(),
    };

    for (name, value) in overrides {
        config.set_cvar(name, value)?;
        log::debug!("{name} = {value}");
    }

    Ok(config)
}
