pub mod model;

use anyhow::{Context, Result};
use std::path::Path;

pub use model::*;

/// Loads the configuration from a TOML file, or the defaults when `path` is
/// `None`.
pub fn load_config(path: Option<&Path>) -> Result<LabConfig> {
    let Some(path) = path else {
        return Ok(LabConfig::default());
    };
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", path.display()))?;
    parse_config(&contents).with_context(|| format!("Invalid config file {}", path.display()))
}

/// Parses and validates a TOML configuration document.
pub fn parse_config(contents: &str) -> Result<LabConfig> {
    let config: LabConfig = toml::from_str(contents).context("Failed to parse config")?;
    config.event_bus.validate()?;
    Ok(config)
}
