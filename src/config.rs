use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Largest day count accepted for windows and horizons (about ten years)
pub const MAX_WINDOW_DAYS: u32 = 3650;

/// User settings stored in config.json
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Days shown in the daily series of `summary` and the timer screen
    #[serde(default = "default_summary_days")]
    pub summary_days: u32,
    /// How far ahead `due` looks for upcoming deadlines
    #[serde(default = "default_due_horizon_days")]
    pub due_horizon_days: u32,
    /// Send a desktop notification when the timer saves a record
    #[serde(default = "default_true")]
    pub notify_on_save: bool,
}

fn default_summary_days() -> u32 {
    7
}

fn default_due_horizon_days() -> u32 {
    7
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            summary_days: default_summary_days(),
            due_horizon_days: default_due_horizon_days(),
            notify_on_save: true,
        }
    }
}

/// Load config from config.json, defaults when the file doesn't exist
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();

    if !path.exists() {
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let mut config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Invalid config: {}", path.display()))?;
    if config.summary_days > MAX_WINDOW_DAYS || config.due_horizon_days > MAX_WINDOW_DAYS {
        tracing::warn!(max = MAX_WINDOW_DAYS, "config day counts clamped");
        config.summary_days = config.summary_days.min(MAX_WINDOW_DAYS);
        config.due_horizon_days = config.due_horizon_days.min(MAX_WINDOW_DAYS);
    }
    tracing::debug!(?config, "loaded config");
    Ok(config)
}

/// Save config to config.json
pub fn save_config<P: AsRef<Path>>(path: P, config: &Config) -> Result<()> {
    let json = serde_json::to_string_pretty(config)?;
    crate::store::files::atomic_write(path, &json)?;
    Ok(())
}
