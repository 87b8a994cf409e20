//! Configuration file support for deskwatch.
//!
//! Configuration is loaded once at startup from
//! `$XDG_CONFIG_HOME/deskwatch/config.toml` and never changes afterwards.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub thresholds: Thresholds,

    #[serde(default)]
    pub cadence: CadenceConfig,

    #[serde(default)]
    pub sensor: SensorConfig,

    #[serde(default)]
    pub indicator: IndicatorConfig,
}

/// Posture thresholds
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thresholds {
    /// Readings at or below this distance classify as standing (sensor units)
    #[serde(default = "default_standing_cutoff")]
    pub standing_cutoff: u32,

    /// Sitting dwell that must be exceeded before the warning fires
    #[serde(default = "default_grace_period_secs")]
    pub grace_period_secs: u64,

    /// Standing dwell that must be exceeded for a standing occupancy to count
    #[serde(default = "default_standing_goal_secs")]
    pub standing_goal_secs: u64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            standing_cutoff: default_standing_cutoff(),
            grace_period_secs: default_grace_period_secs(),
            standing_goal_secs: default_standing_goal_secs(),
        }
    }
}

/// Polling cadence
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CadenceConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Sample again immediately after a transition instead of waiting
    #[serde(default = "default_resample_on_transition")]
    pub resample_on_transition: bool,
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            resample_on_transition: default_resample_on_transition(),
        }
    }
}

/// Distance sensor configuration
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SensorConfig {
    /// Text file holding the current reading, e.g. an IIO `in_distance_raw`
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Consecutive failed reads tolerated before forcing the sitting fallback
    #[serde(default = "default_max_missed_reads")]
    pub max_missed_reads: u32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_missed_reads: default_max_missed_reads(),
        }
    }
}

/// Indicator output configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct IndicatorConfig {
    /// File receiving the discrete color code; log-only when unset
    #[serde(default)]
    pub path: Option<PathBuf>,
}

// Default value functions
fn default_standing_cutoff() -> u32 {
    25
}

fn default_grace_period_secs() -> u64 {
    1500 // 25 minutes
}

fn default_standing_goal_secs() -> u64 {
    300 // 5 minutes
}

fn default_interval_secs() -> u64 {
    1
}

fn default_resample_on_transition() -> bool {
    true
}

fn default_max_missed_reads() -> u32 {
    5
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path()?;
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> Result<PathBuf> {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .ok_or_else(|| Error::Config("Unable to locate a config directory".into()))?;
        Ok(base.join("deskwatch").join("config.toml"))
    }

    /// Save the configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = self.to_toml()?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Render the configuration as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))
    }

    /// Check the configuration for values the control loop cannot run with
    ///
    /// Returns a list of problems; empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.cadence.interval_secs == 0 {
            errors.push("cadence.interval_secs must be at least 1".to_string());
        }
        if self.thresholds.grace_period_secs == 0 {
            errors.push("thresholds.grace_period_secs must be at least 1".to_string());
        }
        if self.thresholds.standing_goal_secs == 0 {
            errors.push("thresholds.standing_goal_secs must be at least 1".to_string());
        }

        errors
    }
}
