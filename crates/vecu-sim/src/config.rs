//! Simulator configuration
//!
//! File-driven configuration with per-field defaults, so a partial config
//! (or none at all) yields a working simulator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors loading or validating a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    Parse { path: String, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Complete simulator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimConfig {
    /// CAN interface name
    #[serde(default = "default_interface")]
    pub interface: String,

    /// Simulation tick size, milliseconds
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,

    /// Broadcast periods per message
    #[serde(default)]
    pub broadcast: BroadcastConfig,
}

/// Broadcast periods, milliseconds per message identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastConfig {
    #[serde(default = "default_engine1_ms")]
    pub engine1_ms: u64,

    #[serde(default = "default_engine2_ms")]
    pub engine2_ms: u64,

    #[serde(default = "default_trans_ms")]
    pub trans_ms: u64,

    #[serde(default = "default_bcm_ms")]
    pub bcm_ms: u64,
}

fn default_interface() -> String {
    "vcan0".to_string()
}

fn default_tick_ms() -> u64 {
    1
}

fn default_engine1_ms() -> u64 {
    10
}

fn default_engine2_ms() -> u64 {
    100
}

fn default_trans_ms() -> u64 {
    50
}

fn default_bcm_ms() -> u64 {
    100
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            tick_ms: default_tick_ms(),
            broadcast: BroadcastConfig::default(),
        }
    }
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            engine1_ms: default_engine1_ms(),
            engine2_ms: default_engine2_ms(),
            trans_ms: default_trans_ms(),
            bcm_ms: default_bcm_ms(),
        }
    }
}

impl SimConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Load configuration from a YAML file.
    pub fn load_yaml(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            source: e,
        })?;
        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Check the configuration for values the simulator cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_ms == 0 {
            return Err(ConfigError::Invalid("tick_ms must be at least 1".into()));
        }
        let periods = [
            ("engine1_ms", self.broadcast.engine1_ms),
            ("engine2_ms", self.broadcast.engine2_ms),
            ("trans_ms", self.broadcast.trans_ms),
            ("bcm_ms", self.broadcast.bcm_ms),
        ];
        for (name, period) in periods {
            if period == 0 {
                return Err(ConfigError::Invalid(format!(
                    "broadcast period {} must be at least 1 ms",
                    name
                )));
            }
        }
        Ok(())
    }
}
