//! Bridge configuration.
//!
//! Loaded from TOML. Every field has a default, so an empty file (or no file)
//! gives the standard behaviour: `contanki` namespace, 50 ms polling,
//! edge-triggered emission, most-capable selection.
//!
//! ```toml
//! namespace = "contanki"
//! poll_interval_ms = 50
//! handshake_retry_ms = 1000
//! emission = "edge"          # or "snapshot"
//! selection = "most_capable" # or "first_seen"
//! axis_epsilon = 0.0
//! scan_on_ready = true
//! ```

use crate::command::FIELD_SEP;
use crate::error::ConfigError;
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable naming a config file for the CLI.
pub const CONFIG_ENV: &str = "PADBRIDGE_CONFIG";

/// How poll ticks are reported to the sink.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmissionMode {
    /// One `press`/`axis` command per changed field; nothing when idle.
    #[default]
    #[serde(alias = "edge_triggered")]
    Edge,
    /// One `poll` command with the full state every tick.
    Snapshot,
}

/// Which device to activate when several are present.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionPolicy {
    /// Most digital inputs wins; the first one seen wins ties.
    #[default]
    MostCapable,
    /// Lowest slot index wins.
    FirstSeen,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Prefix of every command, e.g. `contanki` in `contanki::on_connect::...`.
    pub namespace: String,
    pub poll_interval_ms: u64,
    pub handshake_retry_ms: u64,
    pub emission: EmissionMode,
    pub selection: SelectionPolicy,
    /// Minimum axis movement reported in edge mode.
    pub axis_epsilon: f32,
    /// Run discovery right after the handshake if devices are already present.
    pub scan_on_ready: bool,
    /// Text of the message sent when discovery finds nothing.
    pub no_device_message: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            namespace: "contanki".to_string(),
            poll_interval_ms: 50,
            handshake_retry_ms: 1000,
            emission: EmissionMode::default(),
            selection: SelectionPolicy::default(),
            axis_epsilon: 0.0,
            scan_on_ready: true,
            no_device_message:
                "No controllers detected. Please reconnect your controller and try again."
                    .to_string(),
        }
    }
}

impl BridgeConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: BridgeConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!("Loaded config: {}", path.display());
        Ok(config)
    }

    pub fn to_toml_string(&self) -> String {
        // Every field is a plain scalar, serialization cannot fail.
        toml::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.namespace.is_empty() {
            return Err(ConfigError::Invalid("namespace must not be empty".into()));
        }
        if self.namespace.contains(FIELD_SEP) {
            return Err(ConfigError::Invalid(format!(
                "namespace `{}` must not contain `{FIELD_SEP}`",
                self.namespace
            )));
        }
        if self.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid("poll_interval_ms must be > 0".into()));
        }
        if self.handshake_retry_ms == 0 {
            return Err(ConfigError::Invalid("handshake_retry_ms must be > 0".into()));
        }
        if self.axis_epsilon.is_nan() || self.axis_epsilon < 0.0 {
            return Err(ConfigError::Invalid("axis_epsilon must be >= 0".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[inline]
    pub fn handshake_retry(&self) -> Duration {
        Duration::from_millis(self.handshake_retry_ms)
    }
}
