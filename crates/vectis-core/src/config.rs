//! Editor configuration
//!
//! Tunables for the editing core: merge coalescing window, history depth,
//! geometric tolerances and the event bus. Supports JSON and TOML files.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{ConfigError, Result};
use crate::event_bus::EventBusConfig;

/// Editing core configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Maximum age difference, in milliseconds, for two commands to coalesce
    pub merge_window_ms: u64,
    /// Maximum number of undo entries kept (0 = unlimited)
    pub max_history_depth: usize,
    /// Extra slack added to stroke widths when hit testing
    pub hit_test_tolerance: f64,
    /// Curve flattening tolerance used for stroke hit testing
    pub flatten_tolerance: f64,
    /// Event bus settings
    pub events: EventBusConfig,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            merge_window_ms: 500,
            max_history_depth: 0,
            hit_test_tolerance: 0.1,
            flatten_tolerance: 0.05,
            events: EventBusConfig::default(),
        }
    }
}

impl EditorConfig {
    /// Merge window as a duration
    pub fn merge_window(&self) -> Duration {
        Duration::from_millis(self.merge_window_ms)
    }

    /// Load configuration from file (JSON or TOML by extension)
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = match extension(path) {
            Some("json") => serde_json::from_str(&content).map_err(ConfigError::from)?,
            Some("toml") => toml::from_str(&content).map_err(ConfigError::from)?,
            _ => {
                return Err(ConfigError::UnsupportedFormat(path.display().to_string()).into());
            }
        };

        config.validate()?;
        tracing::debug!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to file (JSON or TOML by extension)
    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        self.validate()?;

        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self).map_err(ConfigError::from)?,
            Some("toml") => toml::to_string_pretty(self).map_err(ConfigError::from)?,
            _ => {
                return Err(ConfigError::UnsupportedFormat(path.display().to_string()).into());
            }
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate all settings
    pub fn validate(&self) -> Result<()> {
        if !(self.hit_test_tolerance.is_finite() && self.hit_test_tolerance >= 0.0) {
            return Err(invalid("hit_test_tolerance", "must be a finite value >= 0"));
        }
        if !(self.flatten_tolerance.is_finite() && self.flatten_tolerance > 0.0) {
            return Err(invalid("flatten_tolerance", "must be a finite value > 0"));
        }
        if self.events.channel_capacity == 0 {
            return Err(invalid("events.channel_capacity", "must be > 0"));
        }
        Ok(())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

fn invalid(key: &str, reason: &str) -> crate::error::Error {
    ConfigError::InvalidSetting {
        key: key.to_string(),
        reason: reason.to_string(),
    }
    .into()
}
