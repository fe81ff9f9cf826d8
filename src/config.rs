use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::compose::LineWeights;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "CLIMATE_VIEWER_CONFIG";
/// Environment variable overriding [`AppConfig::data_file`].
pub const DATA_ENV: &str = "CLIMATE_VIEWER_DATA";
const DEFAULT_CONFIG_FILE: &str = "climate-viewer.json";

// ---------------------------------------------------------------------------
// Application configuration
// ---------------------------------------------------------------------------

/// Startup settings. Every field has a default, so an absent or partial
/// config file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Dataset loaded at startup, if any.
    pub data_file: Option<PathBuf>,
    /// Initial moving-average window in years.
    pub moving_average_window: usize,
    pub line_weights: LineWeights,
    pub dark_mode: bool,
    /// `env_logger` filter used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_file: None,
            moving_average_window: 5,
            line_weights: LineWeights::default(),
            dark_mode: false,
            log_level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Parse a config from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: AppConfig = serde_json::from_str(text).context("parsing config JSON")?;
        Ok(config.sanitized())
    }

    /// Read a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_json(&text)
    }

    /// Load from `$CLIMATE_VIEWER_CONFIG` (or `climate-viewer.json` in the
    /// working directory when it exists), then apply `$CLIMATE_VIEWER_DATA`.
    pub fn load() -> Result<Self> {
        let mut config = match std::env::var_os(CONFIG_ENV) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        if let Some(data) = std::env::var_os(DATA_ENV) {
            config.data_file = Some(PathBuf::from(data));
        }
        Ok(config)
    }

    /// Replace values the analytics cannot use with their defaults.
    fn sanitized(mut self) -> Self {
        if self.moving_average_window == 0 {
            self.moving_average_window = AppConfig::default().moving_average_window;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let config = AppConfig::from_json(r#"{ "dark_mode": true, "line_weights": { "raw": 3.0 } }"#).unwrap();
        assert!(config.dark_mode);
        assert_eq!(config.moving_average_window, 5);
        assert_eq!(config.line_weights.raw, 3.0);
        assert_eq!(config.line_weights.raw_with_overlay, 1.5);
        assert_eq!(config.data_file, None);
    }

    #[test]
    fn zero_window_falls_back() {
        let config = AppConfig::from_json(r#"{ "moving_average_window": 0 }"#).unwrap();
        assert_eq!(config.moving_average_window, 5);
    }
}
