//! Datacube configuration
//!
//! Every field is optional in the JSON form and falls back to its default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{log_event, LogEvent, Logger, Severity};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tunables shared by a datacube tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CubeConfig {
    /// Rows reserved beyond the required row when staged capacity grows
    #[serde(default = "default_append_reserve")]
    pub append_reserve: usize,

    /// Attempts for `New_<n>` auto naming
    #[serde(default = "default_max_auto_names")]
    pub max_auto_names: usize,

    /// Absolute tolerance used by `search_default`
    #[serde(default = "default_search_tolerance")]
    pub search_tolerance: f64,

    /// Minimum log severity ("trace", "info", "warn", "error", "fatal")
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_append_reserve() -> usize {
    500
}
fn default_max_auto_names() -> usize {
    1000
}
fn default_search_tolerance() -> f64 {
    1e-8
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            append_reserve: default_append_reserve(),
            max_auto_names: default_max_auto_names(),
            search_tolerance: default_search_tolerance(),
            log_level: default_log_level(),
        }
    }
}

impl CubeConfig {
    /// Parses and validates a JSON configuration
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: CubeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file and applies its log level
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&content)?;
        config.apply_log_level()?;
        let shown = path.display().to_string();
        log_event(LogEvent::ConfigLoaded, &[("path", shown.as_str())]);
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_auto_names == 0 {
            return Err(ConfigError::Invalid("max_auto_names must be > 0".into()));
        }
        if self.search_tolerance.is_nan() || self.search_tolerance < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "search_tolerance must be a non-negative number, got {}",
                self.search_tolerance
            )));
        }
        self.severity()?;
        Ok(())
    }

    /// Parsed `log_level`
    pub fn severity(&self) -> ConfigResult<Severity> {
        Severity::parse(&self.log_level).ok_or_else(|| {
            ConfigError::Invalid(format!("Unknown log_level: '{}'", self.log_level))
        })
    }

    /// Sets the process-wide minimum log severity from `log_level`
    pub fn apply_log_level(&self) -> ConfigResult<()> {
        Logger::set_min_severity(self.severity()?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CubeConfig::default();
        assert_eq!(config.append_reserve, 500);
        assert_eq!(config.max_auto_names, 1000);
        assert_eq!(config.search_tolerance, 1e-8);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = CubeConfig::from_json(r#"{"append_reserve": 16}"#).unwrap();
        assert_eq!(config.append_reserve, 16);
        assert_eq!(config.max_auto_names, 1000);
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            CubeConfig::from_json(r#"{"max_auto_names": 0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CubeConfig::from_json(r#"{"search_tolerance": -1.0}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CubeConfig::from_json(r#"{"log_level": "chatty"}"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            CubeConfig::from_json("{not json"),
            Err(ConfigError::Parse(_))
        ));
    }
}
