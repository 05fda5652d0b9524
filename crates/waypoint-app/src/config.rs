//! Application configuration.
//!
//! Configuration can be loaded from:
//! - Environment variables (WAYPOINT_*)
//! - TOML configuration file
//! - The `--config` command line argument

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Href the session opens at.
    #[serde(default = "default_initial_path")]
    pub initial_path: String,

    /// Home page settings.
    #[serde(default)]
    pub home: HomeConfig,

    /// User directory source.
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Home page configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeConfig {
    /// Delay before Home rewrites the query parameters, in milliseconds.
    #[serde(default = "default_search_update_delay")]
    pub search_update_delay_ms: u64,
}

/// User directory configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// TOML file with `[[users]]` tables. The built-in list is used if unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable the Prometheus exporter.
    #[serde(default)]
    pub enabled: bool,

    /// Exporter port.
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

// Default value functions
fn default_initial_path() -> String {
    std::env::var("WAYPOINT_INITIAL_PATH").unwrap_or_else(|_| "/".to_string())
}

fn default_search_update_delay() -> u64 {
    std::env::var("WAYPOINT_SEARCH_DELAY_MS")
        .ok()
        .and_then(|d| d.parse().ok())
        .unwrap_or(3_000)
}

fn default_metrics_port() -> u16 {
    9091
}

impl Default for Config {
    fn default() -> Self {
        Self {
            initial_path: default_initial_path(),
            home: HomeConfig::default(),
            directory: DirectoryConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            search_update_delay_ms: default_search_update_delay(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            port: default_metrics_port(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file, the default paths, or
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be parsed, or if
    /// an explicit path cannot be read.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
            return Self::from_file(expanded);
        }

        let config_paths = [
            "waypoint.toml",
            "/etc/waypoint/waypoint.toml",
            "~/.config/waypoint/waypoint.toml",
        ];

        for path in &config_paths {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                return Self::from_file(expanded.as_ref());
            }
        }

        // Fall back to defaults with environment overrides
        Ok(Self::default())
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Delay before Home's query update.
    #[must_use]
    pub fn search_update_delay(&self) -> Duration {
        Duration::from_millis(self.home.search_update_delay_ms)
    }

    /// Directory file path with `~` expanded.
    #[must_use]
    pub fn directory_path(&self) -> Option<PathBuf> {
        self.directory
            .path
            .as_ref()
            .map(|p| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(!config.metrics.enabled);
        assert_eq!(config.metrics.port, 9091);
        assert!(config.directory.path.is_none());
    }

    #[test]
    fn test_config_from_toml() {
        let toml_str = r#"
            initial_path = "/users/2"

            [home]
            search_update_delay_ms = 250

            [directory]
            path = "users.toml"

            [metrics]
            enabled = true
        "#;

        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.initial_path, "/users/2");
        assert_eq!(config.search_update_delay(), Duration::from_millis(250));
        assert_eq!(config.directory_path(), Some(PathBuf::from("users.toml")));
        assert!(config.metrics.enabled);
        assert_eq!(config.metrics.port, 9091);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Config::load(Some(Path::new("/definitely/not/here/waypoint.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
