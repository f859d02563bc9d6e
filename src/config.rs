//! Configuration loading and management
//!
//! Handles parsing of `momentum.toml`. Every field has a default; a
//! missing file is simply the default configuration. The file is looked
//! up in the platform config directory unless `MOMENTUM_CONFIG` points
//! elsewhere.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "MOMENTUM_CONFIG";

/// Config file name within the config directory
pub const CONFIG_FILE: &str = "momentum.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Where the database document lives; defaults to the platform data
    /// directory when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// User identity configuration
    #[serde(default)]
    pub user: UserConfig,

    /// Dashboard configuration
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

/// User-related configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserConfig {
    /// Fallback identity when no flag, environment variable, or
    /// persisted value is present.
    #[serde(default)]
    pub default: Option<String>,
}

/// Dashboard aggregation limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// Active goals shown on the dashboard
    #[serde(default = "default_active_goal_limit")]
    pub active_goal_limit: usize,

    /// Upcoming events shown on the dashboard
    #[serde(default = "default_event_limit")]
    pub event_limit: usize,

    /// Days ahead covered by the upcoming-events window
    #[serde(default = "default_event_window_days")]
    pub event_window_days: i64,
}

fn default_active_goal_limit() -> usize {
    3
}

fn default_event_limit() -> usize {
    5
}

fn default_event_window_days() -> i64 {
    7
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            active_goal_limit: default_active_goal_limit(),
            event_limit: default_event_limit(),
            event_window_days: default_event_window_days(),
        }
    }
}

impl Config {
    /// Load configuration from the default locations: `MOMENTUM_CONFIG`
    /// if set, else `momentum.toml` in the platform config directory.
    /// Absent files yield the default configuration; unreadable or
    /// invalid files are an error.
    pub fn load() -> Result<Config> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            return Self::load_file(&path);
        }

        match project_dirs() {
            Some(dirs) => {
                let path = dirs.config_dir().join(CONFIG_FILE);
                if path.exists() {
                    Self::load_file(&path)
                } else {
                    Ok(Config::default())
                }
            }
            None => Ok(Config::default()),
        }
    }

    /// Load configuration from an explicit file path.
    pub fn load_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the data directory: CLI flag, then config, then the
    /// platform data directory.
    pub fn resolve_data_dir(&self, cli_data_dir: Option<PathBuf>) -> Result<PathBuf> {
        if let Some(dir) = cli_data_dir {
            return Ok(dir);
        }
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| {
                Error::InvalidConfig(
                    "no data directory; pass --data-dir or set data_dir in momentum.toml"
                        .to_string(),
                )
            })
    }

    fn validate(&self) -> Result<()> {
        if self.dashboard.event_window_days < 1 {
            return Err(Error::InvalidConfig(
                "dashboard.event_window_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("dev", "momentum", "momentum")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_apply_when_fields_are_missing() {
        let config: Config = toml::from_str("").unwrap();
        assert!(config.data_dir.is_none());
        assert!(config.user.default.is_none());
        assert_eq!(config.dashboard.active_goal_limit, 3);
        assert_eq!(config.dashboard.event_limit, 5);
        assert_eq!(config.dashboard.event_window_days, 7);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let toml = r#"
            data_dir = "/tmp/momentum-test"

            [dashboard]
            event_limit = 10
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.data_dir.as_deref(),
            Some(Path::new("/tmp/momentum-test"))
        );
        assert_eq!(config.dashboard.event_limit, 10);
        assert_eq!(config.dashboard.active_goal_limit, 3);
    }

    #[test]
    fn invalid_window_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(&path, "[dashboard]\nevent_window_days = 0\n").unwrap();

        let result = Config::load_file(&path);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn cli_flag_wins_data_dir_resolution() {
        let config = Config {
            data_dir: Some(PathBuf::from("/from/config")),
            ..Config::default()
        };
        let resolved = config
            .resolve_data_dir(Some(PathBuf::from("/from/cli")))
            .unwrap();
        assert_eq!(resolved, PathBuf::from("/from/cli"));

        let resolved = config.resolve_data_dir(None).unwrap();
        assert_eq!(resolved, PathBuf::from("/from/config"));
    }
}
