//! Configuration management for flightcheck.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.
//!
//! User preferences (dark mode, sound) are not configuration: they are part
//! of the persisted state, see [`crate::settings`].

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "flightcheck";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "checklists.db";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `FLIGHTCHECK_`)
/// 2. TOML config file at `~/.config/flightcheck/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Checklist behavior configuration.
    pub checklist: ChecklistConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/flightcheck/checklists.db`
    pub database_path: Option<PathBuf>,
    /// How long to wait on a locked database, in milliseconds.
    pub busy_timeout_ms: u64,
    /// Use write-ahead logging.
    pub wal_enabled: bool,
}

/// Checklist behavior configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChecklistConfig {
    /// Require `--yes` before resetting a checklist or clearing all data.
    pub confirm_reset: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: None, // Will be resolved to default at runtime
            busy_timeout_ms: 5000,
            wal_enabled: true,
        }
    }
}

impl Default for ChecklistConfig {
    fn default() -> Self {
        Self {
            confirm_reset: true,
        }
    }
}

impl StorageConfig {
    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn resolved_database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| Config::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Get the busy timeout as a Duration.
    #[must_use]
    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("FLIGHTCHECK_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.storage.busy_timeout_ms == 0 {
            return Err(Error::ConfigValidation {
                message: "busy_timeout_ms must be greater than 0".to_string(),
            });
        }

        if let Some(path) = &self.storage.database_path {
            if path.as_os_str().is_empty() {
                return Err(Error::ConfigValidation {
                    message: "database_path must not be empty".to_string(),
                });
            }
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage.resolved_database_path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert!(config.storage.database_path.is_none());
        assert_eq!(config.storage.busy_timeout_ms, 5000);
        assert!(config.storage.wal_enabled);
        assert!(config.checklist.confirm_reset);
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_zero_busy_timeout() {
        let mut config = Config::default();
        config.storage.busy_timeout_ms = 0;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("busy_timeout_ms"));
    }

    #[test]
    fn test_validate_empty_database_path() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::new());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("database_path"));
    }

    #[test]
    fn test_database_path_default() {
        let config = Config::default();
        let path = config.database_path();

        assert!(path.to_string_lossy().contains("checklists.db"));
        assert!(path.to_string_lossy().contains("flightcheck"));
    }

    #[test]
    fn test_database_path_custom() {
        let mut config = Config::default();
        config.storage.database_path = Some(PathBuf::from("/custom/path/db.sqlite"));

        assert_eq!(
            config.database_path(),
            PathBuf::from("/custom/path/db.sqlite")
        );
    }

    #[test]
    fn test_busy_timeout() {
        let config = Config::default();
        assert_eq!(config.storage.busy_timeout(), Duration::from_millis(5000));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("flightcheck"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let path = std::env::temp_dir().join(format!(
            "flightcheck_config_{}.toml",
            std::process::id()
        ));
        std::fs::write(
            &path,
            "[storage]\nbusy_timeout_ms = 250\nwal_enabled = false\n\n[checklist]\nconfirm_reset = false\n",
        )
        .unwrap();

        let config = Config::load_from(Some(path.clone())).unwrap();
        assert_eq!(config.storage.busy_timeout_ms, 250);
        assert!(!config.storage.wal_enabled);
        assert!(!config.checklist.confirm_reset);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_load_invalid_toml_value_fails_validation() {
        let path = std::env::temp_dir().join(format!(
            "flightcheck_bad_config_{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, "[storage]\nbusy_timeout_ms = 0\n").unwrap();

        let result = Config::load_from(Some(path.clone()));
        assert!(matches!(result, Err(Error::ConfigValidation { .. })));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("busy_timeout_ms"));
        assert!(json.contains("confirm_reset"));
    }

    #[test]
    fn test_storage_config_deserialize_partial() {
        let json = r#"{"busy_timeout_ms": 100}"#;
        let storage: StorageConfig = serde_json::from_str(json).unwrap();
        assert_eq!(storage.busy_timeout_ms, 100);
        assert!(storage.wal_enabled);
    }
}
