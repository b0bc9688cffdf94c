//! # Static Configuration
//!
//! Settings that do not change while the program runs: where the database
//! lives, scanner tunables, the line devices to offer, and where exports go.
//! Operator preferences (default location, strict mode, sink URL) are
//! persisted state, not configuration; see `shelf_db::PreferencesStore`.
//!
//! ## Load Order (later overrides earlier)
//! ```text
//! defaults ──► counter.toml ──► SHELF_* environment ──► validate()
//! ```
//!
//! ## Example
//! ```toml
//! [storage]
//! database_path = "/var/lib/shelf-counter/counts.db"
//!
//! [scanner]
//! frame_interval_ms = 16
//! debounce_window_ms = 1500
//!
//! [[scanner.devices]]
//! id = "front"
//! label = "Front scanner"
//! path = "/dev/ttyACM0"
//!
//! [export]
//! output_dir = "/srv/exports"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use shelf_scan::engine::DEFAULT_FRAME_INTERVAL;
use shelf_scan::{EngineSettings, WedgeDevice};

/// Config file name inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "counter.toml";

/// Database file name inside the platform data directory.
pub const DATABASE_FILE_NAME: &str = "shelf-counter.db";

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Invalid config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// SQLite file. Defaults to the platform data directory.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

/// A line device as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceSettings {
    pub id: String,
    #[serde(default)]
    pub label: String,
    /// Device path; `-` reads standard input.
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannerSettings {
    /// Delay between native detector polls (milliseconds).
    #[serde(default = "default_frame_interval")]
    pub frame_interval_ms: u64,

    /// Repeated reads of one code inside this window are dropped.
    #[serde(default = "default_debounce_window")]
    pub debounce_window_ms: i64,

    /// Line devices offered by `cameras` and `scan`. Empty means stdin only.
    #[serde(default)]
    pub devices: Vec<DeviceSettings>,
}

fn default_frame_interval() -> u64 {
    DEFAULT_FRAME_INTERVAL.as_millis() as u64
}

fn default_debounce_window() -> i64 {
    shelf_core::DEBOUNCE_WINDOW_MS
}

impl Default for ScannerSettings {
    fn default() -> Self {
        ScannerSettings {
            frame_interval_ms: default_frame_interval(),
            debounce_window_ms: default_debounce_window(),
            devices: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportSettings {
    /// Directory for export files. Defaults to the working directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

// =============================================================================
// Counter Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CounterConfig {
    #[serde(default)]
    pub storage: StorageSettings,

    #[serde(default)]
    pub scanner: ScannerSettings,

    #[serde(default)]
    pub export: ExportSettings,
}

impl CounterConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// An explicit path must exist; the default path may be missing.
    pub fn load(config_path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                Some(path) => {
                    debug!(?path, "Config file not found, using defaults");
                    Self::default()
                }
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if load fails.
    pub fn load_or_default(config_path: Option<&Path>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Parses one TOML file.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        info!(?path, "Loading config from file");
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.scanner.frame_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "scanner.frame_interval_ms must be greater than 0".into(),
            ));
        }

        if self.scanner.debounce_window_ms <= 0 {
            return Err(ConfigError::Invalid(
                "scanner.debounce_window_ms must be greater than 0".into(),
            ));
        }

        for (i, device) in self.scanner.devices.iter().enumerate() {
            if device.id.trim().is_empty() || device.path.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "scanner.devices[{}] needs both id and path",
                    i
                )));
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies `SHELF_*` overrides read through `lookup`.
    ///
    /// Unparseable numbers are ignored with a warning.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("SHELF_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.storage.database_path = Some(PathBuf::from(path));
        }

        if let Some(raw) = lookup("SHELF_FRAME_INTERVAL_MS") {
            match raw.trim().parse::<u64>() {
                Ok(ms) => self.scanner.frame_interval_ms = ms,
                Err(_) => warn!(value = %raw, "Ignoring SHELF_FRAME_INTERVAL_MS"),
            }
        }

        if let Some(raw) = lookup("SHELF_DEBOUNCE_MS") {
            match raw.trim().parse::<i64>() {
                Ok(ms) => self.scanner.debounce_window_ms = ms,
                Err(_) => warn!(value = %raw, "Ignoring SHELF_DEBOUNCE_MS"),
            }
        }

        if let Some(dir) = lookup("SHELF_EXPORT_DIR") {
            self.export.output_dir = Some(PathBuf::from(dir));
        }
    }

    /// Returns the default config file path.
    pub fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Resolved Values
    // =========================================================================

    /// Database file: configured path, else the platform data directory,
    /// else the working directory.
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.storage.database_path {
            return path.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            frame_interval: Duration::from_millis(self.scanner.frame_interval_ms),
            debounce_window_ms: self.scanner.debounce_window_ms,
        }
    }

    /// Configured line devices, or standard input when none are listed.
    pub fn wedge_devices(&self) -> Vec<WedgeDevice> {
        if self.scanner.devices.is_empty() {
            return vec![WedgeDevice::stdin()];
        }
        self.scanner
            .devices
            .iter()
            .map(|d| WedgeDevice {
                id: d.id.trim().to_string(),
                label: d.label.trim().to_string(),
                path: d.path.trim().to_string(),
            })
            .collect()
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "shelfcounter", "shelf-counter")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config = CounterConfig::default();
        assert_eq!(config.scanner.frame_interval_ms, 16);
        assert_eq!(config.scanner.debounce_window_ms, 1500);
        assert!(config.validate().is_ok());
        assert_eq!(config.wedge_devices(), vec![WedgeDevice::stdin()]);
        assert_eq!(config.export_dir(), PathBuf::from("."));
    }

    #[test]
    fn test_toml_parsing() {
        let config: CounterConfig = toml::from_str(
            r#"
            [storage]
            database_path = "/tmp/counts.db"

            [scanner]
            debounce_window_ms = 800

            [[scanner.devices]]
            id = "front"
            path = "/dev/ttyACM0"
            "#,
        )
        .unwrap();

        assert_eq!(config.database_path(), PathBuf::from("/tmp/counts.db"));
        assert_eq!(config.scanner.frame_interval_ms, 16);
        assert_eq!(config.engine_settings().debounce_window_ms, 800);
        assert_eq!(config.wedge_devices()[0].path, "/dev/ttyACM0");
        assert_eq!(config.wedge_devices()[0].label, "");
    }

    #[test]
    fn test_config_validation() {
        let mut config = CounterConfig::default();

        config.scanner.frame_interval_ms = 0;
        assert!(config.validate().is_err());

        config.scanner.frame_interval_ms = 33;
        config.scanner.debounce_window_ms = -1;
        assert!(config.validate().is_err());

        config.scanner.debounce_window_ms = 1500;
        config.scanner.devices.push(DeviceSettings {
            id: "x".into(),
            label: String::new(),
            path: " ".into(),
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("SHELF_DB_PATH", "/data/shelf.db"),
            ("SHELF_FRAME_INTERVAL_MS", "40"),
            ("SHELF_DEBOUNCE_MS", "not-a-number"),
            ("SHELF_EXPORT_DIR", "/exports"),
        ]
        .into_iter()
        .collect();

        let mut config = CounterConfig::default();
        config.apply_overrides(|name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.database_path(), PathBuf::from("/data/shelf.db"));
        assert_eq!(config.scanner.frame_interval_ms, 40);
        assert_eq!(config.scanner.debounce_window_ms, 1500);
        assert_eq!(config.export_dir(), PathBuf::from("/exports"));
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            CounterConfig::load(Some(&missing)),
            Err(ConfigError::Read { .. })
        ));
    }
}
