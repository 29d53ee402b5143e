//! # Ledger Configuration
//!
//! Pool size, default hold length and where the units are stored.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     HOSTEL_UNIT_COUNT=8                                                │
//! │     HOSTEL_STORE=sqlite                                                │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/ledger/ledger.toml (Linux)                               │
//! │     ~/Library/Application Support/com.hostel.ledger/ledger.toml (macOS)│
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     5 units, 4 hour holds, JSON file in the data dir                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # ledger.toml
//! unit_count = 5
//! default_hold_hours = 4
//!
//! [store]
//! backend = "json"   # json | sqlite | memory
//! path = "/var/lib/hostel/units.json"
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Duration;
use hostel_core::{DEFAULT_HOLD_HOURS, DEFAULT_UNIT_COUNT, MAX_DEFAULT_HOLD_HOURS, MAX_UNIT_COUNT};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ConfigError, ConfigResult, StoreResult};
use crate::ledger::LedgerOptions;
use crate::store::{JsonFileStore, MemoryStore, SqliteConfig, SqliteStore, UnitStore};

// =============================================================================
// Store Backend
// =============================================================================

/// Which [`UnitStore`] implementation to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// One JSON snapshot file.
    #[default]
    Json,

    /// SQLite database.
    Sqlite,

    /// Nothing survives a restart. Tests and demos only.
    Memory,
}

impl StoreBackend {
    fn default_file_name(&self) -> &'static str {
        match self {
            StoreBackend::Json | StoreBackend::Memory => "units.json",
            StoreBackend::Sqlite => "units.db",
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreBackend::Json => write!(f, "json"),
            StoreBackend::Sqlite => write!(f, "sqlite"),
            StoreBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" | "file" => Ok(StoreBackend::Json),
            "sqlite" | "db" => Ok(StoreBackend::Sqlite),
            "memory" | "mem" => Ok(StoreBackend::Memory),
            other => Err(ConfigError::InvalidConfig(format!(
                "Unknown store backend: '{}'. Valid options: json, sqlite, memory",
                other
            ))),
        }
    }
}

// =============================================================================
// Store Settings
// =============================================================================

/// Where units are persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,

    /// File or database path. Defaults to the platform data dir.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl StoreSettings {
    /// The configured path, or the platform default for this backend.
    pub fn resolved_path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| default_data_path(self.backend.default_file_name()))
    }

    /// Opens the configured backend.
    pub async fn open(&self) -> StoreResult<Arc<dyn UnitStore>> {
        let store: Arc<dyn UnitStore> = match self.backend {
            StoreBackend::Json => Arc::new(JsonFileStore::new(self.resolved_path())),
            StoreBackend::Sqlite => {
                Arc::new(SqliteStore::new(SqliteConfig::new(self.resolved_path())).await?)
            }
            StoreBackend::Memory => {
                warn!("Using in-memory unit store; holds will not survive a restart");
                Arc::new(MemoryStore::new())
            }
        };
        Ok(store)
    }
}

fn default_data_path(file_name: &str) -> PathBuf {
    directories::ProjectDirs::from("com", "hostel", "ledger")
        .map(|dirs| dirs.data_dir().join(file_name))
        .unwrap_or_else(|| PathBuf::from("data").join(file_name))
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete ledger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Units to provision on first start. Ignored once a pool exists.
    #[serde(default = "default_unit_count")]
    pub unit_count: u32,

    /// Hold length when a checkout names none.
    #[serde(default = "default_hold_hours")]
    pub default_hold_hours: i64,

    #[serde(default)]
    pub store: StoreSettings,
}

fn default_unit_count() -> u32 {
    DEFAULT_UNIT_COUNT
}

fn default_hold_hours() -> i64 {
    DEFAULT_HOLD_HOURS
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            unit_count: default_unit_count(),
            default_hold_hours: default_hold_hours(),
            store: StoreSettings::default(),
        }
    }
}

impl LedgerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (ledger.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading ledger config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ConfigError::SaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ConfigError::SaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| ConfigError::SaveFailed(e.to_string()))?;

        info!(?path, "Ledger config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(1..=MAX_UNIT_COUNT).contains(&self.unit_count) {
            return Err(ConfigError::InvalidConfig(format!(
                "unit_count must be between 1 and {}, got {}",
                MAX_UNIT_COUNT, self.unit_count
            )));
        }

        if !(1..=MAX_DEFAULT_HOLD_HOURS).contains(&self.default_hold_hours) {
            return Err(ConfigError::InvalidConfig(format!(
                "default_hold_hours must be between 1 and {}, got {}",
                MAX_DEFAULT_HOLD_HOURS, self.default_hold_hours
            )));
        }

        if let Some(path) = &self.store.path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfig("store.path must not be empty".into()));
            }
        }

        Ok(())
    }

    /// Applies `HOSTEL_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(count) = lookup("HOSTEL_UNIT_COUNT") {
            match count.parse::<u32>() {
                Ok(n) => {
                    debug!(unit_count = n, "Overriding unit count from environment");
                    self.unit_count = n;
                }
                Err(_) => warn!(value = %count, "Ignoring unparseable HOSTEL_UNIT_COUNT"),
            }
        }

        if let Some(hours) = lookup("HOSTEL_DEFAULT_HOLD_HOURS") {
            match hours.parse::<i64>() {
                Ok(h) => self.default_hold_hours = h,
                Err(_) => warn!(value = %hours, "Ignoring unparseable HOSTEL_DEFAULT_HOLD_HOURS"),
            }
        }

        if let Some(backend) = lookup("HOSTEL_STORE") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding store backend from environment");
                    self.store.backend = parsed;
                }
                Err(e) => warn!("{}", e),
            }
        }

        if let Some(path) = lookup("HOSTEL_STORE_PATH") {
            self.store.path = Some(PathBuf::from(path));
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "hostel", "ledger")
            .map(|dirs| dirs.config_dir().join("ledger.toml"))
    }

    /// Default hold as a duration.
    pub fn default_hold(&self) -> Duration {
        Duration::hours(self.default_hold_hours)
    }

    /// Ledger options matching this config, with the system clock.
    pub fn ledger_options(&self) -> LedgerOptions {
        LedgerOptions::new()
            .unit_count(self.unit_count)
            .default_hold(self.default_hold())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!("json".parse::<StoreBackend>().unwrap(), StoreBackend::Json);
        assert_eq!("SQLite".parse::<StoreBackend>().unwrap(), StoreBackend::Sqlite);
        assert_eq!("mem".parse::<StoreBackend>().unwrap(), StoreBackend::Memory);
        assert!("redis".parse::<StoreBackend>().is_err());
    }

    #[test]
    fn test_default_config() {
        let config = LedgerConfig::default();
        assert_eq!(config.unit_count, 5);
        assert_eq!(config.default_hold(), Duration::hours(4));
        assert_eq!(config.store.backend, StoreBackend::Json);
        assert!(config.validate().is_ok());
        assert!(config
            .store
            .resolved_path()
            .to_string_lossy()
            .ends_with("units.json"));
    }

    #[test]
    fn test_config_validation() {
        let mut config = LedgerConfig::default();

        config.unit_count = 0;
        assert!(config.validate().is_err());
        config.unit_count = MAX_UNIT_COUNT + 1;
        assert!(config.validate().is_err());
        config.unit_count = 3;

        config.default_hold_hours = 0;
        assert!(config.validate().is_err());
        config.default_hold_hours = 200;
        assert!(config.validate().is_err());
        config.default_hold_hours = 2;

        config.store.path = Some(PathBuf::new());
        assert!(config.validate().is_err());
        config.store.path = Some(PathBuf::from("units.db"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_overrides() {
        let mut config = LedgerConfig::default();
        config.apply_overrides(env(&[
            ("HOSTEL_UNIT_COUNT", "8"),
            ("HOSTEL_STORE", "sqlite"),
            ("HOSTEL_STORE_PATH", "/tmp/hostel/units.db"),
            ("HOSTEL_DEFAULT_HOLD_HOURS", "not-a-number"),
        ]));

        assert_eq!(config.unit_count, 8);
        assert_eq!(config.store.backend, StoreBackend::Sqlite);
        assert_eq!(
            config.store.resolved_path(),
            PathBuf::from("/tmp/hostel/units.db")
        );
        // Bad value ignored
        assert_eq!(config.default_hold_hours, 4);
    }

    #[test]
    fn test_toml_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf").join("ledger.toml");

        let mut config = LedgerConfig::default();
        config.unit_count = 12;
        config.store.backend = StoreBackend::Sqlite;
        config.save(Some(path.clone())).unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("unit_count = 12"));
        assert!(raw.contains("[store]"));

        let parsed: LedgerConfig = toml::from_str(&raw).unwrap();
        assert_eq!(parsed.unit_count, 12);
        assert_eq!(parsed.store.backend, StoreBackend::Sqlite);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: LedgerConfig = toml::from_str("unit_count = 3\n").unwrap();
        assert_eq!(config.unit_count, 3);
        assert_eq!(config.default_hold_hours, 4);
        assert_eq!(config.store.backend, StoreBackend::Json);
    }

    #[test]
    fn test_invalid_toml_fails_to_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.toml");
        std::fs::write(&path, "unit_count = \"many\"").unwrap();

        assert!(matches!(
            LedgerConfig::load(Some(path.clone())),
            Err(ConfigError::LoadFailed(_))
        ));
    }

    #[test]
    fn test_ledger_options_follow_config() {
        let mut config = LedgerConfig::default();
        config.unit_count = 7;
        config.default_hold_hours = 2;

        let options = config.ledger_options();
        assert_eq!(options.unit_count, 7);
        assert_eq!(options.default_hold, Duration::hours(2));
    }

    #[tokio::test]
    async fn test_open_backends() {
        let dir = tempfile::tempdir().unwrap();

        let json = StoreSettings {
            backend: StoreBackend::Json,
            path: Some(dir.path().join("units.json")),
        };
        assert_eq!(json.open().await.unwrap().backend(), "json");

        let sqlite = StoreSettings {
            backend: StoreBackend::Sqlite,
            path: Some(dir.path().join("units.db")),
        };
        assert_eq!(sqlite.open().await.unwrap().backend(), "sqlite");

        let memory = StoreSettings {
            backend: StoreBackend::Memory,
            path: None,
        };
        assert_eq!(memory.open().await.unwrap().backend(), "memory");
    }
}
