//! # Application Configuration
//!
//! Where the database lives and how each resource cache behaves.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MERIDIAN_DB_PATH=/data/meridian.db                                 │
//! │     MERIDIAN_LAZY=false                                                │
//! │     MERIDIAN_ON_MISSING=refresh                                        │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/meridian-pos/meridian.toml (Linux)                       │
//! │     ~/Library/Application Support/com.meridian.pos/meridian.toml       │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     products + stores eager, everything else lazy, on_missing=ignore   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! [database]
//! path = "/var/lib/meridian/meridian.db"
//! max_connections = 5
//!
//! [cache]
//! on_missing = "ignore"   # ignore | refresh
//! # lazy = true           # force every resource lazy (or eager)
//!
//! [resources.customers]
//! lazy = false
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use meridian_db::DbConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::MissingEntityPolicy;
use crate::contexts::RESOURCE_NAMES;
use crate::error::{CacheError, CacheResult};

/// Resources loaded at startup unless configured otherwise. The register
/// screen needs them before the first sale.
const EAGER_BY_DEFAULT: [&str; 2] = ["products", "stores"];

// =============================================================================
// Sections
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file, or `:memory:`. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: None,
            max_connections: default_max_connections(),
        }
    }
}

/// Settings applied to every resource unless a `[resources.<name>]`
/// section says otherwise.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lazy: Option<bool>,

    #[serde(default)]
    pub on_missing: MissingEntityPolicy,
}

/// Per-resource overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lazy: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_missing: Option<MissingEntityPolicy>,
}

/// Effective settings for one resource cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSettings {
    pub lazy: bool,
    pub on_missing: MissingEntityPolicy,
}

impl Default for ResourceSettings {
    fn default() -> Self {
        ResourceSettings {
            lazy: true,
            on_missing: MissingEntityPolicy::Ignore,
        }
    }
}

// =============================================================================
// App Configuration
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub cache: CacheSettings,

    #[serde(default)]
    pub resources: BTreeMap<String, ResourceOverride>,
}

impl AppConfig {
    /// Configuration for tests and demos: in-memory database, defaults
    /// otherwise.
    pub fn in_memory() -> Self {
        let mut config = Self::default();
        config.database.path = Some(PathBuf::from(meridian_db::pool::IN_MEMORY_PATH));
        config
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (`meridian.toml`)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CacheResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                config = Self::from_file(&path)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns defaults if loading fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    pub fn from_file(path: &Path) -> CacheResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Checks values a file or the environment could get wrong.
    pub fn validate(&self) -> CacheResult<()> {
        if self.database.max_connections == 0 {
            return Err(CacheError::Config(
                "database.max_connections must be greater than 0".into(),
            ));
        }

        if let Some(path) = &self.database.path {
            if path.as_os_str().is_empty() {
                return Err(CacheError::Config("database.path must not be empty".into()));
            }
        }

        if let Some(unknown) = self
            .resources
            .keys()
            .find(|name| !RESOURCE_NAMES.contains(&name.as_str()))
        {
            return Err(CacheError::Config(format!(
                "Unknown resource '{}'. Valid resources: {}",
                unknown,
                RESOURCE_NAMES.join(", ")
            )));
        }

        Ok(())
    }

    /// Applies `MERIDIAN_*` overrides read through `lookup`.
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(path) = lookup("MERIDIAN_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(lazy) = lookup("MERIDIAN_LAZY") {
            match parse_bool(&lazy) {
                Some(lazy) => self.cache.lazy = Some(lazy),
                None => warn!(value = %lazy, "Ignoring MERIDIAN_LAZY, expected true or false"),
            }
        }

        if let Some(policy) = lookup("MERIDIAN_ON_MISSING") {
            match policy.parse() {
                Ok(parsed) => self.cache.on_missing = parsed,
                Err(e) => warn!(error = %e, "Ignoring MERIDIAN_ON_MISSING"),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "meridian", "pos")
            .map(|dirs| dirs.config_dir().join("meridian.toml"))
    }

    fn default_database_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "meridian", "pos")
            .map(|dirs| dirs.data_dir().join("meridian.db"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    /// Effective settings for the resource called `name`.
    ///
    /// `[resources.<name>]` wins over `[cache]`, which wins over the
    /// built-in default.
    pub fn resource(&self, name: &str) -> ResourceSettings {
        let overrides = self.resources.get(name);

        let lazy = overrides
            .and_then(|o| o.lazy)
            .or(self.cache.lazy)
            .unwrap_or(!EAGER_BY_DEFAULT.contains(&name));

        let on_missing = overrides
            .and_then(|o| o.on_missing)
            .unwrap_or(self.cache.on_missing);

        ResourceSettings { lazy, on_missing }
    }

    pub fn database_path(&self) -> Option<PathBuf> {
        self.database.path.clone().or_else(Self::default_database_path)
    }

    pub fn db_config(&self) -> CacheResult<DbConfig> {
        let path = self
            .database_path()
            .ok_or_else(|| CacheError::Config("No database path available".into()))?;

        let config = if path.as_os_str() == meridian_db::pool::IN_MEMORY_PATH {
            DbConfig::in_memory()
        } else {
            DbConfig::new(path).max_connections(self.database.max_connections)
        };

        Ok(config)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}
