//! Global configuration.
//!
//! Loaded from ~/.config/flatr/flatr.yml or .flatr.yml

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::calendar::{WeekdaySet, parse_weekday};

/// Global configuration for flatr.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct GlobalConfig {
    /// Collection location.
    pub collection: CollectionConfig,

    /// Flatten defaults.
    pub flatten: FlattenDefaults,

    /// Load balancing settings.
    pub balance: BalanceConfig,

    /// Extra console output.
    pub debug: bool,
}

impl GlobalConfig {
    /// Load configuration with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. .flatr.yml in current directory
    /// 3. ~/.config/flatr/flatr.yml
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // Explicit path takes precedence
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Try project config
        let project_config = PathBuf::from(".flatr.yml");
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(config) => {
                    log::info!("Loaded config from .flatr.yml");
                    return Ok(config);
                }
                Err(e) => {
                    log::warn!("Failed to load .flatr.yml: {}", e);
                }
            }
        }

        // Try user config
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("flatr").join("flatr.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => {
                        log::info!("Loaded config from {}", user_config.display());
                        return Ok(config);
                    }
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        // Use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.flatten.default_limit <= 0 {
            eyre::bail!("flatten.default-limit must be > 0");
        }
        for name in &self.balance.easy_days {
            if parse_weekday(name).is_none() {
                eyre::bail!("balance.easy-days contains unknown weekday: {}", name);
            }
        }
        Ok(())
    }
}

/// Collection location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CollectionConfig {
    /// Path to the collection database.
    pub path: PathBuf,
}

impl Default for CollectionConfig {
    fn default() -> Self {
        let default_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flatr")
            .join("collection.db");
        Self { path: default_path }
    }
}

/// Flatten defaults.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FlattenDefaults {
    /// Per-day limit used when the CLI does not pass one.
    #[serde(rename = "default-limit")]
    pub default_limit: i64,
}

impl Default for FlattenDefaults {
    fn default() -> Self {
        Self {
            default_limit: crate::config::DEFAULT_LIMIT,
        }
    }
}

/// Load balancing settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct BalanceConfig {
    /// Whether easy days apply to flatten runs.
    #[serde(rename = "load-balance")]
    pub load_balance: bool,

    /// Weekdays kept free of flattened items ("mon" .. "sun").
    #[serde(rename = "easy-days")]
    pub easy_days: Vec<String>,
}

impl BalanceConfig {
    /// The configured easy days as a weekday set. Unknown names are
    /// dropped here; `validate` reports them.
    pub fn easy_day_set(&self) -> WeekdaySet {
        self.easy_days
            .iter()
            .filter_map(|name| parse_weekday(name))
            .collect()
    }
}
