//! Configuration system for flatr.
//!
//! Single-layer YAML configuration with the usual search chain:
//! 1. Explicit `--config` path
//! 2. `.flatr.yml` in the current directory (project config)
//! 3. `~/.config/flatr/flatr.yml` (user config)
//! 4. Default values

use std::path::PathBuf;

use eyre::Result;

pub use self::global::{BalanceConfig, CollectionConfig, FlattenDefaults, GlobalConfig};

mod global;

/// Alias kept short at call sites.
pub type Config = GlobalConfig;

/// Default per-day review limit when neither CLI nor config supplies one.
pub const DEFAULT_LIMIT: i64 = 100;

/// Load configuration from the standard search paths.
pub fn load_config(explicit_path: Option<&PathBuf>) -> Result<GlobalConfig> {
    GlobalConfig::load(explicit_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limit() {
        assert_eq!(DEFAULT_LIMIT, 100);
    }

    #[test]
    fn test_load_config_default() {
        // Should succeed with defaults when no config file exists
        let config = load_config(None).unwrap();
        assert_eq!(config.flatten.default_limit, DEFAULT_LIMIT);
    }
}
