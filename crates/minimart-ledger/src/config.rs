//! # Ledger Configuration
//!
//! Loads settings from `MINIMART_*` environment variables over defaults.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `MINIMART_DB_PATH` | `minimart.db` | SQLite file |
//! | `MINIMART_MAX_CONNECTIONS` | `5` | Pool size |
//! | `MINIMART_POINT_VALUE_CENTS` | `2500` | Spend per loyalty point |
//! | `MINIMART_DEFAULT_MIN_STOCK` | `5` | Low-stock threshold for new products |

use std::env;
use std::path::PathBuf;
use thiserror::Error;

use minimart_core::DEFAULT_POINT_VALUE_CENTS;
use minimart_db::DbConfig;

/// Low-stock threshold for products created without one.
pub const DEFAULT_MIN_STOCK: i64 = 5;

const DEFAULT_DB_PATH: &str = "minimart.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// SQLite database path, or `:memory:`.
    pub database_path: PathBuf,
    pub max_connections: u32,
    /// Currency cents of sale total per loyalty point earned.
    pub point_value_cents: i64,
    pub default_min_stock: i64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        LedgerConfig {
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            point_value_cents: DEFAULT_POINT_VALUE_CENTS,
            default_min_stock: DEFAULT_MIN_STOCK,
        }
    }
}

impl LedgerConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Loads configuration through `lookup`, falling back to defaults for
    /// unset variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = LedgerConfig::default();

        let database_path = lookup("MINIMART_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let max_connections: u32 = lookup("MINIMART_MAX_CONNECTIONS")
            .map(|v| v.parse().map_err(|_| ConfigError::InvalidValue("MINIMART_MAX_CONNECTIONS")))
            .transpose()?
            .unwrap_or(defaults.max_connections);
        if max_connections == 0 {
            return Err(ConfigError::InvalidValue("MINIMART_MAX_CONNECTIONS"));
        }

        let point_value_cents: i64 = lookup("MINIMART_POINT_VALUE_CENTS")
            .map(|v| v.parse().map_err(|_| ConfigError::InvalidValue("MINIMART_POINT_VALUE_CENTS")))
            .transpose()?
            .unwrap_or(defaults.point_value_cents);
        if point_value_cents <= 0 {
            return Err(ConfigError::InvalidValue("MINIMART_POINT_VALUE_CENTS"));
        }

        let default_min_stock: i64 = lookup("MINIMART_DEFAULT_MIN_STOCK")
            .map(|v| v.parse().map_err(|_| ConfigError::InvalidValue("MINIMART_DEFAULT_MIN_STOCK")))
            .transpose()?
            .unwrap_or(defaults.default_min_stock);
        if default_min_stock < 0 {
            return Err(ConfigError::InvalidValue("MINIMART_DEFAULT_MIN_STOCK"));
        }

        Ok(LedgerConfig {
            database_path,
            max_connections,
            point_value_cents,
            default_min_stock,
        })
    }

    /// In-memory store with default business settings.
    pub fn in_memory() -> Self {
        LedgerConfig {
            database_path: PathBuf::from(":memory:"),
            max_connections: 1,
            ..LedgerConfig::default()
        }
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        if self.database_path.as_os_str() == ":memory:" {
            return DbConfig::in_memory();
        }
        DbConfig::new(self.database_path.clone()).max_connections(self.max_connections)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.database_path, PathBuf::from("minimart.db"));
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.point_value_cents, 2_500);
        assert_eq!(config.default_min_stock, 5);
    }

    #[test]
    fn test_overrides() {
        let config = LedgerConfig::from_lookup(lookup_from(&[
            ("MINIMART_DB_PATH", "/var/lib/minimart/store.db"),
            ("MINIMART_POINT_VALUE_CENTS", "1000"),
        ]))
        .unwrap();
        assert_eq!(config.database_path, PathBuf::from("/var/lib/minimart/store.db"));
        assert_eq!(config.point_value_cents, 1_000);
    }

    #[test]
    fn test_invalid_values() {
        let err = LedgerConfig::from_lookup(lookup_from(&[("MINIMART_MAX_CONNECTIONS", "many")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("MINIMART_MAX_CONNECTIONS")));

        let err = LedgerConfig::from_lookup(lookup_from(&[("MINIMART_POINT_VALUE_CENTS", "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue("MINIMART_POINT_VALUE_CENTS")));
    }
}
