//! Application configuration management.
//!
//! Layers, lowest precedence first: `config/default.toml`,
//! `config/{RUN_MODE}.toml`, then `DISTINTA__*` environment variables
//! (e.g. `DISTINTA__STORES__SHARED_URL`).

use std::collections::HashMap;

use chrono_tz::Tz;
use serde::Deserialize;

use crate::error::AppError;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Shared and tenant store locations.
    pub stores: StoresConfig,
    /// Ledger behaviour settings.
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Identity mirroring settings.
    #[serde(default)]
    pub replication: ReplicationConfig,
}

/// Store locations.
#[derive(Debug, Clone, Deserialize)]
pub struct StoresConfig {
    /// Connection URL of the shared store (identity and tenant registry).
    pub shared_url: String,
    /// Tenant store key to connection URL.
    #[serde(default)]
    pub tenants: HashMap<String, String>,
    /// Maximum number of pooled connections per store.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

/// Ledger behaviour settings.
#[derive(Debug, Clone, Deserialize)]
pub struct LedgerConfig {
    /// IANA timezone used to derive business dates.
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Name of the agency cash account inside each tenant store.
    #[serde(default = "default_cash_account_name")]
    pub cash_account_name: String,
    /// Days after which an unsettled negative balance counts as overdue.
    #[serde(default = "default_overdue_days")]
    pub overdue_days: u32,
}

fn default_timezone() -> String {
    "Europe/Rome".to_string()
}

fn default_cash_account_name() -> String {
    "Cassa Agenzia".to_string()
}

fn default_overdue_days() -> u32 {
    3
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            cash_account_name: default_cash_account_name(),
            overdue_days: default_overdue_days(),
        }
    }
}

impl LedgerConfig {
    /// Parses the configured timezone.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for an unknown IANA name.
    pub fn tz(&self) -> Result<Tz, AppError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| AppError::Config(format!("invalid ledger.timezone: {e}")))
    }
}

/// Identity mirroring settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplicationConfig {
    /// Attempts per mirror write before giving up.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    3
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from config files and the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("DISTINTA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("DISTINTA__STORES__SHARED_URL", Some("sqlite::memory:")),
                ("DISTINTA__LEDGER__OVERDUE_DAYS", Some("5")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.stores.shared_url, "sqlite::memory:");
                assert_eq!(config.stores.max_connections, 10);
                assert_eq!(config.ledger.overdue_days, 5);
                assert_eq!(config.ledger.cash_account_name, "Cassa Agenzia");
                assert_eq!(config.replication.max_attempts, 3);
            },
        );
    }

    #[test]
    fn test_missing_shared_url_fails() {
        temp_env::with_var_unset("DISTINTA__STORES__SHARED_URL", || {
            assert!(AppConfig::load().is_err());
        });
    }

    #[test]
    fn test_timezone_parsing() {
        let ledger = LedgerConfig::default();
        assert_eq!(ledger.tz().unwrap(), chrono_tz::Europe::Rome);

        let bad = LedgerConfig {
            timezone: "Mars/Olympus".to_string(),
            ..LedgerConfig::default()
        };
        assert!(bad.tz().is_err());
    }
}
