//! Store handles and the registry of open connections.
//!
//! A [`StoreHandle`] is the explicit context every ledger call takes: the connection to
//! one store plus the ledger settings that apply to it. Handles are cheap to clone.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono_tz::Tz;
use dashmap::DashMap;
use distinta_core::tenancy::StoreTarget;
use distinta_shared::config::{LedgerConfig, StoresConfig};
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbBackend, EntityTrait, Select};
use sea_orm::{ConnectionTrait, QuerySelect};
use tracing::info;

use crate::error::StoreError;

/// Ledger-wide settings resolved from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerSettings {
    /// Timezone used to derive business dates.
    pub timezone: Tz,
    /// Name of the agency cash account.
    pub cash_account_name: String,
    /// Days after which an unsettled debt is overdue.
    pub overdue_days: u32,
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Europe::Rome,
            cash_account_name: "Cassa Agenzia".to_string(),
            overdue_days: 3,
        }
    }
}

impl TryFrom<&LedgerConfig> for LedgerSettings {
    type Error = distinta_shared::AppError;

    fn try_from(config: &LedgerConfig) -> Result<Self, Self::Error> {
        Ok(Self {
            timezone: config.tz()?,
            cash_account_name: config.cash_account_name.clone(),
            overdue_days: config.overdue_days,
        })
    }
}

/// A resolved store: where an operation runs.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    target: StoreTarget,
    conn: DatabaseConnection,
    settings: Arc<LedgerSettings>,
}

impl StoreHandle {
    /// Wraps a connection with default ledger settings.
    #[must_use]
    pub fn new(target: StoreTarget, conn: DatabaseConnection) -> Self {
        Self {
            target,
            conn,
            settings: Arc::new(LedgerSettings::default()),
        }
    }

    /// Replaces the ledger settings.
    #[must_use]
    pub fn with_settings(mut self, settings: Arc<LedgerSettings>) -> Self {
        self.settings = settings;
        self
    }

    /// Which store this is.
    #[must_use]
    pub const fn target(&self) -> &StoreTarget {
        &self.target
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn conn(&self) -> &DatabaseConnection {
        &self.conn
    }

    /// Ledger settings for this store.
    #[must_use]
    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    /// Label used in log fields.
    #[must_use]
    pub fn label(&self) -> &str {
        self.target.tenant_key().unwrap_or("shared")
    }
}

/// Adds `FOR UPDATE` where the backend supports row locks.
///
/// SQLite serializes writers on the whole database, so the clause is dropped there.
pub(crate) fn for_update<E, C>(select: Select<E>, conn: &C) -> Select<E>
where
    E: EntityTrait,
    C: ConnectionTrait,
{
    if conn.get_database_backend() == DbBackend::Sqlite {
        select
    } else {
        select.lock_exclusive()
    }
}

/// Opens a pooled connection.
///
/// # Errors
///
/// Returns an error if the connection cannot be established.
pub async fn connect(url: &str, max_connections: u32) -> Result<DatabaseConnection, StoreError> {
    let mut options = ConnectOptions::new(url.to_owned());
    // An in-memory SQLite database exists once per connection.
    let max = if url.contains(":memory:") { 1 } else { max_connections };
    options
        .max_connections(max)
        .connect_timeout(Duration::from_secs(8))
        .sqlx_logging(false);
    Ok(Database::connect(options).await?)
}

struct RegistryInner {
    shared: StoreHandle,
    urls: HashMap<String, String>,
    max_connections: u32,
    settings: Arc<LedgerSettings>,
    open: DashMap<String, StoreHandle>,
}

/// All stores known to this process. Tenant connections are opened on first use.
#[derive(Clone)]
pub struct StoreRegistry {
    inner: Arc<RegistryInner>,
}

impl std::fmt::Debug for StoreRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreRegistry")
            .field("tenants", &self.tenant_keys())
            .field("open", &self.inner.open.len())
            .finish_non_exhaustive()
    }
}

impl StoreRegistry {
    /// Connects to the shared store; tenant stores stay closed until requested.
    ///
    /// # Errors
    ///
    /// Returns an error if the shared store cannot be reached.
    pub async fn connect(
        config: &StoresConfig,
        settings: LedgerSettings,
    ) -> Result<Self, StoreError> {
        let settings = Arc::new(settings);
        let conn = connect(&config.shared_url, config.max_connections).await?;
        info!(store = "shared", "store connection opened");
        Ok(Self {
            inner: Arc::new(RegistryInner {
                shared: StoreHandle::new(StoreTarget::Shared, conn).with_settings(settings.clone()),
                urls: config.tenants.clone(),
                max_connections: config.max_connections,
                settings,
                open: DashMap::new(),
            }),
        })
    }

    /// Builds a registry over connections that are already open.
    pub fn from_connections<I>(shared: DatabaseConnection, tenants: I, settings: LedgerSettings) -> Self
    where
        I: IntoIterator<Item = (String, DatabaseConnection)>,
    {
        let settings = Arc::new(settings);
        let open = DashMap::new();
        let mut urls = HashMap::new();
        for (key, conn) in tenants {
            urls.insert(key.clone(), String::new());
            let handle = StoreHandle::new(StoreTarget::Tenant(key.clone()), conn)
                .with_settings(settings.clone());
            open.insert(key, handle);
        }
        Self {
            inner: Arc::new(RegistryInner {
                shared: StoreHandle::new(StoreTarget::Shared, shared)
                    .with_settings(settings.clone()),
                urls,
                max_connections: 1,
                settings,
                open,
            }),
        }
    }

    /// The shared store.
    #[must_use]
    pub fn shared(&self) -> &StoreHandle {
        &self.inner.shared
    }

    /// Configured tenant store keys, sorted.
    #[must_use]
    pub fn tenant_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.inner.urls.keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Handle for a tenant store, connecting on first use.
    ///
    /// # Errors
    ///
    /// Returns `UnknownStore` for an unconfigured key, or the connection error.
    pub async fn tenant(&self, key: &str) -> Result<StoreHandle, StoreError> {
        if let Some(handle) = self.inner.open.get(key) {
            return Ok(handle.clone());
        }
        let url = self
            .inner
            .urls
            .get(key)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| StoreError::UnknownStore(key.to_string()))?;

        let conn = connect(url, self.inner.max_connections).await?;
        info!(store = key, "store connection opened");
        let handle = StoreHandle::new(StoreTarget::Tenant(key.to_string()), conn)
            .with_settings(self.inner.settings.clone());

        // A concurrent caller may have connected first; keep whichever landed.
        Ok(self
            .inner
            .open
            .entry(key.to_string())
            .or_insert(handle)
            .clone())
    }

    /// Handle for a routing decision.
    ///
    /// # Errors
    ///
    /// Same as [`StoreRegistry::tenant`].
    pub async fn handle_for(&self, target: &StoreTarget) -> Result<StoreHandle, StoreError> {
        match target {
            StoreTarget::Shared => Ok(self.shared().clone()),
            StoreTarget::Tenant(key) => self.tenant(key).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = LedgerSettings::default();
        assert_eq!(settings.timezone, chrono_tz::Europe::Rome);
        assert_eq!(settings.cash_account_name, "Cassa Agenzia");
        assert_eq!(settings.overdue_days, 3);
    }

    #[test]
    fn test_settings_from_config_rejects_bad_timezone() {
        let config = LedgerConfig {
            timezone: "Mars/Olympus".to_string(),
            ..LedgerConfig::default()
        };
        assert!(LedgerSettings::try_from(&config).is_err());
    }

    #[tokio::test]
    async fn test_unknown_tenant_key() {
        let shared = connect("sqlite::memory:", 5).await.unwrap();
        let registry = StoreRegistry::from_connections(shared, [], LedgerSettings::default());
        let err = registry.tenant("nowhere").await.unwrap_err();
        assert!(matches!(err, StoreError::UnknownStore(key) if key == "nowhere"));
        assert_eq!(registry.shared().label(), "shared");
    }
}
