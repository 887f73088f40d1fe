//! Connection settings loaded via OrthoConfig.

use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::StoreName;
use crate::outbound::persistence::PoolConfig;

/// Settings for reaching the two stores.
///
/// Values come from `HRSYNC_*` environment variables or a configuration
/// file; the binary layers its own flags on top.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "HRSYNC")]
pub struct SyncSettings {
    /// Connection URL for the human-resources database.
    pub human_database_url: Option<String>,
    /// Connection URL for the payroll database.
    pub payroll_database_url: Option<String>,
    /// Maximum pooled connections per store.
    #[ortho_config(default = 4)]
    pub pool_max_size: u32,
    /// Seconds to wait for a pooled connection.
    #[ortho_config(default = 30)]
    pub connection_timeout_secs: u64,
}

/// Configuration problems detected before any database is touched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// No URL was supplied for a store.
    #[error("{store} database URL missing: set --{store}-database-url or HRSYNC_{upper}_DATABASE_URL", upper = .store.as_str().to_uppercase())]
    MissingDatabaseUrl { store: StoreName },
    /// The supplied URL was blank.
    #[error("{store} database URL must not be empty")]
    EmptyDatabaseUrl { store: StoreName },
    /// A pool of zero connections cannot serve a session.
    #[error("pool_max_size must be at least 1")]
    EmptyPool,
}

impl SyncSettings {
    /// Replace URLs with explicit overrides where provided.
    pub fn with_overrides(mut self, human: Option<String>, payroll: Option<String>) -> Self {
        if human.is_some() {
            self.human_database_url = human;
        }
        if payroll.is_some() {
            self.payroll_database_url = payroll;
        }
        self
    }

    /// The configured URL for `store`.
    pub fn database_url(&self, store: StoreName) -> Result<&str, SettingsError> {
        let url = match store {
            StoreName::Human => self.human_database_url.as_deref(),
            StoreName::Payroll => self.payroll_database_url.as_deref(),
        }
        .ok_or(SettingsError::MissingDatabaseUrl { store })?;
        if url.trim().is_empty() {
            return Err(SettingsError::EmptyDatabaseUrl { store });
        }
        Ok(url)
    }

    /// Pool configuration for `store`.
    pub fn pool_config(&self, store: StoreName) -> Result<PoolConfig, SettingsError> {
        if self.pool_max_size == 0 {
            return Err(SettingsError::EmptyPool);
        }
        Ok(PoolConfig::new(store, self.database_url(store)?)
            .with_max_size(self.pool_max_size)
            .with_connection_timeout(Duration::from_secs(self.connection_timeout_secs)))
    }
}
