//! Embedded schema migrations for both stores.
//!
//! Migrations run over a blocking `PgConnection`; call [`run_pending`] from
//! `spawn_blocking` when inside an async runtime.

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::StoreName;

const HUMAN_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/human");
const PAYROLL_MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations/payroll");

/// Errors raised while migrating a store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    /// The database could not be reached.
    #[error("failed to connect to the {store} database: {message}")]
    Connect { store: StoreName, message: String },
    /// A migration failed to apply.
    #[error("{store} migrations failed: {message}")]
    Apply { store: StoreName, message: String },
}

/// Apply every pending migration for `store`; returns the applied versions.
pub fn run_pending(store: StoreName, database_url: &str) -> Result<Vec<String>, MigrationError> {
    let mut conn = PgConnection::establish(database_url).map_err(|err| MigrationError::Connect {
        store,
        message: err.to_string(),
    })?;
    let migrations = match store {
        StoreName::Human => HUMAN_MIGRATIONS,
        StoreName::Payroll => PAYROLL_MIGRATIONS,
    };
    let applied = conn
        .run_pending_migrations(migrations)
        .map_err(|err| MigrationError::Apply {
            store,
            message: err.to_string(),
        })?
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>();
    info!(%store, count = applied.len(), "applied pending migrations");
    Ok(applied)
}
