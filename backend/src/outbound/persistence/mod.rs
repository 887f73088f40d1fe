//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Each store gets its own pool, its own schema module and its own adapter.
//! Sessions hold one pooled connection for their lifetime; staged writes are
//! applied inside a single transaction on commit.
//!
//! # Example
//!
//! ```ignore
//! use hrsync::outbound::persistence::{DbPool, DieselHumanStore, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new(StoreName::Human, "postgres://localhost/human")).await?;
//! let store = DieselHumanStore::new(pool);
//! ```

mod diesel_basic_error_mapping;
mod diesel_human_store;
mod diesel_payroll_store;
pub mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_human_store::DieselHumanStore;
pub use diesel_payroll_store::DieselPayrollStore;
pub use migrations::{MigrationError, run_pending};
pub use pool::{DbPool, PoolConfig, PoolError};
