//! Port for the human-resources store.
//!
//! The [`HumanStore`] hands out request-scoped [`HumanSession`]s. A session
//! holds one connection for its lifetime and releases it when dropped, on
//! every exit path. Writes are staged and only reach the database on
//! [`HumanSession::commit`].

use async_trait::async_trait;

use crate::domain::{Dividend, EmployeeLink, EntityKind, HumanEmployee, HumanRecord};

use super::{StagedWrite, StoreError};

/// Factory for human-store sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HumanStore: Send + Sync {
    /// Acquire a session backed by one connection.
    async fn open(&self) -> Result<Box<dyn HumanSession>, StoreError>;
}

/// A unit of work against the human store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HumanSession: Send {
    /// Largest committed identifier for the kind, `None` when the table is empty.
    async fn max_id(&mut self, kind: EntityKind) -> Result<Option<i32>, StoreError>;

    /// Fetch a shared-entity record by identifier.
    async fn find(&mut self, kind: EntityKind, id: i32) -> Result<Option<HumanRecord>, StoreError>;

    /// Employees referencing a department or position, ordered by identifier.
    async fn employees_linked(
        &mut self,
        link: EmployeeLink,
    ) -> Result<Vec<HumanEmployee>, StoreError>;

    /// Dividends paid to an employee, ordered by identifier.
    async fn dividends_for(&mut self, employee_id: i32) -> Result<Vec<Dividend>, StoreError>;

    /// Buffer a write until the next commit.
    fn stage(&mut self, write: StagedWrite<HumanRecord>);

    /// Apply every staged write in one transaction.
    async fn commit(&mut self) -> Result<(), StoreError>;

    /// Discard staged writes.
    fn rollback(&mut self);
}
