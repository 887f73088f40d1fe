//! Port for the payroll store.
//!
//! Mirrors [`super::HumanStore`] for the payroll database, which holds the
//! projected employee/department/position copies plus salaries and
//! attendance.

use async_trait::async_trait;

use crate::domain::{Attendance, EmployeeLink, EntityKind, PayrollEmployee, PayrollRecord, Salary};

use super::{StagedWrite, StoreError};

/// Factory for payroll-store sessions.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PayrollStore: Send + Sync {
    /// Acquire a session backed by one connection.
    async fn open(&self) -> Result<Box<dyn PayrollSession>, StoreError>;
}

/// A unit of work against the payroll store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PayrollSession: Send {
    /// Largest committed identifier for the kind, `None` when the table is empty.
    async fn max_id(&mut self, kind: EntityKind) -> Result<Option<i32>, StoreError>;

    /// Fetch a projected shared-entity record by identifier.
    async fn find(
        &mut self,
        kind: EntityKind,
        id: i32,
    ) -> Result<Option<PayrollRecord>, StoreError>;

    /// Employees referencing a department or position, ordered by identifier.
    async fn employees_linked(
        &mut self,
        link: EmployeeLink,
    ) -> Result<Vec<PayrollEmployee>, StoreError>;

    /// Salary lines for an employee, ordered by identifier.
    async fn salaries_for(&mut self, employee_id: i32) -> Result<Vec<Salary>, StoreError>;

    /// Attendance rows for an employee, ordered by identifier.
    async fn attendance_for(&mut self, employee_id: i32) -> Result<Vec<Attendance>, StoreError>;

    /// Buffer a write until the next commit.
    fn stage(&mut self, write: StagedWrite<PayrollRecord>);

    /// Apply every staged write in one transaction.
    async fn commit(&mut self) -> Result<(), StoreError>;

    /// Discard staged writes.
    fn rollback(&mut self);
}
