//! Synchronization core for the human-resources and payroll databases.
//!
//! Employees, departments and positions exist in both stores under one
//! identifier. [`domain::sync::SyncService`] allocates identifiers, writes
//! both copies, refuses deletions that would orphan dependents and reports
//! how far the two copies have drifted.

pub mod config;
pub mod domain;
pub mod outbound;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
