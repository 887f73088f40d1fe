//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod human_store;
mod payroll_store;
mod store_error;
mod unit_of_work;

pub use human_store::{HumanSession, HumanStore};
#[cfg(test)]
pub use human_store::{MockHumanSession, MockHumanStore};
#[cfg(test)]
pub use payroll_store::{MockPayrollSession, MockPayrollStore};
pub use payroll_store::{PayrollSession, PayrollStore};
pub use store_error::StoreError;
pub use unit_of_work::{StagedWrite, WriteBuffer};
