//! Internal Diesel row structs for both stores.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. Each row converts to and from the domain
//! record it stores.

mod human_rows;
mod payroll_rows;

pub(crate) use human_rows::{DividendRow, HumanDepartmentRow, HumanEmployeeRow, HumanPositionRow};
pub(crate) use payroll_rows::{
    AttendanceRow, PayrollDepartmentRow, PayrollEmployeeRow, PayrollPositionRow, SalaryRow,
};
