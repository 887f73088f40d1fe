//! Domain primitives and the synchronization core.
//!
//! Purpose: define the strongly typed records shared by the human and payroll
//! stores, the transport-agnostic error payload, and the `sync` core that
//! keeps the two stores aligned. Serialisation contracts (serde, camelCase)
//! are documented on each type.
//!
//! Public surface:
//! - Error / ErrorCode: error payload returned by every core operation.
//! - StoreName / StoreSet: which store(s) something happened in.
//! - EntityKind: the three shared kinds.
//! - Record types for each store, plus create and update payloads.
//! - `sync::SyncService`: the dual-store writer.

pub mod entity_kind;
pub mod error;
pub mod ports;
pub mod store;
pub mod sync;
pub mod user;

mod employee;
mod org_unit;
mod patch;
mod records;

pub use self::employee::{
    DEFAULT_EMPLOYEE_STATUS, EmployeePatch, HumanEmployee, NewEmployee, PayrollEmployee,
};
pub use self::entity_kind::{EntityKind, UnknownEntityKind};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::org_unit::{
    Department, DepartmentPatch, NewDepartment, NewPosition, PayrollDepartment, PayrollPosition,
    Position, PositionPatch,
};
pub use self::records::{Attendance, Dividend, EmployeeLink, HumanRecord, PayrollRecord, Salary};
pub use self::store::{StoreName, StoreSet};
pub use self::user::{Role, UnknownRoleError, User};

