//! Store-specific records and the per-store record envelopes.
//!
//! Dividends live only in the human store; salaries and attendance only in
//! the payroll store. None of them are synchronized, but all of them block
//! deletion of the employee they reference.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::employee::{HumanEmployee, PayrollEmployee};
use super::entity_kind::EntityKind;
use super::org_unit::{Department, PayrollDepartment, PayrollPosition, Position};

/// Dividend paid to an employee (human store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dividend {
    pub id: i32,
    pub employee_id: Option<i32>,
    pub amount: Decimal,
    pub dividend_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Monthly salary line (payroll store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Salary {
    pub id: i32,
    pub employee_id: Option<i32>,
    pub salary_month: NaiveDate,
    pub base_salary: Decimal,
    pub bonus: Decimal,
    pub deductions: Decimal,
    pub net_salary: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Monthly attendance summary (payroll store).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendance {
    pub id: i32,
    pub employee_id: Option<i32>,
    pub work_days: i32,
    pub absent_days: i32,
    pub leave_days: i32,
    pub attendance_month: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// A foreign-key style reference from an employee to a shared unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmployeeLink {
    /// Employees whose department reference equals the identifier.
    Department(i32),
    /// Employees whose position reference equals the identifier.
    Position(i32),
}

/// A shared-entity record as stored in the human store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HumanRecord {
    Employee(HumanEmployee),
    Department(Department),
    Position(Position),
}

impl HumanRecord {
    /// Kind of the wrapped record.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Employee(_) => EntityKind::Employee,
            Self::Department(_) => EntityKind::Department,
            Self::Position(_) => EntityKind::Position,
        }
    }

    /// Identifier of the wrapped record.
    pub fn id(&self) -> i32 {
        match self {
            Self::Employee(record) => record.id,
            Self::Department(record) => record.id,
            Self::Position(record) => record.id,
        }
    }
}

/// A shared-entity projection as stored in the payroll store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayrollRecord {
    Employee(PayrollEmployee),
    Department(PayrollDepartment),
    Position(PayrollPosition),
}

impl PayrollRecord {
    /// Kind of the wrapped record.
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Employee(_) => EntityKind::Employee,
            Self::Department(_) => EntityKind::Department,
            Self::Position(_) => EntityKind::Position,
        }
    }

    /// Identifier of the wrapped record.
    pub fn id(&self) -> i32 {
        match self {
            Self::Employee(record) => record.id,
            Self::Department(record) => record.id,
            Self::Position(record) => record.id,
        }
    }
}
