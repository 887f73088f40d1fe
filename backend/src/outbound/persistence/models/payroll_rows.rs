//! Rows for the payroll database.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::domain::{Attendance, PayrollDepartment, PayrollEmployee, PayrollPosition, Salary};
use crate::outbound::persistence::schema::payroll::{
    attendance, departments, employees, positions, salaries,
};

/// Department projection row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = departments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PayrollDepartmentRow {
    pub id: i32,
    pub name: String,
}

/// Position projection row.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = positions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PayrollPositionRow {
    pub id: i32,
    pub name: String,
}

/// Employee projection row. `None` writes `NULL` on update.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = employees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct PayrollEmployeeRow {
    pub id: i32,
    pub full_name: String,
    pub department_id: Option<i32>,
    pub position_id: Option<i32>,
    pub status: Option<String>,
}

/// Salary row (read only).
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = salaries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SalaryRow {
    pub id: i32,
    pub employee_id: Option<i32>,
    pub salary_month: NaiveDate,
    pub base_salary: Decimal,
    pub bonus: Decimal,
    pub deductions: Decimal,
    pub net_salary: Decimal,
    pub created_at: DateTime<Utc>,
}

/// Attendance row (read only).
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = attendance)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AttendanceRow {
    pub id: i32,
    pub employee_id: Option<i32>,
    pub work_days: i32,
    pub absent_days: i32,
    pub leave_days: i32,
    pub attendance_month: NaiveDate,
    pub created_at: DateTime<Utc>,
}

macro_rules! projection_row_conversions {
    ($row:ident, $record:ident { $($field:ident),+ $(,)? }) => {
        impl From<$row> for $record {
            fn from(row: $row) -> Self {
                Self { $($field: row.$field),+ }
            }
        }

        impl From<$record> for $row {
            fn from(record: $record) -> Self {
                Self { $($field: record.$field),+ }
            }
        }
    };
}

projection_row_conversions!(PayrollDepartmentRow, PayrollDepartment { id, name });
projection_row_conversions!(PayrollPositionRow, PayrollPosition { id, name });
projection_row_conversions!(PayrollEmployeeRow, PayrollEmployee {
    id,
    full_name,
    department_id,
    position_id,
    status,
});

impl From<SalaryRow> for Salary {
    fn from(row: SalaryRow) -> Self {
        Self {
            id: row.id,
            employee_id: row.employee_id,
            salary_month: row.salary_month,
            base_salary: row.base_salary,
            bonus: row.bonus,
            deductions: row.deductions,
            net_salary: row.net_salary,
            created_at: row.created_at,
        }
    }
}

impl From<AttendanceRow> for Attendance {
    fn from(row: AttendanceRow) -> Self {
        Self {
            id: row.id,
            employee_id: row.employee_id,
            work_days: row.work_days,
            absent_days: row.absent_days,
            leave_days: row.leave_days,
            attendance_month: row.attendance_month,
            created_at: row.created_at,
        }
    }
}
