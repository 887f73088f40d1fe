//! Rows for the human-resources database.

use chrono::{DateTime, NaiveDate, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;

use crate::domain::{Department, Dividend, HumanEmployee, Position};
use crate::outbound::persistence::schema::human::{departments, dividends, employees, positions};

/// Department row; doubles as insert and full-row changeset.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = departments)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HumanDepartmentRow {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Position row; doubles as insert and full-row changeset.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = positions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct HumanPositionRow {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Employee row. `None` writes `NULL` on update so cleared references stick.
#[derive(Debug, Clone, Queryable, Selectable, Insertable, AsChangeset)]
#[diesel(table_name = employees)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[diesel(treat_none_as_null = true)]
pub(crate) struct HumanEmployeeRow {
    pub id: i32,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub email: String,
    pub hire_date: NaiveDate,
    pub department_id: Option<i32>,
    pub position_id: Option<i32>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dividend row (read only).
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = dividends)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct DividendRow {
    pub id: i32,
    pub employee_id: Option<i32>,
    pub amount: Decimal,
    pub dividend_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

macro_rules! org_unit_row_conversions {
    ($row:ident, $record:ident) => {
        impl From<$row> for $record {
            fn from(row: $row) -> Self {
                Self {
                    id: row.id,
                    name: row.name,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }
            }
        }

        impl From<$record> for $row {
            fn from(record: $record) -> Self {
                Self {
                    id: record.id,
                    name: record.name,
                    created_at: record.created_at,
                    updated_at: record.updated_at,
                }
            }
        }
    };
}

org_unit_row_conversions!(HumanDepartmentRow, Department);
org_unit_row_conversions!(HumanPositionRow, Position);

impl From<HumanEmployeeRow> for HumanEmployee {
    fn from(row: HumanEmployeeRow) -> Self {
        Self {
            id: row.id,
            full_name: row.full_name,
            date_of_birth: row.date_of_birth,
            gender: row.gender,
            phone_number: row.phone_number,
            email: row.email,
            hire_date: row.hire_date,
            department_id: row.department_id,
            position_id: row.position_id,
            status: row.status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl From<HumanEmployee> for HumanEmployeeRow {
    fn from(record: HumanEmployee) -> Self {
        Self {
            id: record.id,
            full_name: record.full_name,
            date_of_birth: record.date_of_birth,
            gender: record.gender,
            phone_number: record.phone_number,
            email: record.email,
            hire_date: record.hire_date,
            department_id: record.department_id,
            position_id: record.position_id,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<DividendRow> for Dividend {
    fn from(row: DividendRow) -> Self {
        Self {
            id: row.id,
            employee_id: row.employee_id,
            amount: row.amount,
            dividend_date: row.dividend_date,
            created_at: row.created_at,
        }
    }
}
