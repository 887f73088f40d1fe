//! Record builders shared by unit and behaviour tests.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::domain::{Attendance, Department, Dividend, HumanEmployee, Position, Salary};

/// Fixed instant used for seeded rows and the default test clock.
pub fn fixture_timestamp() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2025, 3, 1, 9, 0, 0).single() {
        Some(instant) => instant,
        None => panic!("fixture timestamp must be unambiguous"),
    }
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid fixture date {year}-{month}-{day}"),
    }
}

/// Human-store employee in the given department and position.
pub fn employee(id: i32, name: &str, department_id: i32, position_id: i32) -> HumanEmployee {
    HumanEmployee {
        id,
        full_name: name.to_owned(),
        date_of_birth: date(1990, 4, 12),
        gender: None,
        phone_number: None,
        email: format!("employee{id}@example.com"),
        hire_date: date(2020, 1, 6),
        department_id: Some(department_id),
        position_id: Some(position_id),
        status: Some("Active".to_owned()),
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}

/// Human-store department.
pub fn department(id: i32, name: &str) -> Department {
    Department {
        id,
        name: name.to_owned(),
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}

/// Human-store position.
pub fn position(id: i32, name: &str) -> Position {
    Position {
        id,
        name: name.to_owned(),
        created_at: fixture_timestamp(),
        updated_at: fixture_timestamp(),
    }
}

/// Dividend of `amount` cents paid on the last day of January 2025.
pub fn dividend(id: i32, employee_id: i32, amount_cents: i64) -> Dividend {
    Dividend {
        id,
        employee_id: Some(employee_id),
        amount: Decimal::new(amount_cents, 2),
        dividend_date: date(2025, 1, 31),
        created_at: fixture_timestamp(),
    }
}

/// Salary line for the given month of 2025.
pub fn salary(id: i32, employee_id: i32, month: u32) -> Salary {
    let base = Decimal::new(1_500_000, 2);
    Salary {
        id,
        employee_id: Some(employee_id),
        salary_month: date(2025, month, 1),
        base_salary: base,
        bonus: Decimal::ZERO,
        deductions: Decimal::ZERO,
        net_salary: base,
        created_at: fixture_timestamp(),
    }
}

/// Attendance summary for the given month of 2025.
pub fn attendance(id: i32, employee_id: i32, month: u32) -> Attendance {
    Attendance {
        id,
        employee_id: Some(employee_id),
        work_days: 20,
        absent_days: 1,
        leave_days: 1,
        attendance_month: date(2025, month, 1),
        created_at: fixture_timestamp(),
    }
}
