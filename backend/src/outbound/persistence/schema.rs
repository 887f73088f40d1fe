//! Diesel table definitions for the two PostgreSQL schemas.
//!
//! These definitions must match `migrations/human` and `migrations/payroll`
//! exactly. The two databases share table names, so each lives in its own
//! module.
//!
//! # Maintenance
//!
//! When migrations change, regenerate with `diesel print-schema` against a
//! live database of the matching store.

/// Tables in the human-resources database.
pub(crate) mod human {
    diesel::table! {
        /// Departments with audit timestamps.
        departments (id) {
            /// Shared identifier, assigned by the allocator.
            id -> Int4,
            name -> Varchar,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        /// Positions with audit timestamps.
        positions (id) {
            /// Shared identifier, assigned by the allocator.
            id -> Int4,
            name -> Varchar,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        /// Full personnel records.
        employees (id) {
            /// Shared identifier, assigned by the allocator.
            id -> Int4,
            full_name -> Varchar,
            date_of_birth -> Date,
            gender -> Nullable<Varchar>,
            phone_number -> Nullable<Varchar>,
            /// Unique across employees.
            email -> Varchar,
            hire_date -> Date,
            department_id -> Nullable<Int4>,
            position_id -> Nullable<Int4>,
            status -> Nullable<Varchar>,
            created_at -> Timestamptz,
            updated_at -> Timestamptz,
        }
    }

    diesel::table! {
        /// Dividends paid to employees.
        dividends (id) {
            id -> Int4,
            employee_id -> Nullable<Int4>,
            amount -> Numeric,
            dividend_date -> Date,
            created_at -> Timestamptz,
        }
    }

    diesel::joinable!(employees -> departments (department_id));
    diesel::joinable!(employees -> positions (position_id));
    diesel::joinable!(dividends -> employees (employee_id));

    diesel::allow_tables_to_appear_in_same_query!(departments, positions, employees, dividends);
}

/// Tables in the payroll database.
pub(crate) mod payroll {
    diesel::table! {
        /// Department projection.
        departments (id) {
            id -> Int4,
            name -> Varchar,
        }
    }

    diesel::table! {
        /// Position projection.
        positions (id) {
            id -> Int4,
            name -> Varchar,
        }
    }

    diesel::table! {
        /// Employee projection used for payroll joins.
        employees (id) {
            id -> Int4,
            full_name -> Varchar,
            department_id -> Nullable<Int4>,
            position_id -> Nullable<Int4>,
            status -> Nullable<Varchar>,
        }
    }

    diesel::table! {
        /// Monthly salary lines.
        salaries (id) {
            id -> Int4,
            employee_id -> Nullable<Int4>,
            /// First day of the month the line covers.
            salary_month -> Date,
            base_salary -> Numeric,
            bonus -> Numeric,
            deductions -> Numeric,
            net_salary -> Numeric,
            created_at -> Timestamptz,
        }
    }

    diesel::table! {
        /// Monthly attendance summaries.
        attendance (id) {
            id -> Int4,
            employee_id -> Nullable<Int4>,
            work_days -> Int4,
            absent_days -> Int4,
            leave_days -> Int4,
            /// First day of the month the summary covers.
            attendance_month -> Date,
            created_at -> Timestamptz,
        }
    }

    diesel::joinable!(employees -> departments (department_id));
    diesel::joinable!(employees -> positions (position_id));
    diesel::joinable!(salaries -> employees (employee_id));
    diesel::joinable!(attendance -> employees (employee_id));

    diesel::allow_tables_to_appear_in_same_query!(
        departments,
        positions,
        employees,
        salaries,
        attendance,
    );
}
