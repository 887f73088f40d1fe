//! PostgreSQL-backed payroll store.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::AsyncConnection as _;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{PayrollSession, PayrollStore, StagedWrite, StoreError, WriteBuffer};
use crate::domain::{Attendance, EmployeeLink, EntityKind, PayrollEmployee, PayrollRecord, Salary};

use super::diesel_basic_error_mapping::{map_commit_error, map_pool_error, map_read_error};
use super::models::{
    AttendanceRow, PayrollDepartmentRow, PayrollEmployeeRow, PayrollPositionRow, SalaryRow,
};
use super::pool::DbPool;
use super::schema::payroll::{attendance, departments, employees, positions, salaries};

/// Diesel-backed implementation of the payroll store port.
#[derive(Clone)]
pub struct DieselPayrollStore {
    pool: DbPool,
}

impl DieselPayrollStore {
    /// Create a store over the payroll database pool.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let pool = DbPool::new(PoolConfig::new(StoreName::Payroll, "postgres://localhost/payroll")).await?;
    /// let store = DieselPayrollStore::new(pool);
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PayrollStore for DieselPayrollStore {
    async fn open(&self) -> Result<Box<dyn PayrollSession>, StoreError> {
        let conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        Ok(Box::new(DieselPayrollSession {
            conn,
            buffer: WriteBuffer::default(),
        }))
    }
}

struct DieselPayrollSession {
    conn: PooledConnection<'static, AsyncPgConnection>,
    buffer: WriteBuffer<PayrollRecord>,
}

#[async_trait]
impl PayrollSession for DieselPayrollSession {
    async fn max_id(&mut self, kind: EntityKind) -> Result<Option<i32>, StoreError> {
        let conn = &mut *self.conn;
        let result = match kind {
            EntityKind::Employee => {
                employees::table
                    .select(diesel::dsl::max(employees::id))
                    .get_result::<Option<i32>>(conn)
                    .await
            }
            EntityKind::Department => {
                departments::table
                    .select(diesel::dsl::max(departments::id))
                    .get_result::<Option<i32>>(conn)
                    .await
            }
            EntityKind::Position => {
                positions::table
                    .select(diesel::dsl::max(positions::id))
                    .get_result::<Option<i32>>(conn)
                    .await
            }
        };
        result.map_err(map_read_error)
    }

    async fn find(
        &mut self,
        kind: EntityKind,
        id: i32,
    ) -> Result<Option<PayrollRecord>, StoreError> {
        let conn = &mut *self.conn;
        let result = match kind {
            EntityKind::Employee => employees::table
                .find(id)
                .select(PayrollEmployeeRow::as_select())
                .first(conn)
                .await
                .optional()
                .map(|row| row.map(|row| PayrollRecord::Employee(row.into()))),
            EntityKind::Department => departments::table
                .find(id)
                .select(PayrollDepartmentRow::as_select())
                .first(conn)
                .await
                .optional()
                .map(|row| row.map(|row| PayrollRecord::Department(row.into()))),
            EntityKind::Position => positions::table
                .find(id)
                .select(PayrollPositionRow::as_select())
                .first(conn)
                .await
                .optional()
                .map(|row| row.map(|row| PayrollRecord::Position(row.into()))),
        };
        result.map_err(map_read_error)
    }

    async fn employees_linked(
        &mut self,
        link: EmployeeLink,
    ) -> Result<Vec<PayrollEmployee>, StoreError> {
        let query = employees::table
            .select(PayrollEmployeeRow::as_select())
            .order_by(employees::id)
            .into_boxed();
        let query = match link {
            EmployeeLink::Department(id) => query.filter(employees::department_id.eq(id)),
            EmployeeLink::Position(id) => query.filter(employees::position_id.eq(id)),
        };
        let rows: Vec<PayrollEmployeeRow> = query
            .load(&mut *self.conn)
            .await
            .map_err(map_read_error)?;
        Ok(rows.into_iter().map(PayrollEmployee::from).collect())
    }

    async fn salaries_for(&mut self, employee_id: i32) -> Result<Vec<Salary>, StoreError> {
        let rows: Vec<SalaryRow> = salaries::table
            .filter(salaries::employee_id.eq(employee_id))
            .order_by(salaries::id)
            .select(SalaryRow::as_select())
            .load(&mut *self.conn)
            .await
            .map_err(map_read_error)?;
        Ok(rows.into_iter().map(Salary::from).collect())
    }

    async fn attendance_for(&mut self, employee_id: i32) -> Result<Vec<Attendance>, StoreError> {
        let rows: Vec<AttendanceRow> = attendance::table
            .filter(attendance::employee_id.eq(employee_id))
            .order_by(attendance::id)
            .select(AttendanceRow::as_select())
            .load(&mut *self.conn)
            .await
            .map_err(map_read_error)?;
        Ok(rows.into_iter().map(Attendance::from).collect())
    }

    fn stage(&mut self, write: StagedWrite<PayrollRecord>) {
        self.buffer.push(write);
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        let batch = self.buffer.drain();
        if batch.is_empty() {
            return Ok(());
        }
        self.conn
            .transaction(|conn| {
                async move {
                    for write in batch {
                        apply_write(conn, write).await?;
                    }
                    Ok::<(), DieselError>(())
                }
                .scope_boxed()
            })
            .await
            .map_err(map_commit_error)
    }

    fn rollback(&mut self) {
        self.buffer.clear();
    }
}

async fn apply_write(
    conn: &mut AsyncPgConnection,
    write: StagedWrite<PayrollRecord>,
) -> Result<(), DieselError> {
    let affected = match write {
        StagedWrite::Insert(PayrollRecord::Employee(record)) => {
            diesel::insert_into(employees::table)
                .values(PayrollEmployeeRow::from(record))
                .execute(conn)
                .await?
        }
        StagedWrite::Insert(PayrollRecord::Department(record)) => {
            diesel::insert_into(departments::table)
                .values(PayrollDepartmentRow::from(record))
                .execute(conn)
                .await?
        }
        StagedWrite::Insert(PayrollRecord::Position(record)) => {
            diesel::insert_into(positions::table)
                .values(PayrollPositionRow::from(record))
                .execute(conn)
                .await?
        }
        StagedWrite::Update(PayrollRecord::Employee(record)) => {
            let row = PayrollEmployeeRow::from(record);
            diesel::update(employees::table.find(row.id))
                .set(&row)
                .execute(conn)
                .await?
        }
        StagedWrite::Update(PayrollRecord::Department(record)) => {
            let row = PayrollDepartmentRow::from(record);
            diesel::update(departments::table.find(row.id))
                .set(&row)
                .execute(conn)
                .await?
        }
        StagedWrite::Update(PayrollRecord::Position(record)) => {
            let row = PayrollPositionRow::from(record);
            diesel::update(positions::table.find(row.id))
                .set(&row)
                .execute(conn)
                .await?
        }
        StagedWrite::Delete { kind, id } => match kind {
            EntityKind::Employee => {
                diesel::delete(employees::table.find(id))
                    .execute(conn)
                    .await?
            }
            EntityKind::Department => {
                diesel::delete(departments::table.find(id))
                    .execute(conn)
                    .await?
            }
            EntityKind::Position => {
                diesel::delete(positions::table.find(id))
                    .execute(conn)
                    .await?
            }
        },
    };
    if affected == 0 {
        return Err(DieselError::NotFound);
    }
    Ok(())
}
