//! PostgreSQL-backed human store.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::Error as DieselError;
use diesel_async::AsyncConnection as _;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use crate::domain::ports::{HumanSession, HumanStore, StagedWrite, StoreError, WriteBuffer};
use crate::domain::{Dividend, EmployeeLink, EntityKind, HumanEmployee, HumanRecord};

use super::diesel_basic_error_mapping::{map_commit_error, map_pool_error, map_read_error};
use super::models::{DividendRow, HumanDepartmentRow, HumanEmployeeRow, HumanPositionRow};
use super::pool::DbPool;
use super::schema::human::{departments, dividends, employees, positions};

/// Diesel-backed implementation of the human store port.
#[derive(Clone)]
pub struct DieselHumanStore {
    pool: DbPool,
}

impl DieselHumanStore {
    /// Create a store over the human database pool.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let pool = DbPool::new(PoolConfig::new(StoreName::Human, "postgres://localhost/human")).await?;
    /// let store = DieselHumanStore::new(pool);
    /// ```
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HumanStore for DieselHumanStore {
    async fn open(&self) -> Result<Box<dyn HumanSession>, StoreError> {
        let conn = self.pool.get_owned().await.map_err(map_pool_error)?;
        Ok(Box::new(DieselHumanSession {
            conn,
            buffer: WriteBuffer::default(),
        }))
    }
}

struct DieselHumanSession {
    conn: PooledConnection<'static, AsyncPgConnection>,
    buffer: WriteBuffer<HumanRecord>,
}

#[async_trait]
impl HumanSession for DieselHumanSession {
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

    async fn find(&mut self, kind: EntityKind, id: i32) -> Result<Option<HumanRecord>, StoreError> {
        let conn = &mut *self.conn;
        let result = match kind {
            EntityKind::Employee => employees::table
                .find(id)
                .select(HumanEmployeeRow::as_select())
                .first(conn)
                .await
                .optional()
                .map(|row| row.map(|row| HumanRecord::Employee(row.into()))),
            EntityKind::Department => departments::table
                .find(id)
                .select(HumanDepartmentRow::as_select())
                .first(conn)
                .await
                .optional()
                .map(|row| row.map(|row| HumanRecord::Department(row.into()))),
            EntityKind::Position => positions::table
                .find(id)
                .select(HumanPositionRow::as_select())
                .first(conn)
                .await
                .optional()
                .map(|row| row.map(|row| HumanRecord::Position(row.into()))),
        };
        result.map_err(map_read_error)
    }

    async fn employees_linked(
        &mut self,
        link: EmployeeLink,
    ) -> Result<Vec<HumanEmployee>, StoreError> {
        let query = employees::table
            .select(HumanEmployeeRow::as_select())
            .order_by(employees::id)
            .into_boxed();
        let query = match link {
            EmployeeLink::Department(id) => query.filter(employees::department_id.eq(id)),
            EmployeeLink::Position(id) => query.filter(employees::position_id.eq(id)),
        };
        let rows: Vec<HumanEmployeeRow> = query
            .load(&mut *self.conn)
            .await
            .map_err(map_read_error)?;
        Ok(rows.into_iter().map(HumanEmployee::from).collect())
    }

    async fn dividends_for(&mut self, employee_id: i32) -> Result<Vec<Dividend>, StoreError> {
        let rows: Vec<DividendRow> = dividends::table
            .filter(dividends::employee_id.eq(employee_id))
            .order_by(dividends::id)
            .select(DividendRow::as_select())
            .load(&mut *self.conn)
            .await
            .map_err(map_read_error)?;
        Ok(rows.into_iter().map(Dividend::from).collect())
    }

    fn stage(&mut self, write: StagedWrite<HumanRecord>) {
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
    write: StagedWrite<HumanRecord>,
) -> Result<(), DieselError> {
    let affected = match write {
        StagedWrite::Insert(HumanRecord::Employee(record)) => {
            diesel::insert_into(employees::table)
                .values(HumanEmployeeRow::from(record))
                .execute(conn)
                .await?
        }
        StagedWrite::Insert(HumanRecord::Department(record)) => {
            diesel::insert_into(departments::table)
                .values(HumanDepartmentRow::from(record))
                .execute(conn)
                .await?
        }
        StagedWrite::Insert(HumanRecord::Position(record)) => {
            diesel::insert_into(positions::table)
                .values(HumanPositionRow::from(record))
                .execute(conn)
                .await?
        }
        StagedWrite::Update(HumanRecord::Employee(record)) => {
            let row = HumanEmployeeRow::from(record);
            diesel::update(employees::table.find(row.id))
                .set(&row)
                .execute(conn)
                .await?
        }
        StagedWrite::Update(HumanRecord::Department(record)) => {
            let row = HumanDepartmentRow::from(record);
            diesel::update(departments::table.find(row.id))
                .set(&row)
                .execute(conn)
                .await?
        }
        StagedWrite::Update(HumanRecord::Position(record)) => {
            let row = HumanPositionRow::from(record);
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
