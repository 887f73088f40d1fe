//! In-memory store adapters with failure injection.
//!
//! Both stores keep committed rows in ordered maps. Sessions buffer writes
//! and apply the whole batch atomically on commit, rejecting inserts over an
//! existing identifier and updates or deletes of missing rows, the way the
//! database adapters do. Cloning a store shares its state, so a test can keep
//! a handle after passing one to the service.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    HumanSession, HumanStore, PayrollSession, PayrollStore, StagedWrite, StoreError, WriteBuffer,
};
use crate::domain::{
    Attendance, Department, Dividend, EmployeeLink, EntityKind, HumanEmployee, HumanRecord,
    PayrollDepartment, PayrollEmployee, PayrollPosition, PayrollRecord, Position, Salary,
};

trait Keyed {
    fn key(&self) -> (EntityKind, i32);
}

impl Keyed for HumanRecord {
    fn key(&self) -> (EntityKind, i32) {
        (self.kind(), self.id())
    }
}

impl Keyed for PayrollRecord {
    fn key(&self) -> (EntityKind, i32) {
        (self.kind(), self.id())
    }
}

#[derive(Debug, Default)]
struct Faults {
    open: Option<StoreError>,
    reads: Option<StoreError>,
    commit: Option<StoreError>,
}

#[derive(Debug)]
struct State<R, X> {
    rows: BTreeMap<(EntityKind, i32), R>,
    extras: X,
    faults: Faults,
    commits: usize,
    sessions: usize,
}

impl<R, X: Default> Default for State<R, X> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            extras: X::default(),
            faults: Faults::default(),
            commits: 0,
            sessions: 0,
        }
    }
}

impl<R: Keyed + Clone, X> State<R, X> {
    fn check_reads(&self) -> Result<(), StoreError> {
        self.faults.reads.clone().map_or(Ok(()), Err)
    }

    fn max_id(&self, kind: EntityKind) -> Result<Option<i32>, StoreError> {
        self.check_reads()?;
        Ok(self
            .rows
            .range((kind, i32::MIN)..=(kind, i32::MAX))
            .next_back()
            .map(|((_, id), _)| *id))
    }

    fn find(&self, kind: EntityKind, id: i32) -> Result<Option<R>, StoreError> {
        self.check_reads()?;
        Ok(self.rows.get(&(kind, id)).cloned())
    }

    fn apply(&mut self, batch: Vec<StagedWrite<R>>) -> Result<(), StoreError> {
        if let Some(error) = self.faults.commit.take() {
            return Err(error);
        }
        let mut rows = self.rows.clone();
        for write in batch {
            match write {
                StagedWrite::Insert(row) => {
                    let key = row.key();
                    if rows.insert(key, row).is_some() {
                        return Err(StoreError::commit(format!(
                            "duplicate key {} {}",
                            key.0, key.1
                        )));
                    }
                }
                StagedWrite::Update(row) => {
                    let key = row.key();
                    if rows.insert(key, row).is_none() {
                        return Err(StoreError::commit(format!(
                            "no {} row with id {} to update",
                            key.0, key.1
                        )));
                    }
                }
                StagedWrite::Delete { kind, id } => {
                    if rows.remove(&(kind, id)).is_none() {
                        return Err(StoreError::commit(format!(
                            "no {kind} row with id {id} to delete"
                        )));
                    }
                }
            }
        }
        self.rows = rows;
        self.commits += 1;
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("in-memory store mutex poisoned"),
    }
}

macro_rules! store_controls {
    ($store:ident) => {
        impl $store {
            /// Make the next `open` fail with `error`.
            pub fn fail_next_open(&self, error: StoreError) {
                lock(&self.state).faults.open = Some(error);
            }

            /// Make every read fail with `error` until cleared.
            pub fn fail_reads(&self, error: StoreError) {
                lock(&self.state).faults.reads = Some(error);
            }

            /// Make the next commit fail with `error`; staged writes are not applied.
            pub fn fail_next_commit(&self, error: StoreError) {
                lock(&self.state).faults.commit = Some(error);
            }

            /// Remove every injected failure.
            pub fn clear_faults(&self) {
                lock(&self.state).faults = Faults::default();
            }

            /// Number of successful commits so far.
            pub fn commit_count(&self) -> usize {
                lock(&self.state).commits
            }

            /// Number of sessions not yet dropped.
            pub fn open_sessions(&self) -> usize {
                lock(&self.state).sessions
            }
        }
    };
}

#[derive(Debug, Default)]
struct HumanExtras {
    dividends: BTreeMap<i32, Dividend>,
}

/// In-memory human store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryHumanStore {
    state: Arc<Mutex<State<HumanRecord, HumanExtras>>>,
}

store_controls!(InMemoryHumanStore);

impl InMemoryHumanStore {
    /// Seed a committed employee row.
    pub fn seed_employee(&self, employee: HumanEmployee) {
        let mut state = lock(&self.state);
        state
            .rows
            .insert((EntityKind::Employee, employee.id), HumanRecord::Employee(employee));
    }

    /// Seed a committed department row.
    pub fn seed_department(&self, department: Department) {
        let mut state = lock(&self.state);
        state.rows.insert(
            (EntityKind::Department, department.id),
            HumanRecord::Department(department),
        );
    }

    /// Seed a committed position row.
    pub fn seed_position(&self, position: Position) {
        let mut state = lock(&self.state);
        state
            .rows
            .insert((EntityKind::Position, position.id), HumanRecord::Position(position));
    }

    /// Seed a dividend.
    pub fn seed_dividend(&self, dividend: Dividend) {
        lock(&self.state).extras.dividends.insert(dividend.id, dividend);
    }

    /// Committed record, if any.
    pub fn record(&self, kind: EntityKind, id: i32) -> Option<HumanRecord> {
        lock(&self.state).rows.get(&(kind, id)).cloned()
    }

    /// Committed employee, if any.
    pub fn employee(&self, id: i32) -> Option<HumanEmployee> {
        match self.record(EntityKind::Employee, id) {
            Some(HumanRecord::Employee(employee)) => Some(employee),
            _ => None,
        }
    }
}

#[async_trait]
impl HumanStore for InMemoryHumanStore {
    async fn open(&self) -> Result<Box<dyn HumanSession>, StoreError> {
        {
            let mut state = lock(&self.state);
            if let Some(error) = state.faults.open.take() {
                return Err(error);
            }
            state.sessions += 1;
        }
        Ok(Box::new(InMemoryHumanSession {
            state: Arc::clone(&self.state),
            buffer: WriteBuffer::default(),
        }))
    }
}

struct InMemoryHumanSession {
    state: Arc<Mutex<State<HumanRecord, HumanExtras>>>,
    buffer: WriteBuffer<HumanRecord>,
}

impl Drop for InMemoryHumanSession {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        state.sessions = state.sessions.saturating_sub(1);
    }
}

#[async_trait]
impl HumanSession for InMemoryHumanSession {
    async fn max_id(&mut self, kind: EntityKind) -> Result<Option<i32>, StoreError> {
        lock(&self.state).max_id(kind)
    }

    async fn find(&mut self, kind: EntityKind, id: i32) -> Result<Option<HumanRecord>, StoreError> {
        lock(&self.state).find(kind, id)
    }

    async fn employees_linked(
        &mut self,
        link: EmployeeLink,
    ) -> Result<Vec<HumanEmployee>, StoreError> {
        let state = lock(&self.state);
        state.check_reads()?;
        Ok(state
            .rows
            .values()
            .filter_map(|row| match row {
                HumanRecord::Employee(employee) => Some(employee),
                _ => None,
            })
            .filter(|employee| match link {
                EmployeeLink::Department(id) => employee.department_id == Some(id),
                EmployeeLink::Position(id) => employee.position_id == Some(id),
            })
            .cloned()
            .collect())
    }

    async fn dividends_for(&mut self, employee_id: i32) -> Result<Vec<Dividend>, StoreError> {
        let state = lock(&self.state);
        state.check_reads()?;
        Ok(state
            .extras
            .dividends
            .values()
            .filter(|dividend| dividend.employee_id == Some(employee_id))
            .cloned()
            .collect())
    }

    fn stage(&mut self, write: StagedWrite<HumanRecord>) {
        self.buffer.push(write);
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        let batch = self.buffer.drain();
        lock(&self.state).apply(batch)
    }

    fn rollback(&mut self) {
        self.buffer.clear();
    }
}

#[derive(Debug, Default)]
struct PayrollExtras {
    salaries: BTreeMap<i32, Salary>,
    attendance: BTreeMap<i32, Attendance>,
}

/// In-memory payroll store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPayrollStore {
    state: Arc<Mutex<State<PayrollRecord, PayrollExtras>>>,
}

store_controls!(InMemoryPayrollStore);

impl InMemoryPayrollStore {
    /// Seed a committed employee projection.
    pub fn seed_employee(&self, employee: PayrollEmployee) {
        let mut state = lock(&self.state);
        state.rows.insert(
            (EntityKind::Employee, employee.id),
            PayrollRecord::Employee(employee),
        );
    }

    /// Seed a committed department projection.
    pub fn seed_department(&self, department: PayrollDepartment) {
        let mut state = lock(&self.state);
        state.rows.insert(
            (EntityKind::Department, department.id),
            PayrollRecord::Department(department),
        );
    }

    /// Seed a committed position projection.
    pub fn seed_position(&self, position: PayrollPosition) {
        let mut state = lock(&self.state);
        state.rows.insert(
            (EntityKind::Position, position.id),
            PayrollRecord::Position(position),
        );
    }

    /// Seed a salary line.
    pub fn seed_salary(&self, salary: Salary) {
        lock(&self.state).extras.salaries.insert(salary.id, salary);
    }

    /// Seed an attendance row.
    pub fn seed_attendance(&self, attendance: Attendance) {
        lock(&self.state)
            .extras
            .attendance
            .insert(attendance.id, attendance);
    }

    /// Committed record, if any.
    pub fn record(&self, kind: EntityKind, id: i32) -> Option<PayrollRecord> {
        lock(&self.state).rows.get(&(kind, id)).cloned()
    }

    /// Committed employee projection, if any.
    pub fn employee(&self, id: i32) -> Option<PayrollEmployee> {
        match self.record(EntityKind::Employee, id) {
            Some(PayrollRecord::Employee(employee)) => Some(employee),
            _ => None,
        }
    }
}

#[async_trait]
impl PayrollStore for InMemoryPayrollStore {
    async fn open(&self) -> Result<Box<dyn PayrollSession>, StoreError> {
        {
            let mut state = lock(&self.state);
            if let Some(error) = state.faults.open.take() {
                return Err(error);
            }
            state.sessions += 1;
        }
        Ok(Box::new(InMemoryPayrollSession {
            state: Arc::clone(&self.state),
            buffer: WriteBuffer::default(),
        }))
    }
}

struct InMemoryPayrollSession {
    state: Arc<Mutex<State<PayrollRecord, PayrollExtras>>>,
    buffer: WriteBuffer<PayrollRecord>,
}

impl Drop for InMemoryPayrollSession {
    fn drop(&mut self) {
        let mut state = lock(&self.state);
        state.sessions = state.sessions.saturating_sub(1);
    }
}

#[async_trait]
impl PayrollSession for InMemoryPayrollSession {
    async fn max_id(&mut self, kind: EntityKind) -> Result<Option<i32>, StoreError> {
        lock(&self.state).max_id(kind)
    }

    async fn find(
        &mut self,
        kind: EntityKind,
        id: i32,
    ) -> Result<Option<PayrollRecord>, StoreError> {
        lock(&self.state).find(kind, id)
    }

    async fn employees_linked(
        &mut self,
        link: EmployeeLink,
    ) -> Result<Vec<PayrollEmployee>, StoreError> {
        let state = lock(&self.state);
        state.check_reads()?;
        Ok(state
            .rows
            .values()
            .filter_map(|row| match row {
                PayrollRecord::Employee(employee) => Some(employee),
                _ => None,
            })
            .filter(|employee| match link {
                EmployeeLink::Department(id) => employee.department_id == Some(id),
                EmployeeLink::Position(id) => employee.position_id == Some(id),
            })
            .cloned()
            .collect())
    }

    async fn salaries_for(&mut self, employee_id: i32) -> Result<Vec<Salary>, StoreError> {
        let state = lock(&self.state);
        state.check_reads()?;
        Ok(state
            .extras
            .salaries
            .values()
            .filter(|salary| salary.employee_id == Some(employee_id))
            .cloned()
            .collect())
    }

    async fn attendance_for(&mut self, employee_id: i32) -> Result<Vec<Attendance>, StoreError> {
        let state = lock(&self.state);
        state.check_reads()?;
        Ok(state
            .extras
            .attendance
            .values()
            .filter(|row| row.employee_id == Some(employee_id))
            .cloned()
            .collect())
    }

    fn stage(&mut self, write: StagedWrite<PayrollRecord>) {
        self.buffer.push(write);
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        let batch = self.buffer.drain();
        lock(&self.state).apply(batch)
    }

    fn rollback(&mut self) {
        self.buffer.clear();
    }
}
