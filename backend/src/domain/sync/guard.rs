//! Referential guard run before deletes.
//!
//! Neither database can see the other's rows, so the foreign keys that cross
//! stores are checked here. The guard reads both stores, merges what it finds
//! by `(kind, id)` and reports where each dependent lives. Callers render the
//! listing directly, so ordering is fixed: identifier ascending, then kind.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::json;
use tracing::warn;

use crate::domain::ports::{HumanSession, PayrollSession};
use crate::domain::{EmployeeLink, EntityKind, Error, StoreName, StoreSet};

use super::report::store_read_error;

/// What kind of row references the entity being deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DependentKind {
    Employee,
    Dividend,
    Salary,
    Attendance,
}

impl fmt::Display for DependentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Employee => "employee",
            Self::Dividend => "dividend",
            Self::Salary => "salary",
            Self::Attendance => "attendance",
        })
    }
}

/// A row blocking deletion, annotated with every store it was found in.
///
/// `source` serialises as a comma-joined list such as `"human, payroll"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependent {
    pub kind: DependentKind,
    pub id: i32,
    pub name: String,
    pub source: StoreSet,
}

/// Accumulates dependents found across stores.
#[derive(Debug, Default)]
pub(crate) struct DependentLedger {
    entries: BTreeMap<(i32, DependentKind), Dependent>,
}

impl DependentLedger {
    /// Record a sighting. The first name seen for a dependent is kept.
    pub(crate) fn record(
        &mut self,
        kind: DependentKind,
        id: i32,
        name: impl Into<String>,
        store: StoreName,
    ) {
        self.entries
            .entry((id, kind))
            .or_insert_with(|| Dependent {
                kind,
                id,
                name: name.into(),
                source: StoreSet::empty(),
            })
            .source
            .insert(store);
    }

    /// Merged dependents in listing order.
    pub(crate) fn into_sorted(self) -> Vec<Dependent> {
        self.entries.into_values().collect()
    }
}

/// Collect every row in either store that references `(kind, id)`.
pub(crate) async fn collect_dependents(
    human: &mut dyn HumanSession,
    payroll: &mut dyn PayrollSession,
    kind: EntityKind,
    id: i32,
) -> Result<Vec<Dependent>, Error> {
    let mut ledger = DependentLedger::default();
    let human_err = || store_read_error(StoreName::Human, "checking dependents of", kind, Some(id));
    let payroll_err =
        || store_read_error(StoreName::Payroll, "checking dependents of", kind, Some(id));

    match kind {
        EntityKind::Department | EntityKind::Position => {
            let link = if kind == EntityKind::Department {
                EmployeeLink::Department(id)
            } else {
                EmployeeLink::Position(id)
            };
            for employee in human.employees_linked(link).await.map_err(human_err())? {
                ledger.record(
                    DependentKind::Employee,
                    employee.id,
                    employee.full_name,
                    StoreName::Human,
                );
            }
            for employee in payroll.employees_linked(link).await.map_err(payroll_err())? {
                ledger.record(
                    DependentKind::Employee,
                    employee.id,
                    employee.full_name,
                    StoreName::Payroll,
                );
            }
        }
        EntityKind::Employee => {
            for dividend in human.dividends_for(id).await.map_err(human_err())? {
                ledger.record(
                    DependentKind::Dividend,
                    dividend.id,
                    format!("dividend of {} on {}", dividend.amount, dividend.dividend_date),
                    StoreName::Human,
                );
            }
            for salary in payroll.salaries_for(id).await.map_err(payroll_err())? {
                ledger.record(
                    DependentKind::Salary,
                    salary.id,
                    format!("salary for {}", salary.salary_month.format("%Y-%m")),
                    StoreName::Payroll,
                );
            }
            for attendance in payroll.attendance_for(id).await.map_err(payroll_err())? {
                ledger.record(
                    DependentKind::Attendance,
                    attendance.id,
                    format!("attendance for {}", attendance.attendance_month.format("%Y-%m")),
                    StoreName::Payroll,
                );
            }
        }
    }
    Ok(ledger.into_sorted())
}

/// Conflict listing the dependents that block deletion.
pub(crate) fn blocked_by(kind: EntityKind, id: i32, dependents: &[Dependent]) -> Error {
    warn!(%kind, id, count = dependents.len(), "delete blocked by dependents");
    let listing = dependents
        .iter()
        .map(|dep| format!("{} {} ({}) in {}", dep.kind, dep.id, dep.name, dep.source))
        .collect::<Vec<_>>()
        .join("; ");
    Error::conflict(format!("cannot delete {kind} {id}: referenced by {listing}"))
        .with_details(json!({
            "kind": kind,
            "id": id,
            "dependents": dependents,
        }))
}
