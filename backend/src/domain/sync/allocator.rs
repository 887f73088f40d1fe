//! Shared identifier allocation.
//!
//! The next identifier is one past the largest identifier either store has
//! committed for the kind. Nothing reserves the value between allocation and
//! commit: two writers allocating concurrently can receive the same number.
//! Callers run a single writer; the existence re-check turns a lost race into
//! a `Conflict` rather than a duplicate row.

use serde_json::json;
use tracing::warn;

use crate::domain::ports::{HumanSession, PayrollSession};
use crate::domain::{EntityKind, Error, StoreName, StoreSet};

use super::report::store_read_error;

/// `max(human_max, payroll_max) + 1`, treating an empty store as 0.
///
/// Returns `None` when the result would overflow `i32`.
///
/// # Examples
/// ```
/// use hrsync::domain::sync::next_identifier;
///
/// assert_eq!(next_identifier(Some(5), Some(7)), Some(8));
/// assert_eq!(next_identifier(None, None), Some(1));
/// ```
pub fn next_identifier(human_max: Option<i32>, payroll_max: Option<i32>) -> Option<i32> {
    human_max
        .unwrap_or(0)
        .max(payroll_max.unwrap_or(0))
        .max(0)
        .checked_add(1)
}

/// Stores already holding a committed row with this identifier.
pub(crate) async fn holders(
    human: &mut dyn HumanSession,
    payroll: &mut dyn PayrollSession,
    kind: EntityKind,
    id: i32,
) -> Result<StoreSet, Error> {
    let in_human = human
        .find(kind, id)
        .await
        .map_err(store_read_error(StoreName::Human, "loading", kind, Some(id)))?
        .is_some();
    let in_payroll = payroll
        .find(kind, id)
        .await
        .map_err(store_read_error(StoreName::Payroll, "loading", kind, Some(id)))?
        .is_some();
    Ok(StoreSet::from_presence(in_human, in_payroll))
}

/// Conflict raised when an identifier is already taken.
pub(crate) fn identifier_taken(kind: EntityKind, id: i32, holders: &StoreSet) -> Error {
    warn!(%kind, id, stores = %holders, "identifier already in use");
    Error::conflict(format!("{kind} {id} already exists (found in: {holders})")).with_details(json!({
        "kind": kind,
        "id": id,
        "existsIn": holders,
    }))
}

/// Allocate the next shared identifier for `kind` using open sessions.
pub(crate) async fn allocate(
    human: &mut dyn HumanSession,
    payroll: &mut dyn PayrollSession,
    kind: EntityKind,
) -> Result<i32, Error> {
    let human_max = human
        .max_id(kind)
        .await
        .map_err(store_read_error(StoreName::Human, "allocating", kind, None))?;
    let payroll_max = payroll
        .max_id(kind)
        .await
        .map_err(store_read_error(StoreName::Payroll, "allocating", kind, None))?;

    let id = next_identifier(human_max, payroll_max).ok_or_else(|| {
        Error::internal(format!("{kind} identifier space is exhausted"))
            .with_details(json!({ "kind": kind }))
    })?;

    let taken = holders(human, payroll, kind, id).await?;
    if !taken.is_empty() {
        return Err(identifier_taken(kind, id, &taken));
    }
    Ok(id)
}
