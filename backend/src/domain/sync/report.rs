//! Results and failure reports returned by the synchronization core.
//!
//! Every write returns a [`SyncOutcome`] naming what happened and where. When
//! a store fails, the caller gets an `InternalError` whose details say which
//! stores had already committed and which failed, so an operator can
//! reconcile by hand. Nothing here retries or repairs.

use std::fmt;

use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

use crate::domain::ports::StoreError;
use crate::domain::{EntityKind, Error, StoreName, StoreSet};

/// The write a report refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncOperation {
    Create,
    Update,
    Delete,
}

impl SyncOperation {
    fn verb(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    fn past_tense(self) -> &'static str {
        match self {
            Self::Create => "created",
            Self::Update => "updated",
            Self::Delete => "deleted",
        }
    }
}

impl fmt::Display for SyncOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Successful write result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncOutcome {
    /// Human-readable outcome.
    pub message: String,
    pub kind: EntityKind,
    /// The shared identifier involved.
    pub id: i32,
    /// Stores the write was committed to.
    pub stores: StoreSet,
    /// Dependents touched by a delete; always zero because the guard blocks
    /// deletes that would affect any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affected_dependents: Option<usize>,
}

impl SyncOutcome {
    pub(crate) fn new(operation: SyncOperation, kind: EntityKind, id: i32, stores: StoreSet) -> Self {
        let done = operation.past_tense();
        let message = if stores == StoreSet::both() {
            format!("{kind} {id} {done} and synchronized across both stores")
        } else {
            format!("{kind} {id} {done} in the {stores} store only; no other store held a copy")
        };
        let affected_dependents = (operation == SyncOperation::Delete).then_some(0);
        Self {
            message,
            kind,
            id,
            stores,
            affected_dependents,
        }
    }
}

/// A store failure during a write, with the cross-store state it left behind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncFailure {
    pub operation: SyncOperation,
    pub kind: EntityKind,
    pub id: i32,
    /// Stores whose commit had already landed; these are not undone.
    pub succeeded: StoreSet,
    /// Store whose write failed and was rolled back.
    pub failed: StoreName,
    pub reason: String,
}

impl SyncFailure {
    pub(crate) fn new(
        operation: SyncOperation,
        kind: EntityKind,
        id: i32,
        succeeded: StoreSet,
        failed: StoreName,
        error: &StoreError,
    ) -> Self {
        Self {
            operation,
            kind,
            id,
            succeeded,
            failed,
            reason: error.to_string(),
        }
    }

    /// Whether one store kept its commit while the other failed.
    pub fn is_partial(&self) -> bool {
        !self.succeeded.is_empty()
    }

    fn message(&self) -> String {
        if self.is_partial() {
            format!(
                "{kind} {id} was {done} in the {succeeded} store but the {failed} store failed: \
                 {reason}; the stores are now inconsistent and need manual reconciliation",
                kind = self.kind,
                id = self.id,
                done = self.operation.past_tense(),
                succeeded = self.succeeded,
                failed = self.failed,
                reason = self.reason,
            )
        } else {
            format!(
                "failed to {op} {kind} {id} in the {failed} store: {reason}; no store was changed",
                op = self.operation,
                kind = self.kind,
                id = self.id,
                failed = self.failed,
                reason = self.reason,
            )
        }
    }

    /// Render as a domain error with the report as details.
    pub fn into_error(self) -> Error {
        if self.is_partial() {
            error!(
                operation = %self.operation,
                kind = %self.kind,
                id = self.id,
                succeeded = %self.succeeded,
                failed = %self.failed,
                reason = %self.reason,
                "cross-store write left stores inconsistent"
            );
        } else {
            warn!(
                operation = %self.operation,
                kind = %self.kind,
                id = self.id,
                failed = %self.failed,
                reason = %self.reason,
                "store write failed before any commit"
            );
        }
        let message = self.message();
        let details = json!({
            "operation": self.operation,
            "kind": self.kind,
            "id": self.id,
            "succeeded": self.succeeded,
            "failed": self.failed,
            "reason": self.reason,
        });
        Error::internal(message).with_details(details)
    }
}

/// Map a store error raised outside a commit (open, read) to an internal error.
pub(crate) fn store_read_error(
    store: StoreName,
    action: &'static str,
    kind: EntityKind,
    id: Option<i32>,
) -> impl FnOnce(StoreError) -> Error {
    move |error| {
        warn!(%store, action, %kind, ?id, error = %error, "store read failed");
        let target = match id {
            Some(id) => format!("{kind} {id}"),
            None => kind.to_string(),
        };
        Error::internal(format!("{store} store failed while {action} {target}: {error}"))
            .with_details(json!({ "store": store, "kind": kind, "id": id }))
    }
}

/// Which stores hold an entity and whether the copies agree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceReport {
    pub kind: EntityKind,
    pub id: i32,
    /// Stores holding a row with this identifier.
    pub present_in: StoreSet,
    /// Stores lacking it.
    pub missing_from: StoreSet,
    /// Projected fields whose values differ; empty unless both stores hold it.
    pub drift: Vec<&'static str>,
    /// Present in both stores with no drift.
    pub consistent: bool,
}

impl PresenceReport {
    pub(crate) fn new(kind: EntityKind, id: i32, present_in: StoreSet, drift: Vec<&'static str>) -> Self {
        let missing_from = StoreSet::from_presence(
            !present_in.contains(StoreName::Human),
            !present_in.contains(StoreName::Payroll),
        );
        let consistent = missing_from.is_empty() && drift.is_empty();
        Self {
            kind,
            id,
            present_in,
            missing_from,
            drift,
            consistent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn outcome_message_names_both_stores() {
        let outcome =
            SyncOutcome::new(SyncOperation::Create, EntityKind::Employee, 8, StoreSet::both());
        assert_eq!(
            outcome.message,
            "employee 8 created and synchronized across both stores"
        );
        assert_eq!(outcome.affected_dependents, None);
    }

    #[rstest]
    fn delete_outcome_reports_zero_affected_dependents() {
        let outcome = SyncOutcome::new(
            SyncOperation::Delete,
            EntityKind::Department,
            3,
            StoreSet::only(StoreName::Payroll),
        );
        assert_eq!(outcome.affected_dependents, Some(0));
        assert_eq!(
            outcome.message,
            "department 3 deleted in the payroll store only; no other store held a copy"
        );
        assert!(!outcome.message.contains("synchronized"));
    }

    #[rstest]
    fn partial_failure_names_succeeded_and_failed_stores() {
        let failure = SyncFailure::new(
            SyncOperation::Create,
            EntityKind::Employee,
            8,
            StoreSet::only(StoreName::Human),
            StoreName::Payroll,
            &StoreError::commit("deadlock detected"),
        );
        assert!(failure.is_partial());

        let error = failure.into_error();

        assert_eq!(error.code(), ErrorCode::InternalError);
        assert!(error.message().contains("created in the human store"));
        assert!(error.message().contains("payroll store failed"));
        let details = error.details().expect("failure details");
        assert_eq!(details["succeeded"], json!("human"));
        assert_eq!(details["failed"], json!("payroll"));
        assert_eq!(details["operation"], json!("create"));
        assert_eq!(details["id"], json!(8));
    }

    #[rstest]
    fn first_store_failure_reports_no_change() {
        let error = SyncFailure::new(
            SyncOperation::Update,
            EntityKind::Position,
            2,
            StoreSet::empty(),
            StoreName::Human,
            &StoreError::connection("reset by peer"),
        )
        .into_error();
        assert!(error.message().contains("no store was changed"));
        assert_eq!(error.details().expect("details")["succeeded"], json!(""));
    }

    #[rstest]
    fn presence_report_flags_missing_store() {
        let report = PresenceReport::new(
            EntityKind::Employee,
            8,
            StoreSet::only(StoreName::Human),
            Vec::new(),
        );
        assert_eq!(report.missing_from, StoreSet::only(StoreName::Payroll));
        assert!(!report.consistent);
    }

    #[rstest]
    fn read_error_mapping_names_store_and_target() {
        let map = store_read_error(StoreName::Payroll, "loading", EntityKind::Department, Some(3));
        let error = map(StoreError::query("relation missing"));
        assert_eq!(error.code(), ErrorCode::InternalError);
        assert!(error.message().starts_with("payroll store failed while loading department 3"));
    }
}
