//! The `SharedEntity` abstraction the writer is generic over.
//!
//! Each shared kind is described by its human-store record type. The trait
//! names the payroll projection, the create and update payloads, and the
//! mapping in and out of the per-store record envelopes the ports speak.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;

use crate::domain::{
    Department, DepartmentPatch, EmployeePatch, EntityKind, HumanEmployee, HumanRecord,
    NewDepartment, NewEmployee, NewPosition, PayrollDepartment, PayrollEmployee, PayrollPosition,
    PayrollRecord, Position, PositionPatch,
};

/// A record type duplicated across both stores under a common identifier.
pub trait SharedEntity: Clone + Send + Sync + Sized + 'static {
    /// Which kind this record is.
    const KIND: EntityKind;
    /// Projection held by the payroll store.
    type Payroll: Clone + Send + Sync + 'static;
    /// Create payload.
    type Draft: DeserializeOwned + Send + Sync;
    /// Partial update payload.
    type Patch: DeserializeOwned + Send + Sync;

    /// Explicit identifier requested by the payload, if any.
    fn draft_id(draft: &Self::Draft) -> Option<i32>;
    /// Reject payload values neither store would catch.
    fn validate_draft(draft: &Self::Draft) -> Result<(), String>;
    /// Reject patch values neither store would catch.
    fn validate_patch(patch: &Self::Patch) -> Result<(), String>;
    /// Build the human record.
    fn from_draft(id: i32, draft: &Self::Draft, now: DateTime<Utc>) -> Self;
    /// Build the payroll projection.
    fn to_payroll(&self) -> Self::Payroll;
    /// Apply every supplied field of the patch.
    fn apply(&mut self, patch: &Self::Patch, now: DateTime<Utc>);
    /// Copy the allow-listed fields the patch touched to the payroll copy.
    fn propagate(&self, patch: &Self::Patch, payroll: &mut Self::Payroll);
    /// Projected fields that differ between the two copies.
    fn drift(&self, payroll: &Self::Payroll) -> Vec<&'static str>;
    /// Wrap for the human store port.
    fn into_record(self) -> HumanRecord;
    /// Unwrap from the human store port; `None` on a kind mismatch.
    fn from_record(record: HumanRecord) -> Option<Self>;
    /// Wrap the projection for the payroll store port.
    fn payroll_into_record(payroll: Self::Payroll) -> PayrollRecord;
    /// Unwrap the projection from the payroll store port.
    fn payroll_from_record(record: PayrollRecord) -> Option<Self::Payroll>;
}

macro_rules! impl_shared_entity {
    ($record:ty, $payroll:ty, $draft:ty, $patch:ty, $variant:ident) => {
        impl SharedEntity for $record {
            const KIND: EntityKind = EntityKind::$variant;
            type Payroll = $payroll;
            type Draft = $draft;
            type Patch = $patch;

            fn draft_id(draft: &Self::Draft) -> Option<i32> {
                draft.id
            }

            fn validate_draft(draft: &Self::Draft) -> Result<(), String> {
                draft.validate()
            }

            fn validate_patch(patch: &Self::Patch) -> Result<(), String> {
                patch.validate()
            }

            fn from_draft(id: i32, draft: &Self::Draft, now: DateTime<Utc>) -> Self {
                <$record>::from_draft(id, draft, now)
            }

            fn to_payroll(&self) -> Self::Payroll {
                <$record>::to_payroll(self)
            }

            fn apply(&mut self, patch: &Self::Patch, now: DateTime<Utc>) {
                <$record>::apply(self, patch, now);
            }

            fn propagate(&self, patch: &Self::Patch, payroll: &mut Self::Payroll) {
                <$record>::propagate(self, patch, payroll);
            }

            fn drift(&self, payroll: &Self::Payroll) -> Vec<&'static str> {
                <$record>::drift(self, payroll)
            }

            fn into_record(self) -> HumanRecord {
                HumanRecord::$variant(self)
            }

            fn from_record(record: HumanRecord) -> Option<Self> {
                match record {
                    HumanRecord::$variant(inner) => Some(inner),
                    _ => None,
                }
            }

            fn payroll_into_record(payroll: Self::Payroll) -> PayrollRecord {
                PayrollRecord::$variant(payroll)
            }

            fn payroll_from_record(record: PayrollRecord) -> Option<Self::Payroll> {
                match record {
                    PayrollRecord::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

impl_shared_entity!(HumanEmployee, PayrollEmployee, NewEmployee, EmployeePatch, Employee);
impl_shared_entity!(Department, PayrollDepartment, NewDepartment, DepartmentPatch, Department);
impl_shared_entity!(Position, PayrollPosition, NewPosition, PositionPatch, Position);
