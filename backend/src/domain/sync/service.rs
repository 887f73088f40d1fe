//! The dual-store writer.
//!
//! Every operation opens one session per store, does its reads, then commits
//! the human store before the payroll store. The two commits are independent:
//! if the payroll commit fails after the human one landed, the human change
//! stays and the caller gets a [`SyncFailure`] report naming both stores.

use std::sync::Arc;

use mockable::Clock;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::domain::ports::{HumanSession, HumanStore, PayrollSession, PayrollStore, StagedWrite};
use crate::domain::{
    Department, EntityKind, Error, HumanEmployee, HumanRecord, PayrollRecord, Position, StoreName,
    StoreSet,
};

use super::allocator::{allocate, holders, identifier_taken};
use super::entity::SharedEntity;
use super::guard::{Dependent, blocked_by, collect_dependents};
use super::report::{PresenceReport, SyncFailure, SyncOperation, SyncOutcome, store_read_error};

type Sessions = (Box<dyn HumanSession>, Box<dyn PayrollSession>);

/// Synchronizes shared entities across the human and payroll stores.
#[derive(Clone)]
pub struct SyncService<H, P> {
    human: Arc<H>,
    payroll: Arc<P>,
    clock: Arc<dyn Clock>,
}

impl<H, P> SyncService<H, P> {
    /// Create a service over the two store adapters.
    pub fn new(human: Arc<H>, payroll: Arc<P>, clock: Arc<dyn Clock>) -> Self {
        Self {
            human,
            payroll,
            clock,
        }
    }
}

impl<H, P> SyncService<H, P>
where
    H: HumanStore,
    P: PayrollStore,
{
    async fn open(&self, kind: EntityKind, id: Option<i32>) -> Result<Sessions, Error> {
        let human = self
            .human
            .open()
            .await
            .map_err(store_read_error(StoreName::Human, "opening a session for", kind, id))?;
        let payroll = self
            .payroll
            .open()
            .await
            .map_err(store_read_error(StoreName::Payroll, "opening a session for", kind, id))?;
        Ok((human, payroll))
    }

    /// Next free shared identifier for `kind`.
    ///
    /// The value is not reserved; see [`super::next_identifier`].
    pub async fn allocate_identifier(&self, kind: EntityKind) -> Result<i32, Error> {
        let (mut human, mut payroll) = self.open(kind, None).await?;
        let id = allocate(human.as_mut(), payroll.as_mut(), kind).await?;
        debug!(%kind, id, "allocated identifier");
        Ok(id)
    }

    /// Create an entity in both stores.
    ///
    /// An explicit identifier in the draft must be free in both stores;
    /// otherwise one is allocated. The human store is committed first.
    pub async fn create<E: SharedEntity>(&self, draft: E::Draft) -> Result<SyncOutcome, Error> {
        let kind = E::KIND;
        E::validate_draft(&draft).map_err(Error::invalid_request)?;
        let requested = E::draft_id(&draft);
        if let Some(id) = requested.filter(|id| *id <= 0) {
            return Err(Error::invalid_request(format!(
                "{kind} identifier must be positive, got {id}"
            )));
        }

        let (mut human, mut payroll) = self.open(kind, requested).await?;
        let id = match requested {
            Some(id) => {
                let taken = holders(human.as_mut(), payroll.as_mut(), kind, id).await?;
                if !taken.is_empty() {
                    return Err(identifier_taken(kind, id, &taken));
                }
                id
            }
            None => allocate(human.as_mut(), payroll.as_mut(), kind).await?,
        };

        let record = E::from_draft(id, &draft, self.clock.utc());
        let projection = record.to_payroll();
        let stores = commit_both(
            (human.as_mut(), payroll.as_mut()),
            SyncOperation::Create,
            kind,
            id,
            Some(StagedWrite::Insert(record.into_record())),
            Some(StagedWrite::Insert(E::payroll_into_record(projection))),
        )
        .await?;

        info!(%kind, id, "created in both stores");
        Ok(SyncOutcome::new(SyncOperation::Create, kind, id, stores))
    }

    /// Apply a partial update to the human record and propagate the
    /// allow-listed fields to the payroll copy.
    ///
    /// Both stores must hold the entity; otherwise nothing is written.
    pub async fn update<E: SharedEntity>(
        &self,
        id: i32,
        patch: E::Patch,
    ) -> Result<SyncOutcome, Error> {
        let kind = E::KIND;
        E::validate_patch(&patch).map_err(Error::invalid_request)?;

        let (mut human, mut payroll) = self.open(kind, Some(id)).await?;
        let (human_copy, payroll_copy) =
            load_pair::<E>(human.as_mut(), payroll.as_mut(), id).await?;
        let (mut record, mut projection) = match (human_copy, payroll_copy) {
            (Some(record), Some(projection)) => (record, projection),
            (record, projection) => {
                let missing = StoreSet::from_presence(record.is_none(), projection.is_none());
                return Err(missing_from(kind, id, &missing));
            }
        };

        record.apply(&patch, self.clock.utc());
        record.propagate(&patch, &mut projection);

        let stores = commit_both(
            (human.as_mut(), payroll.as_mut()),
            SyncOperation::Update,
            kind,
            id,
            Some(StagedWrite::Update(record.into_record())),
            Some(StagedWrite::Update(E::payroll_into_record(projection))),
        )
        .await?;

        info!(%kind, id, "updated in both stores");
        Ok(SyncOutcome::new(SyncOperation::Update, kind, id, stores))
    }

    /// Delete an entity from whichever stores hold it, after the guard has
    /// confirmed nothing in either store references it.
    pub async fn delete_entity(&self, kind: EntityKind, id: i32) -> Result<SyncOutcome, Error> {
        let (mut human, mut payroll) = self.open(kind, Some(id)).await?;
        let present = holders(human.as_mut(), payroll.as_mut(), kind, id).await?;
        if present.is_empty() {
            return Err(Error::not_found(format!("{kind} {id} not found in either store"))
                .with_details(json!({ "kind": kind, "id": id })));
        }

        let dependents = collect_dependents(human.as_mut(), payroll.as_mut(), kind, id).await?;
        if !dependents.is_empty() {
            return Err(blocked_by(kind, id, &dependents));
        }

        let stores = commit_both(
            (human.as_mut(), payroll.as_mut()),
            SyncOperation::Delete,
            kind,
            id,
            present
                .contains(StoreName::Human)
                .then_some(StagedWrite::Delete { kind, id }),
            present
                .contains(StoreName::Payroll)
                .then_some(StagedWrite::Delete { kind, id }),
        )
        .await?;

        info!(%kind, id, stores = %stores, "deleted");
        Ok(SyncOutcome::new(SyncOperation::Delete, kind, id, stores))
    }

    /// Rows in either store that would block deleting `(kind, id)`.
    pub async fn dependents(&self, kind: EntityKind, id: i32) -> Result<Vec<Dependent>, Error> {
        let (mut human, mut payroll) = self.open(kind, Some(id)).await?;
        collect_dependents(human.as_mut(), payroll.as_mut(), kind, id).await
    }

    /// Report which stores hold `(kind, id)` and whether the copies agree.
    pub async fn inspect_entity(&self, kind: EntityKind, id: i32) -> Result<PresenceReport, Error> {
        match kind {
            EntityKind::Employee => self.inspect::<HumanEmployee>(id).await,
            EntityKind::Department => self.inspect::<Department>(id).await,
            EntityKind::Position => self.inspect::<Position>(id).await,
        }
    }

    async fn inspect<E: SharedEntity>(&self, id: i32) -> Result<PresenceReport, Error> {
        let kind = E::KIND;
        let (mut human, mut payroll) = self.open(kind, Some(id)).await?;
        let (record, projection) = load_pair::<E>(human.as_mut(), payroll.as_mut(), id).await?;
        let present_in = StoreSet::from_presence(record.is_some(), projection.is_some());
        if present_in.is_empty() {
            return Err(Error::not_found(format!("{kind} {id} not found in either store"))
                .with_details(json!({ "kind": kind, "id": id })));
        }
        let drift = match (&record, &projection) {
            (Some(record), Some(projection)) => record.drift(projection),
            _ => Vec::new(),
        };
        Ok(PresenceReport::new(kind, id, present_in, drift))
    }

    /// Create from a camelCase JSON object.
    pub async fn create_entity(
        &self,
        kind: EntityKind,
        payload: Value,
    ) -> Result<SyncOutcome, Error> {
        match kind {
            EntityKind::Employee => self.create::<HumanEmployee>(decode(kind, payload)?).await,
            EntityKind::Department => self.create::<Department>(decode(kind, payload)?).await,
            EntityKind::Position => self.create::<Position>(decode(kind, payload)?).await,
        }
    }

    /// Update from a camelCase JSON object holding only the changed fields.
    pub async fn update_entity(
        &self,
        kind: EntityKind,
        id: i32,
        payload: Value,
    ) -> Result<SyncOutcome, Error> {
        match kind {
            EntityKind::Employee => self.update::<HumanEmployee>(id, decode(kind, payload)?).await,
            EntityKind::Department => self.update::<Department>(id, decode(kind, payload)?).await,
            EntityKind::Position => self.update::<Position>(id, decode(kind, payload)?).await,
        }
    }
}

fn decode<T: DeserializeOwned>(kind: EntityKind, payload: Value) -> Result<T, Error> {
    serde_json::from_value(payload)
        .map_err(|err| Error::invalid_request(format!("invalid {kind} payload: {err}")))
}

fn missing_from(kind: EntityKind, id: i32, missing: &StoreSet) -> Error {
    Error::not_found(format!("{kind} {id} is missing from: {missing}")).with_details(json!({
        "kind": kind,
        "id": id,
        "missingFrom": missing,
    }))
}

fn wrong_kind(store: StoreName, expected: EntityKind, found: EntityKind, id: i32) -> Error {
    Error::internal(format!(
        "{store} store returned a {found} record when asked for {expected} {id}"
    ))
}

async fn load_pair<E: SharedEntity>(
    human: &mut dyn HumanSession,
    payroll: &mut dyn PayrollSession,
    id: i32,
) -> Result<(Option<E>, Option<E::Payroll>), Error> {
    let kind = E::KIND;
    let record = match human
        .find(kind, id)
        .await
        .map_err(store_read_error(StoreName::Human, "loading", kind, Some(id)))?
    {
        Some(found) => {
            let found_kind = found.kind();
            Some(
                E::from_record(found)
                    .ok_or_else(|| wrong_kind(StoreName::Human, kind, found_kind, id))?,
            )
        }
        None => None,
    };
    let projection = match payroll
        .find(kind, id)
        .await
        .map_err(store_read_error(StoreName::Payroll, "loading", kind, Some(id)))?
    {
        Some(found) => {
            let found_kind = found.kind();
            Some(
                E::payroll_from_record(found)
                    .ok_or_else(|| wrong_kind(StoreName::Payroll, kind, found_kind, id))?,
            )
        }
        None => None,
    };
    Ok((record, projection))
}

/// Stage and commit the human write, then the payroll write.
///
/// A store whose write is `None` is skipped. On failure that store's
/// pending writes are rolled back and the error reports what had already
/// been committed.
async fn commit_both(
    (human, payroll): (&mut dyn HumanSession, &mut dyn PayrollSession),
    operation: SyncOperation,
    kind: EntityKind,
    id: i32,
    human_write: Option<StagedWrite<HumanRecord>>,
    payroll_write: Option<StagedWrite<PayrollRecord>>,
) -> Result<StoreSet, Error> {
    let mut committed = StoreSet::empty();

    if let Some(write) = human_write {
        human.stage(write);
        if let Err(error) = human.commit().await {
            human.rollback();
            return Err(
                SyncFailure::new(operation, kind, id, committed, StoreName::Human, &error)
                    .into_error(),
            );
        }
        committed.insert(StoreName::Human);
    }

    if let Some(write) = payroll_write {
        payroll.stage(write);
        if let Err(error) = payroll.commit().await {
            payroll.rollback();
            return Err(
                SyncFailure::new(operation, kind, id, committed, StoreName::Payroll, &error)
                    .into_error(),
            );
        }
        committed.insert(StoreName::Payroll);
    }

    Ok(committed)
}

#[cfg(test)]
#[path = "service_tests.rs"]
mod tests;
