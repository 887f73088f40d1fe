//! Staged writes applied by a session at commit time.
//!
//! Sessions buffer inserts, in-place updates and deletes, then apply the
//! whole batch inside a single database transaction when the caller commits.
//! Rolling back discards the buffer. Reads never observe staged writes.

use crate::domain::EntityKind;

/// One buffered mutation against a store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StagedWrite<R> {
    /// Insert a new row; the identifier must be free.
    Insert(R),
    /// Overwrite an existing row in place.
    Update(R),
    /// Remove the row with the given identifier.
    Delete { kind: EntityKind, id: i32 },
}

/// Write buffer used by session adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteBuffer<R> {
    writes: Vec<StagedWrite<R>>,
}

impl<R> Default for WriteBuffer<R> {
    fn default() -> Self {
        Self { writes: Vec::new() }
    }
}

impl<R> WriteBuffer<R> {
    /// Append a write to the batch.
    pub fn push(&mut self, write: StagedWrite<R>) {
        self.writes.push(write);
    }

    /// Take the batch, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<StagedWrite<R>> {
        std::mem::take(&mut self.writes)
    }

    /// Discard the batch.
    pub fn clear(&mut self) {
        self.writes.clear();
    }

    /// Whether anything is pending.
    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Number of pending writes.
    pub fn len(&self) -> usize {
        self.writes.len()
    }
}
