//! Cross-store synchronization core.
//!
//! - `allocator`: shared identifier allocation.
//! - `service`: the dual-store writer, [`SyncService`].
//! - `guard`: the referential guard run before deletes.
//! - `report`: outcomes, partial-failure reports and presence reports.

mod allocator;
mod entity;
mod guard;
mod report;
mod service;

pub use allocator::next_identifier;
pub use entity::SharedEntity;
pub use guard::{Dependent, DependentKind};
pub use report::{PresenceReport, SyncFailure, SyncOperation, SyncOutcome};
pub use service::SyncService;
