//! Outbound adapters implementing the store ports.
//!
//! Adapters translate between domain records and database rows. They contain
//! no synchronization logic.

pub mod persistence;
