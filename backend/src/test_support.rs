//! Test utilities for the hrsync crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`, via
//! the `test-support` feature): in-memory adapters for both store ports, a
//! settable clock, and record builders.

mod clock;
pub mod fixtures;
mod memory_store;

pub use clock::MutableClock;
pub use memory_store::{InMemoryHumanStore, InMemoryPayrollStore};
