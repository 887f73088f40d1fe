//! Names for the two databases a shared entity lives in.
//!
//! `StoreSet` is the small value the synchronization core uses to say where
//! something was found, which stores were written, and which failed. It
//! renders in a fixed order (`human` before `payroll`) so messages and
//! dependent listings are reproducible.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Serialize, Serializer};

/// One of the two independently owned relational stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreName {
    /// Personnel records: employees, departments, positions, dividends.
    Human,
    /// Compensation records plus the projected employee/department/position copy.
    Payroll,
}

impl StoreName {
    /// Lower-case label used in messages and listings.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Payroll => "payroll",
        }
    }
}

impl fmt::Display for StoreName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An ordered set of stores.
///
/// # Examples
/// ```
/// use hrsync::domain::{StoreName, StoreSet};
///
/// let mut set = StoreSet::only(StoreName::Payroll);
/// set.insert(StoreName::Human);
/// assert_eq!(set.to_string(), "human, payroll");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct StoreSet(BTreeSet<StoreName>);

impl StoreSet {
    /// The empty set.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A set holding a single store.
    #[must_use]
    pub fn only(store: StoreName) -> Self {
        Self(BTreeSet::from([store]))
    }

    /// Both stores.
    #[must_use]
    pub fn both() -> Self {
        Self(BTreeSet::from([StoreName::Human, StoreName::Payroll]))
    }

    /// Build a set from presence flags.
    #[must_use]
    pub fn from_presence(in_human: bool, in_payroll: bool) -> Self {
        let mut set = Self::empty();
        if in_human {
            set.insert(StoreName::Human);
        }
        if in_payroll {
            set.insert(StoreName::Payroll);
        }
        set
    }

    /// Add a store; returns `false` when it was already present.
    pub fn insert(&mut self, store: StoreName) -> bool {
        self.0.insert(store)
    }

    /// Whether the store is in the set.
    pub fn contains(&self, store: StoreName) -> bool {
        self.0.contains(&store)
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stores in display order.
    pub fn iter(&self) -> impl Iterator<Item = StoreName> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for StoreSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let labels: Vec<&str> = self.iter().map(StoreName::as_str).collect();
        f.write_str(&labels.join(", "))
    }
}

impl Serialize for StoreSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
