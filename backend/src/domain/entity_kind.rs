//! The record types duplicated across both stores under a common identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A shared entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Employees; the payroll copy carries name, references and status.
    Employee,
    /// Departments; the payroll copy carries only the name.
    Department,
    /// Positions; the payroll copy carries only the name.
    Position,
}

impl EntityKind {
    /// Every shared kind, in a stable order.
    pub const ALL: [Self; 3] = [Self::Employee, Self::Department, Self::Position];

    /// Lower-case label used in messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Employee => "employee",
            Self::Department => "department",
            Self::Position => "position",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown entity kind label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity kind '{0}', expected employee, department or position")]
pub struct UnknownEntityKind(pub String);

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalised = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == normalised)
            .ok_or_else(|| UnknownEntityKind(value.to_owned()))
    }
}
