//! Credential-store user record.
//!
//! Accounts live in a third database owned by the authentication layer. The
//! `employee_id` points at a shared employee identifier but nothing enforces
//! it across stores.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Role label outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRoleError(pub String);

/// Closed set of roles an account may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Admin")]
    Admin,
    #[serde(rename = "Employee")]
    Employee,
    #[serde(rename = "HR Manager")]
    HrManager,
    #[serde(rename = "Payroll Manager")]
    PayrollManager,
}

impl Role {
    /// Label as stored in the credential table.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Employee => "Employee",
            Self::HrManager => "HR Manager",
            Self::PayrollManager => "Payroll Manager",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        [Self::Admin, Self::Employee, Self::HrManager, Self::PayrollManager]
            .into_iter()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| UnknownRoleError(value.to_owned()))
    }
}

/// A login account. The password hash is never serialised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub employee_id: Option<i32>,
}
