//! Departments and positions.
//!
//! Both are a named organisational unit with audit timestamps in the human
//! store and a bare `(id, name)` projection in the payroll store. The
//! `define_org_unit!` macro generates the record, projection, create and
//! update types for each so the two stay structurally identical.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::patch::{assign, require_text};

macro_rules! define_org_unit {
    (
        $(#[$outer:meta])*
        $record:ident, $payroll:ident, $draft:ident, $patch:ident, $label:literal
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $record {
            pub id: i32,
            pub name: String,
            pub created_at: DateTime<Utc>,
            pub updated_at: DateTime<Utc>,
        }

        #[doc = concat!("Payroll-store projection of a ", $label, ".")]
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $payroll {
            pub id: i32,
            pub name: String,
        }

        #[doc = concat!("Create payload for a ", $label, "; timestamps default to now.")]
        #[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
        #[serde(rename_all = "camelCase", deny_unknown_fields)]
        pub struct $draft {
            #[serde(default)]
            pub id: Option<i32>,
            pub name: String,
            #[serde(default)]
            pub created_at: Option<DateTime<Utc>>,
            #[serde(default)]
            pub updated_at: Option<DateTime<Utc>>,
        }

        impl $draft {
            /// Check the name is not blank.
            pub fn validate(&self) -> Result<(), String> {
                require_text("name", &self.name)
            }
        }

        #[doc = concat!("Partial update payload for a ", $label, ".")]
        #[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
        #[serde(rename_all = "camelCase", deny_unknown_fields)]
        pub struct $patch {
            #[serde(default)]
            pub name: Option<String>,
            #[serde(default)]
            pub updated_at: Option<DateTime<Utc>>,
        }

        impl $patch {
            /// Check a supplied name is not blank.
            pub fn validate(&self) -> Result<(), String> {
                match &self.name {
                    Some(name) => require_text("name", name),
                    None => Ok(()),
                }
            }
        }

        impl $record {
            /// Build the human record for a freshly allocated identifier.
            pub fn from_draft(id: i32, draft: &$draft, now: DateTime<Utc>) -> Self {
                Self {
                    id,
                    name: draft.name.clone(),
                    created_at: draft.created_at.unwrap_or(now),
                    updated_at: draft.updated_at.unwrap_or(now),
                }
            }

            /// The payroll projection of this record.
            pub fn to_payroll(&self) -> $payroll {
                $payroll {
                    id: self.id,
                    name: self.name.clone(),
                }
            }

            /// Apply the patch; `updated_at` takes the supplied value or now.
            pub fn apply(&mut self, patch: &$patch, now: DateTime<Utc>) {
                assign(&mut self.name, patch.name.as_ref());
                self.updated_at = patch.updated_at.unwrap_or(now);
            }

            /// Copy the allow-list (name, update timestamp) to the payroll
            /// copy. The projection has no timestamp column, so only the name
            /// lands there.
            pub fn propagate(&self, patch: &$patch, payroll: &mut $payroll) {
                if patch.name.is_some() {
                    payroll.name.clone_from(&self.name);
                }
            }

            /// Names of projected fields whose values differ between the stores.
            pub fn drift(&self, payroll: &$payroll) -> Vec<&'static str> {
                if self.name == payroll.name {
                    Vec::new()
                } else {
                    vec!["name"]
                }
            }
        }
    };
}

define_org_unit! {
    /// Department record in the human store.
    Department, PayrollDepartment, NewDepartment, DepartmentPatch, "department"
}

define_org_unit! {
    /// Position record in the human store.
    Position, PayrollPosition, NewPosition, PositionPatch, "position"
}
