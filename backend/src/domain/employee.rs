//! Employee records as held by each store, plus create and update payloads.
//!
//! The human store keeps the full personnel record. The payroll store keeps a
//! projection (name, department, position, status) used for payroll joins.
//! Only department, position and status flow from human to payroll on
//! update; the payroll copy of the name is set once at creation.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::patch::{assign, nullable, require_email, require_text};

/// Status given to new employees when the payload does not name one.
pub const DEFAULT_EMPLOYEE_STATUS: &str = "Active";

fn default_status() -> Option<String> {
    Some(DEFAULT_EMPLOYEE_STATUS.to_owned())
}

/// Full employee record in the human store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanEmployee {
    pub id: i32,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub gender: Option<String>,
    pub phone_number: Option<String>,
    pub email: String,
    pub hire_date: NaiveDate,
    pub department_id: Option<i32>,
    pub position_id: Option<i32>,
    pub status: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Employee projection in the payroll store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayrollEmployee {
    pub id: i32,
    pub full_name: String,
    pub department_id: Option<i32>,
    pub position_id: Option<i32>,
    pub status: Option<String>,
}

/// Create payload. `id` is optional; when absent the allocator picks one.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewEmployee {
    #[serde(default)]
    pub id: Option<i32>,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub email: String,
    pub hire_date: NaiveDate,
    pub department_id: i32,
    pub position_id: i32,
    #[serde(default = "default_status")]
    pub status: Option<String>,
}

impl NewEmployee {
    /// Check the fields the stores cannot check for us.
    pub fn validate(&self) -> Result<(), String> {
        require_text("fullName", &self.full_name)?;
        require_email(&self.email)
    }
}

/// Partial update payload. Absent fields are left untouched; nullable
/// columns accept an explicit `null` to clear them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EmployeePatch {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub gender: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub phone_number: Option<Option<String>>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub hire_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "nullable")]
    pub department_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub position_id: Option<Option<i32>>,
    #[serde(default, deserialize_with = "nullable")]
    pub status: Option<Option<String>>,
}

impl EmployeePatch {
    /// Check any supplied text fields.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.full_name {
            require_text("fullName", name)?;
        }
        if let Some(email) = &self.email {
            require_email(email)?;
        }
        Ok(())
    }
}

impl HumanEmployee {
    /// Build the human record for a freshly allocated identifier.
    pub fn from_draft(id: i32, draft: &NewEmployee, now: DateTime<Utc>) -> Self {
        Self {
            id,
            full_name: draft.full_name.clone(),
            date_of_birth: draft.date_of_birth,
            gender: draft.gender.clone(),
            phone_number: draft.phone_number.clone(),
            email: draft.email.clone(),
            hire_date: draft.hire_date,
            department_id: Some(draft.department_id),
            position_id: Some(draft.position_id),
            status: draft.status.clone(),
            created_at: now,
            updated_at: now,
        }
    }

    /// The payroll projection of this record.
    pub fn to_payroll(&self) -> PayrollEmployee {
        PayrollEmployee {
            id: self.id,
            full_name: self.full_name.clone(),
            department_id: self.department_id,
            position_id: self.position_id,
            status: self.status.clone(),
        }
    }

    /// Apply every supplied field of the patch and stamp `updated_at`.
    pub fn apply(&mut self, patch: &EmployeePatch, now: DateTime<Utc>) {
        assign(&mut self.full_name, patch.full_name.as_ref());
        assign(&mut self.date_of_birth, patch.date_of_birth.as_ref());
        assign(&mut self.gender, patch.gender.as_ref());
        assign(&mut self.phone_number, patch.phone_number.as_ref());
        assign(&mut self.email, patch.email.as_ref());
        assign(&mut self.hire_date, patch.hire_date.as_ref());
        assign(&mut self.department_id, patch.department_id.as_ref());
        assign(&mut self.position_id, patch.position_id.as_ref());
        assign(&mut self.status, patch.status.as_ref());
        self.updated_at = now;
    }

    /// Copy the payroll allow-list (department, position, status) from this
    /// already-updated record, limited to the fields the patch touched.
    pub fn propagate(&self, patch: &EmployeePatch, payroll: &mut PayrollEmployee) {
        if patch.department_id.is_some() {
            payroll.department_id = self.department_id;
        }
        if patch.position_id.is_some() {
            payroll.position_id = self.position_id;
        }
        if patch.status.is_some() {
            payroll.status.clone_from(&self.status);
        }
    }

    /// Names of projected fields whose values differ between the stores.
    pub fn drift(&self, payroll: &PayrollEmployee) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.full_name != payroll.full_name {
            fields.push("fullName");
        }
        if self.department_id != payroll.department_id {
            fields.push("departmentId");
        }
        if self.position_id != payroll.position_id {
            fields.push("positionId");
        }
        if self.status != payroll.status {
            fields.push("status");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};
    use serde_json::json;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, hour, 0, 0)
            .single()
            .expect("valid fixture timestamp")
    }

    #[fixture]
    fn draft() -> NewEmployee {
        serde_json::from_value(json!({
            "fullName": "Nguyen Van An",
            "dateOfBirth": "1990-04-12",
            "gender": "Male",
            "email": "an.nguyen@example.com",
            "hireDate": "2020-01-06",
            "departmentId": 3,
            "positionId": 2,
        }))
        .expect("decode draft")
    }

    #[rstest]
    fn draft_defaults_status_to_active(draft: NewEmployee) {
        assert_eq!(draft.status.as_deref(), Some(DEFAULT_EMPLOYEE_STATUS));
        assert_eq!(draft.id, None);
        assert!(draft.validate().is_ok());
    }

    #[rstest]
    fn draft_rejects_unknown_fields() {
        let result = serde_json::from_value::<NewEmployee>(json!({
            "fullName": "X",
            "dateOfBirth": "1990-04-12",
            "email": "x@example.com",
            "hireDate": "2020-01-06",
            "departmentId": 1,
            "positionId": 1,
            "salary": 100,
        }));
        assert!(result.is_err());
    }

    #[rstest]
    fn projection_copies_shared_fields(draft: NewEmployee) {
        let human = HumanEmployee::from_draft(8, &draft, at(9));
        let payroll = human.to_payroll();
        assert_eq!(payroll.id, 8);
        assert_eq!(payroll.full_name, "Nguyen Van An");
        assert_eq!(payroll.department_id, Some(3));
        assert!(human.drift(&payroll).is_empty());
    }

    #[rstest]
    fn status_only_patch_leaves_other_fields(draft: NewEmployee) {
        let mut human = HumanEmployee::from_draft(8, &draft, at(9));
        let before = human.clone();
        let patch: EmployeePatch =
            serde_json::from_value(json!({"status": "On leave"})).expect("decode patch");

        human.apply(&patch, at(10));

        assert_eq!(human.status.as_deref(), Some("On leave"));
        assert_eq!(human.updated_at, at(10));
        assert_eq!(
            HumanEmployee {
                status: before.status.clone(),
                updated_at: before.updated_at,
                ..human.clone()
            },
            before
        );
    }

    #[rstest]
    fn propagation_is_limited_to_allow_list(draft: NewEmployee) {
        let mut human = HumanEmployee::from_draft(8, &draft, at(9));
        let mut payroll = human.to_payroll();
        payroll.full_name = "Payroll spelling".to_owned();
        let patch: EmployeePatch = serde_json::from_value(json!({
            "fullName": "Renamed",
            "positionId": 5,
        }))
        .expect("decode patch");

        human.apply(&patch, at(10));
        human.propagate(&patch, &mut payroll);

        assert_eq!(payroll.position_id, Some(5));
        assert_eq!(payroll.full_name, "Payroll spelling");
        assert_eq!(payroll.department_id, Some(3));
    }

    #[rstest]
    fn explicit_null_clears_department(draft: NewEmployee) {
        let mut human = HumanEmployee::from_draft(8, &draft, at(9));
        let mut payroll = human.to_payroll();
        let patch: EmployeePatch =
            serde_json::from_value(json!({"departmentId": null})).expect("decode patch");

        human.apply(&patch, at(10));
        human.propagate(&patch, &mut payroll);

        assert_eq!(human.department_id, None);
        assert_eq!(payroll.department_id, None);
    }

    #[rstest]
    fn patch_validation_checks_supplied_email() {
        let patch = EmployeePatch {
            email: Some("not-an-email".to_owned()),
            ..EmployeePatch::default()
        };
        assert!(patch.validate().is_err());
    }
}
