//! Behaviour of the dual-store writer against in-memory and mocked stores.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mockable::Clock;
use mockall::Sequence;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

use super::SyncService;
use crate::domain::ports::{
    HumanSession, MockHumanSession, MockHumanStore, MockPayrollSession, MockPayrollStore,
    PayrollSession, StagedWrite, StoreError,
};
use crate::domain::sync::DependentKind;
use crate::domain::{EntityKind, ErrorCode, HumanRecord, PayrollRecord, StoreName, StoreSet};
use crate::test_support::fixtures::{
    attendance, department, dividend, employee, fixture_timestamp, position, salary,
};
use crate::test_support::{InMemoryHumanStore, InMemoryPayrollStore, MutableClock};

struct Harness {
    human: InMemoryHumanStore,
    payroll: InMemoryPayrollStore,
    clock: Arc<MutableClock>,
    service: SyncService<InMemoryHumanStore, InMemoryPayrollStore>,
}

impl Harness {
    fn seed_employee_everywhere(&self, id: i32, name: &str, department_id: i32) {
        let record = employee(id, name, department_id, 1);
        self.payroll.seed_employee(record.to_payroll());
        self.human.seed_employee(record);
    }

    fn seed_department_everywhere(&self, id: i32, name: &str) {
        let record = department(id, name);
        self.payroll.seed_department(record.to_payroll());
        self.human.seed_department(record);
    }

    fn commits(&self) -> (usize, usize) {
        (self.human.commit_count(), self.payroll.commit_count())
    }

    fn clock_now(&self) -> DateTime<Utc> {
        self.clock.utc()
    }

    fn assert_sessions_released(&self) {
        assert_eq!(self.human.open_sessions(), 0);
        assert_eq!(self.payroll.open_sessions(), 0);
    }
}

#[fixture]
fn harness() -> Harness {
    let human = InMemoryHumanStore::default();
    let payroll = InMemoryPayrollStore::default();
    let clock = Arc::new(MutableClock::new(fixture_timestamp()));
    let service = SyncService::new(
        Arc::new(human.clone()),
        Arc::new(payroll.clone()),
        clock.clone(),
    );
    Harness {
        human,
        payroll,
        clock,
        service,
    }
}

fn employee_payload(id: Option<i32>, name: &str, department_id: i32) -> Value {
    let mut payload = json!({
        "fullName": name,
        "dateOfBirth": "1991-07-30",
        "gender": "Female",
        "phoneNumber": "0901234567",
        "email": "binh.tran@example.com",
        "hireDate": "2024-09-02",
        "departmentId": department_id,
        "positionId": 2,
    });
    if let Some(id) = id {
        payload["id"] = json!(id);
    }
    payload
}

#[rstest]
#[case(None, None, 1)]
#[case(Some(5), Some(7), 8)]
#[case(Some(9), Some(2), 10)]
#[case(None, Some(4), 5)]
#[tokio::test]
async fn allocation_is_one_past_the_larger_max(
    harness: Harness,
    #[case] human_max: Option<i32>,
    #[case] payroll_max: Option<i32>,
    #[case] expected: i32,
) {
    if let Some(id) = human_max {
        harness.human.seed_employee(employee(id, "Human only", 1, 1));
    }
    if let Some(id) = payroll_max {
        harness
            .payroll
            .seed_employee(employee(id, "Payroll only", 1, 1).to_payroll());
    }

    let id = harness
        .service
        .allocate_identifier(EntityKind::Employee)
        .await
        .expect("allocate");

    assert_eq!(id, expected);
    harness.assert_sessions_released();
}

#[rstest]
#[tokio::test]
async fn allocation_is_per_kind(harness: Harness) {
    harness.seed_department_everywhere(12, "Finance");
    harness.seed_employee_everywhere(3, "Le Van Cuong", 12);

    let next_position = harness
        .service
        .allocate_identifier(EntityKind::Position)
        .await
        .expect("allocate");

    assert_eq!(next_position, 1);
}

#[rstest]
#[tokio::test]
async fn create_without_identifier_lands_in_both_stores(harness: Harness) {
    harness.human.seed_employee(employee(5, "Existing human", 3, 1));
    harness
        .payroll
        .seed_employee(employee(7, "Existing payroll", 3, 1).to_payroll());

    let outcome = harness
        .service
        .create_entity(EntityKind::Employee, employee_payload(None, "Tran Thi Binh", 3))
        .await
        .expect("create employee");

    assert_eq!(outcome.id, 8);
    assert_eq!(outcome.stores, StoreSet::both());
    let human = harness.human.employee(8).expect("human copy");
    let payroll = harness.payroll.employee(8).expect("payroll copy");
    assert_eq!(human.full_name, payroll.full_name);
    assert_eq!(human.status, payroll.status);
    assert_eq!(human.status.as_deref(), Some("Active"));
    assert_eq!(human.created_at, fixture_timestamp());
    harness.assert_sessions_released();
}

#[rstest]
#[tokio::test]
async fn create_with_taken_identifier_conflicts_without_writes(harness: Harness) {
    harness
        .payroll
        .seed_employee(employee(8, "Payroll ghost", 3, 1).to_payroll());

    let error = harness
        .service
        .create_entity(EntityKind::Employee, employee_payload(Some(8), "Tran Thi Binh", 3))
        .await
        .expect_err("identifier is taken");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(
        error.details().expect("details")["existsIn"],
        json!("payroll")
    );
    assert_eq!(harness.commits(), (0, 0));
    assert!(harness.human.employee(8).is_none());
    harness.assert_sessions_released();
}

#[rstest]
#[case(json!({"name": "  "}))]
#[case(json!({"name": "Finance", "budget": 10}))]
#[case(json!(["Finance"]))]
#[tokio::test]
async fn malformed_payloads_are_invalid_requests(harness: Harness, #[case] payload: Value) {
    harness.human.fail_next_open(StoreError::connection("must not be reached"));

    let error = harness
        .service
        .create_entity(EntityKind::Department, payload)
        .await
        .expect_err("payload is rejected");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
    assert_eq!(harness.commits(), (0, 0));
}

#[rstest]
#[tokio::test]
async fn non_positive_explicit_identifier_is_rejected(harness: Harness) {
    let error = harness
        .service
        .create_entity(EntityKind::Position, json!({"id": 0, "name": "Analyst"}))
        .await
        .expect_err("identifier must be positive");

    assert_eq!(error.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[tokio::test]
async fn department_create_uses_supplied_timestamps(harness: Harness) {
    let created = "2024-01-01T08:00:00Z";
    harness
        .service
        .create_entity(
            EntityKind::Department,
            json!({"id": 4, "name": "Logistics", "createdAt": created}),
        )
        .await
        .expect("create department");

    let Some(HumanRecord::Department(record)) = harness.human.record(EntityKind::Department, 4)
    else {
        panic!("department missing from human store");
    };
    assert_eq!(record.created_at.to_rfc3339(), "2024-01-01T08:00:00+00:00");
    assert_eq!(record.updated_at, fixture_timestamp());
    assert_eq!(
        harness.payroll.record(EntityKind::Department, 4),
        Some(PayrollRecord::Department(record.to_payroll()))
    );
}

#[rstest]
#[tokio::test]
async fn payroll_commit_failure_keeps_human_write_and_reports_it(harness: Harness) {
    harness
        .payroll
        .fail_next_commit(StoreError::commit("serialization failure"));

    let error = harness
        .service
        .create_entity(EntityKind::Employee, employee_payload(Some(8), "Tran Thi Binh", 3))
        .await
        .expect_err("payroll commit fails");

    assert_eq!(error.code(), ErrorCode::InternalError);
    let details = error.details().expect("details");
    assert_eq!(details["succeeded"], json!("human"));
    assert_eq!(details["failed"], json!("payroll"));
    assert!(error.message().contains("manual reconciliation"));
    assert!(harness.human.employee(8).is_some());
    assert!(harness.payroll.employee(8).is_none());
    harness.assert_sessions_released();
}

#[rstest]
#[tokio::test]
async fn human_commit_failure_leaves_both_stores_untouched(harness: Harness) {
    harness
        .human
        .fail_next_commit(StoreError::connection("connection reset"));

    let error = harness
        .service
        .create_entity(EntityKind::Position, json!({"name": "Analyst"}))
        .await
        .expect_err("human commit fails");

    assert_eq!(error.code(), ErrorCode::InternalError);
    assert_eq!(error.details().expect("details")["failed"], json!("human"));
    assert_eq!(harness.commits(), (0, 0));
    assert!(harness.payroll.record(EntityKind::Position, 1).is_none());
}

#[rstest]
#[tokio::test]
async fn status_update_changes_only_status(harness: Harness) {
    harness.seed_employee_everywhere(8, "Nguyen Van An", 3);
    let mut payroll_before = harness.payroll.employee(8).expect("seeded");
    payroll_before.full_name = "NGUYEN VAN AN".to_owned();
    harness.payroll.seed_employee(payroll_before.clone());
    let human_before = harness.human.employee(8).expect("seeded");
    harness.clock.advance_seconds(60);

    harness
        .service
        .update_entity(EntityKind::Employee, 8, json!({"status": "On leave"}))
        .await
        .expect("update status");

    let human_after = harness.human.employee(8).expect("human copy");
    assert_eq!(human_after.status.as_deref(), Some("On leave"));
    assert_eq!(human_after.updated_at, harness.clock_now());
    assert_eq!(human_after.full_name, human_before.full_name);
    assert_eq!(human_after.department_id, human_before.department_id);
    assert_eq!(human_after.position_id, human_before.position_id);
    assert_eq!(human_after.email, human_before.email);
    assert_eq!(human_after.date_of_birth, human_before.date_of_birth);

    let payroll_after = harness.payroll.employee(8).expect("payroll copy");
    assert_eq!(payroll_after.status.as_deref(), Some("On leave"));
    assert_eq!(payroll_after.full_name, "NGUYEN VAN AN");
    assert_eq!(payroll_after.department_id, payroll_before.department_id);
}

#[rstest]
#[tokio::test]
async fn department_rename_propagates_name(harness: Harness) {
    harness.seed_department_everywhere(3, "Accounts");

    harness
        .service
        .update_entity(EntityKind::Department, 3, json!({"name": "Finance"}))
        .await
        .expect("rename");

    assert_eq!(
        harness.payroll.record(EntityKind::Department, 3),
        Some(PayrollRecord::Department(department(3, "Finance").to_payroll()))
    );
}

#[rstest]
#[tokio::test]
async fn update_requires_presence_in_both_stores(harness: Harness) {
    harness.human.seed_employee(employee(8, "Nguyen Van An", 3, 1));

    let error = harness
        .service
        .update_entity(EntityKind::Employee, 8, json!({"status": "Resigned"}))
        .await
        .expect_err("payroll copy is missing");

    assert_eq!(error.code(), ErrorCode::NotFound);
    assert_eq!(
        error.details().expect("details")["missingFrom"],
        json!("payroll")
    );
    assert_eq!(harness.commits(), (0, 0));
}

#[rstest]
#[tokio::test]
async fn update_partial_failure_keeps_human_update(harness: Harness) {
    harness.seed_employee_everywhere(8, "Nguyen Van An", 3);
    harness
        .payroll
        .fail_next_commit(StoreError::commit("lock timeout"));

    let error = harness
        .service
        .update_entity(EntityKind::Employee, 8, json!({"positionId": 4}))
        .await
        .expect_err("payroll commit fails");

    assert_eq!(error.code(), ErrorCode::InternalError);
    assert_eq!(
        harness.human.employee(8).and_then(|e| e.position_id),
        Some(4)
    );
    assert_eq!(
        harness.payroll.employee(8).and_then(|e| e.position_id),
        Some(1)
    );
}

#[rstest]
#[tokio::test]
async fn delete_department_with_employees_lists_each_once(harness: Harness) {
    harness.seed_department_everywhere(3, "Finance");
    harness.seed_employee_everywhere(11, "Pham Thi Dung", 3);
    harness.human.seed_employee(employee(8, "Nguyen Van An", 3, 1));
    harness
        .payroll
        .seed_employee(employee(9, "Hoang Van Em", 3, 1).to_payroll());
    harness.seed_employee_everywhere(10, "Unrelated", 4);

    let error = harness
        .service
        .delete_entity(EntityKind::Department, 3)
        .await
        .expect_err("department has dependents");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(
        error.details().expect("details")["dependents"],
        json!([
            {"kind": "employee", "id": 8, "name": "Nguyen Van An", "source": "human"},
            {"kind": "employee", "id": 9, "name": "Hoang Van Em", "source": "payroll"},
            {"kind": "employee", "id": 11, "name": "Pham Thi Dung", "source": "human, payroll"},
        ])
    );
    assert!(harness.human.record(EntityKind::Department, 3).is_some());
    assert!(harness.payroll.record(EntityKind::Department, 3).is_some());
    assert_eq!(harness.commits(), (0, 0));
}

#[rstest]
#[tokio::test]
async fn delete_position_held_by_payroll_employee_is_refused(harness: Harness) {
    let record = position(2, "Engineer");
    harness.payroll.seed_position(record.to_payroll());
    harness.human.seed_position(record);
    harness
        .payroll
        .seed_employee(employee(9, "Vo Thi Hoa", 1, 2).to_payroll());
    harness.seed_employee_everywhere(4, "Unrelated", 1);

    let error = harness
        .service
        .delete_entity(EntityKind::Position, 2)
        .await
        .expect_err("position has a dependent");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(
        error.details().expect("details")["dependents"],
        json!([{"kind": "employee", "id": 9, "name": "Vo Thi Hoa", "source": "payroll"}])
    );
    assert!(harness.human.record(EntityKind::Position, 2).is_some());
    assert!(harness.payroll.record(EntityKind::Position, 2).is_some());
    assert_eq!(harness.commits(), (0, 0));
    harness.assert_sessions_released();
}

#[rstest]
#[tokio::test]
async fn delete_employee_with_pay_records_is_refused(harness: Harness) {
    harness.seed_employee_everywhere(8, "Nguyen Van An", 3);
    harness.human.seed_dividend(dividend(3, 8, 125_000));
    harness.payroll.seed_salary(salary(2, 8, 1));

    let error = harness
        .service
        .delete_entity(EntityKind::Employee, 8)
        .await
        .expect_err("employee has pay records");

    assert_eq!(error.code(), ErrorCode::Conflict);
    assert_eq!(
        error.details().expect("details")["dependents"],
        json!([
            {"kind": "salary", "id": 2, "name": "salary for 2025-01", "source": "payroll"},
            {"kind": "dividend", "id": 3, "name": "dividend of 1250.00 on 2025-01-31", "source": "human"},
        ])
    );
    assert!(harness.human.employee(8).is_some());
    assert!(harness.payroll.employee(8).is_some());
    assert_eq!(harness.commits(), (0, 0));
    harness.assert_sessions_released();
}

#[rstest]
#[tokio::test]
async fn delete_partial_failure_keeps_human_delete(harness: Harness) {
    harness.seed_department_everywhere(5, "Procurement");
    harness
        .payroll
        .fail_next_commit(StoreError::commit("could not obtain lock"));

    let error = harness
        .service
        .delete_entity(EntityKind::Department, 5)
        .await
        .expect_err("payroll commit fails");

    assert_eq!(error.code(), ErrorCode::InternalError);
    assert!(error.message().contains("department 5 was deleted in the human store"));
    assert!(error.message().contains("manual reconciliation"));
    let details = error.details().expect("details");
    assert_eq!(details["operation"], json!("delete"));
    assert_eq!(details["succeeded"], json!("human"));
    assert_eq!(details["failed"], json!("payroll"));
    assert!(harness.human.record(EntityKind::Department, 5).is_none());
    assert!(harness.payroll.record(EntityKind::Department, 5).is_some());
    assert_eq!(harness.commits(), (1, 0));
    harness.assert_sessions_released();
}

#[rstest]
#[tokio::test]
async fn delete_without_dependents_removes_from_both(harness: Harness) {
    harness.seed_department_everywhere(3, "Finance");

    let outcome = harness
        .service
        .delete_entity(EntityKind::Department, 3)
        .await
        .expect("delete");

    assert_eq!(outcome.affected_dependents, Some(0));
    assert_eq!(outcome.stores, StoreSet::both());
    let error = harness
        .service
        .inspect_entity(EntityKind::Department, 3)
        .await
        .expect_err("gone from both");
    assert_eq!(error.code(), ErrorCode::NotFound);
    harness.assert_sessions_released();
}

#[rstest]
#[tokio::test]
async fn delete_tolerates_presence_in_one_store(harness: Harness) {
    harness.human.seed_position(position(6, "Intern"));

    let outcome = harness
        .service
        .delete_entity(EntityKind::Position, 6)
        .await
        .expect("delete");

    assert_eq!(outcome.stores, StoreSet::only(StoreName::Human));
    assert!(!outcome.message.contains("synchronized"));
    assert_eq!(harness.commits(), (1, 0));
    assert!(harness.human.record(EntityKind::Position, 6).is_none());
}

#[rstest]
#[tokio::test]
async fn delete_missing_everywhere_is_not_found(harness: Harness) {
    let error = harness
        .service
        .delete_entity(EntityKind::Employee, 99)
        .await
        .expect_err("absent");

    assert_eq!(error.code(), ErrorCode::NotFound);
}

#[rstest]
#[tokio::test]
async fn employee_dependents_span_both_stores(harness: Harness) {
    harness.seed_employee_everywhere(8, "Nguyen Van An", 3);
    harness.human.seed_dividend(dividend(2, 8, 125_000));
    harness.payroll.seed_salary(salary(2, 8, 1));
    harness.payroll.seed_attendance(attendance(1, 8, 1));
    harness.payroll.seed_salary(salary(5, 9, 1));

    let dependents = harness
        .service
        .dependents(EntityKind::Employee, 8)
        .await
        .expect("list dependents");

    let listing: Vec<_> = dependents
        .iter()
        .map(|dep| (dep.kind, dep.id, dep.name.as_str(), dep.source.to_string()))
        .collect();
    assert_eq!(
        listing,
        vec![
            (DependentKind::Attendance, 1, "attendance for 2025-01", "payroll".to_owned()),
            (DependentKind::Dividend, 2, "dividend of 1250.00 on 2025-01-31", "human".to_owned()),
            (DependentKind::Salary, 2, "salary for 2025-01", "payroll".to_owned()),
        ]
    );
    assert_eq!(harness.commits(), (0, 0));
}

#[rstest]
#[tokio::test]
async fn inspect_reports_drift_and_missing_stores(harness: Harness) {
    harness.seed_employee_everywhere(8, "Nguyen Van An", 3);
    let mut drifted = harness.payroll.employee(8).expect("seeded");
    drifted.status = Some("Resigned".to_owned());
    harness.payroll.seed_employee(drifted);
    harness.human.seed_position(position(2, "Engineer"));

    let employee_report = harness
        .service
        .inspect_entity(EntityKind::Employee, 8)
        .await
        .expect("inspect employee");
    let position_report = harness
        .service
        .inspect_entity(EntityKind::Position, 2)
        .await
        .expect("inspect position");

    assert_eq!(employee_report.drift, vec!["status"]);
    assert!(!employee_report.consistent);
    assert_eq!(position_report.missing_from, StoreSet::only(StoreName::Payroll));
    assert!(position_report.drift.is_empty());
}

#[rstest]
#[tokio::test]
async fn read_failures_surface_as_internal_errors(harness: Harness) {
    harness
        .payroll
        .fail_reads(StoreError::query("relation \"employees\" does not exist"));

    let error = harness
        .service
        .allocate_identifier(EntityKind::Employee)
        .await
        .expect_err("payroll read fails");

    assert_eq!(error.code(), ErrorCode::InternalError);
    assert_eq!(error.details().expect("details")["store"], json!("payroll"));
    harness.assert_sessions_released();
}

#[tokio::test]
async fn human_open_failure_skips_payroll() {
    let mut human = MockHumanStore::new();
    human
        .expect_open()
        .times(1)
        .return_once(|| Err(StoreError::connection("pool timed out")));
    let mut payroll = MockPayrollStore::new();
    payroll.expect_open().never();
    let service = SyncService::new(
        Arc::new(human),
        Arc::new(payroll),
        Arc::new(MutableClock::new(fixture_timestamp())),
    );

    let error = service
        .dependents(EntityKind::Department, 3)
        .await
        .expect_err("open fails");

    assert_eq!(error.code(), ErrorCode::InternalError);
    assert!(error.message().starts_with("human store failed"));
}

#[tokio::test]
async fn update_commits_human_before_payroll() {
    let mut seq = Sequence::new();
    let record = department(3, "Accounts");
    let projection = record.to_payroll();

    let mut human_session = MockHumanSession::new();
    human_session
        .expect_find()
        .return_once(move |_, _| Ok(Some(HumanRecord::Department(record))));
    human_session
        .expect_stage()
        .withf(|write| {
            matches!(write, StagedWrite::Update(HumanRecord::Department(d)) if d.name == "Finance")
        })
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    human_session
        .expect_commit()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(()));
    human_session.expect_rollback().never();

    let mut payroll_session = MockPayrollSession::new();
    payroll_session
        .expect_find()
        .return_once(move |_, _| Ok(Some(PayrollRecord::Department(projection))));
    payroll_session
        .expect_stage()
        .times(1)
        .in_sequence(&mut seq)
        .return_const(());
    payroll_session
        .expect_commit()
        .times(1)
        .in_sequence(&mut seq)
        .returning(|| Ok(()));
    payroll_session.expect_rollback().never();

    let mut human = MockHumanStore::new();
    human
        .expect_open()
        .return_once(move || Ok(Box::new(human_session) as Box<dyn HumanSession>));
    let mut payroll = MockPayrollStore::new();
    payroll
        .expect_open()
        .return_once(move || Ok(Box::new(payroll_session) as Box<dyn PayrollSession>));
    let service = SyncService::new(
        Arc::new(human),
        Arc::new(payroll),
        Arc::new(MutableClock::new(fixture_timestamp())),
    );

    let outcome = service
        .update_entity(EntityKind::Department, 3, json!({"name": "Finance"}))
        .await
        .expect("update");

    assert_eq!(outcome.stores, StoreSet::both());
}

#[tokio::test]
async fn failed_payroll_commit_rolls_back_payroll_only() {
    let mut human_session = MockHumanSession::new();
    human_session.expect_find().returning(|_, _| Ok(None));
    human_session.expect_max_id().returning(|_| Ok(None));
    human_session.expect_stage().return_const(());
    human_session.expect_commit().times(1).returning(|| Ok(()));
    human_session.expect_rollback().never();

    let mut payroll_session = MockPayrollSession::new();
    payroll_session.expect_find().returning(|_, _| Ok(None));
    payroll_session.expect_max_id().returning(|_| Ok(None));
    payroll_session.expect_stage().return_const(());
    payroll_session
        .expect_commit()
        .times(1)
        .returning(|| Err(StoreError::commit("disk full")));
    payroll_session.expect_rollback().times(1).return_const(());

    let mut human = MockHumanStore::new();
    human
        .expect_open()
        .return_once(move || Ok(Box::new(human_session) as Box<dyn HumanSession>));
    let mut payroll = MockPayrollStore::new();
    payroll
        .expect_open()
        .return_once(move || Ok(Box::new(payroll_session) as Box<dyn PayrollSession>));
    let service = SyncService::new(
        Arc::new(human),
        Arc::new(payroll),
        Arc::new(MutableClock::new(fixture_timestamp())),
    );

    let error = service
        .create_entity(EntityKind::Department, json!({"name": "Finance"}))
        .await
        .expect_err("payroll commit fails");

    assert_eq!(error.code(), ErrorCode::InternalError);
    assert_eq!(error.details().expect("details")["id"], json!(1));
}
