//! Lifecycle and authorization scenarios driven through the repositories
//! and the gate, the way the handlers drive them.

mod test_utils;

use chrono::{Duration, Utc};
use exeats::access::{self, Visibility, resolve_actor, visibility};
use exeats::error::RepositoryError;
use exeats::lifecycle::{self, ExeatAction};
use exeats::models::exeat::ExeatStatus;
use exeats::repositories::ExeatRepository;
use exeats::repositories::exeat::CreateExeatRequest;
use sea_orm::DatabaseConnection;
use test_utils::*;
use uuid::Uuid;

async fn visible_count(db: &DatabaseConnection, user_id: Uuid) -> usize {
    let actor = resolve_actor(db, user_id).await.unwrap();
    ExeatRepository::new(db)
        .list_exeats(visibility(&actor), None)
        .await
        .unwrap()
        .len()
}

#[tokio::test]
async fn full_lifecycle_records_actors_and_timestamps() {
    let db = setup_test_db().await.unwrap();
    let school = create_school(&db, "Queens College", "QC").await.unwrap();
    let house = create_house(&db, school.id, "Red").await.unwrap();
    let enrolled = enroll_student(&db, school.id, Some(house.id), "QC-0001")
        .await
        .unwrap();
    let sub_admin = provision_sub_admin(&db, school.id, "qc.subadmin")
        .await
        .unwrap();
    let security = provision_security(&db, school.id, "qc.gate").await.unwrap();

    let repo = ExeatRepository::new(&db);
    let record = file_exeat(&db, school.id, enrolled.student.id)
        .await
        .unwrap();
    assert_eq!(record.status, ExeatStatus::Pending);
    assert!(record.approved_by.is_none());

    // Approve as the school's sub-admin.
    let approver = resolve_actor(&db, sub_admin.id).await.unwrap();
    let ctx = repo.context_for(&record).await.unwrap();
    assert!(access::can_transition(&approver, &ctx, ExeatAction::Approve));
    let record = repo
        .apply_transition(record, approver.user_id(), ExeatAction::Approve, Utc::now())
        .await
        .unwrap();
    assert_eq!(record.status, ExeatStatus::Approved);
    assert_eq!(record.approved_by, Some(sub_admin.id));

    // Sign out at the gate.
    let officer = resolve_actor(&db, security.id).await.unwrap();
    assert!(access::can_transition(&officer, &ctx, ExeatAction::SignOut));
    let sign_out_at = Utc::now();
    let record = repo
        .apply_transition(record, officer.user_id(), ExeatAction::SignOut, sign_out_at)
        .await
        .unwrap();
    assert_eq!(record.status, ExeatStatus::SignedOut);
    assert_eq!(record.signed_out_by, Some(security.id));
    assert_eq!(
        record.signed_out_time.map(|dt| dt.timestamp()),
        Some(sign_out_at.timestamp())
    );

    // And back in.
    let record = repo
        .apply_transition(record, officer.user_id(), ExeatAction::SignIn, Utc::now())
        .await
        .unwrap();
    assert_eq!(record.status, ExeatStatus::SignedIn);
    assert_eq!(record.signed_in_by, Some(security.id));
    assert!(record.signed_in_time.is_some());
}

#[tokio::test]
async fn rejection_is_terminal_and_records_no_actor() {
    let db = setup_test_db().await.unwrap();
    let school = create_school(&db, "Queens College", "QC").await.unwrap();
    let enrolled = enroll_student(&db, school.id, None, "QC-0002").await.unwrap();
    let sub_admin = provision_sub_admin(&db, school.id, "qc.subadmin")
        .await
        .unwrap();

    let repo = ExeatRepository::new(&db);
    let record = file_exeat(&db, school.id, enrolled.student.id)
        .await
        .unwrap();

    let record = repo
        .apply_transition(record, sub_admin.id, ExeatAction::Reject, Utc::now())
        .await
        .unwrap();
    assert_eq!(record.status, ExeatStatus::Rejected);
    assert!(record.approved_by.is_none());

    // No transition leaves rejected; the row stays unchanged.
    let err = repo
        .apply_transition(record.clone(), sub_admin.id, ExeatAction::Approve, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidState(_)));

    let reloaded = reload_exeat(&db, record.id).await.unwrap();
    assert_eq!(reloaded.status, ExeatStatus::Rejected);
}

#[tokio::test]
async fn double_sign_out_is_invalid_state() {
    let db = setup_test_db().await.unwrap();
    let school = create_school(&db, "Queens College", "QC").await.unwrap();
    let enrolled = enroll_student(&db, school.id, None, "QC-0003").await.unwrap();
    let security = provision_security(&db, school.id, "qc.gate").await.unwrap();
    let admin = create_admin(&db, "root").await.unwrap();

    let repo = ExeatRepository::new(&db);
    let record = file_exeat(&db, school.id, enrolled.student.id)
        .await
        .unwrap();
    let record = repo
        .apply_transition(record, admin.id, ExeatAction::Approve, Utc::now())
        .await
        .unwrap();
    let record = repo
        .apply_transition(record, security.id, ExeatAction::SignOut, Utc::now())
        .await
        .unwrap();

    let err = repo
        .apply_transition(record.clone(), security.id, ExeatAction::SignOut, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::InvalidState(_)));

    let reloaded = reload_exeat(&db, record.id).await.unwrap();
    assert_eq!(reloaded.status, ExeatStatus::SignedOut);
}

#[tokio::test]
async fn sub_admin_of_another_school_fails_the_gate() {
    let db = setup_test_db().await.unwrap();
    let school_a = create_school(&db, "School A", "SA").await.unwrap();
    let school_b = create_school(&db, "School B", "SB").await.unwrap();
    let enrolled = enroll_student(&db, school_a.id, None, "SA-0001").await.unwrap();
    let sub_admin_b = provision_sub_admin(&db, school_b.id, "sb.subadmin")
        .await
        .unwrap();
    let sub_admin_a = provision_sub_admin(&db, school_a.id, "sa.subadmin")
        .await
        .unwrap();

    let repo = ExeatRepository::new(&db);
    let record = file_exeat(&db, school_a.id, enrolled.student.id)
        .await
        .unwrap();
    let ctx = repo.context_for(&record).await.unwrap();

    let foreign = resolve_actor(&db, sub_admin_b.id).await.unwrap();
    assert!(!access::can_transition(&foreign, &ctx, ExeatAction::Approve));

    let own = resolve_actor(&db, sub_admin_a.id).await.unwrap();
    assert!(access::can_transition(&own, &ctx, ExeatAction::Approve));
    let record = repo
        .apply_transition(record, own.user_id(), ExeatAction::Approve, Utc::now())
        .await
        .unwrap();
    assert_eq!(record.status, ExeatStatus::Approved);
    assert_eq!(record.approved_by, Some(sub_admin_a.id));
}

#[tokio::test]
async fn student_cannot_transition_their_own_exeat() {
    let db = setup_test_db().await.unwrap();
    let school = create_school(&db, "Queens College", "QC").await.unwrap();
    let enrolled = enroll_student(&db, school.id, None, "QC-0004").await.unwrap();

    let repo = ExeatRepository::new(&db);
    let record = file_exeat(&db, school.id, enrolled.student.id)
        .await
        .unwrap();
    let ctx = repo.context_for(&record).await.unwrap();

    let student = resolve_actor(&db, enrolled.account.id).await.unwrap();
    for action in [
        ExeatAction::Approve,
        ExeatAction::Reject,
        ExeatAction::SignOut,
        ExeatAction::SignIn,
    ] {
        assert!(!access::can_transition(&student, &ctx, action));
    }
    // Reading and creating their own is still fine.
    assert!(access::can_view(&student, &ctx));
    assert!(access::can_create(&student, &ctx));
}

#[tokio::test]
async fn overdue_is_derived_and_cleared_by_sign_in() {
    let db = setup_test_db().await.unwrap();
    let school = create_school(&db, "Queens College", "QC").await.unwrap();
    let enrolled = enroll_student(&db, school.id, None, "QC-0005").await.unwrap();
    let admin = create_admin(&db, "root").await.unwrap();

    let repo = ExeatRepository::new(&db);
    let record = file_exeat(&db, school.id, enrolled.student.id)
        .await
        .unwrap();
    let record = repo
        .apply_transition(record, admin.id, ExeatAction::Approve, Utc::now())
        .await
        .unwrap();
    let record = repo
        .apply_transition(record, admin.id, ExeatAction::SignOut, Utc::now())
        .await
        .unwrap();

    // Push the requested return time into the past.
    let record = backdate_exeat_end(&db, record, Utc::now() - Duration::hours(2))
        .await
        .unwrap();

    let now = Utc::now();
    assert!(lifecycle::is_overdue(
        record.status,
        record.end_date.with_timezone(&Utc),
        now
    ));

    // Signing in clears overdueness even though end_date stays past.
    let record = repo
        .apply_transition(record, admin.id, ExeatAction::SignIn, now)
        .await
        .unwrap();
    assert!(!lifecycle::is_overdue(
        record.status,
        record.end_date.with_timezone(&Utc),
        now
    ));
}

#[tokio::test]
async fn creation_requires_consistent_school_but_not_date_ordering() {
    let db = setup_test_db().await.unwrap();
    let school_a = create_school(&db, "School A", "SA").await.unwrap();
    let school_b = create_school(&db, "School B", "SB").await.unwrap();
    let enrolled = enroll_student(&db, school_a.id, None, "SA-0002").await.unwrap();

    let repo = ExeatRepository::new(&db);

    // Filing under the wrong school is a validation failure.
    let err = repo
        .create_exeat(CreateExeatRequest {
            school_id: school_b.id,
            student_id: enrolled.student.id,
            reason: "mismatch".to_string(),
            start_date: Utc::now(),
            end_date: Utc::now() + Duration::hours(1),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));

    // An end before the start is accepted as filed.
    let start = Utc::now();
    let record = file_exeat_between(
        &db,
        school_a.id,
        enrolled.student.id,
        start,
        start - Duration::hours(3),
    )
    .await
    .unwrap();
    assert_eq!(record.status, ExeatStatus::Pending);

    // An empty reason is not.
    let err = repo
        .create_exeat(CreateExeatRequest {
            school_id: school_a.id,
            student_id: enrolled.student.id,
            reason: "   ".to_string(),
            start_date: start,
            end_date: start + Duration::hours(1),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Validation(_)));
}

#[tokio::test]
async fn listing_respects_the_visibility_hierarchy() {
    let db = setup_test_db().await.unwrap();
    let school_a = create_school(&db, "School A", "SA").await.unwrap();
    let school_b = create_school(&db, "School B", "SB").await.unwrap();
    let house_red = create_house(&db, school_a.id, "Red").await.unwrap();
    let house_blue = create_house(&db, school_a.id, "Blue").await.unwrap();

    let red_student = enroll_student(&db, school_a.id, Some(house_red.id), "SA-0003")
        .await
        .unwrap();
    let blue_student = enroll_student(&db, school_a.id, Some(house_blue.id), "SA-0004")
        .await
        .unwrap();
    let b_student = enroll_student(&db, school_b.id, None, "SB-0001").await.unwrap();

    file_exeat(&db, school_a.id, red_student.student.id)
        .await
        .unwrap();
    file_exeat(&db, school_a.id, blue_student.student.id)
        .await
        .unwrap();
    file_exeat(&db, school_b.id, b_student.student.id)
        .await
        .unwrap();

    let admin = create_admin(&db, "root").await.unwrap();
    let sub_admin_a = provision_sub_admin(&db, school_a.id, "sa.subadmin")
        .await
        .unwrap();
    let supervisor_red = provision_supervisor(&db, house_red.id, "sa.red")
        .await
        .unwrap();
    let security_a = provision_security(&db, school_a.id, "sa.gate").await.unwrap();

    let repo = ExeatRepository::new(&db);

    assert_eq!(visible_count(&db, admin.id).await, 3);
    assert_eq!(visible_count(&db, sub_admin_a.id).await, 2);
    assert_eq!(visible_count(&db, security_a.id).await, 2);
    assert_eq!(visible_count(&db, supervisor_red.id).await, 1);
    assert_eq!(visible_count(&db, red_student.account.id).await, 1);

    // The supervisor's one visible record is their house's student's.
    let supervisor = resolve_actor(&db, supervisor_red.id).await.unwrap();
    let records = repo.list_exeats(visibility(&supervisor), None).await.unwrap();
    assert_eq!(records[0].student_id, red_student.student.id);

    // Status filter narrows within scope.
    let sub_admin = resolve_actor(&db, sub_admin_a.id).await.unwrap();
    let pending = repo
        .list_exeats(visibility(&sub_admin), Some(ExeatStatus::Pending))
        .await
        .unwrap();
    assert_eq!(pending.len(), 2);
    let approved = repo
        .list_exeats(visibility(&sub_admin), Some(ExeatStatus::Approved))
        .await
        .unwrap();
    assert!(approved.is_empty());
}

#[tokio::test]
async fn dashboard_counts_follow_the_caller_scope() {
    let db = setup_test_db().await.unwrap();
    let school_a = create_school(&db, "School A", "SA").await.unwrap();
    let school_b = create_school(&db, "School B", "SB").await.unwrap();
    let a_student = enroll_student(&db, school_a.id, None, "SA-0005").await.unwrap();
    let b_student = enroll_student(&db, school_b.id, None, "SB-0002").await.unwrap();
    let admin = create_admin(&db, "root").await.unwrap();
    let sub_admin_a = provision_sub_admin(&db, school_a.id, "sa.subadmin")
        .await
        .unwrap();

    let repo = ExeatRepository::new(&db);
    let first = file_exeat(&db, school_a.id, a_student.student.id)
        .await
        .unwrap();
    file_exeat(&db, school_a.id, a_student.student.id)
        .await
        .unwrap();
    file_exeat(&db, school_b.id, b_student.student.id)
        .await
        .unwrap();

    repo.apply_transition(first, admin.id, ExeatAction::Approve, Utc::now())
        .await
        .unwrap();

    let admin_actor = resolve_actor(&db, admin.id).await.unwrap();
    let counts = repo
        .count_by_status(visibility(&admin_actor))
        .await
        .unwrap();
    assert_eq!(counts.total, 3);
    assert_eq!(counts.pending, 2);
    assert_eq!(counts.approved, 1);
    assert_eq!(counts.rejected, 0);

    let sub_admin_actor = resolve_actor(&db, sub_admin_a.id).await.unwrap();
    let counts = repo
        .count_by_status(visibility(&sub_admin_actor))
        .await
        .unwrap();
    assert_eq!(counts.total, 2);
    assert_eq!(counts.pending, 1);
    assert_eq!(counts.approved, 1);
}

#[tokio::test]
async fn gate_queue_lists_approved_and_signed_out_only() {
    let db = setup_test_db().await.unwrap();
    let school = create_school(&db, "Queens College", "QC").await.unwrap();
    let enrolled = enroll_student(&db, school.id, None, "QC-0006").await.unwrap();
    let admin = create_admin(&db, "root").await.unwrap();
    let security = provision_security(&db, school.id, "qc.gate").await.unwrap();

    let repo = ExeatRepository::new(&db);
    let pending = file_exeat(&db, school.id, enrolled.student.id)
        .await
        .unwrap();
    let approved = file_exeat(&db, school.id, enrolled.student.id)
        .await
        .unwrap();
    let out = file_exeat(&db, school.id, enrolled.student.id)
        .await
        .unwrap();

    let approved = repo
        .apply_transition(approved, admin.id, ExeatAction::Approve, Utc::now())
        .await
        .unwrap();
    let out = repo
        .apply_transition(out, admin.id, ExeatAction::Approve, Utc::now())
        .await
        .unwrap();
    let out = repo
        .apply_transition(out, admin.id, ExeatAction::SignOut, Utc::now())
        .await
        .unwrap();

    let officer = resolve_actor(&db, security.id).await.unwrap();
    let queue = repo.list_gate_queue(visibility(&officer)).await.unwrap();
    let ids: Vec<_> = queue.iter().map(|record| record.id).collect();

    assert_eq!(queue.len(), 2);
    assert!(ids.contains(&approved.id));
    assert!(ids.contains(&out.id));
    assert!(!ids.contains(&pending.id));
}

#[tokio::test]
async fn resolved_visibility_matches_roles() {
    let db = setup_test_db().await.unwrap();
    let school = create_school(&db, "Queens College", "QC").await.unwrap();
    let house = create_house(&db, school.id, "Red").await.unwrap();
    let enrolled = enroll_student(&db, school.id, Some(house.id), "QC-0007")
        .await
        .unwrap();
    let supervisor = provision_supervisor(&db, house.id, "qc.red").await.unwrap();

    let actor = resolve_actor(&db, supervisor.id).await.unwrap();
    assert_eq!(visibility(&actor), Visibility::House(house.id));

    let actor = resolve_actor(&db, enrolled.account.id).await.unwrap();
    assert_eq!(
        visibility(&actor),
        Visibility::OwnStudent(enrolled.student.id)
    );
}
