//! Test utilities for database and router testing.
//!
//! Sets up in-memory SQLite databases with migrations applied and provides
//! fixture builders that go through the same repositories the service uses.
//! Each integration test binary pulls in only the helpers it needs.
#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use chrono::{DateTime, Duration, Utc};
use exeats::config::AppConfig;
use exeats::mail::LogMailer;
use exeats::models::{exeat, house, school, student, user};
use exeats::photos::FsPhotoStore;
use exeats::repositories::exeat::CreateExeatRequest;
use exeats::repositories::identity::CreateIdentityRequest;
use exeats::repositories::school::CreateSchoolRequest;
use exeats::repositories::staff::CreateStaffRequest;
use exeats::repositories::student::{CreateStudentRequest, EnrolledStudent};
use exeats::repositories::{
    ExeatRepository, HouseRepository, IdentityRepository, SchoolRepository, StaffRepository,
    StudentRepository,
};
use exeats::server::AppState;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use uuid::Uuid;

/// Operator token the test router accepts.
pub const TEST_OPERATOR_TOKEN: &str = "test-token";

/// Sets up an in-memory SQLite database with all migrations applied.
///
/// The pool is pinned to a single connection: every `sqlite::memory:`
/// connection is its own database, so a second pooled connection would see
/// no tables.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1);

    let db = Database::connect(options).await?;
    Migrator::up(&db, None).await?;
    Ok(db)
}

/// Builds the full application state and router over a fresh in-memory
/// database.
pub async fn setup_test_app() -> Result<(AppState, Router)> {
    let db = setup_test_db().await?;
    let config = Arc::new(AppConfig {
        operator_tokens: vec![TEST_OPERATOR_TOKEN.to_string()],
        ..Default::default()
    });

    let photo_root = std::env::temp_dir().join(format!("exeat-test-photos-{}", Uuid::new_v4()));
    let state = AppState {
        config: Arc::clone(&config),
        db,
        mailer: Arc::new(LogMailer::new(config.mail_from.clone())),
        photos: Arc::new(FsPhotoStore::new(photo_root)),
    };
    let app = exeats::server::create_app(state.clone());
    Ok((state, app))
}

/// Creates a school with the given name and code.
pub async fn create_school(
    db: &DatabaseConnection,
    name: &str,
    code: &str,
) -> Result<school::Model> {
    let repo = SchoolRepository::new(db);
    Ok(repo
        .create_school(CreateSchoolRequest {
            name: name.to_string(),
            code: code.to_string(),
            contact_email: format!("office@{}.example", code.to_lowercase()),
            contact_phone: None,
            address: None,
        })
        .await?)
}

/// Creates a house within a school.
pub async fn create_house(
    db: &DatabaseConnection,
    school_id: Uuid,
    name: &str,
) -> Result<house::Model> {
    let repo = HouseRepository::new(db);
    Ok(repo
        .create_house(exeats::repositories::house::CreateHouseRequest {
            school_id,
            name: name.to_string(),
            description: None,
        })
        .await?)
}

/// Enrolls a student; the reference doubles as the username.
pub async fn enroll_student(
    db: &DatabaseConnection,
    school_id: Uuid,
    house_id: Option<Uuid>,
    student_ref: &str,
) -> Result<EnrolledStudent> {
    let repo = StudentRepository::new(db);
    Ok(repo
        .create_student(CreateStudentRequest {
            school_id,
            house_id,
            student_ref: student_ref.to_string(),
            full_name: format!("Student {}", student_ref),
            email: format!(
                "{}@{}.students.example",
                student_ref.to_lowercase(),
                &school_id.to_string()[..8]
            ),
            guardian_name: None,
            guardian_phone: None,
        })
        .await?)
}

/// Creates a global administrator identity.
pub async fn create_admin(db: &DatabaseConnection, username: &str) -> Result<user::Model> {
    let repo = IdentityRepository::new(db);
    Ok(repo
        .create_identity(CreateIdentityRequest {
            username: username.to_string(),
            email: format!("{}@admins.example", username),
            password: "admin-password".to_string(),
            role: user::UserRole::Admin,
            school_id: None,
        })
        .await?)
}

/// Provisions the sub-admin of a school, returning the backing user.
pub async fn provision_sub_admin(
    db: &DatabaseConnection,
    school_id: Uuid,
    username: &str,
) -> Result<user::Model> {
    let repo = StaffRepository::new(db);
    let provisioned = repo
        .create_sub_admin(CreateStaffRequest {
            scope_id: school_id,
            username: username.to_string(),
            email: format!("{}@staff.example", username),
            full_name: format!("Sub Admin {}", username),
            phone: None,
        })
        .await?;
    Ok(provisioned.account)
}

/// Provisions the supervisor of a house, returning the backing user.
pub async fn provision_supervisor(
    db: &DatabaseConnection,
    house_id: Uuid,
    username: &str,
) -> Result<user::Model> {
    let repo = StaffRepository::new(db);
    let provisioned = repo
        .create_house_supervisor(CreateStaffRequest {
            scope_id: house_id,
            username: username.to_string(),
            email: format!("{}@staff.example", username),
            full_name: format!("Supervisor {}", username),
            phone: None,
        })
        .await?;
    Ok(provisioned.account)
}

/// Provisions a security officer, returning the backing user.
pub async fn provision_security(
    db: &DatabaseConnection,
    school_id: Uuid,
    username: &str,
) -> Result<user::Model> {
    let repo = StaffRepository::new(db);
    let provisioned = repo
        .create_security_person(CreateStaffRequest {
            scope_id: school_id,
            username: username.to_string(),
            email: format!("{}@staff.example", username),
            full_name: format!("Security {}", username),
            phone: None,
        })
        .await?;
    Ok(provisioned.account)
}

/// Files an exeat for a student, pending, leaving tomorrow for six hours.
pub async fn file_exeat(
    db: &DatabaseConnection,
    school_id: Uuid,
    student_id: Uuid,
) -> Result<exeat::Model> {
    let start = Utc::now() + Duration::days(1);
    file_exeat_between(db, school_id, student_id, start, start + Duration::hours(6)).await
}

/// Files an exeat with explicit times.
pub async fn file_exeat_between(
    db: &DatabaseConnection,
    school_id: Uuid,
    student_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Result<exeat::Model> {
    let repo = ExeatRepository::new(db);
    Ok(repo
        .create_exeat(CreateExeatRequest {
            school_id,
            student_id,
            reason: "weekend leave".to_string(),
            start_date: start,
            end_date: end,
        })
        .await?)
}

/// Rewrites an exeat's end date, bypassing the lifecycle (fixture only).
pub async fn backdate_exeat_end(
    db: &DatabaseConnection,
    record: exeat::Model,
    end: DateTime<Utc>,
) -> Result<exeat::Model> {
    use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};

    let mut active = record.into_active_model();
    active.end_date = Set(end.into());
    Ok(active.update(db).await?)
}

/// Rewrites a user's passcode issuance time (fixture only).
pub async fn backdate_passcode(
    db: &DatabaseConnection,
    account: user::Model,
    issued_at: DateTime<Utc>,
) -> Result<user::Model> {
    use sea_orm::{ActiveModelTrait, IntoActiveModel, Set};

    let mut active = account.into_active_model();
    active.otp_issued_at = Set(Some(issued_at.into()));
    Ok(active.update(db).await?)
}

/// Loads a fresh copy of an exeat row.
pub async fn reload_exeat(db: &DatabaseConnection, id: Uuid) -> Result<exeat::Model> {
    use sea_orm::EntityTrait;
    Ok(exeat::Entity::find_by_id(id)
        .one(db)
        .await?
        .expect("exeat row present"))
}

/// Loads a student row.
pub async fn reload_student(db: &DatabaseConnection, id: Uuid) -> Result<student::Model> {
    use sea_orm::EntityTrait;
    Ok(student::Entity::find_by_id(id)
        .one(db)
        .await?
        .expect("student row present"))
}
