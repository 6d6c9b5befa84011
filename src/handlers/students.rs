//! # Students API Handlers
//!
//! Enrollment, roster listing and the student photo endpoints. Enrollment
//! provisions the backing identity in the same transaction and mails the
//! generated credentials best-effort.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::access::{Actor, ExeatContext, can_view, visibility};
use crate::auth::{ActorExtension, OperatorAuth};
use crate::error::{ApiError, RepositoryError, forbidden};
use crate::handlers::types::ApiResponse;
use crate::mail::{MailMessage, send_best_effort};
use crate::models::student;
use crate::repositories::StudentRepository;
use crate::repositories::student::CreateStudentRequest;
use crate::server::AppState;

/// Request payload for enrolling a new student
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateStudentRequestDto {
    /// Owning school; inferred for sub-admins, required for administrators
    pub school_id: Option<Uuid>,
    /// Assigned house, if any
    pub house_id: Option<Uuid>,
    /// School-issued reference number, unique within the school; doubles
    /// as the login name
    #[schema(example = "QC-2024-0117")]
    pub student_ref: String,
    /// Full display name
    #[schema(example = "Ama Mensah")]
    pub full_name: String,
    /// E-mail for the backing identity account
    #[schema(example = "ama.mensah@example.com")]
    pub email: String,
    /// Guardian contact name
    pub guardian_name: Option<String>,
    /// Guardian contact phone number
    pub guardian_phone: Option<String>,
}

/// Student information response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StudentInfo {
    /// Unique identifier for the student
    pub id: String,
    /// Owning school
    pub school_id: String,
    /// Assigned house, if any
    pub house_id: Option<String>,
    /// Backing identity account
    pub user_id: String,
    /// School-issued reference number
    pub student_ref: String,
    /// Full display name
    pub full_name: String,
    /// Guardian contact name
    pub guardian_name: Option<String>,
    /// Guardian contact phone number
    pub guardian_phone: Option<String>,
    /// Whether a photo is on file
    pub has_photo: bool,
    /// Timestamp when the student was created (ISO 8601)
    pub created_at: String,
}

impl From<student::Model> for StudentInfo {
    fn from(model: student::Model) -> Self {
        Self {
            id: model.id.to_string(),
            school_id: model.school_id.to_string(),
            house_id: model.house_id.map(|id| id.to_string()),
            user_id: model.user_id.to_string(),
            student_ref: model.student_ref,
            full_name: model.full_name,
            guardian_name: model.guardian_name,
            guardian_phone: model.guardian_phone,
            has_photo: model.photo_path.is_some(),
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

fn enrollment_school(actor: &Actor, requested: Option<Uuid>) -> Result<Uuid, ApiError> {
    match (actor, requested) {
        (Actor::Admin { .. }, Some(school_id)) => Ok(school_id),
        (Actor::Admin { .. }, None) => Err(crate::error::validation_error(
            "school_id is required",
            serde_json::json!({ "school_id": "Administrators must name the school" }),
        )),
        (Actor::SubAdmin { school_id: own, .. }, requested) => {
            if requested.is_some_and(|requested| requested != *own) {
                return Err(forbidden(Some("Not authorized for this school")));
            }
            Ok(*own)
        }
        _ => Err(forbidden(Some("Not authorized to enroll students"))),
    }
}

/// Enroll a new student
#[utoipa::path(
    post,
    path = "/api/v1/students",
    security(("bearer_auth" = [])),
    request_body = CreateStudentRequestDto,
    responses(
        (status = 201, description = "Student enrolled", body = ApiResponse<StudentInfo>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 403, description = "Not authorized", body = ApiError),
        (status = 409, description = "Reference or identity already taken", body = ApiError)
    ),
    tag = "students"
)]
pub async fn create_student(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Json(request): Json<CreateStudentRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<StudentInfo>>), ApiError> {
    let school_id = enrollment_school(&actor, request.school_id)?;

    let repo = StudentRepository::new(&state.db);
    let enrolled = repo
        .create_student(CreateStudentRequest {
            school_id,
            house_id: request.house_id,
            student_ref: request.student_ref,
            full_name: request.full_name,
            email: request.email,
            guardian_name: request.guardian_name,
            guardian_phone: request.guardian_phone,
        })
        .await?;

    send_best_effort(
        state.mailer.as_ref(),
        MailMessage {
            to: enrolled.account.email.clone(),
            subject: "Your Account Details".to_string(),
            body: format!(
                "Username: {}\nPassword: {}",
                enrolled.account.username, enrolled.password
            ),
        },
    )
    .await;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(StudentInfo::from(enrolled.student))),
    ))
}

/// List students within the caller's visibility scope
#[utoipa::path(
    get,
    path = "/api/v1/students",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Students within scope", body = ApiResponse<Vec<StudentInfo>>)
    ),
    tag = "students"
)]
pub async fn list_students(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
) -> Result<Json<ApiResponse<Vec<StudentInfo>>>, ApiError> {
    let repo = StudentRepository::new(&state.db);
    let students = repo.list_students(visibility(&actor)).await?;

    Ok(Json(ApiResponse::new(
        students.into_iter().map(StudentInfo::from).collect(),
    )))
}

/// Get a student by ID
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Student UUID")),
    responses(
        (status = 200, description = "Student detail", body = ApiResponse<StudentInfo>),
        (status = 403, description = "Outside the caller's visibility", body = ApiError),
        (status = 404, description = "Student not found", body = ApiError)
    ),
    tag = "students"
)]
pub async fn get_student(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Path(student_id): Path<Uuid>,
) -> Result<Json<ApiResponse<StudentInfo>>, ApiError> {
    let repo = StudentRepository::new(&state.db);
    let record = load_visible_student(&repo, &actor, student_id).await?;

    Ok(Json(ApiResponse::new(StudentInfo::from(record))))
}

/// Store a student's photo
#[utoipa::path(
    put,
    path = "/api/v1/students/{id}/photo",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Student UUID")),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Photo stored", body = ApiResponse<StudentInfo>),
        (status = 400, description = "Empty photo payload", body = ApiError),
        (status = 403, description = "Not authorized", body = ApiError),
        (status = 404, description = "Student not found", body = ApiError)
    ),
    tag = "students"
)]
pub async fn put_student_photo(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Path(student_id): Path<Uuid>,
    body: Bytes,
) -> Result<Json<ApiResponse<StudentInfo>>, ApiError> {
    if body.is_empty() {
        return Err(crate::error::validation_error(
            "Photo payload is empty",
            serde_json::json!({ "body": "An image payload is required" }),
        ));
    }

    let repo = StudentRepository::new(&state.db);
    let record = repo
        .get_student_by_id(student_id)
        .await?
        .ok_or_else(|| ApiError::from(RepositoryError::NotFound("Student not found".to_string())))?;

    let may_upload = match &actor {
        Actor::Admin { .. } => true,
        Actor::SubAdmin { school_id, .. } => *school_id == record.school_id,
        _ => false,
    };
    if !may_upload {
        return Err(forbidden(Some("Not authorized to manage this student")));
    }

    let reference = state.photos.store(student_id, &body).await?;
    let updated = repo.set_photo(student_id, reference).await?;

    Ok(Json(ApiResponse::new(StudentInfo::from(updated))))
}

/// Serve a student's photo
#[utoipa::path(
    get,
    path = "/api/v1/students/{id}/photo",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Student UUID")),
    responses(
        (status = 200, description = "Photo bytes", body = Vec<u8>, content_type = "application/octet-stream"),
        (status = 403, description = "Outside the caller's visibility", body = ApiError),
        (status = 404, description = "Student or photo not found", body = ApiError)
    ),
    tag = "students"
)]
pub async fn get_student_photo(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Path(student_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let repo = StudentRepository::new(&state.db);
    let record = load_visible_student(&repo, &actor, student_id).await?;

    let reference = record.photo_path.ok_or_else(|| {
        ApiError::from(RepositoryError::NotFound(
            "No photo on file for this student".to_string(),
        ))
    })?;

    let bytes = state.photos.load(&reference).await.map_err(|err| {
        tracing::error!(student_id = %student_id, error = %err, "Photo store read failed");
        ApiError::from(RepositoryError::NotFound(
            "No photo on file for this student".to_string(),
        ))
    })?;

    Ok((
        [(header::CONTENT_TYPE, "application/octet-stream")],
        bytes,
    )
        .into_response())
}

async fn load_visible_student(
    repo: &StudentRepository<'_>,
    actor: &Actor,
    student_id: Uuid,
) -> Result<student::Model, ApiError> {
    let record = repo
        .get_student_by_id(student_id)
        .await?
        .ok_or_else(|| ApiError::from(RepositoryError::NotFound("Student not found".to_string())))?;

    let ctx = ExeatContext {
        school_id: record.school_id,
        student_id: record.id,
        house_id: record.house_id,
    };
    if !can_view(actor, &ctx) {
        return Err(forbidden(Some("Not authorized to view this student")));
    }

    Ok(record)
}
