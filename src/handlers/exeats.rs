//! # Exeats API Handlers
//!
//! This module contains handlers for filing exeats, listing them within the
//! caller's visibility scope and driving the lifecycle transitions.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::access::{self, visibility};
use crate::auth::{ActorExtension, OperatorAuth};
use crate::error::{ApiError, RepositoryError, forbidden};
use crate::handlers::types::ApiResponse;
use crate::lifecycle::{self, ExeatAction};
use crate::models::exeat::{self, ExeatStatus};
use crate::repositories::ExeatRepository;
use crate::repositories::exeat::CreateExeatRequest;
use crate::server::AppState;

/// Request payload for filing a new exeat
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateExeatRequestDto {
    /// Student the exeat is for; defaults to the acting student's own
    /// record and is required for staff filing on a student's behalf
    pub student_id: Option<Uuid>,
    /// Free-text reason for the leave
    #[schema(example = "Dental appointment")]
    pub reason: String,
    /// Requested departure time (RFC 3339)
    pub start_date: DateTime<Utc>,
    /// Requested return time (RFC 3339)
    pub end_date: DateTime<Utc>,
}

/// Exeat information response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ExeatInfo {
    /// Unique identifier for the exeat
    pub id: String,
    /// Owning school
    pub school_id: String,
    /// Student the exeat belongs to
    pub student_id: String,
    /// Free-text reason for the leave
    pub reason: String,
    /// Requested departure time
    pub start_date: String,
    /// Requested return time
    pub end_date: String,
    /// Current lifecycle status
    pub status: ExeatStatus,
    /// Whether the student is still out past the requested return time;
    /// recomputed on every read, never stored
    pub is_overdue: bool,
    /// Identity that approved the request
    pub approved_by: Option<String>,
    /// Identity that recorded the physical departure
    pub signed_out_by: Option<String>,
    /// When the physical departure was recorded
    pub signed_out_time: Option<String>,
    /// Identity that recorded the physical return
    pub signed_in_by: Option<String>,
    /// When the physical return was recorded
    pub signed_in_time: Option<String>,
    /// Timestamp when the exeat was created
    pub created_at: String,
    /// Timestamp when the exeat was last updated
    pub updated_at: String,
}

impl ExeatInfo {
    /// Build the response view of a stored exeat, computing overdueness
    /// against `now`.
    pub fn from_model(model: exeat::Model, now: DateTime<Utc>) -> Self {
        let is_overdue =
            lifecycle::is_overdue(model.status, model.end_date.with_timezone(&Utc), now);
        Self {
            id: model.id.to_string(),
            school_id: model.school_id.to_string(),
            student_id: model.student_id.to_string(),
            reason: model.reason,
            start_date: model.start_date.to_rfc3339(),
            end_date: model.end_date.to_rfc3339(),
            status: model.status,
            is_overdue,
            approved_by: model.approved_by.map(|id| id.to_string()),
            signed_out_by: model.signed_out_by.map(|id| id.to_string()),
            signed_out_time: model.signed_out_time.map(|dt| dt.to_rfc3339()),
            signed_in_by: model.signed_in_by.map(|id| id.to_string()),
            signed_in_time: model.signed_in_time.map(|dt| dt.to_rfc3339()),
            created_at: model.created_at.to_rfc3339(),
            updated_at: model.updated_at.to_rfc3339(),
        }
    }
}

/// Query parameters for listing exeats
#[derive(Debug, Deserialize)]
pub struct ListExeatsQuery {
    /// Narrow the listing to one status
    pub status: Option<ExeatStatus>,
    /// Restrict to the gate queue: approved and signed-out records
    #[serde(default)]
    pub gate_queue: bool,
}

/// File a new exeat
#[utoipa::path(
    post,
    path = "/api/v1/exeats",
    security(("bearer_auth" = [])),
    request_body = CreateExeatRequestDto,
    responses(
        (status = 201, description = "Exeat filed", body = ApiResponse<ExeatInfo>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 403, description = "Not authorized for this student", body = ApiError),
        (status = 404, description = "Student not found", body = ApiError)
    ),
    tag = "exeats"
)]
pub async fn create_exeat(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Json(request): Json<CreateExeatRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<ExeatInfo>>), ApiError> {
    let repo = ExeatRepository::new(&state.db);

    let student_id = match (&actor, request.student_id) {
        (access::Actor::Student { student_id, .. }, None) => *student_id,
        (_, Some(student_id)) => student_id,
        (_, None) => {
            return Err(ApiError::from(RepositoryError::validation_error(
                "student_id is required when filing on a student's behalf",
            )));
        }
    };

    let ctx = repo.context_for_student(student_id).await?;
    if !access::can_create(&actor, &ctx) {
        return Err(forbidden(Some("Not authorized to file for this student")));
    }

    let created = repo
        .create_exeat(CreateExeatRequest {
            school_id: ctx.school_id,
            student_id,
            reason: request.reason,
            start_date: request.start_date,
            end_date: request.end_date,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(ExeatInfo::from_model(created, Utc::now()))),
    ))
}

/// List exeats within the caller's visibility scope
#[utoipa::path(
    get,
    path = "/api/v1/exeats",
    security(("bearer_auth" = [])),
    params(
        ("status" = Option<String>, Query, description = "Narrow to one status"),
        ("gate_queue" = Option<bool>, Query, description = "Only approved and signed-out records")
    ),
    responses(
        (status = 200, description = "Exeats within scope", body = ApiResponse<Vec<ExeatInfo>>)
    ),
    tag = "exeats"
)]
pub async fn list_exeats(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Query(query): Query<ListExeatsQuery>,
) -> Result<Json<ApiResponse<Vec<ExeatInfo>>>, ApiError> {
    let repo = ExeatRepository::new(&state.db);
    let scope = visibility(&actor);

    let records = if query.gate_queue {
        repo.list_gate_queue(scope).await?
    } else {
        repo.list_exeats(scope, query.status).await?
    };

    let now = Utc::now();
    let infos = records
        .into_iter()
        .map(|record| ExeatInfo::from_model(record, now))
        .collect();

    Ok(Json(ApiResponse::new(infos)))
}

/// Get one exeat by ID
#[utoipa::path(
    get,
    path = "/api/v1/exeats/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Exeat UUID")),
    responses(
        (status = 200, description = "Exeat detail", body = ApiResponse<ExeatInfo>),
        (status = 403, description = "Outside the caller's visibility", body = ApiError),
        (status = 404, description = "Exeat not found", body = ApiError)
    ),
    tag = "exeats"
)]
pub async fn get_exeat(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Path(exeat_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ExeatInfo>>, ApiError> {
    let repo = ExeatRepository::new(&state.db);

    let record = repo
        .get_exeat_by_id(exeat_id)
        .await?
        .ok_or_else(|| ApiError::from(RepositoryError::NotFound("Exeat not found".to_string())))?;

    let ctx = repo.context_for(&record).await?;
    if !access::can_view(&actor, &ctx) {
        return Err(forbidden(Some("Not authorized to view this exeat")));
    }

    Ok(Json(ApiResponse::new(ExeatInfo::from_model(
        record,
        Utc::now(),
    ))))
}

/// Approve a pending exeat
#[utoipa::path(
    post,
    path = "/api/v1/exeats/{id}/approve",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Exeat UUID")),
    responses(
        (status = 200, description = "Exeat approved", body = ApiResponse<ExeatInfo>),
        (status = 400, description = "Not in a state that allows approval", body = ApiError),
        (status = 403, description = "Not authorized", body = ApiError),
        (status = 404, description = "Exeat not found", body = ApiError)
    ),
    tag = "exeats"
)]
pub async fn approve_exeat(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Path(exeat_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ExeatInfo>>, ApiError> {
    transition(&state, actor, exeat_id, ExeatAction::Approve).await
}

/// Reject a pending exeat
#[utoipa::path(
    post,
    path = "/api/v1/exeats/{id}/reject",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Exeat UUID")),
    responses(
        (status = 200, description = "Exeat rejected", body = ApiResponse<ExeatInfo>),
        (status = 400, description = "Not in a state that allows rejection", body = ApiError),
        (status = 403, description = "Not authorized", body = ApiError),
        (status = 404, description = "Exeat not found", body = ApiError)
    ),
    tag = "exeats"
)]
pub async fn reject_exeat(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Path(exeat_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ExeatInfo>>, ApiError> {
    transition(&state, actor, exeat_id, ExeatAction::Reject).await
}

/// Record the student physically leaving
#[utoipa::path(
    post,
    path = "/api/v1/exeats/{id}/sign-out",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Exeat UUID")),
    responses(
        (status = 200, description = "Departure recorded", body = ApiResponse<ExeatInfo>),
        (status = 400, description = "Exeat is not approved", body = ApiError),
        (status = 403, description = "Not authorized", body = ApiError),
        (status = 404, description = "Exeat not found", body = ApiError)
    ),
    tag = "exeats"
)]
pub async fn sign_out_exeat(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Path(exeat_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ExeatInfo>>, ApiError> {
    transition(&state, actor, exeat_id, ExeatAction::SignOut).await
}

/// Record the student physically returning
#[utoipa::path(
    post,
    path = "/api/v1/exeats/{id}/sign-in",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Exeat UUID")),
    responses(
        (status = 200, description = "Return recorded", body = ApiResponse<ExeatInfo>),
        (status = 400, description = "Exeat is not signed out", body = ApiError),
        (status = 403, description = "Not authorized", body = ApiError),
        (status = 404, description = "Exeat not found", body = ApiError)
    ),
    tag = "exeats"
)]
pub async fn sign_in_exeat(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Path(exeat_id): Path<Uuid>,
) -> Result<Json<ApiResponse<ExeatInfo>>, ApiError> {
    transition(&state, actor, exeat_id, ExeatAction::SignIn).await
}

/// Shared transition flow: load, gate, then apply. The gate runs before
/// the state check so a caller outside their scope learns nothing about
/// the record's status.
async fn transition(
    state: &AppState,
    actor: access::Actor,
    exeat_id: Uuid,
    action: ExeatAction,
) -> Result<Json<ApiResponse<ExeatInfo>>, ApiError> {
    let repo = ExeatRepository::new(&state.db);

    let record = repo
        .get_exeat_by_id(exeat_id)
        .await?
        .ok_or_else(|| ApiError::from(RepositoryError::NotFound("Exeat not found".to_string())))?;

    let ctx = repo.context_for(&record).await?;
    if !access::can_transition(&actor, &ctx, action) {
        tracing::info!(
            exeat_id = %exeat_id,
            user_id = %actor.user_id(),
            role = actor.role_name(),
            action = action.as_str(),
            "Transition refused by authorization gate"
        );
        return Err(forbidden(Some("Not authorized for this exeat")));
    }

    let now = Utc::now();
    let updated = repo
        .apply_transition(record, actor.user_id(), action, now)
        .await?;

    Ok(Json(ApiResponse::new(ExeatInfo::from_model(updated, now))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample_model(status: ExeatStatus, end_date: DateTime<Utc>) -> exeat::Model {
        let now = Utc::now();
        exeat::Model {
            id: Uuid::new_v4(),
            school_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            reason: "weekend leave".to_string(),
            start_date: (end_date - Duration::hours(6)).into(),
            end_date: end_date.into(),
            status,
            approved_by: None,
            signed_out_by: None,
            signed_out_time: None,
            signed_in_by: None,
            signed_in_time: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn info_marks_signed_out_past_end_as_overdue() {
        let now = Utc::now();
        let model = sample_model(ExeatStatus::SignedOut, now - Duration::hours(1));
        let info = ExeatInfo::from_model(model, now);
        assert!(info.is_overdue);
    }

    #[test]
    fn info_never_marks_signed_in_as_overdue() {
        let now = Utc::now();
        let model = sample_model(ExeatStatus::SignedIn, now - Duration::hours(1));
        let info = ExeatInfo::from_model(model, now);
        assert!(!info.is_overdue);
    }

    #[test]
    fn info_keeps_status_and_ids_stringly() {
        let now = Utc::now();
        let model = sample_model(ExeatStatus::Pending, now + Duration::hours(1));
        let id = model.id;
        let info = ExeatInfo::from_model(model, now);
        assert_eq!(info.id, id.to_string());
        assert_eq!(info.status, ExeatStatus::Pending);
        assert!(!info.is_overdue);
    }
}
