//! # Schools API Handlers
//!
//! This module contains handlers for school (tenant) creation and
//! management endpoints. Only global administrators manage schools.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::access::Actor;
use crate::auth::{ActorExtension, OperatorAuth};
use crate::error::{ApiError, RepositoryError, forbidden};
use crate::handlers::types::ApiResponse;
use crate::models::school;
use crate::repositories::SchoolRepository;
use crate::repositories::school::CreateSchoolRequest;
use crate::server::AppState;

/// Request payload for creating a new school
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSchoolRequestDto {
    /// Display name, unique across the deployment
    #[schema(example = "Queens College")]
    pub name: String,
    /// Short code, unique across the deployment
    #[schema(example = "QC")]
    pub code: String,
    /// Contact e-mail for the school office
    #[schema(example = "office@queens.example")]
    pub contact_email: String,
    /// Contact phone number
    pub contact_phone: Option<String>,
    /// Postal address
    pub address: Option<String>,
}

/// School information response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SchoolInfo {
    /// Unique identifier for the school
    pub id: String,
    /// Display name
    pub name: String,
    /// Short code
    pub code: String,
    /// Contact e-mail
    pub contact_email: String,
    /// Contact phone number
    pub contact_phone: Option<String>,
    /// Postal address
    pub address: Option<String>,
    /// Timestamp when the school was created (ISO 8601)
    pub created_at: String,
}

impl From<school::Model> for SchoolInfo {
    fn from(model: school::Model) -> Self {
        Self {
            id: model.id.to_string(),
            name: model.name,
            code: model.code,
            contact_email: model.contact_email,
            contact_phone: model.contact_phone,
            address: model.address,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

fn require_admin(actor: &Actor) -> Result<(), ApiError> {
    match actor {
        Actor::Admin { .. } => Ok(()),
        _ => Err(forbidden(Some("Administrator access required"))),
    }
}

/// Create a new school
#[utoipa::path(
    post,
    path = "/api/v1/schools",
    security(("bearer_auth" = [])),
    request_body = CreateSchoolRequestDto,
    responses(
        (status = 201, description = "School created", body = ApiResponse<SchoolInfo>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 403, description = "Administrator access required", body = ApiError),
        (status = 409, description = "Name or code already taken", body = ApiError)
    ),
    tag = "schools"
)]
pub async fn create_school(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Json(request): Json<CreateSchoolRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<SchoolInfo>>), ApiError> {
    require_admin(&actor)?;

    let repo = SchoolRepository::new(&state.db);
    let created = repo
        .create_school(CreateSchoolRequest {
            name: request.name,
            code: request.code,
            contact_email: request.contact_email,
            contact_phone: request.contact_phone,
            address: request.address,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(SchoolInfo::from(created))),
    ))
}

/// List all schools
#[utoipa::path(
    get,
    path = "/api/v1/schools",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All schools", body = ApiResponse<Vec<SchoolInfo>>),
        (status = 403, description = "Administrator access required", body = ApiError)
    ),
    tag = "schools"
)]
pub async fn list_schools(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
) -> Result<Json<ApiResponse<Vec<SchoolInfo>>>, ApiError> {
    require_admin(&actor)?;

    let repo = SchoolRepository::new(&state.db);
    let schools = repo.list_schools().await?;

    Ok(Json(ApiResponse::new(
        schools.into_iter().map(SchoolInfo::from).collect(),
    )))
}

/// Get a school by ID
#[utoipa::path(
    get,
    path = "/api/v1/schools/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "School UUID")),
    responses(
        (status = 200, description = "School detail", body = ApiResponse<SchoolInfo>),
        (status = 403, description = "Outside the caller's school", body = ApiError),
        (status = 404, description = "School not found", body = ApiError)
    ),
    tag = "schools"
)]
pub async fn get_school(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Path(school_id): Path<Uuid>,
) -> Result<Json<ApiResponse<SchoolInfo>>, ApiError> {
    let own_school = match &actor {
        Actor::Admin { .. } => None,
        Actor::SubAdmin { school_id, .. }
        | Actor::HouseSupervisor { school_id, .. }
        | Actor::Security { school_id, .. }
        | Actor::Student { school_id, .. } => Some(*school_id),
    };
    if let Some(own) = own_school
        && own != school_id
    {
        return Err(forbidden(Some("Not authorized for this school")));
    }

    let repo = SchoolRepository::new(&state.db);
    let school = repo
        .get_school_by_id(school_id)
        .await?
        .ok_or_else(|| ApiError::from(RepositoryError::NotFound("School not found".to_string())))?;

    Ok(Json(ApiResponse::new(SchoolInfo::from(school))))
}

/// Delete a school and everything it owns
#[utoipa::path(
    delete,
    path = "/api/v1/schools/{id}",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "School UUID")),
    responses(
        (status = 204, description = "School deleted"),
        (status = 403, description = "Administrator access required", body = ApiError),
        (status = 404, description = "School not found", body = ApiError)
    ),
    tag = "schools"
)]
pub async fn delete_school(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Path(school_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    require_admin(&actor)?;

    let repo = SchoolRepository::new(&state.db);
    repo.delete_school(school_id).await?;

    Ok(StatusCode::NO_CONTENT)
}
