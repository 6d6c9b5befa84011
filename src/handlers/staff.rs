//! # Staff API Handlers
//!
//! Provisioning endpoints for the three staff roles. Each provisions the
//! backing identity in the same transaction as the profile and mails the
//! generated credentials best-effort.

use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::access::Actor;
use crate::auth::{ActorExtension, OperatorAuth};
use crate::error::{ApiError, RepositoryError, forbidden};
use crate::handlers::types::ApiResponse;
use crate::mail::{MailMessage, send_best_effort};
use crate::models::user;
use crate::repositories::HouseRepository;
use crate::repositories::staff::{CreateStaffRequest, StaffRepository};
use crate::server::AppState;

/// Request payload for provisioning a staff member
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateStaffRequestDto {
    /// School (sub-admin, security) or house (supervisor) the profile is
    /// scoped to
    pub scope_id: Uuid,
    /// Login name for the backing identity account
    #[schema(example = "m.owusu")]
    pub username: String,
    /// E-mail for the backing identity account
    #[schema(example = "m.owusu@example.com")]
    pub email: String,
    /// Full display name
    #[schema(example = "Martha Owusu")]
    pub full_name: String,
    /// Contact phone number
    pub phone: Option<String>,
}

/// Provisioned staff member response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StaffInfo {
    /// Unique identifier for the profile
    pub id: String,
    /// School or house the profile is scoped to
    pub scope_id: String,
    /// Backing identity account
    pub user_id: String,
    /// Login name of the backing account
    pub username: String,
    /// Full display name
    pub full_name: String,
    /// Contact phone number
    pub phone: Option<String>,
}

fn staff_info(
    id: Uuid,
    scope_id: Uuid,
    account: &user::Model,
    full_name: String,
    phone: Option<String>,
) -> StaffInfo {
    StaffInfo {
        id: id.to_string(),
        scope_id: scope_id.to_string(),
        user_id: account.id.to_string(),
        username: account.username.clone(),
        full_name,
        phone,
    }
}

async fn mail_credentials(state: &AppState, account: &user::Model, password: &str) {
    send_best_effort(
        state.mailer.as_ref(),
        MailMessage {
            to: account.email.clone(),
            subject: "Your Account Details".to_string(),
            body: format!("Username: {}\nPassword: {}", account.username, password),
        },
    )
    .await;
}

fn require_school_admin(actor: &Actor, school_id: Uuid) -> Result<(), ApiError> {
    match actor {
        Actor::Admin { .. } => Ok(()),
        Actor::SubAdmin { school_id: own, .. } if *own == school_id => Ok(()),
        _ => Err(forbidden(Some("Not authorized for this school"))),
    }
}

/// Provision the sub-admin of a school
#[utoipa::path(
    post,
    path = "/api/v1/staff/sub-admins",
    security(("bearer_auth" = [])),
    request_body = CreateStaffRequestDto,
    responses(
        (status = 201, description = "Sub-admin provisioned", body = ApiResponse<StaffInfo>),
        (status = 403, description = "Administrator access required", body = ApiError),
        (status = 404, description = "School not found", body = ApiError),
        (status = 409, description = "School already has a sub-admin, or identity taken", body = ApiError)
    ),
    tag = "staff"
)]
pub async fn create_sub_admin(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Json(request): Json<CreateStaffRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<StaffInfo>>), ApiError> {
    // Only global administrators appoint a school's sub-admin.
    if !matches!(actor, Actor::Admin { .. }) {
        return Err(forbidden(Some("Administrator access required")));
    }

    let repo = StaffRepository::new(&state.db);
    let provisioned = repo
        .create_sub_admin(CreateStaffRequest {
            scope_id: request.scope_id,
            username: request.username,
            email: request.email,
            full_name: request.full_name,
            phone: request.phone,
        })
        .await?;

    mail_credentials(&state, &provisioned.account, &provisioned.password).await;

    let info = staff_info(
        provisioned.profile.id,
        provisioned.profile.school_id,
        &provisioned.account,
        provisioned.profile.full_name.clone(),
        provisioned.profile.phone.clone(),
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::new(info))))
}

/// Provision the supervisor of a house
#[utoipa::path(
    post,
    path = "/api/v1/staff/house-supervisors",
    security(("bearer_auth" = [])),
    request_body = CreateStaffRequestDto,
    responses(
        (status = 201, description = "Supervisor provisioned", body = ApiResponse<StaffInfo>),
        (status = 403, description = "Not authorized for this school", body = ApiError),
        (status = 404, description = "House not found", body = ApiError),
        (status = 409, description = "House already has a supervisor, or identity taken", body = ApiError)
    ),
    tag = "staff"
)]
pub async fn create_house_supervisor(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Json(request): Json<CreateStaffRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<StaffInfo>>), ApiError> {
    let houses = HouseRepository::new(&state.db);
    let house = houses
        .get_house_by_id(request.scope_id)
        .await?
        .ok_or_else(|| ApiError::from(RepositoryError::NotFound("House not found".to_string())))?;
    require_school_admin(&actor, house.school_id)?;

    let repo = StaffRepository::new(&state.db);
    let provisioned = repo
        .create_house_supervisor(CreateStaffRequest {
            scope_id: request.scope_id,
            username: request.username,
            email: request.email,
            full_name: request.full_name,
            phone: request.phone,
        })
        .await?;

    mail_credentials(&state, &provisioned.account, &provisioned.password).await;

    let info = staff_info(
        provisioned.profile.id,
        provisioned.profile.house_id,
        &provisioned.account,
        provisioned.profile.full_name.clone(),
        provisioned.profile.phone.clone(),
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::new(info))))
}

/// Provision a security officer for a school
#[utoipa::path(
    post,
    path = "/api/v1/staff/security",
    security(("bearer_auth" = [])),
    request_body = CreateStaffRequestDto,
    responses(
        (status = 201, description = "Security officer provisioned", body = ApiResponse<StaffInfo>),
        (status = 403, description = "Not authorized for this school", body = ApiError),
        (status = 404, description = "School not found", body = ApiError),
        (status = 409, description = "Identity already taken", body = ApiError)
    ),
    tag = "staff"
)]
pub async fn create_security_person(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Json(request): Json<CreateStaffRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<StaffInfo>>), ApiError> {
    require_school_admin(&actor, request.scope_id)?;

    let repo = StaffRepository::new(&state.db);
    let provisioned = repo
        .create_security_person(CreateStaffRequest {
            scope_id: request.scope_id,
            username: request.username,
            email: request.email,
            full_name: request.full_name,
            phone: request.phone,
        })
        .await?;

    mail_credentials(&state, &provisioned.account, &provisioned.password).await;

    let info = staff_info(
        provisioned.profile.id,
        provisioned.profile.school_id,
        &provisioned.account,
        provisioned.profile.full_name.clone(),
        provisioned.profile.phone.clone(),
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::new(info))))
}
