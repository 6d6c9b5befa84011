//! # Identity API Handlers
//!
//! Login and the password-reset passcode flow. These endpoints sit outside
//! the acting-user middleware: the presentation layer calls them before it
//! has an identity to forward. Session and token issuance stay external;
//! login returns the identity summary only.

use axum::{extract::State, response::Json};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{ApiError, RepositoryError, unauthorized};
use crate::handlers::types::ApiResponse;
use crate::mail::{MailMessage, send_best_effort};
use crate::models::user::{self, UserRole};
use crate::repositories::IdentityRepository;
use crate::server::AppState;

/// Request payload for login
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LoginRequestDto {
    /// Login name
    pub username: String,
    /// Cleartext password
    pub password: String,
}

/// Identity summary returned on successful authentication
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IdentityInfo {
    /// Unique identifier for the identity
    pub id: String,
    /// Login name
    pub username: String,
    /// E-mail address
    pub email: String,
    /// Role tag
    pub role: UserRole,
    /// Owning school, if any
    pub school_id: Option<String>,
}

impl From<user::Model> for IdentityInfo {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id.to_string(),
            username: model.username,
            email: model.email,
            role: model.role,
            school_id: model.school_id.map(|id| id.to_string()),
        }
    }
}

/// Request payload for starting a password reset
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PasswordResetRequestDto {
    /// Login name to issue a passcode for
    pub username: String,
}

/// Request payload for completing a password reset
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PasswordResetConfirmDto {
    /// Login name
    pub username: String,
    /// The passcode received by mail
    pub passcode: String,
    /// New cleartext password
    pub new_password: String,
}

/// Authenticate by username and password
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    request_body = LoginRequestDto,
    responses(
        (status = 200, description = "Authenticated", body = ApiResponse<IdentityInfo>),
        (status = 401, description = "Unknown username or wrong password", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequestDto>,
) -> Result<Json<ApiResponse<IdentityInfo>>, ApiError> {
    let repo = IdentityRepository::new(&state.db);

    let account = repo
        .authenticate(&request.username, &request.password)
        .await?
        .ok_or_else(|| unauthorized(Some("Invalid username or password")))?;

    Ok(Json(ApiResponse::new(IdentityInfo::from(account))))
}

/// Issue a password-reset passcode
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset/request",
    request_body = PasswordResetRequestDto,
    responses(
        (status = 200, description = "Passcode issued if the username exists")
    ),
    tag = "auth"
)]
pub async fn password_reset_request(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetRequestDto>,
) -> Result<Json<ApiResponse<&'static str>>, ApiError> {
    let repo = IdentityRepository::new(&state.db);

    // The response is the same whether or not the username exists, so the
    // endpoint cannot be used to probe for accounts.
    match repo.issue_passcode(&request.username).await {
        Ok((account, code)) => {
            send_best_effort(
                state.mailer.as_ref(),
                MailMessage {
                    to: account.email.clone(),
                    subject: "Your password reset code".to_string(),
                    body: format!(
                        "Your one-time passcode is {}. It expires in {} minutes.",
                        code,
                        state.config.otp_ttl_seconds / 60
                    ),
                },
            )
            .await;
        }
        Err(RepositoryError::NotFound(_)) => {
            tracing::info!(username = %request.username, "Passcode requested for unknown username");
        }
        Err(err) => return Err(err.into()),
    }

    Ok(Json(ApiResponse::new("ok")))
}

/// Complete a password reset with a passcode
#[utoipa::path(
    post,
    path = "/api/v1/auth/password-reset/confirm",
    request_body = PasswordResetConfirmDto,
    responses(
        (status = 200, description = "Password updated", body = ApiResponse<IdentityInfo>),
        (status = 400, description = "Passcode invalid or expired", body = ApiError),
        (status = 404, description = "Unknown username", body = ApiError)
    ),
    tag = "auth"
)]
pub async fn password_reset_confirm(
    State(state): State<AppState>,
    Json(request): Json<PasswordResetConfirmDto>,
) -> Result<Json<ApiResponse<IdentityInfo>>, ApiError> {
    let repo = IdentityRepository::new(&state.db);

    let account = repo
        .reset_password(
            &request.username,
            &request.passcode,
            &request.new_password,
            Duration::seconds(state.config.otp_ttl_seconds as i64),
        )
        .await?;

    Ok(Json(ApiResponse::new(IdentityInfo::from(account))))
}
