//! # Authentication
//!
//! Operator bearer authentication plus acting-user resolution for protected
//! API endpoints. The excluded presentation layer authenticates the human
//! and forwards their identity in the `X-Acting-User` header; this
//! middleware validates the service token, resolves the identity into an
//! [`Actor`] exactly once and stashes it as a request extension.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::access::{self, Actor, ActorError};
use crate::config::AppConfig;
use crate::error::{ApiError, unauthorized, validation_error};
use crate::server::AppState;

/// Header naming the identity a request acts as
pub const ACTING_USER_HEADER: &str = "X-Acting-User";

/// Marker type for authenticated operator requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorAuth;

/// Extractor for the resolved actor from request extensions
#[derive(Debug, Clone)]
pub struct ActorExtension(pub Actor);

/// Authentication middleware that validates the bearer token and resolves
/// the acting user into an [`Actor`].
pub async fn auth_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let headers = request.headers().clone();

    let token = extract_bearer_token(&headers)?;
    validate_token(&state.config, token)?;

    let user_id = extract_acting_user(&headers)?;
    let actor = access::resolve_actor(&state.db, user_id)
        .await
        .map_err(|err| match err {
            ActorError::UnknownUser | ActorError::MissingProfile { .. } => {
                unauthorized(Some(&err.to_string()))
            }
            ActorError::Database(db_err) => db_err.into(),
        })?;

    tracing::info!(
        user_id = %actor.user_id(),
        role = actor.role_name(),
        "Authenticated request"
    );

    let mut request = request;
    request.extensions_mut().insert(ActorExtension(actor));
    request.extensions_mut().insert(OperatorAuth);

    Ok(next.run(request).await)
}

fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, ApiError> {
    headers
        .get(AUTHORIZATION)
        .ok_or_else(|| unauthorized(Some("Missing Authorization header")))
        .and_then(|value| {
            value
                .to_str()
                .map_err(|_| unauthorized(Some("Invalid Authorization header")))
        })
        .and_then(|header| {
            header
                .strip_prefix("Bearer ")
                .ok_or_else(|| unauthorized(Some("Authorization header must use Bearer scheme")))
        })
}

fn validate_token(config: &AppConfig, token: &str) -> Result<(), ApiError> {
    let is_valid = config
        .operator_tokens
        .iter()
        .any(|configured| ConstantTimeEq::ct_eq(token.as_bytes(), configured.as_bytes()).into());

    if is_valid {
        Ok(())
    } else {
        Err(unauthorized(Some("Invalid bearer token")))
    }
}

fn extract_acting_user(headers: &HeaderMap) -> Result<Uuid, ApiError> {
    let header_value = headers
        .get(ACTING_USER_HEADER)
        .ok_or_else(|| {
            validation_error(
                "Missing required header",
                serde_json::json!({ ACTING_USER_HEADER: "Required header is missing" }),
            )
        })?
        .to_str()
        .map_err(|_| {
            validation_error(
                "Invalid acting user header",
                serde_json::json!({ ACTING_USER_HEADER: "Header must be valid UTF-8" }),
            )
        })?;

    header_value.parse::<Uuid>().map_err(|_| {
        validation_error(
            "Invalid acting user",
            serde_json::json!({ ACTING_USER_HEADER: "Must be a valid UUID" }),
        )
    })
}

impl<S> FromRequestParts<S> for ActorExtension
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<ActorExtension>()
            .cloned()
            .ok_or_else(|| unauthorized(Some("Acting user context missing")))
    }
}

impl<S> FromRequestParts<S> for OperatorAuth
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<OperatorAuth>()
            .copied()
            .ok_or_else(|| unauthorized(Some("Operator authentication required")))
    }
}
