//! # API Handlers
//!
//! This module contains all the HTTP endpoint handlers for the Exeat API.

use crate::models::ServiceInfo;
use axum::response::Json;

pub mod dashboard;
pub mod exeats;
pub mod houses;
pub mod identity;
pub mod schools;
pub mod staff;
pub mod students;
pub mod types;

/// Root handler that returns basic service information
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Service information", body = ServiceInfo)
    ),
    tag = "root"
)]
pub async fn root() -> Json<ServiceInfo> {
    Json(ServiceInfo::default())
}

/// Liveness probe backed by a trivial database query
#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service healthy"),
        (status = 503, description = "Database unavailable")
    ),
    tag = "root"
)]
pub async fn healthz(
    axum::extract::State(state): axum::extract::State<crate::server::AppState>,
) -> Result<&'static str, crate::error::ApiError> {
    crate::db::health_check(&state.db).await.map_err(|err| {
        tracing::warn!(error = %err, "Health check failed");
        crate::error::ApiError::new(
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Database unavailable",
        )
    })?;
    Ok("ok")
}
