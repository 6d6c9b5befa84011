//! # Dashboard API Handler
//!
//! Read-only exeat counts by status, scoped to the caller's visibility.

use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::access::visibility;
use crate::auth::{ActorExtension, OperatorAuth};
use crate::error::ApiError;
use crate::handlers::types::ApiResponse;
use crate::repositories::ExeatRepository;
use crate::server::AppState;

/// Exeat counts by status within the caller's scope
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardInfo {
    /// All exeats within scope
    pub total: u64,
    /// Awaiting an approval decision
    pub pending: u64,
    /// Cleared to leave
    pub approved: u64,
    /// Denied
    pub rejected: u64,
    /// Currently out
    pub signed_out: u64,
    /// Returned
    pub signed_in: u64,
}

/// Exeat counts by status
#[utoipa::path(
    get,
    path = "/api/v1/dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Counts within the caller's scope", body = ApiResponse<DashboardInfo>)
    ),
    tag = "dashboard"
)]
pub async fn get_dashboard(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
) -> Result<Json<ApiResponse<DashboardInfo>>, ApiError> {
    let repo = ExeatRepository::new(&state.db);
    let counts = repo.count_by_status(visibility(&actor)).await?;

    Ok(Json(ApiResponse::new(DashboardInfo {
        total: counts.total,
        pending: counts.pending,
        approved: counts.approved,
        rejected: counts.rejected,
        signed_out: counts.signed_out,
        signed_in: counts.signed_in,
    })))
}
