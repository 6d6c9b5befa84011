//! # Houses API Handlers

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::access::Actor;
use crate::auth::{ActorExtension, OperatorAuth};
use crate::error::{ApiError, forbidden};
use crate::handlers::types::ApiResponse;
use crate::models::house;
use crate::repositories::HouseRepository;
use crate::repositories::house::CreateHouseRequest;
use crate::server::AppState;

/// Request payload for creating a new house
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateHouseRequestDto {
    /// Owning school; inferred for sub-admins, required for administrators
    pub school_id: Option<Uuid>,
    /// House name, unique within the school
    #[schema(example = "Red")]
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
}

/// House information response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HouseInfo {
    /// Unique identifier for the house
    pub id: String,
    /// Owning school
    pub school_id: String,
    /// House name
    pub name: String,
    /// Free-text description
    pub description: Option<String>,
    /// Timestamp when the house was created (ISO 8601)
    pub created_at: String,
}

impl From<house::Model> for HouseInfo {
    fn from(model: house::Model) -> Self {
        Self {
            id: model.id.to_string(),
            school_id: model.school_id.to_string(),
            name: model.name,
            description: model.description,
            created_at: model.created_at.to_rfc3339(),
        }
    }
}

/// Query parameters for listing houses
#[derive(Debug, Deserialize)]
pub struct ListHousesQuery {
    /// Narrow the listing to one school (administrators only)
    pub school_id: Option<Uuid>,
}

/// Create a new house
#[utoipa::path(
    post,
    path = "/api/v1/houses",
    security(("bearer_auth" = [])),
    request_body = CreateHouseRequestDto,
    responses(
        (status = 201, description = "House created", body = ApiResponse<HouseInfo>),
        (status = 400, description = "Validation failed", body = ApiError),
        (status = 403, description = "Not authorized", body = ApiError),
        (status = 409, description = "House name already taken in this school", body = ApiError)
    ),
    tag = "houses"
)]
pub async fn create_house(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Json(request): Json<CreateHouseRequestDto>,
) -> Result<(StatusCode, Json<ApiResponse<HouseInfo>>), ApiError> {
    let school_id = match (&actor, request.school_id) {
        (Actor::Admin { .. }, Some(school_id)) => school_id,
        (Actor::Admin { .. }, None) => {
            return Err(crate::error::validation_error(
                "school_id is required",
                serde_json::json!({ "school_id": "Administrators must name the school" }),
            ));
        }
        (Actor::SubAdmin { school_id: own, .. }, requested) => {
            if requested.is_some_and(|requested| requested != *own) {
                return Err(forbidden(Some("Not authorized for this school")));
            }
            *own
        }
        _ => return Err(forbidden(Some("Not authorized to create houses"))),
    };

    let repo = HouseRepository::new(&state.db);
    let created = repo
        .create_house(CreateHouseRequest {
            school_id,
            name: request.name,
            description: request.description,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::new(HouseInfo::from(created))),
    ))
}

/// List houses within the caller's scope
#[utoipa::path(
    get,
    path = "/api/v1/houses",
    security(("bearer_auth" = [])),
    params(("school_id" = Option<Uuid>, Query, description = "Narrow to one school (administrators only)")),
    responses(
        (status = 200, description = "Houses within scope", body = ApiResponse<Vec<HouseInfo>>),
        (status = 403, description = "Not authorized", body = ApiError)
    ),
    tag = "houses"
)]
pub async fn list_houses(
    State(state): State<AppState>,
    _operator_auth: OperatorAuth,
    ActorExtension(actor): ActorExtension,
    Query(query): Query<ListHousesQuery>,
) -> Result<Json<ApiResponse<Vec<HouseInfo>>>, ApiError> {
    let repo = HouseRepository::new(&state.db);

    let houses = match &actor {
        Actor::Admin { .. } => match query.school_id {
            Some(school_id) => repo.list_by_school(school_id).await?,
            None => repo.list_all().await?,
        },
        Actor::SubAdmin { school_id, .. } | Actor::Security { school_id, .. } => {
            repo.list_by_school(*school_id).await?
        }
        Actor::HouseSupervisor { house_id, .. } => repo
            .get_house_by_id(*house_id)
            .await?
            .into_iter()
            .collect(),
        Actor::Student { .. } => return Err(forbidden(Some("Not authorized to list houses"))),
    };

    Ok(Json(ApiResponse::new(
        houses.into_iter().map(HouseInfo::from).collect(),
    )))
}
