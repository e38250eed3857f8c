use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::vehicle;
use crate::handlers::common::PaginationParams;
use crate::handlers::AppState;
use crate::services::vehicles::{CreateVehicleRequest, UpdateVehicleRequest};
use crate::{ApiResponse, ApiResult, PaginatedResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct VehicleListParams {
    pub customer_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles",
    params(PaginationParams, VehicleListParams),
    responses(
        (status = 200, description = "Vehicles listed", body = ApiResponse<PaginatedResponse<vehicle::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Vehicles"
)]
pub async fn list_vehicles(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<VehicleListParams>,
) -> ApiResult<PaginatedResponse<vehicle::Model>> {
    let (page, per_page) = params.clamped();
    let (vehicles, total) = state
        .services
        .vehicles
        .list_vehicles(page, per_page, filter.customer_id, params.search)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        vehicles, total, page, per_page,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/vehicles/{id}",
    responses(
        (status = 200, description = "Vehicle found", body = ApiResponse<vehicle::Model>),
        (status = 404, description = "Vehicle not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Vehicles"
)]
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<vehicle::Model> {
    let vehicle = state.services.vehicles.get_vehicle(id).await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

#[utoipa::path(
    post,
    path = "/api/v1/vehicles",
    request_body = CreateVehicleRequest,
    responses(
        (status = 201, description = "Vehicle created", body = ApiResponse<vehicle::Model>),
        (status = 409, description = "Duplicate plate number", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Vehicles"
)]
pub async fn create_vehicle(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<vehicle::Model>>), crate::errors::ServiceError> {
    let vehicle = state
        .services
        .vehicles
        .create_vehicle(request, Some(user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(vehicle))))
}

#[utoipa::path(
    put,
    path = "/api/v1/vehicles/{id}",
    request_body = UpdateVehicleRequest,
    responses(
        (status = 200, description = "Vehicle updated", body = ApiResponse<vehicle::Model>),
        (status = 404, description = "Vehicle not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Vehicles"
)]
pub async fn update_vehicle(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateVehicleRequest>,
) -> ApiResult<vehicle::Model> {
    let vehicle = state
        .services
        .vehicles
        .update_vehicle(id, request, Some(user.id))
        .await?;
    Ok(Json(ApiResponse::success(vehicle)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/vehicles/{id}",
    responses(
        (status = 200, description = "Vehicle deleted", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Vehicle has job history", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Vehicles"
)]
pub async fn delete_vehicle(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state
        .services
        .vehicles
        .delete_vehicle(id, Some(user.id))
        .await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": id }),
    )))
}

pub fn vehicles_routes() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(list_vehicles))
        .route("/vehicles", post(create_vehicle))
        .route("/vehicles/:id", get(get_vehicle))
        .route("/vehicles/:id", put(update_vehicle))
        .route("/vehicles/:id", delete(delete_vehicle))
}
