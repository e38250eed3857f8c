use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::inventory_item;
use crate::entities::stock_movement;
use crate::errors::ServiceError;
use crate::handlers::common::PaginationParams;
use crate::handlers::AppState;
use crate::services::inventory::{
    AdjustStockRequest, CreateInventoryItemRequest, UpdateInventoryItemRequest,
};
use crate::{ApiResponse, ApiResult, PaginatedResponse};

#[utoipa::path(
    get,
    path = "/api/v1/inventory",
    params(PaginationParams),
    responses(
        (status = 200, description = "Inventory listed", body = ApiResponse<PaginatedResponse<inventory_item::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<inventory_item::Model>> {
    let (page, per_page) = params.clamped();
    let (items, total) = state
        .services
        .inventory
        .list_items(page, per_page, params.search)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        items, total, page, per_page,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/low-stock",
    responses(
        (status = 200, description = "Items at or below their threshold", body = ApiResponse<Vec<inventory_item::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn low_stock(State(state): State<AppState>) -> ApiResult<Vec<inventory_item::Model>> {
    let items = state.services.inventory.low_stock().await?;
    Ok(Json(ApiResponse::success(items)))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/{id}",
    responses(
        (status = 200, description = "Item found", body = ApiResponse<inventory_item::Model>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn get_inventory_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<inventory_item::Model> {
    let item = state.services.inventory.get_item(id).await?;
    Ok(Json(ApiResponse::success(item)))
}

#[utoipa::path(
    get,
    path = "/api/v1/inventory/{id}/movements",
    params(PaginationParams),
    responses(
        (status = 200, description = "Movement ledger, newest first", body = ApiResponse<PaginatedResponse<stock_movement::Model>>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn list_movements(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<stock_movement::Model>> {
    let (page, per_page) = params.clamped();
    let (movements, total) = state
        .services
        .inventory
        .movements(id, page, per_page)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        movements, total, page, per_page,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory",
    request_body = CreateInventoryItemRequest,
    responses(
        (status = 201, description = "Item created", body = ApiResponse<inventory_item::Model>),
        (status = 409, description = "Duplicate SKU", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn create_inventory_item(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateInventoryItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<inventory_item::Model>>), ServiceError> {
    let item = state
        .services
        .inventory
        .create_item(request, Some(user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

#[utoipa::path(
    put,
    path = "/api/v1/inventory/{id}",
    request_body = UpdateInventoryItemRequest,
    responses(
        (status = 200, description = "Item updated", body = ApiResponse<inventory_item::Model>),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn update_inventory_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateInventoryItemRequest>,
) -> ApiResult<inventory_item::Model> {
    let item = state
        .services
        .inventory
        .update_item(id, request, Some(user.id))
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

#[utoipa::path(
    post,
    path = "/api/v1/inventory/{id}/adjust",
    request_body = AdjustStockRequest,
    responses(
        (status = 200, description = "Stock adjusted with a paired movement", body = ApiResponse<inventory_item::Model>),
        (status = 400, description = "Zero delta", body = crate::errors::ErrorResponse),
        (status = 404, description = "Item not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn adjust_stock(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<AdjustStockRequest>,
) -> ApiResult<inventory_item::Model> {
    let item = state
        .services
        .inventory
        .adjust(id, request.delta, request.notes, Some(user.id))
        .await?;
    Ok(Json(ApiResponse::success(item)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/inventory/{id}",
    responses(
        (status = 200, description = "Item deleted", body = ApiResponse<serde_json::Value>),
        (status = 400, description = "Item has movement history", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Inventory"
)]
pub async fn delete_inventory_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state
        .services
        .inventory
        .delete_item(id, Some(user.id))
        .await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": id }),
    )))
}

pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/inventory", get(list_inventory))
        .route("/inventory", post(create_inventory_item))
        .route("/inventory/low-stock", get(low_stock))
        .route("/inventory/:id", get(get_inventory_item))
        .route("/inventory/:id", put(update_inventory_item))
        .route("/inventory/:id", delete(delete_inventory_item))
        .route("/inventory/:id/adjust", post(adjust_stock))
        .route("/inventory/:id/movements", get(list_movements))
}
