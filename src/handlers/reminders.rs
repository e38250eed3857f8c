use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::service_reminder;
use crate::errors::ServiceError;
use crate::handlers::common::PaginationParams;
use crate::handlers::AppState;
use crate::services::reminders::{CreateReminderRequest, UpdateReminderRequest};
use crate::{ApiResponse, ApiResult, PaginatedResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ReminderListParams {
    pub vehicle_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/api/v1/service-reminders",
    params(PaginationParams, ReminderListParams),
    responses(
        (status = 200, description = "Reminders listed", body = ApiResponse<PaginatedResponse<service_reminder::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Service reminders"
)]
pub async fn list_reminders(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<ReminderListParams>,
) -> ApiResult<PaginatedResponse<service_reminder::Model>> {
    let (page, per_page) = params.clamped();
    let (reminders, total) = state
        .services
        .reminders
        .list_reminders(page, per_page, filter.vehicle_id)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        reminders, total, page, per_page,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/service-reminders/due",
    responses(
        (status = 200, description = "Unsent reminders past their due date", body = ApiResponse<Vec<service_reminder::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Service reminders"
)]
pub async fn due_reminders(
    State(state): State<AppState>,
) -> ApiResult<Vec<service_reminder::Model>> {
    let due = state
        .services
        .reminders
        .due_reminders(Utc::now().date_naive())
        .await?;
    Ok(Json(ApiResponse::success(due)))
}

#[utoipa::path(
    post,
    path = "/api/v1/service-reminders",
    request_body = CreateReminderRequest,
    responses(
        (status = 201, description = "Reminder created", body = ApiResponse<service_reminder::Model>),
        (status = 404, description = "Vehicle not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Service reminders"
)]
pub async fn create_reminder(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateReminderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<service_reminder::Model>>), ServiceError> {
    let reminder = state
        .services
        .reminders
        .create_reminder(request, Some(user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(reminder))))
}

#[utoipa::path(
    put,
    path = "/api/v1/service-reminders/{id}",
    request_body = UpdateReminderRequest,
    responses(
        (status = 200, description = "Reminder updated", body = ApiResponse<service_reminder::Model>),
        (status = 404, description = "Reminder not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Service reminders"
)]
pub async fn update_reminder(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateReminderRequest>,
) -> ApiResult<service_reminder::Model> {
    let reminder = state
        .services
        .reminders
        .update_reminder(id, request, Some(user.id))
        .await?;
    Ok(Json(ApiResponse::success(reminder)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/service-reminders/{id}",
    responses(
        (status = 200, description = "Reminder deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Reminder not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Service reminders"
)]
pub async fn delete_reminder(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state
        .services
        .reminders
        .delete_reminder(id, Some(user.id))
        .await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": id }),
    )))
}

pub fn reminders_routes() -> Router<AppState> {
    Router::new()
        .route("/service-reminders", get(list_reminders))
        .route("/service-reminders", post(create_reminder))
        .route("/service-reminders/due", get(due_reminders))
        .route("/service-reminders/:id", put(update_reminder))
        .route("/service-reminders/:id", delete(delete_reminder))
}
