use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::user;
use crate::errors::ServiceError;
use crate::handlers::common::PaginationParams;
use crate::handlers::AppState;
use crate::services::users::{CreateUserRequest, UpdateUserRequest};
use crate::{ApiResponse, ApiResult, PaginatedResponse};

#[utoipa::path(
    get,
    path = "/api/v1/users",
    params(PaginationParams),
    responses(
        (status = 200, description = "Accounts listed", body = ApiResponse<PaginatedResponse<user::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> ApiResult<PaginatedResponse<user::Model>> {
    let (page, per_page) = params.clamped();
    let (users, total) = state.services.users.list_users(page, per_page).await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        users, total, page, per_page,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    responses(
        (status = 200, description = "Account found", body = ApiResponse<user::Model>),
        (status = 404, description = "Account not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<user::Model> {
    let account = state.services.users.get_user(id).await?;
    Ok(Json(ApiResponse::success(account)))
}

#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Account created", body = ApiResponse<user::Model>),
        (status = 403, description = "Role hierarchy forbids this creation", body = crate::errors::ErrorResponse),
        (status = 409, description = "Email already registered", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn create_user(
    State(state): State<AppState>,
    acting: AuthUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<ApiResponse<user::Model>>), ServiceError> {
    let account = state
        .services
        .users
        .create_user(request, acting.role, Some(acting.id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(account))))
}

#[utoipa::path(
    put,
    path = "/api/v1/users/{id}",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Account updated", body = ApiResponse<user::Model>),
        (status = 403, description = "Role hierarchy forbids this change", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Users"
)]
pub async fn update_user(
    State(state): State<AppState>,
    acting: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateUserRequest>,
) -> ApiResult<user::Model> {
    let account = state
        .services
        .users
        .update_user(id, request, acting.role, Some(acting.id))
        .await?;
    Ok(Json(ApiResponse::success(account)))
}

pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
        .route("/users/:id", put(update_user))
}
