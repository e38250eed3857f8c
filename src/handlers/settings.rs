use std::collections::HashMap;

use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};

use crate::auth::AuthUser;
use crate::handlers::AppState;
use crate::{ApiResponse, ApiResult};

#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses(
        (status = 200, description = "Persisted shop settings", body = ApiResponse<HashMap<String, String>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<HashMap<String, String>> {
    let settings = state.services.settings.get_all().await?;
    Ok(Json(ApiResponse::success(settings)))
}

#[utoipa::path(
    put,
    path = "/api/v1/settings",
    request_body = HashMap<String, String>,
    responses(
        (status = 200, description = "Settings updated", body = ApiResponse<HashMap<String, String>>),
        (status = 400, description = "Unknown key or malformed value", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Settings"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    user: AuthUser,
    Json(values): Json<HashMap<String, String>>,
) -> ApiResult<HashMap<String, String>> {
    state
        .services
        .settings
        .update(values, Some(user.id))
        .await?;
    let settings = state.services.settings.get_all().await?;
    Ok(Json(ApiResponse::success(settings)))
}

pub fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/settings", get(get_settings))
        .route("/settings", put(update_settings))
}
