use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::expense;
use crate::errors::ServiceError;
use crate::handlers::common::PaginationParams;
use crate::handlers::AppState;
use crate::services::expenses::{CreateExpenseRequest, UpdateExpenseRequest};
use crate::{ApiResponse, ApiResult, PaginatedResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ExpenseListParams {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[utoipa::path(
    get,
    path = "/api/v1/expenses",
    params(PaginationParams, ExpenseListParams),
    responses(
        (status = 200, description = "Expenses listed", body = ApiResponse<PaginatedResponse<expense::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Expenses"
)]
pub async fn list_expenses(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(range): Query<ExpenseListParams>,
) -> ApiResult<PaginatedResponse<expense::Model>> {
    let (page, per_page) = params.clamped();
    let (expenses, total) = state
        .services
        .expenses
        .list_expenses(page, per_page, range.from, range.to)
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        expenses, total, page, per_page,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/expenses/{id}",
    responses(
        (status = 200, description = "Expense found", body = ApiResponse<expense::Model>),
        (status = 404, description = "Expense not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Expenses"
)]
pub async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<expense::Model> {
    let expense = state.services.expenses.get_expense(id).await?;
    Ok(Json(ApiResponse::success(expense)))
}

#[utoipa::path(
    post,
    path = "/api/v1/expenses",
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Expense recorded", body = ApiResponse<expense::Model>)
    ),
    security(("bearer_auth" = [])),
    tag = "Expenses"
)]
pub async fn create_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateExpenseRequest>,
) -> Result<(StatusCode, Json<ApiResponse<expense::Model>>), ServiceError> {
    let expense = state
        .services
        .expenses
        .create_expense(request, Some(user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(expense))))
}

#[utoipa::path(
    put,
    path = "/api/v1/expenses/{id}",
    request_body = UpdateExpenseRequest,
    responses(
        (status = 200, description = "Expense updated", body = ApiResponse<expense::Model>),
        (status = 404, description = "Expense not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Expenses"
)]
pub async fn update_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateExpenseRequest>,
) -> ApiResult<expense::Model> {
    let expense = state
        .services
        .expenses
        .update_expense(id, request, Some(user.id))
        .await?;
    Ok(Json(ApiResponse::success(expense)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/expenses/{id}",
    responses(
        (status = 200, description = "Expense deleted", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Expense not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Expenses"
)]
pub async fn delete_expense(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> ApiResult<serde_json::Value> {
    state
        .services
        .expenses
        .delete_expense(id, Some(user.id))
        .await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": id }),
    )))
}

pub fn expenses_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses))
        .route("/expenses", post(create_expense))
        .route("/expenses/:id", get(get_expense))
        .route("/expenses/:id", put(update_expense))
        .route("/expenses/:id", delete(delete_expense))
}
