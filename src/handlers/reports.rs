use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::entities::invoice;
use crate::handlers::AppState;
use crate::services::reports::{DashboardSummary, RevenueReport};
use crate::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize, IntoParams)]
pub struct RevenueParams {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/dashboard",
    responses(
        (status = 200, description = "Shop-wide summary", body = ApiResponse<DashboardSummary>)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn dashboard(State(state): State<AppState>) -> ApiResult<DashboardSummary> {
    let summary = state.services.reports.dashboard().await?;
    Ok(Json(ApiResponse::success(summary)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/revenue",
    params(RevenueParams),
    responses(
        (status = 200, description = "Collected revenue vs expenses", body = ApiResponse<RevenueReport>)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn revenue(
    State(state): State<AppState>,
    Query(params): Query<RevenueParams>,
) -> ApiResult<RevenueReport> {
    let report = state
        .services
        .reports
        .revenue(params.from, params.to)
        .await?;
    Ok(Json(ApiResponse::success(report)))
}

#[utoipa::path(
    get,
    path = "/api/v1/reports/outstanding",
    responses(
        (status = 200, description = "Invoices still carrying a balance", body = ApiResponse<Vec<invoice::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Reports"
)]
pub async fn outstanding(State(state): State<AppState>) -> ApiResult<Vec<invoice::Model>> {
    let invoices = state.services.reports.outstanding_invoices().await?;
    Ok(Json(ApiResponse::success(invoices)))
}

pub fn reports_routes() -> Router<AppState> {
    Router::new()
        .route("/reports/dashboard", get(dashboard))
        .route("/reports/revenue", get(revenue))
        .route("/reports/outstanding", get(outstanding))
}
