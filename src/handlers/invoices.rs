use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use utoipa::IntoParams;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::invoice::{self, InvoiceStatus};
use crate::entities::payment;
use crate::errors::ServiceError;
use crate::handlers::common::PaginationParams;
use crate::handlers::AppState;
use crate::services::invoicing::{
    ApplyPaymentRequest, CreateAdHocInvoiceRequest, CreateInvoiceFromJobRequest, InvoiceFilter,
    PaymentOutcome,
};
use crate::{ApiResponse, ApiResult, PaginatedResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct InvoiceListParams {
    pub status: Option<InvoiceStatus>,
    pub customer_id: Option<Uuid>,
}

#[utoipa::path(
    get,
    path = "/api/v1/invoices",
    params(PaginationParams, InvoiceListParams),
    responses(
        (status = 200, description = "Invoices listed", body = ApiResponse<PaginatedResponse<invoice::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn list_invoices(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<InvoiceListParams>,
) -> ApiResult<PaginatedResponse<invoice::Model>> {
    let (page, per_page) = params.clamped();
    let (invoices, total) = state
        .services
        .invoicing
        .list_invoices(
            page,
            per_page,
            InvoiceFilter {
                status: filter.status,
                customer_id: filter.customer_id,
            },
        )
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        invoices, total, page, per_page,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/invoices/{id}",
    responses(
        (status = 200, description = "Invoice found", body = ApiResponse<invoice::Model>),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn get_invoice(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<invoice::Model> {
    let invoice = state.services.invoicing.get_invoice(id).await?;
    Ok(Json(ApiResponse::success(invoice)))
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices",
    request_body = CreateAdHocInvoiceRequest,
    responses(
        (status = 201, description = "Ad-hoc invoice created", body = ApiResponse<invoice::Model>),
        (status = 404, description = "Customer not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn create_ad_hoc_invoice(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateAdHocInvoiceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<invoice::Model>>), ServiceError> {
    let settings = state.services.settings.snapshot().await?;
    let invoice = state
        .services
        .invoicing
        .create_ad_hoc(request, &settings, Some(user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(invoice))))
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices/from-job/{job_id}",
    request_body = CreateInvoiceFromJobRequest,
    responses(
        (status = 201, description = "Invoice created, job marked invoiced", body = ApiResponse<invoice::Model>),
        (status = 404, description = "Job not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn create_invoice_from_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(job_id): Path<Uuid>,
    Json(request): Json<CreateInvoiceFromJobRequest>,
) -> Result<(StatusCode, Json<ApiResponse<invoice::Model>>), ServiceError> {
    let settings = state.services.settings.snapshot().await?;
    let invoice = state
        .services
        .invoicing
        .create_from_job(job_id, request, &settings, Some(user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(invoice))))
}

#[utoipa::path(
    post,
    path = "/api/v1/invoices/{id}/payments",
    request_body = ApplyPaymentRequest,
    responses(
        (status = 201, description = "Payment applied, balance re-derived", body = ApiResponse<PaymentOutcome>),
        (status = 400, description = "Non-positive amount", body = crate::errors::ErrorResponse),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn apply_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<ApplyPaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentOutcome>>), ServiceError> {
    let outcome = state
        .services
        .invoicing
        .apply_payment(id, request, Some(user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(outcome))))
}

#[utoipa::path(
    get,
    path = "/api/v1/invoices/{id}/payments",
    responses(
        (status = 200, description = "Payments listed, oldest first", body = ApiResponse<Vec<payment::Model>>),
        (status = 404, description = "Invoice not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Invoices"
)]
pub async fn list_payments(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Vec<payment::Model>> {
    let payments = state.services.invoicing.payments(id).await?;
    Ok(Json(ApiResponse::success(payments)))
}

pub fn invoices_routes() -> Router<AppState> {
    Router::new()
        .route("/invoices", get(list_invoices))
        .route("/invoices", post(create_ad_hoc_invoice))
        .route("/invoices/from-job/:job_id", post(create_invoice_from_job))
        .route("/invoices/:id", get(get_invoice))
        .route("/invoices/:id/payments", post(apply_payment))
        .route("/invoices/:id/payments", get(list_payments))
}
