use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::entities::job::{self, JobStatus};
use crate::entities::job_item;
use crate::entities::job_part;
use crate::errors::ServiceError;
use crate::handlers::common::PaginationParams;
use crate::handlers::AppState;
use crate::services::jobs::{
    AddPartRequest, AddServiceItemRequest, CreateJobRequest, JobDetail, JobFilter,
    UpdateJobRequest,
};
use crate::{ApiResponse, ApiResult, PaginatedResponse};

#[derive(Debug, Deserialize, IntoParams)]
pub struct JobListParams {
    pub status: Option<JobStatus>,
    pub vehicle_id: Option<Uuid>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateJobStatusRequest {
    pub status: JobStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PartAddedResponse {
    pub part: job_part::Model,
    pub job: job::Model,
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    params(PaginationParams, JobListParams),
    responses(
        (status = 200, description = "Jobs listed", body = ApiResponse<PaginatedResponse<job::Model>>)
    ),
    security(("bearer_auth" = [])),
    tag = "Jobs"
)]
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
    Query(filter): Query<JobListParams>,
) -> ApiResult<PaginatedResponse<job::Model>> {
    let (page, per_page) = params.clamped();
    let (jobs, total) = state
        .services
        .jobs
        .list_jobs(
            page,
            per_page,
            JobFilter {
                status: filter.status,
                vehicle_id: filter.vehicle_id,
            },
        )
        .await?;
    Ok(Json(ApiResponse::success(PaginatedResponse::new(
        jobs, total, page, per_page,
    ))))
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}",
    responses(
        (status = 200, description = "Job with lines and parts", body = ApiResponse<JobDetail>),
        (status = 404, description = "Job not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Jobs"
)]
pub async fn get_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<JobDetail> {
    let detail = state.services.jobs.get_job_detail(id).await?;
    Ok(Json(ApiResponse::success(detail)))
}

#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    request_body = CreateJobRequest,
    responses(
        (status = 201, description = "Job created in pending", body = ApiResponse<job::Model>),
        (status = 404, description = "Vehicle not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Jobs"
)]
pub async fn create_job(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<CreateJobRequest>,
) -> Result<(StatusCode, Json<ApiResponse<job::Model>>), ServiceError> {
    let settings = state.services.settings.snapshot().await?;
    let job = state
        .services
        .jobs
        .create_job(request, &settings, Some(user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(job))))
}

#[utoipa::path(
    put,
    path = "/api/v1/jobs/{id}",
    request_body = UpdateJobRequest,
    responses(
        (status = 200, description = "Job updated, costs recomputed", body = ApiResponse<job::Model>),
        (status = 400, description = "Illegal status transition", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Jobs"
)]
pub async fn update_job(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateJobRequest>,
) -> ApiResult<job::Model> {
    let job = state
        .services
        .jobs
        .update_job(id, request, Some(user.id))
        .await?;
    Ok(Json(ApiResponse::success(job)))
}

#[utoipa::path(
    put,
    path = "/api/v1/jobs/{id}/status",
    request_body = UpdateJobStatusRequest,
    responses(
        (status = 200, description = "Status advanced", body = ApiResponse<job::Model>),
        (status = 400, description = "Illegal status transition", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Jobs"
)]
pub async fn update_job_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateJobStatusRequest>,
) -> ApiResult<job::Model> {
    let job = state
        .services
        .jobs
        .update_job(
            id,
            UpdateJobRequest {
                status: Some(request.status),
                ..Default::default()
            },
            Some(user.id),
        )
        .await?;
    Ok(Json(ApiResponse::success(job)))
}

#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/items",
    request_body = AddServiceItemRequest,
    responses(
        (status = 201, description = "Service line added", body = ApiResponse<job_item::Model>),
        (status = 404, description = "Job not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Jobs"
)]
pub async fn add_service_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<AddServiceItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<job_item::Model>>), ServiceError> {
    let item = state
        .services
        .jobs
        .add_service_item(id, request, Some(user.id))
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::success(item))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{id}/items/{item_id}",
    responses(
        (status = 200, description = "Service line removed", body = ApiResponse<serde_json::Value>),
        (status = 404, description = "Job or item not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Jobs"
)]
pub async fn remove_service_item(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<serde_json::Value> {
    state
        .services
        .jobs
        .remove_service_item(id, item_id, Some(user.id))
        .await?;
    Ok(Json(ApiResponse::success(
        serde_json::json!({ "deleted": item_id }),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/parts",
    request_body = AddPartRequest,
    responses(
        (status = 201, description = "Part attached, stock debited, costs recomputed", body = ApiResponse<PartAddedResponse>),
        (status = 404, description = "Job or inventory item not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Jobs"
)]
pub async fn add_part(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(request): Json<AddPartRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PartAddedResponse>>), ServiceError> {
    let (part, job) = state
        .services
        .jobs
        .add_part(id, request, Some(user.id))
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(PartAddedResponse { part, job })),
    ))
}

#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{id}/parts/{part_id}",
    responses(
        (status = 200, description = "Part detached, stock returned, costs recomputed", body = ApiResponse<job::Model>),
        (status = 404, description = "Job or part not found", body = crate::errors::ErrorResponse)
    ),
    security(("bearer_auth" = [])),
    tag = "Jobs"
)]
pub async fn remove_part(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, part_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<job::Model> {
    let job = state
        .services
        .jobs
        .remove_part(id, part_id, Some(user.id))
        .await?;
    Ok(Json(ApiResponse::success(job)))
}

pub fn jobs_routes() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(list_jobs))
        .route("/jobs", post(create_job))
        .route("/jobs/:id", get(get_job))
        .route("/jobs/:id", put(update_job))
        .route("/jobs/:id/status", put(update_job_status))
        .route("/jobs/:id/items", post(add_service_item))
        .route("/jobs/:id/items/:item_id", delete(remove_service_item))
        .route("/jobs/:id/parts", post(add_part))
        .route("/jobs/:id/parts/:part_id", delete(remove_part))
}
