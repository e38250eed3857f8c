//! Auto repair shop management backend.
//!
//! Customers, vehicles, work orders with derived costing, inventory with
//! an append-only stock ledger, invoicing with payment reconciliation,
//! and audit logging, exposed as a REST API over sea-orm.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

pub mod auth;
pub mod config;
pub mod db;
pub mod entities;
pub mod errors;
pub mod handlers;
pub mod migrator;
pub mod money;
pub mod openapi;
pub mod services;

use std::sync::Arc;

use axum::{extract::State, response::Json, routing::get, Router};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::ToSchema;

use crate::auth::{AuthRouterExt, AuthService};
use crate::entities::user::UserRole;

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub auth: Arc<AuthService>,
    pub services: services::AppServices,
}

impl AppState {
    pub fn new(db: Arc<DatabaseConnection>, config: config::AppConfig) -> Self {
        let auth = Arc::new(AuthService::new(&config));
        let services = services::AppServices::new(db.clone());
        Self {
            db,
            config,
            auth,
            services,
        }
    }
}

/// Standard success envelope.
#[derive(Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PaginatedResponse<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub per_page: u64,
    pub total_pages: u64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(items: Vec<T>, total: u64, page: u64, per_page: u64) -> Self {
        let total_pages = if per_page == 0 {
            0
        } else {
            total.div_ceil(per_page)
        };
        Self {
            items,
            total,
            page,
            per_page,
            total_pages,
        }
    }
}

/// Standard API result type for JSON responses.
pub type ApiResult<T> = Result<Json<ApiResponse<T>>, errors::ServiceError>;

/// All `/api/v1` routes with authentication and role gating applied.
///
/// Day-to-day workshop operations are open to any authenticated account;
/// settings and account management require `admin` or above (finer
/// distinctions inside user management are enforced by the service).
pub fn api_v1_routes() -> Router<AppState> {
    let staff_routes = Router::new()
        .merge(handlers::customers::customers_routes())
        .merge(handlers::vehicles::vehicles_routes())
        .merge(handlers::jobs::jobs_routes())
        .merge(handlers::inventory::inventory_routes())
        .merge(handlers::invoices::invoices_routes())
        .merge(handlers::expenses::expenses_routes())
        .merge(handlers::reminders::reminders_routes())
        .merge(handlers::reports::reports_routes())
        .with_min_role(UserRole::Staff);

    let admin_routes = Router::new()
        .merge(handlers::settings::settings_routes())
        .merge(handlers::users::users_routes())
        .with_min_role(UserRole::Admin);

    Router::new()
        .route("/status", get(api_status))
        .route("/health", get(health_check))
        .merge(handlers::auth::auth_routes())
        .merge(staff_routes)
        .merge(admin_routes)
}

/// Build the complete application router around the given state.
pub fn build_router(state: AppState) -> Router {
    let auth_service = state.auth.clone();

    Router::new()
        .nest("/api/v1", api_v1_routes())
        .merge(openapi::swagger_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(TimeoutLayer::new(std::time::Duration::from_secs(30)))
        .layer(axum::Extension(auth_service))
        .with_state(state)
}

async fn api_status() -> ApiResult<Value> {
    let status_data = json!({
        "status": "ok",
        "service": "autoshop-api",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    Ok(Json(ApiResponse::success(status_data)))
}

async fn health_check(State(state): State<AppState>) -> ApiResult<Value> {
    let db_status = match state.db.ping().await {
        Ok(_) => "healthy",
        Err(_) => "unhealthy",
    };

    let health_data = json!({
        "status": db_status,
        "checks": { "database": db_status },
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    Ok(Json(ApiResponse::success(health_data)))
}

#[cfg(test)]
mod response_tests {
    use super::*;

    #[test]
    fn pagination_math() {
        let response = PaginatedResponse::new(vec![1, 2, 3], 45, 2, 20);
        assert_eq!(response.total_pages, 3);
        assert_eq!(response.page, 2);

        let response = PaginatedResponse::<i32>::new(vec![], 0, 1, 20);
        assert_eq!(response.total_pages, 0);
    }

    #[test]
    fn success_envelope() {
        let response = ApiResponse::success(7);
        assert!(response.success);
        assert_eq!(response.data, Some(7));
        assert!(response.message.is_none());
    }
}
