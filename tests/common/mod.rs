#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use autoshop_api::{
    build_router,
    config::AppConfig,
    db,
    entities::user::{self, UserRole},
    services::settings::ShopSettings,
    services::users::hash_password,
    AppState,
};

/// Test harness: application state backed by an in-memory SQLite
/// database with the full schema migrated and one account per role
/// seeded.
pub struct TestApp {
    pub state: AppState,
    router: Router,
    pub super_admin: user::Model,
    pub admin: user::Model,
    pub staff: user::Model,
}

impl TestApp {
    pub async fn new() -> Self {
        let mut config = AppConfig::new(
            "sqlite::memory:",
            "integration_test_secret_key_0123456789abcdef",
        );
        // A single connection keeps every query on the same in-memory
        // database.
        config.db_max_connections = 1;
        config.db_min_connections = 1;

        let pool = db::establish_connection(&config)
            .await
            .expect("failed to open test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations");

        let state = AppState::new(Arc::new(pool), config);
        let router = build_router(state.clone());

        let super_admin = seed_user(&state, "Root", "root@shop.test", UserRole::SuperAdmin).await;
        let admin = seed_user(&state, "Office", "office@shop.test", UserRole::Admin).await;
        let staff = seed_user(&state, "Mechanic", "mechanic@shop.test", UserRole::Staff).await;

        Self {
            state,
            router,
            super_admin,
            admin,
            staff,
        }
    }

    /// Settings snapshot with a 10% tax rate and the default prefixes,
    /// used where tests need deterministic billing arithmetic.
    pub fn billing_settings(&self) -> ShopSettings {
        ShopSettings {
            tax_rate: Decimal::from(10),
            ..ShopSettings::default()
        }
    }

    pub fn token_for(&self, account: &user::Model) -> String {
        self.state
            .auth
            .issue_token(account)
            .expect("token issuance failed")
            .access_token
    }

    /// Send a JSON request with the given bearer token and return the
    /// status plus parsed body.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = builder
            .body(match body {
                Some(value) => Body::from(value.to_string()),
                None => Body::empty(),
            })
            .expect("failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body was not JSON")
        };
        (status, value)
    }
}

async fn seed_user(state: &AppState, name: &str, email: &str, role: UserRole) -> user::Model {
    let now = Utc::now();
    user::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
        password_hash: Set(hash_password("shop-password-1").expect("hashing failed")),
        role: Set(role),
        active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(&*state.db)
    .await
    .expect("failed to seed user")
}

/// Create a customer and a vehicle, returning the vehicle id most tests
/// hang jobs from.
pub async fn seed_vehicle(app: &TestApp) -> (Uuid, Uuid) {
    let customer = app
        .state
        .services
        .customers
        .create_customer(
            autoshop_api::services::customers::CreateCustomerRequest {
                name: "Ada Motors".to_string(),
                email: None,
                phone: Some("0700-000000".to_string()),
                address: None,
                notes: None,
            },
            None,
        )
        .await
        .expect("failed to seed customer");

    let vehicle = app
        .state
        .services
        .vehicles
        .create_vehicle(
            autoshop_api::services::vehicles::CreateVehicleRequest {
                customer_id: customer.id,
                plate_number: format!("KDA-{}", &Uuid::new_v4().simple().to_string()[..6]),
                make: "Toyota".to_string(),
                model: "Hilux".to_string(),
                year: Some(2019),
                vin: None,
                color: Some("white".to_string()),
                odometer: Some(88_000),
                notes: None,
            },
            None,
        )
        .await
        .expect("failed to seed vehicle");

    (customer.id, vehicle.id)
}

/// Create an inventory item with the given starting stock.
pub async fn seed_inventory(app: &TestApp, name: &str, quantity: i32, sell_price: Decimal) -> Uuid {
    app.state
        .services
        .inventory
        .create_item(
            autoshop_api::services::inventory::CreateInventoryItemRequest {
                name: name.to_string(),
                sku: None,
                description: None,
                quantity,
                min_stock: 2,
                cost_price: sell_price / Decimal::from(2),
                sell_price,
                location: None,
                supplier: None,
            },
            None,
        )
        .await
        .expect("failed to seed inventory item")
        .id
}
