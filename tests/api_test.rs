mod common;

use axum::http::{Method, StatusCode};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use common::TestApp;

fn dec_field(value: &Value) -> Decimal {
    value
        .as_str()
        .unwrap_or_else(|| panic!("expected decimal string, got {value}"))
        .parse()
        .expect("decimal did not parse")
}

#[tokio::test]
async fn health_and_status_are_public() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(Method::GET, "/api/v1/status", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["service"], "autoshop-api");

    let (status, body) = app
        .request(Method::GET, "/api/v1/health", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["checks"]["database"], "healthy");
}

#[tokio::test]
async fn login_issues_tokens_and_rejects_bad_credentials() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "mechanic@shop.test", "password": "shop-password-1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert!(body["data"]["access_token"].as_str().is_some());
    assert_eq!(body["data"]["user"]["role"], "staff");

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "email": "mechanic@shop.test", "password": "wrong" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(Method::GET, "/api/v1/customers", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");

    let (status, _) = app
        .request(
            Method::GET,
            "/api/v1/customers",
            Some("not-a-real-token"),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn staff_cannot_reach_admin_surface() {
    let app = TestApp::new().await;
    let staff_token = app.token_for(&app.staff);
    let admin_token = app.token_for(&app.admin);

    let (status, body) = app
        .request(Method::GET, "/api/v1/users", Some(&staff_token), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, _) = app
        .request(Method::GET, "/api/v1/users", Some(&admin_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn admin_cannot_manage_peer_admins() {
    let app = TestApp::new().await;
    let admin_token = app.token_for(&app.admin);

    // An admin creating another admin account is forbidden by the role
    // hierarchy; creating staff is fine.
    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/users",
            Some(&admin_token),
            Some(json!({
                "name": "Another Admin",
                "email": "admin2@shop.test",
                "password": "shop-password-2",
                "role": "admin"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");

    let (status, _) = app
        .request(
            Method::POST,
            "/api/v1/users",
            Some(&admin_token),
            Some(json!({
                "name": "New Mechanic",
                "email": "mechanic2@shop.test",
                "password": "shop-password-2",
                "role": "staff"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn validation_failures_carry_the_error_envelope() {
    let app = TestApp::new().await;
    let token = app.token_for(&app.staff);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/customers",
            Some(&token),
            Some(json!({ "name": "" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["message"].as_str().unwrap().contains("name"));

    let (status, body) = app
        .request(
            Method::GET,
            &format!("/api/v1/customers/{}", uuid::Uuid::new_v4()),
            Some(&token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn full_workshop_flow_over_http() {
    let app = TestApp::new().await;
    let token = app.token_for(&app.staff);

    // Customer and vehicle.
    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/customers",
            Some(&token),
            Some(json!({ "name": "Grace M.", "phone": "0711-222333" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let customer_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/vehicles",
            Some(&token),
            Some(json!({
                "customer_id": customer_id,
                "plate_number": "KCF-482Q",
                "make": "Subaru",
                "model": "Forester",
                "year": 2017,
                "odometer": 104000
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let vehicle_id = body["data"]["id"].as_str().unwrap().to_string();

    // Duplicate plate is a conflict.
    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/vehicles",
            Some(&token),
            Some(json!({
                "customer_id": customer_id,
                "plate_number": "KCF-482Q",
                "make": "Subaru",
                "model": "Outback"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");

    // Job with labor.
    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/jobs",
            Some(&token),
            Some(json!({
                "vehicle_id": vehicle_id,
                "description": "suspension work",
                "labor_hours": "4",
                "labor_rate": "750"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let job_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(dec_field(&body["data"]["labor_cost"]), dec!(3000));

    // A non-stocked part.
    let (status, body) = app
        .request(
            Method::POST,
            &format!("/api/v1/jobs/{job_id}/parts"),
            Some(&token),
            Some(json!({
                "part_name": "shock absorber",
                "quantity": 2,
                "unit_price": "1000"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(dec_field(&body["data"]["job"]["parts_cost"]), dec!(2000));
    assert_eq!(dec_field(&body["data"]["job"]["total_cost"]), dec!(5000));

    // Walk the job to completed, then invoice it.
    for target in ["in_progress", "completed"] {
        let (status, _) = app
            .request(
                Method::PUT,
                &format!("/api/v1/jobs/{job_id}/status"),
                Some(&token),
                Some(json!({ "status": target })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    // Skipping ahead from invoiced is rejected by the state machine.
    let (status, body) = app
        .request(
            Method::POST,
            &format!("/api/v1/invoices/from-job/{job_id}"),
            Some(&token),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let invoice_id = body["data"]["id"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["status"], "unpaid");
    assert_eq!(dec_field(&body["data"]["subtotal"]), dec!(5000));

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/api/v1/jobs/{job_id}/status"),
            Some(&token),
            Some(json!({ "status": "pending" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BUSINESS_RULE");

    // Pay in two installments.
    let (status, body) = app
        .request(
            Method::POST,
            &format!("/api/v1/invoices/{invoice_id}/payments"),
            Some(&token),
            Some(json!({ "amount": "3000", "payment_method": "cash" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["invoice"]["status"], "partial");

    let (status, body) = app
        .request(
            Method::POST,
            &format!("/api/v1/invoices/{invoice_id}/payments"),
            Some(&token),
            Some(json!({ "amount": "2000", "payment_method": "bank_transfer" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["invoice"]["status"], "paid");
    assert_eq!(dec_field(&body["data"]["invoice"]["balance"]), dec!(0));

    // The dashboard sees the money.
    let (status, body) = app
        .request(Method::GET, "/api/v1/reports/dashboard", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dec_field(&body["data"]["revenue_collected"]), dec!(5000));
    assert_eq!(body["data"]["jobs_invoiced"], 1);
}

#[tokio::test]
async fn settings_update_is_admin_only_and_typed() {
    let app = TestApp::new().await;
    let staff_token = app.token_for(&app.staff);
    let admin_token = app.token_for(&app.admin);

    let (status, _) = app
        .request(
            Method::PUT,
            "/api/v1/settings",
            Some(&staff_token),
            Some(json!({ "tax_rate": "16" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .request(
            Method::PUT,
            "/api/v1/settings",
            Some(&admin_token),
            Some(json!({ "tax_rate": "16", "invoice_prefix": "BIL" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tax_rate"], "16");
    assert_eq!(body["data"]["invoice_prefix"], "BIL");

    let (status, body) = app
        .request(
            Method::PUT,
            "/api/v1/settings",
            Some(&admin_token),
            Some(json!({ "tax_rate": "not-a-number" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
