mod common;

use std::collections::HashSet;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use autoshop_api::services::invoicing::CreateAdHocInvoiceRequest;
use autoshop_api::services::jobs::CreateJobRequest;
use autoshop_api::services::settings::ShopSettings;

use common::{seed_vehicle, TestApp};

fn job_request(vehicle_id: uuid::Uuid) -> CreateJobRequest {
    CreateJobRequest {
        vehicle_id,
        description: None,
        priority: autoshop_api::entities::job::JobPriority::Normal,
        labor_hours: Decimal::ZERO,
        labor_rate: Decimal::ZERO,
        notes: None,
    }
}

#[tokio::test]
async fn job_numbers_are_sequential_within_a_year() {
    let app = TestApp::new().await;
    let (_, vehicle_id) = seed_vehicle(&app).await;
    let year = Utc::now().year();

    let mut numbers = Vec::new();
    for _ in 0..3 {
        let job = app
            .state
            .services
            .jobs
            .create_job(job_request(vehicle_id), &ShopSettings::default(), None)
            .await
            .unwrap();
        numbers.push(job.job_number);
    }

    assert_eq!(numbers[0], format!("KAW-{year}-0001"));
    assert_eq!(numbers[1], format!("KAW-{year}-0002"));
    assert_eq!(numbers[2], format!("KAW-{year}-0003"));
    assert!(numbers.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn invoice_numbers_use_their_own_prefix_and_sequence() {
    let app = TestApp::new().await;
    let (customer_id, _) = seed_vehicle(&app).await;
    let year = Utc::now().year();

    let request = || CreateAdHocInvoiceRequest {
        customer_id,
        subtotal: dec!(100),
        tax_rate: Some(Decimal::ZERO),
        discount: Decimal::ZERO,
        due_date: None,
        notes: None,
    };

    let first = app
        .state
        .services
        .invoicing
        .create_ad_hoc(request(), &ShopSettings::default(), None)
        .await
        .unwrap();
    let second = app
        .state
        .services
        .invoicing
        .create_ad_hoc(request(), &ShopSettings::default(), None)
        .await
        .unwrap();

    assert_eq!(first.invoice_number, format!("INV-{year}-0001"));
    assert_eq!(second.invoice_number, format!("INV-{year}-0002"));
}

#[tokio::test]
async fn configured_prefix_is_honoured() {
    let app = TestApp::new().await;
    let (_, vehicle_id) = seed_vehicle(&app).await;
    let year = Utc::now().year();

    let settings = ShopSettings {
        job_prefix: "WRK".to_string(),
        ..ShopSettings::default()
    };
    let job = app
        .state
        .services
        .jobs
        .create_job(job_request(vehicle_id), &settings, None)
        .await
        .unwrap();
    assert_eq!(job.job_number, format!("WRK-{year}-0001"));
}

#[tokio::test]
async fn concurrent_creation_yields_distinct_numbers() {
    let app = TestApp::new().await;
    let (_, vehicle_id) = seed_vehicle(&app).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let jobs = app.state.services.jobs.clone();
        handles.push(tokio::spawn(async move {
            jobs.create_job(job_request(vehicle_id), &ShopSettings::default(), None)
                .await
        }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        let job = handle
            .await
            .expect("task panicked")
            .expect("creation failed under contention");
        assert!(
            numbers.insert(job.job_number.clone()),
            "duplicate job number issued: {}",
            job.job_number
        );
    }
    assert_eq!(numbers.len(), 8);
}
