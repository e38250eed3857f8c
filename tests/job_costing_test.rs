mod common;

use assert_matches::assert_matches;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use autoshop_api::entities::job::JobStatus;
use autoshop_api::entities::job_item::DiscountType;
use autoshop_api::entities::stock_movement::MovementType;
use autoshop_api::errors::ServiceError;
use autoshop_api::services::jobs::{
    AddPartRequest, AddServiceItemRequest, CreateJobRequest, UpdateJobRequest,
};
use autoshop_api::services::settings::ShopSettings;

use common::{seed_inventory, seed_vehicle, TestApp};

async fn seed_job(app: &TestApp, vehicle_id: Uuid) -> autoshop_api::entities::job::Model {
    app.state
        .services
        .jobs
        .create_job(
            CreateJobRequest {
                vehicle_id,
                description: Some("brake overhaul".to_string()),
                priority: autoshop_api::entities::job::JobPriority::Normal,
                labor_hours: Decimal::ZERO,
                labor_rate: Decimal::ZERO,
                notes: None,
            },
            &ShopSettings::default(),
            None,
        )
        .await
        .expect("job creation failed")
}

#[tokio::test]
async fn part_attachment_debits_stock_and_recomputes_costs() {
    let app = TestApp::new().await;
    let (_, vehicle_id) = seed_vehicle(&app).await;
    let job = seed_job(&app, vehicle_id).await;
    let item_id = seed_inventory(&app, "brake pad set", 10, dec!(500)).await;

    let (part, job) = app
        .state
        .services
        .jobs
        .add_part(
            job.id,
            AddPartRequest {
                inventory_id: Some(item_id),
                part_name: None,
                quantity: 2,
                unit_price: Some(dec!(500)),
            },
            None,
        )
        .await
        .expect("add_part failed");

    assert_eq!(part.total, dec!(1000));
    assert_eq!(job.parts_cost, dec!(1000));
    assert_eq!(job.total_cost, dec!(1000));
    assert_eq!(job.labor_cost, Decimal::ZERO);

    let item = app.state.services.inventory.get_item(item_id).await.unwrap();
    assert_eq!(item.quantity, 8);

    let (movements, total) = app
        .state
        .services
        .inventory
        .movements(item_id, 1, 20)
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(movements[0].movement_type, MovementType::Out);
    assert_eq!(movements[0].quantity, 2);
    assert_eq!(movements[0].reference_type.as_deref(), Some("job"));
    assert_eq!(movements[0].reference_id, Some(job.id));
}

#[tokio::test]
async fn labor_cost_follows_hours_times_rate() {
    let app = TestApp::new().await;
    let (_, vehicle_id) = seed_vehicle(&app).await;
    let job = seed_job(&app, vehicle_id).await;

    let job = app
        .state
        .services
        .jobs
        .update_job(
            job.id,
            UpdateJobRequest {
                labor_hours: Some(dec!(2.5)),
                labor_rate: Some(dec!(400)),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(job.labor_cost, dec!(1000));
    assert_eq!(job.total_cost, dec!(1000));

    // Changing only the rate recomputes with the stored hours.
    let job = app
        .state
        .services
        .jobs
        .update_job(
            job.id,
            UpdateJobRequest {
                labor_rate: Some(dec!(500)),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(job.labor_cost, dec!(1250));
    assert_eq!(job.total_cost, dec!(1250));
}

#[tokio::test]
async fn add_then_remove_part_is_a_stock_noop() {
    let app = TestApp::new().await;
    let (_, vehicle_id) = seed_vehicle(&app).await;
    let job = seed_job(&app, vehicle_id).await;
    let item_id = seed_inventory(&app, "oil filter", 6, dec!(150)).await;

    let (part, _) = app
        .state
        .services
        .jobs
        .add_part(
            job.id,
            AddPartRequest {
                inventory_id: Some(item_id),
                part_name: None,
                quantity: 4,
                unit_price: None,
            },
            None,
        )
        .await
        .unwrap();

    let item = app.state.services.inventory.get_item(item_id).await.unwrap();
    assert_eq!(item.quantity, 2);

    let job_after = app
        .state
        .services
        .jobs
        .remove_part(job.id, part.id, None)
        .await
        .unwrap();

    // Net no-op on stock, but both legs stay on the ledger.
    let item = app.state.services.inventory.get_item(item_id).await.unwrap();
    assert_eq!(item.quantity, 6);
    assert_eq!(job_after.parts_cost, Decimal::ZERO);
    assert_eq!(job_after.total_cost, Decimal::ZERO);

    let (movements, total) = app
        .state
        .services
        .inventory
        .movements(item_id, 1, 20)
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert!(movements.iter().all(|m| m.quantity > 0));
    let signed: i32 = movements
        .iter()
        .map(|m| m.movement_type.signum() * m.quantity)
        .sum();
    assert_eq!(signed, 0);
}

#[tokio::test]
async fn ledger_reconstructs_quantity_from_movements() {
    let app = TestApp::new().await;
    let item_id = seed_inventory(&app, "coolant", 10, dec!(80)).await;
    let inventory = &app.state.services.inventory;

    inventory.adjust(item_id, 5, None, None).await.unwrap();
    inventory.adjust(item_id, -3, None, None).await.unwrap();
    inventory.adjust(item_id, -7, None, None).await.unwrap();

    let item = inventory.get_item(item_id).await.unwrap();
    let (movements, _) = inventory.movements(item_id, 1, 50).await.unwrap();
    let signed: i32 = movements
        .iter()
        .map(|m| m.movement_type.signum() * m.quantity)
        .sum();
    assert_eq!(10 + signed, item.quantity);
    assert_eq!(item.quantity, 5);
}

#[tokio::test]
async fn oversell_drives_quantity_negative() {
    let app = TestApp::new().await;
    let (_, vehicle_id) = seed_vehicle(&app).await;
    let job = seed_job(&app, vehicle_id).await;
    let item_id = seed_inventory(&app, "headlight", 1, dec!(900)).await;

    app.state
        .services
        .jobs
        .add_part(
            job.id,
            AddPartRequest {
                inventory_id: Some(item_id),
                part_name: None,
                quantity: 5,
                unit_price: None,
            },
            None,
        )
        .await
        .expect("oversell must be allowed");

    let item = app.state.services.inventory.get_item(item_id).await.unwrap();
    assert_eq!(item.quantity, -4);
}

#[tokio::test]
async fn service_items_do_not_touch_job_totals() {
    let app = TestApp::new().await;
    let (_, vehicle_id) = seed_vehicle(&app).await;
    let job = seed_job(&app, vehicle_id).await;

    let item = app
        .state
        .services
        .jobs
        .add_service_item(
            job.id,
            AddServiceItemRequest {
                description: "wheel alignment".to_string(),
                quantity: dec!(2),
                unit_price: dec!(100),
                discount: dec!(10),
                discount_type: DiscountType::Percent,
            },
            None,
        )
        .await
        .unwrap();

    // 2 * 100 minus 10% = 180
    assert_eq!(item.total, dec!(180));

    // The job's own totals are parts-only.
    let job = app.state.services.jobs.get_job(job.id).await.unwrap();
    assert_eq!(job.parts_cost, Decimal::ZERO);
    assert_eq!(job.total_cost, Decimal::ZERO);
}

#[tokio::test]
async fn fixed_discount_line_floors_at_zero() {
    let app = TestApp::new().await;
    let (_, vehicle_id) = seed_vehicle(&app).await;
    let job = seed_job(&app, vehicle_id).await;

    let item = app
        .state
        .services
        .jobs
        .add_service_item(
            job.id,
            AddServiceItemRequest {
                description: "goodwill".to_string(),
                quantity: dec!(1),
                unit_price: dec!(50),
                discount: dec!(80),
                discount_type: DiscountType::Fixed,
            },
            None,
        )
        .await
        .unwrap();
    assert_eq!(item.total, Decimal::ZERO);
}

#[tokio::test]
async fn status_machine_is_enforced() {
    let app = TestApp::new().await;
    let (_, vehicle_id) = seed_vehicle(&app).await;
    let job = seed_job(&app, vehicle_id).await;
    let jobs = &app.state.services.jobs;

    // pending -> invoiced is never legal from the update path.
    let err = jobs
        .update_job(
            job.id,
            UpdateJobRequest {
                status: Some(JobStatus::Invoiced),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap_err();
    assert_matches!(
        err,
        ServiceError::InvalidTransition {
            from: JobStatus::Pending,
            to: JobStatus::Invoiced,
        }
    );

    let set_status = |status: JobStatus| UpdateJobRequest {
        status: Some(status),
        ..Default::default()
    };

    let job_model = jobs
        .update_job(job.id, set_status(JobStatus::InProgress), None)
        .await
        .unwrap();
    let first_started_at = job_model.started_at.expect("started_at must be stamped");

    // Bounce back to pending and forward again: started_at is write-once.
    jobs.update_job(job.id, set_status(JobStatus::Pending), None)
        .await
        .unwrap();
    let job_model = jobs
        .update_job(job.id, set_status(JobStatus::InProgress), None)
        .await
        .unwrap();
    assert_eq!(job_model.started_at, Some(first_started_at));

    let job_model = jobs
        .update_job(job.id, set_status(JobStatus::Completed), None)
        .await
        .unwrap();
    assert!(job_model.completed_at.is_some());

    // completed -> invoiced is legal from the update path.
    let job_model = jobs
        .update_job(job.id, set_status(JobStatus::Invoiced), None)
        .await
        .unwrap();
    assert_eq!(job_model.status, JobStatus::Invoiced);

    // invoiced is terminal.
    for target in [
        JobStatus::Pending,
        JobStatus::InProgress,
        JobStatus::Completed,
        JobStatus::Cancelled,
    ] {
        let err = jobs
            .update_job(job.id, set_status(target), None)
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::InvalidTransition { .. });
    }

    // Self-transition stays a no-op.
    jobs.update_job(job.id, set_status(JobStatus::Invoiced), None)
        .await
        .expect("self-transition must be legal");
}

#[tokio::test]
async fn rejects_malformed_input() {
    let app = TestApp::new().await;
    let (_, vehicle_id) = seed_vehicle(&app).await;
    let job = seed_job(&app, vehicle_id).await;
    let jobs = &app.state.services.jobs;

    let err = jobs
        .update_job(
            job.id,
            UpdateJobRequest {
                labor_rate: Some(dec!(-1)),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let err = jobs
        .add_part(
            job.id,
            AddPartRequest {
                inventory_id: None,
                part_name: Some("belt".to_string()),
                quantity: 0,
                unit_price: Some(dec!(100)),
            },
            None,
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let err = jobs.get_job(Uuid::new_v4()).await.unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}
