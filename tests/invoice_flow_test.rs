mod common;

use assert_matches::assert_matches;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

use autoshop_api::entities::invoice::InvoiceStatus;
use autoshop_api::entities::job::JobStatus;
use autoshop_api::entities::payment::PaymentMethod;
use autoshop_api::errors::ServiceError;
use autoshop_api::services::invoicing::{
    ApplyPaymentRequest, CreateAdHocInvoiceRequest, CreateInvoiceFromJobRequest,
};
use autoshop_api::services::jobs::{CreateJobRequest, UpdateJobRequest};
use autoshop_api::services::settings::ShopSettings;

use common::{seed_vehicle, TestApp};

/// Drive a job to `completed` with a 5000 total (12.5h x 400).
async fn seed_completed_job(app: &TestApp) -> autoshop_api::entities::job::Model {
    let (_, vehicle_id) = seed_vehicle(app).await;
    let jobs = &app.state.services.jobs;

    let job = jobs
        .create_job(
            CreateJobRequest {
                vehicle_id,
                description: Some("engine rebuild".to_string()),
                priority: autoshop_api::entities::job::JobPriority::High,
                labor_hours: dec!(12.5),
                labor_rate: dec!(400),
                notes: None,
            },
            &ShopSettings::default(),
            None,
        )
        .await
        .unwrap();
    assert_eq!(job.total_cost, dec!(5000));

    for status in [JobStatus::InProgress, JobStatus::Completed] {
        jobs.update_job(
            job.id,
            UpdateJobRequest {
                status: Some(status),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();
    }
    jobs.get_job(job.id).await.unwrap()
}

fn payment(amount: Decimal) -> ApplyPaymentRequest {
    ApplyPaymentRequest {
        amount,
        payment_method: PaymentMethod::Cash,
        reference: None,
        notes: None,
        idempotency_key: None,
    }
}

#[tokio::test]
async fn invoice_from_job_applies_tax_and_marks_job_invoiced() {
    let app = TestApp::new().await;
    let job = seed_completed_job(&app).await;

    let invoice = app
        .state
        .services
        .invoicing
        .create_from_job(
            job.id,
            CreateInvoiceFromJobRequest::default(),
            &app.billing_settings(),
            None,
        )
        .await
        .unwrap();

    assert_eq!(invoice.subtotal, dec!(5000));
    assert_eq!(invoice.tax_amount, dec!(500));
    assert_eq!(invoice.total, dec!(5500));
    assert_eq!(invoice.amount_paid, Decimal::ZERO);
    assert_eq!(invoice.balance, dec!(5500));
    assert_eq!(invoice.status, InvoiceStatus::Unpaid);
    assert_eq!(invoice.job_id, Some(job.id));
    assert!(invoice.paid_at.is_none());

    let job = app.state.services.jobs.get_job(job.id).await.unwrap();
    assert_eq!(job.status, JobStatus::Invoiced);
}

#[tokio::test]
async fn split_payments_walk_unpaid_partial_paid() {
    let app = TestApp::new().await;
    let job = seed_completed_job(&app).await;
    let invoicing = &app.state.services.invoicing;

    let invoice = invoicing
        .create_from_job(
            job.id,
            CreateInvoiceFromJobRequest::default(),
            &app.billing_settings(),
            None,
        )
        .await
        .unwrap();

    let outcome = invoicing
        .apply_payment(invoice.id, payment(dec!(3000)), None)
        .await
        .unwrap();
    assert_eq!(outcome.invoice.amount_paid, dec!(3000));
    assert_eq!(outcome.invoice.balance, dec!(2500));
    assert_eq!(outcome.invoice.status, InvoiceStatus::Partial);
    assert!(outcome.invoice.paid_at.is_none());

    let outcome = invoicing
        .apply_payment(invoice.id, payment(dec!(2500)), None)
        .await
        .unwrap();
    assert_eq!(outcome.invoice.balance, Decimal::ZERO);
    assert_eq!(outcome.invoice.status, InvoiceStatus::Paid);
    let paid_at = outcome.invoice.paid_at.expect("paid_at must be stamped");

    // The payment stream always sums to amount_paid.
    let payments = invoicing.payments(invoice.id).await.unwrap();
    let sum: Decimal = payments.iter().map(|p| p.amount).sum();
    assert_eq!(sum, outcome.invoice.amount_paid);

    // Over-payment is absorbed: balance stays floored at zero and
    // paid_at keeps its original stamp.
    let outcome = invoicing
        .apply_payment(invoice.id, payment(dec!(1000)), None)
        .await
        .unwrap();
    assert_eq!(outcome.invoice.amount_paid, dec!(6500));
    assert_eq!(outcome.invoice.balance, Decimal::ZERO);
    assert_eq!(outcome.invoice.status, InvoiceStatus::Paid);
    assert_eq!(outcome.invoice.paid_at, Some(paid_at));
}

#[tokio::test]
async fn idempotency_key_replay_does_not_double_charge() {
    let app = TestApp::new().await;
    let job = seed_completed_job(&app).await;
    let invoicing = &app.state.services.invoicing;

    let invoice = invoicing
        .create_from_job(
            job.id,
            CreateInvoiceFromJobRequest::default(),
            &app.billing_settings(),
            None,
        )
        .await
        .unwrap();

    let request = || ApplyPaymentRequest {
        amount: dec!(2000),
        payment_method: PaymentMethod::Card,
        reference: Some("POS-1".to_string()),
        notes: None,
        idempotency_key: Some("client-key-42".to_string()),
    };

    let first = invoicing
        .apply_payment(invoice.id, request(), None)
        .await
        .unwrap();
    let second = invoicing
        .apply_payment(invoice.id, request(), None)
        .await
        .unwrap();

    assert_eq!(first.payment.id, second.payment.id);
    assert_eq!(second.invoice.amount_paid, dec!(2000));
    assert_eq!(invoicing.payments(invoice.id).await.unwrap().len(), 1);

    // The same key against another invoice is a conflict, not a replay.
    let other_job = seed_completed_job(&app).await;
    let other = invoicing
        .create_from_job(
            other_job.id,
            CreateInvoiceFromJobRequest::default(),
            &app.billing_settings(),
            None,
        )
        .await
        .unwrap();
    let err = invoicing
        .apply_payment(other.id, request(), None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(_));
}

#[tokio::test]
async fn ad_hoc_invoice_subtracts_discount() {
    let app = TestApp::new().await;
    let (customer_id, _) = seed_vehicle(&app).await;

    let invoice = app
        .state
        .services
        .invoicing
        .create_ad_hoc(
            CreateAdHocInvoiceRequest {
                customer_id,
                subtotal: dec!(2000),
                tax_rate: Some(dec!(10)),
                discount: dec!(200),
                due_date: None,
                notes: None,
            },
            &ShopSettings::default(),
            None,
        )
        .await
        .unwrap();

    assert_eq!(invoice.tax_amount, dec!(200));
    assert_eq!(invoice.total, dec!(2000));
    assert_eq!(invoice.balance, dec!(2000));
    assert_eq!(invoice.status, InvoiceStatus::Unpaid);
    assert_eq!(invoice.job_id, None);
}

#[tokio::test]
async fn payment_validation_and_missing_invoice() {
    let app = TestApp::new().await;
    let invoicing = &app.state.services.invoicing;

    let err = invoicing
        .apply_payment(Uuid::new_v4(), payment(dec!(100)), None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let job = seed_completed_job(&app).await;
    let invoice = invoicing
        .create_from_job(
            job.id,
            CreateInvoiceFromJobRequest::default(),
            &app.billing_settings(),
            None,
        )
        .await
        .unwrap();

    let err = invoicing
        .apply_payment(invoice.id, payment(Decimal::ZERO), None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let err = invoicing
        .apply_payment(invoice.id, payment(dec!(-50)), None)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn balance_invariant_holds_after_every_payment() {
    let app = TestApp::new().await;
    let job = seed_completed_job(&app).await;
    let invoicing = &app.state.services.invoicing;

    let invoice = invoicing
        .create_from_job(
            job.id,
            CreateInvoiceFromJobRequest::default(),
            &app.billing_settings(),
            None,
        )
        .await
        .unwrap();

    let mut paid = Decimal::ZERO;
    for amount in [dec!(100), dec!(2400), dec!(1500), dec!(3000)] {
        let outcome = invoicing
            .apply_payment(invoice.id, payment(amount), None)
            .await
            .unwrap();
        paid += amount;
        let expected_balance = (invoice.total - paid).max(Decimal::ZERO);
        assert_eq!(outcome.invoice.amount_paid, paid);
        assert_eq!(outcome.invoice.balance, expected_balance);
        assert_eq!(
            outcome.invoice.status,
            InvoiceStatus::derive(paid, expected_balance)
        );
    }
}
