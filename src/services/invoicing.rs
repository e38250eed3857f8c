use std::sync::Arc;

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::customer::Entity as CustomerEntity;
use crate::entities::invoice::{self, Entity as InvoiceEntity, InvoiceStatus};
use crate::entities::job::{Entity as JobEntity, JobStatus};
use crate::entities::payment::{self, Entity as PaymentEntity, PaymentMethod};
use crate::entities::vehicle::Entity as VehicleEntity;
use crate::errors::{ServiceError, ServiceResult};
use crate::money;
use crate::services::audit::AuditRecorder;
use crate::services::jobs::mark_invoiced_in;
use crate::services::numbering;
use crate::services::settings::ShopSettings;

const NUMBER_ALLOCATION_ATTEMPTS: u32 = 3;

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateInvoiceFromJobRequest {
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateAdHocInvoiceRequest {
    pub customer_id: Uuid,
    pub subtotal: Decimal,
    /// Tax percentage; the shop-wide rate applies when omitted.
    pub tax_rate: Option<Decimal>,
    #[serde(default)]
    pub discount: Decimal,
    pub due_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct ApplyPaymentRequest {
    pub amount: Decimal,
    pub payment_method: PaymentMethod,
    pub reference: Option<String>,
    pub notes: Option<String>,
    /// Client-supplied de-duplication key. Replaying a key returns the
    /// stored outcome instead of appending a second payment.
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentOutcome {
    pub payment: payment::Model,
    pub invoice: invoice::Model,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct InvoiceFilter {
    pub status: Option<InvoiceStatus>,
    pub customer_id: Option<Uuid>,
}

/// The invoice/payment reconciler.
///
/// Creates invoices from completed jobs or ad hoc, and derives
/// `amount_paid`, `balance`, and `status` from the append-only payment
/// stream. Payments only ever accumulate; the balance floors at zero on
/// over-payment.
#[derive(Clone)]
pub struct InvoicingService {
    db: Arc<DbPool>,
    audit: AuditRecorder,
}

impl InvoicingService {
    pub fn new(db: Arc<DbPool>, audit: AuditRecorder) -> Self {
        Self { db, audit }
    }

    /// Generate an invoice for a job and mark the job `invoiced`.
    ///
    /// The job's `total_cost` becomes the subtotal and the shop tax rate
    /// from the injected settings snapshot is applied on top. The status
    /// force-set is the reconciler's reserved internal transition; the
    /// job row, the invoice row, and the number allocation commit
    /// together or not at all.
    #[instrument(skip(self, request, settings), fields(job_id = %job_id))]
    pub async fn create_from_job(
        &self,
        job_id: Uuid,
        request: CreateInvoiceFromJobRequest,
        settings: &ShopSettings,
        user_id: Option<Uuid>,
    ) -> ServiceResult<invoice::Model> {
        request.validate()?;
        let year = Utc::now().year();

        let mut attempt = 0;
        let (invoice, old_job, job) = loop {
            attempt += 1;
            let txn = self.db.begin().await?;

            let job = JobEntity::find_by_id(job_id)
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::not_found("job", job_id))?;
            let old_job = job.clone();

            if job.status != JobStatus::Completed {
                warn!(
                    job_id = %job_id,
                    status = %job.status,
                    "invoicing a job that is not completed"
                );
            }

            let vehicle = VehicleEntity::find_by_id(job.vehicle_id)
                .one(&txn)
                .await?
                .ok_or_else(|| ServiceError::not_found("vehicle", job.vehicle_id))?;

            let subtotal = job.total_cost;
            let tax_amount = money::percent_of(subtotal, settings.tax_rate);
            let total = money::round_money(subtotal + tax_amount);

            let invoice_number =
                numbering::next_invoice_number(&txn, &settings.invoice_prefix, year).await?;

            let now = Utc::now();
            let candidate = invoice::ActiveModel {
                id: Set(Uuid::new_v4()),
                invoice_number: Set(invoice_number),
                customer_id: Set(vehicle.customer_id),
                job_id: Set(Some(job_id)),
                subtotal: Set(subtotal),
                tax_rate: Set(settings.tax_rate),
                tax_amount: Set(tax_amount),
                discount: Set(Decimal::ZERO),
                total: Set(total),
                amount_paid: Set(Decimal::ZERO),
                balance: Set(total),
                status: Set(InvoiceStatus::derive(Decimal::ZERO, total)),
                due_date: Set(request.due_date),
                notes: Set(request.notes.clone()),
                paid_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            };

            match candidate.insert(&txn).await {
                Ok(created) => {
                    let job = mark_invoiced_in(&txn, job).await?;
                    txn.commit().await?;
                    break (created, old_job, job);
                }
                Err(e)
                    if matches!(
                        e.sql_err(),
                        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
                    ) && attempt < NUMBER_ALLOCATION_ATTEMPTS =>
                {
                    warn!(attempt, "invoice number collision, retrying allocation");
                    txn.rollback().await?;
                }
                Err(e)
                    if matches!(
                        e.sql_err(),
                        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
                    ) =>
                {
                    return Err(ServiceError::Conflict(
                        "could not allocate a unique invoice number".to_string(),
                    ));
                }
                Err(e) => return Err(ServiceError::DatabaseError(e)),
            }
        };

        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            total = %invoice.total,
            "invoice created from job"
        );
        self.audit.created("invoices", invoice.id, &invoice, user_id).await;
        self.audit.updated("jobs", job.id, &old_job, &job, user_id).await;
        Ok(invoice)
    }

    /// Create an invoice not tied to any job:
    /// `total = subtotal + tax_amount - discount`.
    #[instrument(skip(self, request, settings), fields(customer_id = %request.customer_id))]
    pub async fn create_ad_hoc(
        &self,
        request: CreateAdHocInvoiceRequest,
        settings: &ShopSettings,
        user_id: Option<Uuid>,
    ) -> ServiceResult<invoice::Model> {
        request.validate()?;
        money::require_non_negative("subtotal", request.subtotal)?;
        money::require_non_negative("discount", request.discount)?;
        let tax_rate = request.tax_rate.unwrap_or(settings.tax_rate);
        money::require_non_negative("tax_rate", tax_rate)?;

        CustomerEntity::find_by_id(request.customer_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("customer", request.customer_id))?;

        let subtotal = money::round_money(request.subtotal);
        let discount = money::round_money(request.discount);
        let tax_amount = money::percent_of(subtotal, tax_rate);
        let total = money::round_money(subtotal + tax_amount - discount);
        let balance = money::clamp_non_negative(total);
        let year = Utc::now().year();

        let mut attempt = 0;
        let invoice = loop {
            attempt += 1;
            let txn = self.db.begin().await?;
            let invoice_number =
                numbering::next_invoice_number(&txn, &settings.invoice_prefix, year).await?;

            let now = Utc::now();
            let candidate = invoice::ActiveModel {
                id: Set(Uuid::new_v4()),
                invoice_number: Set(invoice_number),
                customer_id: Set(request.customer_id),
                job_id: Set(None),
                subtotal: Set(subtotal),
                tax_rate: Set(tax_rate),
                tax_amount: Set(tax_amount),
                discount: Set(discount),
                total: Set(total),
                amount_paid: Set(Decimal::ZERO),
                balance: Set(balance),
                status: Set(InvoiceStatus::derive(Decimal::ZERO, balance)),
                due_date: Set(request.due_date),
                notes: Set(request.notes.clone()),
                paid_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            };

            match candidate.insert(&txn).await {
                Ok(created) => {
                    txn.commit().await?;
                    break created;
                }
                Err(e)
                    if matches!(
                        e.sql_err(),
                        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
                    ) && attempt < NUMBER_ALLOCATION_ATTEMPTS =>
                {
                    warn!(attempt, "invoice number collision, retrying allocation");
                    txn.rollback().await?;
                }
                Err(e)
                    if matches!(
                        e.sql_err(),
                        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
                    ) =>
                {
                    return Err(ServiceError::Conflict(
                        "could not allocate a unique invoice number".to_string(),
                    ));
                }
                Err(e) => return Err(ServiceError::DatabaseError(e)),
            }
        };

        info!(
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            "ad-hoc invoice created"
        );
        self.audit.created("invoices", invoice.id, &invoice, user_id).await;
        Ok(invoice)
    }

    /// Append a payment and re-derive the invoice's accumulated state.
    ///
    /// `amount_paid` only grows, `balance = max(0, total - amount_paid)`,
    /// and the status follows the balance. Paying more than the balance
    /// is allowed; the excess is absorbed and the balance floors at zero.
    /// `paid_at` is stamped on the first entry into `paid` only.
    #[instrument(skip(self, request), fields(invoice_id = %invoice_id, amount = %request.amount))]
    pub async fn apply_payment(
        &self,
        invoice_id: Uuid,
        request: ApplyPaymentRequest,
        user_id: Option<Uuid>,
    ) -> ServiceResult<PaymentOutcome> {
        request.validate()?;
        money::require_positive("amount", request.amount)?;

        // A replayed idempotency key returns the stored outcome without
        // touching the invoice again.
        if let Some(key) = request.idempotency_key.as_deref() {
            if let Some(outcome) = self.find_by_idempotency_key(invoice_id, key).await? {
                return Ok(outcome);
            }
        }

        let amount = money::round_money(request.amount);
        let txn = self.db.begin().await?;

        let current = InvoiceEntity::find_by_id(invoice_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("invoice", invoice_id))?;
        let old_invoice = current.clone();

        let now = Utc::now();
        let inserted = payment::ActiveModel {
            id: Set(Uuid::new_v4()),
            invoice_id: Set(invoice_id),
            amount: Set(amount),
            payment_method: Set(request.payment_method),
            reference: Set(request.reference.clone()),
            notes: Set(request.notes.clone()),
            idempotency_key: Set(request.idempotency_key.clone()),
            created_at: Set(now),
        }
        .insert(&txn)
        .await;

        let payment = match inserted {
            Ok(payment) => payment,
            Err(e)
                if matches!(
                    e.sql_err(),
                    Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
                ) && request.idempotency_key.is_some() =>
            {
                // Lost a race against a concurrent replay of the same key.
                txn.rollback().await?;
                let Some(key) = request.idempotency_key.as_deref() else {
                    return Err(ServiceError::DatabaseError(e));
                };
                return self
                    .find_by_idempotency_key(invoice_id, key)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::Conflict("duplicate payment idempotency key".to_string())
                    });
            }
            Err(e) => return Err(ServiceError::DatabaseError(e)),
        };

        let amount_paid = money::round_money(current.amount_paid + amount);
        let balance = money::clamp_non_negative(money::round_money(current.total - amount_paid));
        let status = InvoiceStatus::derive(amount_paid, balance);

        let mut active: invoice::ActiveModel = current.clone().into();
        active.amount_paid = Set(amount_paid);
        active.balance = Set(balance);
        active.status = Set(status);
        active.updated_at = Set(now);
        if status == InvoiceStatus::Paid && current.paid_at.is_none() {
            active.paid_at = Set(Some(now));
        }
        let invoice = active.update(&txn).await?;

        txn.commit().await?;

        info!(
            invoice_id = %invoice_id,
            payment_id = %payment.id,
            balance = %invoice.balance,
            status = ?invoice.status,
            "payment applied"
        );
        self.audit.created("payments", payment.id, &payment, user_id).await;
        self.audit
            .updated("invoices", invoice_id, &old_invoice, &invoice, user_id)
            .await;
        Ok(PaymentOutcome { payment, invoice })
    }

    async fn find_by_idempotency_key(
        &self,
        invoice_id: Uuid,
        key: &str,
    ) -> ServiceResult<Option<PaymentOutcome>> {
        let existing = PaymentEntity::find()
            .filter(payment::Column::IdempotencyKey.eq(key))
            .one(&*self.db)
            .await?;

        match existing {
            None => Ok(None),
            Some(payment) if payment.invoice_id == invoice_id => {
                let invoice = self.get_invoice(invoice_id).await?;
                info!(
                    invoice_id = %invoice_id,
                    payment_id = %payment.id,
                    "idempotency key replay, returning stored payment"
                );
                Ok(Some(PaymentOutcome { payment, invoice }))
            }
            Some(_) => Err(ServiceError::Conflict(
                "idempotency key was used for a different invoice".to_string(),
            )),
        }
    }

    pub async fn get_invoice(&self, invoice_id: Uuid) -> ServiceResult<invoice::Model> {
        InvoiceEntity::find_by_id(invoice_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("invoice", invoice_id))
    }

    #[instrument(skip(self))]
    pub async fn list_invoices(
        &self,
        page: u64,
        per_page: u64,
        filter: InvoiceFilter,
    ) -> ServiceResult<(Vec<invoice::Model>, u64)> {
        let mut query = InvoiceEntity::find().order_by_desc(invoice::Column::CreatedAt);
        if let Some(status) = filter.status {
            query = query.filter(invoice::Column::Status.eq(status));
        }
        if let Some(customer_id) = filter.customer_id {
            query = query.filter(invoice::Column::CustomerId.eq(customer_id));
        }

        let paginator = query.paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let invoices = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((invoices, total))
    }

    /// Payments for one invoice, oldest first.
    pub async fn payments(&self, invoice_id: Uuid) -> ServiceResult<Vec<payment::Model>> {
        self.get_invoice(invoice_id).await?;
        let payments = PaymentEntity::find()
            .filter(payment::Column::InvoiceId.eq(invoice_id))
            .order_by_asc(payment::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(payments)
    }
}
