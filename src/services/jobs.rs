use std::sync::Arc;

use chrono::{Datelike, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, ModelTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::job::{self, Entity as JobEntity, JobPriority, JobStatus};
use crate::entities::job_item::{self, DiscountType, Entity as JobItemEntity};
use crate::entities::job_part::{self, Entity as JobPartEntity};
use crate::entities::stock_movement::MovementType;
use crate::entities::vehicle::Entity as VehicleEntity;
use crate::errors::{ServiceError, ServiceResult};
use crate::money;
use crate::services::audit::AuditRecorder;
use crate::services::inventory::apply_movement_in;
use crate::services::numbering;
use crate::services::settings::ShopSettings;

/// Attempts at minting a job number before giving up on the unique
/// constraint race.
const NUMBER_ALLOCATION_ATTEMPTS: u32 = 3;

const STOCK_REFERENCE_JOB: &str = "job";

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateJobRequest {
    pub vehicle_id: Uuid,
    pub description: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: JobPriority,
    #[serde(default)]
    pub labor_hours: Decimal,
    #[serde(default)]
    pub labor_rate: Decimal,
    pub notes: Option<String>,
}

fn default_priority() -> JobPriority {
    JobPriority::Normal
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateJobRequest {
    pub description: Option<String>,
    pub priority: Option<JobPriority>,
    pub status: Option<JobStatus>,
    pub labor_hours: Option<Decimal>,
    pub labor_rate: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddServiceItemRequest {
    #[validate(length(min = 1, message = "description is required"))]
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default = "default_discount_type")]
    pub discount_type: DiscountType,
}

fn default_discount_type() -> DiscountType {
    DiscountType::Fixed
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct AddPartRequest {
    /// Inventory item to draw the part from; omit for a non-stocked part.
    pub inventory_id: Option<Uuid>,
    /// Part description; defaults to the inventory item name when drawn
    /// from stock.
    pub part_name: Option<String>,
    #[validate(range(min = 1, message = "quantity must be at least 1"))]
    pub quantity: i32,
    /// Selling price per unit; defaults to the inventory item's sell
    /// price when drawn from stock.
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: job::Model,
    pub items: Vec<job_item::Model>,
    pub parts: Vec<job_part::Model>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct JobFilter {
    pub status: Option<JobStatus>,
    pub vehicle_id: Option<Uuid>,
}

/// The job costing engine.
///
/// Owns a job's service lines and parts, keeps the derived cost columns
/// consistent (`labor_cost = labor_hours * labor_rate`,
/// `parts_cost = Σ job_parts.total`, `total_cost = labor_cost +
/// parts_cost`), enforces the status state machine, and keeps inventory
/// stock in step with part attachment.
#[derive(Clone)]
pub struct JobsService {
    db: Arc<DbPool>,
    audit: AuditRecorder,
}

impl JobsService {
    pub fn new(db: Arc<DbPool>, audit: AuditRecorder) -> Self {
        Self { db, audit }
    }

    #[instrument(skip(self, request, settings), fields(vehicle_id = %request.vehicle_id))]
    pub async fn create_job(
        &self,
        request: CreateJobRequest,
        settings: &ShopSettings,
        user_id: Option<Uuid>,
    ) -> ServiceResult<job::Model> {
        request.validate()?;
        money::require_non_negative("labor_hours", request.labor_hours)?;
        money::require_non_negative("labor_rate", request.labor_rate)?;

        VehicleEntity::find_by_id(request.vehicle_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("vehicle", request.vehicle_id))?;

        let labor_cost = money::round_money(request.labor_hours * request.labor_rate);
        let year = Utc::now().year();

        // The number scan and the insert race under concurrent creation;
        // the unique index on job_number settles it and we retry with a
        // fresh allocation.
        let mut attempt = 0;
        let job = loop {
            attempt += 1;
            let txn = self.db.begin().await?;
            let job_number =
                numbering::next_job_number(&txn, &settings.job_prefix, year).await?;

            let now = Utc::now();
            let candidate = job::ActiveModel {
                id: Set(Uuid::new_v4()),
                job_number: Set(job_number),
                vehicle_id: Set(request.vehicle_id),
                description: Set(request.description.clone()),
                status: Set(JobStatus::Pending),
                priority: Set(request.priority),
                labor_hours: Set(request.labor_hours),
                labor_rate: Set(request.labor_rate),
                labor_cost: Set(labor_cost),
                parts_cost: Set(Decimal::ZERO),
                total_cost: Set(labor_cost),
                notes: Set(request.notes.clone()),
                started_at: Set(None),
                completed_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            };

            match candidate.insert(&txn).await {
                Ok(job) => {
                    txn.commit().await?;
                    break job;
                }
                Err(e)
                    if matches!(
                        e.sql_err(),
                        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
                    ) && attempt < NUMBER_ALLOCATION_ATTEMPTS =>
                {
                    warn!(attempt, "job number collision, retrying allocation");
                    txn.rollback().await?;
                }
                Err(e)
                    if matches!(
                        e.sql_err(),
                        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
                    ) =>
                {
                    return Err(ServiceError::Conflict(
                        "could not allocate a unique job number".to_string(),
                    ));
                }
                Err(e) => return Err(ServiceError::DatabaseError(e)),
            }
        };

        info!(job_id = %job.id, job_number = %job.job_number, "job created");
        self.audit.created("jobs", job.id, &job, user_id).await;
        Ok(job)
    }

    /// Update job fields, enforcing the status state machine and the
    /// derived-cost invariants. Status may only move along a legal edge;
    /// `started_at` / `completed_at` are stamped on the first entry into
    /// `in_progress` / `completed` and never overwritten.
    #[instrument(skip(self, request), fields(job_id = %job_id))]
    pub async fn update_job(
        &self,
        job_id: Uuid,
        request: UpdateJobRequest,
        user_id: Option<Uuid>,
    ) -> ServiceResult<job::Model> {
        request.validate()?;
        if let Some(hours) = request.labor_hours {
            money::require_non_negative("labor_hours", hours)?;
        }
        if let Some(rate) = request.labor_rate {
            money::require_non_negative("labor_rate", rate)?;
        }

        let txn = self.db.begin().await?;

        let current = JobEntity::find_by_id(job_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("job", job_id))?;
        let old = current.clone();

        if let Some(target) = request.status {
            if !current.status.can_transition_to(target) {
                return Err(ServiceError::InvalidTransition {
                    from: current.status,
                    to: target,
                });
            }
        }

        let labor_hours = request.labor_hours.unwrap_or(current.labor_hours);
        let labor_rate = request.labor_rate.unwrap_or(current.labor_rate);
        let labor_cost = money::round_money(labor_hours * labor_rate);
        let total_cost = money::round_money(labor_cost + current.parts_cost);

        let now = Utc::now();
        let mut active: job::ActiveModel = current.clone().into();
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(priority) = request.priority {
            active.priority = Set(priority);
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        active.labor_hours = Set(labor_hours);
        active.labor_rate = Set(labor_rate);
        active.labor_cost = Set(labor_cost);
        active.total_cost = Set(total_cost);
        active.updated_at = Set(now);

        if let Some(target) = request.status {
            active.status = Set(target);
            if target == JobStatus::InProgress && current.started_at.is_none() {
                active.started_at = Set(Some(now));
            }
            if target == JobStatus::Completed && current.completed_at.is_none() {
                active.completed_at = Set(Some(now));
            }
        }

        let updated = active.update(&txn).await?;
        txn.commit().await?;

        if let Some(target) = request.status {
            if target != old.status {
                info!(
                    job_id = %job_id,
                    from = %old.status,
                    to = %target,
                    "job status changed"
                );
            }
        }
        self.audit.updated("jobs", job_id, &old, &updated, user_id).await;
        Ok(updated)
    }

    /// Add a billable service line. The line total follows the discount
    /// rule and never goes negative. Service lines intentionally do not
    /// feed `parts_cost`/`total_cost`; only parts do.
    #[instrument(skip(self, request), fields(job_id = %job_id))]
    pub async fn add_service_item(
        &self,
        job_id: Uuid,
        request: AddServiceItemRequest,
        user_id: Option<Uuid>,
    ) -> ServiceResult<job_item::Model> {
        request.validate()?;
        money::require_non_negative("quantity", request.quantity)?;
        money::require_non_negative("unit_price", request.unit_price)?;
        money::require_non_negative("discount", request.discount)?;

        JobEntity::find_by_id(job_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("job", job_id))?;

        let total = money::line_total(
            request.quantity,
            request.unit_price,
            request.discount,
            request.discount_type,
        );

        let item = job_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            job_id: Set(job_id),
            description: Set(request.description),
            quantity: Set(request.quantity),
            unit_price: Set(request.unit_price),
            discount: Set(request.discount),
            discount_type: Set(request.discount_type),
            total: Set(total),
            created_at: Set(Utc::now()),
        }
        .insert(&*self.db)
        .await?;

        self.audit.created("job_items", item.id, &item, user_id).await;
        Ok(item)
    }

    #[instrument(skip(self), fields(job_id = %job_id, item_id = %item_id))]
    pub async fn remove_service_item(
        &self,
        job_id: Uuid,
        item_id: Uuid,
        user_id: Option<Uuid>,
    ) -> ServiceResult<()> {
        let item = JobItemEntity::find_by_id(item_id)
            .one(&*self.db)
            .await?
            .filter(|item| item.job_id == job_id)
            .ok_or_else(|| ServiceError::not_found("job item", item_id))?;

        item.clone().delete(&*self.db).await?;
        self.audit.deleted("job_items", item_id, &item, user_id).await;
        Ok(())
    }

    /// Attach a part to a job. When the part is drawn from inventory the
    /// stock debit, the part row, and the job cost recompute land in one
    /// transaction: either all of it happens or none of it does.
    #[instrument(skip(self, request), fields(job_id = %job_id))]
    pub async fn add_part(
        &self,
        job_id: Uuid,
        request: AddPartRequest,
        user_id: Option<Uuid>,
    ) -> ServiceResult<(job_part::Model, job::Model)> {
        request.validate()?;
        if let Some(price) = request.unit_price {
            money::require_non_negative("unit_price", price)?;
        }

        let txn = self.db.begin().await?;

        let current = JobEntity::find_by_id(job_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("job", job_id))?;
        let old_job = current.clone();

        // Resolve name and price, debiting stock when the part comes out
        // of inventory.
        let (part_name, unit_price) = match request.inventory_id {
            Some(inventory_id) => {
                let (item, _) = apply_movement_in(
                    &txn,
                    inventory_id,
                    MovementType::Out,
                    request.quantity,
                    Some(STOCK_REFERENCE_JOB),
                    Some(job_id),
                    Some(format!("used on job {}", current.job_number)),
                )
                .await?;
                (
                    request.part_name.unwrap_or_else(|| item.name.clone()),
                    request.unit_price.unwrap_or(item.sell_price),
                )
            }
            None => {
                let name = request
                    .part_name
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| {
                        ServiceError::ValidationError("part_name is required".to_string())
                    })?;
                let price = request.unit_price.ok_or_else(|| {
                    ServiceError::ValidationError("unit_price is required".to_string())
                })?;
                (name, price)
            }
        };

        let total = money::round_money(Decimal::from(request.quantity) * unit_price);
        let part = job_part::ActiveModel {
            id: Set(Uuid::new_v4()),
            job_id: Set(job_id),
            inventory_id: Set(request.inventory_id),
            part_name: Set(part_name),
            quantity: Set(request.quantity),
            unit_price: Set(unit_price),
            total: Set(total),
            created_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        let job = recompute_costs_in(&txn, current).await?;
        txn.commit().await?;

        info!(
            job_id = %job_id,
            part_id = %part.id,
            parts_cost = %job.parts_cost,
            "part added to job"
        );
        self.audit.created("job_parts", part.id, &part, user_id).await;
        self.audit.updated("jobs", job_id, &old_job, &job, user_id).await;
        Ok((part, job))
    }

    /// Detach a part. A part that drew from inventory is returned to
    /// stock with an inverse movement; the original movement row stays.
    #[instrument(skip(self), fields(job_id = %job_id, part_id = %part_id))]
    pub async fn remove_part(
        &self,
        job_id: Uuid,
        part_id: Uuid,
        user_id: Option<Uuid>,
    ) -> ServiceResult<job::Model> {
        let txn = self.db.begin().await?;

        let current = JobEntity::find_by_id(job_id)
            .one(&txn)
            .await?
            .ok_or_else(|| ServiceError::not_found("job", job_id))?;
        let old_job = current.clone();

        let part = JobPartEntity::find_by_id(part_id)
            .one(&txn)
            .await?
            .filter(|part| part.job_id == job_id)
            .ok_or_else(|| ServiceError::not_found("job part", part_id))?;

        if let Some(inventory_id) = part.inventory_id {
            apply_movement_in(
                &txn,
                inventory_id,
                MovementType::In,
                part.quantity,
                Some(STOCK_REFERENCE_JOB),
                Some(job_id),
                Some(format!("returned from job {}", current.job_number)),
            )
            .await?;
        }

        part.clone().delete(&txn).await?;
        let job = recompute_costs_in(&txn, current).await?;
        txn.commit().await?;

        self.audit.deleted("job_parts", part_id, &part, user_id).await;
        self.audit.updated("jobs", job_id, &old_job, &job, user_id).await;
        Ok(job)
    }

    pub async fn get_job(&self, job_id: Uuid) -> ServiceResult<job::Model> {
        JobEntity::find_by_id(job_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("job", job_id))
    }

    /// Job with its service lines and parts.
    pub async fn get_job_detail(&self, job_id: Uuid) -> ServiceResult<JobDetail> {
        let job = self.get_job(job_id).await?;
        let items = JobItemEntity::find()
            .filter(job_item::Column::JobId.eq(job_id))
            .order_by_asc(job_item::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        let parts = JobPartEntity::find()
            .filter(job_part::Column::JobId.eq(job_id))
            .order_by_asc(job_part::Column::CreatedAt)
            .all(&*self.db)
            .await?;
        Ok(JobDetail { job, items, parts })
    }

    #[instrument(skip(self))]
    pub async fn list_jobs(
        &self,
        page: u64,
        per_page: u64,
        filter: JobFilter,
    ) -> ServiceResult<(Vec<job::Model>, u64)> {
        let mut query = JobEntity::find().order_by_desc(job::Column::CreatedAt);
        if let Some(status) = filter.status {
            query = query.filter(job::Column::Status.eq(status));
        }
        if let Some(vehicle_id) = filter.vehicle_id {
            query = query.filter(job::Column::VehicleId.eq(vehicle_id));
        }

        let paginator = query.paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let jobs = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((jobs, total))
    }
}

/// Recompute the derived cost columns from the job's parts, inside the
/// caller's transaction.
pub(crate) async fn recompute_costs_in<C: ConnectionTrait>(
    conn: &C,
    job: job::Model,
) -> ServiceResult<job::Model> {
    let parts = JobPartEntity::find()
        .filter(job_part::Column::JobId.eq(job.id))
        .all(conn)
        .await?;
    let parts_cost: Decimal = parts.iter().map(|p| p.total).sum();
    let parts_cost = money::round_money(parts_cost);
    let total_cost = money::round_money(job.labor_cost + parts_cost);

    let mut active: job::ActiveModel = job.into();
    active.parts_cost = Set(parts_cost);
    active.total_cost = Set(total_cost);
    active.updated_at = Set(Utc::now());
    Ok(active.update(conn).await?)
}

/// Reconciler-only transition: force a job into `invoiced` as part of
/// invoice creation, inside the reconciler's transaction. This is the
/// designated entry point for `completed -> invoiced` and deliberately
/// skips [`JobStatus::can_transition_to`]; it must not be reachable from
/// the external update path.
pub(crate) async fn mark_invoiced_in<C: ConnectionTrait>(
    conn: &C,
    job: job::Model,
) -> ServiceResult<job::Model> {
    let mut active: job::ActiveModel = job.into();
    active.status = Set(JobStatus::Invoiced);
    active.updated_at = Set(Utc::now());
    Ok(active.update(conn).await?)
}
