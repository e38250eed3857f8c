use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::customer::{self, Entity as CustomerEntity};
use crate::entities::invoice::{self, Entity as InvoiceEntity, InvoiceStatus};
use crate::entities::job::{self, Entity as JobEntity, JobStatus};
use crate::entities::vehicle::{self, Entity as VehicleEntity};
use crate::errors::{ServiceError, ServiceResult};
use crate::services::audit::AuditRecorder;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerRequest {
    pub name: Option<String>,
    #[validate(email(message = "email must be a valid address"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct CustomersService {
    db: Arc<DbPool>,
    audit: AuditRecorder,
}

impl CustomersService {
    pub fn new(db: Arc<DbPool>, audit: AuditRecorder) -> Self {
        Self { db, audit }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
        user_id: Option<Uuid>,
    ) -> ServiceResult<customer::Model> {
        request.validate()?;

        let now = Utc::now();
        let created = customer::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name),
            email: Set(request.email),
            phone: Set(request.phone),
            address: Set(request.address),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        info!(customer_id = %created.id, "customer created");
        self.audit.created("customers", created.id, &created, user_id).await;
        Ok(created)
    }

    #[instrument(skip(self, request), fields(customer_id = %customer_id))]
    pub async fn update_customer(
        &self,
        customer_id: Uuid,
        request: UpdateCustomerRequest,
        user_id: Option<Uuid>,
    ) -> ServiceResult<customer::Model> {
        request.validate()?;

        let current = self.get_customer(customer_id).await?;
        let old = current.clone();

        let mut active: customer::ActiveModel = current.into();
        if let Some(name) = request.name {
            if name.is_empty() {
                return Err(ServiceError::ValidationError("name is required".to_string()));
            }
            active.name = Set(name);
        }
        if let Some(email) = request.email {
            active.email = Set(Some(email));
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = request.address {
            active.address = Set(Some(address));
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        self.audit
            .updated("customers", customer_id, &old, &updated, user_id)
            .await;
        Ok(updated)
    }

    pub async fn get_customer(&self, customer_id: Uuid) -> ServiceResult<customer::Model> {
        CustomerEntity::find_by_id(customer_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("customer", customer_id))
    }

    #[instrument(skip(self))]
    pub async fn list_customers(
        &self,
        page: u64,
        per_page: u64,
        search: Option<String>,
    ) -> ServiceResult<(Vec<customer::Model>, u64)> {
        let mut query = CustomerEntity::find().order_by_asc(customer::Column::Name);
        if let Some(term) = search.filter(|t| !t.is_empty()) {
            let pattern = format!("%{term}%");
            query = query.filter(
                Condition::any()
                    .add(customer::Column::Name.like(&pattern))
                    .add(customer::Column::Phone.like(&pattern))
                    .add(customer::Column::Email.like(&pattern)),
            );
        }

        let paginator = query.paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let customers = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((customers, total))
    }

    /// Delete a customer and their vehicles. Refused while the customer
    /// has open jobs or unsettled invoices, so financial history is never
    /// orphaned.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn delete_customer(
        &self,
        customer_id: Uuid,
        user_id: Option<Uuid>,
    ) -> ServiceResult<()> {
        let current = self.get_customer(customer_id).await?;

        let vehicle_ids: Vec<Uuid> = VehicleEntity::find()
            .filter(vehicle::Column::CustomerId.eq(customer_id))
            .all(&*self.db)
            .await?
            .into_iter()
            .map(|v| v.id)
            .collect();

        if !vehicle_ids.is_empty() {
            let open_jobs = JobEntity::find()
                .filter(job::Column::VehicleId.is_in(vehicle_ids.clone()))
                .filter(job::Column::Status.is_in([
                    JobStatus::Pending,
                    JobStatus::InProgress,
                    JobStatus::Completed,
                ]))
                .count(&*self.db)
                .await?;
            if open_jobs > 0 {
                return Err(ServiceError::BusinessRule(
                    "customer has open jobs and cannot be deleted".to_string(),
                ));
            }
        }

        let unsettled_invoices = InvoiceEntity::find()
            .filter(invoice::Column::CustomerId.eq(customer_id))
            .filter(invoice::Column::Status.ne(InvoiceStatus::Paid))
            .count(&*self.db)
            .await?;
        if unsettled_invoices > 0 {
            return Err(ServiceError::BusinessRule(
                "customer has unsettled invoices and cannot be deleted".to_string(),
            ));
        }

        let txn = self.db.begin().await?;
        VehicleEntity::delete_many()
            .filter(vehicle::Column::CustomerId.eq(customer_id))
            .exec(&txn)
            .await?;
        current.clone().delete(&txn).await?;
        txn.commit().await?;

        info!(customer_id = %customer_id, "customer deleted");
        self.audit.deleted("customers", customer_id, &current, user_id).await;
        Ok(())
    }
}
