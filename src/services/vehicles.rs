use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::customer::Entity as CustomerEntity;
use crate::entities::job::{self, Entity as JobEntity};
use crate::entities::vehicle::{self, Entity as VehicleEntity};
use crate::errors::{ServiceError, ServiceResult};
use crate::services::audit::AuditRecorder;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateVehicleRequest {
    pub customer_id: Uuid,
    #[validate(length(min = 1, message = "plate_number is required"))]
    pub plate_number: String,
    #[validate(length(min = 1, message = "make is required"))]
    pub make: String,
    #[validate(length(min = 1, message = "model is required"))]
    pub model: String,
    #[validate(range(min = 1900, max = 2100, message = "year is out of range"))]
    pub year: Option<i32>,
    pub vin: Option<String>,
    pub color: Option<String>,
    #[validate(range(min = 0, message = "odometer must not be negative"))]
    pub odometer: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateVehicleRequest {
    pub plate_number: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    #[validate(range(min = 1900, max = 2100, message = "year is out of range"))]
    pub year: Option<i32>,
    pub vin: Option<String>,
    pub color: Option<String>,
    #[validate(range(min = 0, message = "odometer must not be negative"))]
    pub odometer: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct VehiclesService {
    db: Arc<DbPool>,
    audit: AuditRecorder,
}

impl VehiclesService {
    pub fn new(db: Arc<DbPool>, audit: AuditRecorder) -> Self {
        Self { db, audit }
    }

    #[instrument(skip(self, request), fields(customer_id = %request.customer_id, plate = %request.plate_number))]
    pub async fn create_vehicle(
        &self,
        request: CreateVehicleRequest,
        user_id: Option<Uuid>,
    ) -> ServiceResult<vehicle::Model> {
        request.validate()?;

        CustomerEntity::find_by_id(request.customer_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("customer", request.customer_id))?;

        let now = Utc::now();
        let created = vehicle::ActiveModel {
            id: Set(Uuid::new_v4()),
            customer_id: Set(request.customer_id),
            plate_number: Set(request.plate_number),
            make: Set(request.make),
            model: Set(request.model),
            year: Set(request.year),
            vin: Set(request.vin),
            color: Set(request.color),
            odometer: Set(request.odometer),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .map_err(unique_plate_conflict)?;

        info!(vehicle_id = %created.id, "vehicle created");
        self.audit.created("vehicles", created.id, &created, user_id).await;
        Ok(created)
    }

    #[instrument(skip(self, request), fields(vehicle_id = %vehicle_id))]
    pub async fn update_vehicle(
        &self,
        vehicle_id: Uuid,
        request: UpdateVehicleRequest,
        user_id: Option<Uuid>,
    ) -> ServiceResult<vehicle::Model> {
        request.validate()?;

        let current = self.get_vehicle(vehicle_id).await?;
        let old = current.clone();

        let mut active: vehicle::ActiveModel = current.into();
        if let Some(plate) = request.plate_number {
            if plate.is_empty() {
                return Err(ServiceError::ValidationError(
                    "plate_number is required".to_string(),
                ));
            }
            active.plate_number = Set(plate);
        }
        if let Some(make) = request.make {
            active.make = Set(make);
        }
        if let Some(model) = request.model {
            active.model = Set(model);
        }
        if let Some(year) = request.year {
            active.year = Set(Some(year));
        }
        if let Some(vin) = request.vin {
            active.vin = Set(Some(vin));
        }
        if let Some(color) = request.color {
            active.color = Set(Some(color));
        }
        if let Some(odometer) = request.odometer {
            active.odometer = Set(Some(odometer));
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Utc::now());

        let updated = active
            .update(&*self.db)
            .await
            .map_err(unique_plate_conflict)?;
        self.audit
            .updated("vehicles", vehicle_id, &old, &updated, user_id)
            .await;
        Ok(updated)
    }

    pub async fn get_vehicle(&self, vehicle_id: Uuid) -> ServiceResult<vehicle::Model> {
        VehicleEntity::find_by_id(vehicle_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("vehicle", vehicle_id))
    }

    #[instrument(skip(self))]
    pub async fn list_vehicles(
        &self,
        page: u64,
        per_page: u64,
        customer_id: Option<Uuid>,
        search: Option<String>,
    ) -> ServiceResult<(Vec<vehicle::Model>, u64)> {
        let mut query = VehicleEntity::find().order_by_asc(vehicle::Column::PlateNumber);
        if let Some(customer_id) = customer_id {
            query = query.filter(vehicle::Column::CustomerId.eq(customer_id));
        }
        if let Some(term) = search.filter(|t| !t.is_empty()) {
            let pattern = format!("%{term}%");
            query = query.filter(
                Condition::any()
                    .add(vehicle::Column::PlateNumber.like(&pattern))
                    .add(vehicle::Column::Make.like(&pattern))
                    .add(vehicle::Column::Model.like(&pattern)),
            );
        }

        let paginator = query.paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let vehicles = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((vehicles, total))
    }

    /// Delete a vehicle with no job history.
    #[instrument(skip(self), fields(vehicle_id = %vehicle_id))]
    pub async fn delete_vehicle(&self, vehicle_id: Uuid, user_id: Option<Uuid>) -> ServiceResult<()> {
        let current = self.get_vehicle(vehicle_id).await?;

        let job_count = JobEntity::find()
            .filter(job::Column::VehicleId.eq(vehicle_id))
            .count(&*self.db)
            .await?;
        if job_count > 0 {
            return Err(ServiceError::BusinessRule(
                "vehicle has job history and cannot be deleted".to_string(),
            ));
        }

        current.clone().delete(&*self.db).await?;
        self.audit.deleted("vehicles", vehicle_id, &current, user_id).await;
        Ok(())
    }
}

fn unique_plate_conflict(e: sea_orm::DbErr) -> ServiceError {
    match e.sql_err() {
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
            ServiceError::Conflict("a vehicle with this plate number already exists".to_string())
        }
        _ => ServiceError::DatabaseError(e),
    }
}
