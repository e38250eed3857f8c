use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, ModelTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::service_reminder::{self, Entity as ReminderEntity, ReminderType};
use crate::entities::vehicle::Entity as VehicleEntity;
use crate::errors::{ServiceError, ServiceResult};
use crate::services::audit::AuditRecorder;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateReminderRequest {
    pub vehicle_id: Uuid,
    pub reminder_type: ReminderType,
    pub due_date: Option<NaiveDate>,
    #[validate(range(min = 0, message = "due_mileage must not be negative"))]
    pub due_mileage: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateReminderRequest {
    pub reminder_type: Option<ReminderType>,
    pub due_date: Option<NaiveDate>,
    #[validate(range(min = 0, message = "due_mileage must not be negative"))]
    pub due_mileage: Option<i32>,
    pub notes: Option<String>,
    pub sent: Option<bool>,
}

#[derive(Clone)]
pub struct RemindersService {
    db: Arc<DbPool>,
    audit: AuditRecorder,
}

impl RemindersService {
    pub fn new(db: Arc<DbPool>, audit: AuditRecorder) -> Self {
        Self { db, audit }
    }

    #[instrument(skip(self, request), fields(vehicle_id = %request.vehicle_id))]
    pub async fn create_reminder(
        &self,
        request: CreateReminderRequest,
        user_id: Option<Uuid>,
    ) -> ServiceResult<service_reminder::Model> {
        request.validate()?;

        // A reminder with no trigger would never fire.
        match request.reminder_type {
            ReminderType::Mileage if request.due_mileage.is_none() => {
                return Err(ServiceError::ValidationError(
                    "due_mileage is required for mileage reminders".to_string(),
                ));
            }
            ReminderType::Time if request.due_date.is_none() => {
                return Err(ServiceError::ValidationError(
                    "due_date is required for time reminders".to_string(),
                ));
            }
            _ => {}
        }

        VehicleEntity::find_by_id(request.vehicle_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("vehicle", request.vehicle_id))?;

        let now = Utc::now();
        let created = service_reminder::ActiveModel {
            id: Set(Uuid::new_v4()),
            vehicle_id: Set(request.vehicle_id),
            reminder_type: Set(request.reminder_type),
            due_date: Set(request.due_date),
            due_mileage: Set(request.due_mileage),
            notes: Set(request.notes),
            sent: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        self.audit
            .created("service_reminders", created.id, &created, user_id)
            .await;
        Ok(created)
    }

    #[instrument(skip(self, request), fields(reminder_id = %reminder_id))]
    pub async fn update_reminder(
        &self,
        reminder_id: Uuid,
        request: UpdateReminderRequest,
        user_id: Option<Uuid>,
    ) -> ServiceResult<service_reminder::Model> {
        request.validate()?;

        let current = self.get_reminder(reminder_id).await?;
        let old = current.clone();

        let mut active: service_reminder::ActiveModel = current.into();
        if let Some(reminder_type) = request.reminder_type {
            active.reminder_type = Set(reminder_type);
        }
        if let Some(due_date) = request.due_date {
            active.due_date = Set(Some(due_date));
        }
        if let Some(due_mileage) = request.due_mileage {
            active.due_mileage = Set(Some(due_mileage));
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        if let Some(sent) = request.sent {
            active.sent = Set(sent);
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        self.audit
            .updated("service_reminders", reminder_id, &old, &updated, user_id)
            .await;
        Ok(updated)
    }

    pub async fn get_reminder(&self, reminder_id: Uuid) -> ServiceResult<service_reminder::Model> {
        ReminderEntity::find_by_id(reminder_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("service reminder", reminder_id))
    }

    #[instrument(skip(self))]
    pub async fn list_reminders(
        &self,
        page: u64,
        per_page: u64,
        vehicle_id: Option<Uuid>,
    ) -> ServiceResult<(Vec<service_reminder::Model>, u64)> {
        let mut query = ReminderEntity::find().order_by_asc(service_reminder::Column::DueDate);
        if let Some(vehicle_id) = vehicle_id {
            query = query.filter(service_reminder::Column::VehicleId.eq(vehicle_id));
        }

        let paginator = query.paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let reminders = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((reminders, total))
    }

    /// Unsent reminders whose due date has passed (time/custom) as of
    /// `today`. Mileage reminders need an odometer reading and are
    /// surfaced by vehicle lookups instead.
    pub async fn due_reminders(&self, today: NaiveDate) -> ServiceResult<Vec<service_reminder::Model>> {
        let reminders = ReminderEntity::find()
            .filter(service_reminder::Column::Sent.eq(false))
            .filter(service_reminder::Column::DueDate.lte(today))
            .order_by_asc(service_reminder::Column::DueDate)
            .all(&*self.db)
            .await?;
        Ok(reminders)
    }

    #[instrument(skip(self), fields(reminder_id = %reminder_id))]
    pub async fn delete_reminder(
        &self,
        reminder_id: Uuid,
        user_id: Option<Uuid>,
    ) -> ServiceResult<()> {
        let current = self.get_reminder(reminder_id).await?;
        current.clone().delete(&*self.db).await?;
        self.audit
            .deleted("service_reminders", reminder_id, &current, user_id)
            .await;
        Ok(())
    }
}
