use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "reminder_type")]
#[serde(rename_all = "snake_case")]
pub enum ReminderType {
    #[sea_orm(string_value = "mileage")]
    Mileage,
    #[sea_orm(string_value = "time")]
    Time,
    #[sea_orm(string_value = "custom")]
    Custom,
}

/// An upcoming service reminder for a vehicle, due either by date or by
/// odometer reading depending on its type.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "service_reminders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub reminder_type: ReminderType,
    pub due_date: Option<NaiveDate>,
    pub due_mileage: Option<i32>,
    pub notes: Option<String>,
    pub sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
