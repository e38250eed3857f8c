use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Lifecycle states of a job. The legal transitions form a small state
/// machine enforced by the job service before any status write:
///
/// ```text
/// pending      -> {in_progress, cancelled}
/// in_progress  -> {pending, completed, cancelled}
/// completed    -> {in_progress, invoiced}
/// invoiced     -> {}
/// cancelled    -> {pending}
/// ```
///
/// A self-transition (status unchanged) is always a legal no-op.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "job_status")]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "invoiced")]
    Invoiced,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl JobStatus {
    /// Whether moving from `self` to `to` is allowed for callers outside
    /// the invoicing reconciler. `invoiced` is terminal.
    pub fn can_transition_to(self, to: JobStatus) -> bool {
        use JobStatus::*;
        if self == to {
            return true;
        }
        matches!(
            (self, to),
            (Pending, InProgress)
                | (Pending, Cancelled)
                | (InProgress, Pending)
                | (InProgress, Completed)
                | (InProgress, Cancelled)
                | (Completed, InProgress)
                | (Completed, Invoiced)
                | (Cancelled, Pending)
        )
    }

    pub fn is_terminal(self) -> bool {
        self == JobStatus::Invoiced
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::InProgress => "in_progress",
            JobStatus::Completed => "completed",
            JobStatus::Invoiced => "invoiced",
            JobStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "job_priority")]
#[serde(rename_all = "snake_case")]
pub enum JobPriority {
    #[sea_orm(string_value = "low")]
    Low,
    #[sea_orm(string_value = "normal")]
    Normal,
    #[sea_orm(string_value = "high")]
    High,
    #[sea_orm(string_value = "urgent")]
    Urgent,
}

/// A work order against one vehicle.
///
/// `labor_cost`, `parts_cost`, and `total_cost` are derived columns: the
/// job service recomputes them on every mutation so that
/// `labor_cost == labor_hours * labor_rate`,
/// `parts_cost == sum(job_parts.total)`, and
/// `total_cost == labor_cost + parts_cost` always hold.
/// `started_at` / `completed_at` are write-once, stamped on the first
/// transition into `in_progress` / `completed`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub job_number: String,
    pub vehicle_id: Uuid,
    pub description: Option<String>,
    pub status: JobStatus,
    pub priority: JobPriority,
    pub labor_hours: Decimal,
    pub labor_rate: Decimal,
    pub labor_cost: Decimal,
    pub parts_cost: Decimal,
    pub total_cost: Decimal,
    pub notes: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::JobStatus::*;
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Pending, InProgress, true)]
    #[case(Pending, Cancelled, true)]
    #[case(Pending, Completed, false)]
    #[case(Pending, Invoiced, false)]
    #[case(InProgress, Pending, true)]
    #[case(InProgress, Completed, true)]
    #[case(InProgress, Cancelled, true)]
    #[case(InProgress, Invoiced, false)]
    #[case(Completed, InProgress, true)]
    #[case(Completed, Invoiced, true)]
    #[case(Completed, Pending, false)]
    #[case(Completed, Cancelled, false)]
    #[case(Invoiced, Pending, false)]
    #[case(Invoiced, InProgress, false)]
    #[case(Invoiced, Completed, false)]
    #[case(Invoiced, Cancelled, false)]
    #[case(Cancelled, Pending, true)]
    #[case(Cancelled, InProgress, false)]
    fn transition_matrix(#[case] from: JobStatus, #[case] to: JobStatus, #[case] legal: bool) {
        assert_eq!(from.can_transition_to(to), legal, "{from} -> {to}");
    }

    #[rstest]
    #[case(Pending)]
    #[case(InProgress)]
    #[case(Completed)]
    #[case(Invoiced)]
    #[case(Cancelled)]
    fn self_transition_is_always_legal(#[case] status: JobStatus) {
        assert!(status.can_transition_to(status));
    }

    #[test]
    fn invoiced_is_the_only_terminal_state() {
        assert!(Invoiced.is_terminal());
        for status in [Pending, InProgress, Completed, Cancelled] {
            assert!(!status.is_terminal());
        }
    }
}
