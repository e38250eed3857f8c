use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set};
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use crate::db::DbPool;
use crate::entities::audit_log::{self, AuditAction, Entity as AuditLogEntity};
use crate::errors::ServiceResult;

/// Append-only change recorder.
///
/// Every financial mutation mirrors its before/after snapshots here.
/// Recording failures are logged and swallowed: auditing must never fail
/// or roll back the primary operation, so `record` does not return a
/// `Result` and is called after the mutation's transaction has
/// committed.
#[derive(Clone)]
pub struct AuditRecorder {
    db: Arc<DbPool>,
}

impl AuditRecorder {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Record one change. `old` / `new` are serialized as JSON snapshots;
    /// a snapshot that fails to serialize is stored as null rather than
    /// aborting the record.
    pub async fn record<O: Serialize, N: Serialize>(
        &self,
        table_name: &str,
        record_id: impl std::fmt::Display,
        action: AuditAction,
        old: Option<&O>,
        new: Option<&N>,
        user_id: Option<Uuid>,
    ) {
        let entry = audit_log::ActiveModel {
            id: Set(Uuid::new_v4()),
            table_name: Set(table_name.to_string()),
            record_id: Set(record_id.to_string()),
            action: Set(action),
            old_data: Set(old.and_then(|v| serde_json::to_value(v).ok())),
            new_data: Set(new.and_then(|v| serde_json::to_value(v).ok())),
            user_id: Set(user_id),
            created_at: Set(Utc::now()),
        };

        if let Err(e) = entry.insert(&*self.db).await {
            warn!(
                table = table_name,
                error = %e,
                "failed to write audit entry; continuing"
            );
        }
    }

    /// Shorthand for a creation record (no prior snapshot).
    pub async fn created<N: Serialize>(
        &self,
        table_name: &str,
        record_id: impl std::fmt::Display,
        new: &N,
        user_id: Option<Uuid>,
    ) {
        self.record::<(), N>(table_name, record_id, AuditAction::Create, None, Some(new), user_id)
            .await;
    }

    /// Shorthand for an update record.
    pub async fn updated<O: Serialize, N: Serialize>(
        &self,
        table_name: &str,
        record_id: impl std::fmt::Display,
        old: &O,
        new: &N,
        user_id: Option<Uuid>,
    ) {
        self.record(
            table_name,
            record_id,
            AuditAction::Update,
            Some(old),
            Some(new),
            user_id,
        )
        .await;
    }

    /// Shorthand for a deletion record (no after snapshot).
    pub async fn deleted<O: Serialize>(
        &self,
        table_name: &str,
        record_id: impl std::fmt::Display,
        old: &O,
        user_id: Option<Uuid>,
    ) {
        self.record::<O, ()>(table_name, record_id, AuditAction::Delete, Some(old), None, user_id)
            .await;
    }

    /// List audit entries for one record, newest first.
    pub async fn history(
        &self,
        table_name: &str,
        record_id: &str,
        page: u64,
        per_page: u64,
    ) -> ServiceResult<(Vec<audit_log::Model>, u64)> {
        let paginator = AuditLogEntity::find()
            .filter(audit_log::Column::TableName.eq(table_name))
            .filter(audit_log::Column::RecordId.eq(record_id))
            .order_by_desc(audit_log::Column::CreatedAt)
            .paginate(&*self.db, per_page);

        let total = paginator.num_items().await?;
        let entries = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((entries, total))
    }
}
