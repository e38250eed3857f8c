use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{sea_query::OnConflict, ColumnTrait, EntityTrait, QueryFilter, Set};
use tracing::instrument;

use crate::db::DbPool;
use crate::entities::setting::{self, Entity as SettingEntity};
use crate::errors::{ServiceError, ServiceResult};
use crate::services::audit::AuditRecorder;

pub const KEY_TAX_RATE: &str = "tax_rate";
pub const KEY_JOB_PREFIX: &str = "job_prefix";
pub const KEY_INVOICE_PREFIX: &str = "invoice_prefix";

const KNOWN_KEYS: &[&str] = &[KEY_TAX_RATE, KEY_JOB_PREFIX, KEY_INVOICE_PREFIX];

/// Immutable snapshot of the mutable shop settings.
///
/// Loaded once at the start of an operation and passed into the
/// numbering and invoicing components, so a mid-operation settings
/// change can never produce a half-old, half-new document and tests can
/// supply fixed values.
#[derive(Clone, Debug, PartialEq)]
pub struct ShopSettings {
    pub tax_rate: Decimal,
    pub job_prefix: String,
    pub invoice_prefix: String,
}

impl Default for ShopSettings {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::ZERO,
            job_prefix: "KAW".to_string(),
            invoice_prefix: "INV".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct SettingsService {
    db: Arc<DbPool>,
    audit: AuditRecorder,
}

impl SettingsService {
    pub fn new(db: Arc<DbPool>, audit: AuditRecorder) -> Self {
        Self { db, audit }
    }

    /// Load the current settings snapshot, falling back to defaults for
    /// any key that has never been written.
    #[instrument(skip(self))]
    pub async fn snapshot(&self) -> ServiceResult<ShopSettings> {
        let rows = SettingEntity::find()
            .filter(setting::Column::Key.is_in(KNOWN_KEYS.to_vec()))
            .all(&*self.db)
            .await?;

        let mut snapshot = ShopSettings::default();
        for row in rows {
            match row.key.as_str() {
                KEY_TAX_RATE => {
                    snapshot.tax_rate = row.value.parse::<Decimal>().map_err(|_| {
                        ServiceError::InternalError(format!(
                            "stored tax_rate is not a number: {}",
                            row.value
                        ))
                    })?;
                }
                KEY_JOB_PREFIX => snapshot.job_prefix = row.value,
                KEY_INVOICE_PREFIX => snapshot.invoice_prefix = row.value,
                _ => {}
            }
        }
        Ok(snapshot)
    }

    /// All persisted settings as a plain map.
    pub async fn get_all(&self) -> ServiceResult<HashMap<String, String>> {
        let rows = SettingEntity::find().all(&*self.db).await?;
        Ok(rows.into_iter().map(|r| (r.key, r.value)).collect())
    }

    /// Upsert a batch of settings. Unknown keys and malformed numeric
    /// values are rejected before anything is written.
    #[instrument(skip(self, values))]
    pub async fn update(
        &self,
        values: HashMap<String, String>,
        user_id: Option<uuid::Uuid>,
    ) -> ServiceResult<ShopSettings> {
        for (key, value) in &values {
            if !KNOWN_KEYS.contains(&key.as_str()) {
                return Err(ServiceError::ValidationError(format!(
                    "unknown setting: {key}"
                )));
            }
            if key == KEY_TAX_RATE {
                let rate = value.parse::<Decimal>().map_err(|_| {
                    ServiceError::ValidationError(format!("tax_rate must be a number, got {value}"))
                })?;
                if rate < Decimal::ZERO {
                    return Err(ServiceError::ValidationError(
                        "tax_rate must not be negative".to_string(),
                    ));
                }
            }
        }

        let old = self.snapshot().await?;

        for (key, value) in values {
            let model = setting::ActiveModel {
                key: Set(key),
                value: Set(value),
                updated_at: Set(Utc::now()),
            };
            SettingEntity::insert(model)
                .on_conflict(
                    OnConflict::column(setting::Column::Key)
                        .update_columns([setting::Column::Value, setting::Column::UpdatedAt])
                        .to_owned(),
                )
                .exec(&*self.db)
                .await?;
        }

        let new = self.snapshot().await?;
        self.audit
            .updated(
                "settings",
                "shop",
                &format!("{old:?}"),
                &format!("{new:?}"),
                user_id,
            )
            .await;
        Ok(new)
    }
}
