use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
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
use crate::entities::expense::{self, Entity as ExpenseEntity};
use crate::errors::{ServiceError, ServiceResult};
use crate::money;
use crate::services::audit::AuditRecorder;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateExpenseRequest {
    #[validate(length(min = 1, message = "category is required"))]
    pub category: String,
    pub description: Option<String>,
    pub amount: Decimal,
    pub expense_date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateExpenseRequest {
    pub category: Option<String>,
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub expense_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Clone)]
pub struct ExpensesService {
    db: Arc<DbPool>,
    audit: AuditRecorder,
}

impl ExpensesService {
    pub fn new(db: Arc<DbPool>, audit: AuditRecorder) -> Self {
        Self { db, audit }
    }

    #[instrument(skip(self, request), fields(category = %request.category))]
    pub async fn create_expense(
        &self,
        request: CreateExpenseRequest,
        user_id: Option<Uuid>,
    ) -> ServiceResult<expense::Model> {
        request.validate()?;
        money::require_non_negative("amount", request.amount)?;

        let now = Utc::now();
        let created = expense::ActiveModel {
            id: Set(Uuid::new_v4()),
            category: Set(request.category),
            description: Set(request.description),
            amount: Set(money::round_money(request.amount)),
            expense_date: Set(request.expense_date),
            notes: Set(request.notes),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await?;

        self.audit.created("expenses", created.id, &created, user_id).await;
        Ok(created)
    }

    #[instrument(skip(self, request), fields(expense_id = %expense_id))]
    pub async fn update_expense(
        &self,
        expense_id: Uuid,
        request: UpdateExpenseRequest,
        user_id: Option<Uuid>,
    ) -> ServiceResult<expense::Model> {
        request.validate()?;
        if let Some(amount) = request.amount {
            money::require_non_negative("amount", amount)?;
        }

        let current = self.get_expense(expense_id).await?;
        let old = current.clone();

        let mut active: expense::ActiveModel = current.into();
        if let Some(category) = request.category {
            if category.is_empty() {
                return Err(ServiceError::ValidationError(
                    "category is required".to_string(),
                ));
            }
            active.category = Set(category);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(amount) = request.amount {
            active.amount = Set(money::round_money(amount));
        }
        if let Some(date) = request.expense_date {
            active.expense_date = Set(date);
        }
        if let Some(notes) = request.notes {
            active.notes = Set(Some(notes));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        self.audit
            .updated("expenses", expense_id, &old, &updated, user_id)
            .await;
        Ok(updated)
    }

    pub async fn get_expense(&self, expense_id: Uuid) -> ServiceResult<expense::Model> {
        ExpenseEntity::find_by_id(expense_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("expense", expense_id))
    }

    #[instrument(skip(self))]
    pub async fn list_expenses(
        &self,
        page: u64,
        per_page: u64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> ServiceResult<(Vec<expense::Model>, u64)> {
        let mut query = ExpenseEntity::find().order_by_desc(expense::Column::ExpenseDate);
        if let Some(from) = from {
            query = query.filter(expense::Column::ExpenseDate.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(expense::Column::ExpenseDate.lte(to));
        }

        let paginator = query.paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let expenses = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((expenses, total))
    }

    #[instrument(skip(self), fields(expense_id = %expense_id))]
    pub async fn delete_expense(&self, expense_id: Uuid, user_id: Option<Uuid>) -> ServiceResult<()> {
        let current = self.get_expense(expense_id).await?;
        current.clone().delete(&*self.db).await?;
        self.audit.deleted("expenses", expense_id, &current, user_id).await;
        Ok(())
    }
}
