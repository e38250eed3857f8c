use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};
use serde::Serialize;
use tracing::instrument;
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::entities::expense::{self, Entity as ExpenseEntity};
use crate::entities::inventory_item::{self, Entity as InventoryItemEntity};
use crate::entities::invoice::{self, Entity as InvoiceEntity, InvoiceStatus};
use crate::entities::job::{self, Entity as JobEntity, JobStatus};
use crate::entities::payment::{self, Entity as PaymentEntity};
use crate::errors::ServiceResult;
use crate::money;

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardSummary {
    pub jobs_pending: u64,
    pub jobs_in_progress: u64,
    pub jobs_completed: u64,
    pub jobs_invoiced: u64,
    pub revenue_collected: Decimal,
    pub outstanding_balance: Decimal,
    pub unsettled_invoices: u64,
    pub low_stock_items: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RevenueReport {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub total_collected: Decimal,
    pub payment_count: u64,
    pub by_method: BTreeMap<String, Decimal>,
    pub expenses_total: Decimal,
    pub net: Decimal,
}

/// Read-only aggregates over the financial tables. Nothing here mutates
/// state, so no auditing and no transactions.
#[derive(Clone)]
pub struct ReportsService {
    db: Arc<DbPool>,
}

impl ReportsService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> ServiceResult<DashboardSummary> {
        let jobs_by = |status: JobStatus| {
            JobEntity::find()
                .filter(job::Column::Status.eq(status))
                .count(&*self.db)
        };
        let jobs_pending = jobs_by(JobStatus::Pending).await?;
        let jobs_in_progress = jobs_by(JobStatus::InProgress).await?;
        let jobs_completed = jobs_by(JobStatus::Completed).await?;
        let jobs_invoiced = jobs_by(JobStatus::Invoiced).await?;

        let payments = PaymentEntity::find().all(&*self.db).await?;
        let revenue_collected =
            money::round_money(payments.iter().map(|p| p.amount).sum::<Decimal>());

        let open_invoices = InvoiceEntity::find()
            .filter(invoice::Column::Status.ne(InvoiceStatus::Paid))
            .all(&*self.db)
            .await?;
        let outstanding_balance =
            money::round_money(open_invoices.iter().map(|i| i.balance).sum::<Decimal>());
        let unsettled_invoices = open_invoices.len() as u64;

        let low_stock_items = InventoryItemEntity::find()
            .filter(
                Expr::col(inventory_item::Column::Quantity)
                    .lte(Expr::col(inventory_item::Column::MinStock)),
            )
            .count(&*self.db)
            .await?;

        Ok(DashboardSummary {
            jobs_pending,
            jobs_in_progress,
            jobs_completed,
            jobs_invoiced,
            revenue_collected,
            outstanding_balance,
            unsettled_invoices,
            low_stock_items,
        })
    }

    /// Collected revenue vs expenses over an optional period.
    #[instrument(skip(self))]
    pub async fn revenue(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> ServiceResult<RevenueReport> {
        let mut query = PaymentEntity::find();
        if let Some(from) = from {
            query = query.filter(payment::Column::CreatedAt.gte(from));
        }
        if let Some(to) = to {
            query = query.filter(payment::Column::CreatedAt.lte(to));
        }
        let payments = query.all(&*self.db).await?;

        let total_collected =
            money::round_money(payments.iter().map(|p| p.amount).sum::<Decimal>());
        let payment_count = payments.len() as u64;
        let mut by_method: BTreeMap<String, Decimal> = BTreeMap::new();
        for p in &payments {
            let key = serde_json::to_value(p.payment_method)
                .ok()
                .and_then(|v| v.as_str().map(str::to_string))
                .unwrap_or_else(|| "other".to_string());
            *by_method.entry(key).or_insert(Decimal::ZERO) += p.amount;
        }

        let mut expense_query = ExpenseEntity::find();
        if let Some(from) = from {
            expense_query = expense_query.filter(expense::Column::ExpenseDate.gte(from.date_naive()));
        }
        if let Some(to) = to {
            expense_query = expense_query.filter(expense::Column::ExpenseDate.lte(to.date_naive()));
        }
        let expenses = expense_query.all(&*self.db).await?;
        let expenses_total =
            money::round_money(expenses.iter().map(|e| e.amount).sum::<Decimal>());

        Ok(RevenueReport {
            from,
            to,
            total_collected,
            payment_count,
            by_method,
            expenses_total,
            net: money::round_money(total_collected - expenses_total),
        })
    }

    /// Invoices still carrying a balance, largest first.
    #[instrument(skip(self))]
    pub async fn outstanding_invoices(&self) -> ServiceResult<Vec<invoice::Model>> {
        let invoices = InvoiceEntity::find()
            .filter(invoice::Column::Status.ne(InvoiceStatus::Paid))
            .order_by_desc(invoice::Column::Balance)
            .all(&*self.db)
            .await?;
        Ok(invoices)
    }
}
