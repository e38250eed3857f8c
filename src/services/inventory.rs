use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::inventory_item::{self, Entity as InventoryItemEntity};
use crate::entities::job_part;
use crate::entities::stock_movement::{self, Entity as StockMovementEntity, MovementType};
use crate::errors::{ServiceError, ServiceResult};
use crate::money;
use crate::services::audit::AuditRecorder;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateInventoryItemRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Stock-keeping unit; generated from the item id when omitted.
    pub sku: Option<String>,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "quantity must not be negative"))]
    #[serde(default)]
    pub quantity: i32,
    #[serde(default)]
    pub min_stock: i32,
    #[serde(default)]
    pub cost_price: Decimal,
    #[serde(default)]
    pub sell_price: Decimal,
    pub location: Option<String>,
    pub supplier: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateInventoryItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub min_stock: Option<i32>,
    pub cost_price: Option<Decimal>,
    pub sell_price: Option<Decimal>,
    pub location: Option<String>,
    pub supplier: Option<String>,
    /// Corrected on-hand count; the difference from the current quantity
    /// is booked as a manual stock movement.
    pub quantity: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct AdjustStockRequest {
    /// Signed change to the on-hand quantity; must not be zero.
    pub delta: i32,
    pub notes: Option<String>,
}

/// Apply one stock movement inside the caller's transaction: mutate the
/// item quantity by the signed amount and append exactly one ledger row.
///
/// This is the single write path for inventory quantity: every caller
/// (manual adjustments, job part attach/detach) goes through here so the
/// pairing invariant between `quantity` and the movement log cannot be
/// broken. No floor is applied: oversold stock goes negative.
pub(crate) async fn apply_movement_in<C: ConnectionTrait>(
    conn: &C,
    item_id: Uuid,
    direction: MovementType,
    quantity: i32,
    reference_type: Option<&str>,
    reference_id: Option<Uuid>,
    notes: Option<String>,
) -> ServiceResult<(inventory_item::Model, stock_movement::Model)> {
    if quantity <= 0 {
        return Err(ServiceError::ValidationError(
            "movement quantity must be positive".to_string(),
        ));
    }

    let item = InventoryItemEntity::find_by_id(item_id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found("inventory item", item_id))?;

    let new_quantity = item.quantity + direction.signum() * quantity;

    let mut item_active: inventory_item::ActiveModel = item.into();
    item_active.quantity = Set(new_quantity);
    item_active.updated_at = Set(Utc::now());
    let updated = item_active.update(conn).await?;

    let movement = stock_movement::ActiveModel {
        id: Set(Uuid::new_v4()),
        inventory_id: Set(item_id),
        movement_type: Set(direction),
        quantity: Set(quantity),
        reference_type: Set(reference_type.map(str::to_string)),
        reference_id: Set(reference_id),
        notes: Set(notes),
        created_at: Set(Utc::now()),
    }
    .insert(conn)
    .await?;

    if updated.quantity < 0 {
        warn!(
            item_id = %item_id,
            quantity = updated.quantity,
            "inventory item oversold"
        );
    }

    Ok((updated, movement))
}

/// Service owning item quantities and the append-only movement ledger.
#[derive(Clone)]
pub struct InventoryService {
    db: Arc<DbPool>,
    audit: AuditRecorder,
}

impl InventoryService {
    pub fn new(db: Arc<DbPool>, audit: AuditRecorder) -> Self {
        Self { db, audit }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_item(
        &self,
        request: CreateInventoryItemRequest,
        user_id: Option<Uuid>,
    ) -> ServiceResult<inventory_item::Model> {
        request.validate()?;
        money::require_non_negative("cost_price", request.cost_price)?;
        money::require_non_negative("sell_price", request.sell_price)?;

        let id = Uuid::new_v4();
        let sku = match request.sku {
            Some(sku) if !sku.is_empty() => sku,
            _ => format!("SKU-{}", &id.simple().to_string()[..8].to_uppercase()),
        };
        let now = Utc::now();

        let item = inventory_item::ActiveModel {
            id: Set(id),
            sku: Set(sku),
            name: Set(request.name),
            description: Set(request.description),
            quantity: Set(request.quantity),
            min_stock: Set(request.min_stock),
            cost_price: Set(money::round_money(request.cost_price)),
            sell_price: Set(money::round_money(request.sell_price)),
            location: Set(request.location),
            supplier: Set(request.supplier),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&*self.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) => {
                ServiceError::Conflict("an inventory item with this SKU already exists".to_string())
            }
            _ => ServiceError::DatabaseError(e),
        })?;

        info!(item_id = %item.id, sku = %item.sku, "inventory item created");
        self.audit.created("inventory_items", item.id, &item, user_id).await;
        Ok(item)
    }

    /// Update item attributes. A quantity correction is routed through
    /// [`Self::adjust`] so the movement log stays paired with the change.
    #[instrument(skip(self, request), fields(item_id = %item_id))]
    pub async fn update_item(
        &self,
        item_id: Uuid,
        request: UpdateInventoryItemRequest,
        user_id: Option<Uuid>,
    ) -> ServiceResult<inventory_item::Model> {
        request.validate()?;
        if let Some(price) = request.cost_price {
            money::require_non_negative("cost_price", price)?;
        }
        if let Some(price) = request.sell_price {
            money::require_non_negative("sell_price", price)?;
        }

        let item = self.get_item(item_id).await?;
        let old = item.clone();

        // Book the quantity diff first so a failed movement leaves the
        // attribute update unapplied as well.
        if let Some(target) = request.quantity {
            let delta = target - item.quantity;
            if delta != 0 {
                self.adjust(item_id, delta, Some("stock correction".to_string()), user_id)
                    .await?;
            }
        }

        let mut active: inventory_item::ActiveModel =
            self.get_item(item_id).await?.into();
        if let Some(name) = request.name {
            if name.is_empty() {
                return Err(ServiceError::ValidationError("name is required".to_string()));
            }
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(min_stock) = request.min_stock {
            active.min_stock = Set(min_stock);
        }
        if let Some(price) = request.cost_price {
            active.cost_price = Set(money::round_money(price));
        }
        if let Some(price) = request.sell_price {
            active.sell_price = Set(money::round_money(price));
        }
        if let Some(location) = request.location {
            active.location = Set(Some(location));
        }
        if let Some(supplier) = request.supplier {
            active.supplier = Set(Some(supplier));
        }
        active.updated_at = Set(Utc::now());

        let updated = active.update(&*self.db).await?;
        self.audit
            .updated("inventory_items", updated.id, &old, &updated, user_id)
            .await;
        Ok(updated)
    }

    /// Apply a stock movement in its own transaction.
    #[instrument(skip(self), fields(item_id = %item_id, direction = ?direction, quantity))]
    pub async fn apply_movement(
        &self,
        item_id: Uuid,
        direction: MovementType,
        quantity: i32,
        reference_type: Option<&str>,
        reference_id: Option<Uuid>,
        notes: Option<String>,
        user_id: Option<Uuid>,
    ) -> ServiceResult<inventory_item::Model> {
        let txn = self.db.begin().await?;
        let (item, movement) = apply_movement_in(
            &txn,
            item_id,
            direction,
            quantity,
            reference_type,
            reference_id,
            notes,
        )
        .await?;
        txn.commit().await?;

        self.audit
            .created("stock_movements", movement.id, &movement, user_id)
            .await;
        Ok(item)
    }

    /// Manual stock correction: the movement direction is taken from the
    /// sign of `delta`.
    #[instrument(skip(self), fields(item_id = %item_id, delta))]
    pub async fn adjust(
        &self,
        item_id: Uuid,
        delta: i32,
        notes: Option<String>,
        user_id: Option<Uuid>,
    ) -> ServiceResult<inventory_item::Model> {
        if delta == 0 {
            return Err(ServiceError::ValidationError(
                "adjustment delta must not be zero".to_string(),
            ));
        }
        let direction = if delta > 0 {
            MovementType::In
        } else {
            MovementType::Out
        };
        self.apply_movement(
            item_id,
            direction,
            delta.abs(),
            Some("manual"),
            None,
            notes,
            user_id,
        )
        .await
    }

    pub async fn get_item(&self, item_id: Uuid) -> ServiceResult<inventory_item::Model> {
        InventoryItemEntity::find_by_id(item_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::not_found("inventory item", item_id))
    }

    #[instrument(skip(self))]
    pub async fn list_items(
        &self,
        page: u64,
        per_page: u64,
        search: Option<String>,
    ) -> ServiceResult<(Vec<inventory_item::Model>, u64)> {
        let mut query = InventoryItemEntity::find().order_by_asc(inventory_item::Column::Name);
        if let Some(term) = search.filter(|t| !t.is_empty()) {
            let pattern = format!("%{term}%");
            query = query.filter(
                Condition::any()
                    .add(inventory_item::Column::Name.like(&pattern))
                    .add(inventory_item::Column::Sku.like(&pattern)),
            );
        }

        let paginator = query.paginate(&*self.db, per_page);
        let total = paginator.num_items().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((items, total))
    }

    /// Items at or below their low-stock threshold.
    pub async fn low_stock(&self) -> ServiceResult<Vec<inventory_item::Model>> {
        let items = InventoryItemEntity::find()
            .filter(
                Expr::col(inventory_item::Column::Quantity)
                    .lte(Expr::col(inventory_item::Column::MinStock)),
            )
            .order_by_asc(inventory_item::Column::Quantity)
            .all(&*self.db)
            .await?;
        Ok(items)
    }

    /// Movement ledger for one item, newest first.
    pub async fn movements(
        &self,
        item_id: Uuid,
        page: u64,
        per_page: u64,
    ) -> ServiceResult<(Vec<stock_movement::Model>, u64)> {
        // Surface a 404 rather than an empty ledger for unknown items.
        self.get_item(item_id).await?;

        let paginator = StockMovementEntity::find()
            .filter(stock_movement::Column::InventoryId.eq(item_id))
            .order_by_desc(stock_movement::Column::CreatedAt)
            .paginate(&*self.db, per_page);

        let total = paginator.num_items().await?;
        let movements = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((movements, total))
    }

    /// Delete an item that has never moved. Items with ledger history or
    /// job usage must be kept so the movement log stays explainable.
    #[instrument(skip(self), fields(item_id = %item_id))]
    pub async fn delete_item(&self, item_id: Uuid, user_id: Option<Uuid>) -> ServiceResult<()> {
        let item = self.get_item(item_id).await?;

        let movement_count = StockMovementEntity::find()
            .filter(stock_movement::Column::InventoryId.eq(item_id))
            .count(&*self.db)
            .await?;
        if movement_count > 0 {
            return Err(ServiceError::BusinessRule(
                "inventory item has stock movement history and cannot be deleted".to_string(),
            ));
        }

        let usage_count = job_part::Entity::find()
            .filter(job_part::Column::InventoryId.eq(item_id))
            .count(&*self.db)
            .await?;
        if usage_count > 0 {
            return Err(ServiceError::BusinessRule(
                "inventory item is referenced by job parts and cannot be deleted".to_string(),
            ));
        }

        InventoryItemEntity::delete_by_id(item_id).exec(&*self.db).await?;
        self.audit.deleted("inventory_items", item_id, &item, user_id).await;
        Ok(())
    }
}
