use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm::sea_query::{Condition, Expr};
use serde::{Deserialize, Serialize};

use crate::database::entities::{inventory_items, inventory_transactions, users};
use crate::errors::{KitchenError, KitchenResult};
use crate::services::rounding::round3;

/// One stock movement, expressed either as a signed delta or as an
/// absolute counted quantity from which the delta is derived.
#[derive(Clone, Copy, Debug)]
pub enum StockChange {
    Delta(f64),
    Counted(f64),
}

#[derive(Debug, Deserialize)]
pub struct NewInventoryItem {
    pub name: String,
    pub category: String,
    pub base_unit: String,
    #[serde(default)]
    pub current_quantity: f64,
    #[serde(default)]
    pub par_level: f64,
    #[serde(default)]
    pub reorder_threshold: f64,
    #[serde(default)]
    pub cost_per_unit: f64,
    #[serde(default)]
    pub supplier: Option<String>,
}

/// Descriptive fields only. `current_quantity` is deliberately absent;
/// stock moves exclusively through the ledger.
#[derive(Debug, Deserialize)]
pub struct InventoryItemUpdate {
    pub name: String,
    pub category: String,
    pub base_unit: String,
    #[serde(default)]
    pub par_level: f64,
    #[serde(default)]
    pub reorder_threshold: f64,
    #[serde(default)]
    pub cost_per_unit: f64,
    #[serde(default)]
    pub supplier: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CountRow {
    pub id: i32,
    pub current_quantity: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TransactionView {
    #[serde(flatten)]
    pub transaction: inventory_transactions::Model,
    pub item_name: String,
    pub user_name: Option<String>,
}

pub struct InventoryService {
    db: DatabaseConnection,
}

impl InventoryService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_items(&self, query: Option<&str>) -> KitchenResult<Vec<inventory_items::Model>> {
        let mut select = inventory_items::Entity::find();
        if let Some(q) = query {
            select = select.filter(inventory_items::Column::Name.contains(q));
        }
        Ok(select
            .order_by_asc(inventory_items::Column::Name)
            .all(&self.db)
            .await?)
    }

    pub async fn get_item(&self, item_id: i32) -> KitchenResult<inventory_items::Model> {
        inventory_items::Entity::find_by_id(item_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| KitchenError::not_found("Item", item_id))
    }

    pub async fn create_item(&self, item: NewInventoryItem) -> KitchenResult<i32> {
        if item.name.trim().is_empty() {
            return Err(KitchenError::invalid_argument("Item name is required"));
        }
        if item.current_quantity < 0.0 {
            return Err(KitchenError::invalid_argument(
                "Starting quantity cannot be negative",
            ));
        }
        let existing = inventory_items::Entity::find()
            .filter(inventory_items::Column::Name.eq(item.name.trim()))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(KitchenError::invalid_argument("Item name already exists"));
        }

        let now = Utc::now();
        let model = inventory_items::ActiveModel {
            name: Set(item.name.trim().to_string()),
            category: Set(item.category),
            base_unit: Set(item.base_unit),
            current_quantity: Set(item.current_quantity),
            par_level: Set(item.par_level),
            reorder_threshold: Set(item.reorder_threshold),
            cost_per_unit: Set(item.cost_per_unit),
            supplier: Set(item.supplier),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let result = inventory_items::Entity::insert(model).exec(&self.db).await?;
        Ok(result.last_insert_id)
    }

    pub async fn update_item(&self, item_id: i32, update: InventoryItemUpdate) -> KitchenResult<()> {
        let item = self.get_item(item_id).await?;

        let mut item: inventory_items::ActiveModel = item.into();
        item.name = Set(update.name);
        item.category = Set(update.category);
        item.base_unit = Set(update.base_unit);
        item.par_level = Set(update.par_level);
        item.reorder_threshold = Set(update.reorder_threshold);
        item.cost_per_unit = Set(update.cost_per_unit);
        item.supplier = Set(update.supplier);
        item.updated_at = Set(Utc::now());
        item.update(&self.db).await?;
        Ok(())
    }

    /// Items at or below their reorder threshold or par level, lowest
    /// stock first.
    pub async fn low_stock_items(&self) -> KitchenResult<Vec<inventory_items::Model>> {
        Ok(inventory_items::Entity::find()
            .filter(
                Condition::any()
                    .add(
                        Expr::col(inventory_items::Column::CurrentQuantity)
                            .lte(Expr::col(inventory_items::Column::ReorderThreshold)),
                    )
                    .add(
                        Expr::col(inventory_items::Column::CurrentQuantity)
                            .lte(Expr::col(inventory_items::Column::ParLevel)),
                    ),
            )
            .order_by_asc(inventory_items::Column::CurrentQuantity)
            .all(&self.db)
            .await?)
    }

    /// Apply one stock movement atomically: the item's quantity and its
    /// ledger row commit together or not at all.
    ///
    /// Returns the item's new quantity. Fails with `InvalidState` if the
    /// movement would leave the quantity negative; nothing is written in
    /// that case.
    pub async fn apply_stock_change(
        &self,
        item_id: i32,
        change: StockChange,
        reason: &str,
        source: &str,
        notes: Option<String>,
        user_id: Option<i32>,
    ) -> KitchenResult<f64> {
        let txn = self.db.begin().await?;
        let new_quantity =
            Self::apply_stock_change_on(&txn, item_id, change, reason, source, notes, user_id)
                .await?;
        txn.commit().await?;
        Ok(new_quantity)
    }

    /// Ledger primitive against an already-open connection, for callers
    /// that bundle the movement with other writes in one transaction.
    pub(crate) async fn apply_stock_change_on<C: ConnectionTrait>(
        conn: &C,
        item_id: i32,
        change: StockChange,
        reason: &str,
        source: &str,
        notes: Option<String>,
        user_id: Option<i32>,
    ) -> KitchenResult<f64> {
        let item = inventory_items::Entity::find_by_id(item_id)
            .one(conn)
            .await?
            .ok_or_else(|| KitchenError::not_found("Item", item_id))?;

        let previous = item.current_quantity;
        let (change_quantity, new_quantity) = match change {
            StockChange::Delta(delta) => (delta, round3(previous + delta)),
            StockChange::Counted(counted) => (round3(counted - previous), counted),
        };

        if new_quantity < 0.0 {
            return Err(KitchenError::invalid_state(
                "Resulting quantity cannot be negative",
            ));
        }

        let now = Utc::now();
        let mut item: inventory_items::ActiveModel = item.into();
        item.current_quantity = Set(new_quantity);
        item.updated_at = Set(now);
        item.update(conn).await?;

        let ledger_row = inventory_transactions::ActiveModel {
            inventory_item_id: Set(item_id),
            user_id: Set(user_id),
            change_quantity: Set(change_quantity),
            previous_quantity: Set(previous),
            new_quantity: Set(new_quantity),
            reason: Set(reason.to_string()),
            source: Set(source.to_string()),
            notes: Set(notes),
            created_at: Set(now),
            ..Default::default()
        };
        inventory_transactions::Entity::insert(ledger_row)
            .exec(conn)
            .await?;

        Ok(new_quantity)
    }

    /// Reconcile a physical count. Counted quantities are validated
    /// before anything is written; unknown item ids are skipped. Returns
    /// how many items were actually updated.
    pub async fn apply_count(&self, rows: Vec<CountRow>, user_id: Option<i32>) -> KitchenResult<usize> {
        for row in &rows {
            if row.current_quantity < 0.0 {
                return Err(KitchenError::invalid_argument(format!(
                    "Counted quantity for item {} cannot be negative",
                    row.id
                )));
            }
        }

        let mut applied = 0;
        for row in rows {
            let result = self
                .apply_stock_change(
                    row.id,
                    StockChange::Counted(row.current_quantity),
                    "counted",
                    "count_page",
                    row.notes,
                    user_id,
                )
                .await;
            match result {
                Ok(_) => applied += 1,
                Err(err) if err.is_not_found() => continue,
                Err(err) => return Err(err),
            }
        }
        Ok(applied)
    }

    /// Most recent ledger rows with item and actor names attached.
    pub async fn list_transactions(&self, limit: u64) -> KitchenResult<Vec<TransactionView>> {
        let transactions = inventory_transactions::Entity::find()
            .order_by_desc(inventory_transactions::Column::Id)
            .limit(limit)
            .all(&self.db)
            .await?;

        let item_ids: Vec<i32> = transactions.iter().map(|t| t.inventory_item_id).collect();
        let user_ids: Vec<i32> = transactions.iter().filter_map(|t| t.user_id).collect();

        let item_names: HashMap<i32, String> = inventory_items::Entity::find()
            .filter(inventory_items::Column::Id.is_in(item_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|i| (i.id, i.name))
            .collect();
        let user_names: HashMap<i32, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|u| (u.id, u.full_name))
            .collect();

        Ok(transactions
            .into_iter()
            .map(|t| {
                let item_name = item_names
                    .get(&t.inventory_item_id)
                    .cloned()
                    .unwrap_or_default();
                let user_name = t.user_id.and_then(|id| user_names.get(&id).cloned());
                TransactionView {
                    transaction: t,
                    item_name,
                    user_name,
                }
            })
            .collect())
    }
}
