//! Grocery lists: the bridge from plan shortages to purchasing and back
//! into stock on receipt.

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::database::entities::{grocery_list_items, grocery_lists, inventory_items};
use crate::errors::{KitchenError, KitchenResult};
use crate::services::inventory_service::{InventoryService, StockChange};
use crate::services::planning_service::PlanningService;

const ITEM_STATUSES: [&str; 3] = ["needed", "ordered", "received"];

#[derive(Debug, Clone, Deserialize)]
pub struct NewGroceryList {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub list_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewGroceryItem {
    #[serde(default)]
    pub inventory_item_id: Option<i32>,
    #[serde(default)]
    pub name: Option<String>,
    pub quantity: f64,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GroceryListDetail {
    pub list: grocery_lists::Model,
    pub items: Vec<grocery_list_items::Model>,
}

#[derive(Debug, Serialize)]
pub struct ShortagePush {
    pub added: usize,
    pub grocery_list_id: Option<i32>,
}

pub struct ProcurementService {
    db: DatabaseConnection,
    planning: PlanningService,
}

impl ProcurementService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            planning: PlanningService::new(db.clone()),
            db,
        }
    }

    pub async fn list_lists(
        &self,
        list_date: Option<NaiveDate>,
    ) -> KitchenResult<Vec<grocery_lists::Model>> {
        let mut select = grocery_lists::Entity::find();
        if let Some(date) = list_date {
            select = select.filter(grocery_lists::Column::ListDate.eq(date));
        } else {
            select = select.order_by_desc(grocery_lists::Column::ListDate);
        }
        Ok(select
            .order_by_desc(grocery_lists::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn create_list(&self, input: NewGroceryList, user_id: i32) -> KitchenResult<i32> {
        let now = chrono::Utc::now();
        let list_date = input.list_date.unwrap_or_else(|| now.date_naive());
        let list = grocery_lists::ActiveModel {
            name: Set(input
                .name
                .unwrap_or_else(|| format!("Purchasing {}", list_date))),
            list_date: Set(list_date),
            status: Set("open".to_string()),
            created_by: Set(Some(user_id)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let list = list.insert(&self.db).await?;
        Ok(list.id)
    }

    pub async fn get_list(&self, list_id: i32) -> KitchenResult<GroceryListDetail> {
        let list = self.find_list(list_id).await?;
        let items = grocery_list_items::Entity::find()
            .filter(grocery_list_items::Column::GroceryListId.eq(list_id))
            .order_by_asc(grocery_list_items::Column::Id)
            .all(&self.db)
            .await?;
        Ok(GroceryListDetail { list, items })
    }

    /// Add a line to a list. When the line is linked to an inventory item,
    /// missing name, unit and vendor fields are filled from that item.
    pub async fn add_item(&self, list_id: i32, input: NewGroceryItem) -> KitchenResult<i32> {
        self.find_list(list_id).await?;

        let mut name = input.name.filter(|n| !n.trim().is_empty());
        let mut unit = input.unit.filter(|u| !u.trim().is_empty());
        let mut vendor = input.vendor;
        if let Some(item_id) = input.inventory_item_id {
            if name.is_none() || unit.is_none() {
                let item = inventory_items::Entity::find_by_id(item_id)
                    .one(&self.db)
                    .await?;
                if let Some(item) = item {
                    name = name.or(Some(item.name));
                    unit = unit.or(Some(item.base_unit));
                    vendor = vendor.or(item.supplier);
                }
            }
        }
        let name =
            name.ok_or_else(|| KitchenError::invalid_argument("Item name is required"))?;

        let row = grocery_list_items::ActiveModel {
            grocery_list_id: Set(list_id),
            inventory_item_id: Set(input.inventory_item_id),
            name: Set(name),
            quantity: Set(input.quantity),
            unit: Set(unit.unwrap_or_default()),
            vendor: Set(vendor),
            status: Set("needed".to_string()),
            from_shortage: Set(false),
            created_at: Set(chrono::Utc::now()),
            ..Default::default()
        };
        let row = row.insert(&self.db).await?;
        Ok(row.id)
    }

    /// Move a grocery line to a new status. Entering "received" credits the
    /// linked inventory item by the line quantity, atomically with the status
    /// write; a line already received is never credited again.
    ///
    /// Returns the item's new stock level when a credit happened.
    pub async fn update_item_status(
        &self,
        item_id: i32,
        status: &str,
        user_id: i32,
    ) -> KitchenResult<Option<f64>> {
        if !ITEM_STATUSES.contains(&status) {
            return Err(KitchenError::invalid_argument("Invalid status"));
        }
        let line = grocery_list_items::Entity::find_by_id(item_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| KitchenError::not_found("GroceryItem", item_id))?;

        let receiving = status == "received" && line.status != "received";
        if receiving && line.inventory_item_id.is_none() {
            return Err(KitchenError::invalid_state(
                "Cannot receive into inventory without linked item",
            ));
        }

        let txn = self.db.begin().await?;
        let quantity = line.quantity;
        let linked_item = line.inventory_item_id;
        let mut line: grocery_list_items::ActiveModel = line.into();
        line.status = Set(status.to_string());
        line.update(&txn).await?;

        let mut credited = None;
        if receiving {
            if let Some(inventory_item_id) = linked_item {
                let new_quantity = InventoryService::apply_stock_change_on(
                    &txn,
                    inventory_item_id,
                    StockChange::Delta(quantity),
                    "received",
                    "grocery",
                    Some(format!("Received via grocery item {}", item_id)),
                    Some(user_id),
                )
                .await?;
                credited = Some(new_quantity);
            }
        }
        txn.commit().await?;
        Ok(credited)
    }

    /// Push a plan's shortages onto a grocery list. Reuses the newest open
    /// list for the plan date, otherwise creates one. Repeated pushes append
    /// lines again rather than merging.
    pub async fn push_shortages(&self, plan_id: i32, user_id: i32) -> KitchenResult<ShortagePush> {
        let plan = self.planning.find_plan(plan_id).await?;
        let shortages = self.planning.requirements(plan_id).await?.shortages();
        if shortages.is_empty() {
            return Ok(ShortagePush {
                added: 0,
                grocery_list_id: None,
            });
        }

        let txn = self.db.begin().await?;
        let list_id = self
            .open_list_for(&txn, plan.plan_date, user_id)
            .await?;
        let now = chrono::Utc::now();
        for shortage in &shortages {
            let row = grocery_list_items::ActiveModel {
                grocery_list_id: Set(list_id),
                inventory_item_id: Set(Some(shortage.inventory_item_id)),
                name: Set(shortage.name.clone()),
                quantity: Set(shortage.shortage_quantity),
                unit: Set(shortage.unit.clone()),
                vendor: Set(shortage.supplier.clone()),
                status: Set("needed".to_string()),
                from_shortage: Set(true),
                created_at: Set(now),
                ..Default::default()
            };
            row.insert(&txn).await?;
        }
        txn.commit().await?;

        info!(
            "Pushed {} shortage lines from plan {} to grocery list {}",
            shortages.len(),
            plan_id,
            list_id
        );
        Ok(ShortagePush {
            added: shortages.len(),
            grocery_list_id: Some(list_id),
        })
    }

    async fn open_list_for(
        &self,
        txn: &DatabaseTransaction,
        list_date: NaiveDate,
        user_id: i32,
    ) -> KitchenResult<i32> {
        let existing = grocery_lists::Entity::find()
            .filter(grocery_lists::Column::ListDate.eq(list_date))
            .filter(grocery_lists::Column::Status.eq("open"))
            .order_by_desc(grocery_lists::Column::Id)
            .one(txn)
            .await?;
        if let Some(list) = existing {
            return Ok(list.id);
        }

        let now = chrono::Utc::now();
        let list = grocery_lists::ActiveModel {
            name: Set(format!("Purchasing {}", list_date)),
            list_date: Set(list_date),
            status: Set("open".to_string()),
            created_by: Set(Some(user_id)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let list = list.insert(txn).await?;
        Ok(list.id)
    }

    async fn find_list(&self, list_id: i32) -> KitchenResult<grocery_lists::Model> {
        grocery_lists::Entity::find_by_id(list_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| KitchenError::not_found("List", list_id))
    }
}
