//! Read-only rollups: the kitchen dashboard and the analytics page.

use chrono::NaiveDate;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use std::collections::HashMap;

use crate::database::entities::{inventory_items, inventory_transactions};
use crate::errors::KitchenResult;
use crate::services::inventory_service::InventoryService;
use crate::services::planning_service::{PlanItemView, PlanningService, RequirementLine};
use crate::services::prep_service::{PrepService, PrepTaskView};
use crate::services::recipe_service::RecipeService;

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub today: NaiveDate,
    pub prep_daily: Vec<PrepTaskView>,
    pub prep_additional: Vec<PrepTaskView>,
    /// Batches on today's newest production plan
    pub production_list: Vec<PlanItemView>,
    pub low_items: Vec<inventory_items::Model>,
    pub shortages: Vec<RequirementLine>,
}

#[derive(Debug, Serialize)]
pub struct WasteLine {
    pub name: String,
    pub waste_qty: f64,
}

#[derive(Debug, Serialize)]
pub struct LowItemLine {
    pub name: String,
    pub current_quantity: f64,
    pub reorder_threshold: f64,
}

#[derive(Debug, Serialize)]
pub struct RecipeCostLine {
    pub recipe: String,
    pub cost: f64,
    #[serde(rename = "yield")]
    pub yield_label: String,
}

#[derive(Debug, Serialize)]
pub struct Analytics {
    pub waste_summary: Vec<WasteLine>,
    pub top_low_items: Vec<LowItemLine>,
    pub recipe_cost_breakdown: Vec<RecipeCostLine>,
}

pub struct ReportingService {
    db: DatabaseConnection,
    prep: PrepService,
    planning: PlanningService,
    inventory: InventoryService,
    recipes: RecipeService,
}

impl ReportingService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            prep: PrepService::new(db.clone()),
            planning: PlanningService::new(db.clone()),
            inventory: InventoryService::new(db.clone()),
            recipes: RecipeService::new(db.clone()),
            db,
        }
    }

    pub async fn dashboard(&self) -> KitchenResult<Dashboard> {
        let today = chrono::Utc::now().date_naive();
        let prep_daily = self.prep.list(Some(today), Some("daily")).await?;
        let prep_additional = self.prep.list(Some(today), Some("additional")).await?;

        let mut production_list = Vec::new();
        let mut shortages = Vec::new();
        if let Some(plan) = self.planning.latest_plan_for(today).await? {
            production_list = self.planning.plan_item_views(plan.id).await?;
            shortages = self.planning.requirements(plan.id).await?.shortages();
        }
        let low_items = self.inventory.low_stock_items().await?;

        Ok(Dashboard {
            today,
            prep_daily,
            prep_additional,
            production_list,
            low_items,
            shortages,
        })
    }

    pub async fn analytics(&self) -> KitchenResult<Analytics> {
        Ok(Analytics {
            waste_summary: self.waste_summary().await?,
            top_low_items: self.top_low_items().await?,
            recipe_cost_breakdown: self.recipe_cost_breakdown().await?,
        })
    }

    /// Total wasted quantity per item, highest first, top ten.
    async fn waste_summary(&self) -> KitchenResult<Vec<WasteLine>> {
        let rows = inventory_transactions::Entity::find()
            .filter(inventory_transactions::Column::Reason.eq("waste"))
            .filter(inventory_transactions::Column::ChangeQuantity.lt(0.0))
            .all(&self.db)
            .await?;

        let mut wasted: HashMap<i32, f64> = HashMap::new();
        for row in &rows {
            *wasted.entry(row.inventory_item_id).or_insert(0.0) += row.change_quantity;
        }
        let names: HashMap<i32, String> = inventory_items::Entity::find()
            .filter(inventory_items::Column::Id.is_in(wasted.keys().copied().collect::<Vec<_>>()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|i| (i.id, i.name))
            .collect();

        let mut summary: Vec<WasteLine> = wasted
            .into_iter()
            .filter_map(|(item_id, total)| {
                names.get(&item_id).map(|name| WasteLine {
                    name: name.clone(),
                    waste_qty: total.abs(),
                })
            })
            .collect();
        summary.sort_by(|a, b| {
            b.waste_qty
                .total_cmp(&a.waste_qty)
                .then_with(|| a.name.cmp(&b.name))
        });
        summary.truncate(10);
        Ok(summary)
    }

    /// Items closest to (or furthest below) their reorder threshold.
    async fn top_low_items(&self) -> KitchenResult<Vec<LowItemLine>> {
        let mut items = inventory_items::Entity::find().all(&self.db).await?;
        items.sort_by(|a, b| {
            (a.current_quantity - a.reorder_threshold)
                .total_cmp(&(b.current_quantity - b.reorder_threshold))
        });
        items.truncate(10);
        Ok(items
            .into_iter()
            .map(|i| LowItemLine {
                name: i.name,
                current_quantity: i.current_quantity,
                reorder_threshold: i.reorder_threshold,
            })
            .collect())
    }

    async fn recipe_cost_breakdown(&self) -> KitchenResult<Vec<RecipeCostLine>> {
        Ok(self
            .recipes
            .list(None, None)
            .await?
            .into_iter()
            .map(|summary| RecipeCostLine {
                recipe: summary.recipe.name,
                cost: summary.cost_total,
                yield_label: format!(
                    "{} {}",
                    summary.recipe.yield_amount, summary.recipe.yield_unit
                ),
            })
            .collect())
    }
}
