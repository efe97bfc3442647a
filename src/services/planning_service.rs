//! Production plans and the ingredient requirement aggregator.

use chrono::NaiveDate;
use indexmap::IndexMap;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::database::entities::{
    inventory_items, production_plan_items, production_plans, recipe_ingredients, recipes,
};
use crate::errors::{KitchenError, KitchenResult};
use crate::services::rounding::round3;

#[derive(Debug, Clone, Deserialize)]
pub struct NewPlan {
    #[serde(default)]
    pub plan_date: Option<NaiveDate>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewPlanItem {
    pub recipe_id: i32,
    pub target_yield_amount: f64,
}

/// Aggregated demand for one inventory item across a whole plan.
///
/// `name`, `unit`, `supplier` and `available_quantity` are snapshots of the
/// inventory item taken when the report is computed.
#[derive(Debug, Clone, Serialize)]
pub struct RequirementLine {
    pub inventory_item_id: i32,
    pub name: String,
    pub unit: String,
    pub supplier: Option<String>,
    pub required_quantity: f64,
    pub available_quantity: f64,
    pub shortage_quantity: f64,
    /// True when any contributing recipe line used a unit other than the
    /// item's base unit. The quantities are summed as-is either way.
    pub unit_mismatch: bool,
}

#[derive(Debug, Serialize)]
pub struct RequirementsReport {
    pub requirements: Vec<RequirementLine>,
    /// One entry per recipe line whose unit differs from the inventory
    /// item's base unit. Quantities are still summed as-is.
    pub unit_warnings: Vec<String>,
}

impl RequirementsReport {
    pub fn shortages(&self) -> Vec<RequirementLine> {
        self.requirements
            .iter()
            .filter(|r| r.shortage_quantity > 0.0)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct PlanItemView {
    #[serde(flatten)]
    pub item: production_plan_items::Model,
    pub recipe_name: String,
    pub yield_unit: String,
}

#[derive(Debug, Serialize)]
pub struct PlanDetail {
    pub plan: production_plans::Model,
    pub items: Vec<PlanItemView>,
    pub requirements: Vec<RequirementLine>,
    pub shortages: Vec<RequirementLine>,
    pub unit_warnings: Vec<String>,
}

pub struct PlanningService {
    db: DatabaseConnection,
}

impl PlanningService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_plans(
        &self,
        plan_date: Option<NaiveDate>,
    ) -> KitchenResult<Vec<production_plans::Model>> {
        let mut select = production_plans::Entity::find();
        if let Some(date) = plan_date {
            select = select.filter(production_plans::Column::PlanDate.eq(date));
        } else {
            select = select.order_by_desc(production_plans::Column::PlanDate);
        }
        Ok(select
            .order_by_desc(production_plans::Column::Id)
            .all(&self.db)
            .await?)
    }

    pub async fn create_plan(&self, input: NewPlan, user_id: i32) -> KitchenResult<i32> {
        let now = chrono::Utc::now();
        let plan = production_plans::ActiveModel {
            plan_date: Set(input.plan_date.unwrap_or_else(|| now.date_naive())),
            name: Set(input.name.unwrap_or_else(|| "Daily Production".to_string())),
            status: Set("draft".to_string()),
            created_by: Set(Some(user_id)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let plan = plan.insert(&self.db).await?;
        info!("Created production plan {} for {}", plan.id, plan.plan_date);
        Ok(plan.id)
    }

    pub async fn get_plan(&self, plan_id: i32) -> KitchenResult<PlanDetail> {
        let plan = self.find_plan(plan_id).await?;
        let items = self.plan_item_views(plan_id).await?;
        let report = self.requirements(plan_id).await?;
        let shortages = report.shortages();
        Ok(PlanDetail {
            plan,
            items,
            shortages,
            requirements: report.requirements,
            unit_warnings: report.unit_warnings,
        })
    }

    /// Add one batch to a plan and touch the plan's `updated_at`.
    pub async fn add_item(&self, plan_id: i32, input: NewPlanItem) -> KitchenResult<i32> {
        let plan = self.find_plan(plan_id).await?;
        if input.target_yield_amount <= 0.0 {
            return Err(KitchenError::invalid_argument(
                "Target yield must be greater than 0",
            ));
        }
        let recipe = recipes::Entity::find_by_id(input.recipe_id)
            .one(&self.db)
            .await?;
        if recipe.is_none() {
            return Err(KitchenError::invalid_argument("Invalid recipe_id"));
        }

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now();
        let item = production_plan_items::ActiveModel {
            production_plan_id: Set(plan_id),
            recipe_id: Set(input.recipe_id),
            target_yield_amount: Set(input.target_yield_amount),
            created_at: Set(now),
            ..Default::default()
        };
        let item = item.insert(&txn).await?;

        let mut plan: production_plans::ActiveModel = plan.into();
        plan.updated_at = Set(now);
        plan.update(&txn).await?;
        txn.commit().await?;
        Ok(item.id)
    }

    /// Delete a plan. Its batch rows go with it via the foreign key.
    pub async fn delete_plan(&self, plan_id: i32) -> KitchenResult<()> {
        self.find_plan(plan_id).await?;
        production_plans::Entity::delete_by_id(plan_id)
            .exec(&self.db)
            .await?;
        info!("Deleted production plan {}", plan_id);
        Ok(())
    }

    /// Compute the aggregated ingredient requirements of a plan.
    ///
    /// Every batch is scaled by `target yield / recipe yield` and its lines
    /// are summed per inventory item. Inventory snapshots come from a single
    /// read, so every line of the report reflects the same stock state.
    pub async fn requirements(&self, plan_id: i32) -> KitchenResult<RequirementsReport> {
        self.find_plan(plan_id).await?;
        let batches = production_plan_items::Entity::find()
            .filter(production_plan_items::Column::ProductionPlanId.eq(plan_id))
            .order_by_asc(production_plan_items::Column::Id)
            .all(&self.db)
            .await?;

        let recipe_ids: Vec<i32> = batches.iter().map(|b| b.recipe_id).collect();
        let recipe_map: HashMap<i32, recipes::Model> = recipes::Entity::find()
            .filter(recipes::Column::Id.is_in(recipe_ids.clone()))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();

        let mut lines_by_recipe: HashMap<i32, Vec<recipe_ingredients::Model>> = HashMap::new();
        let lines = recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::RecipeId.is_in(recipe_ids))
            .order_by_asc(recipe_ingredients::Column::Id)
            .all(&self.db)
            .await?;
        let item_ids: Vec<i32> = lines.iter().map(|l| l.inventory_item_id).collect();
        for line in lines {
            lines_by_recipe.entry(line.recipe_id).or_default().push(line);
        }

        let item_map: HashMap<i32, inventory_items::Model> = inventory_items::Entity::find()
            .filter(inventory_items::Column::Id.is_in(item_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|i| (i.id, i))
            .collect();

        let mut agg: IndexMap<i32, RequirementLine> = IndexMap::new();
        let mut unit_warnings = Vec::new();
        let mut warned: HashSet<(i32, String)> = HashSet::new();

        for batch in &batches {
            let recipe = recipe_map.get(&batch.recipe_id).ok_or_else(|| {
                KitchenError::internal(format!(
                    "Plan item {} references missing recipe {}",
                    batch.id, batch.recipe_id
                ))
            })?;
            if recipe.yield_amount <= 0.0 {
                return Err(KitchenError::invalid_state(format!(
                    "Recipe {} has a non-positive yield",
                    recipe.name
                )));
            }
            let ratio = batch.target_yield_amount / recipe.yield_amount;

            let Some(lines) = lines_by_recipe.get(&batch.recipe_id) else {
                continue;
            };
            for line in lines {
                let item = item_map.get(&line.inventory_item_id).ok_or_else(|| {
                    KitchenError::internal(format!(
                        "Recipe line {} references missing inventory item {}",
                        line.id, line.inventory_item_id
                    ))
                })?;
                let entry = agg
                    .entry(item.id)
                    .or_insert_with(|| RequirementLine {
                        inventory_item_id: item.id,
                        name: item.name.clone(),
                        unit: item.base_unit.clone(),
                        supplier: item.supplier.clone(),
                        required_quantity: 0.0,
                        available_quantity: item.current_quantity,
                        shortage_quantity: 0.0,
                        unit_mismatch: false,
                    });
                entry.required_quantity += line.quantity * ratio;

                if line.unit != item.base_unit {
                    entry.unit_mismatch = true;
                    if warned.insert((item.id, line.unit.clone())) {
                        unit_warnings.push(format!(
                            "{}: recipe '{}' uses unit '{}' but stock is tracked in '{}'",
                            item.name, recipe.name, line.unit, item.base_unit
                        ));
                    }
                }
            }
        }

        let mut requirements: Vec<RequirementLine> = agg
            .into_values()
            .map(|mut line| {
                line.required_quantity = round3(line.required_quantity);
                line.shortage_quantity =
                    round3((line.required_quantity - line.available_quantity).max(0.0));
                line
            })
            .collect();
        requirements.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(RequirementsReport {
            requirements,
            unit_warnings,
        })
    }

    /// Most recently created plan for a date, if any.
    pub async fn latest_plan_for(
        &self,
        date: NaiveDate,
    ) -> KitchenResult<Option<production_plans::Model>> {
        Ok(production_plans::Entity::find()
            .filter(production_plans::Column::PlanDate.eq(date))
            .order_by_desc(production_plans::Column::Id)
            .one(&self.db)
            .await?)
    }

    pub async fn plan_item_views(&self, plan_id: i32) -> KitchenResult<Vec<PlanItemView>> {
        let items = production_plan_items::Entity::find()
            .filter(production_plan_items::Column::ProductionPlanId.eq(plan_id))
            .order_by_asc(production_plan_items::Column::Id)
            .all(&self.db)
            .await?;

        let recipe_ids: Vec<i32> = items.iter().map(|i| i.recipe_id).collect();
        let recipe_map: HashMap<i32, recipes::Model> = recipes::Entity::find()
            .filter(recipes::Column::Id.is_in(recipe_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|r| (r.id, r))
            .collect();

        let mut views = Vec::with_capacity(items.len());
        for item in items {
            let recipe = recipe_map.get(&item.recipe_id).ok_or_else(|| {
                KitchenError::internal(format!(
                    "Plan item {} references missing recipe {}",
                    item.id, item.recipe_id
                ))
            })?;
            views.push(PlanItemView {
                recipe_name: recipe.name.clone(),
                yield_unit: recipe.yield_unit.clone(),
                item,
            });
        }
        Ok(views)
    }

    pub async fn find_plan(&self, plan_id: i32) -> KitchenResult<production_plans::Model> {
        production_plans::Entity::find_by_id(plan_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| KitchenError::not_found("Plan", plan_id))
    }
}
