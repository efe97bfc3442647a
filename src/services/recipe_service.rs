//! Recipe catalog with ingredient resolution, costing, and batch scaling.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::database::entities::{inventory_items, recipe_ingredients, recipes};
use crate::errors::{KitchenError, KitchenResult};
use crate::services::rounding::{round2, round3};

#[derive(Debug, Clone, Deserialize)]
pub struct RecipeInput {
    pub name: String,
    pub category: String,
    pub yield_amount: f64,
    pub yield_unit: String,
    #[serde(default)]
    pub portion_size: Option<String>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub ingredients: Vec<IngredientInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IngredientInput {
    pub inventory_item_id: i32,
    pub quantity: f64,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub prep_note: Option<String>,
}

/// A recipe line joined with the inventory item it draws from.
#[derive(Debug, Clone, Serialize)]
pub struct IngredientLine {
    pub id: i32,
    pub recipe_id: i32,
    pub inventory_item_id: i32,
    pub quantity: f64,
    pub unit: String,
    pub prep_note: Option<String>,
    pub ingredient_name: String,
    pub cost_per_unit: f64,
}

#[derive(Debug, Serialize)]
pub struct RecipeSummary {
    #[serde(flatten)]
    pub recipe: recipes::Model,
    pub cost_total: f64,
}

#[derive(Debug, Serialize)]
pub struct RecipeDetail {
    #[serde(flatten)]
    pub recipe: recipes::Model,
    pub ingredients: Vec<IngredientLine>,
    pub cost_total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScaledIngredient {
    pub ingredient: String,
    pub quantity: f64,
    pub unit: String,
    pub prep_note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ScaledRecipe {
    pub recipe_id: i32,
    pub recipe_name: String,
    pub target_yield: f64,
    pub yield_unit: String,
    pub ratio: f64,
    pub scaled_ingredients: Vec<ScaledIngredient>,
}

pub struct RecipeService {
    db: DatabaseConnection,
}

impl RecipeService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// List recipes with an optional name search and exact category filter,
    /// each carrying its total ingredient cost.
    pub async fn list(
        &self,
        query: Option<&str>,
        category: Option<&str>,
    ) -> KitchenResult<Vec<RecipeSummary>> {
        let mut select = recipes::Entity::find();
        if let Some(q) = query {
            select = select.filter(recipes::Column::Name.contains(q));
        }
        if let Some(cat) = category {
            select = select.filter(recipes::Column::Category.eq(cat));
        }
        let found = select
            .order_by_asc(recipes::Column::Name)
            .all(&self.db)
            .await?;

        let recipe_ids: Vec<i32> = found.iter().map(|r| r.id).collect();
        let lines = recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::RecipeId.is_in(recipe_ids))
            .all(&self.db)
            .await?;
        let costs = self.item_costs(&self.db, &lines).await?;

        let mut totals: HashMap<i32, f64> = HashMap::new();
        for line in &lines {
            let unit_cost = costs.get(&line.inventory_item_id).copied().unwrap_or(0.0);
            *totals.entry(line.recipe_id).or_insert(0.0) += line.quantity * unit_cost;
        }

        Ok(found
            .into_iter()
            .map(|recipe| {
                let cost_total = round2(totals.get(&recipe.id).copied().unwrap_or(0.0));
                RecipeSummary { recipe, cost_total }
            })
            .collect())
    }

    pub async fn get(&self, recipe_id: i32) -> KitchenResult<RecipeDetail> {
        let recipe = self.find_recipe(recipe_id).await?;
        let ingredients = self.load_lines(recipe_id).await?;
        let cost_total = lines_cost(&ingredients);
        Ok(RecipeDetail {
            recipe,
            ingredients,
            cost_total,
        })
    }

    /// Resolve a recipe into its ingredient lines, in authoring order, each
    /// joined with the inventory item's name and unit cost.
    pub async fn resolve_ingredients(&self, recipe_id: i32) -> KitchenResult<Vec<IngredientLine>> {
        self.find_recipe(recipe_id).await?;
        self.load_lines(recipe_id).await
    }

    /// Total ingredient cost of one batch at the recipe's native yield.
    pub async fn cost(&self, recipe_id: i32) -> KitchenResult<f64> {
        let lines = self.resolve_ingredients(recipe_id).await?;
        Ok(lines_cost(&lines))
    }

    pub async fn create(&self, input: RecipeInput, user_id: i32) -> KitchenResult<i32> {
        validate_recipe_input(&input)?;

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now();
        let recipe = recipes::ActiveModel {
            name: Set(input.name.clone()),
            category: Set(input.category),
            yield_amount: Set(input.yield_amount),
            yield_unit: Set(input.yield_unit),
            portion_size: Set(input.portion_size),
            instructions: Set(input.instructions),
            created_by: Set(Some(user_id)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let recipe = recipe.insert(&txn).await?;
        insert_lines(&txn, recipe.id, &input.ingredients).await?;
        txn.commit().await?;

        info!("Created recipe {} ({})", recipe.id, input.name);
        Ok(recipe.id)
    }

    /// Replace a recipe's fields and its entire ingredient list.
    pub async fn update(&self, recipe_id: i32, input: RecipeInput) -> KitchenResult<()> {
        validate_recipe_input(&input)?;
        let recipe = self.find_recipe(recipe_id).await?;

        let txn = self.db.begin().await?;
        let mut recipe: recipes::ActiveModel = recipe.into();
        recipe.name = Set(input.name);
        recipe.category = Set(input.category);
        recipe.yield_amount = Set(input.yield_amount);
        recipe.yield_unit = Set(input.yield_unit);
        recipe.portion_size = Set(input.portion_size);
        recipe.instructions = Set(input.instructions);
        recipe.updated_at = Set(chrono::Utc::now());
        recipe.update(&txn).await?;

        recipe_ingredients::Entity::delete_many()
            .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
            .exec(&txn)
            .await?;
        insert_lines(&txn, recipe_id, &input.ingredients).await?;
        txn.commit().await?;
        Ok(())
    }

    pub async fn delete(&self, recipe_id: i32) -> KitchenResult<()> {
        self.find_recipe(recipe_id).await?;
        recipes::Entity::delete_by_id(recipe_id)
            .exec(&self.db)
            .await?;
        Ok(())
    }

    /// Copy a recipe and its ingredient lines under the name "{name} (Copy)".
    pub async fn duplicate(&self, recipe_id: i32, user_id: i32) -> KitchenResult<i32> {
        let recipe = self.find_recipe(recipe_id).await?;
        let lines = self.load_lines(recipe_id).await?;

        let txn = self.db.begin().await?;
        let now = chrono::Utc::now();
        let copy = recipes::ActiveModel {
            name: Set(format!("{} (Copy)", recipe.name)),
            category: Set(recipe.category),
            yield_amount: Set(recipe.yield_amount),
            yield_unit: Set(recipe.yield_unit),
            portion_size: Set(recipe.portion_size),
            instructions: Set(recipe.instructions),
            created_by: Set(Some(user_id)),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        let copy = copy.insert(&txn).await?;
        for line in &lines {
            let row = recipe_ingredients::ActiveModel {
                recipe_id: Set(copy.id),
                inventory_item_id: Set(line.inventory_item_id),
                quantity: Set(line.quantity),
                unit: Set(line.unit.clone()),
                prep_note: Set(line.prep_note.clone()),
                ..Default::default()
            };
            row.insert(&txn).await?;
        }
        txn.commit().await?;
        Ok(copy.id)
    }

    /// Scale a recipe to a target yield. Ingredient quantities are multiplied
    /// by `target / native yield` and rounded to three decimals.
    pub async fn scale(&self, recipe_id: i32, target_yield: f64) -> KitchenResult<ScaledRecipe> {
        let recipe = self.find_recipe(recipe_id).await?;
        if target_yield <= 0.0 {
            return Err(KitchenError::invalid_argument(
                "Target yield must be greater than 0",
            ));
        }
        if recipe.yield_amount <= 0.0 {
            return Err(KitchenError::invalid_argument(
                "Recipe yield must be greater than 0",
            ));
        }

        let ratio = target_yield / recipe.yield_amount;
        let scaled_ingredients = self
            .load_lines(recipe_id)
            .await?
            .into_iter()
            .map(|line| ScaledIngredient {
                ingredient: line.ingredient_name,
                quantity: round3(line.quantity * ratio),
                unit: line.unit,
                prep_note: line.prep_note,
            })
            .collect();

        Ok(ScaledRecipe {
            recipe_id,
            recipe_name: recipe.name,
            target_yield,
            yield_unit: recipe.yield_unit,
            ratio,
            scaled_ingredients,
        })
    }

    /// Render a recipe as a plain-text card for printing.
    pub async fn export_text(&self, recipe_id: i32) -> KitchenResult<String> {
        let detail = self.get(recipe_id).await?;
        let mut lines = vec![
            format!("Recipe: {}", detail.recipe.name),
            format!("Category: {}", detail.recipe.category),
            format!(
                "Yield: {} {}",
                detail.recipe.yield_amount, detail.recipe.yield_unit
            ),
            format!(
                "Portion: {}",
                detail.recipe.portion_size.as_deref().unwrap_or("-")
            ),
            format!("Cost: ${}", detail.cost_total),
            String::new(),
            "Ingredients:".to_string(),
        ];
        for ing in &detail.ingredients {
            lines.push(format!(
                "- {}: {} {} ({})",
                ing.ingredient_name,
                ing.quantity,
                ing.unit,
                ing.prep_note.as_deref().unwrap_or("-")
            ));
        }
        lines.push(String::new());
        lines.push("Instructions:".to_string());
        lines.push(detail.recipe.instructions);
        Ok(lines.join("\n"))
    }

    async fn find_recipe(&self, recipe_id: i32) -> KitchenResult<recipes::Model> {
        recipes::Entity::find_by_id(recipe_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| KitchenError::not_found("Recipe", recipe_id))
    }

    async fn load_lines(&self, recipe_id: i32) -> KitchenResult<Vec<IngredientLine>> {
        let rows = recipe_ingredients::Entity::find()
            .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
            .order_by_asc(recipe_ingredients::Column::Id)
            .all(&self.db)
            .await?;

        let items = self.load_items(&self.db, &rows).await?;
        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            let item = items.get(&row.inventory_item_id).ok_or_else(|| {
                KitchenError::internal(format!(
                    "Recipe line {} references missing inventory item {}",
                    row.id, row.inventory_item_id
                ))
            })?;
            lines.push(IngredientLine {
                id: row.id,
                recipe_id: row.recipe_id,
                inventory_item_id: row.inventory_item_id,
                quantity: row.quantity,
                unit: row.unit,
                prep_note: row.prep_note,
                ingredient_name: item.name.clone(),
                cost_per_unit: item.cost_per_unit,
            });
        }
        Ok(lines)
    }

    async fn load_items<C: ConnectionTrait>(
        &self,
        conn: &C,
        rows: &[recipe_ingredients::Model],
    ) -> KitchenResult<HashMap<i32, inventory_items::Model>> {
        let item_ids: Vec<i32> = rows.iter().map(|r| r.inventory_item_id).collect();
        let items = inventory_items::Entity::find()
            .filter(inventory_items::Column::Id.is_in(item_ids))
            .all(conn)
            .await?;
        Ok(items.into_iter().map(|i| (i.id, i)).collect())
    }

    async fn item_costs<C: ConnectionTrait>(
        &self,
        conn: &C,
        rows: &[recipe_ingredients::Model],
    ) -> KitchenResult<HashMap<i32, f64>> {
        let items = self.load_items(conn, rows).await?;
        Ok(items
            .into_iter()
            .map(|(id, item)| (id, item.cost_per_unit))
            .collect())
    }
}

fn validate_recipe_input(input: &RecipeInput) -> KitchenResult<()> {
    if input.name.trim().is_empty() {
        return Err(KitchenError::invalid_argument("Recipe name is required"));
    }
    if input.yield_amount <= 0.0 {
        return Err(KitchenError::invalid_argument(
            "Yield amount must be greater than 0",
        ));
    }
    Ok(())
}

/// Sum of quantity times unit cost over all lines, rounded to cents.
fn lines_cost(lines: &[IngredientLine]) -> f64 {
    round2(
        lines
            .iter()
            .map(|line| line.quantity * line.cost_per_unit)
            .sum(),
    )
}

async fn insert_lines(
    txn: &sea_orm::DatabaseTransaction,
    recipe_id: i32,
    inputs: &[IngredientInput],
) -> KitchenResult<()> {
    let wanted: Vec<i32> = inputs.iter().map(|i| i.inventory_item_id).collect();
    let known: HashSet<i32> = inventory_items::Entity::find()
        .filter(inventory_items::Column::Id.is_in(wanted))
        .all(txn)
        .await?
        .into_iter()
        .map(|i| i.id)
        .collect();

    for input in inputs {
        if !known.contains(&input.inventory_item_id) {
            return Err(KitchenError::invalid_argument(format!(
                "Invalid inventory item: {}",
                input.inventory_item_id
            )));
        }
        let row = recipe_ingredients::ActiveModel {
            recipe_id: Set(recipe_id),
            inventory_item_id: Set(input.inventory_item_id),
            quantity: Set(input.quantity),
            unit: Set(input.unit.clone()),
            prep_note: Set(input.prep_note.clone()),
            ..Default::default()
        };
        row.insert(txn).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(quantity: f64, cost_per_unit: f64) -> IngredientLine {
        IngredientLine {
            id: 0,
            recipe_id: 0,
            inventory_item_id: 0,
            quantity,
            unit: "kg".to_string(),
            prep_note: None,
            ingredient_name: "x".to_string(),
            cost_per_unit,
        }
    }

    #[test]
    fn cost_sums_lines_and_rounds_to_cents() {
        let lines = vec![line(6.0, 3.2), line(0.5, 1.1)];
        assert_eq!(lines_cost(&lines), 19.75);
    }

    #[test]
    fn cost_of_empty_recipe_is_zero() {
        assert_eq!(lines_cost(&[]), 0.0);
    }

    #[test]
    fn recipe_validation_rejects_blank_name_and_bad_yield() {
        let mut input = RecipeInput {
            name: "  ".to_string(),
            category: "prep".to_string(),
            yield_amount: 4.0,
            yield_unit: "L".to_string(),
            portion_size: None,
            instructions: String::new(),
            ingredients: vec![],
        };
        assert!(validate_recipe_input(&input).is_err());

        input.name = "Sauce".to_string();
        input.yield_amount = 0.0;
        assert!(validate_recipe_input(&input).is_err());

        input.yield_amount = 4.0;
        assert!(validate_recipe_input(&input).is_ok());
    }
}
