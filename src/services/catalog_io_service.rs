//! CSV import and export for the recipe book and the inventory catalog.
//!
//! Imports run inside one transaction; a bad row aborts the whole file.

use csv::{Reader, StringRecord, Writer};
use indexmap::IndexMap;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use std::collections::HashMap;
use tracing::info;

use crate::database::entities::{inventory_items, recipe_ingredients, recipes};
use crate::errors::{KitchenError, KitchenResult};
use crate::services::inventory_service::{InventoryService, StockChange};

const RECIPE_HEADERS: [&str; 10] = [
    "recipe_name",
    "category",
    "yield_amount",
    "yield_unit",
    "portion_size",
    "instructions",
    "ingredient_name",
    "ingredient_quantity",
    "ingredient_unit",
    "ingredient_prep_note",
];

const INVENTORY_HEADERS: [&str; 8] = [
    "name",
    "category",
    "base_unit",
    "current_quantity",
    "par_level",
    "reorder_threshold",
    "cost_per_unit",
    "supplier",
];

#[derive(Debug)]
struct ImportedRecipe {
    category: String,
    yield_amount: f64,
    yield_unit: String,
    portion_size: Option<String>,
    instructions: String,
    ingredients: Vec<ImportedIngredient>,
}

#[derive(Debug)]
struct ImportedIngredient {
    item_name: String,
    quantity: f64,
    unit: Option<String>,
    prep_note: Option<String>,
}

pub struct CatalogIoService {
    db: DatabaseConnection,
}

impl CatalogIoService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn export_inventory_csv(&self) -> KitchenResult<String> {
        let items = inventory_items::Entity::find()
            .order_by_asc(inventory_items::Column::Name)
            .all(&self.db)
            .await?;

        let mut wtr = Writer::from_writer(vec![]);
        write_record(&mut wtr, &INVENTORY_HEADERS.map(String::from))?;
        for item in items {
            write_record(
                &mut wtr,
                &[
                    item.name,
                    item.category,
                    item.base_unit,
                    item.current_quantity.to_string(),
                    item.par_level.to_string(),
                    item.reorder_threshold.to_string(),
                    item.cost_per_unit.to_string(),
                    item.supplier.unwrap_or_default(),
                ],
            )?;
        }
        finish_csv(wtr)
    }

    /// Import inventory items from CSV, keyed by item name. Existing items
    /// are updated and their stock set to the imported quantity through the
    /// ledger; unknown names become new items. Returns the row count applied.
    pub async fn import_inventory_csv(&self, csv_text: &str, user_id: i32) -> KitchenResult<usize> {
        let csv_text = require_content(csv_text)?;
        let mut rdr = Reader::from_reader(csv_text.as_bytes());
        let columns = column_index(&mut rdr, &INVENTORY_HEADERS, "Invalid inventory CSV headers")?;

        let txn = self.db.begin().await?;
        let mut imported = 0;
        for record in rdr.records() {
            let record = read_record(record)?;
            let name = field(&record, &columns, "name");
            if name.is_empty() {
                continue;
            }

            let category = non_empty_or(&record, &columns, "category", "Uncategorized");
            let base_unit = non_empty_or(&record, &columns, "base_unit", "unit");
            let current_quantity = number_field(&record, &columns, "current_quantity", 0.0)?;
            if current_quantity < 0.0 {
                return Err(KitchenError::invalid_argument(format!(
                    "Negative quantity for item: {}",
                    name
                )));
            }
            let par_level = number_field(&record, &columns, "par_level", 0.0)?;
            let reorder_threshold = number_field(&record, &columns, "reorder_threshold", 0.0)?;
            let cost_per_unit = number_field(&record, &columns, "cost_per_unit", 0.0)?;
            let supplier = optional_field(&record, &columns, "supplier");

            let existing = inventory_items::Entity::find()
                .filter(inventory_items::Column::Name.eq(name))
                .one(&txn)
                .await?;
            let now = chrono::Utc::now();
            let (item_id, notes) = match existing {
                Some(item) => {
                    let mut item: inventory_items::ActiveModel = item.into();
                    item.category = Set(category);
                    item.base_unit = Set(base_unit);
                    item.par_level = Set(par_level);
                    item.reorder_threshold = Set(reorder_threshold);
                    item.cost_per_unit = Set(cost_per_unit);
                    item.supplier = Set(supplier);
                    item.updated_at = Set(now);
                    let item = item.update(&txn).await?;
                    (item.id, "CSV inventory import")
                }
                None => {
                    let item = inventory_items::ActiveModel {
                        name: Set(name.to_string()),
                        category: Set(category),
                        base_unit: Set(base_unit),
                        current_quantity: Set(0.0),
                        par_level: Set(par_level),
                        reorder_threshold: Set(reorder_threshold),
                        cost_per_unit: Set(cost_per_unit),
                        supplier: Set(supplier),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    };
                    let item = item.insert(&txn).await?;
                    (item.id, "CSV inventory import (new item)")
                }
            };

            InventoryService::apply_stock_change_on(
                &txn,
                item_id,
                StockChange::Counted(current_quantity),
                "import_csv",
                "inventory_import",
                Some(notes.to_string()),
                Some(user_id),
            )
            .await?;
            imported += 1;
        }
        txn.commit().await?;

        info!("Imported {} inventory rows from CSV", imported);
        Ok(imported)
    }

    pub async fn export_recipes_csv(&self) -> KitchenResult<String> {
        let all_recipes = recipes::Entity::find()
            .order_by_asc(recipes::Column::Name)
            .all(&self.db)
            .await?;
        let lines = recipe_ingredients::Entity::find()
            .order_by_asc(recipe_ingredients::Column::Id)
            .all(&self.db)
            .await?;
        let item_names: HashMap<i32, String> = inventory_items::Entity::find()
            .all(&self.db)
            .await?
            .into_iter()
            .map(|i| (i.id, i.name))
            .collect();

        let mut lines_by_recipe: HashMap<i32, Vec<&recipe_ingredients::Model>> = HashMap::new();
        for line in &lines {
            lines_by_recipe.entry(line.recipe_id).or_default().push(line);
        }

        let mut wtr = Writer::from_writer(vec![]);
        write_record(&mut wtr, &RECIPE_HEADERS.map(String::from))?;
        for recipe in &all_recipes {
            let head = [
                recipe.name.clone(),
                recipe.category.clone(),
                recipe.yield_amount.to_string(),
                recipe.yield_unit.clone(),
                recipe.portion_size.clone().unwrap_or_default(),
                recipe.instructions.clone(),
            ];
            match lines_by_recipe.get(&recipe.id) {
                Some(recipe_lines) => {
                    for line in recipe_lines {
                        let ingredient_name = item_names
                            .get(&line.inventory_item_id)
                            .cloned()
                            .unwrap_or_default();
                        let mut row = head.to_vec();
                        row.extend([
                            ingredient_name,
                            line.quantity.to_string(),
                            line.unit.clone(),
                            line.prep_note.clone().unwrap_or_default(),
                        ]);
                        write_record(&mut wtr, &row)?;
                    }
                }
                None => {
                    let mut row = head.to_vec();
                    row.extend([String::new(), String::new(), String::new(), String::new()]);
                    write_record(&mut wtr, &row)?;
                }
            }
        }
        finish_csv(wtr)
    }

    /// Import recipes from CSV. Rows are grouped by recipe name; repeated
    /// rows add ingredient lines. An existing recipe of the same name is
    /// replaced wholesale. Returns the number of recipes written.
    pub async fn import_recipes_csv(&self, csv_text: &str, user_id: i32) -> KitchenResult<usize> {
        let csv_text = require_content(csv_text)?;
        let mut rdr = Reader::from_reader(csv_text.as_bytes());
        let columns = column_index(&mut rdr, &RECIPE_HEADERS, "Invalid recipe CSV headers")?;

        let mut grouped: IndexMap<String, ImportedRecipe> = IndexMap::new();
        for record in rdr.records() {
            let record = read_record(record)?;
            let name = field(&record, &columns, "recipe_name");
            if name.is_empty() {
                continue;
            }

            if !grouped.contains_key(name) {
                let yield_amount = number_field(&record, &columns, "yield_amount", 1.0)?;
                if yield_amount <= 0.0 {
                    return Err(KitchenError::invalid_argument(format!(
                        "Yield amount must be greater than 0 for recipe: {}",
                        name
                    )));
                }
                grouped.insert(
                    name.to_string(),
                    ImportedRecipe {
                        category: non_empty_or(&record, &columns, "category", "prep"),
                        yield_amount,
                        yield_unit: non_empty_or(&record, &columns, "yield_unit", "unit"),
                        portion_size: optional_field(&record, &columns, "portion_size"),
                        instructions: field(&record, &columns, "instructions").to_string(),
                        ingredients: Vec::new(),
                    },
                );
            }

            let ingredient_name = field(&record, &columns, "ingredient_name");
            if !ingredient_name.is_empty() {
                let quantity = number_field(&record, &columns, "ingredient_quantity", 0.0)?;
                let unit = optional_field(&record, &columns, "ingredient_unit");
                let prep_note = optional_field(&record, &columns, "ingredient_prep_note");
                if let Some(recipe) = grouped.get_mut(name) {
                    recipe.ingredients.push(ImportedIngredient {
                        item_name: ingredient_name.to_string(),
                        quantity,
                        unit,
                        prep_note,
                    });
                }
            }
        }

        let txn = self.db.begin().await?;

        let wanted_names: Vec<String> = grouped
            .values()
            .flat_map(|r| r.ingredients.iter().map(|i| i.item_name.clone()))
            .collect();
        let known_items: HashMap<String, inventory_items::Model> = inventory_items::Entity::find()
            .filter(inventory_items::Column::Name.is_in(wanted_names))
            .all(&txn)
            .await?
            .into_iter()
            .map(|i| (i.name.clone(), i))
            .collect();

        let mut imported = 0;
        for (name, data) in &grouped {
            let now = chrono::Utc::now();
            let existing = recipes::Entity::find()
                .filter(recipes::Column::Name.eq(name))
                .one(&txn)
                .await?;
            let recipe_id = match existing {
                Some(recipe) => {
                    let recipe_id = recipe.id;
                    let mut recipe: recipes::ActiveModel = recipe.into();
                    recipe.category = Set(data.category.clone());
                    recipe.yield_amount = Set(data.yield_amount);
                    recipe.yield_unit = Set(data.yield_unit.clone());
                    recipe.portion_size = Set(data.portion_size.clone());
                    recipe.instructions = Set(data.instructions.clone());
                    recipe.updated_at = Set(now);
                    recipe.update(&txn).await?;

                    recipe_ingredients::Entity::delete_many()
                        .filter(recipe_ingredients::Column::RecipeId.eq(recipe_id))
                        .exec(&txn)
                        .await?;
                    recipe_id
                }
                None => {
                    let recipe = recipes::ActiveModel {
                        name: Set(name.clone()),
                        category: Set(data.category.clone()),
                        yield_amount: Set(data.yield_amount),
                        yield_unit: Set(data.yield_unit.clone()),
                        portion_size: Set(data.portion_size.clone()),
                        instructions: Set(data.instructions.clone()),
                        created_by: Set(Some(user_id)),
                        created_at: Set(now),
                        updated_at: Set(now),
                        ..Default::default()
                    };
                    recipe.insert(&txn).await?.id
                }
            };

            for ingredient in &data.ingredients {
                let item = known_items.get(&ingredient.item_name).ok_or_else(|| {
                    KitchenError::invalid_argument(format!(
                        "Unknown inventory item in CSV: {}",
                        ingredient.item_name
                    ))
                })?;
                let unit = ingredient
                    .unit
                    .clone()
                    .unwrap_or_else(|| item.base_unit.clone());
                let row = recipe_ingredients::ActiveModel {
                    recipe_id: Set(recipe_id),
                    inventory_item_id: Set(item.id),
                    quantity: Set(ingredient.quantity),
                    unit: Set(unit),
                    prep_note: Set(ingredient.prep_note.clone()),
                    ..Default::default()
                };
                row.insert(&txn).await?;
            }
            imported += 1;
        }
        txn.commit().await?;

        info!("Imported {} recipes from CSV", imported);
        Ok(imported)
    }
}

fn require_content(csv_text: &str) -> KitchenResult<&str> {
    let trimmed = csv_text.trim();
    if trimmed.is_empty() {
        return Err(KitchenError::invalid_argument("Missing CSV content"));
    }
    Ok(trimmed)
}

/// Map header names to column positions, requiring every expected header.
fn column_index<R: std::io::Read>(
    rdr: &mut Reader<R>,
    required: &[&str],
    error: &str,
) -> KitchenResult<HashMap<String, usize>> {
    let headers = rdr
        .headers()
        .map_err(|e| KitchenError::invalid_argument(format!("Invalid CSV: {}", e)))?;
    let columns: HashMap<String, usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (name.trim().to_string(), idx))
        .collect();
    if required.iter().any(|h| !columns.contains_key(*h)) {
        return Err(KitchenError::invalid_argument(error));
    }
    Ok(columns)
}

fn read_record(record: Result<StringRecord, csv::Error>) -> KitchenResult<StringRecord> {
    record.map_err(|e| KitchenError::invalid_argument(format!("Invalid CSV: {}", e)))
}

fn field<'r>(record: &'r StringRecord, columns: &HashMap<String, usize>, name: &str) -> &'r str {
    columns
        .get(name)
        .and_then(|idx| record.get(*idx))
        .unwrap_or("")
        .trim()
}

fn optional_field(
    record: &StringRecord,
    columns: &HashMap<String, usize>,
    name: &str,
) -> Option<String> {
    let value = field(record, columns, name);
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

fn non_empty_or(
    record: &StringRecord,
    columns: &HashMap<String, usize>,
    name: &str,
    default: &str,
) -> String {
    let value = field(record, columns, name);
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

fn number_field(
    record: &StringRecord,
    columns: &HashMap<String, usize>,
    name: &str,
    default: f64,
) -> KitchenResult<f64> {
    let raw = field(record, columns, name);
    if raw.is_empty() {
        return Ok(default);
    }
    raw.parse::<f64>().map_err(|_| {
        KitchenError::invalid_argument(format!("Invalid {} value: {}", name, raw))
    })
}

fn write_record(wtr: &mut Writer<Vec<u8>>, row: &[String]) -> KitchenResult<()> {
    wtr.write_record(row)
        .map_err(|e| KitchenError::internal(format!("CSV write failed: {}", e)))
}

fn finish_csv(wtr: Writer<Vec<u8>>) -> KitchenResult<String> {
    let data = wtr
        .into_inner()
        .map_err(|e| KitchenError::internal(format!("CSV write failed: {}", e)))?;
    String::from_utf8(data).map_err(|e| KitchenError::internal(format!("CSV write failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(headers: &[&str]) -> HashMap<String, usize> {
        headers
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.to_string(), idx))
            .collect()
    }

    #[test]
    fn header_validation_requires_every_column() {
        let mut rdr = Reader::from_reader("name,category\nTomato,produce\n".as_bytes());
        let result = column_index(&mut rdr, &INVENTORY_HEADERS, "Invalid inventory CSV headers");
        assert!(result.is_err());

        let full = INVENTORY_HEADERS.join(",");
        let mut rdr = Reader::from_reader(full.as_bytes());
        let result = column_index(&mut rdr, &INVENTORY_HEADERS, "Invalid inventory CSV headers");
        assert!(result.is_ok());
    }

    #[test]
    fn number_field_defaults_when_blank_and_rejects_garbage() {
        let columns = index_of(&["qty"]);
        let blank = StringRecord::from(vec![""]);
        assert_eq!(number_field(&blank, &columns, "qty", 1.0).unwrap(), 1.0);

        let good = StringRecord::from(vec!["2.5"]);
        assert_eq!(number_field(&good, &columns, "qty", 0.0).unwrap(), 2.5);

        let bad = StringRecord::from(vec!["two"]);
        assert!(number_field(&bad, &columns, "qty", 0.0).is_err());
    }

    #[test]
    fn missing_content_is_rejected() {
        assert!(require_content("   \n ").is_err());
        assert!(require_content("name\n").is_ok());
    }
}
