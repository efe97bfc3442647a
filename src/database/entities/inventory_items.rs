use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Stock-keeping record for one ingredient.
///
/// `current_quantity` is never written directly by callers; every change
/// goes through the inventory service so a matching transaction row is
/// recorded and the non-negative invariant holds.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub name: String,
    pub category: String,
    /// Unit all quantity fields on this row are expressed in
    pub base_unit: String,
    pub current_quantity: f64,
    /// Target stocking level
    pub par_level: f64,
    /// At or below this level the item counts as low stock
    pub reorder_threshold: f64,
    pub cost_per_unit: f64,
    pub supplier: Option<String>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::recipe_ingredients::Entity")]
    RecipeIngredients,
    #[sea_orm(has_many = "super::inventory_transactions::Entity")]
    InventoryTransactions,
}

impl Related<super::recipe_ingredients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RecipeIngredients.def()
    }
}

impl Related<super::inventory_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
