use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One line on a grocery list. Lines pushed from a shortage report keep a
/// link to the inventory item so receiving them can credit stock; free-form
/// lines have no link and never touch inventory.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "grocery_list_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub grocery_list_id: i32,
    pub inventory_item_id: Option<i32>,
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub vendor: Option<String>,
    /// "needed", "ordered" or "received"
    pub status: String,
    pub from_shortage: bool,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::grocery_lists::Entity",
        from = "Column::GroceryListId",
        to = "super::grocery_lists::Column::Id"
    )]
    GroceryLists,
    #[sea_orm(
        belongs_to = "super::inventory_items::Entity",
        from = "Column::InventoryItemId",
        to = "super::inventory_items::Column::Id"
    )]
    InventoryItems,
}

impl Related<super::grocery_lists::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GroceryLists.def()
    }
}

impl Related<super::inventory_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
