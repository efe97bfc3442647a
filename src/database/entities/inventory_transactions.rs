use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Append-only audit row for one stock movement.
///
/// `previous_quantity + change_quantity == new_quantity` for every row;
/// rows are never updated or deleted after insert.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "inventory_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub inventory_item_id: i32,
    pub user_id: Option<i32>,
    /// Signed delta applied to the item, in its base unit
    pub change_quantity: f64,
    pub previous_quantity: f64,
    pub new_quantity: f64,
    /// Why the stock moved: "adjustment", "counted", "received", "import_csv", ...
    pub reason: String,
    /// Which flow recorded it: "manual", "count_page", "grocery", "inventory_import", ...
    pub source: String,
    pub notes: Option<String>,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::inventory_items::Entity",
        from = "Column::InventoryItemId",
        to = "super::inventory_items::Column::Id"
    )]
    InventoryItems,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id"
    )]
    Users,
}

impl Related<super::inventory_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::InventoryItems.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
