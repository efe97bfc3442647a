use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "production_plans")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub plan_date: ChronoDate,
    pub name: String,
    /// "draft", "confirmed" or "completed"
    pub status: String,
    pub created_by: Option<i32>,
    pub created_at: ChronoDateTimeUtc,
    pub updated_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Users,
    #[sea_orm(has_many = "super::production_plan_items::Entity")]
    ProductionPlanItems,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Users.def()
    }
}

impl Related<super::production_plan_items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductionPlanItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
