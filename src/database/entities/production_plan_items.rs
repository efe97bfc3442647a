use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One planned batch: a recipe scaled to `target_yield_amount` in the
/// recipe's own yield unit.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "production_plan_items")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub production_plan_id: i32,
    pub recipe_id: i32,
    pub target_yield_amount: f64,
    pub created_at: ChronoDateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::production_plans::Entity",
        from = "Column::ProductionPlanId",
        to = "super::production_plans::Column::Id"
    )]
    ProductionPlans,
    #[sea_orm(
        belongs_to = "super::recipes::Entity",
        from = "Column::RecipeId",
        to = "super::recipes::Column::Id"
    )]
    Recipes,
}

impl Related<super::production_plans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ProductionPlans.def()
    }
}

impl Related<super::recipes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Recipes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
