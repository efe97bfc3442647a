use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create roles table
        manager
            .create_table(
                Table::create()
                    .table(Roles::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Roles::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Roles::Name).string().not_null().unique_key())
                    .to_owned(),
            )
            .await?;

        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Username).string().not_null().unique_key())
                    .col(ColumnDef::new(Users::FullName).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::RoleId).integer().not_null())
                    .col(ColumnDef::new(Users::Active).boolean().not_null().default(true))
                    .col(ColumnDef::new(Users::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-users-role_id")
                            .from(Users::Table, Users::RoleId)
                            .to(Roles::Table, Roles::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create auth_tokens table
        manager
            .create_table(
                Table::create()
                    .table(AuthTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AuthTokens::Token)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AuthTokens::UserId).integer().not_null())
                    .col(ColumnDef::new(AuthTokens::ExpiresAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(AuthTokens::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-auth_tokens-user_id")
                            .from(AuthTokens::Table, AuthTokens::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create inventory_items table
        manager
            .create_table(
                Table::create()
                    .table(InventoryItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InventoryItems::Name).string().not_null().unique_key())
                    .col(ColumnDef::new(InventoryItems::Category).string().not_null())
                    .col(ColumnDef::new(InventoryItems::BaseUnit).string().not_null())
                    .col(ColumnDef::new(InventoryItems::CurrentQuantity).double().not_null().default(0.0))
                    .col(ColumnDef::new(InventoryItems::ParLevel).double().not_null().default(0.0))
                    .col(ColumnDef::new(InventoryItems::ReorderThreshold).double().not_null().default(0.0))
                    .col(ColumnDef::new(InventoryItems::CostPerUnit).double().not_null().default(0.0))
                    .col(ColumnDef::new(InventoryItems::Supplier).string())
                    .col(ColumnDef::new(InventoryItems::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(InventoryItems::UpdatedAt).timestamp_with_time_zone().not_null())
                    .to_owned(),
            )
            .await?;

        // Create inventory_transactions table
        manager
            .create_table(
                Table::create()
                    .table(InventoryTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InventoryTransactions::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InventoryTransactions::InventoryItemId).integer().not_null())
                    .col(ColumnDef::new(InventoryTransactions::UserId).integer())
                    .col(ColumnDef::new(InventoryTransactions::ChangeQuantity).double().not_null())
                    .col(ColumnDef::new(InventoryTransactions::PreviousQuantity).double().not_null())
                    .col(ColumnDef::new(InventoryTransactions::NewQuantity).double().not_null())
                    .col(ColumnDef::new(InventoryTransactions::Reason).string().not_null())
                    .col(ColumnDef::new(InventoryTransactions::Source).string().not_null())
                    .col(ColumnDef::new(InventoryTransactions::Notes).text())
                    .col(ColumnDef::new(InventoryTransactions::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory_transactions-inventory_item_id")
                            .from(InventoryTransactions::Table, InventoryTransactions::InventoryItemId)
                            .to(InventoryItems::Table, InventoryItems::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-inventory_transactions-user_id")
                            .from(InventoryTransactions::Table, InventoryTransactions::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create recipes table
        manager
            .create_table(
                Table::create()
                    .table(Recipes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Recipes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Recipes::Name).string().not_null())
                    .col(ColumnDef::new(Recipes::Category).string().not_null())
                    .col(ColumnDef::new(Recipes::YieldAmount).double().not_null())
                    .col(ColumnDef::new(Recipes::YieldUnit).string().not_null())
                    .col(ColumnDef::new(Recipes::PortionSize).string())
                    .col(ColumnDef::new(Recipes::Instructions).text().not_null())
                    .col(ColumnDef::new(Recipes::CreatedBy).integer())
                    .col(ColumnDef::new(Recipes::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(Recipes::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recipes-created_by")
                            .from(Recipes::Table, Recipes::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create recipe_ingredients table
        manager
            .create_table(
                Table::create()
                    .table(RecipeIngredients::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(RecipeIngredients::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(RecipeIngredients::RecipeId).integer().not_null())
                    .col(ColumnDef::new(RecipeIngredients::InventoryItemId).integer().not_null())
                    .col(ColumnDef::new(RecipeIngredients::Quantity).double().not_null())
                    .col(ColumnDef::new(RecipeIngredients::Unit).string().not_null())
                    .col(ColumnDef::new(RecipeIngredients::PrepNote).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recipe_ingredients-recipe_id")
                            .from(RecipeIngredients::Table, RecipeIngredients::RecipeId)
                            .to(Recipes::Table, Recipes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-recipe_ingredients-inventory_item_id")
                            .from(RecipeIngredients::Table, RecipeIngredients::InventoryItemId)
                            .to(InventoryItems::Table, InventoryItems::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create production_plans table
        manager
            .create_table(
                Table::create()
                    .table(ProductionPlans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductionPlans::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProductionPlans::PlanDate).date().not_null())
                    .col(ColumnDef::new(ProductionPlans::Name).string().not_null())
                    .col(ColumnDef::new(ProductionPlans::Status).string().not_null().default("draft"))
                    .col(ColumnDef::new(ProductionPlans::CreatedBy).integer())
                    .col(ColumnDef::new(ProductionPlans::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(ProductionPlans::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-production_plans-created_by")
                            .from(ProductionPlans::Table, ProductionPlans::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create production_plan_items table
        manager
            .create_table(
                Table::create()
                    .table(ProductionPlanItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ProductionPlanItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ProductionPlanItems::ProductionPlanId).integer().not_null())
                    .col(ColumnDef::new(ProductionPlanItems::RecipeId).integer().not_null())
                    .col(ColumnDef::new(ProductionPlanItems::TargetYieldAmount).double().not_null())
                    .col(ColumnDef::new(ProductionPlanItems::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-production_plan_items-production_plan_id")
                            .from(ProductionPlanItems::Table, ProductionPlanItems::ProductionPlanId)
                            .to(ProductionPlans::Table, ProductionPlans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-production_plan_items-recipe_id")
                            .from(ProductionPlanItems::Table, ProductionPlanItems::RecipeId)
                            .to(Recipes::Table, Recipes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create grocery_lists table
        manager
            .create_table(
                Table::create()
                    .table(GroceryLists::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroceryLists::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroceryLists::Name).string().not_null())
                    .col(ColumnDef::new(GroceryLists::ListDate).date().not_null())
                    .col(ColumnDef::new(GroceryLists::Status).string().not_null().default("open"))
                    .col(ColumnDef::new(GroceryLists::CreatedBy).integer())
                    .col(ColumnDef::new(GroceryLists::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(GroceryLists::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-grocery_lists-created_by")
                            .from(GroceryLists::Table, GroceryLists::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create grocery_list_items table
        manager
            .create_table(
                Table::create()
                    .table(GroceryListItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GroceryListItems::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(GroceryListItems::GroceryListId).integer().not_null())
                    .col(ColumnDef::new(GroceryListItems::InventoryItemId).integer())
                    .col(ColumnDef::new(GroceryListItems::Name).string().not_null())
                    .col(ColumnDef::new(GroceryListItems::Quantity).double().not_null())
                    .col(ColumnDef::new(GroceryListItems::Unit).string().not_null())
                    .col(ColumnDef::new(GroceryListItems::Vendor).string())
                    .col(ColumnDef::new(GroceryListItems::Status).string().not_null().default("needed"))
                    .col(ColumnDef::new(GroceryListItems::FromShortage).boolean().not_null().default(false))
                    .col(ColumnDef::new(GroceryListItems::CreatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-grocery_list_items-grocery_list_id")
                            .from(GroceryListItems::Table, GroceryListItems::GroceryListId)
                            .to(GroceryLists::Table, GroceryLists::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-grocery_list_items-inventory_item_id")
                            .from(GroceryListItems::Table, GroceryListItems::InventoryItemId)
                            .to(InventoryItems::Table, InventoryItems::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create prep_tasks table
        manager
            .create_table(
                Table::create()
                    .table(PrepTasks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PrepTasks::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PrepTasks::TaskDate).date().not_null())
                    .col(ColumnDef::new(PrepTasks::ListType).string().not_null())
                    .col(ColumnDef::new(PrepTasks::Title).string().not_null())
                    .col(ColumnDef::new(PrepTasks::RecipeId).integer())
                    .col(ColumnDef::new(PrepTasks::Priority).string().not_null().default("med"))
                    .col(ColumnDef::new(PrepTasks::DueTime).string())
                    .col(ColumnDef::new(PrepTasks::AssignedTo).integer())
                    .col(ColumnDef::new(PrepTasks::Status).string().not_null().default("todo"))
                    .col(ColumnDef::new(PrepTasks::Notes).text())
                    .col(ColumnDef::new(PrepTasks::CreatedBy).integer())
                    .col(ColumnDef::new(PrepTasks::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(PrepTasks::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-prep_tasks-recipe_id")
                            .from(PrepTasks::Table, PrepTasks::RecipeId)
                            .to(Recipes::Table, Recipes::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-prep_tasks-assigned_to")
                            .from(PrepTasks::Table, PrepTasks::AssignedTo)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-prep_tasks-created_by")
                            .from(PrepTasks::Table, PrepTasks::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create chef_schedules table
        manager
            .create_table(
                Table::create()
                    .table(ChefSchedules::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ChefSchedules::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ChefSchedules::UserId).integer().not_null())
                    .col(ColumnDef::new(ChefSchedules::ShiftDate).date().not_null())
                    .col(ColumnDef::new(ChefSchedules::StartTime).string().not_null())
                    .col(ColumnDef::new(ChefSchedules::EndTime).string().not_null())
                    .col(ColumnDef::new(ChefSchedules::Station).string())
                    .col(ColumnDef::new(ChefSchedules::Notes).text())
                    .col(ColumnDef::new(ChefSchedules::Status).string().not_null().default("scheduled"))
                    .col(ColumnDef::new(ChefSchedules::CreatedBy).integer())
                    .col(ColumnDef::new(ChefSchedules::CreatedAt).timestamp_with_time_zone().not_null())
                    .col(ColumnDef::new(ChefSchedules::UpdatedAt).timestamp_with_time_zone().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-chef_schedules-user_id")
                            .from(ChefSchedules::Table, ChefSchedules::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-chef_schedules-created_by")
                            .from(ChefSchedules::Table, ChefSchedules::CreatedBy)
                            .to(Users::Table, Users::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Create indexes for the hot lookup paths
        manager
            .create_index(
                Index::create()
                    .name("idx-auth_tokens-user_id")
                    .table(AuthTokens::Table)
                    .col(AuthTokens::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-recipe_ingredients-recipe_id")
                    .table(RecipeIngredients::Table)
                    .col(RecipeIngredients::RecipeId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-inventory_transactions-inventory_item_id")
                    .table(InventoryTransactions::Table)
                    .col(InventoryTransactions::InventoryItemId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-production_plan_items-production_plan_id")
                    .table(ProductionPlanItems::Table)
                    .col(ProductionPlanItems::ProductionPlanId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-grocery_list_items-grocery_list_id")
                    .table(GroceryListItems::Table)
                    .col(GroceryListItems::GroceryListId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-prep_tasks-task_date")
                    .table(PrepTasks::Table)
                    .col(PrepTasks::TaskDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-chef_schedules-shift_date")
                    .table(ChefSchedules::Table)
                    .col(ChefSchedules::ShiftDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop indexes
        manager
            .drop_index(Index::drop().name("idx-chef_schedules-shift_date").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx-prep_tasks-task_date").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx-grocery_list_items-grocery_list_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx-production_plan_items-production_plan_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx-inventory_transactions-inventory_item_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx-recipe_ingredients-recipe_id").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx-auth_tokens-user_id").to_owned())
            .await?;

        // Drop tables in reverse dependency order
        manager
            .drop_table(Table::drop().table(ChefSchedules::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PrepTasks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroceryListItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GroceryLists::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductionPlanItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProductionPlans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(RecipeIngredients::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Recipes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InventoryTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InventoryItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AuthTokens::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Roles::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(Iden)]
enum Roles {
    Table,
    Id,
    Name,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Username,
    FullName,
    PasswordHash,
    RoleId,
    Active,
    CreatedAt,
}

#[derive(Iden)]
enum AuthTokens {
    Table,
    Token,
    UserId,
    ExpiresAt,
    CreatedAt,
}

#[derive(Iden)]
enum InventoryItems {
    Table,
    Id,
    Name,
    Category,
    BaseUnit,
    CurrentQuantity,
    ParLevel,
    ReorderThreshold,
    CostPerUnit,
    Supplier,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum InventoryTransactions {
    Table,
    Id,
    InventoryItemId,
    UserId,
    ChangeQuantity,
    PreviousQuantity,
    NewQuantity,
    Reason,
    Source,
    Notes,
    CreatedAt,
}

#[derive(Iden)]
enum Recipes {
    Table,
    Id,
    Name,
    Category,
    YieldAmount,
    YieldUnit,
    PortionSize,
    Instructions,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum RecipeIngredients {
    Table,
    Id,
    RecipeId,
    InventoryItemId,
    Quantity,
    Unit,
    PrepNote,
}

#[derive(Iden)]
enum ProductionPlans {
    Table,
    Id,
    PlanDate,
    Name,
    Status,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ProductionPlanItems {
    Table,
    Id,
    ProductionPlanId,
    RecipeId,
    TargetYieldAmount,
    CreatedAt,
}

#[derive(Iden)]
enum GroceryLists {
    Table,
    Id,
    Name,
    ListDate,
    Status,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum GroceryListItems {
    Table,
    Id,
    GroceryListId,
    InventoryItemId,
    Name,
    Quantity,
    Unit,
    Vendor,
    Status,
    FromShortage,
    CreatedAt,
}

#[derive(Iden)]
enum PrepTasks {
    Table,
    Id,
    TaskDate,
    ListType,
    Title,
    RecipeId,
    Priority,
    DueTime,
    AssignedTo,
    Status,
    Notes,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ChefSchedules {
    Table,
    Id,
    UserId,
    ShiftDate,
    StartTime,
    EndTime,
    Station,
    Notes,
    Status,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
}
