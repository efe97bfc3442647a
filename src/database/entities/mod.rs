pub mod roles;
pub mod users;
pub mod auth_tokens;
pub mod recipes;
pub mod recipe_ingredients;
pub mod inventory_items;
pub mod inventory_transactions;
pub mod production_plans;
pub mod production_plan_items;
pub mod grocery_lists;
pub mod grocery_list_items;
pub mod prep_tasks;
pub mod chef_schedules;
