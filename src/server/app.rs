use axum::{
    routing::{delete, get, patch, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use anyhow::Result;

use super::handlers::{
    auth, grocery, health, inventory, plans, prep_tasks, recipes, reports, schedules, users,
};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
}

pub async fn create_app(db: DatabaseConnection, cors_origin: Option<&str>) -> Result<Router> {
    let state = AppState { db };

    let cors = match cors_origin {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin.parse::<axum::http::HeaderValue>()?)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
    };

    let app = Router::new()
        // Health check endpoint
        .route("/health", get(health::health_check))

        // API v1 routes
        .nest("/api/v1", api_v1_routes())

        // Add middleware
        .layer(ServiceBuilder::new().layer(cors))
        .with_state(state);

    Ok(app)
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        // Auth routes
        .route("/auth/login", post(auth::login))
        .route("/auth/me", get(auth::me))

        // User routes
        .route("/users", get(users::list_users))
        .route("/users", post(users::create_user))
        .route("/users/:id", put(users::update_user))
        .route("/staff", get(users::list_staff))

        // Recipe routes
        .route("/recipes", get(recipes::list_recipes))
        .route("/recipes", post(recipes::create_recipe))
        .route("/recipes/export-csv", get(recipes::export_recipes_csv))
        .route("/recipes/import-csv", post(recipes::import_recipes_csv))
        .route("/recipes/:id", get(recipes::get_recipe))
        .route("/recipes/:id", put(recipes::update_recipe))
        .route("/recipes/:id", delete(recipes::delete_recipe))
        .route("/recipes/:id/duplicate", post(recipes::duplicate_recipe))
        .route("/recipes/:id/scale", get(recipes::scale_recipe))
        .route("/recipes/:id/cost", get(recipes::recipe_cost))
        .route("/recipes/:id/export", get(recipes::export_recipe_text))

        // Inventory routes
        .route("/inventory", get(inventory::list_inventory))
        .route("/inventory", post(inventory::create_inventory_item))
        .route("/inventory/export-csv", get(inventory::export_inventory_csv))
        .route("/inventory/import-csv", post(inventory::import_inventory_csv))
        .route("/inventory/low-items", get(inventory::low_items))
        .route("/inventory/transactions", get(inventory::list_transactions))
        .route("/inventory/count", post(inventory::inventory_count))
        .route("/inventory/:id", put(inventory::update_inventory_item))
        .route("/inventory/:id/adjust", post(inventory::adjust_inventory))

        // Production plan routes
        .route("/production-plans", get(plans::list_plans))
        .route("/production-plans", post(plans::create_plan))
        .route("/production-plans/:id", get(plans::get_plan))
        .route("/production-plans/:id", delete(plans::delete_plan))
        .route("/production-plans/:id/items", post(plans::add_plan_item))
        .route("/production-plans/:id/requirements", get(plans::plan_requirements))
        .route("/production-plans/:id/send-shortages", post(plans::send_shortages))

        // Grocery routes
        .route("/grocery-lists", get(grocery::list_grocery_lists))
        .route("/grocery-lists", post(grocery::create_grocery_list))
        .route("/grocery-lists/:id", get(grocery::get_grocery_list))
        .route("/grocery-lists/:id/items", post(grocery::add_grocery_item))
        .route("/grocery-items/:id", put(grocery::update_grocery_item))

        // Prep task routes
        .route("/prep-tasks", get(prep_tasks::list_prep_tasks))
        .route("/prep-tasks", post(prep_tasks::create_prep_task))
        .route("/prep-tasks/:id", put(prep_tasks::update_prep_task))
        .route("/prep-tasks/:id", delete(prep_tasks::delete_prep_task))
        .route("/prep-tasks/:id/status", patch(prep_tasks::patch_prep_status))

        // Schedule routes
        .route("/schedules", get(schedules::list_schedules))
        .route("/schedules", post(schedules::create_schedule))
        .route("/schedules/:id", put(schedules::update_schedule))
        .route("/schedules/:id", delete(schedules::delete_schedule))

        // Reporting routes
        .route("/dashboard", get(reports::dashboard))
        .route("/analytics", get(reports::analytics))
}
