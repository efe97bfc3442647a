use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::KitchenResult;
use crate::server::app::AppState;
use crate::services::auth_service::CurrentUser;
use crate::services::recipe_service::{RecipeDetail, RecipeInput, RecipeSummary, ScaledRecipe};
use crate::services::{CatalogIoService, RecipeService};

#[derive(Deserialize)]
pub struct RecipeListParams {
    #[serde(default)]
    pub q: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct ScaleParams {
    pub target_yield: f64,
}

#[derive(Deserialize)]
pub struct CsvPayload {
    #[serde(default)]
    pub csv: String,
}

pub async fn list_recipes(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<RecipeListParams>,
) -> KitchenResult<Json<Vec<RecipeSummary>>> {
    let recipes = RecipeService::new(state.db.clone())
        .list(params.q.as_deref(), params.category.as_deref())
        .await?;
    Ok(Json(recipes))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(recipe_id): Path<i32>,
) -> KitchenResult<Json<RecipeDetail>> {
    let detail = RecipeService::new(state.db.clone()).get(recipe_id).await?;
    Ok(Json(detail))
}

pub async fn create_recipe(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<RecipeInput>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    let id = RecipeService::new(state.db.clone())
        .create(payload, user.id)
        .await?;
    Ok(Json(json!({ "id": id })))
}

pub async fn update_recipe(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(recipe_id): Path<i32>,
    Json(payload): Json<RecipeInput>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    RecipeService::new(state.db.clone())
        .update(recipe_id, payload)
        .await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(recipe_id): Path<i32>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    RecipeService::new(state.db.clone()).delete(recipe_id).await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn duplicate_recipe(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(recipe_id): Path<i32>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    let id = RecipeService::new(state.db.clone())
        .duplicate(recipe_id, user.id)
        .await?;
    Ok(Json(json!({ "id": id })))
}

pub async fn scale_recipe(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(recipe_id): Path<i32>,
    Query(params): Query<ScaleParams>,
) -> KitchenResult<Json<ScaledRecipe>> {
    let scaled = RecipeService::new(state.db.clone())
        .scale(recipe_id, params.target_yield)
        .await?;
    Ok(Json(scaled))
}

/// Batch cost at the recipe's native yield.
pub async fn recipe_cost(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(recipe_id): Path<i32>,
) -> KitchenResult<Json<Value>> {
    let cost_total = RecipeService::new(state.db.clone())
        .cost(recipe_id)
        .await?;
    Ok(Json(json!({ "recipe_id": recipe_id, "cost_total": cost_total })))
}

/// Plain-text recipe card.
pub async fn export_recipe_text(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(recipe_id): Path<i32>,
) -> KitchenResult<String> {
    RecipeService::new(state.db.clone())
        .export_text(recipe_id)
        .await
}

pub async fn export_recipes_csv(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> KitchenResult<Response> {
    let csv = CatalogIoService::new(state.db.clone())
        .export_recipes_csv()
        .await?;
    Ok(csv_download(csv, "recipes_export.csv"))
}

pub async fn import_recipes_csv(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CsvPayload>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    let imported = CatalogIoService::new(state.db.clone())
        .import_recipes_csv(&payload.csv, user.id)
        .await?;
    Ok(Json(json!({ "ok": true, "imported_recipes": imported })))
}

pub(crate) fn csv_download(csv: String, filename: &str) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", filename),
            ),
        ],
        csv,
    )
        .into_response()
}
