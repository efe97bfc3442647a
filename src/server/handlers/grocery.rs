use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::entities::grocery_lists;
use crate::errors::KitchenResult;
use crate::server::app::AppState;
use crate::services::auth_service::CurrentUser;
use crate::services::procurement_service::{GroceryListDetail, NewGroceryItem, NewGroceryList};
use crate::services::ProcurementService;

#[derive(Deserialize)]
pub struct GroceryListParams {
    #[serde(default)]
    pub list_date: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct GroceryItemStatus {
    pub status: String,
}

pub async fn list_grocery_lists(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<GroceryListParams>,
) -> KitchenResult<Json<Vec<grocery_lists::Model>>> {
    let lists = ProcurementService::new(state.db.clone())
        .list_lists(params.list_date)
        .await?;
    Ok(Json(lists))
}

pub async fn create_grocery_list(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<NewGroceryList>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    let id = ProcurementService::new(state.db.clone())
        .create_list(payload, user.id)
        .await?;
    Ok(Json(json!({ "id": id })))
}

pub async fn get_grocery_list(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(list_id): Path<i32>,
) -> KitchenResult<Json<GroceryListDetail>> {
    let detail = ProcurementService::new(state.db.clone())
        .get_list(list_id)
        .await?;
    Ok(Json(detail))
}

pub async fn add_grocery_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(list_id): Path<i32>,
    Json(payload): Json<NewGroceryItem>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    let id = ProcurementService::new(state.db.clone())
        .add_item(list_id, payload)
        .await?;
    Ok(Json(json!({ "id": id })))
}

/// Change a line's status. Moving to "received" credits the linked
/// inventory item.
pub async fn update_grocery_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<i32>,
    Json(payload): Json<GroceryItemStatus>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager", "prep"])?;
    let credited = ProcurementService::new(state.db.clone())
        .update_item_status(item_id, &payload.status, user.id)
        .await?;
    Ok(Json(json!({ "ok": true, "new_quantity": credited })))
}
