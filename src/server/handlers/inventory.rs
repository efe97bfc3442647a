use axum::{
    extract::{Path, Query, State},
    response::{Json, Response},
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::entities::inventory_items;
use crate::errors::KitchenResult;
use crate::server::app::AppState;
use crate::services::auth_service::CurrentUser;
use crate::services::inventory_service::{
    CountRow, InventoryItemUpdate, NewInventoryItem, StockChange, TransactionView,
};
use crate::services::{CatalogIoService, InventoryService};

use super::recipes::{csv_download, CsvPayload};

#[derive(Deserialize)]
pub struct InventoryListParams {
    #[serde(default)]
    pub q: Option<String>,
}

#[derive(Deserialize)]
pub struct AdjustRequest {
    pub change_quantity: f64,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct CountRequest {
    #[serde(default)]
    pub items: Vec<CountRow>,
}

#[derive(Deserialize)]
pub struct TransactionParams {
    #[serde(default)]
    pub limit: Option<u64>,
}

pub async fn list_inventory(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<InventoryListParams>,
) -> KitchenResult<Json<Vec<inventory_items::Model>>> {
    let items = InventoryService::new(state.db.clone())
        .list_items(params.q.as_deref())
        .await?;
    Ok(Json(items))
}

pub async fn create_inventory_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<NewInventoryItem>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    let id = InventoryService::new(state.db.clone())
        .create_item(payload)
        .await?;
    Ok(Json(json!({ "id": id })))
}

/// Update descriptive fields. Stock level changes go through adjust/count.
pub async fn update_inventory_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<i32>,
    Json(payload): Json<InventoryItemUpdate>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    InventoryService::new(state.db.clone())
        .update_item(item_id, payload)
        .await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn low_items(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> KitchenResult<Json<Vec<inventory_items::Model>>> {
    let items = InventoryService::new(state.db.clone())
        .low_stock_items()
        .await?;
    Ok(Json(items))
}

pub async fn adjust_inventory(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(item_id): Path<i32>,
    Json(payload): Json<AdjustRequest>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager", "prep"])?;
    let new_quantity = InventoryService::new(state.db.clone())
        .apply_stock_change(
            item_id,
            StockChange::Delta(payload.change_quantity),
            payload.reason.as_deref().unwrap_or("adjustment"),
            payload.source.as_deref().unwrap_or("manual"),
            payload.notes,
            Some(user.id),
        )
        .await?;
    Ok(Json(json!({ "ok": true, "new_quantity": new_quantity })))
}

/// Reconcile stock against a physical count sheet.
pub async fn inventory_count(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CountRequest>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    let updated = InventoryService::new(state.db.clone())
        .apply_count(payload.items, Some(user.id))
        .await?;
    Ok(Json(json!({ "ok": true, "updated": updated })))
}

pub async fn list_transactions(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<TransactionParams>,
) -> KitchenResult<Json<Vec<TransactionView>>> {
    let transactions = InventoryService::new(state.db.clone())
        .list_transactions(params.limit.unwrap_or(200))
        .await?;
    Ok(Json(transactions))
}

pub async fn export_inventory_csv(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> KitchenResult<Response> {
    let csv = CatalogIoService::new(state.db.clone())
        .export_inventory_csv()
        .await?;
    Ok(csv_download(csv, "inventory_export.csv"))
}

pub async fn import_inventory_csv(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CsvPayload>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    let imported = CatalogIoService::new(state.db.clone())
        .import_inventory_csv(&payload.csv, user.id)
        .await?;
    Ok(Json(json!({ "ok": true, "imported_items": imported })))
}
