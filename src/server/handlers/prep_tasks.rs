use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::KitchenResult;
use crate::server::app::AppState;
use crate::services::auth_service::CurrentUser;
use crate::services::prep_service::{PrepTaskInput, PrepTaskView};
use crate::services::PrepService;

#[derive(Deserialize)]
pub struct PrepTaskParams {
    #[serde(default)]
    pub task_date: Option<NaiveDate>,
    #[serde(default)]
    pub list_type: Option<String>,
}

#[derive(Deserialize)]
pub struct StatusPatch {
    #[serde(default)]
    pub status: String,
}

pub async fn list_prep_tasks(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<PrepTaskParams>,
) -> KitchenResult<Json<Vec<PrepTaskView>>> {
    let tasks = PrepService::new(state.db.clone())
        .list(params.task_date, params.list_type.as_deref())
        .await?;
    Ok(Json(tasks))
}

pub async fn create_prep_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<PrepTaskInput>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    let id = PrepService::new(state.db.clone())
        .create(payload, user.id)
        .await?;
    Ok(Json(json!({ "id": id })))
}

pub async fn update_prep_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<i32>,
    Json(payload): Json<PrepTaskInput>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager", "prep"])?;
    PrepService::new(state.db.clone())
        .update(task_id, payload)
        .await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn patch_prep_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<i32>,
    Json(payload): Json<StatusPatch>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager", "prep"])?;
    PrepService::new(state.db.clone())
        .set_status(task_id, &payload.status)
        .await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn delete_prep_task(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(task_id): Path<i32>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager", "prep"])?;
    PrepService::new(state.db.clone()).delete(task_id).await?;
    Ok(Json(json!({ "ok": true })))
}
