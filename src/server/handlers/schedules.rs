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
use crate::services::schedule_service::{ScheduleInput, ScheduleView};
use crate::services::ScheduleService;

#[derive(Deserialize)]
pub struct ScheduleParams {
    #[serde(default)]
    pub shift_date: Option<NaiveDate>,
}

pub async fn list_schedules(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<ScheduleParams>,
) -> KitchenResult<Json<Vec<ScheduleView>>> {
    let schedules = ScheduleService::new(state.db.clone())
        .list(params.shift_date)
        .await?;
    Ok(Json(schedules))
}

pub async fn create_schedule(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<ScheduleInput>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    let id = ScheduleService::new(state.db.clone())
        .create(payload, user.id)
        .await?;
    Ok(Json(json!({ "id": id })))
}

pub async fn update_schedule(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(schedule_id): Path<i32>,
    Json(payload): Json<ScheduleInput>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    ScheduleService::new(state.db.clone())
        .update(schedule_id, payload)
        .await?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn delete_schedule(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(schedule_id): Path<i32>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    ScheduleService::new(state.db.clone())
        .delete(schedule_id)
        .await?;
    Ok(Json(json!({ "ok": true })))
}
