use axum::{
    extract::{Path, Query, State},
    response::Json,
};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::database::entities::production_plans;
use crate::errors::KitchenResult;
use crate::server::app::AppState;
use crate::services::auth_service::CurrentUser;
use crate::services::planning_service::{NewPlan, NewPlanItem, PlanDetail, RequirementsReport};
use crate::services::{PlanningService, ProcurementService};

#[derive(Deserialize)]
pub struct PlanListParams {
    #[serde(default)]
    pub plan_date: Option<NaiveDate>,
}

pub async fn list_plans(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<PlanListParams>,
) -> KitchenResult<Json<Vec<production_plans::Model>>> {
    let plans = PlanningService::new(state.db.clone())
        .list_plans(params.plan_date)
        .await?;
    Ok(Json(plans))
}

pub async fn create_plan(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<NewPlan>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    let id = PlanningService::new(state.db.clone())
        .create_plan(payload, user.id)
        .await?;
    Ok(Json(json!({ "id": id })))
}

/// Plan header, batches, and the full requirement/shortage report.
pub async fn get_plan(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(plan_id): Path<i32>,
) -> KitchenResult<Json<PlanDetail>> {
    let detail = PlanningService::new(state.db.clone())
        .get_plan(plan_id)
        .await?;
    Ok(Json(detail))
}

pub async fn delete_plan(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(plan_id): Path<i32>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    PlanningService::new(state.db.clone())
        .delete_plan(plan_id)
        .await?;
    Ok(Json(json!({ "ok": true })))
}

/// Requirement report alone, without the plan header and batches.
pub async fn plan_requirements(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(plan_id): Path<i32>,
) -> KitchenResult<Json<RequirementsReport>> {
    let report = PlanningService::new(state.db.clone())
        .requirements(plan_id)
        .await?;
    Ok(Json(report))
}

pub async fn add_plan_item(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(plan_id): Path<i32>,
    Json(payload): Json<NewPlanItem>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    let id = PlanningService::new(state.db.clone())
        .add_item(plan_id, payload)
        .await?;
    Ok(Json(json!({ "id": id })))
}

/// Push the plan's shortages onto a grocery list for the plan date.
pub async fn send_shortages(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(plan_id): Path<i32>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin", "manager"])?;
    let push = ProcurementService::new(state.db.clone())
        .push_shortages(plan_id, user.id)
        .await?;
    Ok(Json(json!({
        "ok": true,
        "added": push.added,
        "grocery_list_id": push.grocery_list_id,
    })))
}
