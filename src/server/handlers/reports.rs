use axum::{extract::State, response::Json};

use crate::errors::KitchenResult;
use crate::server::app::AppState;
use crate::services::auth_service::CurrentUser;
use crate::services::reporting_service::{Analytics, Dashboard};
use crate::services::ReportingService;

pub async fn dashboard(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> KitchenResult<Json<Dashboard>> {
    let dashboard = ReportingService::new(state.db.clone()).dashboard().await?;
    Ok(Json(dashboard))
}

pub async fn analytics(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> KitchenResult<Json<Analytics>> {
    let analytics = ReportingService::new(state.db.clone()).analytics().await?;
    Ok(Json(analytics))
}
