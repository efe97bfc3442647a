use axum::{extract::State, response::Json};
use serde::Deserialize;

use crate::errors::KitchenResult;
use crate::server::app::AppState;
use crate::services::auth_service::{CurrentUser, LoginResponse};
use crate::services::AuthService;

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> KitchenResult<Json<LoginResponse>> {
    let response = AuthService::new(state.db.clone())
        .login(&payload.username, &payload.password)
        .await?;
    Ok(Json(response))
}

pub async fn me(user: CurrentUser) -> Json<CurrentUser> {
    Json(user)
}
