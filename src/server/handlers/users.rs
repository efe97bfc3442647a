use axum::{
    extract::{Path, State},
    response::Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::errors::KitchenResult;
use crate::server::app::AppState;
use crate::services::auth_service::{CurrentUser, UserInfo, UserUpdate};
use crate::services::AuthService;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub full_name: String,
    pub password: String,
    pub role: String,
}

#[derive(Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub active: Option<bool>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

pub async fn list_users(
    State(state): State<AppState>,
    user: CurrentUser,
) -> KitchenResult<Json<Vec<UserInfo>>> {
    user.require_role(&["admin"])?;
    let users = AuthService::new(state.db.clone()).list_users().await?;
    Ok(Json(users))
}

/// Active staff for assignment dropdowns; visible to every signed-in user.
pub async fn list_staff(
    State(state): State<AppState>,
    _user: CurrentUser,
) -> KitchenResult<Json<Vec<UserInfo>>> {
    let staff = AuthService::new(state.db.clone()).list_staff().await?;
    Ok(Json(staff))
}

pub async fn create_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<CreateUserRequest>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin"])?;
    let id = AuthService::new(state.db.clone())
        .create_user(
            &payload.username,
            &payload.full_name,
            &payload.password,
            &payload.role,
        )
        .await?;
    Ok(Json(json!({ "id": id })))
}

pub async fn update_user(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(user_id): Path<i32>,
    Json(payload): Json<UpdateUserRequest>,
) -> KitchenResult<Json<Value>> {
    user.require_role(&["admin"])?;
    AuthService::new(state.db.clone())
        .update_user(
            user_id,
            UserUpdate {
                full_name: payload.full_name,
                active: payload.active,
                role: payload.role,
                password: payload.password,
            },
        )
        .await?;
    Ok(Json(json!({ "ok": true })))
}
