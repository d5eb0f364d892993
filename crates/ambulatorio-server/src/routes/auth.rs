use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use ambulatorio_core::{LoginResponse, UserProfile};

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
}

async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    Ok(Json(state.core.login(&req.username, &req.password)?))
}

async fn me(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<UserProfile>> {
    Ok(Json(state.core.current_user(&caller)?))
}
