//! User routes: login-or-register, host badge, profile.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::routes::extract::{Json, Path};
use crate::routes::response::{ApiResult, ok};
use crate::services::user::{self, UserRow};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    pub email: String,
    pub nickname: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub user_id: i64,
    pub nickname: String,
    pub host: bool,
    pub region: Option<String>,
}

impl From<UserRow> for UserResponse {
    fn from(row: UserRow) -> Self {
        Self { user_id: row.id, nickname: row.nickname, host: row.is_host, region: row.region }
    }
}

/// `POST /api/v1/users/login`: find by email or create.
pub async fn login(State(state): State<AppState>, Json(body): Json<LoginBody>) -> ApiResult<UserResponse> {
    let row = user::login(&state.pool, &body.email, body.nickname.as_deref()).await?;
    ok(row.into())
}

/// `POST /api/v1/users/:id/host`: grant the host badge.
pub async fn promote_host(State(state): State<AppState>, Path(user_id): Path<i64>) -> ApiResult<UserResponse> {
    user::promote_host(&state.pool, user_id).await?;
    let row = user::get_user(&state.pool, user_id).await?;
    ok(row.into())
}

/// `GET /api/v1/users/:id`
pub async fn get_user(State(state): State<AppState>, Path(user_id): Path<i64>) -> ApiResult<UserResponse> {
    ok(user::get_user(&state.pool, user_id).await?.into())
}
