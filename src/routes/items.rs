//! Shopping list routes: proposals and votes.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::routes::extract::{Json, Path};
use crate::routes::response::{ApiResult, ok};
use crate::services::shopping::{self, ItemRow};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposeBody {
    pub user_id: i64,
    pub name: String,
    pub price: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteBody {
    pub user_id: i64,
    pub agree: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemResponse {
    pub item_id: i64,
    pub name: String,
    pub price: i64,
    pub agree_count: i64,
    pub confirmed: bool,
}

impl From<ItemRow> for ItemResponse {
    fn from(row: ItemRow) -> Self {
        Self { item_id: row.id, name: row.name, price: row.price, agree_count: row.agree_count, confirmed: row.confirmed }
    }
}

/// `GET /api/v1/parties/:id/items`
pub async fn list_items(State(state): State<AppState>, Path(party_id): Path<i64>) -> ApiResult<Vec<ItemResponse>> {
    let items = shopping::list_items(&state.pool, party_id).await?;
    ok(items.into_iter().map(Into::into).collect())
}

/// `POST /api/v1/parties/:id/items`
pub async fn propose(
    State(state): State<AppState>,
    Path(party_id): Path<i64>,
    Json(body): Json<ProposeBody>,
) -> ApiResult<ItemResponse> {
    let item =
        shopping::add_item(&state.pool, party_id, body.user_id, &body.name, body.price, state.vote_threshold()).await?;
    ok(item.into())
}

/// `POST /api/v1/parties/:id/items/:item_id/vote`
pub async fn vote(
    State(state): State<AppState>,
    Path((party_id, item_id)): Path<(i64, i64)>,
    Json(body): Json<VoteBody>,
) -> ApiResult<ItemResponse> {
    let item =
        shopping::vote(&state.pool, party_id, item_id, body.user_id, body.agree, state.vote_threshold()).await?;
    ok(item.into())
}
