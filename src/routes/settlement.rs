//! Settlement routes: bill calculation and payment confirmation.

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::routes::extract::{Json, Path};
use crate::routes::parties::UserIdBody;
use crate::routes::response::{ApiResult, ok, ok_with_message};
use crate::services::settlement::{self, Bill, BillLine, PriceUpdate};
use crate::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceBody {
    pub item_id: i64,
    pub real_price: i64,
}

#[derive(Deserialize)]
pub struct SettlementBody {
    #[serde(default)]
    pub items: Vec<PriceBody>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillLineResponse {
    pub item_name: String,
    pub amount: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BillResponse {
    pub user_id: i64,
    pub nickname: String,
    pub total_amount: i64,
    pub details: Vec<BillLineResponse>,
}

impl From<BillLine> for BillLineResponse {
    fn from(line: BillLine) -> Self {
        Self { item_name: line.item_name, amount: line.amount }
    }
}

impl From<Bill> for BillResponse {
    fn from(bill: Bill) -> Self {
        Self {
            user_id: bill.user_id,
            nickname: bill.nickname,
            total_amount: bill.total_amount,
            details: bill.details.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentResponse {
    pub party_id: i64,
    pub user_id: i64,
}

/// `POST /api/v1/parties/:id/settlement`: apply real prices and split the bill.
pub async fn calculate(
    State(state): State<AppState>,
    Path(party_id): Path<i64>,
    Json(body): Json<SettlementBody>,
) -> ApiResult<Vec<BillResponse>> {
    let updates: Vec<PriceUpdate> =
        body.items.iter().map(|p| PriceUpdate { item_id: p.item_id, real_price: p.real_price }).collect();
    let bills = settlement::calculate(&state.pool, party_id, &updates).await?;
    ok(bills.into_iter().map(Into::into).collect())
}

/// `POST /api/v1/parties/:id/settlement/complete`
pub async fn complete(
    State(state): State<AppState>,
    Path(party_id): Path<i64>,
    Json(body): Json<UserIdBody>,
) -> ApiResult<PaymentResponse> {
    settlement::complete_payment(&state.pool, party_id, body.user_id).await?;
    ok_with_message(PaymentResponse { party_id, user_id: body.user_id }, "payment completed")
}
