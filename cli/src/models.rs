//! Wire types for the `/api/v1` payloads the CLI reads.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginInfo {
    pub user_id: i64,
    pub nickname: String,
    pub host: bool,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedParty {
    pub party_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySummary {
    pub party_id: i64,
    pub mart_name: String,
    pub title: String,
    pub host_name: String,
    pub status: String,
    pub meet_time: String,
    pub current_members: i64,
    pub max_members: i64,
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub user_id: i64,
    pub nickname: String,
    pub role: String,
    pub payment_status: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyDetail {
    pub party_id: i64,
    pub mart_name: String,
    pub title: String,
    pub meet_place: String,
    pub meet_time: String,
    pub status: String,
    pub max_members: i64,
    pub members: Vec<Member>,
}

impl PartyDetail {
    #[must_use]
    pub fn is_member(&self, user_id: i64) -> bool {
        self.members.iter().any(|m| m.user_id == user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub item_id: i64,
    pub name: String,
    pub price: i64,
    pub agree_count: i64,
    pub confirmed: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinResult {
    pub joined: bool,
    pub role: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceEntry {
    pub item_id: i64,
    pub real_price: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillLine {
    pub item_name: String,
    pub amount: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub user_id: i64,
    pub nickname: String,
    pub total_amount: i64,
    pub details: Vec<BillLine>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Store {
    pub store_id: i64,
    pub name: String,
    pub address: String,
    pub distance: f64,
}
