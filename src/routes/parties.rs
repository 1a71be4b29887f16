//! Party routes: create, list, detail, join, lifecycle.
//!
//! Handlers translate camelCase bodies into service inputs and service rows
//! into response DTOs. All rules live in `services::party`.

use axum::extract::State;
use axum::http::StatusCode;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::routes::extract::{Json, Path, Query};
use crate::routes::response::{ApiError, ApiResult, ok, ok_with_message};
use crate::routes::stores::LocationQuery;
use crate::services::party::{
    self, JoinOutcome, MemberRole, MemberRow, NewParty, PartyDetail, PartyStatus, PartySummary, PaymentStatus,
};
use crate::state::AppState;

// =============================================================================
// REQUEST / RESPONSE TYPES
// =============================================================================

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartyBody {
    pub host_id: i64,
    pub mart_name: String,
    pub title: String,
    pub meet_time: NaiveDateTime,
    #[serde(default)]
    pub meet_place: String,
    pub max_members: i32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedParty {
    pub party_id: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartySummaryResponse {
    pub party_id: i64,
    pub mart_name: String,
    pub title: String,
    pub host_name: String,
    pub status: PartyStatus,
    pub meet_time: NaiveDateTime,
    pub current_members: i64,
    pub max_members: i32,
    pub distance: Option<f64>,
}

impl From<PartySummary> for PartySummaryResponse {
    fn from(p: PartySummary) -> Self {
        Self {
            party_id: p.id,
            mart_name: p.mart_name,
            title: p.title,
            host_name: p.host_name,
            status: p.status,
            meet_time: p.meet_time,
            current_members: p.current_members,
            max_members: p.max_members,
            distance: p.distance_km,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberResponse {
    pub user_id: i64,
    pub nickname: String,
    pub role: MemberRole,
    pub payment_status: PaymentStatus,
}

impl From<MemberRow> for MemberResponse {
    fn from(m: MemberRow) -> Self {
        Self { user_id: m.user_id, nickname: m.nickname, role: m.role, payment_status: m.payment_status }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyDetailResponse {
    pub party_id: i64,
    pub host_id: i64,
    pub mart_name: String,
    pub title: String,
    pub meet_place: String,
    pub meet_time: NaiveDateTime,
    pub status: PartyStatus,
    pub max_members: i32,
    pub members: Vec<MemberResponse>,
}

impl From<PartyDetail> for PartyDetailResponse {
    fn from(d: PartyDetail) -> Self {
        Self {
            party_id: d.id,
            host_id: d.host_id,
            mart_name: d.mart_name,
            title: d.title,
            meet_place: d.meet_place,
            meet_time: d.meet_time,
            status: d.status,
            max_members: d.max_members,
            members: d.members.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdBody {
    pub user_id: i64,
}

#[derive(Debug, Serialize)]
pub struct JoinResponse {
    pub joined: bool,
    pub role: MemberRole,
    pub message: &'static str,
}

impl From<JoinOutcome> for JoinResponse {
    fn from(outcome: JoinOutcome) -> Self {
        let message = match outcome {
            JoinOutcome::Joined(_) => "joined the party",
            JoinOutcome::AlreadyMember(_) => "already a member",
        };
        Self { joined: true, role: outcome.role(), message }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusBody {
    pub user_id: i64,
    pub status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub party_id: i64,
    pub status: PartyStatus,
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `POST /api/v1/parties`
pub async fn create_party(State(state): State<AppState>, Json(body): Json<CreatePartyBody>) -> ApiResult<CreatedParty> {
    let new = NewParty {
        host_id: body.host_id,
        mart_name: body.mart_name,
        title: body.title,
        meet_time: body.meet_time,
        meet_place: body.meet_place,
        max_members: body.max_members,
    };
    let party_id = party::create_party(&state.pool, &new).await?;
    ok(CreatedParty { party_id })
}

/// `GET /api/v1/parties?lat&lng`
pub async fn list_parties(
    State(state): State<AppState>,
    Query(query): Query<LocationQuery>,
) -> ApiResult<Vec<PartySummaryResponse>> {
    let origin = query.origin()?;
    let parties = party::list_parties(&state.pool, origin).await?;
    ok(parties.into_iter().map(Into::into).collect())
}

/// `GET /api/v1/parties/:id`
pub async fn get_party(State(state): State<AppState>, Path(party_id): Path<i64>) -> ApiResult<PartyDetailResponse> {
    ok(party::get_party_detail(&state.pool, party_id).await?.into())
}

/// `POST /api/v1/parties/:id/join`
pub async fn join_party(
    State(state): State<AppState>,
    Path(party_id): Path<i64>,
    Json(body): Json<UserIdBody>,
) -> ApiResult<JoinResponse> {
    let outcome = party::join_party(&state.pool, party_id, body.user_id).await?;
    ok(outcome.into())
}

/// `PATCH /api/v1/parties/:id/status`: host moves the party forward.
pub async fn update_status(
    State(state): State<AppState>,
    Path(party_id): Path<i64>,
    Json(body): Json<StatusBody>,
) -> ApiResult<StatusResponse> {
    let next = PartyStatus::parse(&body.status)
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, format!("unknown status: {}", body.status)))?;
    let status = party::update_status(&state.pool, party_id, body.user_id, next).await?;
    ok_with_message(StatusResponse { party_id, status }, format!("party is now {status}"))
}
