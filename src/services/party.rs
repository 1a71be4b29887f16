//! Party service: creation, listing, membership, and status lifecycle.
//!
//! DESIGN
//! ======
//! A party is a shopping trip to one store at one time. Its creator is
//! enrolled as the `HOST` member in the same transaction that inserts the
//! party; everyone else joins as `GUEST` while the party is recruiting.
//!
//! CONCURRENCY
//! ===========
//! Join and status changes lock the party row (`FOR UPDATE`) so the
//! capacity check and the member insert cannot interleave with another
//! join for the same party.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;
use sqlx::{PgExecutor, PgPool, Row};

use crate::services::store::{self, Coordinates, round_tenth};

pub const MIN_MEMBERS: i32 = 2;
pub const MAX_MEMBERS: i32 = 20;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum PartyError {
    #[error("party not found: {0}")]
    NotFound(i64),
    #[error("user not found: {0}")]
    UserNotFound(i64),
    #[error("invalid party: {0}")]
    Invalid(String),
    #[error("only the host can do that")]
    NotHost,
    #[error("party {party_id} is full ({max_members} members)")]
    Full { party_id: i64, max_members: i32 },
    #[error("party {0} is no longer recruiting")]
    NotRecruiting(i64),
    #[error("cannot move party from {from} to {to}")]
    InvalidTransition { from: PartyStatus, to: PartyStatus },
    #[error("store lookup failed: {0}")]
    Store(#[from] store::StoreError),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Party lifecycle. Statuses only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyStatus {
    Recruiting,
    Shopping,
    Settlement,
    Done,
}

impl PartyStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recruiting => "RECRUITING",
            Self::Shopping => "SHOPPING",
            Self::Settlement => "SETTLEMENT",
            Self::Done => "DONE",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "RECRUITING" => Some(Self::Recruiting),
            "SHOPPING" => Some(Self::Shopping),
            "SETTLEMENT" => Some(Self::Settlement),
            "DONE" => Some(Self::Done),
            _ => None,
        }
    }

    /// Whether a party in `self` may move to `next`.
    #[must_use]
    pub fn can_advance_to(self, next: Self) -> bool {
        next > self
    }
}

impl std::fmt::Display for PartyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MemberRole {
    Host,
    Guest,
}

impl MemberRole {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Host => "HOST",
            Self::Guest => "GUEST",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "HOST" => Some(Self::Host),
            "GUEST" => Some(Self::Guest),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Completed,
}

impl PaymentStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Completed => "COMPLETED",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "PENDING" => Some(Self::Pending),
            "COMPLETED" => Some(Self::Completed),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewParty {
    pub host_id: i64,
    pub mart_name: String,
    pub title: String,
    pub meet_time: NaiveDateTime,
    pub meet_place: String,
    pub max_members: i32,
}

/// One row of the party listing.
#[derive(Debug, Clone, PartialEq)]
pub struct PartySummary {
    pub id: i64,
    pub mart_name: String,
    pub title: String,
    pub host_name: String,
    pub status: PartyStatus,
    pub meet_time: NaiveDateTime,
    pub current_members: i64,
    pub max_members: i32,
    /// Kilometers from the caller; `None` without an origin or a known store.
    pub distance_km: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRow {
    pub user_id: i64,
    pub nickname: String,
    pub role: MemberRole,
    pub payment_status: PaymentStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PartyDetail {
    pub id: i64,
    pub host_id: i64,
    pub mart_name: String,
    pub title: String,
    pub meet_place: String,
    pub meet_time: NaiveDateTime,
    pub status: PartyStatus,
    pub max_members: i32,
    pub members: Vec<MemberRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinOutcome {
    Joined(MemberRole),
    AlreadyMember(MemberRole),
}

impl JoinOutcome {
    #[must_use]
    pub fn role(self) -> MemberRole {
        match self {
            Self::Joined(role) | Self::AlreadyMember(role) => role,
        }
    }
}

// =============================================================================
// RULES
// =============================================================================

/// Normalize and check a party before insert.
///
/// # Errors
///
/// Returns `Invalid` for blank title or store name, or a capacity outside
/// `MIN_MEMBERS..=MAX_MEMBERS`.
pub fn validate_new_party(party: &NewParty) -> Result<NewParty, PartyError> {
    let title = party.title.trim();
    let mart_name = party.mart_name.trim();
    if title.is_empty() {
        return Err(PartyError::Invalid("title is required".into()));
    }
    if mart_name.is_empty() {
        return Err(PartyError::Invalid("martName is required".into()));
    }
    if !(MIN_MEMBERS..=MAX_MEMBERS).contains(&party.max_members) {
        return Err(PartyError::Invalid(format!(
            "maxMembers must be between {MIN_MEMBERS} and {MAX_MEMBERS}"
        )));
    }

    Ok(NewParty {
        host_id: party.host_id,
        mart_name: mart_name.to_owned(),
        title: title.to_owned(),
        meet_time: party.meet_time,
        meet_place: party.meet_place.trim().to_owned(),
        max_members: party.max_members,
    })
}

/// Check whether a new guest may join.
///
/// # Errors
///
/// Returns `NotRecruiting` or `Full`.
pub fn check_joinable(party_id: i64, status: PartyStatus, current: i64, max_members: i32) -> Result<(), PartyError> {
    if status != PartyStatus::Recruiting {
        return Err(PartyError::NotRecruiting(party_id));
    }
    if current >= i64::from(max_members) {
        return Err(PartyError::Full { party_id, max_members });
    }
    Ok(())
}

/// Attach distances from `origin` and sort nearest first. Parties whose
/// store is unknown keep their relative order at the end.
pub fn apply_distances(
    parties: &mut [PartySummary],
    origin: Option<Coordinates>,
    stores: &HashMap<String, Coordinates>,
) {
    let Some(origin) = origin else {
        return;
    };

    for party in parties.iter_mut() {
        party.distance_km = stores
            .get(&party.mart_name)
            .map(|coords| round_tenth(origin.distance_km(*coords)));
    }

    parties.sort_by(|a, b| match (a.distance_km, b.distance_km) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

fn parse_status(raw: &str) -> PartyStatus {
    PartyStatus::parse(raw).unwrap_or(PartyStatus::Recruiting)
}

// =============================================================================
// CRUD
// =============================================================================

/// Create a party and enroll its host.
///
/// # Errors
///
/// Returns `Invalid` on bad input, `UserNotFound` for an unknown host.
pub async fn create_party(pool: &PgPool, party: &NewParty) -> Result<i64, PartyError> {
    let party = validate_new_party(party)?;

    let mut tx = pool.begin().await?;

    let host_exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(party.host_id)
        .fetch_one(&mut *tx)
        .await?;
    if !host_exists {
        return Err(PartyError::UserNotFound(party.host_id));
    }

    let party_id = sqlx::query_scalar::<_, i64>(
        r"INSERT INTO parties (host_id, mart_name, title, meet_time, meet_place, max_members, status)
          VALUES ($1, $2, $3, $4, $5, $6, $7)
          RETURNING id",
    )
    .bind(party.host_id)
    .bind(&party.mart_name)
    .bind(&party.title)
    .bind(party.meet_time)
    .bind(&party.meet_place)
    .bind(party.max_members)
    .bind(PartyStatus::Recruiting.as_str())
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO party_members (party_id, user_id, role) VALUES ($1, $2, $3)")
        .bind(party_id)
        .bind(party.host_id)
        .bind(MemberRole::Host.as_str())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(party_id, host_id = party.host_id, mart = %party.mart_name, "party created");
    Ok(party_id)
}

/// List parties, newest first, or nearest first when `origin` is given.
///
/// # Errors
///
/// Returns a database error if a query fails.
pub async fn list_parties(pool: &PgPool, origin: Option<Coordinates>) -> Result<Vec<PartySummary>, PartyError> {
    let rows = sqlx::query(
        r"SELECT p.id, p.mart_name, p.title, u.nickname AS host_name, p.status, p.meet_time,
                 p.max_members,
                 (SELECT COUNT(*) FROM party_members m WHERE m.party_id = p.id) AS current_members
          FROM parties p
          JOIN users u ON u.id = p.host_id
          ORDER BY p.id DESC",
    )
    .fetch_all(pool)
    .await?;

    let mut parties: Vec<PartySummary> = rows
        .iter()
        .map(|r| PartySummary {
            id: r.get("id"),
            mart_name: r.get("mart_name"),
            title: r.get("title"),
            host_name: r.get("host_name"),
            status: parse_status(r.get("status")),
            meet_time: r.get("meet_time"),
            current_members: r.get("current_members"),
            max_members: r.get("max_members"),
            distance_km: None,
        })
        .collect();

    if origin.is_some() {
        let stores = store::coordinates_by_name(pool).await?;
        apply_distances(&mut parties, origin, &stores);
    }
    Ok(parties)
}

/// Members of a party in join order.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_members<'e, E>(executor: E, party_id: i64) -> Result<Vec<MemberRow>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let rows = sqlx::query_as::<_, (i64, String, String, String)>(
        r"SELECT m.user_id, u.nickname, m.role, m.payment_status
          FROM party_members m
          JOIN users u ON u.id = m.user_id
          WHERE m.party_id = $1
          ORDER BY m.id ASC",
    )
    .bind(party_id)
    .fetch_all(executor)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(user_id, nickname, role, payment_status)| MemberRow {
            user_id,
            nickname,
            role: MemberRole::parse(&role).unwrap_or(MemberRole::Guest),
            payment_status: PaymentStatus::parse(&payment_status).unwrap_or(PaymentStatus::Pending),
        })
        .collect())
}

/// Role of `user_id` in `party_id`, if they are a member.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn member_role<'e, E>(executor: E, party_id: i64, user_id: i64) -> Result<Option<MemberRole>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    let role = sqlx::query_scalar::<_, String>("SELECT role FROM party_members WHERE party_id = $1 AND user_id = $2")
        .bind(party_id)
        .bind(user_id)
        .fetch_optional(executor)
        .await?;
    Ok(role.map(|r| MemberRole::parse(&r).unwrap_or(MemberRole::Guest)))
}

/// Whether a party exists.
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn party_exists<'e, E>(executor: E, party_id: i64) -> Result<bool, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM parties WHERE id = $1)")
        .bind(party_id)
        .fetch_one(executor)
        .await
}

/// Fetch one party with its members.
///
/// # Errors
///
/// Returns `NotFound` if the id is unknown.
pub async fn get_party_detail(pool: &PgPool, party_id: i64) -> Result<PartyDetail, PartyError> {
    let row = sqlx::query(
        r"SELECT id, host_id, mart_name, title, meet_place, meet_time, status, max_members
          FROM parties WHERE id = $1",
    )
    .bind(party_id)
    .fetch_optional(pool)
    .await?
    .ok_or(PartyError::NotFound(party_id))?;

    let members = list_members(pool, party_id).await?;

    Ok(PartyDetail {
        id: row.get("id"),
        host_id: row.get("host_id"),
        mart_name: row.get("mart_name"),
        title: row.get("title"),
        meet_place: row.get("meet_place"),
        meet_time: row.get("meet_time"),
        status: parse_status(row.get("status")),
        max_members: row.get("max_members"),
        members,
    })
}

// =============================================================================
// JOIN / STATUS
// =============================================================================

/// Join a party as a guest. Joining twice is not an error: the existing
/// role is reported back.
///
/// # Errors
///
/// Returns `NotFound`, `UserNotFound`, `NotRecruiting`, or `Full`.
pub async fn join_party(pool: &PgPool, party_id: i64, user_id: i64) -> Result<JoinOutcome, PartyError> {
    let mut tx = pool.begin().await?;

    let (status, max_members) =
        sqlx::query_as::<_, (String, i32)>("SELECT status, max_members FROM parties WHERE id = $1 FOR UPDATE")
            .bind(party_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(PartyError::NotFound(party_id))?;

    let user_exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
    if !user_exists {
        return Err(PartyError::UserNotFound(user_id));
    }

    if let Some(role) = member_role(&mut *tx, party_id, user_id).await? {
        return Ok(JoinOutcome::AlreadyMember(role));
    }

    let current = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM party_members WHERE party_id = $1")
        .bind(party_id)
        .fetch_one(&mut *tx)
        .await?;
    check_joinable(party_id, parse_status(&status), current, max_members)?;

    sqlx::query("INSERT INTO party_members (party_id, user_id, role) VALUES ($1, $2, $3)")
        .bind(party_id)
        .bind(user_id)
        .bind(MemberRole::Guest.as_str())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(party_id, user_id, members = current + 1, "party joined");
    Ok(JoinOutcome::Joined(MemberRole::Guest))
}

/// Move a party forward in its lifecycle. Host only.
///
/// # Errors
///
/// Returns `NotFound`, `NotHost`, or `InvalidTransition`.
pub async fn update_status(
    pool: &PgPool,
    party_id: i64,
    user_id: i64,
    next: PartyStatus,
) -> Result<PartyStatus, PartyError> {
    let mut tx = pool.begin().await?;

    let (host_id, status) =
        sqlx::query_as::<_, (i64, String)>("SELECT host_id, status FROM parties WHERE id = $1 FOR UPDATE")
            .bind(party_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(PartyError::NotFound(party_id))?;

    if host_id != user_id {
        return Err(PartyError::NotHost);
    }

    let current = parse_status(&status);
    if !current.can_advance_to(next) {
        return Err(PartyError::InvalidTransition { from: current, to: next });
    }

    sqlx::query("UPDATE parties SET status = $2 WHERE id = $1")
        .bind(party_id)
        .bind(next.as_str())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(party_id, from = %current, to = %next, "party status changed");
    Ok(next)
}

#[cfg(test)]
#[path = "party_test.rs"]
mod tests;
