//! Shopping service: item proposals and agreement votes.
//!
//! DESIGN
//! ======
//! Each member holds at most one vote per item. An item is confirmed while
//! its agreement count is at or above the configured threshold; dropping
//! below the threshold un-confirms it. Proposing an item records the
//! proposer's own agreement.

use sqlx::{PgExecutor, PgPool};

use crate::services::party;

#[derive(Debug, thiserror::Error)]
pub enum ShoppingError {
    #[error("party not found: {0}")]
    PartyNotFound(i64),
    #[error("item {item_id} not found in party {party_id}")]
    ItemNotFound { party_id: i64, item_id: i64 },
    #[error("user {user_id} is not a member of party {party_id}")]
    NotMember { party_id: i64, user_id: i64 },
    #[error("invalid item: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Item with its live agreement count.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct ItemRow {
    pub id: i64,
    pub name: String,
    pub price: i64,
    pub agree_count: i64,
    pub confirmed: bool,
}

/// Confirmation rule.
#[must_use]
pub fn is_confirmed(agree_count: i64, threshold: i64) -> bool {
    agree_count >= threshold
}

/// Normalize a proposal.
///
/// # Errors
///
/// Returns `Invalid` for a blank name or negative price.
pub fn validate_item(name: &str, price: i64) -> Result<String, ShoppingError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ShoppingError::Invalid("name is required".into()));
    }
    if price < 0 {
        return Err(ShoppingError::Invalid("price must not be negative".into()));
    }
    Ok(name.to_owned())
}

const ITEM_SELECT: &str = r"
    SELECT i.id, i.name, i.price, i.confirmed,
           COUNT(v.id) FILTER (WHERE v.agree) AS agree_count
    FROM shopping_items i
    LEFT JOIN votes v ON v.item_id = i.id";

async fn fetch_item<'e, E>(executor: E, item_id: i64) -> Result<ItemRow, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, ItemRow>(&format!("{ITEM_SELECT} WHERE i.id = $1 GROUP BY i.id"))
        .bind(item_id)
        .fetch_one(executor)
        .await
}

async fn ensure_member<'e, E>(executor: E, party_id: i64, user_id: i64) -> Result<(), ShoppingError>
where
    E: PgExecutor<'e>,
{
    match party::member_role(executor, party_id, user_id).await? {
        Some(_) => Ok(()),
        None => Err(ShoppingError::NotMember { party_id, user_id }),
    }
}

/// Items of a party in proposal order.
///
/// # Errors
///
/// Returns `PartyNotFound` if the party does not exist.
pub async fn list_items(pool: &PgPool, party_id: i64) -> Result<Vec<ItemRow>, ShoppingError> {
    if !party::party_exists(pool, party_id).await? {
        return Err(ShoppingError::PartyNotFound(party_id));
    }

    let rows = sqlx::query_as::<_, ItemRow>(&format!("{ITEM_SELECT} WHERE i.party_id = $1 GROUP BY i.id ORDER BY i.id ASC"))
        .bind(party_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Propose an item. The proposer's agreement is recorded with it.
///
/// # Errors
///
/// Returns `Invalid`, `PartyNotFound`, or `NotMember`.
pub async fn add_item(
    pool: &PgPool,
    party_id: i64,
    user_id: i64,
    name: &str,
    price: i64,
    threshold: i64,
) -> Result<ItemRow, ShoppingError> {
    let name = validate_item(name, price)?;

    let mut tx = pool.begin().await?;

    if !party::party_exists(&mut *tx, party_id).await? {
        return Err(ShoppingError::PartyNotFound(party_id));
    }
    ensure_member(&mut *tx, party_id, user_id).await?;

    let item_id = sqlx::query_scalar::<_, i64>(
        r"INSERT INTO shopping_items (party_id, user_id, name, price, confirmed)
          VALUES ($1, $2, $3, $4, $5)
          RETURNING id",
    )
    .bind(party_id)
    .bind(user_id)
    .bind(&name)
    .bind(price)
    .bind(is_confirmed(1, threshold))
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO votes (item_id, user_id, agree) VALUES ($1, $2, TRUE)")
        .bind(item_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    let item = fetch_item(&mut *tx, item_id).await?;
    tx.commit().await?;

    tracing::info!(party_id, item_id, user_id, "item proposed");
    Ok(item)
}

/// Record or change a member's vote and re-evaluate confirmation.
///
/// # Errors
///
/// Returns `ItemNotFound` if the item is not in the party, or `NotMember`.
pub async fn vote(
    pool: &PgPool,
    party_id: i64,
    item_id: i64,
    user_id: i64,
    agree: bool,
    threshold: i64,
) -> Result<ItemRow, ShoppingError> {
    let mut tx = pool.begin().await?;

    let locked = sqlx::query_scalar::<_, i64>("SELECT id FROM shopping_items WHERE id = $1 AND party_id = $2 FOR UPDATE")
        .bind(item_id)
        .bind(party_id)
        .fetch_optional(&mut *tx)
        .await?;
    if locked.is_none() {
        return Err(ShoppingError::ItemNotFound { party_id, item_id });
    }
    ensure_member(&mut *tx, party_id, user_id).await?;

    sqlx::query(
        r"INSERT INTO votes (item_id, user_id, agree)
          VALUES ($1, $2, $3)
          ON CONFLICT (item_id, user_id) DO UPDATE SET agree = EXCLUDED.agree",
    )
    .bind(item_id)
    .bind(user_id)
    .bind(agree)
    .execute(&mut *tx)
    .await?;

    let agree_count =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM votes WHERE item_id = $1 AND agree")
            .bind(item_id)
            .fetch_one(&mut *tx)
            .await?;

    sqlx::query("UPDATE shopping_items SET confirmed = $2 WHERE id = $1")
        .bind(item_id)
        .bind(is_confirmed(agree_count, threshold))
        .execute(&mut *tx)
        .await?;

    let item = fetch_item(&mut *tx, item_id).await?;
    tx.commit().await?;

    tracing::info!(party_id, item_id, user_id, agree, agree_count, confirmed = item.confirmed, "vote recorded");
    Ok(item)
}

#[cfg(test)]
#[path = "shopping_test.rs"]
mod tests;
