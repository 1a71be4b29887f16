//! Settlement service: receipt prices in, per-member bills out.
//!
//! DESIGN
//! ======
//! The host submits the real (receipt) price of each purchased item. Those
//! prices overwrite the proposed ones, then each item is split evenly among
//! the members who share it: everyone who voted to agree, plus everyone who
//! never voted on it. Members who voted against an item never pay for it.
//!
//! Shares use integer division; the remainder of an uneven split is not
//! allocated to anyone, so the sum of the bills may be a few won below the
//! receipt total.

use std::collections::{HashMap, HashSet};

use sqlx::PgPool;

use crate::services::party::{self, PaymentStatus};

#[derive(Debug, thiserror::Error)]
pub enum SettlementError {
    #[error("party not found: {0}")]
    PartyNotFound(i64),
    #[error("item {item_id} not found in party {party_id}")]
    ItemNotFound { party_id: i64, item_id: i64 },
    #[error("user {user_id} is not a member of party {party_id}")]
    NotMember { party_id: i64, user_id: i64 },
    #[error("invalid settlement: {0}")]
    Invalid(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceUpdate {
    pub item_id: i64,
    pub real_price: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementMember {
    pub user_id: i64,
    pub nickname: String,
}

/// An item at its final price with the votes cast on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementItem {
    pub item_id: i64,
    pub name: String,
    pub price: i64,
    /// `user_id -> agree`. Members absent from the map have not voted.
    pub votes: HashMap<i64, bool>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillLine {
    pub item_name: String,
    pub amount: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bill {
    pub user_id: i64,
    pub nickname: String,
    pub total_amount: i64,
    pub details: Vec<BillLine>,
}

// =============================================================================
// SPLITTING
// =============================================================================

/// Check submitted prices before touching the database.
///
/// # Errors
///
/// Returns `Invalid` for a negative price or an item listed twice.
pub fn validate_updates(updates: &[PriceUpdate]) -> Result<(), SettlementError> {
    let mut seen = HashSet::with_capacity(updates.len());
    for update in updates {
        if update.real_price < 0 {
            return Err(SettlementError::Invalid(format!(
                "realPrice for item {} must not be negative",
                update.item_id
            )));
        }
        if !seen.insert(update.item_id) {
            return Err(SettlementError::Invalid(format!("item {} listed more than once", update.item_id)));
        }
    }
    Ok(())
}

/// Members sharing an item: agreed or did not vote, in member order.
#[must_use]
pub fn sharers(members: &[SettlementMember], item: &SettlementItem) -> Vec<i64> {
    members
        .iter()
        .map(|m| m.user_id)
        .filter(|user_id| item.votes.get(user_id).copied().unwrap_or(true))
        .collect()
}

/// Split every item among its sharers. Returns one bill per member, in
/// member order, including members who owe nothing.
///
/// # Errors
///
/// Returns `Invalid` if a member's total does not fit in an `i64`.
pub fn split_bill(members: &[SettlementMember], items: &[SettlementItem]) -> Result<Vec<Bill>, SettlementError> {
    let mut bills: Vec<Bill> = members
        .iter()
        .map(|m| Bill { user_id: m.user_id, nickname: m.nickname.clone(), total_amount: 0, details: Vec::new() })
        .collect();
    let index: HashMap<i64, usize> = bills.iter().enumerate().map(|(i, b)| (b.user_id, i)).collect();

    for item in items {
        let sharing = sharers(members, item);
        let Ok(count) = i64::try_from(sharing.len()) else {
            continue;
        };
        if count == 0 {
            continue;
        }

        let share = item.price / count;
        for user_id in sharing {
            if let Some(&i) = index.get(&user_id) {
                let bill = &mut bills[i];
                bill.total_amount = bill.total_amount.checked_add(share).ok_or_else(|| {
                    SettlementError::Invalid(format!("total for user {user_id} exceeds the supported amount"))
                })?;
                bill.details.push(BillLine { item_name: item.name.clone(), amount: share });
            }
        }
    }

    Ok(bills)
}

// =============================================================================
// PERSISTENCE
// =============================================================================

/// Apply receipt prices and compute every member's bill.
///
/// All updates are applied atomically: an unknown item rolls back the
/// prices already written.
///
/// # Errors
///
/// Returns `Invalid`, `PartyNotFound`, or `ItemNotFound`.
pub async fn calculate(pool: &PgPool, party_id: i64, updates: &[PriceUpdate]) -> Result<Vec<Bill>, SettlementError> {
    validate_updates(updates)?;

    let mut tx = pool.begin().await?;

    let locked = sqlx::query_scalar::<_, i64>("SELECT id FROM parties WHERE id = $1 FOR UPDATE")
        .bind(party_id)
        .fetch_optional(&mut *tx)
        .await?;
    if locked.is_none() {
        return Err(SettlementError::PartyNotFound(party_id));
    }

    let mut items = Vec::with_capacity(updates.len());
    for update in updates {
        let name = sqlx::query_scalar::<_, String>(
            "UPDATE shopping_items SET price = $3 WHERE id = $1 AND party_id = $2 RETURNING name",
        )
        .bind(update.item_id)
        .bind(party_id)
        .bind(update.real_price)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(SettlementError::ItemNotFound { party_id, item_id: update.item_id })?;

        items.push(SettlementItem { item_id: update.item_id, name, price: update.real_price, votes: HashMap::new() });
    }

    let item_ids: Vec<i64> = items.iter().map(|item| item.item_id).collect();
    let votes = sqlx::query_as::<_, (i64, i64, bool)>("SELECT item_id, user_id, agree FROM votes WHERE item_id = ANY($1)")
        .bind(&item_ids)
        .fetch_all(&mut *tx)
        .await?;
    for (item_id, user_id, agree) in votes {
        if let Some(item) = items.iter_mut().find(|item| item.item_id == item_id) {
            item.votes.insert(user_id, agree);
        }
    }

    let members: Vec<SettlementMember> = party::list_members(&mut *tx, party_id)
        .await?
        .into_iter()
        .map(|m| SettlementMember { user_id: m.user_id, nickname: m.nickname })
        .collect();

    let bills = split_bill(&members, &items)?;
    tx.commit().await?;

    tracing::info!(party_id, items = items.len(), members = members.len(), "settlement calculated");
    Ok(bills)
}

/// Mark a member's share as paid.
///
/// # Errors
///
/// Returns `PartyNotFound` or `NotMember`.
pub async fn complete_payment(pool: &PgPool, party_id: i64, user_id: i64) -> Result<(), SettlementError> {
    let result = sqlx::query("UPDATE party_members SET payment_status = $3 WHERE party_id = $1 AND user_id = $2")
        .bind(party_id)
        .bind(user_id)
        .bind(PaymentStatus::Completed.as_str())
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        if !party::party_exists(pool, party_id).await? {
            return Err(SettlementError::PartyNotFound(party_id));
        }
        return Err(SettlementError::NotMember { party_id, user_id });
    }

    tracing::info!(party_id, user_id, "payment completed");
    Ok(())
}

#[cfg(test)]
#[path = "settlement_test.rs"]
mod tests;
