//! Plain-text views.
//!
//! Each function returns the text to print so views can be tested without a
//! terminal. Amounts are won with thousands separators: `12,000원`.

use serde_json::Value;

use crate::models::{Bill, Item, PartyDetail, PartySummary, Store};

/// Format an amount in won, e.g. `1234567` as `1,234,567원`.
#[must_use]
pub fn format_won(amount: impl Into<i128>) -> String {
    let amount: i128 = amount.into();
    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}{grouped}원")
}

/// `2025-12-06T10:00:00` as `2025-12-06 10:00`.
fn short_time(meet_time: &str) -> String {
    let trimmed = meet_time.get(..16).unwrap_or(meet_time);
    trimmed.replacen('T', " ", 1)
}

// =============================================================================
// HOME
// =============================================================================

#[must_use]
pub fn render_parties(parties: &[PartySummary]) -> String {
    if parties.is_empty() {
        return "No parties yet.".to_owned();
    }
    parties
        .iter()
        .map(|p| {
            let distance = p.distance.map(|km| format!(" · {km:.1} km")).unwrap_or_default();
            format!(
                "#{} [{}] {} @ {}{}\n    host {} · {} · {}/{} members",
                p.party_id,
                p.status,
                p.title,
                p.mart_name,
                distance,
                p.host_name,
                short_time(&p.meet_time),
                p.current_members,
                p.max_members,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

// =============================================================================
// ROOM
// =============================================================================

#[must_use]
pub fn render_room(party: &PartyDetail, items: &[Item], me: Option<i64>) -> String {
    let mut lines = vec![
        format!("#{} {} [{}]", party.party_id, party.title, party.status),
        format!("{} · {} · {}", party.mart_name, party.meet_place, short_time(&party.meet_time)),
        format!("Members {}/{}:", party.members.len(), party.max_members),
    ];
    for member in &party.members {
        let marker = if Some(member.user_id) == me { " (me)" } else { "" };
        lines.push(format!("  {} {}{} · {}", member.role, member.nickname, marker, member.payment_status));
    }

    let (confirmed, voting): (Vec<&Item>, Vec<&Item>) = items.iter().partition(|i| i.confirmed);
    lines.push("Confirmed:".to_owned());
    lines.extend(item_lines(&confirmed));
    lines.push("Voting:".to_owned());
    lines.extend(item_lines(&voting));

    let membership = match me {
        Some(id) if party.is_member(id) => "You are in this party.",
        Some(_) => "You have not joined this party.",
        None => "Log in to join this party.",
    };
    lines.push(membership.to_owned());
    lines.join("\n")
}

fn item_lines(items: &[&Item]) -> Vec<String> {
    if items.is_empty() {
        return vec!["  (none)".to_owned()];
    }
    items
        .iter()
        .map(|i| format!("  [{}] {} {} · {} agree", i.item_id, i.name, format_won(i.price), i.agree_count))
        .collect()
}

// =============================================================================
// SETTLEMENT
// =============================================================================

#[must_use]
pub fn render_settlement(bills: &[Bill], me: Option<i64>) -> String {
    let mut lines = Vec::new();

    if let Some(bill) = me.and_then(|id| bills.iter().find(|b| b.user_id == id)) {
        lines.push(format!("My bill: {}", format_won(bill.total_amount)));
        for line in &bill.details {
            lines.push(format!("  {} {}", line.item_name, format_won(line.amount)));
        }
    } else {
        lines.push(format!("My bill: {}", format_won(0)));
    }

    lines.push("Everyone:".to_owned());
    for bill in bills {
        let marker = if Some(bill.user_id) == me { " (me)" } else { "" };
        lines.push(format!("  {}{} {}", bill.nickname, marker, format_won(bill.total_amount)));
    }

    // i128: the sum of i64 totals can exceed i64::MAX.
    let total: i128 = bills.iter().map(|b| i128::from(b.total_amount)).sum();
    lines.push(format!("Total: {}", format_won(total)));
    lines.join("\n")
}

// =============================================================================
// STORES
// =============================================================================

#[must_use]
pub fn render_stores(stores: &[Store]) -> String {
    if stores.is_empty() {
        return "No stores registered.".to_owned();
    }
    stores
        .iter()
        .map(|s| format!("#{} {} · {} · {:.1} km", s.store_id, s.name, s.address, s.distance))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Place documents from the keyword search.
#[must_use]
pub fn render_places(places: &Value) -> String {
    let Some(places) = places.as_array().filter(|p| !p.is_empty()) else {
        return "No places found.".to_owned();
    };
    places
        .iter()
        .map(|p| {
            let field = |key: &str| p.get(key).and_then(Value::as_str).unwrap_or("");
            format!("{} · {} ({}, {})", field("place_name"), field("address_name"), field("y"), field("x"))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
