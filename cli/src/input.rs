//! Argument parsing that clap cannot express directly.

use std::collections::HashMap;

use chrono::{NaiveDate, NaiveTime};

use crate::CliError;
use crate::models::{Item, PriceEntry};

/// Combine `YYYY-MM-DD` and `HH:MM` into the server's `YYYY-MM-DDTHH:MM:00`.
pub fn meet_time(date: &str, time: &str) -> Result<String, CliError> {
    let date = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| CliError::InvalidArgument(format!("date must be YYYY-MM-DD, got {date:?}")))?;
    let time = NaiveTime::parse_from_str(time.trim(), "%H:%M")
        .map_err(|_| CliError::InvalidArgument(format!("time must be HH:MM, got {time:?}")))?;
    Ok(date.and_time(time).format("%Y-%m-%dT%H:%M:00").to_string())
}

/// Parse one `--price itemId=won` override.
pub fn parse_price_override(raw: &str) -> Result<(i64, i64), String> {
    let (id, price) = raw.split_once('=').ok_or_else(|| format!("expected itemId=won, got {raw:?}"))?;
    let id = id.trim().parse::<i64>().map_err(|_| format!("invalid item id in {raw:?}"))?;
    let price = price.trim().replace(',', "");
    let price = price.parse::<i64>().map_err(|_| format!("invalid price in {raw:?}"))?;
    if price < 0 {
        return Err(format!("price must not be negative in {raw:?}"));
    }
    Ok((id, price))
}

/// Confirmed items with local price edits applied, ready to submit.
///
/// An override for an item that is not on the confirmed list is an error.
pub fn settlement_entries(items: &[Item], overrides: &[(i64, i64)]) -> Result<Vec<PriceEntry>, CliError> {
    let edits: HashMap<i64, i64> = overrides.iter().copied().collect();
    let confirmed: Vec<&Item> = items.iter().filter(|i| i.confirmed).collect();

    if let Some(&(id, _)) = overrides.iter().find(|(id, _)| !confirmed.iter().any(|i| i.item_id == *id)) {
        return Err(CliError::InvalidArgument(format!("item {id} is not a confirmed item")));
    }

    Ok(confirmed
        .into_iter()
        .map(|i| PriceEntry { item_id: i.item_id, real_price: edits.get(&i.item_id).copied().unwrap_or(i.price) })
        .collect())
}

#[cfg(test)]
#[path = "input_test.rs"]
mod tests;
