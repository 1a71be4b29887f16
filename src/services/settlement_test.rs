use super::*;
#[cfg(feature = "live-db-tests")]
use crate::services::party::{NewParty, create_party, join_party};
#[cfg(feature = "live-db-tests")]
use crate::services::shopping::{add_item, vote};
#[cfg(feature = "live-db-tests")]
use crate::services::test_db::{integration_pool, seed_user};

fn members(n: i64) -> Vec<SettlementMember> {
    (1..=n).map(|id| SettlementMember { user_id: id, nickname: format!("user{id}") }).collect()
}

fn item(item_id: i64, name: &str, price: i64, votes: &[(i64, bool)]) -> SettlementItem {
    SettlementItem { item_id, name: name.into(), price, votes: votes.iter().copied().collect() }
}

// =============================================================================
// validate_updates
// =============================================================================

#[test]
fn validate_accepts_empty_and_zero_prices() {
    assert!(validate_updates(&[]).is_ok());
    assert!(validate_updates(&[PriceUpdate { item_id: 1, real_price: 0 }]).is_ok());
}

#[test]
fn validate_rejects_negative_price() {
    let err = validate_updates(&[PriceUpdate { item_id: 1, real_price: -10 }]).unwrap_err();
    assert!(matches!(err, SettlementError::Invalid(_)));
}

#[test]
fn validate_rejects_duplicate_items() {
    let updates = [PriceUpdate { item_id: 4, real_price: 10 }, PriceUpdate { item_id: 4, real_price: 20 }];
    assert!(matches!(validate_updates(&updates), Err(SettlementError::Invalid(_))));
}

// =============================================================================
// sharers
// =============================================================================

#[test]
fn non_voters_share_by_default() {
    let sharing = sharers(&members(3), &item(1, "milk", 3000, &[]));
    assert_eq!(sharing, vec![1, 2, 3]);
}

#[test]
fn disagreeing_members_are_excluded() {
    let sharing = sharers(&members(3), &item(1, "milk", 3000, &[(1, true), (2, false)]));
    assert_eq!(sharing, vec![1, 3]);
}

#[test]
fn votes_from_non_members_are_ignored() {
    let sharing = sharers(&members(2), &item(1, "milk", 3000, &[(99, true), (2, false)]));
    assert_eq!(sharing, vec![1]);
}

// =============================================================================
// split_bill
// =============================================================================

#[test]
fn even_split_across_all_members() {
    let bills = split_bill(&members(4), &[item(1, "bagels", 12_000, &[(1, true)])]).unwrap();
    assert_eq!(bills.len(), 4);
    for bill in &bills {
        assert_eq!(bill.total_amount, 3_000);
        assert_eq!(bill.details, vec![BillLine { item_name: "bagels".into(), amount: 3_000 }]);
    }
}

#[test]
fn uneven_split_truncates_remainder() {
    let bills = split_bill(&members(3), &[item(1, "water", 10_000, &[])]).unwrap();
    assert!(bills.iter().all(|b| b.total_amount == 3_333));
    let total: i64 = bills.iter().map(|b| b.total_amount).sum();
    assert_eq!(total, 10_000 - 10_000 % 3);
}

#[test]
fn members_who_opted_out_owe_nothing_for_that_item() {
    let items = [
        item(1, "bagels", 12_000, &[(3, false)]),
        item(2, "wine", 30_000, &[(1, true), (2, false), (3, true)]),
    ];
    let bills = split_bill(&members(3), &items).unwrap();

    assert_eq!(bills[0].total_amount, 6_000 + 15_000);
    assert_eq!(bills[1].total_amount, 6_000);
    assert_eq!(bills[2].total_amount, 15_000);
    assert_eq!(
        bills[2].details,
        vec![BillLine { item_name: "wine".into(), amount: 15_000 }]
    );
}

#[test]
fn item_everyone_rejected_is_skipped() {
    let bills = split_bill(&members(2), &[item(1, "durian", 20_000, &[(1, false), (2, false)])]).unwrap();
    assert!(bills.iter().all(|b| b.total_amount == 0 && b.details.is_empty()));
}

#[test]
fn bills_follow_member_order_and_keep_nicknames() {
    let bills = split_bill(&members(3), &[]).unwrap();
    assert_eq!(bills.iter().map(|b| b.user_id).collect::<Vec<_>>(), vec![1, 2, 3]);
    assert_eq!(bills[1].nickname, "user2");
}

#[test]
fn no_members_yields_no_bills() {
    assert!(split_bill(&[], &[item(1, "milk", 1_000, &[])]).unwrap().is_empty());
}

#[test]
fn totals_past_i64_are_rejected() {
    let items = [item(1, "gold", i64::MAX, &[]), item(2, "more gold", i64::MAX, &[])];
    let err = split_bill(&members(1), &items).unwrap_err();
    assert!(matches!(err, SettlementError::Invalid(_)));
}

#[test]
fn largest_single_price_still_splits() {
    let bills = split_bill(&members(1), &[item(1, "gold", i64::MAX, &[])]).unwrap();
    assert_eq!(bills[0].total_amount, i64::MAX);
}

#[tokio::test]
async fn calculate_rejects_invalid_prices_without_db() {
    let state = crate::state::test_helpers::test_app_state();
    let err = calculate(&state.pool, 1, &[PriceUpdate { item_id: 1, real_price: -1 }])
        .await
        .unwrap_err();
    assert!(matches!(err, SettlementError::Invalid(_)));
}

// =============================================================================
// live database
// =============================================================================

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn calculate_overwrites_prices_and_splits_by_votes() {
    let pool = integration_pool().await;
    let host = seed_user(&pool, "host").await;
    let guest = seed_user(&pool, "guest").await;
    let party = NewParty {
        host_id: host,
        mart_name: "Costco".into(),
        title: "split".into(),
        meet_time: chrono::NaiveDate::from_ymd_opt(2025, 12, 1)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .unwrap(),
        meet_place: String::new(),
        max_members: 4,
    };
    let party_id = create_party(&pool, &party).await.unwrap();
    join_party(&pool, party_id, guest).await.unwrap();

    let shared = add_item(&pool, party_id, host, "bagels", 10_000, 3).await.unwrap();
    let solo = add_item(&pool, party_id, host, "coffee", 8_000, 3).await.unwrap();
    vote(&pool, party_id, solo.id, guest, false, 3).await.unwrap();

    let bills = calculate(
        &pool,
        party_id,
        &[
            PriceUpdate { item_id: shared.id, real_price: 12_000 },
            PriceUpdate { item_id: solo.id, real_price: 9_000 },
        ],
    )
    .await
    .unwrap();

    assert_eq!(bills[0].user_id, host);
    assert_eq!(bills[0].total_amount, 6_000 + 9_000);
    assert_eq!(bills[1].user_id, guest);
    assert_eq!(bills[1].total_amount, 6_000);

    complete_payment(&pool, party_id, guest).await.unwrap();
    let outsider = seed_user(&pool, "outsider").await;
    assert!(matches!(
        complete_payment(&pool, party_id, outsider).await,
        Err(SettlementError::NotMember { .. })
    ));
}

#[cfg(feature = "live-db-tests")]
#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL/live Postgres"]
async fn calculate_unknown_item_is_not_found() {
    let pool = integration_pool().await;
    let host = seed_user(&pool, "host").await;
    let party = NewParty {
        host_id: host,
        mart_name: "Costco".into(),
        title: "split".into(),
        meet_time: chrono::NaiveDate::from_ymd_opt(2025, 12, 1)
            .and_then(|d| d.and_hms_opt(10, 0, 0))
            .unwrap(),
        meet_place: String::new(),
        max_members: 4,
    };
    let party_id = create_party(&pool, &party).await.unwrap();

    let err = calculate(&pool, party_id, &[PriceUpdate { item_id: 424_242, real_price: 1 }])
        .await
        .unwrap_err();
    assert!(matches!(err, SettlementError::ItemNotFound { item_id: 424_242, .. }));
}
