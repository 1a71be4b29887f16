use serde_json::json;

use super::*;
use crate::models::{BillLine, Member};

fn party() -> PartyDetail {
    PartyDetail {
        party_id: 3,
        mart_name: "Costco Yangjae".into(),
        title: "Saturday bulk run".into(),
        meet_place: "Gate 2".into(),
        meet_time: "2025-12-06T10:00:00".into(),
        status: "RECRUITING".into(),
        max_members: 4,
        members: vec![
            Member { user_id: 1, nickname: "host".into(), role: "HOST".into(), payment_status: "PENDING".into() },
            Member { user_id: 2, nickname: "mina".into(), role: "GUEST".into(), payment_status: "COMPLETED".into() },
        ],
    }
}

fn item(item_id: i64, name: &str, price: i64, agree_count: i64, confirmed: bool) -> Item {
    Item { item_id, name: name.into(), price, agree_count, confirmed }
}

#[test]
fn format_won_groups_thousands() {
    assert_eq!(format_won(0), "0원");
    assert_eq!(format_won(999), "999원");
    assert_eq!(format_won(1_000), "1,000원");
    assert_eq!(format_won(12_000), "12,000원");
    assert_eq!(format_won(1_234_567), "1,234,567원");
    assert_eq!(format_won(-4_500), "-4,500원");
}

#[test]
fn room_splits_confirmed_and_voting() {
    let items = [item(1, "bagels", 12_000, 3, true), item(2, "wine", 30_000, 1, false)];
    let text = render_room(&party(), &items, Some(2));

    let confirmed = text.find("Confirmed:").unwrap();
    let voting = text.find("Voting:").unwrap();
    let bagels = text.find("bagels").unwrap();
    let wine = text.find("wine").unwrap();
    assert!(confirmed < bagels && bagels < voting && voting < wine);
    assert!(text.contains("[1] bagels 12,000원 · 3 agree"));
    assert!(text.contains("GUEST mina (me) · COMPLETED"));
    assert!(text.contains("2025-12-06 10:00"));
    assert!(text.ends_with("You are in this party."));
}

#[test]
fn room_for_outsider_and_anonymous() {
    assert!(render_room(&party(), &[], Some(9)).ends_with("You have not joined this party."));
    let anonymous = render_room(&party(), &[], None);
    assert!(anonymous.ends_with("Log in to join this party."));
    assert_eq!(anonymous.matches("(none)").count(), 2);
}

#[test]
fn settlement_shows_my_bill_and_total() {
    let bills = vec![
        Bill {
            user_id: 1,
            nickname: "host".into(),
            total_amount: 21_000,
            details: vec![
                BillLine { item_name: "bagels".into(), amount: 6_000 },
                BillLine { item_name: "wine".into(), amount: 15_000 },
            ],
        },
        Bill {
            user_id: 2,
            nickname: "mina".into(),
            total_amount: 6_000,
            details: vec![BillLine { item_name: "bagels".into(), amount: 6_000 }],
        },
    ];

    let text = render_settlement(&bills, Some(1));
    assert!(text.starts_with("My bill: 21,000원\n  bagels 6,000원\n  wine 15,000원"));
    assert!(text.contains("  host (me) 21,000원"));
    assert!(text.contains("  mina 6,000원"));
    assert!(text.ends_with("Total: 27,000원"));
}

#[test]
fn settlement_total_beyond_i64_is_exact() {
    let bills: Vec<Bill> = (1..=2)
        .map(|user_id| Bill { user_id, nickname: format!("user{user_id}"), total_amount: i64::MAX, details: Vec::new() })
        .collect();
    let text = render_settlement(&bills, None);
    assert!(text.ends_with("Total: 18,446,744,073,709,551,614원"));
}

#[test]
fn settlement_for_non_member_owes_nothing() {
    let text = render_settlement(&[], Some(5));
    assert!(text.starts_with("My bill: 0원"));
    assert!(text.ends_with("Total: 0원"));
}

#[test]
fn parties_render_distance_when_known() {
    let parties = vec![
        PartySummary {
            party_id: 1,
            mart_name: "Emart".into(),
            title: "Eggs".into(),
            host_name: "host".into(),
            status: "RECRUITING".into(),
            meet_time: "2025-12-06T10:00:00".into(),
            current_members: 2,
            max_members: 4,
            distance: Some(1.3),
        },
        PartySummary {
            party_id: 2,
            mart_name: "Unknown Mart".into(),
            title: "Rice".into(),
            host_name: "mina".into(),
            status: "SHOPPING".into(),
            meet_time: "2025-12-07T09:30:00".into(),
            current_members: 3,
            max_members: 3,
            distance: None,
        },
    ];
    let text = render_parties(&parties);
    assert!(text.contains("#1 [RECRUITING] Eggs @ Emart · 1.3 km"));
    assert!(text.contains("#2 [SHOPPING] Rice @ Unknown Mart\n"));
    assert!(text.contains("3/3 members"));
    assert_eq!(render_parties(&[]), "No parties yet.");
}

#[test]
fn stores_and_places_render() {
    let stores = [Store { store_id: 4, name: "Costco".into(), address: "Seoul".into(), distance: 3.0 }];
    assert_eq!(render_stores(&stores), "#4 Costco · Seoul · 3.0 km");

    let places = json!([{ "place_name": "Costco Busan", "address_name": "Busan", "x": "129.11", "y": "35.17" }]);
    assert_eq!(render_places(&places), "Costco Busan · Busan (35.17, 129.11)");
    assert_eq!(render_places(&json!([])), "No places found.");
}
