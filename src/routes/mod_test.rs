use std::sync::Arc;

use serde_json::{Value, json};

use super::*;
use crate::services::places::{PlaceSearch, PlacesError};
use crate::state::test_helpers::{test_app_state, test_app_state_with_places};

struct FixedPlaces;

#[async_trait::async_trait]
impl PlaceSearch for FixedPlaces {
    async fn search(&self, keyword: &str) -> Result<Value, PlacesError> {
        Ok(json!([{ "place_name": format!("{keyword} Haeundae"), "x": "129.16", "y": "35.16" }]))
    }
}

/// Serve the router on an ephemeral port and return its base URL.
async fn spawn(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app(state)).await.unwrap();
    });
    format!("http://{addr}")
}

async fn envelope(response: reqwest::Response) -> (reqwest::StatusCode, Value) {
    let status = response.status();
    let body = response.json::<Value>().await.unwrap();
    (status, body)
}

#[tokio::test]
async fn healthz_returns_ok() {
    let base = spawn(test_app_state()).await;
    let response = reqwest::get(format!("{base}/healthz")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let base = spawn(test_app_state()).await;
    let response = reqwest::get(format!("{base}/api/v1/nope")).await.unwrap();
    let (status, body) = envelope(response).await;
    assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "no such endpoint");
}

#[tokio::test]
async fn malformed_body_is_enveloped_bad_request() {
    let base = spawn(test_app_state()).await;
    let response = reqwest::Client::new()
        .post(format!("{base}/api/v1/parties"))
        .json(&json!({
            "hostId": 1,
            "martName": "Costco Yangjae",
            "title": "Saturday run",
            "meetTime": "2025-12-06 10:00",
            "meetPlace": "Gate 2",
            "maxMembers": 4
        }))
        .send()
        .await
        .unwrap();
    let (status, body) = envelope(response).await;
    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["data"].is_null());
    assert!(body["message"].as_str().is_some_and(|m| m.contains("meetTime")));
}

#[tokio::test]
async fn non_numeric_path_id_is_enveloped_bad_request() {
    let base = spawn(test_app_state()).await;
    let response = reqwest::get(format!("{base}/api/v1/parties/abc")).await.unwrap();
    let (status, body) = envelope(response).await;
    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().is_some_and(|m| m.contains("abc")));
}

#[tokio::test]
async fn non_numeric_query_is_enveloped_bad_request() {
    let base = spawn(test_app_state()).await;
    let response = reqwest::get(format!("{base}/api/v1/stores/nearby?lat=abc&lng=127")).await.unwrap();
    let (status, body) = envelope(response).await;
    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn login_with_blank_email_is_bad_request() {
    let base = spawn(test_app_state()).await;
    let response = reqwest::Client::new()
        .post(format!("{base}/api/v1/users/login"))
        .json(&json!({ "email": "   " }))
        .send()
        .await
        .unwrap();
    let (status, body) = envelope(response).await;
    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["data"].is_null());
    assert!(body["message"].as_str().is_some_and(|m| m.contains("email")));
}

#[tokio::test]
async fn create_party_with_single_seat_is_bad_request() {
    let base = spawn(test_app_state()).await;
    let response = reqwest::Client::new()
        .post(format!("{base}/api/v1/parties"))
        .json(&json!({
            "hostId": 1,
            "martName": "Costco Yangjae",
            "title": "Saturday run",
            "meetTime": "2025-12-06T10:00:00",
            "meetPlace": "Gate 2",
            "maxMembers": 1
        }))
        .send()
        .await
        .unwrap();
    let (status, body) = envelope(response).await;
    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn listing_parties_with_bad_coordinates_is_bad_request() {
    let base = spawn(test_app_state()).await;
    let response = reqwest::get(format!("{base}/api/v1/parties?lat=120&lng=10")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn nearby_stores_with_bad_coordinates_is_bad_request() {
    let base = spawn(test_app_state()).await;
    let response = reqwest::get(format!("{base}/api/v1/stores/nearby?lat=37.5&lng=200")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_status_is_bad_request() {
    let base = spawn(test_app_state()).await;
    let response = reqwest::Client::new()
        .patch(format!("{base}/api/v1/parties/1/status"))
        .json(&json!({ "userId": 1, "status": "CANCELLED" }))
        .send()
        .await
        .unwrap();
    let (status, body) = envelope(response).await;
    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "unknown status: CANCELLED");
}

#[tokio::test]
async fn proposing_negative_price_is_bad_request() {
    let base = spawn(test_app_state()).await;
    let response = reqwest::Client::new()
        .post(format!("{base}/api/v1/parties/1/items"))
        .json(&json!({ "userId": 1, "name": "eggs", "price": -500 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn settlement_with_negative_real_price_is_bad_request() {
    let base = spawn(test_app_state()).await;
    let response = reqwest::Client::new()
        .post(format!("{base}/api/v1/parties/1/settlement"))
        .json(&json!({ "items": [{ "itemId": 1, "realPrice": -1 }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn map_search_without_provider_is_unavailable() {
    let base = spawn(test_app_state()).await;
    let response = reqwest::get(format!("{base}/api/v1/map/search?keyword=costco")).await.unwrap();
    let (status, body) = envelope(response).await;
    assert_eq!(status, reqwest::StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn map_search_returns_places() {
    let base = spawn(test_app_state_with_places(Arc::new(FixedPlaces))).await;
    let response = reqwest::get(format!("{base}/api/v1/map/search?keyword=Emart")).await.unwrap();
    let (status, body) = envelope(response).await;
    assert_eq!(status, reqwest::StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["places"][0]["place_name"], "Emart Haeundae");
}

#[tokio::test]
async fn map_search_blank_keyword_is_bad_request() {
    let base = spawn(test_app_state_with_places(Arc::new(FixedPlaces))).await;
    let response = reqwest::get(format!("{base}/api/v1/map/search?keyword=%20%20")).await.unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn map_search_blank_keyword_without_provider_is_bad_request() {
    let base = spawn(test_app_state()).await;
    let response = reqwest::get(format!("{base}/api/v1/map/search")).await.unwrap();
    let (status, body) = envelope(response).await;
    assert_eq!(status, reqwest::StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "keyword is required");
}
