//! Place search: keyword lookup against the Kakao Local API.
//!
//! Thin HTTP wrapper for `/v2/local/search/keyword.json`. The provider sits
//! behind the `PlaceSearch` trait so routes can be exercised with a mock.
//! Response parsing is a pure function for testability.

use std::time::Duration;

use serde_json::Value;

use crate::config::KakaoConfig;

const SEARCH_PATH: &str = "/v2/local/search/keyword.json";
const REQUEST_TIMEOUT_SECS: u64 = 10;
const CONNECT_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, thiserror::Error)]
pub enum PlacesError {
    #[error("keyword is required")]
    EmptyKeyword,
    #[error("place search request failed: {0}")]
    Request(String),
    #[error("place search returned status {status}")]
    Response { status: u16, body: String },
    #[error("place search response parse failed: {0}")]
    Parse(String),
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

/// Keyword place lookup. Returns the provider's place documents as a JSON array.
#[async_trait::async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search(&self, keyword: &str) -> Result<Value, PlacesError>;
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct KakaoPlaces {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl KakaoPlaces {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &KakaoConfig) -> Result<Self, PlacesError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| PlacesError::HttpClientBuild(e.to_string()))?;
        Ok(Self {
            http,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_owned(),
        })
    }
}

#[async_trait::async_trait]
impl PlaceSearch for KakaoPlaces {
    async fn search(&self, keyword: &str) -> Result<Value, PlacesError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(PlacesError::EmptyKeyword);
        }

        let response = self
            .http
            .get(format!("{}{SEARCH_PATH}", self.base_url))
            .header("Authorization", format!("KakaoAK {}", self.api_key))
            .query(&[("query", keyword)])
            .send()
            .await
            .map_err(|e| PlacesError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| PlacesError::Request(e.to_string()))?;

        if status != 200 {
            return Err(PlacesError::Response { status, body: text });
        }

        parse_documents(&text)
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// Extract the `documents` array. A response without one yields an empty list.
///
/// # Errors
///
/// Returns `Parse` if the body is not JSON.
pub fn parse_documents(json: &str) -> Result<Value, PlacesError> {
    let root: Value = serde_json::from_str(json).map_err(|e| PlacesError::Parse(e.to_string()))?;
    Ok(match root.get("documents") {
        Some(docs @ Value::Array(_)) => docs.clone(),
        _ => Value::Array(Vec::new()),
    })
}

#[cfg(test)]
#[path = "places_test.rs"]
mod tests;
