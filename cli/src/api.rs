//! HTTP client for the `/api/v1` surface.
//!
//! Every response is the `{success, data, message}` envelope. A non-2xx
//! status or `success: false` becomes `CliError::Api` carrying the server's
//! message; otherwise `data` is decoded into the caller's type.

use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::CliError;

const API_PREFIX: &str = "/api/v1";

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self { http: reqwest::Client::new(), base_url: base_url.trim_end_matches('/').to_owned() }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, CliError> {
        self.request::<(), T>(Method::GET, path, &[], None).await
    }

    /// GET with query parameters, encoded by reqwest.
    pub async fn get_with_query<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, CliError> {
        self.request::<(), T>(Method::GET, path, query, None).await
    }

    pub async fn post<B: Serialize, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T, CliError> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, CliError> {
        self.request::<(), T>(Method::POST, path, &[], None).await
    }

    async fn request<B: Serialize, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T, CliError> {
        let url = format!("{}{API_PREFIX}{path}", self.base_url);
        let request = self.http.request(method, &url);
        let request = if query.is_empty() { request } else { request.query(query) };
        let request = if let Some(json) = body { request.json(json) } else { request };

        let response = request.send().await?;
        let status = response.status();
        let envelope = response.json::<Value>().await.unwrap_or(Value::Null);

        unwrap_envelope(status.as_u16(), envelope)
    }
}

/// Extract `data` from an envelope, or the error it reports.
pub(crate) fn unwrap_envelope<T: DeserializeOwned>(status: u16, envelope: Value) -> Result<T, CliError> {
    let success = envelope.get("success").and_then(Value::as_bool).unwrap_or(false);
    if !(200..300).contains(&status) || !success {
        let message = envelope
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| "request failed".to_owned(), str::to_owned);
        return Err(CliError::Api { status, message });
    }

    let data = envelope.get("data").cloned().unwrap_or(Value::Null);
    Ok(serde_json::from_value(data)?)
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
