//! Response envelope and error-to-status mapping.
//!
//! Every `/api/v1` body is `{"success", "data", "message"}`. Handlers return
//! `ApiResult<T>`; service errors convert into `ApiError` with `?`.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;

use crate::services::party::PartyError;
use crate::services::places::PlacesError;
use crate::services::settlement::SettlementError;
use crate::services::shopping::ShoppingError;
use crate::services::store::StoreError;
use crate::services::user::UserError;

const INTERNAL_MESSAGE: &str = "internal server error";

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

pub type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

/// Wrap a successful payload.
#[allow(clippy::unnecessary_wraps)]
pub fn ok<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse { success: true, data: Some(data), message: None }))
}

/// Wrap a successful payload with a human-readable note.
#[allow(clippy::unnecessary_wraps)]
pub fn ok_with_message<T: Serialize>(data: T, message: impl Into<String>) -> ApiResult<T> {
    Ok(Json(ApiResponse { success: true, data: Some(data), message: Some(message.into()) }))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    #[must_use]
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    fn internal(err: &sqlx::Error) -> Self {
        tracing::error!(error = %err, "database error");
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ApiResponse::<()> { success: false, data: None, message: Some(self.message) };
        (self.status, Json(body)).into_response()
    }
}

// =============================================================================
// EXTRACTOR REJECTIONS
// =============================================================================

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::new(StatusCode::BAD_REQUEST, rejection.body_text())
    }
}

// =============================================================================
// SERVICE ERROR MAPPING
// =============================================================================

impl From<UserError> for ApiError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            UserError::EmptyEmail => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            UserError::Database(e) => Self::internal(&e),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::InvalidCoordinates { .. } | StoreError::EmptyName => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string())
            }
            StoreError::Duplicate(_) => Self::new(StatusCode::CONFLICT, err.to_string()),
            StoreError::Database(e) => Self::internal(&e),
        }
    }
}

impl From<PartyError> for ApiError {
    fn from(err: PartyError) -> Self {
        match err {
            PartyError::NotFound(_) | PartyError::UserNotFound(_) => Self::new(StatusCode::NOT_FOUND, err.to_string()),
            PartyError::Invalid(_) => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            PartyError::NotHost => Self::new(StatusCode::FORBIDDEN, err.to_string()),
            PartyError::Full { .. } | PartyError::NotRecruiting(_) | PartyError::InvalidTransition { .. } => {
                Self::new(StatusCode::CONFLICT, err.to_string())
            }
            PartyError::Store(e) => e.into(),
            PartyError::Database(e) => Self::internal(&e),
        }
    }
}

impl From<ShoppingError> for ApiError {
    fn from(err: ShoppingError) -> Self {
        match err {
            ShoppingError::PartyNotFound(_) | ShoppingError::ItemNotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, err.to_string())
            }
            ShoppingError::NotMember { .. } => Self::new(StatusCode::FORBIDDEN, err.to_string()),
            ShoppingError::Invalid(_) => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            ShoppingError::Database(e) => Self::internal(&e),
        }
    }
}

impl From<SettlementError> for ApiError {
    fn from(err: SettlementError) -> Self {
        match err {
            SettlementError::PartyNotFound(_) | SettlementError::ItemNotFound { .. } => {
                Self::new(StatusCode::NOT_FOUND, err.to_string())
            }
            SettlementError::NotMember { .. } => Self::new(StatusCode::FORBIDDEN, err.to_string()),
            SettlementError::Invalid(_) => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            SettlementError::Database(e) => Self::internal(&e),
        }
    }
}

impl From<PlacesError> for ApiError {
    fn from(err: PlacesError) -> Self {
        match err {
            PlacesError::EmptyKeyword => Self::new(StatusCode::BAD_REQUEST, err.to_string()),
            PlacesError::Request(_) | PlacesError::Response { .. } | PlacesError::Parse(_) => {
                tracing::error!(error = %err, "place search failed");
                Self::new(StatusCode::BAD_GATEWAY, "place search failed")
            }
            PlacesError::HttpClientBuild(_) => {
                tracing::error!(error = %err, "place search client unavailable");
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
#[path = "response_test.rs"]
mod tests;
