//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! All JSON endpoints live under `/api/v1` and answer with the
//! `{success, data, message}` envelope from `response`. `/healthz` sits at the
//! root for load balancers and is not enveloped.

pub mod extract;
pub mod items;
pub mod parties;
pub mod response;
pub mod settlement;
pub mod stores;
pub mod users;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{get, patch, post};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::routes::response::ApiError;
use crate::state::AppState;

/// Versioned API routes, relative to `/api/v1`.
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/users/login", post(users::login))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}/host", post(users::promote_host))
        .route("/stores", post(stores::create))
        .route("/stores/nearby", get(stores::nearby))
        .route("/map/search", get(stores::search))
        .route("/parties", get(parties::list_parties).post(parties::create_party))
        .route("/parties/{id}", get(parties::get_party))
        .route("/parties/{id}/join", post(parties::join_party))
        .route("/parties/{id}/status", patch(parties::update_status))
        .route("/parties/{id}/items", get(items::list_items).post(items::propose))
        .route("/parties/{id}/items/{item_id}/vote", post(items::vote))
        .route("/parties/{id}/settlement", post(settlement::calculate))
        .route("/parties/{id}/settlement/complete", post(settlement::complete))
}

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .nest("/api/v1", api_routes())
        .route("/healthz", get(healthz))
        .fallback(not_found)
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn not_found() -> ApiError {
    ApiError::new(StatusCode::NOT_FOUND, "no such endpoint")
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
