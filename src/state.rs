//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! Handlers are stateless: the database is the only authority over parties,
//! items, votes, and settlements, so the state carries just the pool, the
//! parsed configuration, and the optional place-search provider.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::AppConfig;
use crate::services::places::PlaceSearch;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped or Clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<AppConfig>,
    /// `None` if no place-search key is configured.
    pub places: Option<Arc<dyn PlaceSearch>>,
}

impl AppState {
    #[must_use]
    pub fn new(pool: PgPool, config: AppConfig, places: Option<Arc<dyn PlaceSearch>>) -> Self {
        Self { pool, config: Arc::new(config), places }
    }

    /// Agreements needed before an item is confirmed.
    #[must_use]
    pub fn vote_threshold(&self) -> i64 {
        self.config.vote_confirm_threshold
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
