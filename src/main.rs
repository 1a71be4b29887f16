mod config;
mod db;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::services::places::{KakaoPlaces, PlaceSearch};

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error("database init failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("server failed: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> Result<(), StartupError> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;
    let pool = db::init_pool(&config.database_url, config.db_max_connections).await?;

    // Place search is optional: /map/search answers 503 without it.
    let places: Option<Arc<dyn PlaceSearch>> = match config.kakao.as_ref().map(KakaoPlaces::new) {
        Some(Ok(client)) => {
            tracing::info!("place search enabled");
            Some(Arc::new(client))
        }
        Some(Err(e)) => {
            tracing::warn!(error = %e, "place search client failed to build; map search disabled");
            None
        }
        None => {
            tracing::warn!("KAKAO_API_KEY not set; map search disabled");
            None
        }
    };

    let port = config.port;
    let threshold = config.vote_confirm_threshold;
    let state = state::AppState::new(pool, config, places);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}")).await?;

    tracing::info!(%port, threshold, "nikit listening");
    axum::serve(listener, app).await?;
    Ok(())
}
