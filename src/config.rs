//! Service configuration parsed from environment variables.
//!
//! SYSTEM CONTEXT
//! ==============
//! `main` loads `.env` (if present) and builds one `AppConfig` before the
//! pool and router exist. Numeric values that fail to parse fall back to
//! their defaults rather than aborting startup.

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_VOTE_CONFIRM_THRESHOLD: i64 = 3;
pub const DEFAULT_KAKAO_BASE_URL: &str = "https://dapi.kakao.com";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
}

/// Credentials for the upstream place search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KakaoConfig {
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub db_max_connections: u32,
    /// Agreements needed before an item counts as confirmed.
    pub vote_confirm_threshold: i64,
    /// `None` disables `/map/search`.
    pub kakao: Option<KakaoConfig>,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `DATABASE_URL`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DB_MAX_CONNECTIONS`: default 5
    /// - `VOTE_CONFIRM_THRESHOLD`: default 3, clamped to at least 1
    /// - `KAKAO_API_KEY`: enables place search
    /// - `KAKAO_BASE_URL`: default `https://dapi.kakao.com`
    ///
    /// # Errors
    ///
    /// Returns an error if `DATABASE_URL` is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_url = std::env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        let kakao = std::env::var("KAKAO_API_KEY")
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(|api_key| KakaoConfig {
                api_key,
                base_url: std::env::var("KAKAO_BASE_URL").unwrap_or_else(|_| DEFAULT_KAKAO_BASE_URL.to_owned()),
            });

        Ok(Self {
            database_url,
            port: env_parse("PORT", DEFAULT_PORT),
            db_max_connections: env_parse("DB_MAX_CONNECTIONS", DEFAULT_DB_MAX_CONNECTIONS),
            vote_confirm_threshold: env_parse("VOTE_CONFIRM_THRESHOLD", DEFAULT_VOTE_CONFIRM_THRESHOLD).max(1),
            kakao,
        })
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
