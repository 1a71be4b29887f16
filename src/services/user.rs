//! User service: email login with implicit sign-up, host badge.
//!
//! There is no password or session: callers identify themselves by the
//! numeric user id returned from login, which clients cache locally.

use sqlx::PgPool;

#[derive(Debug, thiserror::Error)]
pub enum UserError {
    #[error("user not found: {0}")]
    NotFound(i64),
    #[error("email is required")]
    EmptyEmail,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Row returned from user queries.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub nickname: String,
    pub is_host: bool,
    pub region: Option<String>,
}

/// Nickname used when sign-up omits one: the local part of the email.
#[must_use]
pub fn default_nickname(email: &str) -> String {
    let local = email.split('@').next().unwrap_or_default().trim();
    if local.is_empty() { email.trim().to_owned() } else { local.to_owned() }
}

/// Log in by email, creating the user on first sight.
///
/// An existing user keeps their stored nickname; `nickname` only applies
/// to sign-up.
///
/// # Errors
///
/// Returns `EmptyEmail` for a blank email, or a database error.
pub async fn login(pool: &PgPool, email: &str, nickname: Option<&str>) -> Result<UserRow, UserError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(UserError::EmptyEmail);
    }

    let nickname = nickname
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map_or_else(|| default_nickname(email), ToOwned::to_owned);

    // The no-op update makes RETURNING yield the existing row on conflict.
    let row = sqlx::query_as::<_, UserRow>(
        r"INSERT INTO users (email, nickname)
          VALUES ($1, $2)
          ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
          RETURNING id, email, nickname, is_host, region",
    )
    .bind(email)
    .bind(&nickname)
    .fetch_one(pool)
    .await?;

    tracing::info!(user_id = row.id, "user logged in");
    Ok(row)
}

/// Fetch one user.
///
/// # Errors
///
/// Returns `NotFound` if the id is unknown.
pub async fn get_user(pool: &PgPool, user_id: i64) -> Result<UserRow, UserError> {
    sqlx::query_as::<_, UserRow>("SELECT id, email, nickname, is_host, region FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or(UserError::NotFound(user_id))
}

/// Grant the host badge.
///
/// # Errors
///
/// Returns `NotFound` if the id is unknown.
pub async fn promote_host(pool: &PgPool, user_id: i64) -> Result<(), UserError> {
    let result = sqlx::query("UPDATE users SET is_host = TRUE WHERE id = $1")
        .bind(user_id)
        .execute(pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(UserError::NotFound(user_id));
    }
    tracing::info!(user_id, "host badge granted");
    Ok(())
}

#[cfg(test)]
#[path = "user_test.rs"]
mod tests;
