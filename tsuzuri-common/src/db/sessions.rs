//! Login sessions keyed by an opaque cookie token
//!
//! A session is valid for `max_age` after it was created. Expired rows are
//! ignored on lookup and pruned whenever a new session starts.

use crate::auth::generate_session_token;
use crate::db::models::Account;
use crate::Result;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tracing::debug;

/// Oldest `created_at` still accepted
fn cutoff(max_age: Duration) -> DateTime<Utc> {
    Utc::now()
        .checked_sub_signed(max_age)
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Start a session for `user_id` and return its token
pub async fn create_session(pool: &SqlitePool, user_id: i64, max_age: Duration) -> Result<String> {
    prune_expired(pool, max_age).await?;

    let token = generate_session_token();
    sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
        .bind(&token)
        .bind(user_id)
        .bind(Utc::now())
        .execute(pool)
        .await?;
    Ok(token)
}

/// Account owning the session, if the token is known and not expired
pub async fn account_for_session(
    pool: &SqlitePool,
    token: &str,
    max_age: Duration,
) -> Result<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        r#"
        SELECT u.id, u.username, u.email, u.password_hash, u.created_at
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.token = ? AND s.created_at > ?
        "#,
    )
    .bind(token)
    .bind(cutoff(max_age))
    .fetch_optional(pool)
    .await?;
    Ok(account)
}

/// Delete every session older than `max_age`; returns the number removed
pub async fn prune_expired(pool: &SqlitePool, max_age: Duration) -> Result<u64> {
    let removed = sqlx::query("DELETE FROM sessions WHERE created_at <= ?")
        .bind(cutoff(max_age))
        .execute(pool)
        .await?
        .rows_affected();

    if removed > 0 {
        debug!(removed, "Pruned expired sessions");
    }
    Ok(removed)
}

pub async fn delete_session(pool: &SqlitePool, token: &str) -> Result<()> {
    sqlx::query("DELETE FROM sessions WHERE token = ?")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}
