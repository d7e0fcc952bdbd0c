//! Account queries

use crate::db::models::Account;
use crate::{Error, Result};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

/// Insert a new account. Email uniqueness violations map to `Error::Conflict`.
pub async fn create_account(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<Account> {
    let result = sqlx::query(
        "INSERT INTO users (username, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(Utc::now())
    .execute(pool)
    .await;

    let id = match result {
        Ok(done) => done.last_insert_rowid(),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            return Err(Error::Conflict(format!("account already exists: {}", e.message())));
        }
        Err(e) => return Err(e.into()),
    };

    info!(account_id = id, username = %username, "Account created");

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| Error::Internal(format!("account {} vanished after insert", id)))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        "SELECT id, username, email, password_hash, created_at FROM users WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(account)
}

/// Case-insensitive email lookup
pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        "SELECT id, username, email, password_hash, created_at FROM users WHERE email = ? COLLATE NOCASE",
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(account)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> Result<Option<Account>> {
    let account = sqlx::query_as::<_, Account>(
        "SELECT id, username, email, password_hash, created_at FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await?;
    Ok(account)
}

pub async fn email_exists(pool: &SqlitePool, email: &str) -> Result<bool> {
    Ok(find_by_email(pool, email).await?.is_some())
}

/// First free username: `base`, then `base1`, `base2`, ...
pub async fn unique_username(pool: &SqlitePool, base: &str) -> Result<String> {
    let mut candidate = base.to_string();
    let mut suffix = 1;
    while find_by_username(pool, &candidate).await?.is_some() {
        candidate = format!("{}{}", base, suffix);
        suffix += 1;
    }
    Ok(candidate)
}

/// Delete an account with its sessions and typing records in one transaction.
///
/// Returns `false` when the account did not exist.
pub async fn delete_account(pool: &SqlitePool, id: i64) -> Result<bool> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM typing_records WHERE user_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM sessions WHERE user_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let deleted = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    if deleted > 0 {
        info!(account_id = id, "Account deleted");
    }
    Ok(deleted > 0)
}
