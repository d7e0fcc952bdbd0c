//! Typing record queries

use crate::db::models::{NewPracticeRecord, PracticeRecord};
use crate::{Error, Result};
use chrono::Utc;
use sqlx::SqlitePool;

/// Store one result for `user_id`; `created_at` is assigned here
pub async fn insert_record(
    pool: &SqlitePool,
    user_id: i64,
    record: NewPracticeRecord,
) -> Result<PracticeRecord> {
    let id = sqlx::query(
        "INSERT INTO typing_records (user_id, cps, accuracy, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(user_id)
    .bind(record.cps())
    .bind(record.accuracy())
    .bind(Utc::now())
    .execute(pool)
    .await?
    .last_insert_rowid();

    sqlx::query_as::<_, PracticeRecord>(
        "SELECT id, user_id, cps, accuracy, created_at FROM typing_records WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| Error::Internal(format!("typing record {} vanished after insert", id)))
}

/// The `limit` most recent records, returned oldest first
pub async fn recent_records(
    pool: &SqlitePool,
    user_id: i64,
    limit: i64,
) -> Result<Vec<PracticeRecord>> {
    let mut records = sqlx::query_as::<_, PracticeRecord>(
        r#"
        SELECT id, user_id, cps, accuracy, created_at
        FROM typing_records
        WHERE user_id = ?
        ORDER BY created_at DESC, id DESC
        LIMIT ?
        "#,
    )
    .bind(user_id)
    .bind(limit.max(0))
    .fetch_all(pool)
    .await?;

    records.reverse();
    Ok(records)
}

pub async fn count_records(pool: &SqlitePool, user_id: i64) -> Result<i64> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM typing_records WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(pool)
        .await?;
    Ok(count)
}
