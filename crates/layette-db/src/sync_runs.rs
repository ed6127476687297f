//! Database operations for the `sync_runs` table.
//!
//! Every catalog sync is recorded as a run that moves through
//! `queued -> running -> succeeded | failed`. Transitions are guarded by the
//! current status in the `WHERE` clause, so a run can never skip a state or
//! finish twice.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use layette_core::Source;

use crate::DbError;

/// A row from the `sync_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SyncRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub source: String,
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    /// The schema defines this as `INTEGER NOT NULL DEFAULT 0`.
    pub records_processed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Creates a new sync run in `queued` status.
///
/// Generates a UUID in Rust and binds it to `public_id`. Returns the full
/// newly-created row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert or fetch fails.
pub async fn create_sync_run(
    pool: &PgPool,
    source: Source,
    trigger_source: &str,
) -> Result<SyncRunRow, DbError> {
    let public_id = Uuid::new_v4();

    let row = sqlx::query_as::<_, SyncRunRow>(
        "INSERT INTO sync_runs (public_id, source, trigger_source, status) \
         VALUES ($1, $2, $3, 'queued') \
         RETURNING id, public_id, source, trigger_source, status, \
                   started_at, completed_at, records_processed, error_message, created_at",
    )
    .bind(public_id)
    .bind(source.as_str())
    .bind(trigger_source)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Marks a run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidSyncRunTransition`] if the run is not currently
/// `queued`, or [`DbError::Sqlx`] if the update fails.
pub async fn start_sync_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE sync_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidSyncRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a run as `succeeded`, sets `completed_at = NOW()` and `records_processed`.
///
/// # Errors
///
/// Returns [`DbError::InvalidSyncRunTransition`] if the run is not currently
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn complete_sync_run(
    pool: &PgPool,
    id: i64,
    records_processed: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE sync_runs \
         SET status = 'succeeded', completed_at = NOW(), records_processed = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(records_processed)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidSyncRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run as `failed`, sets `completed_at = NOW()` and `error_message`.
///
/// # Errors
///
/// Returns [`DbError::InvalidSyncRunTransition`] if the run is not currently
/// `running`, or [`DbError::Sqlx`] if the update fails.
pub async fn fail_sync_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE sync_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidSyncRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Fetches a single run by its internal `id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row exists with the given `id`, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn get_sync_run(pool: &PgPool, id: i64) -> Result<SyncRunRow, DbError> {
    let row = sqlx::query_as::<_, SyncRunRow>(
        "SELECT id, public_id, source, trigger_source, status, \
                started_at, completed_at, records_processed, error_message, created_at \
         FROM sync_runs \
         WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Returns the most recent `limit` runs, ordered by `created_at DESC`.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sync_runs(pool: &PgPool, limit: i64) -> Result<Vec<SyncRunRow>, DbError> {
    let rows = sqlx::query_as::<_, SyncRunRow>(
        "SELECT id, public_id, source, trigger_source, status, \
                started_at, completed_at, records_processed, error_message, created_at \
         FROM sync_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
