//! Database operations for the `registry_notes` table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `registry_notes` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RegistryNoteRow {
    pub id: i64,
    pub registry_item_id: i64,
    pub mentor_id: Uuid,
    pub note: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Inserts or replaces the note one mentor keeps on one registry item.
///
/// Conflicts on `(registry_item_id, mentor_id)` replace the note text and
/// bump `updated_at`, so a mentor editing their note never creates a second
/// row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails, including when
/// `registry_item_id` does not reference an existing item.
pub async fn upsert_registry_note(
    pool: &PgPool,
    registry_item_id: i64,
    mentor_id: Uuid,
    note: &str,
) -> Result<RegistryNoteRow, DbError> {
    let row = sqlx::query_as::<_, RegistryNoteRow>(
        "INSERT INTO registry_notes (registry_item_id, mentor_id, note) \
         VALUES ($1, $2, $3) \
         ON CONFLICT (registry_item_id, mentor_id) DO UPDATE SET \
             note       = EXCLUDED.note, \
             updated_at = NOW() \
         RETURNING id, registry_item_id, mentor_id, note, created_at, updated_at",
    )
    .bind(registry_item_id)
    .bind(mentor_id)
    .bind(note)
    .fetch_one(pool)
    .await?;

    Ok(row)
}

/// Removes one mentor's note from a registry item.
///
/// Returns the number of rows deleted (0 or 1).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_registry_note(
    pool: &PgPool,
    registry_item_id: i64,
    mentor_id: Uuid,
) -> Result<u64, DbError> {
    let result =
        sqlx::query("DELETE FROM registry_notes WHERE registry_item_id = $1 AND mentor_id = $2")
            .bind(registry_item_id)
            .bind(mentor_id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected())
}

/// Returns the most recently updated note on an item, across all mentors.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn latest_note(
    pool: &PgPool,
    registry_item_id: i64,
) -> Result<Option<RegistryNoteRow>, DbError> {
    let row = sqlx::query_as::<_, RegistryNoteRow>(
        "SELECT id, registry_item_id, mentor_id, note, created_at, updated_at \
         FROM registry_notes \
         WHERE registry_item_id = $1 \
         ORDER BY updated_at DESC, id DESC \
         LIMIT 1",
    )
    .bind(registry_item_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}
