//! Mentor note overlay on registry items.

use sqlx::PgPool;
use uuid::Uuid;

use layette_db::{
    delete_registry_note, get_registry_item, upsert_registry_note, RegistryNoteRow,
};

use crate::error::RegistryError;
use crate::items::map_not_found;

/// Saves a mentor's note on one of a user's registry items.
///
/// An empty or whitespace-only note clears the mentor's existing note and
/// returns `None`; anything else is upserted (one note per mentor per item)
/// and returned. The item's displayed note is derived elsewhere as the most
/// recently updated note across mentors, so clearing one mentor's note
/// falls back to the next most recent.
///
/// # Errors
///
/// Returns [`RegistryError::NotFound`] when the item is absent from this
/// user's registry, or [`RegistryError::Db`] on query failure.
pub async fn save_registry_note(
    pool: &PgPool,
    user_id: Uuid,
    item_id: i64,
    mentor_id: Uuid,
    note: &str,
) -> Result<Option<RegistryNoteRow>, RegistryError> {
    let item = get_registry_item(pool, user_id, item_id)
        .await
        .map_err(|e| map_not_found(e, item_id))?;

    let trimmed = note.trim();
    if trimmed.is_empty() {
        let removed = delete_registry_note(pool, item.id, mentor_id).await?;
        tracing::debug!(item = item.id, mentor = %mentor_id, removed, "mentor note cleared");
        return Ok(None);
    }

    let row = upsert_registry_note(pool, item.id, mentor_id, trimmed).await?;
    Ok(Some(row))
}
