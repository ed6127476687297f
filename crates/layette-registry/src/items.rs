//! Registry item persistence and the personal-vs-catalog merge.

use std::collections::HashSet;

use sqlx::PgPool;
use uuid::Uuid;

use layette_core::{ensure_id, rewrite_affiliate_url, CatalogProduct, RegistryItemDraft};
use layette_db::{
    delete_registry_item, list_registry_items, upsert_registry_items, DbError, NewRegistryItem,
    RegistryItemRow,
};

use crate::error::RegistryError;

/// One entry in a user's merged registry view.
#[derive(Debug, Clone)]
pub enum RegistryEntry {
    /// An item the user owns.
    Personal(RegistryItemRow),
    /// A catalog product shown alongside, not owned by the user.
    Suggestion(CatalogProduct),
}

impl RegistryEntry {
    #[must_use]
    pub fn external_id(&self) -> &str {
        match self {
            RegistryEntry::Personal(row) => &row.external_id,
            RegistryEntry::Suggestion(product) => &product.external_id,
        }
    }

    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            RegistryEntry::Personal(row) => &row.title,
            RegistryEntry::Suggestion(product) => &product.title,
        }
    }
}

/// Normalizes a draft for persistence: resolve the identity chain into a
/// stable `external_id`, apply the affiliate rewrite for the draft's source,
/// and drop a non-finite price.
#[must_use]
pub fn normalize_draft(draft: &RegistryItemDraft) -> NewRegistryItem {
    let external_id = ensure_id(
        draft.identity_hint(),
        draft.url.as_deref(),
        Some(&draft.title),
    );
    let affiliate_url = draft
        .url
        .as_deref()
        .map(|u| rewrite_affiliate_url(u, draft.source));

    NewRegistryItem {
        external_id,
        title: draft.title.clone(),
        brand: draft.brand.clone(),
        category: draft.category.clone(),
        description: draft.description.clone(),
        image: draft.image.clone(),
        url: draft.url.clone(),
        affiliate_url,
        price: draft.price.filter(|p| p.is_finite()),
        retailer: draft.retailer.clone(),
        source: draft.source,
        imported_from: draft.imported_from.clone(),
    }
}

/// Adds a batch of drafts to a user's registry and returns the full updated
/// registry, newest first.
///
/// The batch is upserted on `(user_id, external_id)` in one statement, so a
/// re-sync of the same external list updates rows in place and the whole
/// batch commits or rolls back together.
///
/// # Errors
///
/// Returns [`RegistryError::Db`] if the upsert or the follow-up list fails.
pub async fn add_items_to_user_registry(
    pool: &PgPool,
    user_id: Uuid,
    drafts: &[RegistryItemDraft],
) -> Result<Vec<RegistryItemRow>, RegistryError> {
    let items: Vec<NewRegistryItem> = drafts.iter().map(normalize_draft).collect();

    let (new_count, updated_count) = upsert_registry_items(pool, user_id, &items).await?;
    tracing::debug!(
        user = %user_id,
        new = new_count,
        updated = updated_count,
        "registry batch upserted"
    );

    Ok(list_registry_items(pool, user_id).await?)
}

/// Merges a user's personal items with affiliate-catalog suggestions.
///
/// Personal items come first and always win: a catalog product whose
/// `external_id` already appears in the personal list is dropped, so a
/// user's customized copy of an item is never shadowed by the generic
/// catalog version.
#[must_use]
pub fn merge_items(
    personal: Vec<RegistryItemRow>,
    affiliate: Vec<CatalogProduct>,
) -> Vec<RegistryEntry> {
    let owned: HashSet<String> = personal
        .iter()
        .map(|row| row.external_id.clone())
        .collect();

    let mut entries: Vec<RegistryEntry> =
        personal.into_iter().map(RegistryEntry::Personal).collect();
    entries.extend(
        affiliate
            .into_iter()
            .filter(|product| !owned.contains(&product.external_id))
            .map(RegistryEntry::Suggestion),
    );

    entries
}

/// Loads a user's registry and merges it with the given affiliate items via
/// [`merge_items`].
///
/// # Errors
///
/// Returns [`RegistryError::Db`] if the registry cannot be loaded.
pub async fn merge_affiliate_feeds(
    pool: &PgPool,
    user_id: Uuid,
    affiliate_items: Vec<CatalogProduct>,
) -> Result<Vec<RegistryEntry>, RegistryError> {
    let personal = list_registry_items(pool, user_id).await?;
    Ok(merge_items(personal, affiliate_items))
}

/// Removes one item from a user's registry; attached notes cascade away.
///
/// # Errors
///
/// Returns [`RegistryError::NotFound`] when the item does not exist or
/// belongs to another user, or [`RegistryError::Db`] if the delete fails.
pub async fn remove_registry_item(
    pool: &PgPool,
    user_id: Uuid,
    item_id: i64,
) -> Result<(), RegistryError> {
    let removed = delete_registry_item(pool, user_id, item_id)
        .await
        .map_err(RegistryError::Db)?;
    if removed == 0 {
        return Err(RegistryError::NotFound { item_id });
    }

    tracing::debug!(user = %user_id, item = item_id, "registry item removed");
    Ok(())
}

pub(crate) fn map_not_found(err: DbError, item_id: i64) -> RegistryError {
    match err {
        DbError::NotFound => RegistryError::NotFound { item_id },
        other => RegistryError::Db(other),
    }
}
