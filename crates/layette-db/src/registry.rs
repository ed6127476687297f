//! Database operations for the `registry_items` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::{hash_map::Entry, HashMap};
use uuid::Uuid;

use layette_core::Source;

use crate::DbError;

/// A registry item ready for insertion, already normalized: `external_id`
/// resolved, price coerced, affiliate URL rewritten.
#[derive(Debug, Clone)]
pub struct NewRegistryItem {
    pub external_id: String,
    pub title: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub affiliate_url: Option<String>,
    pub price: Option<f64>,
    pub retailer: Option<String>,
    pub source: Source,
    pub imported_from: Option<String>,
}

/// A row from the `registry_items` table, joined with the latest mentor note.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RegistryItemRow {
    pub id: i64,
    pub user_id: Uuid,
    pub external_id: String,
    pub title: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub affiliate_url: Option<String>,
    pub price: Option<Decimal>,
    pub retailer: Option<String>,
    pub source: String,
    pub imported_from: Option<String>,
    /// Most recently updated note across mentors, if any.
    pub mentor_note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const REGISTRY_ITEM_COLUMNS: &str = "r.id, r.user_id, r.external_id, r.title, r.brand, \
     r.category, r.description, r.image, r.url, r.affiliate_url, r.price, r.retailer, \
     r.source, r.imported_from, n.note AS mentor_note, r.created_at, r.updated_at";

const LATEST_NOTE_JOIN: &str = "LEFT JOIN LATERAL (\
         SELECT note FROM registry_notes \
         WHERE registry_item_id = r.id \
         ORDER BY updated_at DESC, id DESC \
         LIMIT 1) n ON TRUE";

/// Insert new registry items for one user and refresh existing ones.
///
/// Returns `(new_count, updated_count)`. Identity within a registry is
/// `(user_id, external_id)`, so re-importing the same feed converges on the
/// same rows. The whole batch runs as one `INSERT … UNNEST … ON CONFLICT`
/// statement, which makes it atomic without an explicit transaction.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn upsert_registry_items(
    pool: &PgPool,
    user_id: Uuid,
    items: &[NewRegistryItem],
) -> Result<(u64, u64), DbError> {
    if items.is_empty() {
        return Ok((0, 0));
    }

    // Postgres rejects ON CONFLICT batches that touch the same row twice.
    // Keep the last occurrence of each external_id, matching the outcome of
    // upserting the batch sequentially.
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut deduped: Vec<&NewRegistryItem> = Vec::with_capacity(items.len());
    for item in items {
        match index.entry(item.external_id.as_str()) {
            Entry::Occupied(slot) => deduped[*slot.get()] = item,
            Entry::Vacant(slot) => {
                slot.insert(deduped.len());
                deduped.push(item);
            }
        }
    }

    let mut external_ids: Vec<String> = Vec::with_capacity(deduped.len());
    let mut titles: Vec<String> = Vec::with_capacity(deduped.len());
    let mut brands: Vec<Option<String>> = Vec::with_capacity(deduped.len());
    let mut categories: Vec<Option<String>> = Vec::with_capacity(deduped.len());
    let mut descriptions: Vec<Option<String>> = Vec::with_capacity(deduped.len());
    let mut images: Vec<Option<String>> = Vec::with_capacity(deduped.len());
    let mut urls: Vec<Option<String>> = Vec::with_capacity(deduped.len());
    let mut affiliate_urls: Vec<Option<String>> = Vec::with_capacity(deduped.len());
    let mut prices: Vec<Option<f64>> = Vec::with_capacity(deduped.len());
    let mut retailers: Vec<Option<String>> = Vec::with_capacity(deduped.len());
    let mut sources: Vec<String> = Vec::with_capacity(deduped.len());
    let mut imported_froms: Vec<Option<String>> = Vec::with_capacity(deduped.len());

    for item in &deduped {
        external_ids.push(item.external_id.clone());
        titles.push(item.title.clone());
        brands.push(item.brand.clone());
        categories.push(item.category.clone());
        descriptions.push(item.description.clone());
        images.push(item.image.clone());
        urls.push(item.url.clone());
        affiliate_urls.push(item.affiliate_url.clone());
        prices.push(item.price);
        retailers.push(item.retailer.clone());
        sources.push(item.source.as_str().to_string());
        imported_froms.push(item.imported_from.clone());
    }

    let rows: Vec<bool> = sqlx::query_scalar::<_, bool>(
        "INSERT INTO registry_items \
             (user_id, external_id, title, brand, category, description, image, \
              url, affiliate_url, price, retailer, source, imported_from) \
         SELECT $1, * FROM UNNEST(\
              $2::text[], $3::text[], $4::text[], $5::text[], $6::text[], \
              $7::text[], $8::text[], $9::text[], $10::numeric(10,2)[], \
              $11::text[], $12::text[], $13::text[]) \
         ON CONFLICT (user_id, external_id) DO UPDATE SET \
             title         = EXCLUDED.title, \
             brand         = EXCLUDED.brand, \
             category      = EXCLUDED.category, \
             description   = EXCLUDED.description, \
             image         = EXCLUDED.image, \
             url           = EXCLUDED.url, \
             affiliate_url = EXCLUDED.affiliate_url, \
             price         = EXCLUDED.price, \
             retailer      = EXCLUDED.retailer, \
             source        = EXCLUDED.source, \
             imported_from = EXCLUDED.imported_from, \
             updated_at    = NOW() \
         RETURNING (xmax = 0) AS is_new",
    )
    .bind(user_id)
    .bind(&external_ids)
    .bind(&titles)
    .bind(&brands)
    .bind(&categories)
    .bind(&descriptions)
    .bind(&images)
    .bind(&urls)
    .bind(&affiliate_urls)
    .bind(&prices)
    .bind(&retailers)
    .bind(&sources)
    .bind(&imported_froms)
    .fetch_all(pool)
    .await?;

    let new_count = rows.iter().filter(|&&is_new| is_new).count() as u64;
    let updated_count = rows.len() as u64 - new_count;

    Ok((new_count, updated_count))
}

/// Returns every registry item for a user, newest first, each carrying the
/// most recently updated mentor note.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_registry_items(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Vec<RegistryItemRow>, DbError> {
    let sql = format!(
        "SELECT {REGISTRY_ITEM_COLUMNS} \
         FROM registry_items r \
         {LATEST_NOTE_JOIN} \
         WHERE r.user_id = $1 \
         ORDER BY r.created_at DESC, r.id DESC"
    );

    let rows = sqlx::query_as::<_, RegistryItemRow>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Fetches one registry item by id, scoped to the owning user.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if the item does not exist or belongs to a
/// different user, or [`DbError::Sqlx`] if the query fails.
pub async fn get_registry_item(
    pool: &PgPool,
    user_id: Uuid,
    item_id: i64,
) -> Result<RegistryItemRow, DbError> {
    let sql = format!(
        "SELECT {REGISTRY_ITEM_COLUMNS} \
         FROM registry_items r \
         {LATEST_NOTE_JOIN} \
         WHERE r.user_id = $1 AND r.id = $2"
    );

    let row = sqlx::query_as::<_, RegistryItemRow>(&sql)
        .bind(user_id)
        .bind(item_id)
        .fetch_optional(pool)
        .await?
        .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Deletes one registry item, scoped to the owning user. Notes cascade away
/// with the row.
///
/// Returns the number of rows deleted (0 or 1).
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_registry_item(
    pool: &PgPool,
    user_id: Uuid,
    item_id: i64,
) -> Result<u64, DbError> {
    let result = sqlx::query("DELETE FROM registry_items WHERE user_id = $1 AND id = $2")
        .bind(user_id)
        .bind(item_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
