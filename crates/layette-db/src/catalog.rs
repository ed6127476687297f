//! Database operations for the `catalog_items` table.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::collections::{hash_map::Entry, HashMap};

use layette_core::{resolve_category, CatalogProduct, Category, Source};

use crate::DbError;

/// A row from the `catalog_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CatalogItemRow {
    pub id: i64,
    pub source: String,
    pub external_id: String,
    pub title: String,
    pub brand: Option<String>,
    /// Raw upstream category text; see [`CatalogItemRow::category_bucket`].
    pub category: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub affiliate_url: Option<String>,
    pub price: Option<Decimal>,
    pub retailer: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogItemRow {
    /// Taxonomy bucket resolved from the stored raw category text.
    #[must_use]
    pub fn category_bucket(&self) -> Category {
        resolve_category(self.category.as_deref())
    }
}

/// Insert new catalog items and refresh existing ones.
///
/// Returns `(new_count, updated_count)` where:
/// - `new_count`: rows that did not exist before (were inserted)
/// - `updated_count`: rows that already existed (were updated)
///
/// Uses a single `INSERT … SELECT * FROM UNNEST(…) ON CONFLICT` so that
/// the entire batch is upserted in one round-trip regardless of batch size.
///
/// Prices are bound as `Option<f64>` slices and cast to `NUMERIC(10,2)[]`
/// inside the SQL statement so that the database engine performs the type
/// coercion consistently.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn upsert_catalog_items(
    pool: &PgPool,
    products: &[CatalogProduct],
) -> Result<(u64, u64), DbError> {
    if products.is_empty() {
        return Ok((0, 0));
    }

    // Postgres rejects ON CONFLICT batches that touch the same row twice.
    // Keep the last occurrence of each (source, external_id), matching the
    // outcome of upserting the batch sequentially.
    let mut index: HashMap<(Source, &str), usize> = HashMap::new();
    let mut deduped: Vec<&CatalogProduct> = Vec::with_capacity(products.len());
    for product in products {
        match index.entry((product.source, product.external_id.as_str())) {
            Entry::Occupied(slot) => deduped[*slot.get()] = product,
            Entry::Vacant(slot) => {
                slot.insert(deduped.len());
                deduped.push(product);
            }
        }
    }

    // Collect each column into a parallel Vec for UNNEST binding.
    let mut sources: Vec<String> = Vec::with_capacity(deduped.len());
    let mut external_ids: Vec<String> = Vec::with_capacity(deduped.len());
    let mut titles: Vec<String> = Vec::with_capacity(deduped.len());
    let mut brands: Vec<Option<String>> = Vec::with_capacity(deduped.len());
    let mut categories: Vec<Option<String>> = Vec::with_capacity(deduped.len());
    let mut images: Vec<Option<String>> = Vec::with_capacity(deduped.len());
    let mut urls: Vec<Option<String>> = Vec::with_capacity(deduped.len());
    let mut affiliate_urls: Vec<Option<String>> = Vec::with_capacity(deduped.len());
    let mut prices: Vec<Option<f64>> = Vec::with_capacity(deduped.len());
    let mut retailers: Vec<Option<String>> = Vec::with_capacity(deduped.len());

    for product in &deduped {
        sources.push(product.source.as_str().to_string());
        external_ids.push(product.external_id.clone());
        titles.push(product.title.clone());
        brands.push(product.brand.clone());
        categories.push(product.category.clone());
        images.push(product.image.clone());
        urls.push(product.url.clone());
        affiliate_urls.push(product.affiliate_url.clone());
        prices.push(product.price);
        retailers.push(product.retailer.clone());
    }

    let rows: Vec<bool> = sqlx::query_scalar::<_, bool>(
        "INSERT INTO catalog_items \
             (source, external_id, title, brand, category, image, url, \
              affiliate_url, price, retailer) \
         SELECT * FROM UNNEST(\
              $1::text[], $2::text[], $3::text[], $4::text[], $5::text[], \
              $6::text[], $7::text[], $8::text[], $9::numeric(10,2)[], $10::text[]) \
         ON CONFLICT (source, external_id) DO UPDATE SET \
             title         = EXCLUDED.title, \
             brand         = EXCLUDED.brand, \
             category      = EXCLUDED.category, \
             image         = EXCLUDED.image, \
             url           = EXCLUDED.url, \
             affiliate_url = EXCLUDED.affiliate_url, \
             price         = EXCLUDED.price, \
             retailer      = EXCLUDED.retailer, \
             updated_at    = NOW() \
         RETURNING (xmax = 0) AS is_new",
    )
    .bind(&sources)
    .bind(&external_ids)
    .bind(&titles)
    .bind(&brands)
    .bind(&categories)
    .bind(&images)
    .bind(&urls)
    .bind(&affiliate_urls)
    .bind(&prices)
    .bind(&retailers)
    .fetch_all(pool)
    .await?;

    let new_count = rows.iter().filter(|&&is_new| is_new).count() as u64;
    let updated_count = rows.len() as u64 - new_count;

    Ok((new_count, updated_count))
}

/// Fetches a single catalog item by its upsert key.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no row matches, or [`DbError::Sqlx`]
/// if the query fails.
pub async fn get_catalog_item(
    pool: &PgPool,
    source: Source,
    external_id: &str,
) -> Result<CatalogItemRow, DbError> {
    let row = sqlx::query_as::<_, CatalogItemRow>(
        "SELECT id, source, external_id, title, brand, category, image, url, \
                affiliate_url, price, retailer, created_at, updated_at \
         FROM catalog_items \
         WHERE source = $1 AND external_id = $2",
    )
    .bind(source.as_str())
    .bind(external_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    Ok(row)
}

/// Counts catalog items, optionally restricted to one source.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn count_catalog_items(pool: &PgPool, source: Option<Source>) -> Result<i64, DbError> {
    let count = sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM catalog_items \
         WHERE ($1::text IS NULL OR source = $1)",
    )
    .bind(source.map(Source::as_str))
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Returns the most recently updated catalog items, optionally restricted
/// to one source.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_catalog_items(
    pool: &PgPool,
    source: Option<Source>,
    limit: i64,
) -> Result<Vec<CatalogItemRow>, DbError> {
    let rows = sqlx::query_as::<_, CatalogItemRow>(
        "SELECT id, source, external_id, title, brand, category, image, url, \
                affiliate_url, price, retailer, created_at, updated_at \
         FROM catalog_items \
         WHERE ($1::text IS NULL OR source = $1) \
         ORDER BY updated_at DESC, id DESC \
         LIMIT $2",
    )
    .bind(source.map(Source::as_str))
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}
