//! TTL-cached MacroBaby product suggestions.
//!
//! This is a soft personalization path: any failure (missing config, network,
//! bad payload, unreadable cache entry) degrades to an empty list with a
//! warning, never an error. The widget that renders suggestions simply shows
//! nothing.

use std::time::Duration;

use layette_core::{AppConfig, CatalogProduct, Category, KeyValueStore};
use layette_feeds::{fetch_macrobaby_suggestions, FeedClient};

const SUGGEST_CACHE_KEY: &str = "suggest:macrobaby";

/// Returns MacroBaby suggestions, optionally filtered to one taxonomy bucket.
///
/// The full suggestion list is cached in the injected store under a single
/// key for `config.suggest_cache_ttl_secs`, so per-bucket calls share one
/// upstream fetch.
pub async fn cached_suggestions(
    kv: &dyn KeyValueStore,
    client: &FeedClient,
    config: &AppConfig,
    bucket: Option<Category>,
) -> Vec<CatalogProduct> {
    let products = match suggestion_pool(kv, client, config).await {
        Ok(products) => products,
        Err(e) => {
            tracing::warn!(error = %e, "macrobaby suggestions unavailable; returning none");
            return Vec::new();
        }
    };

    match bucket {
        Some(bucket) => products
            .into_iter()
            .filter(|p| p.category_bucket() == bucket)
            .collect(),
        None => products,
    }
}

async fn suggestion_pool(
    kv: &dyn KeyValueStore,
    client: &FeedClient,
    config: &AppConfig,
) -> Result<Vec<CatalogProduct>, layette_feeds::FeedError> {
    if let Some(cached) = kv.get(SUGGEST_CACHE_KEY).await {
        match serde_json::from_str::<Vec<CatalogProduct>>(&cached) {
            Ok(products) => {
                tracing::debug!(
                    products = products.len(),
                    "served macrobaby suggestions from cache"
                );
                return Ok(products);
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable suggestion cache entry");
                kv.delete(SUGGEST_CACHE_KEY).await;
            }
        }
    }

    let Some(suggest_url) = config.macrobaby_suggest_url.as_deref() else {
        tracing::warn!("macrobaby suggest url is not configured");
        return Ok(Vec::new());
    };

    let products = fetch_macrobaby_suggestions(client, suggest_url).await?;

    match serde_json::to_string(&products) {
        Ok(serialized) => {
            kv.set(
                SUGGEST_CACHE_KEY,
                serialized,
                Some(Duration::from_secs(config.suggest_cache_ttl_secs)),
            )
            .await;
        }
        Err(e) => {
            tracing::warn!(error = %e, "could not serialize suggestions for caching");
        }
    }

    Ok(products)
}
