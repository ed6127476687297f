//! MacroBaby catalog: curated YAML seed plus the live suggestion proxy.
//!
//! MacroBaby exposes no affiliate feed. Its baseline catalog presence is a
//! seed file imported like any other source; on top of that, a suggestion
//! endpoint can be proxied live for personalization surfaces. The proxy is
//! a soft path: callers degrade to an empty list on failure.

use serde::Deserialize;
use serde_json::Value;

use layette_core::seed::SeedFile;
use layette_core::{ensure_id, rewrite_affiliate_url, CatalogProduct, Source};

use crate::client::FeedClient;
use crate::error::FeedError;
use crate::json::{first_number, first_str};

/// Maps the validated seed file to canonical catalog products.
#[must_use]
pub fn seed_catalog(seed: &SeedFile) -> Vec<CatalogProduct> {
    seed.products
        .iter()
        .map(|p| {
            let external_id = ensure_id(p.id.as_deref(), p.url.as_deref(), Some(&p.title));
            let affiliate_url = p
                .url
                .as_deref()
                .map(|url| rewrite_affiliate_url(url, Source::Macro));
            CatalogProduct {
                external_id,
                title: p.title.clone(),
                brand: p.brand.clone(),
                category: p.category.clone(),
                image: p.image.clone(),
                url: p.url.clone(),
                affiliate_url,
                price: p.price.filter(|v| v.is_finite()),
                retailer: p
                    .retailer
                    .clone()
                    .or_else(|| Some("MacroBaby".to_owned())),
                source: Source::Macro,
            }
        })
        .collect()
}

/// Known envelope shapes for the suggestion proxy payload.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SuggestEnvelope {
    Products { products: Vec<Value> },
    Suggestions { suggestions: Vec<Value> },
    Bare(Vec<Value>),
}

/// Unwraps the suggestion payload envelope into its record list.
/// Unrecognized envelopes yield an empty list.
#[must_use]
pub fn suggest_items(payload: Value) -> Vec<Value> {
    match serde_json::from_value::<SuggestEnvelope>(payload) {
        Ok(SuggestEnvelope::Products { products }) => products,
        Ok(SuggestEnvelope::Suggestions { suggestions } | SuggestEnvelope::Bare(suggestions)) => {
            suggestions
        }
        Err(_) => Vec::new(),
    }
}

/// Maps one suggestion record to the canonical catalog shape.
/// Records with no derivable title are dropped.
#[must_use]
pub fn normalize_suggestion(record: &Value) -> Option<CatalogProduct> {
    let title = first_str(record, &["title", "name", "productName"])?;

    let raw_id = first_str(record, &["id", "sku", "productId"]);
    let url = first_str(record, &["url", "productUrl", "link"]);
    let external_id = ensure_id(raw_id.as_deref(), url.as_deref(), Some(&title));
    let affiliate_url = url
        .as_deref()
        .map(|u| rewrite_affiliate_url(u, Source::Macro));

    Some(CatalogProduct {
        external_id,
        title,
        brand: first_str(record, &["brand", "manufacturer"]),
        category: first_str(record, &["category"]),
        image: first_str(record, &["image", "imageUrl"]),
        url,
        affiliate_url,
        price: first_number(record, &["price", "salePrice"]),
        retailer: Some("MacroBaby".to_owned()),
        source: Source::Macro,
    })
}

/// Fetches live product suggestions from the MacroBaby proxy endpoint.
///
/// This is the soft personalization path: callers are expected to catch
/// the error, log, and show nothing rather than fail the page.
///
/// # Errors
///
/// Returns [`FeedError`] on network failure, a non-2xx response, or a body
/// that is not JSON at all.
pub async fn fetch_macrobaby_suggestions(
    client: &FeedClient,
    suggest_url: &str,
) -> Result<Vec<CatalogProduct>, FeedError> {
    let payload = client.get_json(suggest_url, None).await?;

    let records = suggest_items(payload);
    tracing::debug!(records = records.len(), "unwrapped macrobaby suggestions");

    Ok(records.iter().filter_map(normalize_suggestion).collect())
}
