//! Impact affiliate network feed: JSON envelope adaptation and normalization.

use serde::Deserialize;
use serde_json::Value;

use layette_core::{ensure_id, rewrite_affiliate_url, CatalogProduct, Source};

use crate::client::FeedClient;
use crate::error::FeedError;
use crate::json::{first_number, first_str};

/// Known envelope shapes for the Impact product payload.
///
/// The API has shipped all three over time: records wrapped in `items`,
/// a bare top-level array, and records wrapped in `data`. Variants are
/// probed in that order; anything else counts as an empty feed.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ImpactEnvelope {
    Items { items: Vec<Value> },
    Bare(Vec<Value>),
    Data { data: Vec<Value> },
}

/// Unwraps the Impact payload envelope into its record list.
///
/// An unrecognized envelope yields an empty list rather than an error;
/// whole-payload shape drift is treated the same as an empty feed and
/// surfaced through the sync job's zero-entry warning.
#[must_use]
pub fn impact_items(payload: Value) -> Vec<Value> {
    match serde_json::from_value::<ImpactEnvelope>(payload) {
        Ok(ImpactEnvelope::Items { items } | ImpactEnvelope::Bare(items)) => items,
        Ok(ImpactEnvelope::Data { data }) => data,
        Err(_) => Vec::new(),
    }
}

/// Maps one Impact record to the canonical catalog shape.
///
/// Field names vary per advertiser, so every field resolves through an
/// ordered fallback chain. A record with no derivable title is dropped
/// (`None`).
#[must_use]
pub fn normalize_impact_item(record: &Value) -> Option<CatalogProduct> {
    let title = first_str(
        record,
        &["title", "name", "productName", "displayName", "externalId"],
    )?;

    let raw_id = first_str(record, &["externalId", "id", "productId", "sku"]);
    let url = first_str(record, &["url", "productUrl", "link"]);
    let external_id = ensure_id(raw_id.as_deref(), url.as_deref(), Some(&title));

    let affiliate_url = first_str(record, &["affiliateUrl", "trackingUrl", "trackingLink"])
        .or_else(|| {
            url.as_deref()
                .map(|u| rewrite_affiliate_url(u, Source::Impact))
        });

    Some(CatalogProduct {
        external_id,
        title,
        brand: first_str(record, &["brand", "manufacturer", "advertiserName"]),
        category: first_str(record, &["category", "productCategory"]),
        image: first_str(record, &["image", "imageUrl", "thumbnailUrl"]),
        url,
        affiliate_url,
        price: first_number(record, &["price", "currentPrice", "salePrice"]),
        retailer: first_str(record, &["retailer", "campaignName"])
            .or_else(|| Some("Impact Network".to_owned())),
        source: Source::Impact,
    })
}

/// Fetches and normalizes the full Impact catalog feed.
///
/// # Errors
///
/// Returns [`FeedError`] on network failure, a non-2xx response, or a body
/// that is not JSON at all.
pub async fn fetch_impact_catalog(
    client: &FeedClient,
    api_url: &str,
    api_key: &str,
) -> Result<Vec<CatalogProduct>, FeedError> {
    let payload = client.get_json(api_url, Some(api_key)).await?;

    let records = impact_items(payload);
    tracing::debug!(records = records.len(), "unwrapped impact payload");

    Ok(records.iter().filter_map(normalize_impact_item).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> Value {
        json!({
            "externalId": "IMP-77",
            "name": "Video Baby Monitor",
            "brand": "Nanit",
            "price": "129.00",
            "url": "https://shop.example.com/monitors/77",
            "category": "Tech & Monitors"
        })
    }

    #[test]
    fn envelope_items_variant() {
        let items = impact_items(json!({"items": [record()]}));
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn envelope_bare_array_variant() {
        let items = impact_items(json!([record(), record()]));
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn envelope_data_variant() {
        let items = impact_items(json!({"data": [record()]}));
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn envelope_prefers_items_over_data() {
        let items = impact_items(json!({"items": [record()], "data": []}));
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn unknown_envelope_is_empty() {
        assert!(impact_items(json!({"payload": {"nested": true}})).is_empty());
        assert!(impact_items(json!({"items": "not-an-array"})).is_empty());
        assert!(impact_items(json!(42)).is_empty());
    }

    #[test]
    fn normalize_resolves_title_chain() {
        let item = json!({"productName": "Bottle Warmer", "id": 9});
        let product = normalize_impact_item(&item).unwrap();
        assert_eq!(product.title, "Bottle Warmer");
        assert_eq!(product.external_id, "9");
    }

    #[test]
    fn normalize_title_falls_back_to_external_id() {
        let item = json!({"externalId": "IMP-NO-NAME"});
        let product = normalize_impact_item(&item).unwrap();
        assert_eq!(product.title, "IMP-NO-NAME");
    }

    #[test]
    fn normalize_drops_untitled_records() {
        assert!(normalize_impact_item(&json!({"price": 10.0})).is_none());
        assert!(normalize_impact_item(&json!({})).is_none());
    }

    #[test]
    fn normalize_full_record() {
        let product = normalize_impact_item(&record()).unwrap();
        assert_eq!(product.external_id, "IMP-77");
        assert_eq!(product.title, "Video Baby Monitor");
        assert_eq!(product.price, Some(129.0));
        assert_eq!(product.retailer.as_deref(), Some("Impact Network"));
        assert_eq!(product.category.as_deref(), Some("Tech & Monitors"));
        // No tracking link in the feed, so the plain URL gets the parameter.
        assert_eq!(
            product.affiliate_url.as_deref(),
            Some("https://shop.example.com/monitors/77?subId1=layette")
        );
        assert_eq!(product.source, Source::Impact);
    }

    #[test]
    fn normalize_is_deterministic_without_ids() {
        let item = json!({"name": "Mystery Plush"});
        let a = normalize_impact_item(&item).unwrap();
        let b = normalize_impact_item(&item).unwrap();
        assert_eq!(a.external_id, b.external_id);
        assert_eq!(a.external_id.len(), 64);
    }
}
