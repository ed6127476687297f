//! Babylist external registry sync adapter.
//!
//! Same contract as the MyRegistry adapter, different wire dialect:
//! Babylist wraps items in `reg_items` and favors snake_case field names.

use serde::Deserialize;
use serde_json::Value;

use layette_core::{RegistryItemDraft, Source};

use crate::client::FeedClient;
use crate::error::FeedError;
use crate::json::{first_number, first_str};

/// Known envelope shapes for the Babylist items payload.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BabylistEnvelope {
    RegItems { reg_items: Vec<Value> },
    Items { items: Vec<Value> },
    Bare(Vec<Value>),
}

/// Unwraps the Babylist payload envelope into its record list.
/// Unrecognized envelopes yield an empty list.
#[must_use]
pub fn babylist_items(payload: Value) -> Vec<Value> {
    match serde_json::from_value::<BabylistEnvelope>(payload) {
        Ok(BabylistEnvelope::RegItems { reg_items }) => reg_items,
        Ok(BabylistEnvelope::Items { items } | BabylistEnvelope::Bare(items)) => items,
        Err(_) => Vec::new(),
    }
}

/// Maps one Babylist record to a registry item draft.
///
/// `registry_url` is recorded as provenance on every draft. Records with
/// no derivable title are dropped.
#[must_use]
pub fn draft_from_babylist(record: &Value, registry_url: &str) -> Option<RegistryItemDraft> {
    let title = first_str(record, &["title", "name"])?;

    Some(RegistryItemDraft {
        id: first_str(record, &["id"]),
        external_id: first_str(record, &["external_id", "sku"]),
        affiliate_id: first_str(record, &["affiliate_id"]),
        title,
        brand: first_str(record, &["brand"]),
        category: first_str(record, &["category"]),
        description: first_str(record, &["description"]),
        image: first_str(record, &["img_url", "image"]),
        url: first_str(record, &["url", "product_url"]),
        price: first_number(record, &["price", "price_value"]),
        retailer: first_str(record, &["store_name", "retailer"]),
        imported_from: Some(registry_url.to_owned()),
        source: Source::Babylist,
    })
}

/// Fetches a user's Babylist items.
///
/// # Errors
///
/// Returns [`FeedError`] on network failure, a non-2xx response, or a body
/// that is not JSON at all.
pub async fn fetch_babylist_items(
    client: &FeedClient,
    api_url: &str,
    api_key: &str,
    registry_url: &str,
) -> Result<Vec<RegistryItemDraft>, FeedError> {
    let payload = client
        .get_json_with_query(api_url, &[("registry", registry_url)], Some(api_key))
        .await?;

    let records = babylist_items(payload);
    tracing::debug!(records = records.len(), "unwrapped babylist payload");

    Ok(records
        .iter()
        .filter_map(|record| draft_from_babylist(record, registry_url))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const REGISTRY_URL: &str = "https://babylist.example.com/list/emma-and-sam";

    #[test]
    fn envelope_variants() {
        let rec = json!({"title": "Play Gym"});
        assert_eq!(babylist_items(json!({"reg_items": [rec.clone()]})).len(), 1);
        assert_eq!(babylist_items(json!({"items": [rec.clone()]})).len(), 1);
        assert_eq!(babylist_items(json!([rec])).len(), 1);
        assert!(babylist_items(json!("wat")).is_empty());
    }

    #[test]
    fn draft_uses_snake_case_fields() {
        let record = json!({
            "id": 8812,
            "external_id": "BL-8812",
            "affiliate_id": "aff-22",
            "title": "Play Gym",
            "img_url": "https://img.example.com/gym.jpg",
            "price": 89.99,
            "store_name": "Lovevery"
        });
        let draft = draft_from_babylist(&record, REGISTRY_URL).unwrap();
        assert_eq!(draft.id.as_deref(), Some("8812"));
        assert_eq!(draft.external_id.as_deref(), Some("BL-8812"));
        assert_eq!(draft.affiliate_id.as_deref(), Some("aff-22"));
        assert_eq!(draft.image.as_deref(), Some("https://img.example.com/gym.jpg"));
        assert_eq!(draft.retailer.as_deref(), Some("Lovevery"));
        assert_eq!(draft.source, Source::Babylist);
        assert_eq!(draft.imported_from.as_deref(), Some(REGISTRY_URL));
    }

    #[test]
    fn untitled_records_are_dropped() {
        assert!(draft_from_babylist(&json!({"id": 1}), REGISTRY_URL).is_none());
    }
}
