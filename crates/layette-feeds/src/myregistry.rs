//! MyRegistry external registry sync adapter.
//!
//! Pulls the items a user keeps on MyRegistry so they can be merged into
//! their registry here. Output is [`RegistryItemDraft`]s, not catalog
//! products: these rows belong to one user and carry provenance.

use serde::Deserialize;
use serde_json::Value;

use layette_core::{RegistryItemDraft, Source};

use crate::client::FeedClient;
use crate::error::FeedError;
use crate::json::{first_number, first_str};

/// Known envelope shapes for the MyRegistry items payload.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MyRegistryEnvelope {
    Items { items: Vec<Value> },
    Registry {
        #[serde(rename = "registryItems")]
        registry_items: Vec<Value>,
    },
    Bare(Vec<Value>),
}

/// Unwraps the MyRegistry payload envelope into its record list.
/// Unrecognized envelopes yield an empty list.
#[must_use]
pub fn myregistry_items(payload: Value) -> Vec<Value> {
    match serde_json::from_value::<MyRegistryEnvelope>(payload) {
        Ok(MyRegistryEnvelope::Items { items } | MyRegistryEnvelope::Bare(items)) => items,
        Ok(MyRegistryEnvelope::Registry { registry_items }) => registry_items,
        Err(_) => Vec::new(),
    }
}

/// Maps one MyRegistry record to a registry item draft.
///
/// `registry_url` is recorded as provenance on every draft. Records with
/// no derivable title are dropped.
#[must_use]
pub fn draft_from_myregistry(record: &Value, registry_url: &str) -> Option<RegistryItemDraft> {
    let title = first_str(record, &["title", "name", "productName"])?;

    Some(RegistryItemDraft {
        id: first_str(record, &["itemId", "id"]),
        external_id: first_str(record, &["externalId", "sku"]),
        affiliate_id: first_str(record, &["affiliateId"]),
        title,
        brand: first_str(record, &["brand", "manufacturer"]),
        category: first_str(record, &["category", "section"]),
        description: first_str(record, &["description", "note"]),
        image: first_str(record, &["image", "imageUrl"]),
        url: first_str(record, &["url", "productUrl"]),
        price: first_number(record, &["price"]),
        retailer: first_str(record, &["retailer", "store"]),
        imported_from: Some(registry_url.to_owned()),
        source: Source::Myregistry,
    })
}

/// Fetches a user's MyRegistry items.
///
/// `registry_url` identifies which registry to pull and doubles as the
/// provenance recorded on each draft.
///
/// # Errors
///
/// Returns [`FeedError`] on network failure, a non-2xx response, or a body
/// that is not JSON at all.
pub async fn fetch_myregistry_items(
    client: &FeedClient,
    api_url: &str,
    api_key: &str,
    registry_url: &str,
) -> Result<Vec<RegistryItemDraft>, FeedError> {
    let payload = client
        .get_json_with_query(api_url, &[("registry", registry_url)], Some(api_key))
        .await?;

    let records = myregistry_items(payload);
    tracing::debug!(records = records.len(), "unwrapped myregistry payload");

    Ok(records
        .iter()
        .filter_map(|record| draft_from_myregistry(record, registry_url))
        .collect())
}
