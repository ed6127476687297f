//! Draft shape for items entering a user's registry.

use serde::{Deserialize, Serialize};

use crate::catalog::Source;

/// An item on its way into a user's registry, before persistence-time
/// normalization.
///
/// Drafts arrive from three places: a personal add (user typed it in), an
/// external registry sync (MyRegistry/Babylist adapters), or a copy of a
/// catalog product. Identity may live in any of `external_id`,
/// `affiliate_id`, or `id` depending on the origin; [`identity_hint`]
/// encodes the precedence. `category` holds raw source text, resolution to
/// the taxonomy happens at persistence time.
///
/// [`identity_hint`]: RegistryItemDraft::identity_hint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryItemDraft {
    pub id: Option<String>,
    pub external_id: Option<String>,
    pub affiliate_id: Option<String>,
    pub title: String,
    pub brand: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub price: Option<f64>,
    pub retailer: Option<String>,
    /// Provenance URL of the external registry this item was imported from.
    pub imported_from: Option<String>,
    #[serde(default = "default_source")]
    pub source: Source,
}

fn default_source() -> Source {
    Source::Static
}

impl Default for RegistryItemDraft {
    fn default() -> Self {
        Self {
            id: None,
            external_id: None,
            affiliate_id: None,
            title: String::new(),
            brand: None,
            category: None,
            description: None,
            image: None,
            url: None,
            price: None,
            retailer: None,
            imported_from: None,
            source: Source::Static,
        }
    }
}

impl RegistryItemDraft {
    /// First usable identity field: `external_id`, else `affiliate_id`,
    /// else `id`. Blank strings count as absent. `None` means the caller
    /// must fall back to hashing (see `ensure_id`).
    #[must_use]
    pub fn identity_hint(&self) -> Option<&str> {
        [&self.external_id, &self.affiliate_id, &self.id]
            .into_iter()
            .filter_map(|field| field.as_deref())
            .map(str::trim)
            .find(|v| !v.is_empty())
    }
}
