//! Canonical catalog product shape shared by every feed adapter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::category::{resolve_category, Category};

/// Origin system for a catalog or registry item.
///
/// Stored as lowercase text in Postgres; the set is closed and every adapter
/// maps to exactly one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// CJ affiliate network XML feed.
    Cj,
    /// Impact affiliate network JSON API.
    Impact,
    /// Silver Cross retailer CSV feed.
    Silvercross,
    /// MacroBaby catalog (seed file and live suggestion proxy).
    Macro,
    /// Items synced from a user's MyRegistry list.
    Myregistry,
    /// Items synced from a user's Babylist list.
    Babylist,
    /// Platform-curated or manually entered items with no upstream feed.
    Static,
}

impl Source {
    /// All catalog-feed sources, in the order `import_all` syncs them.
    pub const CATALOG_SOURCES: [Source; 4] =
        [Source::Cj, Source::Impact, Source::Silvercross, Source::Macro];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Source::Cj => "cj",
            Source::Impact => "impact",
            Source::Silvercross => "silvercross",
            Source::Macro => "macro",
            Source::Myregistry => "myregistry",
            Source::Babylist => "babylist",
            Source::Static => "static",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Source {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cj" => Ok(Source::Cj),
            "impact" => Ok(Source::Impact),
            "silvercross" => Ok(Source::Silvercross),
            "macro" => Ok(Source::Macro),
            "myregistry" => Ok(Source::Myregistry),
            "babylist" => Ok(Source::Babylist),
            "static" => Ok(Source::Static),
            other => Err(UnknownSource(other.to_owned())),
        }
    }
}

/// Error returned when parsing an unrecognized source label.
#[derive(Debug, thiserror::Error)]
#[error("unknown source: {0}")]
pub struct UnknownSource(pub String);

/// A normalized product from one external source, ready for catalog upsert.
///
/// `(source, external_id)` is the upsert key: two imports of the same feed
/// item must produce the same pair so repeated syncs converge instead of
/// duplicating rows. `external_id` is therefore always resolved through
/// [`crate::identity::ensure_id`] before a `CatalogProduct` is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogProduct {
    /// Stable identifier within the source system (SKU, product ID, or a
    /// deterministic content hash when the feed provides none).
    pub external_id: String,
    pub title: String,
    pub brand: Option<String>,
    /// Raw category text as the feed provided it, pre-resolution.
    /// [`category_bucket`](CatalogProduct::category_bucket) maps it into
    /// the taxonomy.
    pub category: Option<String>,
    pub image: Option<String>,
    /// Plain storefront URL as the feed provided it.
    pub url: Option<String>,
    /// Outbound URL with the platform tracking parameter applied.
    pub affiliate_url: Option<String>,
    /// Price in dollars; `None` when the feed value was absent or unparseable.
    ///
    /// Boundary note: this is a scrape-time `f64` convenience type. The DB
    /// layer casts to `NUMERIC(10,2)` on persistence, so values are rounded
    /// to two decimal places at write time.
    pub price: Option<f64>,
    pub retailer: Option<String>,
    pub source: Source,
}

impl CatalogProduct {
    /// Returns the URL a buyer should be sent to: the tracked affiliate URL
    /// when present, otherwise the plain product URL.
    #[must_use]
    pub fn outbound_url(&self) -> Option<&str> {
        self.affiliate_url.as_deref().or(self.url.as_deref())
    }

    /// Taxonomy bucket resolved from the raw category text.
    #[must_use]
    pub fn category_bucket(&self) -> Category {
        resolve_category(self.category.as_deref())
    }

    /// Returns `true` if the product carries a usable price.
    #[must_use]
    pub fn has_price(&self) -> bool {
        self.price.is_some_and(f64::is_finite)
    }
}
