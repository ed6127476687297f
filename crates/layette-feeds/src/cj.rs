//! CJ affiliate network feed: tolerant XML-ish parsing and normalization.
//!
//! CJ product feeds are nominally XML but routinely arrive with unescaped
//! ampersands, mismatched nesting, and vendor-specific tag spellings. A
//! strict XML parser would reject exactly the feeds this adapter exists
//! for, so extraction is regex block matching over the raw text: find
//! `<product>` blocks, then pull named inner tags out of each block.

use regex::Regex;

use layette_core::{coerce_price, ensure_id, rewrite_affiliate_url, CatalogProduct, Source};

use crate::client::FeedClient;
use crate::error::FeedError;

/// One `<product>` block, fields extracted but not yet normalized.
#[derive(Debug, Clone)]
pub struct RawCjProduct {
    pub sku: Option<String>,
    pub name: String,
    pub brand: Option<String>,
    pub price: Option<String>,
    pub url: Option<String>,
    pub affiliate_url: Option<String>,
    pub image: Option<String>,
    pub category: Option<String>,
}

/// Inner-tag patterns, compiled once per parse run.
///
/// Each field has an ordered list of tag spellings; the first tag present
/// with non-empty content wins.
struct CjTagPatterns {
    sku: Vec<Regex>,
    name: Vec<Regex>,
    brand: Vec<Regex>,
    price: Vec<Regex>,
    url: Vec<Regex>,
    affiliate_url: Vec<Regex>,
    image: Vec<Regex>,
    category: Vec<Regex>,
}

impl CjTagPatterns {
    fn compile() -> Self {
        Self {
            sku: tag_patterns(&["sku"]),
            name: tag_patterns(&["name", "product-name"]),
            brand: tag_patterns(&["manufacturer", "brand"]),
            price: tag_patterns(&["price", "retail-price"]),
            url: tag_patterns(&["buy-url", "link", "coupon-link"]),
            affiliate_url: tag_patterns(&["tracking-url", "affiliate-url"]),
            image: tag_patterns(&["image-url", "large-image"]),
            category: tag_patterns(&["category"]),
        }
    }
}

/// Compiles one capture pattern per tag spelling.
///
/// `(?:\s[^>]*)?` keeps `<price>` from matching longer tag names like
/// `<price-currency>` while still accepting attributes on the opening tag.
fn tag_patterns(names: &[&str]) -> Vec<Regex> {
    names
        .iter()
        .map(|name| {
            let escaped = regex::escape(name);
            Regex::new(&format!(r"(?is)<{escaped}(?:\s[^>]*)?>(.*?)</{escaped}\s*>"))
                .expect("valid tag regex")
        })
        .collect()
}

/// Extracts all `<product>` blocks from a CJ feed body and parses each one.
///
/// Blocks with no resolvable name are dropped; a feed that is mostly
/// malformed still yields its parseable records. Empty or whitespace-only
/// input returns an empty list. Pure: no I/O, deterministic for identical
/// input.
#[must_use]
pub fn parse_cj_feed(raw: &str) -> Vec<RawCjProduct> {
    if raw.trim().is_empty() {
        return Vec::new();
    }

    let block_re =
        Regex::new(r"(?is)<product(?:\s[^>]*)?>(.*?)</product\s*>").expect("valid block regex");
    let patterns = CjTagPatterns::compile();

    let mut products = Vec::new();
    for cap in block_re.captures_iter(raw) {
        let block = cap.get(1).map_or("", |m| m.as_str());
        let Some(name) = first_tag(block, &patterns.name) else {
            continue;
        };
        products.push(RawCjProduct {
            sku: first_tag(block, &patterns.sku),
            name,
            brand: first_tag(block, &patterns.brand),
            price: first_tag(block, &patterns.price),
            url: first_tag(block, &patterns.url),
            affiliate_url: first_tag(block, &patterns.affiliate_url),
            image: first_tag(block, &patterns.image),
            category: first_tag(block, &patterns.category),
        });
    }
    products
}

fn first_tag(block: &str, patterns: &[Regex]) -> Option<String> {
    for re in patterns {
        if let Some(cap) = re.captures(block) {
            let text = decode_entities(cap.get(1).map_or("", |m| m.as_str()).trim());
            if !text.is_empty() {
                return Some(text);
            }
        }
    }
    None
}

/// Decodes the HTML entities CJ feeds actually emit.
///
/// `&amp;` is decoded last so that double-escaped text like `&amp;quot;`
/// comes out as the literal `&quot;` rather than a bare quote.
#[must_use]
pub fn decode_entities(text: &str) -> String {
    text.replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

/// Maps a parsed CJ block to the canonical catalog shape.
///
/// Identity comes from the SKU when present, else a hash of URL or name.
/// The affiliate URL prefers the feed's own tracking link; without one the
/// plain URL is rewritten with the CJ tracking parameter.
#[must_use]
pub fn normalize_cj_product(raw: &RawCjProduct) -> CatalogProduct {
    let external_id = ensure_id(raw.sku.as_deref(), raw.url.as_deref(), Some(&raw.name));
    let affiliate_url = raw.affiliate_url.clone().or_else(|| {
        raw.url
            .as_deref()
            .map(|url| rewrite_affiliate_url(url, Source::Cj))
    });

    CatalogProduct {
        external_id,
        title: raw.name.clone(),
        brand: raw.brand.clone(),
        category: raw.category.clone(),
        image: raw.image.clone(),
        url: raw.url.clone(),
        affiliate_url,
        price: raw.price.as_deref().and_then(coerce_price),
        retailer: Some("CJ Network".to_owned()),
        source: Source::Cj,
    }
}

/// Fetches and normalizes the full CJ catalog feed.
///
/// # Errors
///
/// Returns [`FeedError`] on network failure or a non-2xx response.
pub async fn fetch_cj_catalog(
    client: &FeedClient,
    api_url: &str,
    api_key: &str,
) -> Result<Vec<CatalogProduct>, FeedError> {
    let body = client
        .get_text(api_url, "application/xml,text/xml;q=0.9,*/*;q=0.8", Some(api_key))
        .await?;

    let raw = parse_cj_feed(&body);
    tracing::debug!(blocks = raw.len(), "parsed cj feed");

    Ok(raw.iter().map(normalize_cj_product).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0"?>
<catalog>
  <product>
    <sku>CJ-1001</sku>
    <name>Organic Crib Sheet &amp; Pillow Set</name>
    <manufacturer>Burt&#39;s Bees Baby</manufacturer>
    <price>$44.99</price>
    <buy-url>https://shop.example.com/sheets/1001</buy-url>
    <tracking-url>https://track.cj.example.com/click?pid=1001</tracking-url>
    <image-url>https://img.example.com/1001.jpg</image-url>
    <category>Nursery Bedding</category>
  </product>
  <product>
    <product-name>Compact Travel Stroller</product-name>
    <brand>Silver Cross</brand>
    <retail-price>299.00</retail-price>
    <link>https://shop.example.com/strollers/2002</link>
  </product>
  <product>
    <sku>CJ-BROKEN</sku>
    <price>19.99</price>
  </product>
</catalog>"#;

    #[test]
    fn parses_blocks_and_drops_nameless() {
        let products = parse_cj_feed(FEED);
        assert_eq!(products.len(), 2, "block without a name must be dropped");
        assert_eq!(products[0].sku.as_deref(), Some("CJ-1001"));
        assert_eq!(products[0].name, "Organic Crib Sheet & Pillow Set");
        assert_eq!(products[0].brand.as_deref(), Some("Burt's Bees Baby"));
        assert_eq!(products[1].name, "Compact Travel Stroller");
        assert_eq!(products[1].price.as_deref(), Some("299.00"));
    }

    #[test]
    fn alternate_tag_spellings_resolve() {
        let products = parse_cj_feed(FEED);
        assert_eq!(products[1].brand.as_deref(), Some("Silver Cross"));
        assert_eq!(
            products[1].url.as_deref(),
            Some("https://shop.example.com/strollers/2002")
        );
    }

    #[test]
    fn tolerates_unescaped_ampersands_in_other_blocks() {
        let feed = r"<product><name>Bath & Body Kit</name></product>
<product><name>Second</name></product>";
        let products = parse_cj_feed(feed);
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].name, "Bath & Body Kit");
    }

    #[test]
    fn empty_input_is_empty_output() {
        assert!(parse_cj_feed("").is_empty());
        assert!(parse_cj_feed("   \n  ").is_empty());
        assert!(parse_cj_feed("<products></products>").is_empty());
    }

    #[test]
    fn product_name_tag_does_not_open_a_block() {
        // <product-name> must not be mistaken for a <product> block start.
        let feed = "<product-name>Orphan</product-name>";
        assert!(parse_cj_feed(feed).is_empty());
    }

    #[test]
    fn decode_entities_handles_double_escaping_last() {
        assert_eq!(decode_entities("Pack &amp; Play"), "Pack & Play");
        assert_eq!(decode_entities("&quot;Snug&quot;"), "\"Snug\"");
        assert_eq!(decode_entities("&lt;3 months"), "<3 months");
        // &amp;quot; is the literal text "&quot;", not a quote.
        assert_eq!(decode_entities("&amp;quot;"), "&quot;");
    }

    #[test]
    fn normalize_uses_sku_and_feed_tracking_url() {
        let products = parse_cj_feed(FEED);
        let normalized = normalize_cj_product(&products[0]);
        assert_eq!(normalized.external_id, "CJ-1001");
        assert_eq!(normalized.price, Some(44.99));
        assert_eq!(
            normalized.affiliate_url.as_deref(),
            Some("https://track.cj.example.com/click?pid=1001")
        );
        assert_eq!(normalized.retailer.as_deref(), Some("CJ Network"));
        assert_eq!(normalized.source, Source::Cj);
        assert_eq!(normalized.category.as_deref(), Some("Nursery Bedding"));
    }

    #[test]
    fn normalize_without_sku_hashes_url() {
        let products = parse_cj_feed(FEED);
        let normalized = normalize_cj_product(&products[1]);
        assert_eq!(normalized.external_id.len(), 64);
        // Without a feed tracking link, the plain URL gets the CJ parameter.
        assert_eq!(
            normalized.affiliate_url.as_deref(),
            Some("https://shop.example.com/strollers/2002?sid=layette")
        );

        let again = normalize_cj_product(&products[1]);
        assert_eq!(normalized.external_id, again.external_id);
    }
}
