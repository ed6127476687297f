//! Silver Cross retailer feed: hand-rolled CSV parsing and normalization.
//!
//! The feed is a plain CSV export with quoted fields. The tokenizer is
//! deliberately small and line-based: quoted fields may contain commas and
//! `""` escapes, but not embedded newlines. Header names are lower-cased
//! and used as field keys for every following row.

use std::collections::HashMap;

use layette_core::{coerce_price, ensure_id, rewrite_affiliate_url, CatalogProduct, Source};

use crate::client::FeedClient;
use crate::error::FeedError;

/// One CSV row keyed by lower-cased header name.
pub type CsvRecord = HashMap<String, String>;

/// Parses a Silver Cross CSV body into header-keyed records.
///
/// Blank lines are skipped. Rows shorter than the header simply omit the
/// trailing keys; extra cells beyond the header are ignored. Empty or
/// whitespace-only input (or a header with no data rows) returns an empty
/// list. Pure: no I/O, deterministic for identical input.
#[must_use]
pub fn parse_silvercross_csv(raw: &str) -> Vec<CsvRecord> {
    let mut lines = raw
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.trim().is_empty());

    let Some(header_line) = lines.next() else {
        return Vec::new();
    };
    let headers: Vec<String> = split_csv_record(header_line)
        .into_iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let mut records = Vec::new();
    for line in lines {
        let cells = split_csv_record(line);
        let mut record = CsvRecord::new();
        for (header, cell) in headers.iter().zip(cells) {
            let value = cell.trim();
            if !header.is_empty() && !value.is_empty() {
                record.insert(header.clone(), value.to_owned());
            }
        }
        records.push(record);
    }
    records
}

/// Splits one CSV line into cells.
///
/// Handles quoted cells with embedded commas and `""` escapes. A stray
/// unterminated quote runs to the end of the line rather than failing;
/// this parser never rejects a row, it just tokenizes what is there.
fn split_csv_record(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    cell.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                cell.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => cells.push(std::mem::take(&mut cell)),
                _ => cell.push(c),
            }
        }
    }
    cells.push(cell);
    cells
}

/// Maps one CSV record to the canonical catalog shape.
///
/// Returns `None` when the row has neither an id nor a title; an id-only
/// row survives with the id doubling as its title. Brand and retailer
/// default to `"Silver Cross"`, this being a single-retailer feed.
#[must_use]
pub fn normalize_silvercross_row(record: &CsvRecord) -> Option<CatalogProduct> {
    let field = |keys: &[&str]| -> Option<String> {
        keys.iter()
            .find_map(|key| record.get(*key))
            .map(|v| v.to_owned())
    };

    let raw_id = field(&["sku", "id", "product_id"]);
    let raw_title = field(&["title", "name", "product_name"]);
    let title = raw_title.or_else(|| raw_id.clone())?;

    let url = field(&["url", "link", "product_url"]);
    let external_id = ensure_id(raw_id.as_deref(), url.as_deref(), Some(&title));
    let affiliate_url = url
        .as_deref()
        .map(|u| rewrite_affiliate_url(u, Source::Silvercross));

    Some(CatalogProduct {
        external_id,
        title,
        brand: field(&["brand", "manufacturer"]).or_else(|| Some("Silver Cross".to_owned())),
        category: field(&["category"]),
        image: field(&["image", "image_url"]),
        url,
        affiliate_url,
        price: field(&["price", "retail_price"])
            .as_deref()
            .and_then(coerce_price),
        retailer: Some("Silver Cross".to_owned()),
        source: Source::Silvercross,
    })
}

/// Fetches and normalizes the full Silver Cross catalog feed.
///
/// # Errors
///
/// Returns [`FeedError`] on network failure or a non-2xx response.
pub async fn fetch_silvercross_catalog(
    client: &FeedClient,
    feed_url: &str,
) -> Result<Vec<CatalogProduct>, FeedError> {
    let body = client
        .get_text(feed_url, "text/csv,application/octet-stream", None)
        .await?;

    let records = parse_silvercross_csv(&body);
    tracing::debug!(rows = records.len(), "parsed silver cross feed");

    Ok(records.iter().filter_map(normalize_silvercross_row).collect())
}
