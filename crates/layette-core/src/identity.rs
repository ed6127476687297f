//! Stable-identity and price coercion helpers shared by every feed adapter.

use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Produces a stable external id for a product that may not carry one.
///
/// Fallback chain, first non-empty wins:
/// 1. the feed-supplied id, as-is;
/// 2. hex SHA-256 of the product URL;
/// 3. hex SHA-256 of the title;
/// 4. a fresh UUIDv4 (the item will not dedupe across runs).
///
/// Hashing keeps ids deterministic across runs for feeds that omit ids but
/// keep URLs stable, which is what makes re-imports idempotent.
#[must_use]
pub fn ensure_id(id: Option<&str>, url: Option<&str>, title: Option<&str>) -> String {
    if let Some(id) = non_empty(id) {
        return id.to_owned();
    }
    if let Some(url) = non_empty(url) {
        return hex_digest(url);
    }
    if let Some(title) = non_empty(title) {
        return hex_digest(title);
    }
    Uuid::new_v4().to_string()
}

/// Parses a price out of arbitrary feed text.
///
/// Strips every character outside `[0-9.]` (currency symbols, thousands
/// separators, stray labels), then parses the remainder as `f64`. Returns
/// `None` when nothing numeric survives or the remainder does not parse to
/// a finite number. Never errors: an unparseable price is an absent price.
#[must_use]
pub fn coerce_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => Some(value),
        _ => None,
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn hex_digest(input: &str) -> String {
    format!("{:x}", Sha256::digest(input.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_id_wins() {
        let id = ensure_id(Some("sku-42"), Some("https://example.com/p/42"), Some("Bassinet"));
        assert_eq!(id, "sku-42");
    }

    #[test]
    fn blank_id_falls_through_to_url_hash() {
        let id = ensure_id(Some("   "), Some("https://example.com/p/42"), None);
        assert_eq!(id, hex_digest("https://example.com/p/42"));
        assert_eq!(id.len(), 64);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn url_hash_is_stable_across_calls() {
        let a = ensure_id(None, Some("https://example.com/p/42"), Some("Bassinet"));
        let b = ensure_id(None, Some("https://example.com/p/42"), Some("Renamed"));
        assert_eq!(a, b);
    }

    #[test]
    fn title_hash_when_url_missing() {
        let id = ensure_id(None, None, Some("Convertible Crib"));
        assert_eq!(id, hex_digest("Convertible Crib"));
    }

    #[test]
    fn uuid_when_nothing_usable() {
        let a = ensure_id(None, Some(""), Some("  "));
        let b = ensure_id(None, None, None);
        assert!(Uuid::parse_str(&a).is_ok());
        assert!(Uuid::parse_str(&b).is_ok());
        // Fresh per call, so two bare items never collide.
        assert_ne!(a, b);
    }

    #[test]
    fn coerces_currency_formatting() {
        assert_eq!(coerce_price("$1,299.00"), Some(1299.0));
        assert_eq!(coerce_price("USD 89.99"), Some(89.99));
        assert_eq!(coerce_price("45"), Some(45.0));
    }

    #[test]
    fn empty_and_non_numeric_are_none() {
        assert_eq!(coerce_price(""), None);
        assert_eq!(coerce_price("N/A"), None);
        assert_eq!(coerce_price("call for price"), None);
    }

    #[test]
    fn multiple_dots_fail_to_parse() {
        assert_eq!(coerce_price("1.2.3"), None);
    }

    #[test]
    fn sign_characters_are_stripped() {
        // Minus is outside [0-9.], so negative strings parse as positive.
        assert_eq!(coerce_price("-5.00"), Some(5.0));
    }
}
