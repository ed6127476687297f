//! Field fallback chains and number coercion for untyped JSON records.
//!
//! Upstream feed records do not share a schema; adapters resolve each
//! canonical field through an ordered list of candidate keys, taking the
//! first usable value. Missing and unusable values are equivalent.

use layette_core::coerce_price;
use serde_json::Value;

/// Resolves the first usable string among `keys`, in order.
///
/// A usable value is a non-empty string, or a number (some feeds emit ids
/// as JSON numbers; they are rendered back to text). Empty strings, nulls,
/// and structured values are skipped so the chain can keep probing.
#[must_use]
pub fn first_str(record: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        match record.get(key) {
            Some(Value::String(s)) => {
                let trimmed = s.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_owned());
                }
            }
            Some(Value::Number(n)) => return Some(n.to_string()),
            _ => {}
        }
    }
    None
}

/// Coerces a JSON value to a finite `f64`.
///
/// Numbers pass through when finite. Strings go through the same cleanup
/// as feed price text (strip everything outside `[0-9.]`, then parse).
/// Everything else is `None`.
#[must_use]
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => coerce_price(s),
        _ => None,
    }
}

/// Resolves the first key whose value coerces to a finite number.
#[must_use]
pub fn first_number(record: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter()
        .filter_map(|key| record.get(key))
        .find_map(coerce_number)
}
