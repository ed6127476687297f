//! Affiliate tracking-parameter rewriting.
//!
//! Every outbound product link gets exactly one tracking parameter, named
//! per source network. Rewriting is idempotent: a URL that already carries
//! its network's parameter passes through untouched, so re-imports never
//! stack `?sid=...&sid=...` chains.

use url::Url;

use crate::catalog::Source;

/// Tag value attached to every rewritten link.
pub const AFFILIATE_TAG: &str = "layette";

/// The tracking query parameter each network expects.
#[must_use]
pub fn tracking_param(source: Source) -> &'static str {
    match source {
        Source::Cj => "sid",
        Source::Impact => "subId1",
        Source::Silvercross => "utm_source",
        Source::Macro | Source::Myregistry | Source::Babylist | Source::Static => "ref",
    }
}

/// Rewrites `raw` to carry the tracking parameter for `source`.
///
/// Well-formed URLs are parsed; if the parameter is already present the
/// input comes back byte-for-byte unchanged, otherwise the parameter is
/// appended through the query serializer. Strings that do not parse as
/// absolute URLs (relative paths, scheme-less hosts, plain junk) fall back
/// to [`append_affiliate_tag`], which does a literal-text append. Malformed
/// input is never dropped: a broken link with a tag still pays out.
#[must_use]
pub fn rewrite_affiliate_url(raw: &str, source: Source) -> String {
    let param = tracking_param(source);
    match Url::parse(raw) {
        Ok(mut url) => {
            if url.query_pairs().any(|(key, _)| key == param) {
                return raw.to_owned();
            }
            url.query_pairs_mut().append_pair(param, AFFILIATE_TAG);
            url.to_string()
        }
        Err(_) => append_affiliate_tag(raw, param, AFFILIATE_TAG),
    }
}

/// Literal-text tag append for strings that are not parseable URLs.
///
/// Skips the append when `param=` already occurs anywhere in the string,
/// which keeps the fallback idempotent at the cost of false positives on
/// pathological input.
#[must_use]
pub fn append_affiliate_tag(raw: &str, param: &str, value: &str) -> String {
    if raw.contains(&format!("{param}=")) {
        return raw.to_owned();
    }
    let joiner = if raw.contains('?') { '&' } else { '?' };
    format!("{raw}{joiner}{param}={value}")
}
