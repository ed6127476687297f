//! Fetching, parsing, and normalization for every external feed source.
//!
//! Three catalog feeds (CJ, Impact, Silver Cross), the MacroBaby seed and
//! suggestion proxy, and two external registry adapters (MyRegistry,
//! Babylist). Parsers are pure functions over raw text/JSON; the fetch
//! functions pair them with [`client::FeedClient`]. Nothing in this crate
//! touches the database.

pub mod babylist;
pub mod cj;
pub mod client;
pub mod error;
pub mod impact;
pub mod json;
pub mod macrobaby;
pub mod myregistry;
pub mod silvercross;

pub use babylist::{babylist_items, draft_from_babylist, fetch_babylist_items};
pub use cj::{
    decode_entities, fetch_cj_catalog, normalize_cj_product, parse_cj_feed, RawCjProduct,
};
pub use client::FeedClient;
pub use error::FeedError;
pub use impact::{fetch_impact_catalog, impact_items, normalize_impact_item};
pub use json::{coerce_number, first_number, first_str};
pub use macrobaby::{
    fetch_macrobaby_suggestions, normalize_suggestion, seed_catalog, suggest_items,
};
pub use myregistry::{draft_from_myregistry, fetch_myregistry_items, myregistry_items};
pub use silvercross::{
    fetch_silvercross_catalog, normalize_silvercross_row, parse_silvercross_csv, CsvRecord,
};
