//! Catalog sync orchestration: pulls every configured feed source through
//! fetch → normalize → batch upsert, with per-run bookkeeping in `sync_runs`,
//! plus the TTL-cached MacroBaby suggestion path.

pub mod error;
pub mod suggest;
pub mod sync;

pub use error::CatalogError;
pub use suggest::cached_suggestions;
pub use sync::{
    import_all, import_cj_catalog, import_impact_catalog, import_macrobaby_catalog,
    import_silvercross_catalog, SourceOutcome, SyncSummary,
};
