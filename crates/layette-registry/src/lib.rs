//! Per-user registry service: add/list/remove with catalog-grade
//! normalization, the personal-over-suggestion merge view, mentor notes,
//! and external registry connections (MyRegistry, Babylist).

pub mod error;
pub mod external;
pub mod items;
pub mod notes;

pub use error::RegistryError;
pub use external::{
    connect_external_registry, connected_registry, disconnect_external_registry,
    sync_external_registry, RegistryConnection,
};
pub use items::{
    add_items_to_user_registry, merge_affiliate_feeds, merge_items, normalize_draft,
    remove_registry_item, RegistryEntry,
};
pub use notes::save_registry_note;
