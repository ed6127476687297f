//! Shared domain types and helpers for the layette registry platform.
//!
//! The canonical catalog/registry shapes, the category taxonomy, identity
//! resolution, price coercion, affiliate link rewriting, the key-value
//! store abstraction, and application configuration. Network and database
//! concerns live in `layette-feeds` and `layette-db`.

pub mod affiliate;
pub mod app_config;
pub mod catalog;
pub mod category;
pub mod config;
pub mod identity;
pub mod kv;
pub mod registry;
pub mod seed;

pub use affiliate::{append_affiliate_tag, rewrite_affiliate_url, tracking_param};
pub use app_config::{AppConfig, Environment};
pub use catalog::{CatalogProduct, Source};
pub use category::{resolve_category, Category};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use identity::{coerce_price, ensure_id};
pub use kv::{KeyValueStore, MemoryStore};
pub use registry::RegistryItemDraft;
pub use seed::{load_seed_catalog, SeedFile, SeedProduct};
