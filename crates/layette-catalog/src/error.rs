//! Error types for catalog sync and suggestion operations.

use thiserror::Error;

/// Errors produced while syncing a source catalog into the database.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("feed error: {0}")]
    Feed(#[from] layette_feeds::FeedError),

    #[error("database error: {0}")]
    Db(#[from] layette_db::DbError),

    #[error("seed catalog error: {0}")]
    Seed(#[from] layette_core::ConfigError),
}
