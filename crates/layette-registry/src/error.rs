//! Error types for registry operations.
//!
//! Each variant maps to an HTTP status via [`RegistryError::status`] so the
//! (out of scope) web layer can translate failures without inspecting
//! messages.

use layette_core::Source;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum RegistryError {
    /// The item does not exist in the acting user's registry. Foreign items
    /// are reported identically, so ownership cannot be probed.
    #[error("registry item {item_id} not found")]
    NotFound { item_id: i64 },

    /// The user has no external registry connected.
    #[error("no external registry connected for user {user_id}")]
    NotConnected { user_id: Uuid },

    /// The connected source has no API credentials in the environment.
    ///
    /// The field is named `src` because thiserror reserves `source` for the
    /// error cause; this is domain data, not a cause.
    #[error("source '{src}' is not configured")]
    SourceNotConfigured { src: Source },

    /// The connection names a source that is not an external registry.
    #[error("source '{src}' cannot be synced as an external registry")]
    UnsupportedSource { src: Source },

    #[error("feed error: {0}")]
    Feed(#[from] layette_feeds::FeedError),

    #[error("database error: {0}")]
    Db(#[from] layette_db::DbError),

    #[error("connection state error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RegistryError {
    /// HTTP status the web layer should render for this error.
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            RegistryError::NotFound { .. } | RegistryError::NotConnected { .. } => 404,
            RegistryError::UnsupportedSource { .. } => 400,
            RegistryError::SourceNotConfigured { .. } => 503,
            RegistryError::Feed(_) => 502,
            RegistryError::Db(_) | RegistryError::Serialization(_) => 500,
        }
    }
}
