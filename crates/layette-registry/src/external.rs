//! External registry connections and one-click import.
//!
//! A connection lives in the key/value store as JSON under
//! `registry-connection:{user_id}` and names the provider plus the user's
//! public registry URL. Sync fetches that registry through the provider's
//! API proxy and upserts the results into the local registry, so repeated
//! syncs converge on the upstream item set.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use layette_core::{AppConfig, KeyValueStore, Source};
use layette_db::RegistryItemRow;
use layette_feeds::{fetch_babylist_items, fetch_myregistry_items, FeedClient};

use crate::error::RegistryError;
use crate::items::add_items_to_user_registry;

/// A user's link to an external registry provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConnection {
    /// Provider the registry lives on. Only [`Source::Myregistry`] and
    /// [`Source::Babylist`] can be synced.
    pub source: Source,
    /// Public URL of the user's registry on that provider, passed through
    /// to the provider API as the lookup key.
    pub registry_url: String,
}

fn connection_key(user_id: Uuid) -> String {
    format!("registry-connection:{user_id}")
}

/// Stores `user_id`'s external registry connection, replacing any existing
/// one. Connecting does not sync; call [`sync_external_registry`] for that.
///
/// # Errors
///
/// Returns [`RegistryError::Serialization`] if the connection cannot be
/// encoded for storage.
pub async fn connect_external_registry(
    kv: &dyn KeyValueStore,
    user_id: Uuid,
    connection: &RegistryConnection,
) -> Result<(), RegistryError> {
    let serialized = serde_json::to_string(connection)?;
    kv.set(&connection_key(user_id), serialized, None).await;
    tracing::info!(user = %user_id, source = %connection.source, "external registry connected");
    Ok(())
}

/// Returns the user's stored connection, or `None` when not connected.
///
/// Stored state that no longer decodes is discarded and reported as not
/// connected, so a corrupt entry degrades to "connect again" rather than
/// wedging the account.
pub async fn connected_registry(
    kv: &dyn KeyValueStore,
    user_id: Uuid,
) -> Option<RegistryConnection> {
    let key = connection_key(user_id);
    let raw = kv.get(&key).await?;
    match serde_json::from_str(&raw) {
        Ok(connection) => Some(connection),
        Err(err) => {
            tracing::warn!(
                user = %user_id,
                error = %err,
                "stored registry connection was unreadable; discarding"
            );
            kv.delete(&key).await;
            None
        }
    }
}

/// Removes the user's external registry connection. Items already imported
/// from it stay in the registry.
pub async fn disconnect_external_registry(kv: &dyn KeyValueStore, user_id: Uuid) {
    kv.delete(&connection_key(user_id)).await;
    tracing::info!(user = %user_id, "external registry disconnected");
}

/// Fetches the user's connected external registry and imports its items,
/// returning the user's full registry afterwards.
///
/// Items are keyed by upstream identity, so re-syncing updates rows in
/// place instead of duplicating them. An upstream registry with no items
/// is a successful sync that imports nothing.
///
/// # Errors
///
/// Returns [`RegistryError::NotConnected`] when no connection is stored,
/// [`RegistryError::SourceNotConfigured`] when the provider's API
/// credentials are absent, [`RegistryError::UnsupportedSource`] when the
/// stored connection names a non-registry source, and
/// [`RegistryError::Feed`] or [`RegistryError::Db`] on fetch or persistence
/// failure.
pub async fn sync_external_registry(
    pool: &PgPool,
    kv: &dyn KeyValueStore,
    client: &FeedClient,
    config: &AppConfig,
    user_id: Uuid,
) -> Result<Vec<RegistryItemRow>, RegistryError> {
    let connection = connected_registry(kv, user_id)
        .await
        .ok_or(RegistryError::NotConnected { user_id })?;

    let drafts = match connection.source {
        Source::Myregistry => {
            let (api_url, api_key) = config.myregistry_feed().ok_or(
                RegistryError::SourceNotConfigured {
                    src: Source::Myregistry,
                },
            )?;
            fetch_myregistry_items(client, api_url, api_key, &connection.registry_url).await?
        }
        Source::Babylist => {
            let (api_url, api_key) =
                config
                    .babylist_feed()
                    .ok_or(RegistryError::SourceNotConfigured {
                        src: Source::Babylist,
                    })?;
            fetch_babylist_items(client, api_url, api_key, &connection.registry_url).await?
        }
        other => return Err(RegistryError::UnsupportedSource { src: other }),
    };

    if drafts.is_empty() {
        tracing::warn!(
            user = %user_id,
            source = %connection.source,
            "external registry returned no items"
        );
    } else {
        tracing::info!(
            user = %user_id,
            source = %connection.source,
            items = drafts.len(),
            "external registry fetched"
        );
    }

    add_items_to_user_registry(pool, user_id, &drafts).await
}

#[cfg(test)]
mod tests {
    use super::*;

    use layette_core::MemoryStore;

    #[tokio::test]
    async fn connection_round_trips_through_store() {
        let kv = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let connection = RegistryConnection {
            source: Source::Myregistry,
            registry_url: "https://www.myregistry.com/r/emma-and-sam".to_owned(),
        };

        connect_external_registry(&kv, user_id, &connection)
            .await
            .expect("connect failed");

        assert_eq!(connected_registry(&kv, user_id).await, Some(connection));
    }

    #[tokio::test]
    async fn disconnect_clears_connection() {
        let kv = MemoryStore::new();
        let user_id = Uuid::new_v4();
        let connection = RegistryConnection {
            source: Source::Babylist,
            registry_url: "https://babylist.com/list/baby-reyes".to_owned(),
        };

        connect_external_registry(&kv, user_id, &connection)
            .await
            .expect("connect failed");
        disconnect_external_registry(&kv, user_id).await;

        assert_eq!(connected_registry(&kv, user_id).await, None);
    }

    #[tokio::test]
    async fn unreadable_stored_connection_is_discarded() {
        let kv = MemoryStore::new();
        let user_id = Uuid::new_v4();
        kv.set(&connection_key(user_id), "not json".to_owned(), None)
            .await;

        assert_eq!(connected_registry(&kv, user_id).await, None);
        // The corrupt entry is gone, not just masked.
        assert_eq!(kv.get(&connection_key(user_id)).await, None);
    }

    #[tokio::test]
    async fn connections_are_scoped_per_user() {
        let kv = MemoryStore::new();
        let emma = Uuid::new_v4();
        let noor = Uuid::new_v4();
        let connection = RegistryConnection {
            source: Source::Myregistry,
            registry_url: "https://www.myregistry.com/r/emma-and-sam".to_owned(),
        };

        connect_external_registry(&kv, emma, &connection)
            .await
            .expect("connect failed");

        assert!(connected_registry(&kv, noor).await.is_none());
    }
}
