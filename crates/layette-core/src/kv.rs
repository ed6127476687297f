//! TTL-aware key-value store abstraction.
//!
//! Connection state for external registries and the suggestion cache both
//! need per-key storage that survives outside any one request. The trait
//! keeps services testable and lets production swap the in-process map for
//! a shared store without touching call sites. Values are pre-serialized
//! strings; callers own the encoding.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use async_trait::async_trait;

/// Minimal get/set/delete store with optional per-key expiry.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`. A `ttl` of `None` never expires;
    /// `Some(Duration::ZERO)` is valid and expires on the next read.
    async fn set(&self, key: &str, value: String, ttl: Option<Duration>);

    /// Removes `key`. Removing an absent key is a no-op.
    async fn delete(&self, key: &str);
}

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

/// Process-local [`KeyValueStore`] backed by a mutexed map.
///
/// Expiry is lazy: entries are dropped when a read finds them past their
/// deadline, not by a background sweeper. Good enough for single-instance
/// deployments and tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Entry>> {
        // A poisoned lock only means a panic escaped while the map was
        // held; the data itself is still structurally sound.
        self.entries
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Option<String> {
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            Some(entry) => entry
                .expires_at
                .is_some_and(|deadline| Instant::now() >= deadline),
            None => return None,
        };
        if expired {
            entries.remove(key);
            return None;
        }
        entries.get(key).map(|entry| entry.value.clone())
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) {
        let entry = Entry {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };
        self.lock().insert(key.to_owned(), entry);
    }

    async fn delete(&self, key: &str) {
        self.lock().remove(key);
    }
}
