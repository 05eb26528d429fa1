//! In-memory response cache with time-based expiry

use crate::types::{CacheEntry, CacheStats};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

/// Concurrent map from fingerprint to cached response.
///
/// Cloning is cheap and every clone shares the same entries, so one store
/// is built at startup and handed to both the request pipeline and the
/// sweeper. Reads take the shared lock; `put` and `sweep` take the
/// exclusive one, so a reader sees either the old or the new entry for a
/// key, never a mix.
#[derive(Clone, Default)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<String, CacheEntry>>>,
    /// Cache hit counter
    hits: Arc<AtomicU64>,
    /// Cache miss counter
    misses: Arc<AtomicU64>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an entry, returning a copy. Expired entries are still
    /// returned until a sweep removes them.
    pub async fn get(&self, key: &str) -> Option<CacheEntry> {
        let entry = {
            let entries = self.entries.read().await;
            entries.get(key).cloned()
        };

        match entry {
            Some(entry) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                debug!(key = %key, "Cache hit");
                Some(entry)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Insert or replace the entry for `key`
    pub async fn put(&self, key: String, entry: CacheEntry) {
        let size = entry.body.len();
        {
            let mut entries = self.entries.write().await;
            entries.insert(key.clone(), entry);
        }
        debug!(key = %key, size, "Cached response");
    }

    /// Remove every entry older than `ttl`. Returns how many were removed.
    pub async fn sweep(&self, ttl: Duration) -> usize {
        self.sweep_at(ttl, Utc::now()).await
    }

    /// Same as [`sweep`](Self::sweep) with an explicit clock reading
    pub async fn sweep_at(&self, ttl: Duration, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(ttl, now));
        before - entries.len()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Get current cache statistics
    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        CacheStats {
            entries: entries.len(),
            total_size: entries.values().map(|e| e.body.len() as u64).sum(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
