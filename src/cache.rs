//! Expiring memoization cache
//!
//! Entries are keyed by the call's arguments and stay live for a caller-supplied
//! TTL. The map is a `DashMap`, so reads and writes from concurrent requests
//! never block each other for longer than a shard lock. No lock is held while a
//! value is being computed: two callers racing on a cold key may both compute,
//! and the later write wins. Both values are valid results of the same
//! side-effect-free computation.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::clock::{Clock, SystemClock};

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: DateTime<Utc>,
}

/// Memoizes expensive calls with a time-to-live.
#[derive(Clone)]
pub struct ExpiringCache<K, V>
where
    K: Eq + Hash,
{
    entries: Arc<DashMap<K, CacheEntry<V>>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            clock,
        }
    }

    fn is_live(&self, entry: &CacheEntry<V>, ttl: Duration) -> bool {
        // A clock that moved backwards yields a negative age; treat it as fresh.
        let age = (self.clock.now() - entry.stored_at)
            .to_std()
            .unwrap_or_default();
        age <= ttl
    }

    /// Return the cached value if it is no older than `ttl`.
    pub fn get(&self, key: &K, ttl: Duration) -> Option<V> {
        let entry = self.entries.get(key)?;
        if self.is_live(&entry, ttl) {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    /// Replace whatever is stored under `key`.
    pub fn insert(&self, key: K, value: V) {
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now(),
        };
        self.entries.insert(key, entry);
    }

    /// Insert after a miss. Entries already older than `ttl` are swept first, so
    /// keys that are never asked for again do not pile up.
    fn store(&self, key: K, value: V, ttl: Duration) {
        let purged = self.purge_expired(ttl);
        if purged > 0 {
            debug!(purged, "expired cache entries dropped");
        }
        self.insert(key, value);
    }

    /// Return the live value for `key`, or run `compute` once and store its output.
    pub async fn get_or_compute<F, Fut>(&self, key: K, ttl: Duration, compute: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        if let Some(value) = self.get(&key, ttl) {
            debug!(?key, "cache hit");
            return value;
        }

        debug!(?key, "cache miss");
        let value = compute().await;
        self.store(key, value.clone(), ttl);
        value
    }

    /// Like [`get_or_compute`](Self::get_or_compute), but an `Err` from `compute`
    /// is handed back without being stored.
    pub async fn try_get_or_compute<F, Fut, E>(
        &self,
        key: K,
        ttl: Duration,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key, ttl) {
            debug!(?key, "cache hit");
            return Ok(value);
        }

        debug!(?key, "cache miss");
        let value = compute().await?;
        self.store(key, value.clone(), ttl);
        Ok(value)
    }

    pub fn invalidate(&self, key: &K) -> bool {
        self.entries.remove(key).is_some()
    }

    /// Drop every entry older than `ttl`. Returns how many were removed.
    pub fn purge_expired(&self, ttl: Duration) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| {
            let age = (self.clock.now() - entry.stored_at)
                .to_std()
                .unwrap_or_default();
            age <= ttl
        });
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> Default for ExpiringCache<K, V>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
