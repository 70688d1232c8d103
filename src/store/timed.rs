//! Expiring key-value map.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

struct Entry<V> {
    value: V,
    inserted_at: DateTime<Utc>,
}

/// A map whose entries expire `ttl` after insertion.
///
/// Reads evict stale entries on access, so expiry never depends on
/// [`TimedCache::evict_expired`] having run; the sweep only bounds memory.
/// Every operation has an `_at` variant taking the current time explicitly.
pub struct TimedCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
}

impl<K, V> TimedCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Insert or replace an entry, restarting its lifetime.
    pub fn insert(&self, key: K, value: V) {
        self.insert_at(key, value, Utc::now());
    }

    pub fn insert_at(&self, key: K, value: V, now: DateTime<Utc>) {
        self.entries().insert(
            key,
            Entry {
                value,
                inserted_at: now,
            },
        );
    }

    /// Clone out a live entry; a stale one is removed and `None` returned.
    pub fn get(&self, key: &K) -> Option<V> {
        self.get_at(key, Utc::now())
    }

    pub fn get_at(&self, key: &K, now: DateTime<Utc>) -> Option<V> {
        let mut entries = self.entries();
        let inserted_at = entries.get(key)?.inserted_at;

        if self.is_stale(inserted_at, now) {
            entries.remove(key);
            return None;
        }

        entries.get(key).map(|e| e.value.clone())
    }

    /// Mutate a live entry in place without touching its lifetime.
    ///
    /// Returns `false` when there was no live entry to update.
    pub fn update<F>(&self, key: &K, f: F) -> bool
    where
        F: FnOnce(&mut V),
    {
        self.update_at(key, f, Utc::now())
    }

    pub fn update_at<F>(&self, key: &K, f: F, now: DateTime<Utc>) -> bool
    where
        F: FnOnce(&mut V),
    {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key) else {
            return false;
        };

        if self.is_stale(entry.inserted_at, now) {
            entries.remove(key);
            return false;
        }

        f(&mut entry.value);
        true
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.entries().remove(key).map(|e| e.value)
    }

    /// Drop every stale entry, returning how many were removed.
    pub fn evict_expired(&self) -> usize {
        self.evict_expired_at(Utc::now())
    }

    pub fn evict_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|_, e| now - e.inserted_at <= self.ttl);
        before - entries.len()
    }

    /// Number of stored entries, including stale ones not yet evicted.
    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_stale(&self, inserted_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - inserted_at > self.ttl
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<K, Entry<V>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
