//! Cache Store Module
//!
//! Response cache combining HashMap storage with LRU tracking and max-age
//! expiration.

use std::collections::HashMap;
use std::time::Duration;

use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Expiration, LruTracker};

// == Cache Store ==
/// Bounded, time-expiring map from request path+query to captured response.
///
/// Keys are compared byte for byte; `/entries?a=1&b=2` and
/// `/entries?b=2&a=1` are different keys. None of the operations fail:
/// a missing or expired entry is simply `None`.
#[derive(Debug)]
pub struct CacheStore {
    entries: HashMap<String, CacheEntry>,
    lru: LruTracker,
    stats: CacheStats,
    max_entries: usize,
    max_age: Duration,
    expiration: Expiration,
}

impl CacheStore {
    // == Constructor ==
    /// Creates a store holding at most `max_entries` responses, each for at
    /// most `max_age` after insertion.
    pub fn new(max_entries: usize, max_age: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            stats: CacheStats::new(),
            max_entries: max_entries.max(1),
            max_age,
            expiration: Expiration::Absolute,
        }
    }

    /// Switches the expiration policy.
    pub fn with_expiration(mut self, expiration: Expiration) -> Self {
        self.expiration = expiration;
        self
    }

    /// Creates a store from the process configuration.
    pub fn from_config(config: &crate::config::Config) -> Self {
        Self::new(config.max_entries, config.cache_max_age).with_expiration(config.expiration)
    }

    // == Set ==
    /// Stores a response under `key`, replacing any previous one.
    ///
    /// If the key is new and the store is full, the least recently used
    /// entry is evicted first.
    pub fn set(&mut self, key: String, mut entry: CacheEntry) {
        let is_overwrite = self.entries.contains_key(&key);

        if !is_overwrite && self.entries.len() >= self.max_entries {
            if let Some(evicted_key) = self.lru.evict_oldest() {
                self.entries.remove(&evicted_key);
                self.stats.record_eviction();
                debug!(key = %evicted_key, "Evicted least recently used entry");
            }
        }

        entry.stamp(self.max_age);
        self.entries.insert(key.clone(), entry);
        self.lru.touch(&key);
        self.stats.set_total_entries(self.entries.len());
    }

    // == Get ==
    /// Returns the response stored under `key` if it has not expired.
    ///
    /// A hit marks the key most recently used and, under
    /// [`Expiration::Sliding`], re-arms its max age. An expired entry found
    /// here is dropped.
    pub fn get(&mut self, key: &str) -> Option<CacheEntry> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.stats.record_miss();
                return None;
            }
        };

        if expired {
            self.entries.remove(key);
            self.lru.remove(key);
            self.stats.set_total_entries(self.entries.len());
            self.stats.record_miss();
            return None;
        }

        let max_age = self.max_age;
        let entry = self.entries.get_mut(key)?;
        if self.expiration == Expiration::Sliding {
            entry.stamp(max_age);
        }
        let entry = entry.clone();

        self.stats.record_hit();
        self.lru.touch(key);
        Some(entry)
    }

    // == Has ==
    /// Checks for a live entry without touching recency or statistics.
    pub fn has(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .map(|entry| !entry.is_expired())
            .unwrap_or(false)
    }

    // == Reset All ==
    /// Drops every entry. Returns how many were dropped.
    pub fn reset_all(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.lru.clear();
        self.stats.set_total_entries(0);
        count
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        let count = expired_keys.len();

        for key in expired_keys {
            self.entries.remove(&key);
            self.lru.remove(&key);
        }

        self.stats.set_total_entries(self.entries.len());
        count
    }

    // == Stats ==
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
