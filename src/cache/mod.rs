//! Cache Module
//!
//! In-memory response cache with max-age expiration and LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

use std::sync::Arc;

use tokio::sync::RwLock;

// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::CacheStore;

/// Cache store shared between request handlers and background tasks.
///
/// `get` needs the write lock because it updates recency; `has` only reads.
pub type SharedCache = Arc<RwLock<CacheStore>>;

/// How an entry's max age is measured.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Expiration {
    /// Entries expire `max_age` after they were stored
    #[default]
    Absolute,
    /// Every hit re-arms the entry for another `max_age`
    Sliding,
}

/// Wraps a store for sharing across tasks.
pub fn shared(store: CacheStore) -> SharedCache {
    Arc::new(RwLock::new(store))
}
