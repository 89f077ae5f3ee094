//! Cache Entry Module
//!
//! A captured upstream response together with its expiry bookkeeping.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::http::HeaderMap;
use bytes::Bytes;

// == Cache Entry ==
/// A fully buffered upstream response.
///
/// Built once the upstream body has been read in full, so the store never
/// holds a partial response. `status` and `status_text` are kept for
/// diagnostics; cache hits are always answered with 200.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Upstream status code
    pub status: u16,
    /// Reason phrase as sent upstream, or the canonical one for the status
    pub status_text: String,
    /// Upstream response headers
    pub headers: HeaderMap,
    /// Response payload, known to decode as JSON
    pub body: Bytes,
    /// Insertion timestamp (Unix milliseconds), set by the store
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds), None = no expiration
    pub expires_at: Option<u64>,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an unstamped entry from a captured response.
    pub fn new(status: u16, status_text: impl Into<String>, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers,
            body,
            created_at: current_timestamp_ms(),
            expires_at: None,
        }
    }

    // == Stamp ==
    /// Sets the expiry to `max_age` from now.
    pub fn stamp(&mut self, max_age: Duration) {
        self.expires_at = Some(current_timestamp_ms() + max_age.as_millis() as u64);
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// its expiration time.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => current_timestamp_ms() >= expires,
            None => false,
        }
    }

    /// Milliseconds since the entry was captured.
    pub fn age_ms(&self) -> u64 {
        current_timestamp_ms().saturating_sub(self.created_at)
    }

    /// Returns remaining time to live in milliseconds, or None if unstamped.
    pub fn ttl_remaining_ms(&self) -> Option<u64> {
        self.expires_at
            .map(|expires| expires.saturating_sub(current_timestamp_ms()))
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
