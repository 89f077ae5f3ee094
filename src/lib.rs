//! Content Proxy - a caching reverse proxy for a content delivery API
//!
//! Serves an allowlisted set of `/entries` queries from an in-memory cache
//! with max-age expiration and LRU eviction, forwarding misses upstream.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod routing;
pub mod tasks;
pub mod upstream;

pub use api::{create_router, AppState};
pub use config::{Config, UpstreamConfig};
pub use error::{ConfigError, ProxyError};
pub use tasks::spawn_cleanup_task;
