//! Proxy Dispatcher
//!
//! The single request handler: classify, then answer locally, replay from
//! the cache, or forward upstream.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::{debug, info};

use crate::cache::{CacheEntry, CacheStore, SharedCache};
use crate::config::Config;
use crate::error::ConfigError;
use crate::routing::{classify, Route};
use crate::upstream::{response_headers, UpstreamGateway, X_HIT_FROM_CACHE};

/// Application state shared across all requests.
#[derive(Clone)]
pub struct AppState {
    /// Response cache, also written by the gateway
    pub cache: SharedCache,
    /// Forwarder for cache misses
    pub gateway: Arc<UpstreamGateway>,
}

impl AppState {
    pub fn new(cache: SharedCache, gateway: UpstreamGateway) -> Self {
        Self {
            cache,
            gateway: Arc::new(gateway),
        }
    }

    /// Builds the cache and gateway from configuration.
    ///
    /// Fails on configuration errors, before any traffic is accepted.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let cache = crate::cache::shared(CacheStore::from_config(config));
        let gateway = UpstreamGateway::new(&config.upstream, cache.clone())?;
        Ok(Self::new(cache, gateway))
    }
}

/// Fallback handler receiving every request, whatever its method or path.
pub async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let target = request
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    match classify(request.method(), &target) {
        Route::HealthCheck => (StatusCode::OK, "OK").into_response(),

        Route::ClearCache => {
            let mut cache = state.cache.write().await;
            let stats = cache.stats();
            let cleared = cache.reset_all();
            drop(cache);
            info!(cleared, %stats, "Cache cleared");
            StatusCode::OK.into_response()
        }

        Route::Rejected(rejection) => {
            debug!(%target, ?rejection, "Request rejected");
            (StatusCode::UNAUTHORIZED, rejection.message()).into_response()
        }

        Route::Cacheable => {
            let cached = state.cache.write().await.get(&target);
            match cached {
                Some(entry) => {
                    debug!(
                        %target,
                        age_ms = entry.age_ms(),
                        ttl_ms = ?entry.ttl_remaining_ms(),
                        "Cache hit"
                    );
                    replay(entry)
                }
                None => {
                    debug!(%target, "Cache miss");
                    state
                        .gateway
                        .forward(request, target)
                        .await
                        .unwrap_or_else(|e| e.into_response())
                }
            }
        }
    }
}

/// Cached headers and body, always with status 200.
fn replay(entry: CacheEntry) -> Response {
    (
        StatusCode::OK,
        response_headers(&entry.headers),
        [(X_HIT_FROM_CACHE, "1")],
        entry.body,
    )
        .into_response()
}
