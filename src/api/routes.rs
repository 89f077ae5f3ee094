//! API Routes
//!
//! Every request goes to the proxy dispatcher; there are no per-path routes
//! because classification decides what each request is.

use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::{proxy_handler, AppState};

/// Creates the router with the dispatcher as its only handler.
///
/// # Middleware
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .fallback(proxy_handler)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
