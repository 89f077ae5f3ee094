//! Upstream Module
//!
//! Forwarding to the content API and the header rules around it.

mod gateway;
mod headers;

pub use gateway::{build_upstream_base, resolve_auth_token, UpstreamGateway};
pub use headers::{response_headers, upstream_request_headers, X_HIT_FROM_CACHE};
