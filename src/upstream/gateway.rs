//! Upstream Gateway
//!
//! Forwards cacheable requests to the content API and stores what comes back.

use std::net::SocketAddr;

use axum::{
    body::{to_bytes, Body},
    extract::ConnectInfo,
    http::{HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
};
use hyper::ext::ReasonPhrase;
use reqwest::{redirect, Client};
use tracing::{debug, warn};
use url::Url;

use super::headers::{response_headers, upstream_request_headers};
use crate::cache::{CacheEntry, SharedCache};
use crate::config::UpstreamConfig;
use crate::error::{ConfigError, ProxyError, Result};

/// Largest inbound request body buffered for forwarding
const MAX_REQUEST_BODY: usize = 1024 * 1024;

/// Builds the upstream base URL, e.g. `https://cdn.contentful.com/spaces/abc`.
///
/// The `spaces/<id>` segment is present only when a space is configured;
/// without one the base ends in `/`.
pub fn build_upstream_base(config: &UpstreamConfig) -> String {
    let scheme = if config.secure { "https" } else { "http" };
    let host = if config.preview {
        &config.preview_host
    } else {
        &config.cdn_host
    };
    let path = match config.space_id.as_deref() {
        Some(space) if !space.is_empty() => format!("spaces/{}", space),
        _ => String::new(),
    };

    format!("{}://{}/{}", scheme, host, path)
}

/// Picks the token for the configured API.
pub fn resolve_auth_token(config: &UpstreamConfig) -> std::result::Result<&str, ConfigError> {
    if !config.preview {
        return Ok(&config.access_token);
    }

    config
        .preview_token
        .as_deref()
        .filter(|token| !token.is_empty())
        .ok_or(ConfigError::MissingPreviewToken)
}

// == Upstream Gateway ==
pub struct UpstreamGateway {
    client: Client,
    base_url: String,
    authorization: HeaderValue,
    cache: SharedCache,
}

impl UpstreamGateway {
    /// Validates the configuration and prepares the HTTP client.
    ///
    /// Fails with [`ConfigError::MissingPreviewToken`] when preview mode has
    /// no token, so a misconfigured proxy never starts.
    pub fn new(config: &UpstreamConfig, cache: SharedCache) -> std::result::Result<Self, ConfigError> {
        let token = resolve_auth_token(config)?;

        let base_url = build_upstream_base(config);
        Url::parse(&base_url).map_err(|e| ConfigError::InvalidUpstreamUrl {
            url: base_url.clone(),
            reason: e.to_string(),
        })?;

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|_| ConfigError::InvalidValue {
                name: "access token",
                value: "<redacted>".to_string(),
            })?;
        authorization.set_sensitive(true);

        let client = Client::builder()
            .redirect(redirect::Policy::none())
            .danger_accept_invalid_certs(!config.secure)
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            authorization,
            cache,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins the base URL and an inbound path+query without doubling `/`.
    pub fn upstream_url(&self, target: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            target.trim_start_matches('/')
        )
    }

    // == Forward ==
    /// Sends `request` upstream, caches the response under `key`, and relays
    /// it to the client.
    ///
    /// `key` is the inbound path+query; the rewritten upstream URL is never
    /// used as a key. Nothing is cached when the exchange fails or the body
    /// is not JSON.
    pub async fn forward(&self, request: Request<Body>, key: String) -> Result<Response> {
        let (parts, body) = request.into_parts();
        let client_addr = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        let body = to_bytes(body, MAX_REQUEST_BODY)
            .await
            .map_err(|e| ProxyError::RequestBody(e.to_string()))?;

        let url = self.upstream_url(&key);
        let headers = upstream_request_headers(&parts.headers, client_addr, &self.authorization);
        debug!(%url, "Forwarding request upstream");

        let mut outbound = self.client.request(parts.method, &url).headers(headers);
        if !body.is_empty() {
            outbound = outbound.body(body);
        }

        let upstream = outbound.send().await.map_err(|e| {
            warn!(%url, error = %e, "Upstream request failed");
            ProxyError::Upstream(e.to_string())
        })?;

        let status = upstream.status();
        let status_text = reason_phrase(&upstream);
        let headers = upstream.headers().clone();
        let body = upstream.bytes().await.map_err(|e| {
            warn!(%url, error = %e, "Failed to read upstream body");
            ProxyError::UpstreamBody(e.to_string())
        })?;

        if let Err(e) = serde_json::from_slice::<serde_json::Value>(&body) {
            warn!(%url, %status, error = %e, "Upstream body is not JSON, not caching");
            return Err(ProxyError::UpstreamBody(e.to_string()));
        }

        let entry = CacheEntry::new(status.as_u16(), status_text, headers, body);
        let response = relay(&entry);

        self.cache.write().await.set(key, entry);
        debug!(%status, "Cached upstream response");

        Ok(response)
    }
}

/// Reason phrase from the upstream status line, falling back to the
/// canonical one when the server sent the standard text.
fn reason_phrase(response: &reqwest::Response) -> String {
    response
        .extensions()
        .get::<ReasonPhrase>()
        .and_then(|reason| std::str::from_utf8(reason.as_bytes()).ok())
        .or_else(|| response.status().canonical_reason())
        .unwrap_or_default()
        .to_string()
}

/// Upstream status, headers and body as a client response.
fn relay(entry: &CacheEntry) -> Response {
    let status = StatusCode::from_u16(entry.status).unwrap_or(StatusCode::BAD_GATEWAY);
    (status, response_headers(&entry.headers), entry.body.clone()).into_response()
}
