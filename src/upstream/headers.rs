//! Header rewriting between client, proxy, and upstream.
//!
//! Outbound: drop hop-by-hop headers, `Host`, `Content-Length` and
//! `Accept-Encoding`, inject the bearer token, and extend the
//! `X-Forwarded-*` chain. Inbound (relay and cache replay): drop hop-by-hop
//! headers and `Content-Length`, which the server recomputes.

use std::net::SocketAddr;

use axum::http::{
    header::{self, HeaderName},
    HeaderMap, HeaderValue,
};

/// Set on responses answered from the cache
pub const X_HIT_FROM_CACHE: HeaderName = HeaderName::from_static("x-hit-from-cache");

const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_FORWARDED_PORT: HeaderName = HeaderName::from_static("x-forwarded-port");
const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");

const HOP_BY_HOP: [&str; 9] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

/// True for headers that describe a single connection rather than the message.
fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Names listed in `Connection`, which are hop-by-hop for this message.
fn connection_tokens(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::CONNECTION)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(','))
        .map(|token| token.trim().to_ascii_lowercase())
        .filter(|token| !token.is_empty())
        .collect()
}

fn without_hop_by_hop(headers: &HeaderMap, extra: &[HeaderName]) -> HeaderMap {
    let tokens = connection_tokens(headers);
    let mut out = HeaderMap::with_capacity(headers.len());

    for (name, value) in headers {
        if is_hop_by_hop(name)
            || extra.contains(name)
            || tokens.iter().any(|t| t == name.as_str())
        {
            continue;
        }
        out.append(name.clone(), value.clone());
    }

    out
}

/// Appends `value` to a comma-separated forwarding chain.
fn append_forwarded(headers: &mut HeaderMap, name: HeaderName, value: &str) {
    let chained = match headers.get(&name).and_then(|v| v.to_str().ok()) {
        Some(existing) if !existing.is_empty() => format!("{},{}", existing, value),
        _ => value.to_string(),
    };
    if let Ok(chained) = HeaderValue::from_str(&chained) {
        headers.insert(name, chained);
    }
}

/// Builds the headers sent upstream for a client request.
pub fn upstream_request_headers(
    inbound: &HeaderMap,
    client_addr: Option<SocketAddr>,
    authorization: &HeaderValue,
) -> HeaderMap {
    let mut headers = without_hop_by_hop(
        inbound,
        &[header::HOST, header::CONTENT_LENGTH, header::ACCEPT_ENCODING],
    );

    headers.insert(header::AUTHORIZATION, authorization.clone());

    let host = inbound.get(header::HOST).and_then(|v| v.to_str().ok());
    let port = host
        .and_then(|h| h.rsplit_once(':'))
        .map(|(_, port)| port)
        .filter(|port| port.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or("80");

    if let Some(addr) = client_addr {
        append_forwarded(&mut headers, X_FORWARDED_FOR, &addr.ip().to_string());
    }
    append_forwarded(&mut headers, X_FORWARDED_PORT, port);
    append_forwarded(&mut headers, X_FORWARDED_PROTO, "http");
    // First hop's host wins; it is never chained
    if !headers.contains_key(X_FORWARDED_HOST) {
        if let Some(host) = inbound.get(header::HOST) {
            headers.insert(X_FORWARDED_HOST, host.clone());
        }
    }

    headers
}

/// Headers relayed to the client from an upstream or cached response.
pub fn response_headers(upstream: &HeaderMap) -> HeaderMap {
    without_hop_by_hop(upstream, &[header::CONTENT_LENGTH])
}
