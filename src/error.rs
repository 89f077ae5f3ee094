//! Error types for the content proxy
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Config Error Enum ==
/// Errors raised while assembling the process configuration or the gateway.
///
/// All of these are fatal: the server must not start accepting traffic.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A mandatory environment variable is absent or empty
    #[error("Missing environment variable {0}")]
    MissingEnv(&'static str),

    /// An environment variable could not be parsed
    #[error("Invalid value for {name}: {value:?}")]
    InvalidValue { name: &'static str, value: String },

    /// Preview mode was requested without a preview token
    #[error("Please provide preview API token to use the preview API.")]
    MissingPreviewToken,

    /// The upstream base URL assembled from configuration is malformed
    #[error("Invalid upstream URL {url}: {reason}")]
    InvalidUpstreamUrl { url: String, reason: String },

    /// The upstream HTTP client could not be built
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(String),
}

// == Proxy Error Enum ==
/// Per-request failures on the forwarding path.
#[derive(Error, Debug)]
pub enum ProxyError {
    /// Upstream could not be reached or the exchange failed mid-flight
    #[error("Upstream request failed: {0}")]
    Upstream(String),

    /// Upstream answered but its body could not be read or decoded
    #[error("Upstream response could not be decoded: {0}")]
    UpstreamBody(String),

    /// The inbound request body could not be buffered
    #[error("Invalid request body: {0}")]
    RequestBody(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = match &self {
            ProxyError::Upstream(_) | ProxyError::UpstreamBody(_) => StatusCode::BAD_GATEWAY,
            ProxyError::RequestBody(_) => StatusCode::BAD_REQUEST,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the forwarding path.
pub type Result<T> = std::result::Result<T, ProxyError>;
