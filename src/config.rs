//! Configuration Module
//!
//! Handles loading and managing proxy configuration from environment variables.
//!
//! Only [`Config::from_env`] touches the environment. Everything below it
//! receives plain values, so the cache and gateway can be built directly in
//! tests.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::Expiration;
use crate::error::ConfigError;

/// Production Content Delivery API host
pub const CDN_HOST: &str = "cdn.contentful.com";

/// Content Preview API host
pub const PREVIEW_HOST: &str = "preview.contentful.com";

/// Upstream connection parameters.
///
/// Immutable once the gateway is built. `preview_token` must be present when
/// `preview` is set; the gateway checks this at construction.
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Content space identifier, scoped into the upstream path when present
    pub space_id: Option<String>,
    /// Delivery API token
    pub access_token: String,
    /// Preview API token
    pub preview_token: Option<String>,
    /// Route requests to the preview API
    pub preview: bool,
    /// Use https and verify certificates
    pub secure: bool,
    /// Host used when `preview` is false
    pub cdn_host: String,
    /// Host used when `preview` is true
    pub preview_host: String,
}

impl UpstreamConfig {
    /// Creates a delivery API configuration with secure defaults.
    pub fn new(space_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            space_id: Some(space_id.into()),
            access_token: access_token.into(),
            preview_token: None,
            preview: false,
            secure: true,
            cdn_host: CDN_HOST.to_string(),
            preview_host: PREVIEW_HOST.to_string(),
        }
    }
}

/// Server configuration parameters.
#[derive(Debug, Clone)]
pub struct Config {
    /// Upstream connection parameters
    pub upstream: UpstreamConfig,
    /// Maximum age of a cache entry
    pub cache_max_age: Duration,
    /// Whether a cache hit re-arms the entry's max age
    pub expiration: Expiration,
    /// Maximum number of entries the cache can hold
    pub max_entries: usize,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CONTENTFUL_SPACE_ID` - Space identifier (required)
    /// - `CONTENTFUL_ACCESS_TOKEN` - Delivery API token (required)
    /// - `CONTENTFUL_PREVIEW_TOKEN` - Preview API token
    /// - `CONTENTFUL_PREVIEW` - Use the preview API (default: false)
    /// - `CONTENTFUL_SECURE` - Use https (default: true)
    /// - `CONTENTFUL_CDN_HOST` / `CONTENTFUL_PREVIEW_HOST` - Upstream hosts
    /// - `CACHE_EXPIRATION_IN_MINUTES` - Entry max age (default: 1)
    /// - `CACHE_SLIDING_EXPIRATION` - Re-arm max age on hit (default: false)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 1000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 30)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let upstream = UpstreamConfig {
            space_id: Some(required("CONTENTFUL_SPACE_ID")?),
            access_token: required("CONTENTFUL_ACCESS_TOKEN")?,
            preview_token: optional("CONTENTFUL_PREVIEW_TOKEN"),
            preview: parsed_or("CONTENTFUL_PREVIEW", false)?,
            secure: parsed_or("CONTENTFUL_SECURE", true)?,
            cdn_host: optional("CONTENTFUL_CDN_HOST").unwrap_or(defaults.upstream.cdn_host),
            preview_host: optional("CONTENTFUL_PREVIEW_HOST")
                .unwrap_or(defaults.upstream.preview_host),
        };

        let cache_max_age = max_age_from_minutes(parsed_or("CACHE_EXPIRATION_IN_MINUTES", 1)?)?;
        let expiration = if parsed_or("CACHE_SLIDING_EXPIRATION", false)? {
            Expiration::Sliding
        } else {
            Expiration::Absolute
        };

        Ok(Self {
            upstream,
            cache_max_age,
            expiration,
            max_entries: parsed_or("CACHE_MAX_ENTRIES", defaults.max_entries)?,
            server_port: parsed_or("SERVER_PORT", defaults.server_port)?,
            cleanup_interval: parsed_or("CLEANUP_INTERVAL", defaults.cleanup_interval)?,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            upstream: UpstreamConfig {
                space_id: None,
                access_token: String::new(),
                preview_token: None,
                preview: false,
                secure: true,
                cdn_host: CDN_HOST.to_string(),
                preview_host: PREVIEW_HOST.to_string(),
            },
            cache_max_age: Duration::from_secs(60),
            expiration: Expiration::Absolute,
            max_entries: 1000,
            server_port: 3000,
            cleanup_interval: 30,
        }
    }
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::MissingEnv(name))
}

/// Converts `CACHE_EXPIRATION_IN_MINUTES` to a max age, rejecting overflow.
fn max_age_from_minutes(minutes: u64) -> Result<Duration, ConfigError> {
    minutes
        .checked_mul(60)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::InvalidValue {
            name: "CACHE_EXPIRATION_IN_MINUTES",
            value: minutes.to_string(),
        })
}

fn parsed_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match optional(name) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            name,
            value: raw,
        }),
        None => Ok(default),
    }
}
