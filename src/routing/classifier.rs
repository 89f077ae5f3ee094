//! Request Classifier
//!
//! Decides what to do with a request from its method and target alone,
//! before any cache or upstream I/O happens.

use axum::http::Method;

use super::query::QueryParams;

/// Path answered by the health check
pub const HEALTHCHECK_PATH: &str = "/healthcheck";

/// The only resource the proxy serves
pub const ENTRIES_PATH: &str = "/entries";

/// `content_type` values the proxy is willing to fetch
pub const ALLOWED_CONTENT_TYPES: [&str; 2] = ["webchatFeature", "insightsTips"];

// == Route ==
/// Category of an inbound request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    HealthCheck,
    ClearCache,
    Rejected(Rejection),
    Cacheable,
}

// == Rejection ==
/// Why a request is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Target is not `/entries` with a query string
    BadPath,
    /// `content_type` is missing, multi-valued, or not allowed
    BadContentType,
}

impl Rejection {
    /// Text sent to the client.
    pub fn message(&self) -> &'static str {
        match self {
            Rejection::BadPath => "Only '/entries' allowed",
            Rejection::BadContentType => "Missing content_type or content_type value not allowed",
        }
    }
}

// == Classify ==
/// Classifies a request from its method and raw path+query.
///
/// Checks run in order: health check, cache clear (any DELETE), path
/// allowlist, content type allowlist.
pub fn classify(method: &Method, target: &str) -> Route {
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (target, None),
    };

    if method == Method::GET && path == HEALTHCHECK_PATH {
        return Route::HealthCheck;
    }

    if method == Method::DELETE {
        return Route::ClearCache;
    }

    // `/entries` and `/entries/` both qualify, but only with a `?`
    let is_entries = path == ENTRIES_PATH || path == "/entries/";
    let Some(query) = query.filter(|_| is_entries) else {
        return Route::Rejected(Rejection::BadPath);
    };

    let params = QueryParams::parse(query);
    match params.single("content_type") {
        Some(content_type) if ALLOWED_CONTENT_TYPES.contains(&content_type) => Route::Cacheable,
        _ => Route::Rejected(Rejection::BadContentType),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_healthcheck() {
        assert_eq!(classify(&Method::GET, "/healthcheck"), Route::HealthCheck);
        assert_eq!(
            classify(&Method::GET, "/healthcheck?check=1"),
            Route::HealthCheck
        );
    }

    #[test]
    fn test_healthcheck_requires_get() {
        assert_eq!(
            classify(&Method::POST, "/healthcheck"),
            Route::Rejected(Rejection::BadPath)
        );
    }

    #[test]
    fn test_delete_clears_any_path() {
        assert_eq!(classify(&Method::DELETE, "/anything"), Route::ClearCache);
        assert_eq!(classify(&Method::DELETE, "/healthcheck"), Route::ClearCache);
        assert_eq!(
            classify(&Method::DELETE, "/entries?content_type=banana"),
            Route::ClearCache
        );
    }

    #[test]
    fn test_allowed_content_types() {
        assert_eq!(
            classify(&Method::GET, "/entries?content_type=webchatFeature"),
            Route::Cacheable
        );
        assert_eq!(
            classify(&Method::GET, "/entries?content_type=insightsTips&limit=5"),
            Route::Cacheable
        );
        assert_eq!(
            classify(&Method::GET, "/entries/?locale=en&content_type=insightsTips"),
            Route::Cacheable
        );
    }

    #[test]
    fn test_bad_path() {
        let rejected = Route::Rejected(Rejection::BadPath);

        assert_eq!(classify(&Method::GET, "/other-path"), rejected);
        assert_eq!(classify(&Method::GET, "/entries"), rejected);
        assert_eq!(classify(&Method::GET, "/entries/"), rejected);
        assert_eq!(classify(&Method::GET, "/entriesX?content_type=insightsTips"), rejected);
        assert_eq!(classify(&Method::GET, "/entries/1?content_type=insightsTips"), rejected);
        assert_eq!(classify(&Method::GET, "/"), rejected);
    }

    #[test]
    fn test_bad_content_type() {
        let rejected = Route::Rejected(Rejection::BadContentType);

        assert_eq!(classify(&Method::GET, "/entries?content_type=banana"), rejected);
        assert_eq!(classify(&Method::GET, "/entries?limit=1"), rejected);
        assert_eq!(classify(&Method::GET, "/entries?"), rejected);
        assert_eq!(classify(&Method::GET, "/entries?content_type="), rejected);
        assert_eq!(
            classify(&Method::GET, "/entries?content_type=webchatfeature"),
            rejected
        );
    }

    #[test]
    fn test_multi_valued_content_type_rejected() {
        let rejected = Route::Rejected(Rejection::BadContentType);

        assert_eq!(
            classify(
                &Method::GET,
                "/entries?content_type=webchatFeature&content_type=insightsTips"
            ),
            rejected
        );
        assert_eq!(
            classify(&Method::GET, "/entries?content_type[]=webchatFeature"),
            rejected
        );
    }

    #[test]
    fn test_encoded_content_type_is_decoded() {
        assert_eq!(
            classify(&Method::GET, "/entries?content%5Ftype=insights%54ips"),
            Route::Cacheable
        );
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(Rejection::BadPath.message(), "Only '/entries' allowed");
        assert_eq!(
            Rejection::BadContentType.message(),
            "Missing content_type or content_type value not allowed"
        );
    }

    proptest! {
        #[test]
        fn prop_unknown_content_types_rejected(value in "[a-zA-Z]{1,20}") {
            prop_assume!(!ALLOWED_CONTENT_TYPES.contains(&value.as_str()));
            let target = format!("/entries?content_type={}", value);
            prop_assert_eq!(
                classify(&Method::GET, &target),
                Route::Rejected(Rejection::BadContentType)
            );
        }

        #[test]
        fn prop_other_paths_rejected(path in "/[a-z]{1,12}") {
            prop_assume!(path != ENTRIES_PATH && path != HEALTHCHECK_PATH);
            let target = format!("{}?content_type=webchatFeature", path);
            prop_assert_eq!(
                classify(&Method::GET, &target),
                Route::Rejected(Rejection::BadPath)
            );
        }

        #[test]
        fn prop_extra_params_keep_allowed_requests_cacheable(
            extra in "[a-z]{1,8}=[a-z0-9]{0,8}",
            idx in 0usize..2
        ) {
            prop_assume!(!extra.starts_with("content_type"));
            let target = format!(
                "/entries?{}&content_type={}",
                extra, ALLOWED_CONTENT_TYPES[idx]
            );
            prop_assert_eq!(classify(&Method::GET, &target), Route::Cacheable);
        }
    }
}
