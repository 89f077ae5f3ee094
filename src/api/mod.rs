//! API Module
//!
//! The proxy's whole HTTP surface.
//!
//! # Endpoints
//! - `GET /healthcheck` - Health check, answers `OK`
//! - `DELETE <any>` - Clear the response cache
//! - `GET /entries?content_type=webchatFeature|insightsTips` - Cache or forward
//! - anything else - 401 with an explanation

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
