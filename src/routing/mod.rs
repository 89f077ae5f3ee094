//! Routing Module
//!
//! Request classification and query string parsing.

mod classifier;
mod query;

pub use classifier::{
    classify, Rejection, Route, ALLOWED_CONTENT_TYPES, ENTRIES_PATH, HEALTHCHECK_PATH,
};
pub use query::{QueryParam, QueryParams};
