//! Crate-wide error type.
//!
//! Mirrors the taxonomy in spec §7: errors affecting the correctness of
//! the current request are distinct, named variants; errors affecting
//! only an alternate retrieval path or observability are not
//! represented here at all (callers degrade locally and log instead of
//! constructing one of these).

use thiserror::Error;

/// Errors that must surface to the caller of a request.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or missing request input (400).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Missing or invalid bearer token in production mode (401).
    #[error("unauthenticated")]
    Unauthenticated,

    /// Valid token, insufficient privilege (403).
    #[error("forbidden")]
    Forbidden,

    /// Caller exceeded the configured request rate (429).
    #[error("rate limited")]
    RateLimited,

    /// The embedding model failed to encode the query (500).
    #[error("embedding failure: {0}")]
    Embedding(String),

    /// A store round-trip exceeded the request deadline (500).
    #[error("store timeout")]
    StoreTimeout,

    /// Anything else that should become a 500.
    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;
