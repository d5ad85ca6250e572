//! HTTP surface for the hybrid search service: `/search`, `/feedback`,
//! `/stats`, `/health`, and `/config`, behind Bearer auth (production
//! only) and per-caller rate limiting.

pub mod auth;
pub mod http;
pub mod metrics;
pub mod rate_limit;
pub mod state;

pub use http::create_router;
pub use metrics::init_metrics;
pub use rate_limit::{RateLimitError, RateLimiter};
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Wraps the shared domain error so handlers can `?`-propagate it and
/// have it turn into the right status code and JSON body (spec §7).
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ServerError(#[from] assistsupport_core::Error);

impl From<assistsupport_search::SearchError> for ServerError {
    fn from(err: assistsupport_search::SearchError) -> Self {
        Self(err.into())
    }
}

impl From<assistsupport_store::StoreError> for ServerError {
    fn from(err: assistsupport_store::StoreError) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            assistsupport_core::Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            assistsupport_core::Error::Unauthenticated => StatusCode::UNAUTHORIZED,
            assistsupport_core::Error::Forbidden => StatusCode::FORBIDDEN,
            assistsupport_core::Error::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            assistsupport_core::Error::Embedding(_) => StatusCode::INTERNAL_SERVER_ERROR,
            assistsupport_core::Error::StoreTimeout => StatusCode::INTERNAL_SERVER_ERROR,
            assistsupport_core::Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if !matches!(status, StatusCode::INTERNAL_SERVER_ERROR) {
            tracing::warn!(error = %self.0, %status, "request rejected");
        } else {
            tracing::error!(error = %self.0, "request failed");
            let kind = match &self.0 {
                assistsupport_core::Error::Embedding(_) => "embedding",
                assistsupport_core::Error::StoreTimeout => "store_timeout",
                _ => "internal",
            };
            crate::metrics::record_error(kind);
        }

        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}
