//! Domain types shared by every crate in the hybrid search service.
//!
//! No I/O lives here: stores, embedding clients, and the HTTP surface
//! all depend on this crate, never the other way around.

mod article;
mod candidate;
mod error;
mod feedback;
mod fusion;
mod intent;
mod log;
mod query;
mod stats;

pub use article::{Article, DEFAULT_QUALITY_SCORE, MAX_QUALITY_SCORE, MIN_QUALITY_SCORE};
pub use candidate::CandidateResult;
pub use error::{Error, Result};
pub use feedback::{FeedbackEntry, Rating};
pub use fusion::FusionStrategy;
pub use intent::{Category, Intent};
pub use log::QueryLogEntry;
pub use query::Query;
pub use stats::{LatencyPercentiles, QueryStats};
