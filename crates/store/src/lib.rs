//! The article store contract (spec §6.2) plus two implementations:
//! [`postgres::PgArticleStore`] (Postgres + pgvector, for production)
//! and [`memory::InMemoryArticleStore`] (brute-force, for tests).
//!
//! Neither the storage engine nor the batch ingestion jobs that
//! populate it are this crate's concern — only the read/write contract
//! the retrieval core depends on.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use assistsupport_core::{Article, FeedbackEntry, QueryLogEntry, QueryStats};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("store query timed out")]
    Timeout,

    #[error("store query failed: {0}")]
    Query(String),

    #[error("article not found: {0}")]
    NotFound(Uuid),
}

impl From<StoreError> for assistsupport_core::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Timeout => assistsupport_core::Error::StoreTimeout,
            other => assistsupport_core::Error::Internal(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// One keyword-search hit: an article plus its raw BM25/`ts_rank` score.
#[derive(Debug, Clone)]
pub struct KeywordHit {
    pub article: Article,
    pub score: f32,
}

/// One vector-search hit: an article plus its raw similarity score
/// (`1 - cosine_distance`, so higher is more similar).
#[derive(Debug, Clone)]
pub struct VectorHit {
    pub article: Article,
    pub score: f32,
}

/// The storage contract every retriever and the coordinator depend on.
/// Implementations are expected to degrade by returning an `Err` that
/// the caller logs and treats as "no results from this path" (spec
/// §4.3/§4.4) — this trait does not itself hide failures.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Full-text search over active articles, ranked by keyword
    /// relevance, highest first. At most `limit` hits.
    async fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<KeywordHit>>;

    /// Approximate nearest-neighbor search over active articles'
    /// embeddings, ranked by similarity, highest first. At most
    /// `limit` hits.
    async fn vector_search(&self, embedding: &[f32], limit: usize) -> Result<Vec<VectorHit>>;

    /// Fetch full article rows by id, in no particular order, skipping
    /// any id that no longer resolves to an active article.
    async fn fetch_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Article>>;

    /// Adjust the ANN index's `ef_search` parameter (HNSW search-time
    /// recall/latency knob). A no-op for stores without a tunable
    /// index.
    async fn set_ef_search(&self, ef_search: u32) -> Result<()>;

    /// Persist one row of query telemetry. Callers treat failures here
    /// as non-fatal (logged, not surfaced).
    async fn log_query(&self, entry: &QueryLogEntry) -> Result<()>;

    /// Persist one feedback row.
    async fn log_feedback(&self, entry: &FeedbackEntry) -> Result<()>;

    /// Overwrite an article's stored quality score (written by the
    /// feedback aggregator, never by the request path).
    async fn update_quality_score(&self, article_id: Uuid, quality_score: f32) -> Result<()>;

    /// Fetch all feedback rows recorded for the given articles, used
    /// by the feedback aggregator to recompute quality scores.
    async fn feedback_for_articles(&self, article_ids: &[Uuid]) -> Result<Vec<FeedbackEntry>>;

    /// Every active article id, used by the feedback aggregator to
    /// find which articles have feedback worth aggregating.
    async fn all_active_article_ids(&self) -> Result<Vec<Uuid>>;

    /// Query volume, latency percentiles, intent mix, and feedback
    /// ratings backing `GET /stats` (spec §6.1).
    async fn query_stats(&self) -> Result<QueryStats>;
}
