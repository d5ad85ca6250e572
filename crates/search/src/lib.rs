//! Hybrid keyword + vector retrieval for IT support knowledge-base
//! articles: intent classification, keyword/vector retrieval, score
//! fusion, post-adjustment, deduplication, cross-encoder reranking,
//! feedback aggregation, and the coordinator that orchestrates them.

pub mod adjust;
pub mod coordinator;
pub mod dedup;
pub mod embedding;
pub mod feedback;
pub mod fusion;
pub mod intent;
pub mod keyword;
pub mod rerank;
pub mod vector;

pub use coordinator::{QueryCoordinator, SearchError, SearchOutcome};
pub use embedding::{EmbeddingClient, EmbeddingError, EmbeddingRole, PrefixAwareEmbedder, SimpleEmbedder};
pub use feedback::{FeedbackAggregator, FeedbackError, QualityUpdate};
pub use intent::{IntentClassifier, IntentProbabilitySource, KeywordIntentClassifier, MlIntentClassifier};
pub use keyword::KeywordRetriever;
pub use rerank::{CrossEncoderClient, KeywordOverlapScorer, RerankError, Reranker};
pub use vector::VectorRetriever;
