//! Query coordinator (spec §4.10), ported from
//! `hybrid_search.py::HybridSearchEngine.search`. Orchestrates every
//! other component in this crate: classify intent, embed the query,
//! run keyword and vector retrieval concurrently, fuse, adjust,
//! deduplicate, optionally rerank, then log — all within one request.

use std::sync::Arc;
use std::time::Instant;

use assistsupport_config::constants::retrieval as retrieval_consts;
use assistsupport_core::{CandidateResult, FusionStrategy, Intent, Query, QueryLogEntry};
use assistsupport_store::ArticleStore;

use crate::adjust::{apply_category_boost, apply_quality_scores};
use crate::dedup::deduplicate;
use crate::embedding::{EmbeddingClient, EmbeddingError, EmbeddingRole};
use crate::fusion::{adaptive_fusion, reciprocal_rank_fusion, weighted_combination};
use crate::intent::IntentClassifier;
use crate::keyword::KeywordRetriever;
use crate::rerank::{CrossEncoderClient, RerankError, Reranker};
use crate::vector::VectorRetriever;

use assistsupport_config::constants::fusion as fusion_consts;

#[derive(thiserror::Error, Debug)]
pub enum SearchError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("embedding failure: {0}")]
    Embedding(#[from] EmbeddingError),
    #[error("rerank failure: {0}")]
    Rerank(#[from] RerankError),
}

impl From<SearchError> for assistsupport_core::Error {
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidInput(msg) => assistsupport_core::Error::InvalidInput(msg),
            SearchError::Embedding(e) => assistsupport_core::Error::Embedding(e.to_string()),
            SearchError::Rerank(e) => assistsupport_core::Error::Internal(e.to_string()),
        }
    }
}

/// Everything the caller needs back: the ranked results plus the
/// telemetry row the coordinator is about to log.
pub struct SearchOutcome {
    pub results: Vec<CandidateResult>,
    pub log_entry: QueryLogEntry,
}

pub struct QueryCoordinator<E, I, C> {
    store: Arc<dyn ArticleStore>,
    keyword: KeywordRetriever,
    vector: VectorRetriever,
    embedder: Arc<E>,
    intent_classifier: Arc<I>,
    reranker: Reranker<C>,
    ef_search: u32,
}

impl<E, I, C> QueryCoordinator<E, I, C>
where
    E: EmbeddingClient,
    I: IntentClassifier,
    C: CrossEncoderClient,
{
    pub fn new(
        store: Arc<dyn ArticleStore>,
        embedder: Arc<E>,
        intent_classifier: Arc<I>,
        cross_encoder: C,
        ef_search: u32,
    ) -> Self {
        Self {
            keyword: KeywordRetriever::new(store.clone()),
            vector: VectorRetriever::new(store.clone()),
            store,
            embedder,
            intent_classifier,
            reranker: Reranker::new(cross_encoder),
            ef_search,
        }
    }

    pub async fn search(&self, mut query: Query) -> Result<SearchOutcome, SearchError> {
        if query.text.trim().is_empty() {
            return Err(SearchError::InvalidInput("query text must not be empty".into()));
        }
        query.top_k = query.top_k.clamp(retrieval_consts::MIN_TOP_K, retrieval_consts::MAX_TOP_K);

        let start = Instant::now();
        let mut log_entry = QueryLogEntry::new(query.text.clone(), query.fusion_strategy);
        log_entry.ef_search_used = Some(self.ef_search);

        // Step 1: classify intent.
        let (intent, intent_confidence) = self.intent_classifier.classify(&query.text).await;
        query.intent = Some(intent);
        query.intent_confidence = intent_confidence;
        log_entry.intent = intent;
        log_entry.intent_confidence = intent_confidence;

        // Step 2 & 3: embed the query and run keyword retrieval
        // concurrently. Each future times itself so the two overlapping
        // stages still yield separate, comparable durations rather than
        // one being folded into the other's wall-clock window.
        let keyword_limit = retrieval_consts::KEYWORD_CANDIDATE_LIMIT;
        let embed_future = async {
            let t = Instant::now();
            let result = self.embedder.embed(&query.text, EmbeddingRole::Query).await;
            (result, t.elapsed())
        };
        let keyword_future = async {
            let t = Instant::now();
            let result = self.keyword.search(&query.text, keyword_limit).await;
            (result, t.elapsed())
        };
        let ((embedding, embed_time), (keyword_results, keyword_time)) = tokio::join!(embed_future, keyword_future);
        let embedding = embedding?;

        let vector_limit = (query.top_k * 2).max(retrieval_consts::VECTOR_CANDIDATE_LIMIT);
        let vector_start = Instant::now();
        let vector_results = self.vector.search(&embedding, vector_limit).await;
        let vector_time = vector_start.elapsed();

        log_entry.bm25_result_count = keyword_results.len();
        log_entry.vector_result_count = vector_results.len();
        log_entry.embedding_time_ms = embed_time.as_millis() as u64;
        log_entry.search_time_ms = (keyword_time + vector_time).as_millis() as u64;

        // Step 4: fuse.
        let fusion_start = Instant::now();
        let mut fused = match query.fusion_strategy {
            FusionStrategy::Rrf => reciprocal_rank_fusion(keyword_results, vector_results, fusion_consts::RRF_K),
            FusionStrategy::Weighted => weighted_combination(
                keyword_results,
                vector_results,
                fusion_consts::DEFAULT_BM25_WEIGHT,
                fusion_consts::DEFAULT_VECTOR_WEIGHT,
            ),
            FusionStrategy::Adaptive | FusionStrategy::Rerank => {
                adaptive_fusion(keyword_results, vector_results, intent)
            }
        };
        log_entry.fusion_time_ms = fusion_start.elapsed().as_millis() as u64;

        // Step 5: category boost, only for confidently-classified intents.
        fused = apply_category_boost(fused, intent, intent_confidence);

        // Step 5.5: quality multiplier.
        fused = apply_quality_scores(fused);

        // Step 6: deduplicate.
        if query.deduplicate {
            fused = deduplicate(fused);
        }

        // Step 7/8: truncate, optionally rerank.
        let results = if matches!(query.fusion_strategy, FusionStrategy::Rerank) {
            let rerank_pool_size = (query.top_k * 2).min(20);
            fused.truncate(rerank_pool_size);
            let rerank_start = Instant::now();
            let reranked = self.reranker.rerank(&query.text, fused, query.top_k).await?;
            log_entry.rerank_time_ms = rerank_start.elapsed().as_millis() as u64;
            reranked
        } else {
            fused.truncate(query.top_k);
            fused
        };

        log_entry.result_count = results.len();
        log_entry.response_time_ms = start.elapsed().as_millis() as u64;

        // Step 9: log query, fire-and-forget.
        if let Err(err) = self.store.log_query(&log_entry).await {
            tracing::warn!(error = %err, "failed to log query telemetry");
        }

        Ok(SearchOutcome { results, log_entry })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::SimpleEmbedder;
    use crate::intent::KeywordIntentClassifier;
    use crate::rerank::KeywordOverlapScorer;
    use assistsupport_core::Category;
    use assistsupport_store::memory::InMemoryArticleStore;
    use chrono::Utc;
    use uuid::Uuid;

    fn article(title: &str, content: &str, category: Category, embedding: Vec<f32>) -> assistsupport_core::Article {
        assistsupport_core::Article {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            category,
            source_document_id: None,
            chunk_index: 0,
            heading_path: None,
            embedding: Some(embedding),
            embedding_model: Some("test".into()),
            is_active: true,
            quality_score: 1.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn end_to_end_search_returns_ranked_results() {
        let store = Arc::new(InMemoryArticleStore::new());
        store.insert(article(
            "VPN Setup Guide",
            "How to configure the VPN client for remote access",
            Category::Procedure,
            vec![1.0, 0.0, 0.0],
        ));
        store.insert(article(
            "Printer Troubleshooting",
            "Steps for fixing common printer driver issues",
            Category::Procedure,
            vec![0.0, 1.0, 0.0],
        ));

        let embedder = Arc::new(SimpleEmbedder::new(3));
        let intent_classifier = Arc::new(KeywordIntentClassifier::new());
        let coordinator = QueryCoordinator::new(store, embedder, intent_classifier, KeywordOverlapScorer, 100);

        let query = Query::new("how do I set up the VPN");
        let outcome = coordinator.search(query).await.unwrap();

        assert!(!outcome.results.is_empty());
        assert_eq!(outcome.log_entry.result_count, outcome.results.len());
        assert_eq!(outcome.log_entry.ef_search_used, Some(100));
    }

    #[tokio::test]
    async fn top_k_is_clamped_even_when_the_caller_asks_for_more() {
        let store = Arc::new(InMemoryArticleStore::new());
        for i in 0..60 {
            store.insert(article(
                &format!("Article {i}"),
                "vpn configuration details for remote access",
                Category::Procedure,
                vec![1.0, 0.0, 0.0],
            ));
        }

        let embedder = Arc::new(SimpleEmbedder::new(3));
        let intent_classifier = Arc::new(KeywordIntentClassifier::new());
        let coordinator = QueryCoordinator::new(store, embedder, intent_classifier, KeywordOverlapScorer, 100);

        let mut query = Query::new("vpn configuration");
        query.top_k = 500;
        let outcome = coordinator.search(query).await.unwrap();

        assert!(outcome.results.len() <= 50);
    }

    #[tokio::test]
    async fn rejects_empty_query_text() {
        let store = Arc::new(InMemoryArticleStore::new());
        let embedder = Arc::new(SimpleEmbedder::new(3));
        let intent_classifier = Arc::new(KeywordIntentClassifier::new());
        let coordinator = QueryCoordinator::new(store, embedder, intent_classifier, KeywordOverlapScorer, 100);

        let err = coordinator.search(Query::new("   ")).await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidInput(_)));
    }
}
