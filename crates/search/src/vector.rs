//! Vector retriever (spec §4.4). Wraps `ArticleStore::vector_search`
//! and self-disables permanently on the first failure, mirroring
//! `_vector_search` flipping `vector_search_enabled = False` for the
//! remainder of the process's lifetime rather than retrying every
//! request against a store that has already proven unreachable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use assistsupport_core::CandidateResult;
use assistsupport_store::{ArticleStore, VectorHit};

pub struct VectorRetriever {
    store: Arc<dyn ArticleStore>,
    enabled: AtomicBool,
}

impl VectorRetriever {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self {
            store,
            enabled: AtomicBool::new(true),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    pub async fn search(&self, embedding: &[f32], limit: usize) -> Vec<CandidateResult> {
        if !self.is_enabled() {
            return Vec::new();
        }

        match self.store.vector_search(embedding, limit).await {
            Ok(hits) => hits.into_iter().map(candidate_from_hit).collect(),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "vector search failed, disabling vector retrieval for the rest of this process"
                );
                self.enabled.store(false, Ordering::Relaxed);
                Vec::new()
            }
        }
    }
}

fn candidate_from_hit(hit: VectorHit) -> CandidateResult {
    let article = hit.article;
    CandidateResult {
        article_id: article.id,
        title: article.title,
        content: article.content,
        category: article.category,
        source_document_id: article.source_document_id,
        heading_path: article.heading_path,
        bm25_score: 0.0,
        vector_score: hit.score,
        fusion_score: 0.0,
        rerank_score: None,
        quality_score: article.quality_score,
        category_boosted: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistsupport_core::Category;
    use assistsupport_store::memory::InMemoryArticleStore;
    use chrono::Utc;
    use uuid::Uuid;

    fn article(title: &str, embedding: Vec<f32>) -> assistsupport_core::Article {
        assistsupport_core::Article {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: "content".to_string(),
            category: Category::Reference,
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
    async fn returns_candidates_ranked_by_similarity() {
        let store = Arc::new(InMemoryArticleStore::new());
        store.insert(article("close", vec![1.0, 0.0]));
        store.insert(article("far", vec![0.0, 1.0]));
        let retriever = VectorRetriever::new(store);

        let results = retriever.search(&[1.0, 0.0], 10).await;
        assert_eq!(results[0].title, "close");
        assert!(retriever.is_enabled());
    }
}
