//! Keyword retriever (spec §4.3). A thin wrapper over
//! `ArticleStore::keyword_search` that degrades to an empty result set
//! on any store error rather than propagating it, mirroring
//! `_bm25_search`'s try/except.

use std::sync::Arc;

use assistsupport_core::{Category, CandidateResult};
use assistsupport_store::{ArticleStore, KeywordHit};

pub struct KeywordRetriever {
    store: Arc<dyn ArticleStore>,
}

impl KeywordRetriever {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    pub async fn search(&self, query: &str, limit: usize) -> Vec<CandidateResult> {
        match self.store.keyword_search(query, limit).await {
            Ok(hits) => hits.into_iter().map(candidate_from_hit).collect(),
            Err(err) => {
                tracing::warn!(error = %err, "keyword search failed, degrading to empty result");
                Vec::new()
            }
        }
    }
}

fn candidate_from_hit(hit: KeywordHit) -> CandidateResult {
    let article = hit.article;
    CandidateResult {
        article_id: article.id,
        title: article.title,
        content: article.content,
        category: article.category,
        source_document_id: article.source_document_id,
        heading_path: article.heading_path,
        bm25_score: hit.score,
        vector_score: 0.0,
        fusion_score: 0.0,
        rerank_score: None,
        quality_score: article.quality_score,
        category_boosted: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistsupport_store::memory::InMemoryArticleStore;
    use chrono::Utc;
    use uuid::Uuid;

    fn article(title: &str) -> assistsupport_core::Article {
        assistsupport_core::Article {
            id: Uuid::new_v4(),
            title: title.to_string(),
            content: "vpn setup details".to_string(),
            category: Category::Procedure,
            source_document_id: None,
            chunk_index: 0,
            heading_path: None,
            embedding: None,
            embedding_model: None,
            is_active: true,
            quality_score: 1.0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn returns_candidates_from_the_store() {
        let store = Arc::new(InMemoryArticleStore::new());
        store.insert(article("vpn guide"));
        let retriever = KeywordRetriever::new(store);

        let results = retriever.search("vpn", 10).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "vpn guide");
        assert!(results[0].bm25_score > 0.0);
    }
}
