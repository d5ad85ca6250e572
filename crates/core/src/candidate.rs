use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::intent::Category;

/// One article's scores as it moves through the pipeline.
///
/// Every stage after keyword/vector retrieval mutates `fusion_score`
/// (and, for the reranker, `rerank_score`) in place rather than
/// constructing a new type — this mirrors the Python original's single
/// growing dict per result and keeps ordering stable across stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateResult {
    pub article_id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub source_document_id: Option<String>,
    pub heading_path: Option<String>,

    pub bm25_score: f32,
    pub vector_score: f32,
    pub fusion_score: f32,
    pub rerank_score: Option<f32>,

    pub quality_score: f32,
    pub category_boosted: bool,
}

impl CandidateResult {
    /// Score used for sorting at any given stage: rerank if present,
    /// else the fused/adjusted score.
    pub fn display_score(&self) -> f32 {
        self.rerank_score.unwrap_or(self.fusion_score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(fusion: f32, rerank: Option<f32>) -> CandidateResult {
        CandidateResult {
            article_id: Uuid::new_v4(),
            title: "t".into(),
            content: "c".into(),
            category: Category::Reference,
            source_document_id: None,
            heading_path: None,
            bm25_score: 0.0,
            vector_score: 0.0,
            fusion_score: fusion,
            rerank_score: rerank,
            quality_score: 1.0,
            category_boosted: false,
        }
    }

    #[test]
    fn display_score_prefers_rerank() {
        let c = candidate(0.2, Some(0.9));
        assert_eq!(c.display_score(), 0.9);
        let c = candidate(0.2, None);
        assert_eq!(c.display_score(), 0.2);
    }
}
