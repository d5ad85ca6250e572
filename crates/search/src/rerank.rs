//! Cross-encoder reranker (spec §4.8), ported from `reranker.py`. The
//! cross-encoder model itself is out of scope — only its contract
//! (`CrossEncoderClient::score_pairs`) is defined here — but the
//! passage cleaning, min-max normalization, and 85/15 fusion-dominant
//! blend are this crate's responsibility and match the Python original
//! exactly (not the teacher's 30/70 blend).

use async_trait::async_trait;
use regex::Regex;

use assistsupport_config::constants::rerank as consts;
use assistsupport_core::CandidateResult;

#[derive(thiserror::Error, Debug)]
pub enum RerankError {
    #[error("cross-encoder model failed: {0}")]
    ModelFailure(String),
}

/// A model that scores `(query, passage)` pairs; higher is more
/// relevant. Pairs are passed in the same order as `passages`.
#[async_trait]
pub trait CrossEncoderClient: Send + Sync {
    async fn score_pairs(&self, query: &str, passages: &[String]) -> Result<Vec<f32>, RerankError>;
}

/// Deterministic test double: scores a passage by the fraction of
/// query terms it contains, in the style of the teacher's
/// `SimpleScorer` keyword-overlap fallback.
pub struct KeywordOverlapScorer;

#[async_trait]
impl CrossEncoderClient for KeywordOverlapScorer {
    async fn score_pairs(&self, query: &str, passages: &[String]) -> Result<Vec<f32>, RerankError> {
        let terms: Vec<String> = query.to_lowercase().split_whitespace().map(String::from).collect();
        if terms.is_empty() {
            return Ok(vec![0.0; passages.len()]);
        }

        Ok(passages
            .iter()
            .map(|passage| {
                let passage_lower = passage.to_lowercase();
                let matched = terms.iter().filter(|t| passage_lower.contains(t.as_str())).count();
                matched as f32 / terms.len() as f32
            })
            .collect())
    }
}

pub struct Reranker<C> {
    client: C,
}

impl<C: CrossEncoderClient> Reranker<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// Strips trailing `Attachments:`/`Related Articles:` sections,
    /// collapses whitespace, and truncates to the cross-encoder's
    /// context window, per `_clean_passage`.
    fn clean_passage(title: &str, content: &str) -> String {
        let combined = format!("{title}. {content}");
        let attachments = Regex::new(r"(?s)Attachments?:.*$").unwrap();
        let related = Regex::new(r"(?s)Related [Aa]rticles?:.*$").unwrap();
        let whitespace = Regex::new(r"\s+").unwrap();

        let cleaned = attachments.replace(&combined, "");
        let cleaned = related.replace(&cleaned, "");
        let cleaned = whitespace.replace_all(&cleaned, " ");
        let cleaned = cleaned.trim();

        cleaned.chars().take(consts::MAX_PASSAGE_CHARS).collect()
    }

    /// Reranks and truncates to `top_k`. Candidate lists of length 0
    /// or 1 are returned as-is (truncated), matching the Python
    /// original's short-circuit.
    pub async fn rerank(
        &self,
        query: &str,
        mut candidates: Vec<CandidateResult>,
        top_k: usize,
    ) -> Result<Vec<CandidateResult>, RerankError> {
        if candidates.len() <= 1 {
            candidates.truncate(top_k);
            return Ok(candidates);
        }

        let passages: Vec<String> = candidates
            .iter()
            .map(|c| Self::clean_passage(&c.title, &c.content))
            .collect();

        let raw_scores = self.client.score_pairs(query, &passages).await?;

        let ce_min = raw_scores.iter().cloned().fold(f32::INFINITY, f32::min);
        let ce_max = raw_scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let ce_range = if (ce_max - ce_min).abs() > f32::EPSILON { ce_max - ce_min } else { 1.0 };

        let fusion_scores: Vec<f32> = candidates.iter().map(|c| c.fusion_score).collect();
        let f_min = fusion_scores.iter().cloned().fold(f32::INFINITY, f32::min);
        let f_max = fusion_scores.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let f_range = if (f_max - f_min).abs() > f32::EPSILON { f_max - f_min } else { 1.0 };

        for (i, candidate) in candidates.iter_mut().enumerate() {
            let ce_norm = (raw_scores[i] - ce_min) / ce_range;
            let fusion_norm = (fusion_scores[i] - f_min) / f_range;
            let blended = consts::RERANK_WEIGHT as f32 * ce_norm + consts::FUSION_WEIGHT as f32 * fusion_norm;

            candidate.rerank_score = Some(raw_scores[i]);
            candidate.fusion_score = blended;
        }

        candidates.sort_by(|a, b| b.fusion_score.partial_cmp(&a.fusion_score).unwrap());
        candidates.truncate(top_k);
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistsupport_core::Category;
    use uuid::Uuid;

    fn candidate(title: &str, content: &str, fusion_score: f32) -> CandidateResult {
        CandidateResult {
            article_id: Uuid::new_v4(),
            title: title.to_string(),
            content: content.to_string(),
            category: Category::Policy,
            source_document_id: None,
            heading_path: None,
            bm25_score: 0.0,
            vector_score: 0.0,
            fusion_score,
            rerank_score: None,
            quality_score: 1.0,
            category_boosted: false,
        }
    }

    #[test]
    fn clean_passage_strips_attachments_section() {
        let cleaned = Reranker::<KeywordOverlapScorer>::clean_passage(
            "Title",
            "Body text.\nAttachments: file1.pdf, file2.pdf",
        );
        assert!(!cleaned.contains("file1.pdf"));
        assert!(cleaned.contains("Body text"));
    }

    #[test]
    fn clean_passage_truncates_to_max_chars() {
        let long_content = "a".repeat(1000);
        let cleaned = Reranker::<KeywordOverlapScorer>::clean_passage("t", &long_content);
        assert!(cleaned.chars().count() <= consts::MAX_PASSAGE_CHARS);
    }

    #[tokio::test]
    async fn short_circuits_for_zero_or_one_candidates() {
        let reranker = Reranker::new(KeywordOverlapScorer);
        let result = reranker.rerank("query", vec![], 10).await.unwrap();
        assert!(result.is_empty());

        let result = reranker
            .rerank("query", vec![candidate("a", "b", 0.5)], 10)
            .await
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].rerank_score, None);
    }

    #[tokio::test]
    async fn blends_85_15_fusion_dominant() {
        let reranker = Reranker::new(KeywordOverlapScorer);
        let candidates = vec![
            candidate("vpn setup", "vpn configuration guide for remote access", 0.2),
            candidate("printer help", "printer driver installation", 0.9),
        ];

        let reranked = reranker.rerank("vpn configuration", candidates, 10).await.unwrap();
        assert!(reranked.iter().all(|c| c.rerank_score.is_some()));
        assert_eq!(reranked[0].title, "printer help");
    }
}
