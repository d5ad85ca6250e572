//! Score fusion (spec §4.5), ported from `score_fusion.py`'s
//! `ScoreFusion` class: reciprocal rank fusion, weighted combination,
//! and adaptive (intent-weighted) fusion.

use std::collections::HashMap;

use assistsupport_config::constants::fusion as consts;
use assistsupport_core::{CandidateResult, Intent};

/// `reciprocal_rank_fusion`: `score = sum(1 / (k + rank))` across
/// whichever of the two lists a candidate appears in, rank 1-based.
pub fn reciprocal_rank_fusion(
    bm25: Vec<CandidateResult>,
    vector: Vec<CandidateResult>,
    k: f64,
) -> Vec<CandidateResult> {
    let mut merged: HashMap<uuid::Uuid, CandidateResult> = HashMap::new();
    let mut scores: HashMap<uuid::Uuid, f64> = HashMap::new();

    for (rank, candidate) in bm25.into_iter().enumerate() {
        let rank = (rank + 1) as f64;
        *scores.entry(candidate.article_id).or_insert(0.0) += 1.0 / (k + rank);
        merged.entry(candidate.article_id).or_insert(candidate);
    }

    for (rank, candidate) in vector.into_iter().enumerate() {
        let rank = (rank + 1) as f64;
        *scores.entry(candidate.article_id).or_insert(0.0) += 1.0 / (k + rank);
        merged
            .entry(candidate.article_id)
            .and_modify(|existing| existing.vector_score = candidate.vector_score)
            .or_insert(candidate);
    }

    finalize(merged, scores)
}

/// `weighted_combination`: normalize each side independently, then a
/// fixed linear blend. bm25 is normalized by its own max (floored to
/// avoid division by ~0); vector is assumed already bounded in
/// `[0, 1]` and only clamped.
pub fn weighted_combination(
    bm25: Vec<CandidateResult>,
    vector: Vec<CandidateResult>,
    bm25_weight: f64,
    vector_weight: f64,
) -> Vec<CandidateResult> {
    let bm25_max = bm25
        .iter()
        .map(|c| c.bm25_score as f64)
        .fold(0.0, f64::max)
        .max(consts::BM25_NORMALIZATION_FLOOR);

    let mut merged: HashMap<uuid::Uuid, CandidateResult> = HashMap::new();
    let mut scores: HashMap<uuid::Uuid, f64> = HashMap::new();

    for candidate in bm25 {
        let normalized = (candidate.bm25_score as f64 / bm25_max).min(1.0);
        scores.insert(candidate.article_id, normalized * bm25_weight);
        merged.insert(candidate.article_id, candidate);
    }

    for candidate in vector {
        let normalized = (candidate.vector_score as f64).clamp(0.0, 1.0);
        *scores.entry(candidate.article_id).or_insert(0.0) += normalized * vector_weight;
        merged
            .entry(candidate.article_id)
            .and_modify(|existing| existing.vector_score = candidate.vector_score)
            .or_insert(candidate);
    }

    finalize(merged, scores)
}

/// `adaptive_fusion`: looks up the intent's (bm25_weight, vector_weight)
/// pair and delegates to `weighted_combination`.
pub fn adaptive_fusion(
    bm25: Vec<CandidateResult>,
    vector: Vec<CandidateResult>,
    intent: Intent,
) -> Vec<CandidateResult> {
    let (bm25_weight, vector_weight) = match intent {
        Intent::Policy => consts::ADAPTIVE_WEIGHTS_POLICY,
        Intent::Procedure => consts::ADAPTIVE_WEIGHTS_PROCEDURE,
        Intent::Reference => consts::ADAPTIVE_WEIGHTS_REFERENCE,
        Intent::Unknown => consts::ADAPTIVE_WEIGHTS_UNKNOWN,
    };
    weighted_combination(bm25, vector, bm25_weight, vector_weight)
}

fn finalize(
    mut merged: HashMap<uuid::Uuid, CandidateResult>,
    scores: HashMap<uuid::Uuid, f64>,
) -> Vec<CandidateResult> {
    for (id, score) in &scores {
        if let Some(candidate) = merged.get_mut(id) {
            candidate.fusion_score = *score as f32;
        }
    }
    let mut results: Vec<CandidateResult> = merged.into_values().collect();
    results.sort_by(|a, b| b.fusion_score.partial_cmp(&a.fusion_score).unwrap());
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistsupport_core::Category;
    use uuid::Uuid;

    fn candidate(title: &str, bm25: f32, vector: f32) -> CandidateResult {
        CandidateResult {
            article_id: Uuid::new_v4(),
            title: title.to_string(),
            content: String::new(),
            category: Category::Reference,
            source_document_id: None,
            heading_path: None,
            bm25_score: bm25,
            vector_score: vector,
            fusion_score: 0.0,
            rerank_score: None,
            quality_score: 1.0,
            category_boosted: false,
        }
    }

    #[test]
    fn rrf_favors_items_ranked_highly_in_both_lists() {
        let a = candidate("a", 5.0, 0.0);
        let b = candidate("b", 0.0, 0.9);
        let a_id = a.article_id;

        let bm25 = vec![a.clone(), b.clone()];
        let vector = vec![a, b];

        let fused = reciprocal_rank_fusion(bm25, vector, 60.0);
        assert_eq!(fused[0].article_id, a_id);
        let expected = 1.0 / 61.0 + 1.0 / 61.0;
        assert!((fused[0].fusion_score as f64 - expected).abs() < 1e-9);
    }

    #[test]
    fn weighted_combination_applies_default_weights() {
        let a = candidate("a", 10.0, 0.8);
        let fused = weighted_combination(vec![a.clone()], vec![a], 0.3, 0.6);
        let expected = 1.0 * 0.3 + 0.8 * 0.6;
        assert!((fused[0].fusion_score as f64 - expected).abs() < 1e-6);
    }

    #[test]
    fn adaptive_fusion_uses_reference_weights_for_reference_intent() {
        let a = candidate("a", 1.0, 1.0);
        let fused = adaptive_fusion(vec![a.clone()], vec![a], Intent::Reference);
        let (bw, vw) = consts::ADAPTIVE_WEIGHTS_REFERENCE;
        let expected = 1.0 * bw + 1.0 * vw;
        assert!((fused[0].fusion_score as f64 - expected).abs() < 1e-6);
    }

    #[test]
    fn weighted_combination_floors_bm25_normalization_when_all_zero() {
        let a = candidate("a", 0.0, 0.5);
        let fused = weighted_combination(vec![a.clone()], vec![a], 0.3, 0.6);
        assert!((fused[0].fusion_score as f64 - 0.3).abs() < 1e-6);
    }
}
