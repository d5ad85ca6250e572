//! Post-adjustment (spec §4.6): category boost, then quality
//! multiplier, applied only to the top-30 fused candidates, each
//! followed by a resort — per `_apply_category_boost` and
//! `_apply_quality_scores`.

use assistsupport_config::constants::adjust as consts;
use assistsupport_core::{CandidateResult, Intent};

/// Maps a confidently-classified intent to the category it should
/// boost, matching the original's `policy -> POLICY`,
/// `procedure -> PROCEDURE`, `reference -> REFERENCE` table.
fn intent_category_label(intent: Intent) -> Option<&'static str> {
    match intent {
        Intent::Policy => Some("policy"),
        Intent::Procedure => Some("procedure"),
        Intent::Reference => Some("reference"),
        Intent::Unknown => None,
    }
}

/// Multiplies the fusion score of every top-30 candidate whose
/// category matches the classified intent by
/// `CATEGORY_BOOST_MULTIPLIER`, provided the intent was classified with
/// at least `CATEGORY_BOOST_CONFIDENCE_THRESHOLD` confidence. Resorts
/// afterwards.
pub fn apply_category_boost(
    mut candidates: Vec<CandidateResult>,
    intent: Intent,
    intent_confidence: f32,
) -> Vec<CandidateResult> {
    if intent_confidence < consts::CATEGORY_BOOST_CONFIDENCE_THRESHOLD as f32 {
        return candidates;
    }
    let Some(target_category) = intent_category_label(intent) else {
        return candidates;
    };

    let cap = consts::ADJUSTMENT_CANDIDATE_CAP.min(candidates.len());
    for candidate in &mut candidates[..cap] {
        if candidate.category.as_str() == target_category {
            candidate.fusion_score *= consts::CATEGORY_BOOST_MULTIPLIER as f32;
            candidate.category_boosted = true;
        }
    }

    resort(candidates)
}

/// Multiplies the fusion score of every top-30 candidate by its
/// article's quality score (default `1.0`, already clamped to
/// `[0.5, 1.5]` by the store). Resorts afterwards.
pub fn apply_quality_scores(mut candidates: Vec<CandidateResult>) -> Vec<CandidateResult> {
    let cap = consts::ADJUSTMENT_CANDIDATE_CAP.min(candidates.len());
    for candidate in &mut candidates[..cap] {
        candidate.fusion_score *= candidate.quality_score;
    }
    resort(candidates)
}

fn resort(mut candidates: Vec<CandidateResult>) -> Vec<CandidateResult> {
    candidates.sort_by(|a, b| b.fusion_score.partial_cmp(&a.fusion_score).unwrap());
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use assistsupport_core::Category;
    use uuid::Uuid;

    fn candidate(category: Category, fusion_score: f32, quality_score: f32) -> CandidateResult {
        CandidateResult {
            article_id: Uuid::new_v4(),
            title: String::new(),
            content: String::new(),
            category,
            source_document_id: None,
            heading_path: None,
            bm25_score: 0.0,
            vector_score: 0.0,
            fusion_score,
            rerank_score: None,
            quality_score,
            category_boosted: false,
        }
    }

    #[test]
    fn boosts_matching_category_when_confident() {
        let candidates = vec![
            candidate(Category::Policy, 1.0, 1.0),
            candidate(Category::Reference, 1.0, 1.0),
        ];
        let boosted = apply_category_boost(candidates, Intent::Policy, 0.9);
        assert!(boosted[0].category_boosted);
        assert!((boosted[0].fusion_score - 1.20).abs() < 1e-6);
    }

    #[test]
    fn skips_boost_below_confidence_threshold() {
        let candidates = vec![candidate(Category::Policy, 1.0, 1.0)];
        let boosted = apply_category_boost(candidates, Intent::Policy, 0.1);
        assert!(!boosted[0].category_boosted);
        assert_eq!(boosted[0].fusion_score, 1.0);
    }

    #[test]
    fn skips_boost_for_unknown_intent() {
        let candidates = vec![candidate(Category::Policy, 1.0, 1.0)];
        let boosted = apply_category_boost(candidates, Intent::Unknown, 0.9);
        assert!(!boosted[0].category_boosted);
    }

    #[test]
    fn quality_multiplier_scales_and_resorts() {
        let candidates = vec![
            candidate(Category::Reference, 1.0, 0.5),
            candidate(Category::Reference, 0.9, 1.5),
        ];
        let adjusted = apply_quality_scores(candidates);
        assert!((adjusted[0].fusion_score - 1.35).abs() < 1e-6);
    }

    #[test]
    fn adjustment_cap_ignores_candidates_past_top_thirty() {
        let mut candidates: Vec<CandidateResult> = (0..35)
            .map(|i| candidate(Category::Policy, 1.0 - i as f32 * 0.01, 1.0))
            .collect();
        candidates[34].quality_score = 10.0;
        let adjusted = apply_quality_scores(candidates);
        assert_eq!(adjusted.last().unwrap().fusion_score, 1.0 - 34.0 * 0.01);
    }
}
