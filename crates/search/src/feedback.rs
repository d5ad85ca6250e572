//! Feedback aggregator (spec §4.9), ported from
//! `feedback_loop.py::compute_quality_scores`. Runs on demand or on a
//! schedule (spec §5), never in the request hot path — it reads
//! accumulated feedback rows and writes quality scores back through
//! the store.

use std::collections::HashMap;
use std::sync::Arc;

use assistsupport_config::constants::feedback as consts;
use assistsupport_core::{Article, Rating};
use assistsupport_store::ArticleStore;

#[derive(thiserror::Error, Debug)]
pub enum FeedbackError {
    #[error("store error: {0}")]
    Store(#[from] assistsupport_store::StoreError),
}

pub struct FeedbackAggregator {
    store: Arc<dyn ArticleStore>,
}

/// Per-article aggregate produced by one recompute pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityUpdate {
    pub article_id: uuid::Uuid,
    pub quality_score: f32,
    pub feedback_count: u32,
}

impl FeedbackAggregator {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self { store }
    }

    /// `score_sum = helpful*1.0 + not_helpful*0.0 + incorrect*(-0.5)`,
    /// `helpful_ratio = max(0, score_sum / total)`,
    /// `weight = min(MAX_WEIGHT, total * WEIGHT_PER_FEEDBACK)`,
    /// `quality = clamp(1 + (helpful_ratio - 0.5) * weight, 0.5, 1.5)`.
    /// Articles with fewer than `MIN_FEEDBACK` ratings are skipped
    /// entirely (left at their current score).
    fn compute_quality_score(ratings: &[Rating]) -> Option<f32> {
        let total = ratings.len() as u32;
        if total < consts::MIN_FEEDBACK {
            return None;
        }

        let score_sum: f64 = ratings.iter().map(|r| rating_value(*r)).sum();
        let helpful_ratio = (score_sum / total as f64).max(0.0);
        let weight = (total as f64 * consts::WEIGHT_PER_FEEDBACK).min(consts::MAX_WEIGHT);
        let quality = 1.0 + (helpful_ratio - 0.5) * weight;

        Some(Article::clamp_quality(quality as f32))
    }

    /// Recomputes and persists quality scores for every active article
    /// with at least `MIN_FEEDBACK` feedback rows. Idempotent: running
    /// it twice in a row with no new feedback produces the same
    /// scores.
    pub async fn recompute(&self) -> Result<Vec<QualityUpdate>, FeedbackError> {
        let article_ids = self.store.all_active_article_ids().await?;
        let feedback = self.store.feedback_for_articles(&article_ids).await?;

        let mut ratings_by_article: HashMap<uuid::Uuid, Vec<Rating>> = HashMap::new();
        for entry in feedback {
            if let Some(article_id) = entry.article_id {
                ratings_by_article.entry(article_id).or_default().push(entry.rating);
            }
        }

        let mut updates = Vec::new();
        for (article_id, ratings) in ratings_by_article {
            if let Some(quality_score) = Self::compute_quality_score(&ratings) {
                self.store.update_quality_score(article_id, quality_score).await?;
                updates.push(QualityUpdate {
                    article_id,
                    quality_score,
                    feedback_count: ratings.len() as u32,
                });
            }
        }

        Ok(updates)
    }
}

fn rating_value(rating: Rating) -> f64 {
    match rating {
        Rating::Helpful => consts::HELPFUL_RATING_VALUE,
        Rating::NotHelpful => consts::NOT_HELPFUL_RATING_VALUE,
        Rating::Incorrect => consts::INCORRECT_RATING_VALUE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_minimum_feedback_is_skipped() {
        assert_eq!(
            FeedbackAggregator::compute_quality_score(&[Rating::Helpful, Rating::Helpful]),
            None
        );
    }

    #[test]
    fn all_helpful_raises_quality_above_one() {
        let ratings = vec![Rating::Helpful, Rating::Helpful, Rating::Helpful];
        let score = FeedbackAggregator::compute_quality_score(&ratings).unwrap();
        // total=3, weight=min(0.3, 0.06)=0.06, ratio=1.0, quality=1+(0.5*0.06)=1.03
        assert!((score - 1.03).abs() < 1e-4);
    }

    #[test]
    fn all_incorrect_floors_the_helpful_ratio_at_zero() {
        // helpful_ratio = max(0, score_sum/total) = max(0, -0.5) = 0, so the
        // worst case is bounded by weight's own cap (0.3), not by the
        // [0.5, 1.5] clamp: quality = 1 + (0 - 0.5) * 0.3 = 0.85.
        let ratings: Vec<Rating> = std::iter::repeat(Rating::Incorrect).take(50).collect();
        let score = FeedbackAggregator::compute_quality_score(&ratings).unwrap();
        assert!((score - 0.85).abs() < 1e-4);
    }

    #[test]
    fn mixed_feedback_stays_near_default() {
        let ratings = vec![Rating::Helpful, Rating::NotHelpful, Rating::Helpful];
        let score = FeedbackAggregator::compute_quality_score(&ratings).unwrap();
        assert!(score > 0.5 && score < 1.5);
    }
}
