use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::intent::Category;

/// A single retrievable knowledge-base chunk.
///
/// Per spec §3: `(source_document_id, chunk_index)` is unique when
/// `source_document_id` is present, but articles with a `None`
/// `source_document_id` carry no such uniqueness constraint and are
/// never deduplicated against each other. `quality_score` defaults to
/// `1.0` and is always clamped to `[0.5, 1.5]`; `embedding`, when
/// present, is a unit vector (L2 norm 1, within floating-point
/// tolerance). Inactive articles (`is_active == false`) are never
/// returned by any retriever.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub source_document_id: Option<String>,
    pub chunk_index: i32,
    pub heading_path: Option<String>,
    pub embedding: Option<Vec<f32>>,
    pub embedding_model: Option<String>,
    pub is_active: bool,
    pub quality_score: f32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Default quality score for an article with no feedback yet.
pub const DEFAULT_QUALITY_SCORE: f32 = 1.0;
pub const MIN_QUALITY_SCORE: f32 = 0.5;
pub const MAX_QUALITY_SCORE: f32 = 1.5;

impl Article {
    pub fn clamp_quality(score: f32) -> f32 {
        score.clamp(MIN_QUALITY_SCORE, MAX_QUALITY_SCORE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_bounds() {
        assert_eq!(Article::clamp_quality(9.0), MAX_QUALITY_SCORE);
        assert_eq!(Article::clamp_quality(-9.0), MIN_QUALITY_SCORE);
        assert_eq!(Article::clamp_quality(1.1), 1.1);
    }
}
