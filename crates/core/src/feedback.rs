use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A caller's judgment of one result's usefulness, matching the
/// `RATING_VALUES` mapping in the original feedback aggregator:
/// helpful scores `1.0`, not-helpful `0.0`, incorrect `-0.5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Helpful,
    NotHelpful,
    Incorrect,
}

impl Rating {
    pub fn score_value(self) -> f32 {
        match self {
            Rating::Helpful => 1.0,
            Rating::NotHelpful => 0.0,
            Rating::Incorrect => -0.5,
        }
    }
}

/// One row of the `feedback` table (§6.3).
///
/// `article_id` is tolerant of dangling references: a row survives the
/// article it refers to being deleted, and the aggregator simply skips
/// rows whose article no longer exists rather than erroring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackEntry {
    pub id: Uuid,
    pub query_id: Uuid,
    pub result_rank: u32,
    pub article_id: Option<Uuid>,
    pub rating: Rating,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FeedbackEntry {
    pub fn new(query_id: Uuid, result_rank: u32, article_id: Option<Uuid>, rating: Rating) -> Self {
        Self {
            id: Uuid::new_v4(),
            query_id,
            result_rank,
            article_id,
            rating,
            comment: None,
            created_at: Utc::now(),
        }
    }
}
