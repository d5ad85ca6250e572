use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::fusion::FusionStrategy;
use crate::intent::Intent;

/// One row of the `query_performance` table (§6.3). Written once per
/// request by the coordinator's fire-and-forget `log_query` call;
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryLogEntry {
    pub id: Uuid,
    pub query_text: String,
    pub intent: Intent,
    pub intent_confidence: f32,
    pub fusion_strategy: FusionStrategy,
    pub bm25_result_count: usize,
    pub vector_result_count: usize,
    pub result_count: usize,
    pub response_time_ms: u64,
    pub embedding_time_ms: u64,
    pub search_time_ms: u64,
    pub fusion_time_ms: u64,
    pub rerank_time_ms: u64,
    pub ef_search_used: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl QueryLogEntry {
    pub fn new(query_text: impl Into<String>, fusion_strategy: FusionStrategy) -> Self {
        Self {
            id: Uuid::new_v4(),
            query_text: query_text.into(),
            intent: Intent::Unknown,
            intent_confidence: 0.0,
            fusion_strategy,
            bm25_result_count: 0,
            vector_result_count: 0,
            result_count: 0,
            response_time_ms: 0,
            embedding_time_ms: 0,
            search_time_ms: 0,
            fusion_time_ms: 0,
            rerank_time_ms: 0,
            ef_search_used: None,
            created_at: Utc::now(),
        }
    }
}
