use serde::{Deserialize, Serialize};

use crate::fusion::FusionStrategy;
use crate::intent::Intent;

fn default_top_k() -> usize {
    10
}

fn default_true() -> bool {
    true
}

/// An inbound search request, after validation.
///
/// `intent`/`intent_confidence` and `embedding` are filled in by the
/// coordinator as it runs the classifier and embedding client; they
/// are not supplied by the caller directly (see spec §4.10 step 1-2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    pub text: String,
    #[serde(default)]
    pub intent: Option<Intent>,
    #[serde(default)]
    pub intent_confidence: f32,
    #[serde(default, skip_serializing)]
    pub embedding: Option<Vec<f32>>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub fusion_strategy: FusionStrategy,
    #[serde(default = "default_true")]
    pub deduplicate: bool,
    /// Whether the response should include each result's raw
    /// bm25/vector/fused scores.
    #[serde(default)]
    pub include_scores: bool,
}

impl Query {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            intent: None,
            intent_confidence: 0.0,
            embedding: None,
            top_k: default_top_k(),
            fusion_strategy: FusionStrategy::default(),
            deduplicate: true,
            include_scores: false,
        }
    }
}
