use serde::{Deserialize, Serialize};

/// Which fusion algorithm combines keyword and vector candidate lists.
///
/// Lives in `core`, not `search`, so `server` can deserialize it
/// straight off an inbound request body without depending on the
/// retrieval crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionStrategy {
    /// Reciprocal rank fusion, rank-only, `k` fixed per deployment.
    Rrf,
    /// Fixed bm25/vector weights, normalized scores.
    Weighted,
    /// `Weighted` with per-intent weight table (default).
    #[default]
    Adaptive,
    /// `Adaptive` followed by cross-encoder reranking.
    Rerank,
}

impl FusionStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            FusionStrategy::Rrf => "rrf",
            FusionStrategy::Weighted => "weighted",
            FusionStrategy::Adaptive => "adaptive",
            FusionStrategy::Rerank => "rerank",
        }
    }
}

impl std::fmt::Display for FusionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_strategy_is_adaptive() {
        assert_eq!(FusionStrategy::default(), FusionStrategy::Adaptive);
        assert_eq!(FusionStrategy::Adaptive.as_str(), "adaptive");
    }
}
