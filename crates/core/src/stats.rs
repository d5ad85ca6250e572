//! Aggregated operational statistics backing `GET /stats` (spec §6.1),
//! ported from `hybrid_search.py::_get_stats`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Latency distribution in milliseconds over whatever window the
/// caller aggregated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencyPercentiles {
    pub avg: f64,
    pub p50: f64,
    pub p95: f64,
    pub p99: f64,
}

/// A snapshot of query volume, latency, intent mix, and feedback
/// ratings, the last three scoped to the trailing 24 hours.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryStats {
    pub queries_total: u64,
    pub queries_24h: u64,
    pub latency_ms: LatencyPercentiles,
    pub intent_distribution: HashMap<String, u64>,
    pub feedback_distribution: HashMap<String, u64>,
}
