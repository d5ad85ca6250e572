//! Brute-force in-process store used by the retrieval core's test
//! suite, mirroring the teacher's pattern of a deterministic test
//! double (`SimpleEmbedder`, `SimpleScorer`) sitting next to the real
//! model-backed implementation.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

use assistsupport_core::{Article, FeedbackEntry, LatencyPercentiles, QueryLogEntry, QueryStats};

use crate::{ArticleStore, KeywordHit, Result, VectorHit};

/// Linear-interpolation percentile over an already-sorted slice,
/// matching Postgres's `PERCENTILE_CONT`.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let rank = p * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] + (sorted[upper] - sorted[lower]) * (rank - lower as f64)
    }
}

#[derive(Default)]
struct State {
    articles: HashMap<Uuid, Article>,
    queries: Vec<QueryLogEntry>,
    feedback: Vec<FeedbackEntry>,
}

/// An `ArticleStore` backed by plain in-memory collections. Keyword
/// matching is case-insensitive substring counting over title+content
/// (not real BM25); vector search is brute-force cosine similarity.
/// Good enough to exercise fusion, adjustment, and coordinator logic
/// without a live Postgres instance.
pub struct InMemoryArticleStore {
    state: RwLock<State>,
}

impl InMemoryArticleStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
        }
    }

    pub fn insert(&self, article: Article) {
        self.state.write().articles.insert(article.id, article);
    }

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }
        let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
        let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        if na == 0.0 || nb == 0.0 {
            0.0
        } else {
            dot / (na * nb)
        }
    }
}

impl Default for InMemoryArticleStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ArticleStore for InMemoryArticleStore {
    async fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<KeywordHit>> {
        let query_lower = query.to_lowercase();
        let terms: Vec<&str> = query_lower.split_whitespace().collect();
        let state = self.state.read();

        let mut hits: Vec<KeywordHit> = state
            .articles
            .values()
            .filter(|a| a.is_active)
            .filter_map(|a| {
                let haystack = format!("{} {}", a.title, a.content).to_lowercase();
                let score: f32 = terms
                    .iter()
                    .map(|t| haystack.matches(t).count() as f32)
                    .sum();
                if score > 0.0 {
                    Some(KeywordHit {
                        article: a.clone(),
                        score,
                    })
                } else {
                    None
                }
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        hits.truncate(limit);
        Ok(hits)
    }

    async fn vector_search(&self, embedding: &[f32], limit: usize) -> Result<Vec<VectorHit>> {
        let state = self.state.read();
        let mut hits: Vec<VectorHit> = state
            .articles
            .values()
            .filter(|a| a.is_active)
            .filter_map(|a| {
                a.embedding.as_ref().map(|e| VectorHit {
                    article: a.clone(),
                    score: Self::cosine(embedding, e),
                })
            })
            .collect();

        hits.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap());
        hits.truncate(limit);
        Ok(hits)
    }

    async fn fetch_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Article>> {
        let state = self.state.read();
        Ok(ids
            .iter()
            .filter_map(|id| state.articles.get(id))
            .filter(|a| a.is_active)
            .cloned()
            .collect())
    }

    async fn set_ef_search(&self, _ef_search: u32) -> Result<()> {
        Ok(())
    }

    async fn log_query(&self, entry: &QueryLogEntry) -> Result<()> {
        self.state.write().queries.push(entry.clone());
        Ok(())
    }

    async fn log_feedback(&self, entry: &FeedbackEntry) -> Result<()> {
        self.state.write().feedback.push(entry.clone());
        Ok(())
    }

    async fn update_quality_score(&self, article_id: Uuid, quality_score: f32) -> Result<()> {
        if let Some(article) = self.state.write().articles.get_mut(&article_id) {
            article.quality_score = quality_score;
        }
        Ok(())
    }

    async fn feedback_for_articles(&self, article_ids: &[Uuid]) -> Result<Vec<FeedbackEntry>> {
        let state = self.state.read();
        Ok(state
            .feedback
            .iter()
            .filter(|f| matches!(f.article_id, Some(id) if article_ids.contains(&id)))
            .cloned()
            .collect())
    }

    async fn all_active_article_ids(&self) -> Result<Vec<Uuid>> {
        let state = self.state.read();
        Ok(state
            .articles
            .values()
            .filter(|a| a.is_active)
            .map(|a| a.id)
            .collect())
    }

    async fn query_stats(&self) -> Result<QueryStats> {
        let state = self.state.read();
        let cutoff = chrono::Utc::now() - chrono::Duration::hours(24);

        let recent_queries: Vec<&QueryLogEntry> = state.queries.iter().filter(|q| q.created_at > cutoff).collect();

        let mut latencies: Vec<f64> = recent_queries.iter().map(|q| q.response_time_ms as f64).collect();
        latencies.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let latency_ms = if latencies.is_empty() {
            LatencyPercentiles::default()
        } else {
            LatencyPercentiles {
                avg: latencies.iter().sum::<f64>() / latencies.len() as f64,
                p50: percentile(&latencies, 0.50),
                p95: percentile(&latencies, 0.95),
                p99: percentile(&latencies, 0.99),
            }
        };

        let mut intent_distribution = HashMap::new();
        for query in &recent_queries {
            *intent_distribution.entry(query.intent.as_str().to_string()).or_insert(0u64) += 1;
        }

        let mut feedback_distribution = HashMap::new();
        for entry in state.feedback.iter().filter(|f| f.created_at > cutoff) {
            let label = match entry.rating {
                assistsupport_core::Rating::Helpful => "helpful",
                assistsupport_core::Rating::NotHelpful => "not_helpful",
                assistsupport_core::Rating::Incorrect => "incorrect",
            };
            *feedback_distribution.entry(label.to_string()).or_insert(0u64) += 1;
        }

        Ok(QueryStats {
            queries_total: state.queries.len() as u64,
            queries_24h: recent_queries.len() as u64,
            latency_ms,
            intent_distribution,
            feedback_distribution,
        })
    }
}
