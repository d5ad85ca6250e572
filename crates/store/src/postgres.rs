//! Postgres + pgvector implementation of [`ArticleStore`].
//!
//! The keyword and vector queries mirror `hybrid_search.py`'s literal
//! SQL (`plainto_tsquery`, `embedding <=> $1::vector`) expressed as
//! `sqlx` query-as calls, in the style of the corpus's
//! `search-engine.rs` hybrid CTE (`ts_rank` + `<=>` cosine distance in
//! one round trip, joined with a `vector_scores`/`keyword_scores` CTE
//! pair) — split here into two single-purpose queries since the
//! retrieval core, not the store, owns fusion.

use async_trait::async_trait;
use pgvector::Vector;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use assistsupport_core::{Article, Category, FeedbackEntry, LatencyPercentiles, QueryLogEntry, QueryStats, Rating};

use crate::{ArticleStore, KeywordHit, Result, StoreError, VectorHit};

pub struct PgArticleStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct ArticleRow {
    id: Uuid,
    title: String,
    content: String,
    category: String,
    source_document_id: Option<String>,
    chunk_index: i32,
    heading_path: Option<String>,
    embedding: Option<Vector>,
    embedding_model: Option<String>,
    is_active: bool,
    quality_score: f32,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Article {
            id: row.id,
            title: row.title,
            content: row.content,
            category: Category::from_str(&row.category),
            source_document_id: row.source_document_id,
            chunk_index: row.chunk_index,
            heading_path: row.heading_path,
            embedding: row.embedding.map(|v| v.to_vec()),
            embedding_model: row.embedding_model,
            is_active: row.is_active,
            quality_score: row.quality_score,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `ArticleRow` plus a query-specific relevance score, so a single
/// `fetch_all` round trip returns both in one `FromRow` impl rather
/// than relying on heterogeneous tuple decoding.
#[derive(FromRow)]
struct ScoredArticleRow {
    #[sqlx(flatten)]
    article: ArticleRow,
    score: f32,
}

impl PgArticleStore {
    pub async fn connect(database_url: &str, pool_size: u32) -> Result<Self> {
        tracing::info!(pool_size, "connecting to article store");
        let pool = PgPoolOptions::new()
            .max_connections(pool_size)
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn rating_label(rating: Rating) -> &'static str {
    match rating {
        Rating::Helpful => "helpful",
        Rating::NotHelpful => "not_helpful",
        Rating::Incorrect => "incorrect",
    }
}

fn parse_rating(label: &str) -> Rating {
    match label {
        "helpful" => Rating::Helpful,
        "incorrect" => Rating::Incorrect,
        _ => Rating::NotHelpful,
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn keyword_search(&self, query: &str, limit: usize) -> Result<Vec<KeywordHit>> {
        let rows = sqlx::query_as::<_, ScoredArticleRow>(
            r#"
            SELECT a.id, a.title, a.content, a.category, a.source_document_id,
                   a.chunk_index, a.heading_path, a.embedding, a.embedding_model,
                   a.is_active, a.quality_score, a.created_at, a.updated_at,
                   ts_rank(a.search_vector, plainto_tsquery('english', $1)) AS score
            FROM articles a
            WHERE a.is_active
              AND a.search_vector @@ plainto_tsquery('english', $1)
            ORDER BY score DESC
            LIMIT $2
            "#,
        )
        .bind(query)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| KeywordHit {
                article: row.article.into(),
                score: row.score,
            })
            .collect())
    }

    async fn vector_search(&self, embedding: &[f32], limit: usize) -> Result<Vec<VectorHit>> {
        let vector = Vector::from(embedding.to_vec());
        let rows = sqlx::query_as::<_, ScoredArticleRow>(
            r#"
            SELECT a.id, a.title, a.content, a.category, a.source_document_id,
                   a.chunk_index, a.heading_path, a.embedding, a.embedding_model,
                   a.is_active, a.quality_score, a.created_at, a.updated_at,
                   1 - (a.embedding <=> $1) AS score
            FROM articles a
            WHERE a.is_active AND a.embedding IS NOT NULL
            ORDER BY a.embedding <=> $1
            LIMIT $2
            "#,
        )
        .bind(vector)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(|row| VectorHit {
                article: row.article.into(),
                score: row.score,
            })
            .collect())
    }

    async fn fetch_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Article>> {
        let rows = sqlx::query_as::<_, ArticleRow>(
            r#"
            SELECT id, title, content, category, source_document_id, chunk_index,
                   heading_path, embedding, embedding_model, is_active, quality_score,
                   created_at, updated_at
            FROM articles
            WHERE id = ANY($1) AND is_active
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(rows.into_iter().map(Article::from).collect())
    }

    async fn set_ef_search(&self, ef_search: u32) -> Result<()> {
        sqlx::query(&format!("SET hnsw.ef_search = {ef_search}"))
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }

    async fn log_query(&self, entry: &QueryLogEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO query_performance
                (id, query_text, intent, intent_confidence, fusion_strategy,
                 bm25_result_count, vector_result_count, result_count,
                 response_time_ms, ef_search_used, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(entry.id)
        .bind(&entry.query_text)
        .bind(entry.intent.as_str())
        .bind(entry.intent_confidence)
        .bind(entry.fusion_strategy.as_str())
        .bind(entry.bm25_result_count as i32)
        .bind(entry.vector_result_count as i32)
        .bind(entry.result_count as i32)
        .bind(entry.response_time_ms as i64)
        .bind(entry.ef_search_used.map(|v| v as i32))
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }

    async fn log_feedback(&self, entry: &FeedbackEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO feedback (id, query_id, result_rank, article_id, rating, comment, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(entry.id)
        .bind(entry.query_id)
        .bind(entry.result_rank as i32)
        .bind(entry.article_id)
        .bind(rating_label(entry.rating))
        .bind(&entry.comment)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }

    async fn update_quality_score(&self, article_id: Uuid, quality_score: f32) -> Result<()> {
        sqlx::query("UPDATE articles SET quality_score = $1, updated_at = now() WHERE id = $2")
            .bind(quality_score)
            .bind(article_id)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(())
    }

    async fn feedback_for_articles(&self, article_ids: &[Uuid]) -> Result<Vec<FeedbackEntry>> {
        let rows = sqlx::query_as::<_, (Uuid, Uuid, i32, Option<Uuid>, String, Option<String>, chrono::DateTime<chrono::Utc>)>(
            r#"
            SELECT id, query_id, result_rank, article_id, rating, comment, created_at
            FROM feedback
            WHERE article_id = ANY($1)
            "#,
        )
        .bind(article_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(rows
            .into_iter()
            .map(
                |(id, query_id, result_rank, article_id, rating, comment, created_at)| FeedbackEntry {
                    id,
                    query_id,
                    result_rank: result_rank as u32,
                    article_id,
                    rating: parse_rating(&rating),
                    comment,
                    created_at,
                },
            )
            .collect())
    }

    async fn all_active_article_ids(&self) -> Result<Vec<Uuid>> {
        let rows: Vec<(Uuid,)> = sqlx::query_as("SELECT id FROM articles WHERE is_active")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn query_stats(&self) -> Result<QueryStats> {
        let (queries_total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM query_performance")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::Query(e.to_string()))?;

        let (queries_24h,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM query_performance WHERE created_at > now() - interval '24 hours'",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        let (avg, p50, p95, p99): (Option<f64>, Option<f64>, Option<f64>, Option<f64>) = sqlx::query_as(
            r#"
            SELECT
                AVG(response_time_ms)::float8,
                PERCENTILE_CONT(0.50) WITHIN GROUP (ORDER BY response_time_ms)::float8,
                PERCENTILE_CONT(0.95) WITHIN GROUP (ORDER BY response_time_ms)::float8,
                PERCENTILE_CONT(0.99) WITHIN GROUP (ORDER BY response_time_ms)::float8
            FROM query_performance
            WHERE created_at > now() - interval '24 hours'
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        let intent_rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT intent, COUNT(*) FROM query_performance
            WHERE created_at > now() - interval '24 hours'
            GROUP BY intent
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        let feedback_rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT rating, COUNT(*) FROM feedback
            WHERE created_at > now() - interval '24 hours'
            GROUP BY rating
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Query(e.to_string()))?;

        Ok(QueryStats {
            queries_total: queries_total as u64,
            queries_24h: queries_24h as u64,
            latency_ms: LatencyPercentiles {
                avg: avg.unwrap_or(0.0),
                p50: p50.unwrap_or(0.0),
                p95: p95.unwrap_or(0.0),
                p99: p99.unwrap_or(0.0),
            },
            intent_distribution: intent_rows.into_iter().map(|(k, v)| (k, v as u64)).collect(),
            feedback_distribution: feedback_rows.into_iter().map(|(k, v)| (k, v as u64)).collect(),
        })
    }
}
