//! The five HTTP endpoints (spec §5): `POST /search`, `POST /feedback`,
//! `GET /stats`, `GET /health`, `GET /config`, plus `/metrics` for
//! Prometheus scraping. Router construction follows the teacher's
//! pattern: CORS built from configured origins, tracing and
//! compression layers, auth and rate-limit middleware in front of
//! every route.

use axum::extract::State;
use axum::http::{HeaderValue, Method, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use assistsupport_core::{CandidateResult, FeedbackEntry, Query, Rating};

use crate::auth::auth_middleware;
use crate::metrics::metrics_handler;
use crate::rate_limit::rate_limit_middleware;
use crate::state::AppState;
use crate::ServerError;

pub fn create_router(state: AppState) -> Router {
    let cors_layer = {
        let config = state.get_config();
        build_cors_layer(&config.server.cors_origins, config.server.cors_enabled)
    };

    Router::new()
        .route("/search", post(search))
        .route("/feedback", post(submit_feedback))
        .route("/stats", get(stats))
        .route("/health", get(health_check))
        .route("/config", get(config_handler))
        .route("/metrics", get(metrics_handler))
        .layer(axum::middleware::from_fn_with_state(state.clone(), auth_middleware))
        .layer(axum::middleware::from_fn_with_state(state.clone(), rate_limit_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new())
        .layer(cors_layer)
        .with_state(state)
}

/// Builds the CORS layer from configured origins. Disabled or
/// unconfigured origins fall back to permissive/localhost defaults,
/// logged loudly since both are inappropriate for production.
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled, allowing all origins (not for production)");
        return CorsLayer::permissive();
    }

    if origins.is_empty() {
        tracing::info!("no CORS origins configured, defaulting to localhost:3000");
        return localhost_cors();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!(origin, "invalid CORS origin");
                None
            })
        })
        .collect();

    if parsed.is_empty() {
        tracing::error!("all configured CORS origins are invalid, falling back to localhost");
        return localhost_cors();
    }

    tracing::info!(count = parsed.len(), "CORS configured");
    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_credentials(true)
}

fn localhost_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
}

/// First 200 characters of `content`, with a trailing `...` if more
/// were cut off, matching `_fetch_and_format_results`'s preview field.
fn content_preview(content: &str) -> String {
    let mut chars = content.chars();
    let head: String = chars.by_ref().take(200).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

fn round3(value: f32) -> f64 {
    ((value as f64) * 1000.0).round() / 1000.0
}

/// Shapes one ranked result for the wire: never the raw
/// `CandidateResult` (that would leak `content`, `quality_score`,
/// `category_boosted`), only the §6.1 result contract plus an optional
/// `scores` block.
fn result_json(rank: usize, candidate: &CandidateResult, include_scores: bool) -> serde_json::Value {
    let mut value = serde_json::json!({
        "rank": rank,
        "article_id": candidate.article_id,
        "title": candidate.title,
        "category": candidate.category,
        "preview": content_preview(&candidate.content),
        "source_document": candidate.source_document_id,
        "section": candidate.heading_path,
    });

    if include_scores {
        value["scores"] = serde_json::json!({
            "bm25": round3(candidate.bm25_score),
            "vector": round3(candidate.vector_score),
            "fused": round3(candidate.display_score()),
        });
    }

    value
}

/// `POST /search` — runs the full retrieval pipeline and returns
/// ranked results plus the telemetry the coordinator logged.
async fn search(
    State(state): State<AppState>,
    Json(query): Json<Query>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let started = std::time::Instant::now();
    let include_scores = query.include_scores;
    let outcome = state.coordinator.search(query).await?;

    crate::metrics::record_search_request(
        outcome.log_entry.intent.as_str(),
        outcome.log_entry.fusion_strategy.as_str(),
    );
    crate::metrics::record_search_latency(started.elapsed());

    let results: Vec<serde_json::Value> = outcome
        .results
        .iter()
        .enumerate()
        .map(|(i, candidate)| result_json(i + 1, candidate, include_scores))
        .collect();

    Ok(Json(serde_json::json!({
        "status": "success",
        "query": outcome.log_entry.query_text,
        "query_id": outcome.log_entry.id,
        "intent": outcome.log_entry.intent,
        "intent_confidence": (outcome.log_entry.intent_confidence * 100.0).round() / 100.0,
        "results_count": results.len(),
        "results": results,
        "metrics": {
            "latency_ms": outcome.log_entry.response_time_ms,
            "embedding_time_ms": outcome.log_entry.embedding_time_ms,
            "search_time_ms": outcome.log_entry.search_time_ms,
            "rerank_time_ms": outcome.log_entry.rerank_time_ms,
            "result_count": results.len(),
            "timestamp": Utc::now().to_rfc3339(),
        },
    })))
}

#[derive(Debug, Deserialize)]
struct FeedbackRequest {
    query_id: Uuid,
    result_rank: u32,
    article_id: Option<Uuid>,
    rating: Rating,
    comment: Option<String>,
}

/// `POST /feedback` — records one caller judgment of a result. Quality
/// scores are recomputed separately, not on this request path.
async fn submit_feedback(
    State(state): State<AppState>,
    Json(request): Json<FeedbackRequest>,
) -> Result<StatusCode, ServerError> {
    let mut entry = FeedbackEntry::new(request.query_id, request.result_rank, request.article_id, request.rating);
    entry.comment = request.comment;

    state.store.log_feedback(&entry).await?;

    crate::metrics::record_feedback_submitted(match request.rating {
        Rating::Helpful => "helpful",
        Rating::NotHelpful => "not_helpful",
        Rating::Incorrect => "incorrect",
    });

    Ok(StatusCode::ACCEPTED)
}

/// `GET /stats` — query volume, latency percentiles, intent mix, and
/// feedback ratings over the last 24 hours, plus the active article
/// count. Feedback-driven quality recomputation itself runs out of
/// band (spec §4.9), not on this request path.
async fn stats(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ServerError> {
    let article_ids = state.store.all_active_article_ids().await?;
    let stats = state.store.query_stats().await?;

    Ok(Json(serde_json::json!({
        "status": "success",
        "data": {
            "active_articles": article_ids.len(),
            "queries_total": stats.queries_total,
            "queries_24h": stats.queries_24h,
            "latency_ms": stats.latency_ms,
            "intent_distribution": stats.intent_distribution,
            "feedback_distribution": stats.feedback_distribution,
        },
        "timestamp": Utc::now().to_rfc3339(),
    })))
}

/// `GET /health` — degrades to `503` if the store can't be reached.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let store_ok = state.store.all_active_article_ids().await.is_ok();
    let status = if store_ok { "healthy" } else { "degraded" };
    let code = if store_ok { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    (
        code,
        Json(serde_json::json!({
            "status": status,
            "version": env!("CARGO_PKG_VERSION"),
        })),
    )
}

/// `GET /config` — a safe, read-only subset of current settings
/// (never the API key or database credentials).
async fn config_handler(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.get_config();
    Json(serde_json::json!({
        "environment": config.environment,
        "search": {
            "vector_search_enabled": config.search.vector_search_enabled,
            "reranking_enabled": config.search.reranking_enabled,
            "ef_search": config.search.ef_search,
            "embedding_dim": config.search.embedding_dim,
        },
        "rate_limit": {
            "enabled": config.server.rate_limit.enabled,
            "requests_per_minute": config.server.rate_limit.requests_per_minute,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::tests::test_state;
    use assistsupport_config::RuntimeEnvironment;
    use axum::body::Body;
    use axum::extract::ConnectInfo;
    use axum::http::Request;
    use std::net::SocketAddr;
    use tower::ServiceExt;

    fn with_connect_info(req: axum::http::request::Builder, body: Body) -> Request<Body> {
        let mut req = req.body(body).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 0))));
        req
    }

    #[tokio::test]
    async fn health_reports_healthy_against_an_empty_store() {
        let state = test_state(RuntimeEnvironment::Development, "secret");
        let router = create_router(state);

        let req = with_connect_info(Request::builder().method("GET").uri("/health"), Body::empty());
        let response = router.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn search_rejects_empty_query_text_with_a_400() {
        let state = test_state(RuntimeEnvironment::Development, "secret");
        let router = create_router(state);

        let body = Body::from(serde_json::json!({ "text": "   " }).to_string());
        let req = with_connect_info(
            Request::builder()
                .method("POST")
                .uri("/search")
                .header("content-type", "application/json"),
            body,
        );
        let response = router.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn config_endpoint_never_leaks_the_api_key() {
        let state = test_state(RuntimeEnvironment::Development, "super-secret-value");
        let router = create_router(state);

        let req = with_connect_info(Request::builder().method("GET").uri("/config"), Body::empty());
        let response = router.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(!String::from_utf8_lossy(&bytes).contains("super-secret-value"));
    }
}
