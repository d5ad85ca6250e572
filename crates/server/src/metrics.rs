//! Prometheus metrics, installed once at startup the way the teacher's
//! `init_metrics` wires a global recorder, then scraped from `/metrics`
//! via the handle stashed on [`AppState`](crate::state::AppState).

use std::time::Duration;

use axum::extract::State;
use axum::response::IntoResponse;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::state::AppState;

pub fn init_metrics() -> PrometheusHandle {
    PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder")
}

pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    state.metrics_handle.render()
}

pub fn record_search_request(intent: &str, fusion_strategy: &str) {
    metrics::counter!(
        "search_requests_total",
        "intent" => intent.to_string(),
        "fusion_strategy" => fusion_strategy.to_string()
    )
    .increment(1);
}

pub fn record_search_latency(duration: Duration) {
    metrics::histogram!("search_request_duration_seconds").record(duration.as_secs_f64());
}

pub fn record_feedback_submitted(rating: &str) {
    metrics::counter!("feedback_submitted_total", "rating" => rating.to_string()).increment(1);
}

pub fn record_error(kind: &str) {
    metrics::counter!("errors_total", "kind" => kind.to_string()).increment(1);
}
