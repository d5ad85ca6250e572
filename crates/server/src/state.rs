//! Application state shared across every handler: hot-reloadable
//! config, the wired-up query coordinator, the raw store (for the
//! `/stats` and feedback-recompute paths), the feedback aggregator, the
//! rate limiter, and the Prometheus handle.

use std::sync::Arc;

use parking_lot::RwLock;

use assistsupport_config::{load_settings, RuntimeEnvironment, Settings};
use assistsupport_search::{FeedbackAggregator, KeywordIntentClassifier, KeywordOverlapScorer, QueryCoordinator, SimpleEmbedder};
use assistsupport_store::ArticleStore;

use crate::rate_limit::RateLimiter;

/// The coordinator is generic over its embedding client, intent
/// classifier, and cross-encoder; the server wires it up with the
/// crate's deterministic built-ins. A deployment that wants a real ML
/// backend for any of the three swaps this alias, not the call sites.
pub type Coordinator = QueryCoordinator<SimpleEmbedder, KeywordIntentClassifier, KeywordOverlapScorer>;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RwLock<Settings>>,
    pub store: Arc<dyn ArticleStore>,
    pub coordinator: Arc<Coordinator>,
    pub feedback: Arc<FeedbackAggregator>,
    pub rate_limiter: Arc<RateLimiter>,
    pub metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    env: RuntimeEnvironment,
}

impl AppState {
    pub fn new(
        config: Settings,
        store: Arc<dyn ArticleStore>,
        embedder: Arc<SimpleEmbedder>,
        intent_classifier: Arc<KeywordIntentClassifier>,
        cross_encoder: KeywordOverlapScorer,
        metrics_handle: metrics_exporter_prometheus::PrometheusHandle,
    ) -> Self {
        let env = config.environment;
        let rate_limiter = Arc::new(RateLimiter::new(&config.server.rate_limit));
        let ef_search = config.search.ef_search;
        let coordinator = Arc::new(QueryCoordinator::new(
            store.clone(),
            embedder,
            intent_classifier,
            cross_encoder,
            ef_search,
        ));
        let feedback = Arc::new(FeedbackAggregator::new(store.clone()));

        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            coordinator,
            feedback,
            rate_limiter,
            metrics_handle,
            env,
        }
    }

    pub fn get_config(&self) -> parking_lot::RwLockReadGuard<'_, Settings> {
        self.config.read()
    }

    /// Reloads configuration from files/environment for the same
    /// environment this state was built with. The rate limiter and
    /// coordinator are not rebuilt: only settings values read on every
    /// request (auth key, CORS origins, rate-limit knobs) change.
    pub fn reload_config(&self) -> Result<(), String> {
        let new_config = load_settings(self.env).map_err(|e| e.to_string())?;
        let mut config = self.config.write();
        *config = new_config;
        tracing::info!("configuration reloaded");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use assistsupport_store::memory::InMemoryArticleStore;

    pub(crate) fn test_state(environment: RuntimeEnvironment, api_key: &str) -> AppState {
        let mut config = Settings::default();
        config.environment = environment;
        config.server.auth.api_key = api_key.to_string();
        config.server.rate_limit.enabled = false;

        let store = Arc::new(InMemoryArticleStore::new());
        AppState::new(
            config,
            store,
            Arc::new(SimpleEmbedder::new(3)),
            Arc::new(KeywordIntentClassifier::new()),
            KeywordOverlapScorer,
            crate::metrics::init_metrics(),
        )
    }

    #[test]
    fn new_state_starts_in_the_given_environment() {
        let state = test_state(RuntimeEnvironment::Production, "secret");
        assert!(state.get_config().environment.is_production());
    }
}
