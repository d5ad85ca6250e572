//! Hybrid search service entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use assistsupport_config::{load_settings, RuntimeEnvironment, Settings};
use assistsupport_search::{KeywordIntentClassifier, KeywordOverlapScorer, SimpleEmbedder};
use assistsupport_server::{create_router, init_metrics, AppState};
use assistsupport_store::postgres::PgArticleStore;
use assistsupport_store::ArticleStore;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let environment: RuntimeEnvironment = std::env::var("ASSISTSUPPORT_ENV")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();

    let config = match load_settings(environment) {
        Ok(settings) => {
            eprintln!("loaded configuration (environment: {environment})");
            settings
        },
        Err(e) => {
            eprintln!("warning: failed to load config: {e}. using defaults.");
            Settings::default()
        },
    };

    init_tracing(&config);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "starting assistsupport-server");
    tracing::info!(environment = %config.environment, "configuration loaded");

    let metrics_handle = init_metrics();
    tracing::info!("initialized Prometheus metrics at /metrics");

    let database_url = format!(
        "postgres://{}:{}@{}:{}/{}",
        config.store.db_user, config.store.db_password, config.store.db_host, config.store.db_port, config.store.db_name
    );
    let store: Arc<dyn ArticleStore> = Arc::new(PgArticleStore::connect(&database_url, config.store.pool_size).await?);
    store.set_ef_search(config.search.ef_search).await?;

    let embedder = Arc::new(SimpleEmbedder::new(config.search.embedding_dim));
    let intent_classifier = Arc::new(KeywordIntentClassifier::new());

    let port = config.server.port;
    let host = config.server.host.clone();
    let state = AppState::new(config, store, embedder, intent_classifier, KeywordOverlapScorer, metrics_handle);

    let app = create_router(state);

    let addr: SocketAddr = format!("{host}:{port}").parse()?;
    tracing::info!(%addr, "listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}

fn init_tracing(config: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "assistsupport_server=info,assistsupport_search=info,tower_http=info".into());

    let json_output = config.environment.is_production();
    let fmt_layer = if json_output {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer().boxed()
    };

    tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
}
