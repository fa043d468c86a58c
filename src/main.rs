//! pool-indexer server entry point.
//!
//! Wires configuration, storage, outbound clients and services, then serves
//! the webhook and read API until SIGINT or SIGTERM.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use pool_indexer::api;
use pool_indexer::app_state::AppState;
use pool_indexer::clients::{TokenClient, YieldClient};
use pool_indexer::config::IndexerConfig;
use pool_indexer::parser::TransactionParser;
use pool_indexer::persistence::{MemoryPoolStore, PoolStore, PostgresPoolStore};
use pool_indexer::service::{IngestionService, QueryService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = IndexerConfig::from_env().context("invalid LISTEN_ADDR")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
    tracing::info!(addr = %config.listen_addr, "starting pool-indexer");

    // Build persistence layer
    let store = if config.persistence_enabled {
        let postgres = PostgresPoolStore::connect(&config)
            .await
            .context("failed to connect to PostgreSQL")?;
        tracing::info!("connected to PostgreSQL");
        PoolStore::Postgres(postgres)
    } else {
        tracing::warn!("persistence disabled, pools are kept in memory only");
        PoolStore::Memory(MemoryPoolStore::new())
    };
    let store = Arc::new(store);

    // Build outbound clients
    let yields = Arc::new(
        YieldClient::new(config.defillama_client()).context("failed to build yield client")?,
    );
    let tokens = Arc::new(
        TokenClient::new(config.jupiter_client()).context("failed to build token client")?,
    );

    // Build service layer
    let ingestion = Arc::new(IngestionService::new(
        TransactionParser::new(),
        Arc::clone(&store),
        yields,
        tokens,
    ));
    let queries = Arc::new(QueryService::new(
        Arc::clone(&store),
        config.pools_list_limit,
        config.apy_list_limit,
    ));

    if config.apy_refresh_interval_secs > 0 {
        spawn_apy_refresh(
            Arc::clone(&ingestion),
            Duration::from_secs(config.apy_refresh_interval_secs),
            config.apy_refresh_batch,
        );
    }

    // Build application state
    let app_state = AppState {
        ingestion,
        queries,
        webhook_auth_token: config.webhook_auth_token.as_deref().map(Arc::from),
        store_backend: store.backend(),
    };

    // Build router
    let app = Router::new()
        .merge(api::build_router(Duration::from_secs(config.query_timeout_secs)))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    tracing::info!("shutdown complete");
    Ok(())
}

/// Periodically fills in APY for pools stored without one.
fn spawn_apy_refresh(ingestion: Arc<IngestionService>, every: Duration, batch: u32) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // first tick completes immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            if let Err(e) = ingestion.refresh_missing_apy(batch).await {
                tracing::warn!(error = %e, "apy refresh pass failed");
            }
        }
    });
    tracing::info!(interval_secs = every.as_secs(), batch, "apy refresh task started");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received, draining connections");
}
