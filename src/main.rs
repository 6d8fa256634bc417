//! Request gateway binary.
//!
//! Startup order: read configuration from the environment (refusing to start
//! without a signing secret), initialize logging and metrics, pick the
//! credential store backend, then serve until a shutdown signal arrives.

use std::sync::Arc;

use tokio::net::TcpListener;

use auth_gateway::config;
use auth_gateway::lifecycle::{signals, Shutdown};
use auth_gateway::observability::{logging, metrics};
use auth_gateway::store::{CredentialStore, MemoryStore, PostgresStore};
use auth_gateway::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = match config::load_from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            std::process::exit(1);
        }
    };

    logging::init(&config.observability);

    tracing::info!(
        bind_address = %config.listener.bind_address,
        token_ttl_secs = config.auth.token_ttl_secs,
        rate_limit_window_ms = config.rate_limit.window_ms,
        rate_limit_max_requests = config.rate_limit.max_requests,
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "failed to parse metrics address"
            ),
        }
    }

    let store: Arc<dyn CredentialStore> = match &config.database.url {
        Some(url) => {
            let store = PostgresStore::connect(url, config.database.max_connections).await?;
            store.ensure_schema().await?;
            tracing::info!("using postgres credential store");
            Arc::new(store)
        }
        None => {
            tracing::warn!("no database configured; credentials are held in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_listener(shutdown.clone());

    let server = HttpServer::new(config, store);
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
