use std::sync::Arc;

use energy_goals::{
    api::{self, AppState},
    client::MetricsClient,
    config::Config,
    db,
    repositories::SqliteMetaStore,
    services::{KeyedValueStore, MetaResolver},
};
use tokio::signal;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();

    info!("Starting energy-goals");

    let cfg_path = std::env::var("APP_CONFIG").unwrap_or_else(|_| "config/config.yaml".into());
    let cfg = Config::load(&cfg_path)?;
    info!(devices = cfg.devices.len(), "Configuration loaded");

    let pool = db::connect(&cfg.database).await?;
    db::migrate(&pool).await?;
    info!("Goal database ready");

    let store = KeyedValueStore::new(Arc::new(SqliteMetaStore::new(pool)));
    let resolver = MetaResolver::new(store, cfg.goals.clone());
    let client = MetricsClient::new(&cfg.remote)?;

    let state = AppState {
        resolver,
        source: Arc::new(client),
        devices: Arc::new(cfg.devices.clone()),
    };

    let router = api::create_router(state);
    let addr = cfg.api_bind_address();

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to bind to {}: {}", addr, e))?;

    info!("API server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Application shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
