mod error;
mod routes;
mod state;

use anyhow::{Context, Result};
use shared::Config;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Starting tickerboard API server...");

    let config = Config::from_env()?;

    // Ensure export directory exists
    if let Err(e) = std::fs::create_dir_all(&config.export_dir) {
        error!("Failed to create export directory: {}", e);
    }
    info!("Serving exports from: {}", config.export_dir);

    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(config)?;
    spawn_cache_purger(Arc::clone(&state));

    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("API server listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
    }
    info!("Shutdown signal received");
}

/// Drop expired query outcomes once per TTL period.
fn spawn_cache_purger(state: Arc<AppState>) {
    let period = state.cache.ttl().max(std::time::Duration::from_secs(1));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            let removed = state.cache.purge().await;
            if removed > 0 {
                info!("Purged {} expired cache entries", removed);
            }
        }
    });
}
