mod config;
mod main_lib;

use config::Config;
use main_lib::{build_state, init_tracing, log_startup_snapshots};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();
    init_tracing();
    let config = Config::from_env()?;
    tracing::debug!("Loaded configuration: {:?}", config);

    let state = build_state(&config).await?;

    if state.provider.is_healthy().await {
        tracing::info!("Quote provider is reachable");
    } else {
        tracing::warn!("Quote provider health check failed; continuing anyway");
    }

    let active = state.registry.list(true)?;
    tracing::info!(
        "Monitoring {} active symbol(s), schedule {:?}, batch size {}, rate limit delay {:?}",
        active.len(),
        state.scheduler.config().schedule,
        state.scheduler.config().max_concurrent_requests,
        state.scheduler.config().rate_limit_delay,
    );

    log_startup_snapshots(&state)?;

    state.scheduler.start();
    tracing::info!("Fetch scheduler started");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    state.scheduler.stop();
    tracing::info!("Fetch scheduler stopped; database at {}", state.db_path);
    Ok(())
}
