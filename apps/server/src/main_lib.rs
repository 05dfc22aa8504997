use std::sync::Arc;

use crate::config::Config;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};
use tickwatch_core::{
    monitoring::{SymbolRegistry, SymbolRegistryTrait},
    prices::{PriceService, PriceServiceTrait},
    scheduler::FetchScheduler,
    stock::{StockService, StockServiceTrait, StockSnapshot},
    ErrorKind,
};
use tickwatch_market_data::{FinnhubProvider, MokaValidationCache, QuoteClient, QuoteProvider};
use tickwatch_storage_sqlite::{
    db::{self, spawn_writer},
    MonitoringRepository, PriceRepository,
};

pub struct AppState {
    pub provider: Arc<dyn QuoteProvider>,
    pub registry: Arc<dyn SymbolRegistryTrait>,
    /// Programmatic entry point for snapshot/fetch-now/toggle requests.
    pub stock_service: Arc<dyn StockServiceTrait>,
    pub scheduler: Arc<FetchScheduler>,
    pub db_path: String,
}

pub fn init_tracing() {
    let log_format = std::env::var("TW_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    // `init` also installs the `log` bridge, which core and storage log through.
    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = spawn_writer((*pool).clone());

    let price_repository = Arc::new(PriceRepository::new(pool.clone(), writer.clone()));
    let monitoring_repository = Arc::new(MonitoringRepository::new(pool.clone(), writer));

    let source = Arc::new(FinnhubProvider::new(config.finnhub_api_key.clone())?);
    let provider: Arc<dyn QuoteProvider> =
        Arc::new(QuoteClient::new(source, Arc::new(MokaValidationCache::new())));

    let price_service: Arc<dyn PriceServiceTrait> =
        Arc::new(PriceService::new(price_repository));
    let registry: Arc<dyn SymbolRegistryTrait> =
        Arc::new(SymbolRegistry::new(monitoring_repository, provider.clone()));
    let stock_service: Arc<dyn StockServiceTrait> = Arc::new(StockService::new(
        price_service.clone(),
        registry.clone(),
        provider.clone(),
    ));

    let scheduler = Arc::new(FetchScheduler::new(
        registry.clone(),
        provider.clone(),
        price_service,
        config.scheduler.clone(),
    ));

    Ok(Arc::new(AppState {
        provider,
        registry,
        stock_service,
        scheduler,
        db_path,
    }))
}

/// Logs the last stored price of every active symbol.
pub fn log_startup_snapshots(state: &AppState) -> anyhow::Result<()> {
    for config in state.registry.list(true)? {
        match state.stock_service.snapshot(config.symbol.as_str()) {
            Ok(snapshot) => tracing::info!("{}", describe_snapshot(&snapshot)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No stored prices yet for {}", config.symbol)
            }
            Err(e) => tracing::warn!("Could not load snapshot for {}: {}", config.symbol, e),
        }
    }
    Ok(())
}

fn describe_snapshot(snapshot: &StockSnapshot) -> String {
    format!(
        "{}: last price {} at {}, moving average {}",
        snapshot.symbol,
        snapshot.current_price,
        snapshot.last_updated.to_rfc3339(),
        snapshot.moving_average.as_deref().unwrap_or("n/a (not enough data)")
    )
}
