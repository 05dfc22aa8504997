use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use tickwatch_market_data::{QuoteProvider, Symbol};

use crate::constants::SNAPSHOT_MOVING_AVERAGE_PERIODS;
use crate::errors::Result;
use crate::monitoring::{MonitoringConfig, SymbolRegistryTrait};
use crate::prices::{MovingAverageEngine, PriceServiceTrait, Tick};

/// Current view of one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockSnapshot {
    pub symbol: Symbol,
    pub current_price: String,
    pub last_updated: DateTime<Utc>,
    pub moving_average: Option<String>,
    pub monitoring_active: bool,
    pub last_fetch: Option<DateTime<Utc>>,
}

/// Trait for the operations the request-facing surface calls.
#[async_trait]
pub trait StockServiceTrait: Send + Sync {
    fn snapshot(&self, symbol: &str) -> Result<StockSnapshot>;
    async fn fetch_now(&self, symbol: &str) -> Result<Tick>;
    async fn set_monitoring(&self, symbol: &str, active: bool) -> Result<MonitoringConfig>;
}

pub struct StockService {
    prices: Arc<dyn PriceServiceTrait>,
    averages: MovingAverageEngine,
    registry: Arc<dyn SymbolRegistryTrait>,
    provider: Arc<dyn QuoteProvider>,
}

impl StockService {
    pub fn new(
        prices: Arc<dyn PriceServiceTrait>,
        registry: Arc<dyn SymbolRegistryTrait>,
        provider: Arc<dyn QuoteProvider>,
    ) -> Self {
        StockService {
            averages: MovingAverageEngine::new(prices.clone()),
            prices,
            registry,
            provider,
        }
    }
}

#[async_trait]
impl StockServiceTrait for StockService {
    /// Latest tick, 10-period moving average and monitoring state.
    ///
    /// An unmonitored symbol reports `monitoring_active = false` and no last
    /// fetch rather than an error.
    fn snapshot(&self, symbol: &str) -> Result<StockSnapshot> {
        let symbol = Symbol::parse(symbol)?;
        debug!("Retrieving stock data for symbol: {}", symbol);

        let latest = self.prices.latest(&symbol)?;
        let average = self
            .averages
            .compute(&symbol, SNAPSHOT_MOVING_AVERAGE_PERIODS)?;
        let monitoring = self.registry.get(symbol.as_str())?;

        Ok(StockSnapshot {
            current_price: latest.price.to_string(),
            last_updated: latest.instant,
            moving_average: average.average,
            monitoring_active: monitoring.as_ref().is_some_and(|c| c.is_active),
            last_fetch: monitoring.and_then(|c| c.last_fetch),
            symbol,
        })
    }

    async fn fetch_now(&self, symbol: &str) -> Result<Tick> {
        let symbol = Symbol::parse(symbol)?;
        info!("Manual fetch requested for {}", symbol);

        let quote = self.provider.get_quote(symbol.as_str()).await?;
        self.prices
            .append(&symbol, quote.current_price, Utc::now())
            .await
    }

    async fn set_monitoring(&self, symbol: &str, active: bool) -> Result<MonitoringConfig> {
        if active {
            self.registry.enable(symbol).await
        } else {
            self.registry.disable(symbol).await
        }
    }
}
