//! In-memory port implementations shared by the unit tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use tokio::time::Instant;

use tickwatch_market_data::{normalize_symbol, MarketDataError, Quote, QuoteProvider, Symbol};

use crate::errors::{DatabaseError, Error, Result};
use crate::monitoring::{MonitoringConfig, MonitoringStore};
use crate::prices::{PriceStore, Tick};

// =========================================================================
// Price store
// =========================================================================

#[derive(Clone, Default)]
pub struct InMemoryPriceStore {
    ticks: Arc<Mutex<Vec<Tick>>>,
    fail_on_append: Arc<Mutex<HashSet<String>>>,
}

impl InMemoryPriceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a tick without going through `append`.
    pub fn insert(&self, tick: Tick) {
        self.ticks.lock().unwrap().push(tick);
    }

    pub fn fail_appends_for(&self, symbol: &str) {
        self.fail_on_append
            .lock()
            .unwrap()
            .insert(symbol.to_string());
    }

    pub fn all(&self) -> Vec<Tick> {
        self.ticks.lock().unwrap().clone()
    }

    pub fn count_for(&self, symbol: &str) -> usize {
        self.ticks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.symbol.as_str() == symbol)
            .count()
    }
}

#[async_trait]
impl PriceStore for InMemoryPriceStore {
    async fn append(&self, tick: Tick) -> Result<Tick> {
        if self
            .fail_on_append
            .lock()
            .unwrap()
            .contains(tick.symbol.as_str())
        {
            return Err(DatabaseError::QueryFailed("disk I/O error".into()).into());
        }
        let mut ticks = self.ticks.lock().unwrap();
        if ticks
            .iter()
            .any(|t| t.symbol == tick.symbol && t.instant == tick.instant)
        {
            return Err(Error::DuplicateEntry {
                symbol: tick.symbol.to_string(),
                instant: tick.instant,
            });
        }
        ticks.push(tick.clone());
        Ok(tick)
    }

    fn latest(&self, symbol: &Symbol) -> Result<Option<Tick>> {
        let ticks = self.ticks.lock().unwrap();
        Ok(ticks
            .iter()
            .filter(|t| &t.symbol == symbol)
            .max_by_key(|t| t.instant)
            .cloned())
    }

    fn recent(&self, symbol: &Symbol, limit: usize) -> Result<Vec<Tick>> {
        let mut matching: Vec<Tick> = self
            .ticks
            .lock()
            .unwrap()
            .iter()
            .filter(|t| &t.symbol == symbol)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.instant.cmp(&a.instant));
        matching.truncate(limit);
        Ok(matching)
    }
}

// =========================================================================
// Monitoring store
// =========================================================================

#[derive(Clone, Default)]
pub struct InMemoryMonitoringStore {
    configs: Arc<Mutex<Vec<MonitoringConfig>>>,
    fail_on_last_fetch: Arc<Mutex<HashSet<String>>>,
}

impl InMemoryMonitoringStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_last_fetch_for(&self, symbol: &str) {
        self.fail_on_last_fetch
            .lock()
            .unwrap()
            .insert(symbol.to_string());
    }

    pub fn all(&self) -> Vec<MonitoringConfig> {
        self.configs.lock().unwrap().clone()
    }

    /// Seeds an active config created at `created_at`.
    pub fn seed_active(&self, symbol: &str, created_at: DateTime<Utc>) {
        let config = MonitoringConfig::new_active(Symbol::parse(symbol).unwrap(), created_at);
        self.configs.lock().unwrap().push(config);
    }
}

#[async_trait]
impl MonitoringStore for InMemoryMonitoringStore {
    fn get(&self, symbol: &Symbol) -> Result<Option<MonitoringConfig>> {
        Ok(self
            .configs
            .lock()
            .unwrap()
            .iter()
            .find(|c| &c.symbol == symbol)
            .cloned())
    }

    fn list(&self, active_only: bool) -> Result<Vec<MonitoringConfig>> {
        let mut configs: Vec<MonitoringConfig> = self
            .configs
            .lock()
            .unwrap()
            .iter()
            .filter(|c| !active_only || c.is_active)
            .cloned()
            .collect();
        configs.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(configs)
    }

    async fn insert(&self, config: MonitoringConfig) -> Result<MonitoringConfig> {
        // Yield so concurrent enables can interleave between get and insert.
        tokio::task::yield_now().await;
        let mut configs = self.configs.lock().unwrap();
        if configs.iter().any(|c| c.symbol == config.symbol) {
            return Err(Error::MonitoringConflict(config.symbol.to_string()));
        }
        configs.push(config.clone());
        Ok(config)
    }

    async fn set_active(
        &self,
        symbol: &Symbol,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> Result<MonitoringConfig> {
        let mut configs = self.configs.lock().unwrap();
        let config = configs
            .iter_mut()
            .find(|c| &c.symbol == symbol)
            .ok_or_else(|| Error::MonitoringNotFound(symbol.to_string()))?;
        config.is_active = is_active;
        config.updated_at = now.trunc_subsecs(6);
        Ok(config.clone())
    }

    async fn set_last_fetch(
        &self,
        symbol: &Symbol,
        instant: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<MonitoringConfig> {
        if self
            .fail_on_last_fetch
            .lock()
            .unwrap()
            .contains(symbol.as_str())
        {
            return Err(DatabaseError::QueryFailed("database is locked".into()).into());
        }
        let mut configs = self.configs.lock().unwrap();
        let config = configs
            .iter_mut()
            .find(|c| &c.symbol == symbol)
            .ok_or_else(|| Error::MonitoringNotFound(symbol.to_string()))?;
        config.last_fetch = Some(instant.trunc_subsecs(6));
        config.updated_at = now.trunc_subsecs(6);
        Ok(config.clone())
    }
}

// =========================================================================
// Quote provider
// =========================================================================

/// Scripted provider. Unknown symbols answer `InvalidSymbol`.
#[derive(Clone, Default)]
pub struct MockQuoteProvider {
    responses: Arc<Mutex<HashMap<String, std::result::Result<Decimal, MarketDataError>>>>,
    calls: Arc<Mutex<Vec<(String, Instant)>>>,
    delay: Arc<Mutex<Option<Duration>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockQuoteProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_price(self, symbol: &str, price: Decimal) -> Self {
        self.set(symbol, Ok(price));
        self
    }

    pub fn with_error(self, symbol: &str, error: MarketDataError) -> Self {
        self.set(symbol, Err(error));
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn set(&self, symbol: &str, response: std::result::Result<Decimal, MarketDataError>) {
        self.responses
            .lock()
            .unwrap()
            .insert(symbol.to_string(), response);
    }

    pub fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteProvider for MockQuoteProvider {
    async fn get_quote(&self, symbol: &str) -> std::result::Result<Quote, MarketDataError> {
        let symbol = normalize_symbol(symbol)?;
        self.calls
            .lock()
            .unwrap()
            .push((symbol.clone(), Instant::now()));

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let response = self
            .responses
            .lock()
            .unwrap()
            .get(&symbol)
            .cloned()
            .unwrap_or_else(|| Err(MarketDataError::InvalidSymbol(symbol.clone())));

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        response.map(|price| Quote::new(symbol, price, Utc::now(), "MOCK"))
    }

    async fn is_healthy(&self) -> bool {
        self.get_quote("AAPL").await.is_ok()
    }
}
