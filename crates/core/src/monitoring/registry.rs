use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use tickwatch_market_data::{QuoteProvider, Symbol};

use super::monitoring_model::MonitoringConfig;
use super::monitoring_traits::{MonitoringStore, SymbolRegistryTrait};
use crate::errors::{Error, Result};

/// Per-symbol monitoring state machine: absent, active, inactive.
///
/// The registry is the only writer of monitoring configs. It holds no locks;
/// concurrent enables are settled by the store's unique symbol constraint.
pub struct SymbolRegistry {
    store: Arc<dyn MonitoringStore>,
    provider: Arc<dyn QuoteProvider>,
}

impl SymbolRegistry {
    pub fn new(store: Arc<dyn MonitoringStore>, provider: Arc<dyn QuoteProvider>) -> Self {
        SymbolRegistry { store, provider }
    }
}

#[async_trait]
impl SymbolRegistryTrait for SymbolRegistry {
    /// Confirms the symbol is fetchable, then moves it to `active`.
    ///
    /// A failed validation leaves the registry untouched.
    async fn enable(&self, symbol: &str) -> Result<MonitoringConfig> {
        let symbol = Symbol::parse(symbol)?;
        info!("Enabling monitoring for symbol: {}", symbol);

        if let Err(e) = self.provider.get_quote(symbol.as_str()).await {
            warn!("Cannot enable monitoring for {}: {}", symbol, e);
            return Err(e.into());
        }

        let now = Utc::now();
        let config = match self.store.get(&symbol)? {
            Some(_) => self.store.set_active(&symbol, true, now).await?,
            None => {
                let created = self
                    .store
                    .insert(MonitoringConfig::new_active(symbol.clone(), now))
                    .await?;
                debug!(
                    "Created new monitoring configuration for {} ({})",
                    symbol, created.id
                );
                created
            }
        };

        info!("Successfully enabled monitoring for {}", symbol);
        Ok(config)
    }

    async fn disable(&self, symbol: &str) -> Result<MonitoringConfig> {
        let symbol = Symbol::parse(symbol)?;

        let existing = self
            .store
            .get(&symbol)?
            .ok_or_else(|| Error::MonitoringNotFound(symbol.to_string()))?;

        if !existing.is_active {
            debug!("Monitoring for {} is already inactive", symbol);
            return Ok(existing);
        }

        let updated = self.store.set_active(&symbol, false, Utc::now()).await?;
        info!("Deactivated monitoring for {}", symbol);
        Ok(updated)
    }

    async fn update_fetch_timestamp(
        &self,
        symbol: &Symbol,
        instant: DateTime<Utc>,
    ) -> Result<MonitoringConfig> {
        self.store.set_last_fetch(symbol, instant, Utc::now()).await
    }

    fn list(&self, active_only: bool) -> Result<Vec<MonitoringConfig>> {
        debug!("Retrieving monitoring configurations (active_only={})", active_only);
        self.store.list(active_only)
    }

    fn get(&self, symbol: &str) -> Result<Option<MonitoringConfig>> {
        let symbol = Symbol::parse(symbol)?;
        self.store.get(&symbol)
    }
}
