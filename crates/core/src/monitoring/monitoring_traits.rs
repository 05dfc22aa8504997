use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tickwatch_market_data::Symbol;

use super::monitoring_model::MonitoringConfig;
use crate::errors::Result;

/// Storage port for monitoring configs.
///
/// Symbol uniqueness is enforced by the store, not by callers.
#[async_trait]
pub trait MonitoringStore: Send + Sync {
    fn get(&self, symbol: &Symbol) -> Result<Option<MonitoringConfig>>;

    /// Configs ordered by `(created_at, id)` ascending.
    fn list(&self, active_only: bool) -> Result<Vec<MonitoringConfig>>;

    /// Inserts a new row. A row for the same symbol already existing yields
    /// [`crate::Error::MonitoringConflict`].
    async fn insert(&self, config: MonitoringConfig) -> Result<MonitoringConfig>;

    /// Sets the active flag in place. Missing row yields
    /// [`crate::Error::MonitoringNotFound`].
    async fn set_active(
        &self,
        symbol: &Symbol,
        is_active: bool,
        now: DateTime<Utc>,
    ) -> Result<MonitoringConfig>;

    /// Sets `last_fetch` without touching the active flag. Missing row yields
    /// [`crate::Error::MonitoringNotFound`].
    async fn set_last_fetch(
        &self,
        symbol: &Symbol,
        instant: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<MonitoringConfig>;
}

/// Trait for symbol registry operations
#[async_trait]
pub trait SymbolRegistryTrait: Send + Sync {
    async fn enable(&self, symbol: &str) -> Result<MonitoringConfig>;
    async fn disable(&self, symbol: &str) -> Result<MonitoringConfig>;
    async fn update_fetch_timestamp(
        &self,
        symbol: &Symbol,
        instant: DateTime<Utc>,
    ) -> Result<MonitoringConfig>;
    fn list(&self, active_only: bool) -> Result<Vec<MonitoringConfig>>;
    fn get(&self, symbol: &str) -> Result<Option<MonitoringConfig>>;
}
