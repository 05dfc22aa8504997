use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use tickwatch_market_data::Symbol;

use super::prices_model::Tick;
use crate::errors::Result;

/// Storage port for the tick time series.
///
/// Writes are async because they go through the storage writer; reads are
/// plain sync queries.
#[async_trait]
pub trait PriceStore: Send + Sync {
    /// Insert-if-absent on `(symbol, instant)`.
    ///
    /// Returns [`crate::Error::DuplicateEntry`] when a tick already exists for
    /// that exact pair. The existing row is never overwritten.
    async fn append(&self, tick: Tick) -> Result<Tick>;

    /// Most recent tick for the symbol, if any.
    fn latest(&self, symbol: &Symbol) -> Result<Option<Tick>>;

    /// Up to `limit` ticks, most recent first.
    fn recent(&self, symbol: &Symbol, limit: usize) -> Result<Vec<Tick>>;
}

/// Trait for price service operations
#[async_trait]
pub trait PriceServiceTrait: Send + Sync {
    async fn append(&self, symbol: &Symbol, price: Decimal, instant: DateTime<Utc>)
        -> Result<Tick>;
    fn latest(&self, symbol: &Symbol) -> Result<Tick>;
    fn recent(&self, symbol: &Symbol, limit: usize) -> Result<Vec<Tick>>;
}
