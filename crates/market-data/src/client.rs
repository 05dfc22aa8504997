//! Cached quote client.
//!
//! [`QuoteClient`] is the adapter the domain talks to. It normalizes the
//! symbol, consults the validation cache, calls the [`QuoteSource`], and
//! records validity verdicts. The cache is advisory: if it errors, the client
//! logs a warning and fetches directly.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::cache::ValidationCache;
use crate::errors::MarketDataError;
use crate::models::{normalize_symbol, Quote};
use crate::provider::{QuoteProvider, QuoteSource};

/// Symbol used by the health probe.
pub const HEALTH_CHECK_SYMBOL: &str = "AAPL";

/// Upper bound for a health probe, independent of the request timeout.
pub const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Quote adapter with validation memoization.
pub struct QuoteClient {
    source: Arc<dyn QuoteSource>,
    cache: Arc<dyn ValidationCache>,
    health_symbol: String,
    health_timeout: Duration,
}

impl QuoteClient {
    pub fn new(source: Arc<dyn QuoteSource>, cache: Arc<dyn ValidationCache>) -> Self {
        Self {
            source,
            cache,
            health_symbol: HEALTH_CHECK_SYMBOL.to_string(),
            health_timeout: HEALTH_CHECK_TIMEOUT,
        }
    }

    /// Override the health probe symbol and timeout.
    pub fn with_health_check(mut self, symbol: impl Into<String>, timeout: Duration) -> Self {
        self.health_symbol = symbol.into();
        self.health_timeout = timeout;
        self
    }

    /// Fetch on a cache miss and remember the verdict.
    async fn fetch_and_remember(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        match self.source.fetch_quote(symbol).await {
            Ok(quote) => {
                self.remember(symbol, true).await;
                debug!("Symbol {} is valid - cached validation result", symbol);
                Ok(quote)
            }
            Err(e) if e.is_invalid_symbol() => {
                self.remember(symbol, false).await;
                debug!("Symbol {} is invalid - cached result", symbol);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    async fn remember(&self, symbol: &str, valid: bool) {
        if let Err(e) = self.cache.set(symbol, valid).await {
            warn!(
                "Failed to store symbol validation result for {}: {}",
                symbol, e
            );
        }
    }
}

#[async_trait]
impl QuoteProvider for QuoteClient {
    async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let symbol = normalize_symbol(symbol)?;

        match self.cache.get(&symbol).await {
            Ok(Some(false)) => {
                debug!("Symbol validation cache hit for {} - known invalid", symbol);
                Err(MarketDataError::InvalidSymbol(symbol))
            }
            Ok(Some(true)) => {
                debug!(
                    "Symbol validation cache hit for {} - fetching quote data",
                    symbol
                );
                self.source.fetch_quote(&symbol).await
            }
            Ok(None) => {
                debug!(
                    "Symbol validation cache miss for {} - validating with quote fetch",
                    symbol
                );
                self.fetch_and_remember(&symbol).await
            }
            Err(e) => {
                warn!(
                    "Failed to check symbol validation cache for {}: {}",
                    symbol, e
                );
                self.source.fetch_quote(&symbol).await
            }
        }
    }

    async fn is_healthy(&self) -> bool {
        match tokio::time::timeout(self.health_timeout, self.get_quote(&self.health_symbol)).await
        {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                warn!("{} health check failed: {}", self.source.id(), e);
                false
            }
            Err(_) => {
                warn!(
                    "{} health check timed out after {:?}",
                    self.source.id(),
                    self.health_timeout
                );
                false
            }
        }
    }
}
