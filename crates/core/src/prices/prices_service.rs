use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{debug, error, info};
use rust_decimal::Decimal;

use tickwatch_market_data::Symbol;

use super::prices_model::{Price, Tick};
use super::prices_traits::{PriceServiceTrait, PriceStore};
use crate::errors::{Error, Result};

/// The price store as the domain sees it: entity validation and logging in
/// front of a [`PriceStore`].
pub struct PriceService {
    store: Arc<dyn PriceStore>,
}

impl PriceService {
    pub fn new(store: Arc<dyn PriceStore>) -> Self {
        PriceService { store }
    }
}

#[async_trait]
impl PriceServiceTrait for PriceService {
    async fn append(
        &self,
        symbol: &Symbol,
        price: Decimal,
        instant: DateTime<Utc>,
    ) -> Result<Tick> {
        let tick = Tick::new(symbol.clone(), Price::new(price)?, instant);

        match self.store.append(tick).await {
            Ok(saved) => {
                info!(
                    "Saved stock price for symbol: {} at {}",
                    saved.symbol,
                    saved.instant.to_rfc3339()
                );
                Ok(saved)
            }
            Err(e @ Error::DuplicateEntry { .. }) => {
                debug!("{}", e);
                Err(e)
            }
            Err(e) => {
                error!("Failed to save stock price for symbol {}: {}", symbol, e);
                Err(e)
            }
        }
    }

    fn latest(&self, symbol: &Symbol) -> Result<Tick> {
        self.store
            .latest(symbol)?
            .ok_or_else(|| Error::PriceNotFound(symbol.to_string()))
    }

    fn recent(&self, symbol: &Symbol, limit: usize) -> Result<Vec<Tick>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        self.store.recent(symbol, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::test_mocks::InMemoryPriceStore;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn aapl() -> Symbol {
        Symbol::parse("AAPL").unwrap()
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 15, 30, 0).unwrap()
    }

    #[tokio::test]
    async fn test_append_twice_keeps_one_tick() {
        let store = Arc::new(InMemoryPriceStore::new());
        let service = PriceService::new(store.clone());

        service.append(&aapl(), dec!(150.25), t0()).await.unwrap();
        let err = service
            .append(&aapl(), dec!(151.00), t0())
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DuplicateEntry);
        let stored = store.all();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].price.value(), dec!(150.25));
    }

    #[tokio::test]
    async fn test_append_rejects_non_positive_price() {
        let store = Arc::new(InMemoryPriceStore::new());
        let service = PriceService::new(store.clone());

        let err = service.append(&aapl(), dec!(0), t0()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert!(store.all().is_empty());
    }

    #[tokio::test]
    async fn test_latest_and_recent() {
        let store = Arc::new(InMemoryPriceStore::new());
        let service = PriceService::new(store);

        let missing = service.latest(&aapl()).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NotFound);

        for i in 0..5 {
            service
                .append(&aapl(), Decimal::from(100 + i), t0() + Duration::minutes(i))
                .await
                .unwrap();
        }

        let latest = service.latest(&aapl()).unwrap();
        assert_eq!(latest.price.value(), dec!(104));

        let recent = service.recent(&aapl(), 3).unwrap();
        let prices: Vec<_> = recent.iter().map(|t| t.price.value()).collect();
        assert_eq!(prices, vec![dec!(104), dec!(103), dec!(102)]);

        assert_eq!(service.recent(&aapl(), 50).unwrap().len(), 5);
        assert!(service.recent(&aapl(), 0).unwrap().is_empty());
    }
}
