//! Database models for the tick time series.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;
use rust_decimal::Decimal;
use std::str::FromStr;

use tickwatch_core::prices::{Price, Tick};
use tickwatch_market_data::Symbol;

use crate::errors::StorageError;

/// Fixed-width RFC 3339 so that text order is time order.
pub fn format_instant(instant: &DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_instant(text: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::CorruptRow(format!("bad timestamp '{}': {}", text, e)))
}

/// Database model for stock prices
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::stock_prices)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StockPriceDB {
    pub symbol: String,
    pub price: String,
    pub timestamp: String,
    pub created_at: String,
    pub updated_at: String,
}

impl StockPriceDB {
    pub fn from_tick(tick: &Tick, now: DateTime<Utc>) -> Self {
        let now = format_instant(&now);
        Self {
            symbol: tick.symbol.to_string(),
            price: tick.price.to_string(),
            timestamp: format_instant(&tick.instant),
            created_at: now.clone(),
            updated_at: now,
        }
    }
}

impl TryFrom<StockPriceDB> for Tick {
    type Error = StorageError;

    fn try_from(row: StockPriceDB) -> Result<Self, Self::Error> {
        let symbol = Symbol::parse(&row.symbol)
            .map_err(|e| StorageError::CorruptRow(e.to_string()))?;
        let price = Decimal::from_str(&row.price)
            .map_err(|e| StorageError::CorruptRow(format!("bad price '{}': {}", row.price, e)))
            .and_then(|d| Price::new(d).map_err(|e| StorageError::CorruptRow(e.to_string())))?;
        let instant = parse_instant(&row.timestamp)?;
        Ok(Tick::new(symbol, price, instant))
    }
}
