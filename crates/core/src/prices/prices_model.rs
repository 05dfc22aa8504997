//! Price domain models.

use std::fmt;

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use tickwatch_market_data::{Quote, Symbol};

use crate::constants::{DECIMAL_PRECISION, FIXED_POINT_SCALE};
use crate::errors::{Result, ValidationError};

/// Rounds to six fractional digits and pins the scale so the text form always
/// carries exactly six digits.
pub fn to_fixed(value: Decimal) -> Decimal {
    let mut fixed =
        value.round_dp_with_strategy(DECIMAL_PRECISION, RoundingStrategy::MidpointAwayFromZero);
    fixed.rescale(DECIMAL_PRECISION);
    fixed
}

/// A strictly positive price with six fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Price(Decimal);

impl Price {
    pub fn new(value: Decimal) -> std::result::Result<Self, ValidationError> {
        if value <= Decimal::ZERO {
            return Err(ValidationError::NonPositivePrice(value.to_string()));
        }
        let fixed = to_fixed(value);
        if fixed.is_zero() {
            return Err(ValidationError::NonPositivePrice(value.to_string()));
        }
        // The moving average works on price * 10^6 as an integer.
        if fixed.checked_mul(Decimal::from(FIXED_POINT_SCALE)).is_none() {
            return Err(ValidationError::PriceOutOfRange(value.to_string()));
        }
        Ok(Self(fixed))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Decimal> for Price {
    type Error = ValidationError;

    fn try_from(value: Decimal) -> std::result::Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for Decimal {
    fn from(price: Price) -> Self {
        price.0
    }
}

/// One persisted price observation. Identity is `(symbol, instant)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tick {
    pub symbol: Symbol,
    pub price: Price,
    pub instant: DateTime<Utc>,
}

impl Tick {
    /// Builds a tick, truncating the instant to the microsecond precision the
    /// store keeps.
    pub fn new(symbol: Symbol, price: Price, instant: DateTime<Utc>) -> Self {
        Self {
            symbol,
            price,
            instant: instant.trunc_subsecs(6),
        }
    }

    /// Builds a tick from a provider quote observed at `instant`.
    pub fn from_quote(quote: &Quote, instant: DateTime<Utc>) -> Result<Self> {
        let symbol = Symbol::parse(&quote.symbol)?;
        let price = Price::new(quote.current_price)?;
        Ok(Self::new(symbol, price, instant))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_rejects_non_positive() {
        assert!(Price::new(dec!(0)).is_err());
        assert!(Price::new(dec!(-1.5)).is_err());
        // Rounds to zero at six digits
        assert!(Price::new(dec!(0.0000001)).is_err());
    }

    #[test]
    fn test_price_rounds_to_six_digits() {
        let price = Price::new(dec!(123.4567895)).unwrap();
        assert_eq!(price.value(), dec!(123.456790));
        assert_eq!(price.to_string(), "123.456790");

        let price = Price::new(dec!(100)).unwrap();
        assert_eq!(price.to_string(), "100.000000");
    }

    #[test]
    fn test_price_rejects_values_that_overflow_fixed_point() {
        assert!(Price::new(Decimal::MAX).is_err());
    }

    #[test]
    fn test_price_serde_validates() {
        assert!(serde_json::from_str::<Price>("\"-3\"").is_err());
        let price: Price = serde_json::from_str("\"12.5\"").unwrap();
        assert_eq!(price.value(), dec!(12.5));
    }

    #[test]
    fn test_tick_truncates_to_micros() {
        let instant = Utc
            .timestamp_opt(1_704_067_200, 123_456_789)
            .single()
            .unwrap();
        let tick = Tick::new(
            Symbol::parse("AAPL").unwrap(),
            Price::new(dec!(1)).unwrap(),
            instant,
        );
        assert_eq!(tick.instant.timestamp_subsec_nanos(), 123_456_000);
    }

    #[test]
    fn test_tick_from_quote_enforces_symbol_shape() {
        let now = Utc::now();
        let quote = Quote::new("AAPL", dec!(150.25), now, "FINNHUB");
        let tick = Tick::from_quote(&quote, now).unwrap();
        assert_eq!(tick.symbol.as_str(), "AAPL");
        assert_eq!(tick.price.value(), dec!(150.25));

        let quote = Quote::new("BRK.B", dec!(410), now, "FINNHUB");
        assert!(Tick::from_quote(&quote, now).is_err());
    }
}
