use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A current-price quote returned by a quote source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    /// Normalized (uppercase) symbol the quote was requested for
    pub symbol: String,

    /// Current price (required, always positive)
    pub current_price: Decimal,

    /// Absolute change since previous close
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change: Option<Decimal>,

    /// Percent change since previous close
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_percent: Option<Decimal>,

    /// High price of the day
    #[serde(skip_serializing_if = "Option::is_none")]
    pub high: Option<Decimal>,

    /// Low price of the day
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low: Option<Decimal>,

    /// Opening price of the day
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open: Option<Decimal>,

    /// Previous close price
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_close: Option<Decimal>,

    /// Provider-reported quote time
    pub timestamp: DateTime<Utc>,

    /// Source of the quote (FINNHUB, ...)
    pub source: String,
}

impl Quote {
    /// Create a quote carrying only the current price.
    pub fn new(
        symbol: impl Into<String>,
        current_price: Decimal,
        timestamp: DateTime<Utc>,
        source: impl Into<String>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            current_price,
            change: None,
            change_percent: None,
            high: None,
            low: None,
            open: None,
            previous_close: None,
            timestamp,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_quote_new() {
        let quote = Quote::new("AAPL", dec!(150.25), Utc::now(), "FINNHUB");
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.current_price, dec!(150.25));
        assert!(quote.open.is_none());
        assert!(quote.previous_close.is_none());
    }

    #[test]
    fn test_quote_serializes_camel_case_and_skips_empty() {
        let quote = Quote::new("AAPL", dec!(150.25), Utc::now(), "FINNHUB");
        let json = serde_json::to_value(&quote).unwrap();
        assert_eq!(json["currentPrice"], "150.25");
        assert!(json.get("previousClose").is_none());
    }
}
