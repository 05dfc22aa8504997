//! Finnhub quote source.
//!
//! Uses the `/quote` endpoint only. Finnhub answers unknown symbols with a
//! zeroed payload instead of an HTTP error, so a zero current price is mapped
//! to [`MarketDataError::InvalidSymbol`].
//!
//! API documentation: https://finnhub.io/docs/api/quote

use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::{Client, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::debug;

use crate::errors::MarketDataError;
use crate::models::Quote;
use crate::provider::QuoteSource;

const BASE_URL: &str = "https://finnhub.io/api/v1";
const PROVIDER_ID: &str = "FINNHUB";
const USER_AGENT: &str = "tickwatch/0.1";

/// Per-request timeout for every Finnhub call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

// ============================================================================
// API Response Structures
// ============================================================================

/// Response from /quote endpoint
#[derive(Debug, Deserialize)]
struct QuoteResponse {
    /// Current price
    c: Option<f64>,
    /// Change
    d: Option<f64>,
    /// Percent change
    dp: Option<f64>,
    /// High price of the day
    h: Option<f64>,
    /// Low price of the day
    l: Option<f64>,
    /// Open price of the day
    o: Option<f64>,
    /// Previous close price
    pc: Option<f64>,
    /// Timestamp (Unix)
    t: Option<i64>,
}

/// Error response from Finnhub
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

// ============================================================================
// FinnhubProvider
// ============================================================================

/// Finnhub quote source.
pub struct FinnhubProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FinnhubProvider {
    /// Create a new Finnhub source with the given API key.
    pub fn new(api_key: String) -> Result<Self, MarketDataError> {
        Self::with_base_url(api_key, BASE_URL)
    }

    /// Create a Finnhub source pointing at a different base URL.
    pub fn with_base_url(api_key: String, base_url: &str) -> Result<Self, MarketDataError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| MarketDataError::provider(PROVIDER_ID, e.to_string()))?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Make a GET request to the Finnhub API and return the raw body.
    async fn fetch(
        &self,
        endpoint: &str,
        symbol: &str,
        params: &[(&str, &str)],
    ) -> Result<String, MarketDataError> {
        let url = format!("{}{}", self.base_url, endpoint);

        debug!("Finnhub request: {} with {} params", endpoint, params.len());

        let response = self
            .client
            .get(&url)
            .header("X-Finnhub-Token", &self.api_key)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    MarketDataError::provider(PROVIDER_ID, "Request timed out")
                } else {
                    MarketDataError::provider(PROVIDER_ID, format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, symbol, &body));
        }

        response
            .text()
            .await
            .map_err(|e| MarketDataError::provider(PROVIDER_ID, format!("Failed to read response: {}", e)))
    }
}

/// Map a non-success HTTP status to the provider error taxonomy.
///
/// 401 is a credential problem, 429 is throttling, 403 means the symbol is
/// not accessible to us and is treated as invalid. Everything else is a
/// generic provider error carrying Finnhub's message when it sent one.
fn classify_status(status: StatusCode, symbol: &str, body: &str) -> MarketDataError {
    match status {
        StatusCode::UNAUTHORIZED => MarketDataError::Unauthorized {
            provider: PROVIDER_ID.to_string(),
        },
        StatusCode::TOO_MANY_REQUESTS => MarketDataError::RateLimited {
            provider: PROVIDER_ID.to_string(),
        },
        StatusCode::FORBIDDEN => MarketDataError::InvalidSymbol(symbol.to_string()),
        _ => {
            let message = serde_json::from_str::<ErrorResponse>(body)
                .ok()
                .and_then(|resp| resp.error)
                .unwrap_or_else(|| format!("HTTP {} - {}", status, body));
            MarketDataError::provider(PROVIDER_ID, message)
        }
    }
}

/// Turn a `/quote` body into a [`Quote`].
///
/// An empty payload or a zero/absent current price means Finnhub does not
/// know the symbol.
fn parse_quote(symbol: &str, text: &str) -> Result<Quote, MarketDataError> {
    if text.trim().is_empty() || text.trim() == "{}" {
        return Err(MarketDataError::InvalidSymbol(symbol.to_string()));
    }

    let response: QuoteResponse = serde_json::from_str(text).map_err(|e| {
        MarketDataError::provider(PROVIDER_ID, format!("Failed to parse quote response: {}", e))
    })?;

    let current = match response.c {
        Some(c) if c > 0.0 => c,
        _ => return Err(MarketDataError::InvalidSymbol(symbol.to_string())),
    };

    let current_price = Decimal::try_from(current).map_err(|_| {
        MarketDataError::provider(PROVIDER_ID, format!("Invalid current price: {}", current))
    })?;

    let timestamp = response
        .t
        .and_then(|ts| Utc.timestamp_opt(ts, 0).single())
        .unwrap_or_else(Utc::now);

    Ok(Quote {
        symbol: symbol.to_string(),
        current_price,
        change: response.d.and_then(|v| Decimal::try_from(v).ok()),
        change_percent: response.dp.and_then(|v| Decimal::try_from(v).ok()),
        high: response.h.and_then(|v| Decimal::try_from(v).ok()),
        low: response.l.and_then(|v| Decimal::try_from(v).ok()),
        open: response.o.and_then(|v| Decimal::try_from(v).ok()),
        previous_close: response.pc.and_then(|v| Decimal::try_from(v).ok()),
        timestamp,
        source: PROVIDER_ID.to_string(),
    })
}

// ============================================================================
// QuoteSource Implementation
// ============================================================================

#[async_trait]
impl QuoteSource for FinnhubProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
        let text = self.fetch("/quote", symbol, &[("symbol", symbol)]).await?;
        let quote = parse_quote(symbol, &text)?;

        debug!(
            "Finnhub: fetched price {} for {}",
            quote.current_price, symbol
        );

        Ok(quote)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_provider_id() {
        let provider = FinnhubProvider::new("test_key".to_string()).unwrap();
        assert_eq!(provider.id(), "FINNHUB");
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let provider =
            FinnhubProvider::with_base_url("k".to_string(), "http://localhost:9999/api/").unwrap();
        assert_eq!(provider.base_url, "http://localhost:9999/api");
    }

    #[test]
    fn test_quote_response_parsing() {
        let json = r#"{
            "c": 150.25,
            "d": 1.50,
            "dp": 1.01,
            "h": 152.00,
            "l": 148.50,
            "o": 149.00,
            "pc": 148.75,
            "t": 1704067200
        }"#;

        let quote = parse_quote("AAPL", json).unwrap();
        assert_eq!(quote.symbol, "AAPL");
        assert_eq!(quote.current_price, dec!(150.25));
        assert_eq!(quote.change, Some(dec!(1.5)));
        assert_eq!(quote.previous_close, Some(dec!(148.75)));
        assert_eq!(quote.timestamp.timestamp(), 1704067200);
        assert_eq!(quote.source, "FINNHUB");
    }

    #[test]
    fn test_zero_price_is_invalid_symbol() {
        let json = r#"{"c":0,"d":null,"dp":null,"h":0,"l":0,"o":0,"pc":0,"t":0}"#;
        let err = parse_quote("ZZZZ", json).unwrap_err();
        assert_eq!(err, MarketDataError::InvalidSymbol("ZZZZ".to_string()));
    }

    #[test]
    fn test_empty_payload_is_invalid_symbol() {
        assert!(parse_quote("ZZZZ", "").unwrap_err().is_invalid_symbol());
        assert!(parse_quote("ZZZZ", "{}").unwrap_err().is_invalid_symbol());
    }

    #[test]
    fn test_garbage_payload_is_provider_error() {
        let err = parse_quote("AAPL", "<html>").unwrap_err();
        assert!(matches!(err, MarketDataError::ProviderError { .. }));
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(
            classify_status(StatusCode::UNAUTHORIZED, "AAPL", ""),
            MarketDataError::Unauthorized {
                provider: "FINNHUB".to_string()
            }
        );
        assert_eq!(
            classify_status(StatusCode::TOO_MANY_REQUESTS, "AAPL", ""),
            MarketDataError::RateLimited {
                provider: "FINNHUB".to_string()
            }
        );
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN, "AAPL", ""),
            MarketDataError::InvalidSymbol("AAPL".to_string())
        );
    }

    #[test]
    fn test_classify_status_uses_error_body() {
        let err = classify_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            "AAPL",
            r#"{"error":"upstream down"}"#,
        );
        assert_eq!(err, MarketDataError::provider("FINNHUB", "upstream down"));

        let err = classify_status(StatusCode::BAD_GATEWAY, "AAPL", "oops");
        assert_eq!(
            err,
            MarketDataError::provider("FINNHUB", "HTTP 502 Bad Gateway - oops")
        );
    }
}
