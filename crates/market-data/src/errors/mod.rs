//! Error types for the market data crate.
//!
//! [`MarketDataError`] is the closed taxonomy every quote source and the
//! cached client report. Callers pattern-match on it; nothing in this crate
//! wraps it further.

use thiserror::Error;

/// Errors that can occur while validating a symbol or fetching a quote.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketDataError {
    /// The symbol is malformed, unknown to the provider, or was cached as
    /// invalid. Terminal for the symbol; a retry will not help.
    #[error("Invalid stock symbol: {0}")]
    InvalidSymbol(String),

    /// The provider rejected our credential (HTTP 401).
    #[error("Invalid or missing API key for {provider}")]
    Unauthorized {
        /// The provider that rejected the request
        provider: String,
    },

    /// The provider rate limited the request (HTTP 429).
    #[error("Rate limit exceeded for {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// Any other transport or payload failure.
    #[error("Stock data provider error ({provider}): {message}")]
    ProviderError {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider or transport
        message: String,
    },
}

impl MarketDataError {
    /// Shorthand for a [`MarketDataError::ProviderError`].
    pub fn provider(provider: &str, message: impl Into<String>) -> Self {
        Self::ProviderError {
            provider: provider.to_string(),
            message: message.into(),
        }
    }

    /// Returns true if this error says the symbol itself is bad.
    ///
    /// Only these outcomes are remembered by the validation cache.
    pub fn is_invalid_symbol(&self) -> bool {
        matches!(self, Self::InvalidSymbol(_))
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidSymbol(_) => "STOCK_001",
            Self::ProviderError { .. } => "PROVIDER_001",
            Self::Unauthorized { .. } => "PROVIDER_002",
            Self::RateLimited { .. } => "PROVIDER_003",
        }
    }
}
