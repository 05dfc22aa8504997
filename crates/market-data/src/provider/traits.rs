//! Quote provider trait definitions.
//!
//! Two seams live here:
//!
//! - [`QuoteSource`] is the raw transport to one external provider. It does
//!   no caching and classifies its own transport failures.
//! - [`QuoteProvider`] is what the rest of the system consumes: symbol
//!   normalization, validation memoization and health probing on top of a
//!   source. See [`crate::client::QuoteClient`].

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::Quote;

/// Raw access to an external quote source.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use tickwatch_market_data::provider::QuoteSource;
///
/// struct MySource;
///
/// #[async_trait]
/// impl QuoteSource for MySource {
///     fn id(&self) -> &'static str {
///         "MY_SOURCE"
///     }
///
///     async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError> {
///         // ... call the remote API
///     }
/// }
/// ```
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Unique identifier for this source, e.g. "FINNHUB".
    ///
    /// Used in error context and logs.
    fn id(&self) -> &'static str;

    /// Fetch the current quote for an already-normalized symbol.
    ///
    /// A missing payload or a zero current price must be reported as
    /// [`MarketDataError::InvalidSymbol`], not as a transport error.
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote, MarketDataError>;
}

/// The quote operations the domain depends on.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Fetch the current quote for a raw symbol.
    ///
    /// The symbol is normalized and shape-checked before any network call.
    async fn get_quote(&self, symbol: &str) -> Result<Quote, MarketDataError>;

    /// Probe the provider with a known-good symbol.
    ///
    /// Never fails; any error or timeout yields `false`.
    async fn is_healthy(&self) -> bool;
}
