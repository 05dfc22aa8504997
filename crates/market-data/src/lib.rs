//! Tickwatch Market Data Crate
//!
//! Everything that talks to the outside world about prices: symbol
//! normalization, the quote source for Finnhub, and the validation cache that
//! keeps known-bad symbols from costing a network call.
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   Domain Layer   |  (scheduler, registry, stock service)
//! +------------------+
//!          |
//!          v
//! +------------------+     +------------------+
//! |   QuoteClient    | --> | ValidationCache  |  (symbol_valid:{SYMBOL}, 60 min)
//! +------------------+     +------------------+
//!          |
//!          v
//! +------------------+
//! |   QuoteSource    |  (Finnhub /quote)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`Quote`] - Latest market quote for one symbol
//! - [`Symbol`] - Validated ticker identity used by storage
//! - [`QuoteProvider`] - What the domain depends on
//! - [`QuoteClient`] - Cached implementation of [`QuoteProvider`]
//! - [`MarketDataError`] - Closed provider error taxonomy

pub mod cache;
pub mod client;
pub mod errors;
pub mod models;
pub mod provider;

pub use cache::{CacheError, MokaValidationCache, ValidationCache, VALIDATION_TTL};
pub use client::{QuoteClient, HEALTH_CHECK_SYMBOL, HEALTH_CHECK_TIMEOUT};
pub use errors::MarketDataError;
pub use models::{normalize_symbol, Quote, Symbol, MAX_SYMBOL_LEN};
pub use provider::finnhub::FinnhubProvider;
pub use provider::{QuoteProvider, QuoteSource};
