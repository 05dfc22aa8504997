//! Quote source abstractions and implementations.
//!
//! This module contains:
//! - The [`QuoteSource`] trait implemented by each external provider
//! - The [`QuoteProvider`] trait consumed by the domain
//! - Concrete sources (Finnhub)

mod traits;

pub mod finnhub;

pub use traits::{QuoteProvider, QuoteSource};
