//! Market data models
//!
//! - `symbol` - Symbol normalization and the strict [`Symbol`] newtype
//! - `quote` - Current-price [`Quote`] returned by quote sources

mod quote;
mod symbol;

pub use quote::Quote;
pub use symbol::{normalize_symbol, Symbol, MAX_SYMBOL_LEN};
