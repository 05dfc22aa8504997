use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::MarketDataError;

/// Maximum length of a ticker symbol.
pub const MAX_SYMBOL_LEN: usize = 10;

/// Normalizes raw input and checks the loose shape accepted by quote sources.
///
/// Uppercases the input and rejects empty strings, strings longer than
/// [`MAX_SYMBOL_LEN`], and anything outside `[A-Za-z0-9.-]`. This runs before
/// any network call.
pub fn normalize_symbol(raw: &str) -> Result<String, MarketDataError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(MarketDataError::InvalidSymbol(
            "Symbol cannot be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_SYMBOL_LEN {
        return Err(MarketDataError::InvalidSymbol(format!(
            "Symbol too long (max {} characters): {}",
            MAX_SYMBOL_LEN, trimmed
        )));
    }
    if !trimmed
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(MarketDataError::InvalidSymbol(format!(
            "Symbol contains invalid characters: {}",
            trimmed
        )));
    }
    Ok(trimmed.to_ascii_uppercase())
}

/// A stored ticker symbol: 1-10 uppercase ASCII letters.
///
/// This is the identity used by the price store and the monitoring registry.
/// Construction normalizes case, so `"aapl"` and `"AAPL"` are the same symbol.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    /// Parses and normalizes a symbol, enforcing `^[A-Z]{1,10}$`.
    pub fn parse(raw: &str) -> Result<Self, MarketDataError> {
        let upper = raw.trim().to_ascii_uppercase();
        if upper.is_empty()
            || upper.len() > MAX_SYMBOL_LEN
            || !upper.bytes().all(|b| b.is_ascii_uppercase())
        {
            return Err(MarketDataError::InvalidSymbol(format!(
                "Symbol must be 1-{} letters: {}",
                MAX_SYMBOL_LEN,
                raw.trim()
            )));
        }
        Ok(Self(upper))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Symbol {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for Symbol {
    type Err = MarketDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Symbol {
    type Error = MarketDataError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}
