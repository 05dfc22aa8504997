//! Core error types for tickwatch.
//!
//! This module defines database-agnostic error types. Storage-specific errors
//! (from Diesel, SQLite, etc.) are converted to these types by the storage layer.

use chrono::{DateTime, Utc};
use thiserror::Error;

use tickwatch_market_data::MarketDataError;

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the domain.
///
/// Closed on purpose: the request layer that sits in front of the core
/// matches on [`Error::kind`] or [`Error::code`] instead of string messages.
#[derive(Error, Debug)]
pub enum Error {
    /// Provider-layer failures propagate unchanged.
    #[error(transparent)]
    MarketData(#[from] MarketDataError),

    #[error("Duplicate price entry for symbol {symbol} at {}", instant.to_rfc3339())]
    DuplicateEntry {
        symbol: String,
        instant: DateTime<Utc>,
    },

    #[error("Monitoring configuration not found for symbol: {0}")]
    MonitoringNotFound(String),

    #[error("Monitoring configuration already exists for symbol: {0}")]
    MonitoringConflict(String),

    #[error("No stock data found for symbol: {0}")]
    PriceNotFound(String),

    #[error("Input validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),

    #[error("Invalid configuration value: {0}")]
    InvalidConfigValue(String),

    #[error("Missing configuration key: {0}")]
    MissingConfigKey(String),
}

/// Coarse classification of [`Error`], stable across message changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidSymbol,
    ProviderUnauthorized,
    ProviderRateLimited,
    ProviderError,
    DuplicateEntry,
    MonitoringNotFound,
    MonitoringConflict,
    NotFound,
    Validation,
    Database,
    Config,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MarketData(e) => match e {
                MarketDataError::InvalidSymbol(_) => ErrorKind::InvalidSymbol,
                MarketDataError::Unauthorized { .. } => ErrorKind::ProviderUnauthorized,
                MarketDataError::RateLimited { .. } => ErrorKind::ProviderRateLimited,
                MarketDataError::ProviderError { .. } => ErrorKind::ProviderError,
            },
            Error::DuplicateEntry { .. } => ErrorKind::DuplicateEntry,
            Error::MonitoringNotFound(_) => ErrorKind::MonitoringNotFound,
            Error::MonitoringConflict(_) => ErrorKind::MonitoringConflict,
            Error::PriceNotFound(_) => ErrorKind::NotFound,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Database(_) => ErrorKind::Database,
            Error::InvalidConfigValue(_) | Error::MissingConfigKey(_) => ErrorKind::Config,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Error::MarketData(e) => e.code(),
            Error::DuplicateEntry { .. } => "DUPLICATE_PRICE_ENTRY",
            Error::MonitoringNotFound(_) => "MONITORING_NOT_FOUND",
            Error::MonitoringConflict(_) => "MONITORING_CONFLICT",
            Error::PriceNotFound(_) => "NOT_FOUND",
            Error::Validation(_) => "VALIDATION",
            Error::Database(_) => "DATABASE",
            Error::InvalidConfigValue(_) | Error::MissingConfigKey(_) => "CONFIG",
        }
    }
}

/// Database-agnostic error type for storage operations.
///
/// This enum uses `String` for all error details, allowing the storage layer
/// to convert storage-specific errors (Diesel, SQLite, etc.) into this format.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to establish a database connection.
    #[error("Failed to connect to database: {0}")]
    ConnectionFailed(String),

    /// Failed to create or configure the connection pool.
    #[error("Failed to create database pool: {0}")]
    PoolCreationFailed(String),

    /// A database query failed to execute.
    #[error("Database query failed: {0}")]
    QueryFailed(String),

    /// A unique constraint was violated that the domain has no better name for.
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Database migration failed.
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// A stored row could not be turned back into a domain value.
    #[error("Corrupt row: {0}")]
    CorruptRow(String),

    /// Internal/unexpected database error.
    #[error("Internal database error: {0}")]
    Internal(String),
}

/// Validation errors for entity construction.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Price must be positive, got {0}")]
    NonPositivePrice(String),

    #[error("Price out of range: {0}")]
    PriceOutOfRange(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_market_data_errors_pass_through() {
        let err: Error = MarketDataError::InvalidSymbol("ZZZZ".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::InvalidSymbol);
        assert_eq!(err.code(), "STOCK_001");
        assert_eq!(err.to_string(), "Invalid stock symbol: ZZZZ");

        let err: Error = MarketDataError::RateLimited {
            provider: "FINNHUB".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::ProviderRateLimited);
        assert_eq!(err.code(), "PROVIDER_003");
    }

    #[test]
    fn test_domain_error_codes() {
        let instant = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let dup = Error::DuplicateEntry {
            symbol: "AAPL".to_string(),
            instant,
        };
        assert_eq!(dup.kind(), ErrorKind::DuplicateEntry);
        assert_eq!(dup.code(), "DUPLICATE_PRICE_ENTRY");
        assert_eq!(
            dup.to_string(),
            "Duplicate price entry for symbol AAPL at 2024-01-01T00:00:00+00:00"
        );

        assert_eq!(
            Error::MonitoringConflict("AAPL".into()).code(),
            "MONITORING_CONFLICT"
        );
        assert_eq!(
            Error::MonitoringNotFound("AAPL".into()).kind(),
            ErrorKind::MonitoringNotFound
        );
        assert_eq!(Error::MissingConfigKey("X".into()).kind(), ErrorKind::Config);
    }
}
