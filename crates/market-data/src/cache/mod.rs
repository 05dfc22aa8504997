//! Symbol validation cache.
//!
//! Remembers whether a symbol is *valid*, never its price. Losing an entry
//! only costs an extra provider call; correctness never depends on it.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use thiserror::Error;

/// How long a validity verdict is remembered.
pub const VALIDATION_TTL: Duration = Duration::from_secs(60 * 60);

const DEFAULT_MAX_CAPACITY: u64 = 10_000;

/// Failure of the cache subsystem itself.
///
/// Callers treat every variant as a miss.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache unavailable: {0}")]
    Unavailable(String),

    #[error("Cache operation failed: {0}")]
    Operation(String),
}

/// Key/TTL store for symbol validity verdicts.
#[async_trait]
pub trait ValidationCache: Send + Sync {
    /// Returns the remembered verdict, or `None` on a miss.
    async fn get(&self, symbol: &str) -> Result<Option<bool>, CacheError>;

    /// Remembers a verdict for the cache's TTL.
    async fn set(&self, symbol: &str, valid: bool) -> Result<(), CacheError>;
}

fn cache_key(symbol: &str) -> String {
    format!("symbol_valid:{}", symbol)
}

/// In-process validation cache backed by `moka`.
pub struct MokaValidationCache {
    entries: Cache<String, bool>,
}

impl MokaValidationCache {
    /// Create a cache with the default 60 minute TTL.
    pub fn new() -> Self {
        Self::with_ttl(VALIDATION_TTL)
    }

    /// Create a cache with a custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            entries: Cache::builder()
                .time_to_live(ttl)
                .max_capacity(DEFAULT_MAX_CAPACITY)
                .build(),
        }
    }
}

impl Default for MokaValidationCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ValidationCache for MokaValidationCache {
    async fn get(&self, symbol: &str) -> Result<Option<bool>, CacheError> {
        Ok(self.entries.get(&cache_key(symbol)).await)
    }

    async fn set(&self, symbol: &str, valid: bool) -> Result<(), CacheError> {
        self.entries.insert(cache_key(symbol), valid).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_miss_then_hit() {
        let cache = MokaValidationCache::new();
        assert_eq!(cache.get("AAPL").await.unwrap(), None);

        cache.set("AAPL", true).await.unwrap();
        cache.set("ZZZZ", false).await.unwrap();

        assert_eq!(cache.get("AAPL").await.unwrap(), Some(true));
        assert_eq!(cache.get("ZZZZ").await.unwrap(), Some(false));
    }

    #[tokio::test]
    async fn test_entries_expire_after_ttl() {
        let cache = MokaValidationCache::with_ttl(Duration::from_millis(50));
        cache.set("AAPL", true).await.unwrap();
        assert_eq!(cache.get("AAPL").await.unwrap(), Some(true));

        std::thread::sleep(Duration::from_millis(120));
        assert_eq!(cache.get("AAPL").await.unwrap(), None);
    }
}
