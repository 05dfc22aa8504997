use std::fmt;
use std::time::Duration;

use tickwatch_core::constants::{
    DEFAULT_FETCH_SCHEDULE, DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_RATE_LIMIT_DELAY_MS,
};
use tickwatch_core::scheduler::{Schedule, SchedulerConfig};
use tickwatch_core::{Error, Result};

const DEFAULT_DB_PATH: &str = "./db/tickwatch.db";

/// Process configuration, read once at startup.
pub struct Config {
    pub finnhub_api_key: String,
    pub db_path: String,
    pub scheduler: SchedulerConfig,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset.
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let finnhub_api_key =
            var("FINNHUB_API_KEY").ok_or_else(|| Error::MissingConfigKey("FINNHUB_API_KEY".into()))?;
        let db_path = var("TW_DB_PATH").unwrap_or_else(|| DEFAULT_DB_PATH.to_string());

        let schedule = Schedule::parse(
            var("STOCK_FETCH_INTERVAL")
                .as_deref()
                .unwrap_or(DEFAULT_FETCH_SCHEDULE),
        )?;
        let max_concurrent_requests = match var("MAX_CONCURRENT_REQUESTS") {
            Some(raw) => parse_number::<usize>("MAX_CONCURRENT_REQUESTS", &raw)?,
            None => DEFAULT_MAX_CONCURRENT_REQUESTS,
        };
        let rate_limit_delay_ms = match var("RATE_LIMIT_DELAY") {
            Some(raw) => parse_number::<u64>("RATE_LIMIT_DELAY", &raw)?,
            None => DEFAULT_RATE_LIMIT_DELAY_MS,
        };

        let scheduler = SchedulerConfig::new(
            schedule,
            max_concurrent_requests,
            Duration::from_millis(rate_limit_delay_ms),
        )?;

        Ok(Self {
            finnhub_api_key,
            db_path,
            scheduler,
        })
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.parse::<T>().map_err(|_| {
        Error::InvalidConfigValue(format!("{} must be a non-negative integer, got '{}'", key, raw))
    })
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("finnhub_api_key", &"<redacted>")
            .field("db_path", &self.db_path)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}
