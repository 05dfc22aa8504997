//! Batch fetch scheduler.
//!
//! On every tick the scheduler lists active symbols, splits them into batches
//! of `max_concurrent_requests`, fetches and persists each batch with
//! all-settled semantics, and pauses `rate_limit_delay` between batches. A run
//! never fails as a whole; per-symbol errors are folded into [`RunSummary`].
//!
//! A tick that fires while the previous run is still in flight is skipped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, error, info, warn};
use rust_decimal::Decimal;
use serde::Serialize;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use tickwatch_market_data::{QuoteProvider, Symbol};

use super::schedule::Schedule;
use crate::constants::{
    DEFAULT_FETCH_SCHEDULE, DEFAULT_MAX_CONCURRENT_REQUESTS, DEFAULT_RATE_LIMIT_DELAY_MS,
    MAX_CONCURRENT_REQUESTS_LIMIT,
};
use crate::errors::{Error, Result};
use crate::monitoring::SymbolRegistryTrait;
use crate::prices::{PriceServiceTrait, Tick};

/// Scheduler settings.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub schedule: Schedule,
    pub max_concurrent_requests: usize,
    pub rate_limit_delay: Duration,
}

impl SchedulerConfig {
    pub fn new(
        schedule: Schedule,
        max_concurrent_requests: usize,
        rate_limit_delay: Duration,
    ) -> Result<Self> {
        if !(1..=MAX_CONCURRENT_REQUESTS_LIMIT).contains(&max_concurrent_requests) {
            return Err(Error::InvalidConfigValue(format!(
                "max concurrent requests must be between 1 and {}, got {}",
                MAX_CONCURRENT_REQUESTS_LIMIT, max_concurrent_requests
            )));
        }
        Ok(Self {
            schedule,
            max_concurrent_requests,
            rate_limit_delay,
        })
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            schedule: Schedule::parse(DEFAULT_FETCH_SCHEDULE)
                .unwrap_or(Schedule::Every(Duration::from_secs(60))),
            max_concurrent_requests: DEFAULT_MAX_CONCURRENT_REQUESTS,
            rate_limit_delay: Duration::from_millis(DEFAULT_RATE_LIMIT_DELAY_MS),
        }
    }
}

/// Outcome for one symbol in a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SymbolResult {
    pub symbol: String,
    pub success: bool,
    pub price: Option<Decimal>,
    pub error: Option<String>,
}

impl SymbolResult {
    fn succeeded(tick: &Tick) -> Self {
        Self {
            symbol: tick.symbol.to_string(),
            success: true,
            price: Some(tick.price.value()),
            error: None,
        }
    }

    fn failed(symbol: &Symbol, error: impl Into<String>) -> Self {
        Self {
            symbol: symbol.to_string(),
            success: false,
            price: None,
            error: Some(error.into()),
        }
    }
}

/// Aggregate of one scheduler run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub batch_sizes: Vec<usize>,
    pub results: Vec<SymbolResult>,
}

impl RunSummary {
    /// `(symbol, error)` for every failed symbol, in processing order.
    pub fn failures(&self) -> Vec<(&str, &str)> {
        self.results
            .iter()
            .filter(|r| !r.success)
            .map(|r| (r.symbol.as_str(), r.error.as_deref().unwrap_or_default()))
            .collect()
    }
}

/// Clears the in-flight flag when a run ends, even if it panics.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

struct SchedulerInner {
    registry: Arc<dyn SymbolRegistryTrait>,
    provider: Arc<dyn QuoteProvider>,
    prices: Arc<dyn PriceServiceTrait>,
    config: SchedulerConfig,
    in_flight: AtomicBool,
}

/// Owns the single timer that drives scheduled fetches.
pub struct FetchScheduler {
    inner: Arc<SchedulerInner>,
    timer: Mutex<Option<JoinHandle<()>>>,
}

impl FetchScheduler {
    pub fn new(
        registry: Arc<dyn SymbolRegistryTrait>,
        provider: Arc<dyn QuoteProvider>,
        prices: Arc<dyn PriceServiceTrait>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner {
                registry,
                provider,
                prices,
                config,
                in_flight: AtomicBool::new(false),
            }),
            timer: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.inner.config
    }

    /// Starts the timer. Calling it again while running does nothing.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(&self) {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if timer.as_ref().is_some_and(|h| !h.is_finished()) {
            warn!("Fetch scheduler already running");
            return;
        }

        info!(
            "Starting fetch scheduler ({:?}, batch size {}, {}ms between batches)",
            self.inner.config.schedule,
            self.inner.config.max_concurrent_requests,
            self.inner.config.rate_limit_delay.as_millis()
        );
        let inner = self.inner.clone();
        *timer = Some(tokio::spawn(async move { inner.run_timer().await }));
    }

    /// Stops the timer. A run already in flight is left to finish.
    pub fn stop(&self) {
        let mut timer = self.timer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = timer.take() {
            handle.abort();
            info!("Fetch scheduler stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Runs one fetch cycle now.
    ///
    /// Returns `None` if another run is still in flight.
    pub async fn run_once(&self) -> Option<RunSummary> {
        self.inner.clone().run_guarded().await
    }
}

impl Drop for FetchScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self
            .timer
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

impl SchedulerInner {
    async fn run_timer(self: Arc<Self>) {
        match &self.config.schedule {
            Schedule::Every(period) => {
                let mut interval = tokio::time::interval_at(Instant::now() + *period, *period);
                interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    interval.tick().await;
                    self.fire();
                }
            }
            Schedule::Cron(_) => {
                // Advance from the last fired instant, not the wall clock, so
                // an early wake-up cannot fire the same slot twice.
                let mut cursor = Utc::now();
                loop {
                    let Some(next) = self.config.schedule.next_fire_after(cursor) else {
                        warn!("Fetch schedule has no upcoming runs; timer exiting");
                        return;
                    };
                    let wait = (next - Utc::now()).to_std().unwrap_or(Duration::ZERO);
                    tokio::time::sleep(wait).await;
                    self.fire();
                    cursor = next;
                }
            }
        }
    }

    /// Spawns a run so a slow run never delays the timer itself.
    fn fire(self: &Arc<Self>) {
        let inner = self.clone();
        tokio::spawn(async move {
            inner.run_guarded().await;
        });
    }

    async fn run_guarded(self: Arc<Self>) -> Option<RunSummary> {
        if self.in_flight.swap(true, Ordering::SeqCst) {
            warn!("Previous fetch run still in flight; skipping this tick");
            return None;
        }
        let _guard = InFlightGuard(&self.in_flight);
        Some(self.execute().await)
    }

    async fn execute(self: &Arc<Self>) -> RunSummary {
        let started_at = Utc::now();
        let clock = Instant::now();

        let symbols: Vec<Symbol> = match self.registry.list(true) {
            Ok(configs) => configs.into_iter().map(|c| c.symbol).collect(),
            Err(e) => {
                error!("Failed to list monitored symbols: {}", e);
                Vec::new()
            }
        };

        if symbols.is_empty() {
            debug!("No active symbols to fetch");
            return RunSummary {
                started_at,
                finished_at: Utc::now(),
                elapsed: clock.elapsed(),
                total: 0,
                succeeded: 0,
                failed: 0,
                batch_sizes: Vec::new(),
                results: Vec::new(),
            };
        }

        let batch_size = self.config.max_concurrent_requests.max(1);
        let batches: Vec<&[Symbol]> = symbols.chunks(batch_size).collect();
        let batch_count = batches.len();
        info!(
            "Fetching {} symbols in {} batches of up to {}",
            symbols.len(),
            batch_count,
            batch_size
        );

        let mut batch_sizes = Vec::with_capacity(batch_count);
        let mut results = Vec::with_capacity(symbols.len());

        for (index, batch) in batches.into_iter().enumerate() {
            batch_sizes.push(batch.len());
            debug!(
                "Processing batch {}/{} ({} symbols)",
                index + 1,
                batch_count,
                batch.len()
            );

            let handles = batch.iter().cloned().map(|symbol| {
                let inner = self.clone();
                tokio::spawn(async move { inner.process_symbol(symbol).await })
            });
            let outcomes = join_all(handles).await;

            for (symbol, outcome) in batch.iter().zip(outcomes) {
                results.push(outcome.unwrap_or_else(|e| {
                    SymbolResult::failed(symbol, format!("Fetch task failed: {}", e))
                }));
            }

            if index + 1 < batch_count && !self.config.rate_limit_delay.is_zero() {
                debug!(
                    "Waiting {}ms before next batch",
                    self.config.rate_limit_delay.as_millis()
                );
                tokio::time::sleep(self.config.rate_limit_delay).await;
            }
        }

        let succeeded = results.iter().filter(|r| r.success).count();
        let summary = RunSummary {
            started_at,
            finished_at: Utc::now(),
            elapsed: clock.elapsed(),
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            batch_sizes,
            results,
        };

        info!(
            "Scheduled fetch completed: {} processed, {} succeeded, {} failed in {}ms",
            summary.total,
            summary.succeeded,
            summary.failed,
            summary.elapsed.as_millis()
        );
        for (symbol, error) in summary.failures() {
            warn!("Scheduled fetch failed for {}: {}", symbol, error);
        }

        summary
    }

    async fn process_symbol(&self, symbol: Symbol) -> SymbolResult {
        let now = Utc::now();
        match self.fetch_and_store(&symbol, now).await {
            Ok(tick) => SymbolResult::succeeded(&tick),
            Err(e) => {
                if let Err(update_err) = self.registry.update_fetch_timestamp(&symbol, now).await {
                    error!(
                        "Failed to record fetch attempt for {}: {}",
                        symbol, update_err
                    );
                }
                SymbolResult::failed(&symbol, e.to_string())
            }
        }
    }

    async fn fetch_and_store(&self, symbol: &Symbol, now: DateTime<Utc>) -> Result<Tick> {
        let quote = self.provider.get_quote(symbol.as_str()).await?;
        let tick = self.prices.append(symbol, quote.current_price, now).await?;
        self.registry.update_fetch_timestamp(symbol, now).await?;
        Ok(tick)
    }
}
