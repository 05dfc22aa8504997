//! Scheduler module - periodic batch fetching of monitored symbols.

mod fetch_scheduler;
mod schedule;


pub use fetch_scheduler::{FetchScheduler, RunSummary, SchedulerConfig, SymbolResult};
pub use schedule::Schedule;
