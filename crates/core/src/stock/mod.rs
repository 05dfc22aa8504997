//! Stock module - snapshot, manual fetch and monitoring toggle.

mod stock_service;

pub use stock_service::{StockService, StockServiceTrait, StockSnapshot};
