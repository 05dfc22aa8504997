//! Monitoring module - per-symbol monitoring state and the symbol registry.

mod monitoring_model;
mod monitoring_traits;
mod registry;


pub use monitoring_model::{MonitoringConfig, MonitoringState};
pub use monitoring_traits::{MonitoringStore, SymbolRegistryTrait};
pub use registry::SymbolRegistry;
