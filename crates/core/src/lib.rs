//! Tickwatch Core - Domain entities, services, and traits.
//!
//! This crate contains the business logic of the price monitor: the tick
//! time series, moving averages, the symbol registry and the batch fetch
//! scheduler. It is database-agnostic and defines storage traits that are
//! implemented by the `storage-sqlite` crate.

pub mod constants;
pub mod errors;
pub mod monitoring;
pub mod prices;
pub mod scheduler;
pub mod stock;

#[cfg(test)]
pub(crate) mod test_mocks;

// Re-export error types
pub use errors::Error;
pub use errors::ErrorKind;
pub use errors::Result;
