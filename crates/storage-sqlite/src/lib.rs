//! SQLite storage implementation for tickwatch.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the store traits defined in `tickwatch-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for the tick series and monitoring configs
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! `core` works with the `PriceStore` and `MonitoringStore` traits only.
//!
//! ```text
//!        core (domain)
//!              │
//!              ▼
//!   storage-sqlite (this crate)
//!              │
//!              ▼
//!          SQLite DB
//! ```
//!
//! All writes are funneled through a single writer actor (see [`db::spawn_writer`]),
//! reads go straight to the pool.

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod monitoring;
pub mod prices;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use monitoring::MonitoringRepository;
pub use prices::PriceRepository;

// Re-export from tickwatch-core for convenience
pub use tickwatch_core::errors::{DatabaseError, Error, Result};
