//! FerrumKV - A small HTTP key-value store for JSON documents
//!
//! FerrumKV is designed with strong cohesion and loose coupling principles:
//! - `store` owns the records and the lock that guards them
//! - `persistence` turns snapshots of the store into a file and back
//! - `web` translates HTTP requests into store calls
//! - No circular dependencies between modules

pub mod config;
pub mod logging;
pub mod metrics;
pub mod persistence;
pub mod store;
pub mod web;

/// Re-export commonly used types
pub use config::Config;
pub use persistence::{PersistConfig, PersistReport, PersistenceScheduler, SnapshotError};
pub use store::{Record, StorageEngine, StoreMap};
