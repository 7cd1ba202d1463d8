//! In-memory storage module
//!
//! Provides the record type and the concurrent map that owns every record.
//! This module knows nothing about files or HTTP (loose coupling).

mod record;
mod engine;

pub use record::Record;
pub use engine::{empty_map, StorageEngine, StoreMap, StoreStats};
