//! Concurrent in-memory storage engine

use super::record::Record;
use parking_lot::RwLock;
use serde::Serialize;
use siphasher::sip::SipHasher13;
use std::collections::HashMap;
use std::hash::BuildHasherDefault;

/// Type alias for our hash map with SipHasher
pub type StoreMap = HashMap<String, Record, BuildHasherDefault<SipHasher13>>;

/// Create an empty store map with the given initial capacity
pub fn empty_map(capacity: usize) -> StoreMap {
    HashMap::with_capacity_and_hasher(capacity, BuildHasherDefault::<SipHasher13>::default())
}

/// In-memory key-value store
///
/// One reader/writer lock guards the whole map: `get` and `snapshot` share it,
/// `put`, `delete` and `restore` hold it exclusively. Every single-key
/// operation is therefore linearizable and a snapshot always sits between two
/// writers.
pub struct StorageEngine {
    records: RwLock<StoreMap>,
}

impl StorageEngine {
    /// Create an empty engine with default capacity
    pub fn new() -> Self {
        Self::with_capacity(1024)
    }

    /// Create an empty engine with specified initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        StorageEngine {
            records: RwLock::new(empty_map(capacity)),
        }
    }

    /// Insert or overwrite the record stored at `key`
    ///
    /// The record's own `key` field is aligned with `key`.
    pub fn put(&self, key: impl Into<String>, mut record: Record) {
        let key = key.into();
        record.key.clone_from(&key);
        self.records.write().insert(key, record);
    }

    /// Get a copy of the record stored at `key`
    pub fn get(&self, key: &str) -> Option<Record> {
        self.records.read().get(key).cloned()
    }

    /// Delete a key, returns true if the key existed
    pub fn delete(&self, key: &str) -> bool {
        self.records.write().remove(key).is_some()
    }

    /// Independent copy of the whole store taken under the shared lock
    pub fn snapshot(&self) -> StoreMap {
        self.records.read().clone()
    }

    /// Replace the whole store with `records` in one exclusive step
    pub fn restore(&self, mut records: StoreMap) {
        for (key, record) in records.iter_mut() {
            if record.key != *key {
                record.key.clone_from(key);
            }
        }
        *self.records.write() = records;
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get statistics about the store
    pub fn stats(&self) -> StoreStats {
        let records = self.records.read();
        StoreStats {
            keys: records.len(),
            keys_with_expiry: records.values().filter(|r| r.has_expiration()).count(),
            used_memory_bytes: records.values().map(Record::memory_usage).sum(),
        }
    }
}

impl Default for StorageEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about the storage engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub keys: usize,
    pub keys_with_expiry: usize,
    pub used_memory_bytes: usize,
}
