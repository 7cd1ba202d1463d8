//! Snapshot persistence module
//!
//! Provides durability by periodically writing the whole store to a single
//! JSON file and reading it back at startup. Writes are not atomic: a crash
//! in the middle of a save can leave a truncated file, which is then treated
//! like any other unreadable snapshot on the next start.

mod codec;
mod file;
mod scheduler;

pub use codec::{decode, encode};
pub use file::{load, load_or_empty, save};
pub use scheduler::{PersistConfig, PersistReport, PersistenceScheduler};

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while saving or loading a snapshot
#[derive(Debug, Error)]
pub enum SnapshotError {
    /// The snapshot file is missing, unreadable or unwritable
    #[error("snapshot file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The in-memory store could not be rendered as JSON
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),

    /// The snapshot bytes are not a JSON object of records
    #[error("failed to decode snapshot: {0}")]
    Decode(#[source] serde_json::Error),
}

impl SnapshotError {
    /// True when the snapshot file simply does not exist yet
    pub fn is_not_found(&self) -> bool {
        matches!(self, SnapshotError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}
