//! Snapshot file I/O

use super::{codec, SnapshotError};
use crate::store::{empty_map, StoreMap};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Write the encoded store to `path`, replacing any previous content
///
/// Returns the number of bytes written.
pub fn save<P: AsRef<Path>>(path: P, records: &StoreMap) -> Result<usize, SnapshotError> {
    let path = path.as_ref();
    let bytes = codec::encode(records)?;

    fs::write(path, &bytes).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(bytes.len())
}

/// Read and decode the snapshot at `path`
pub fn load<P: AsRef<Path>>(path: P) -> Result<StoreMap, SnapshotError> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| SnapshotError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    codec::decode(&bytes)
}

/// Startup load: any failure is reported and yields an empty store
pub fn load_or_empty<P: AsRef<Path>>(path: P) -> StoreMap {
    let path = path.as_ref();
    match load(path) {
        Ok(records) => {
            info!(path = %path.display(), records = records.len(), "Snapshot loaded");
            records
        }
        Err(e) if e.is_not_found() => {
            warn!(path = %path.display(), "No snapshot found, starting with an empty store");
            empty_map(1024)
        }
        Err(e) => {
            warn!(error = %e, "Error loading snapshot, starting with an empty store");
            empty_map(1024)
        }
    }
}
