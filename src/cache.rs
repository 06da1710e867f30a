//! Session dataset cache
//!
//! Holds the scored dataset for the current session, keyed by the input file's path
//! and SHA-256 checksum. A changed file produces a new key and is reloaded; callers
//! can also drop the entry with [`DatasetCache::invalidate`].

use crate::adapter::{CsvRecordAdapter, LoadPolicy, RejectedRow};
use crate::error::ComputeError;
use crate::scoring::score;
use crate::types::ScoredRecord;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Identity of a loaded input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetKey {
    pub path: PathBuf,
    /// Lowercase hex SHA-256 of the file contents
    pub checksum: String,
    /// Policy the records were loaded under
    pub policy: LoadPolicy,
}

/// Records scored once per load
#[derive(Debug, Clone)]
pub struct ScoredDataset {
    pub key: DatasetKey,
    pub records: Vec<ScoredRecord>,
    pub rejected: Vec<RejectedRow>,
}

/// Single-entry cache for the session's dataset
#[derive(Debug, Default)]
pub struct DatasetCache {
    entry: Option<ScoredDataset>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached dataset for `path`, loading and scoring it if the path or
    /// contents changed since the last load.
    pub fn load(&mut self, path: &Path, policy: LoadPolicy) -> Result<&ScoredDataset, ComputeError> {
        let bytes = fs::read(path)?;
        let key = DatasetKey {
            path: path.to_path_buf(),
            checksum: checksum(&bytes),
            policy,
        };

        let dataset = match self.entry.take() {
            Some(cached) if cached.key == key => {
                debug!(path = %path.display(), "dataset cache hit");
                cached
            }
            _ => {
                debug!(path = %path.display(), checksum = %key.checksum, "dataset cache miss");
                load_dataset(key, &bytes)?
            }
        };

        Ok(self.entry.insert(dataset))
    }

    /// The currently cached dataset, if any, without touching the file system
    pub fn cached(&self) -> Option<&ScoredDataset> {
        self.entry.as_ref()
    }

    /// Drop the cached dataset
    pub fn invalidate(&mut self) {
        if self.entry.take().is_some() {
            debug!("dataset cache invalidated");
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}

fn load_dataset(key: DatasetKey, bytes: &[u8]) -> Result<ScoredDataset, ComputeError> {
    let outcome = CsvRecordAdapter::load_reader(&bytes[..], key.policy)?;
    info!(
        path = %key.path.display(),
        records = outcome.records.len(),
        rejected = outcome.rejected.len(),
        "loaded dataset"
    );

    Ok(ScoredDataset {
        key,
        records: score(&outcome.records),
        rejected: outcome.rejected,
    })
}

/// Lowercase hex SHA-256 of `bytes`
pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
