//! .hashes.json persistence
//!
//! Holds the digests recorded by the last run that selected anything. A
//! missing, corrupt or unreadable file never blocks a run; it only means every
//! present key counts as changed.

use super::fingerprint::{CurrentState, Digest};
use crate::models::TrackedKey;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// State file kept inside the change directory
pub const STATE_FILE_NAME: &str = ".hashes.json";

/// Persisted mapping of tracked key name to digest
pub type StoredDigests = BTreeMap<String, Digest>;

/// Errors raised by the state store
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("Cannot read hash file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupted hash file {}: {message}", path.display())]
    Corrupt { path: PathBuf, message: String },

    #[error("Cannot write hash file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize hashes: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Why no prior digests are available
#[derive(Debug)]
pub enum UnknownReason {
    /// First run: no state file yet
    Absent,
    /// File exists but could not be used
    Unusable(StateError),
}

/// What the selector may assume about the previous run
///
/// Only `Known` carries digests, so unusable data can never be compared against.
#[derive(Debug)]
pub enum StoredState {
    Known(StoredDigests),
    Unknown(UnknownReason),
}

impl StoredState {
    /// Digest recorded for `key` by the previous run
    pub fn digest(&self, key: TrackedKey) -> Option<&Digest> {
        match self {
            StoredState::Known(digests) => digests.get(key.as_str()),
            StoredState::Unknown(_) => None,
        }
    }

    /// Error that forfeited incrementality for this run, if any
    pub fn warning(&self) -> Option<&StateError> {
        match self {
            StoredState::Unknown(UnknownReason::Unusable(err)) => Some(err),
            _ => None,
        }
    }
}

/// State file for one change directory
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location inside `change_dir`
    pub fn for_change(change_dir: &Path) -> Self {
        Self::new(change_dir.join(STATE_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load stored digests; an absent file yields an empty mapping
    pub fn load(&self) -> Result<StoredDigests, StateError> {
        if !self.path.exists() {
            return Ok(StoredDigests::new());
        }

        let content = std::fs::read_to_string(&self.path).map_err(|source| StateError::Read {
            path: self.path.clone(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|e| StateError::Corrupt {
            path: self.path.clone(),
            message: e.to_string(),
        })
    }

    /// Load and classify, folding every failure into `StoredState::Unknown`
    pub fn resolve(&self) -> StoredState {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no stored hashes");
            return StoredState::Unknown(UnknownReason::Absent);
        }

        match self.load() {
            Ok(digests) => {
                tracing::debug!(path = %self.path.display(), entries = digests.len(), "loaded stored hashes");
                StoredState::Known(digests)
            }
            Err(err) => StoredState::Unknown(UnknownReason::Unusable(err)),
        }
    }

    /// Replace the stored digests wholesale with `current`
    ///
    /// Writes to a temporary file in the same directory, then persists it over
    /// the target.
    pub fn save(&self, current: &CurrentState) -> Result<(), StateError> {
        let digests: StoredDigests = current
            .digests()
            .iter()
            .map(|(key, digest)| (key.as_str().to_string(), digest.clone()))
            .collect();

        let mut content = serde_json::to_string_pretty(&digests)?;
        content.push('\n');

        let write_err = |source| StateError::Write {
            path: self.path.clone(),
            source,
        };

        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp_file = NamedTempFile::new_in(parent).map_err(write_err)?;
        temp_file.write_all(content.as_bytes()).map_err(write_err)?;
        temp_file.flush().map_err(write_err)?;
        temp_file.persist(&self.path).map_err(|e| write_err(e.error))?;

        tracing::debug!(path = %self.path.display(), entries = digests.len(), "saved hashes");
        Ok(())
    }
}
