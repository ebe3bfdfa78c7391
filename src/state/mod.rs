//! Change Directory State Module
//!
//! Handles fingerprinting and persistence of tracked files, including:
//! - Single-file and file-group digests
//! - The current fingerprint snapshot of a change directory
//! - The .hashes.json record from the previous run

pub mod fingerprint;
pub mod store;

pub use fingerprint::{digest_file, digest_group, CurrentState, Digest, FingerprintError};
pub use store::{StateError, StateStore, StoredDigests, StoredState, UnknownReason, STATE_FILE_NAME};
