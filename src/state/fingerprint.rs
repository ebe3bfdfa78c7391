//! Content fingerprints for tracked files and file-groups
//!
//! Digests are truncated SHA256 hex strings. They detect change, they do not
//! verify integrity.

use crate::models::{TrackedKey, TrackedSource};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Length of a digest in hex characters
pub const DIGEST_LEN: usize = 16;

const CHUNK_SIZE: usize = 8192;

/// Errors raised while fingerprinting
#[derive(Debug, thiserror::Error)]
pub enum FingerprintError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid group pattern '{pattern}': {message}")]
    Pattern { pattern: String, message: String },
}

/// Short content fingerprint
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Digest(String);

impl Digest {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_hasher(hasher: Sha256) -> Self {
        let hex = format!("{:x}", hasher.finalize());
        Digest(hex[..DIGEST_LEN].to_string())
    }
}

impl From<&str> for Digest {
    fn from(value: &str) -> Self {
        Digest(value.to_string())
    }
}

impl fmt::Display for Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stream a file into the hasher in fixed-size chunks
fn feed_file(hasher: &mut Sha256, path: &Path) -> Result<(), FingerprintError> {
    let io_err = |source| FingerprintError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut file = File::open(path).map_err(io_err)?;
    let mut buffer = [0u8; CHUNK_SIZE];
    loop {
        let read = file.read(&mut buffer).map_err(io_err)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(())
}

/// Digest of a single file's content
pub fn digest_file(path: &Path) -> Result<Digest, FingerprintError> {
    let mut hasher = Sha256::new();
    feed_file(&mut hasher, path)?;
    Ok(Digest::from_hasher(hasher))
}

/// Combined digest of every file under `base` matching `pattern`
///
/// Members are sorted by their `/`-separated path relative to `base`; each
/// contributes its relative path followed by its content. Returns `None` when
/// nothing matches.
pub fn digest_group(base: &Path, pattern: &str) -> Result<Option<Digest>, FingerprintError> {
    let members = group_members(base, pattern)?;
    if members.is_empty() {
        return Ok(None);
    }

    let mut hasher = Sha256::new();
    for (relative, path) in &members {
        hasher.update(relative.as_bytes());
        feed_file(&mut hasher, path)?;
    }
    Ok(Some(Digest::from_hasher(hasher)))
}

/// Matching files keyed by relative path, so iteration order is sorted
fn group_members(base: &Path, pattern: &str) -> Result<BTreeMap<String, PathBuf>, FingerprintError> {
    let Some(base_str) = base.to_str() else {
        tracing::warn!(base = %base.display(), "change directory is not valid UTF-8, group skipped");
        return Ok(BTreeMap::new());
    };
    let full_pattern = format!("{}/{}", glob::Pattern::escape(base_str), pattern);
    let entries = glob::glob(&full_pattern).map_err(|e| FingerprintError::Pattern {
        pattern: pattern.to_string(),
        message: e.to_string(),
    })?;

    let mut members = BTreeMap::new();
    for entry in entries {
        let path = entry.map_err(|e| FingerprintError::Io {
            path: e.path().to_path_buf(),
            source: e.into(),
        })?;
        if !path.is_file() {
            continue;
        }
        match path.strip_prefix(base) {
            Ok(rel_path) => {
                members.insert(relative_key(rel_path), path);
            }
            Err(_) => {
                tracing::warn!(
                    path = %path.display(),
                    base = %base.display(),
                    "group member outside change directory, skipped"
                );
            }
        }
    }
    Ok(members)
}

/// `/`-separated form of a path relative to the change directory
fn relative_key(rel_path: &Path) -> String {
    rel_path
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

// =============================================================================
// Current State
// =============================================================================

/// Fingerprints of the change directory as it is right now
///
/// A key exists exactly when it has a digest; both come from the same scan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurrentState {
    digests: BTreeMap<TrackedKey, Digest>,
}

impl CurrentState {
    /// Fingerprint every tracked key under `change_dir`
    pub fn scan(change_dir: &Path) -> Result<Self, FingerprintError> {
        let mut digests = BTreeMap::new();

        for key in TrackedKey::ALL {
            let digest = match key.source() {
                TrackedSource::File(name) => {
                    let path = change_dir.join(name);
                    if path.is_file() {
                        Some(digest_file(&path)?)
                    } else {
                        None
                    }
                }
                TrackedSource::Group { dir, pattern } => {
                    digest_group(change_dir, &format!("{}/{}", dir, pattern))?
                }
            };

            match digest {
                Some(digest) => {
                    tracing::debug!(key = %key, digest = %digest, "fingerprinted");
                    digests.insert(key, digest);
                }
                None => tracing::debug!(key = %key, "not present"),
            }
        }

        Ok(Self { digests })
    }

    /// Build from explicit digests
    pub fn from_digests(digests: impl IntoIterator<Item = (TrackedKey, Digest)>) -> Self {
        Self {
            digests: digests.into_iter().collect(),
        }
    }

    pub fn exists(&self, key: TrackedKey) -> bool {
        self.digests.contains_key(&key)
    }

    pub fn digest(&self, key: TrackedKey) -> Option<&Digest> {
        self.digests.get(&key)
    }

    pub fn digests(&self) -> &BTreeMap<TrackedKey, Digest> {
        &self.digests
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_requirement(change_dir: &Path, feature: &str, content: &str) {
        let dir = change_dir.join("requirements").join(feature);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("requirements.feature.md"), content).unwrap();
    }

    fn requirements_digest(change_dir: &Path) -> Option<Digest> {
        digest_group(change_dir, "requirements/*/requirements.feature.md").unwrap()
    }

    #[test]
    fn test_digest_file_is_short_hex() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("functional.md");
        fs::write(&path, "# Functional\n").unwrap();

        let digest = digest_file(&path).unwrap();
        assert_eq!(digest.as_str().len(), DIGEST_LEN);
        assert!(digest.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest, digest_file(&path).unwrap());
    }

    #[test]
    fn test_digest_file_matches_sha256_prefix() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("empty.md");
        fs::write(&path, "").unwrap();

        // SHA256 of the empty input
        assert_eq!(digest_file(&path).unwrap().as_str(), "e3b0c44298fc1c14");
    }

    #[test]
    fn test_digest_file_spans_many_chunks() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("big.md");
        let mut content = vec![b'a'; CHUNK_SIZE * 3 + 17];
        fs::write(&path, &content).unwrap();
        let before = digest_file(&path).unwrap();

        let last = content.len() - 1;
        content[last] = b'b';
        fs::write(&path, &content).unwrap();
        assert_ne!(before, digest_file(&path).unwrap());
    }

    #[test]
    fn test_digest_file_missing_is_io_error() {
        let temp = TempDir::new().unwrap();
        let err = digest_file(&temp.path().join("nope.md")).unwrap_err();
        assert!(matches!(err, FingerprintError::Io { .. }));
    }

    #[test]
    fn test_empty_group_is_absent() {
        let temp = TempDir::new().unwrap();
        assert_eq!(requirements_digest(temp.path()), None);

        fs::create_dir_all(temp.path().join("requirements/login")).unwrap();
        assert_eq!(requirements_digest(temp.path()), None);
    }

    #[test]
    fn test_group_ignores_creation_order() {
        let first = TempDir::new().unwrap();
        write_requirement(first.path(), "alpha", "A");
        write_requirement(first.path(), "beta", "B");

        let second = TempDir::new().unwrap();
        write_requirement(second.path(), "beta", "B");
        write_requirement(second.path(), "alpha", "A");

        assert_eq!(requirements_digest(first.path()), requirements_digest(second.path()));
    }

    #[test]
    fn test_group_rename_changes_digest() {
        let temp = TempDir::new().unwrap();
        write_requirement(temp.path(), "alpha", "same bytes");
        let before = requirements_digest(temp.path());

        fs::rename(
            temp.path().join("requirements/alpha"),
            temp.path().join("requirements/gamma"),
        )
        .unwrap();
        assert_ne!(before, requirements_digest(temp.path()));
    }

    #[test]
    fn test_group_add_and_remove_change_digest() {
        let temp = TempDir::new().unwrap();
        write_requirement(temp.path(), "alpha", "A");
        let one = requirements_digest(temp.path());

        write_requirement(temp.path(), "beta", "");
        let two = requirements_digest(temp.path());
        assert_ne!(one, two);

        fs::remove_dir_all(temp.path().join("requirements/beta")).unwrap();
        assert_eq!(one, requirements_digest(temp.path()));
    }

    #[test]
    fn test_group_moving_bytes_between_members_changes_digest() {
        let first = TempDir::new().unwrap();
        write_requirement(first.path(), "alpha", "AB");
        write_requirement(first.path(), "beta", "C");

        let second = TempDir::new().unwrap();
        write_requirement(second.path(), "alpha", "A");
        write_requirement(second.path(), "beta", "BC");

        assert_ne!(requirements_digest(first.path()), requirements_digest(second.path()));
    }

    #[test]
    fn test_relative_key_uses_forward_slashes() {
        let rel = Path::new("requirements").join("login").join("requirements.feature.md");
        assert_eq!(relative_key(&rel), "requirements/login/requirements.feature.md");
    }

    #[test]
    fn test_group_base_with_glob_metacharacters() {
        let temp = TempDir::new().unwrap();
        let change_dir = temp.path().join("fix[1]");
        write_requirement(&change_dir, "alpha", "A");

        assert!(requirements_digest(&change_dir).is_some());
    }

    #[test]
    fn test_scan_co_derives_existence_and_digest() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("functional.md"), "# F").unwrap();
        fs::create_dir_all(temp.path().join("requirements")).unwrap();

        let state = CurrentState::scan(temp.path()).unwrap();
        assert!(state.exists(TrackedKey::Functional));
        assert!(state.digest(TrackedKey::Functional).is_some());
        assert!(!state.exists(TrackedKey::Technical));
        assert!(!state.exists(TrackedKey::Requirements));
        assert_eq!(state.digests().len(), 1);
    }

    #[test]
    fn test_scan_skips_directory_named_like_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("tasks.yaml")).unwrap();

        let state = CurrentState::scan(temp.path()).unwrap();
        assert!(!state.exists(TrackedKey::Tasks));
    }
}
