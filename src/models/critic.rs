//! Critic definitions and the tracked key space
//!
//! A critic is bound to a list of file keys. Known keys form a closed set
//! (`TrackedKey`); anything else a roster names is carried verbatim as
//! `FileKey::Other` and can never be satisfied.

use serde::Deserialize;
use std::fmt;

/// Subdirectory holding per-feature requirement documents
pub const REQUIREMENTS_DIR: &str = "requirements";

/// Pattern for requirement documents, relative to `REQUIREMENTS_DIR`
pub const REQUIREMENTS_PATTERN: &str = "*/requirements.feature.md";

// =============================================================================
// Tracked Keys
// =============================================================================

/// A file or file-group the selector knows how to fingerprint
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
pub enum TrackedKey {
    #[serde(rename = "functional.md")]
    Functional,
    #[serde(rename = "technical.md")]
    Technical,
    #[serde(rename = "tasks.yaml")]
    Tasks,
    #[serde(rename = "requirements")]
    Requirements,
}

/// Where a tracked key's bytes come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackedSource {
    /// Single file relative to the change directory
    File(&'static str),
    /// All files matching `pattern` under `dir`, hashed as one unit
    Group {
        dir: &'static str,
        pattern: &'static str,
    },
}

impl TrackedKey {
    /// Every key, in the order they are fingerprinted
    pub const ALL: [TrackedKey; 4] = [
        TrackedKey::Functional,
        TrackedKey::Technical,
        TrackedKey::Tasks,
        TrackedKey::Requirements,
    ];

    /// Name used in rosters and in the persisted state file
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackedKey::Functional => "functional.md",
            TrackedKey::Technical => "technical.md",
            TrackedKey::Tasks => "tasks.yaml",
            TrackedKey::Requirements => "requirements",
        }
    }

    pub fn source(&self) -> TrackedSource {
        match self {
            TrackedKey::Functional | TrackedKey::Technical | TrackedKey::Tasks => {
                TrackedSource::File(self.as_str())
            }
            TrackedKey::Requirements => TrackedSource::Group {
                dir: REQUIREMENTS_DIR,
                pattern: REQUIREMENTS_PATTERN,
            },
        }
    }

    /// Path (or glob) handed to downstream consumers of the selection
    ///
    /// Group keys expand to their full pattern, e.g. `requirements/*/requirements.feature.md`.
    pub fn display_path(&self) -> String {
        match self.source() {
            TrackedSource::File(name) => name.to_string(),
            TrackedSource::Group { dir, pattern } => format!("{}/{}", dir, pattern),
        }
    }
}

impl fmt::Display for TrackedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// File Keys
// =============================================================================

/// A file key as written in a critic's `files` list
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FileKey {
    Tracked(TrackedKey),
    /// Unknown key; never exists, so a critic requiring it is always skipped
    Other(String),
}

impl FileKey {
    pub fn tracked(&self) -> Option<TrackedKey> {
        match self {
            FileKey::Tracked(key) => Some(*key),
            FileKey::Other(_) => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FileKey::Tracked(key) => key.as_str(),
            FileKey::Other(name) => name,
        }
    }

    pub fn display_path(&self) -> String {
        match self {
            FileKey::Tracked(key) => key.display_path(),
            FileKey::Other(name) => name.clone(),
        }
    }
}

impl From<TrackedKey> for FileKey {
    fn from(key: TrackedKey) -> Self {
        FileKey::Tracked(key)
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Critic Definition
// =============================================================================

/// A named evaluation job bound to its required input files
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CriticDefinition {
    /// Critic name (e.g., "functional-review")
    pub name: String,

    /// Required file keys, in roster order
    #[serde(default)]
    pub files: Vec<FileKey>,

    /// Model the critic runs on (opaque to the selector)
    pub model: String,

    /// Skills loaded for the critic
    #[serde(default)]
    pub skills: Vec<String>,

    /// Evaluation descriptor (opaque to the selector)
    pub evaluate: serde_json::Value,
}
