//! Critic selection
//!
//! For each critic in roster order:
//! 1. Any required file missing: skipped, even when forced
//! 2. Forced: selected
//! 3. Any required key whose current digest differs from the stored one: selected
//! 4. Otherwise: skipped

use crate::models::{CriticDefinition, CritiqueConfig, FileKey, TrackedKey};
use crate::state::{CurrentState, StoredState};
use std::fmt;

/// Why a critic was selected or skipped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    MissingFiles(Vec<FileKey>),
    Forced,
    Changed(Vec<TrackedKey>),
    Unchanged,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::MissingFiles(keys) => write!(f, "missing files: {}", join(keys)),
            Reason::Forced => f.write_str("forced"),
            Reason::Changed(keys) => write!(f, "changed: {}", join(keys)),
            Reason::Unchanged => f.write_str("no changes detected"),
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Decision for one critic
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionDecision<'a> {
    pub critic: &'a CriticDefinition,
    pub reason: Reason,
}

impl SelectionDecision<'_> {
    pub fn selected(&self) -> bool {
        matches!(self.reason, Reason::Forced | Reason::Changed(_))
    }
}

/// Decisions for a whole roster, in roster order
#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'a> {
    pub decisions: Vec<SelectionDecision<'a>>,
}

impl<'a> Selection<'a> {
    /// Selected critics, in roster order
    pub fn selected(&self) -> impl Iterator<Item = &'a CriticDefinition> + '_ {
        self.decisions
            .iter()
            .filter(|d| d.selected())
            .map(|d| d.critic)
    }

    pub fn selected_count(&self) -> usize {
        self.decisions.iter().filter(|d| d.selected()).count()
    }

    pub fn total(&self) -> usize {
        self.decisions.len()
    }

    /// Whether the current fingerprints should replace the stored ones
    ///
    /// Only runs that selected something write back; dry runs never do.
    pub fn should_persist(&self, dry_run: bool) -> bool {
        !dry_run && self.selected_count() > 0
    }
}

/// Selection options
#[derive(Debug, Clone, Copy, Default)]
pub struct Selector {
    /// Select every critic whose files exist, ignoring digests
    pub force: bool,
}

impl Selector {
    pub fn new(force: bool) -> Self {
        Self { force }
    }

    pub fn select<'a>(
        &self,
        config: &'a CritiqueConfig,
        current: &CurrentState,
        stored: &StoredState,
    ) -> Selection<'a> {
        let decisions = config
            .critics
            .iter()
            .map(|critic| SelectionDecision {
                critic,
                reason: self.decide(critic, current, stored),
            })
            .collect();

        Selection { decisions }
    }

    fn decide(
        &self,
        critic: &CriticDefinition,
        current: &CurrentState,
        stored: &StoredState,
    ) -> Reason {
        let missing: Vec<FileKey> = critic
            .files
            .iter()
            .filter(|key| !key.tracked().map_or(false, |k| current.exists(k)))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Reason::MissingFiles(missing);
        }

        if self.force {
            return Reason::Forced;
        }

        // Every key passed the existence gate, so each has a current digest
        let changed: Vec<TrackedKey> = critic
            .files
            .iter()
            .filter_map(FileKey::tracked)
            .filter(|&key| match current.digest(key) {
                Some(digest) => stored.digest(key) != Some(digest),
                None => false,
            })
            .collect();

        if changed.is_empty() {
            Reason::Unchanged
        } else {
            Reason::Changed(changed)
        }
    }
}
