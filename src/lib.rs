// Critique - change-detection driven critic selector
// Decides which critics must re-run for a change directory based on content fingerprints

pub mod cli;
pub mod logging;
pub mod models;
pub mod report;
pub mod selector;
pub mod state;

pub use anyhow::{Context, Result};
pub use colored::Colorize;

// Re-export commonly used types
pub use models::{CriticDefinition, CritiqueConfig, FileKey, TrackedKey};
pub use selector::{Selection, SelectionDecision, Selector};
pub use state::{CurrentState, Digest, StateStore, StoredState};
