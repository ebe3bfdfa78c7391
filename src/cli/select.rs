//! Select critics for a change directory
//!
//! Loads the roster and the stored hashes, fingerprints the directory, prints
//! the decision trail to stderr and the selection to stdout, then writes the
//! new hashes back if anything was selected.

use crate::models::{ConfigError, CritiqueConfig, CONFIG_FILE_NAME, DEFAULT_CONFIG_FILE_NAME};
use crate::report::{render_output, Reporter};
use crate::selector::Selector;
use crate::state::{CurrentState, FingerprintError, StateStore};
use crate::Result;
use clap::Args;
use std::path::{Path, PathBuf};

#[derive(Args, Debug, Clone)]
pub struct SelectArgs {
    /// Path to the change directory
    pub change_dir: PathBuf,

    /// Config file path (default: <CHANGE_DIR>/.critique.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Roster used when the config file does not exist
    #[arg(long, env = "CRITIQUE_DEFAULTS")]
    pub defaults: Option<PathBuf>,

    /// Select all critics regardless of hash changes
    #[arg(short, long)]
    pub force: bool,

    /// Do not update stored hashes
    #[arg(long)]
    pub dry_run: bool,

    /// List critic names only
    #[arg(short, long)]
    pub list: bool,
}

/// Fatal errors raised by the command itself
#[derive(Debug, thiserror::Error)]
pub enum SelectError {
    #[error("Change directory not found: {}", .0.display())]
    ChangeDirNotFound(PathBuf),
}

impl SelectArgs {
    /// Config file to try first
    pub fn primary_config(&self, change_dir: &Path) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| change_dir.join(CONFIG_FILE_NAME))
    }

    /// Roster to fall back on: explicit flag, else the one installed next to the binary
    pub fn fallback_config(&self) -> Option<PathBuf> {
        self.defaults.clone().or_else(|| {
            let exe = std::env::current_exe().ok()?;
            installed_defaults(&exe)
        })
    }
}

/// `<install root>/default-critique.json` for a binary at `<install root>/bin/critique`
pub fn installed_defaults(exe: &Path) -> Option<PathBuf> {
    Some(exe.parent()?.parent()?.join(DEFAULT_CONFIG_FILE_NAME))
}

pub fn run(args: &SelectArgs) -> Result<()> {
    if !args.change_dir.is_dir() {
        return Err(SelectError::ChangeDirNotFound(args.change_dir.clone()).into());
    }
    let change_dir = std::fs::canonicalize(&args.change_dir)?;

    let primary = args.primary_config(&change_dir);
    let fallback = args.fallback_config();
    let config = CritiqueConfig::load(&primary, fallback.as_deref())?;

    let mut reporter = Reporter::stderr();

    let store = StateStore::for_change(&change_dir);
    let stored = store.resolve();
    if let Some(err) = stored.warning() {
        reporter.warning(format!("{}, treating all files as changed.", err))?;
    }

    let current = CurrentState::scan(&change_dir)?;
    let selection = Selector::new(args.force).select(&config, &current, &stored);
    reporter.decisions(&selection)?;

    if selection.should_persist(args.dry_run) {
        if let Err(err) = store.save(&current) {
            reporter.warning(format!("{}. Hashes not saved.", err))?;
        }
    }

    println!("{}", render_output(&config, &selection, args.list)?);
    Ok(())
}

/// Hint printed under a fatal error
pub fn fix_hint(err: &anyhow::Error) -> Option<String> {
    if let Some(err) = err.downcast_ref::<SelectError>() {
        return match err {
            SelectError::ChangeDirNotFound(_) => Some(
                "Verify the path exists. Expected a change directory.".to_string(),
            ),
        };
    }
    if let Some(err) = err.downcast_ref::<ConfigError>() {
        return Some(err.hint());
    }
    if let Some(FingerprintError::Io { path, .. }) = err.downcast_ref::<FingerprintError>() {
        return Some(format!("Check that {} is readable.", path.display()));
    }
    None
}
