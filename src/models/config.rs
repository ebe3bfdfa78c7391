//! Critic roster configuration
//!
//! The roster is read from the change's own config file when present,
//! otherwise from the installed default roster. A roster that exists but
//! does not parse, or that resolves to zero critics, is fatal.

use super::critic::CriticDefinition;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Config file looked up inside the change directory
pub const CONFIG_FILE_NAME: &str = ".critique.json";

/// Default roster file name installed alongside the binary
pub const DEFAULT_CONFIG_FILE_NAME: &str = "default-critique.json";

/// Errors raised while resolving the critic roster
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read config file: {}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file: {}", path.display())]
    Malformed {
        path: PathBuf,
        line: Option<usize>,
        column: Option<usize>,
        message: String,
    },

    #[error("No critics defined in config: {}", path.display())]
    EmptyRoster { path: PathBuf, fallback: Option<PathBuf> },
}

impl ConfigError {
    /// One-line hint telling the user how to fix the problem
    pub fn hint(&self) -> String {
        match self {
            ConfigError::Unreadable { .. } => "Check file permissions.".to_string(),
            ConfigError::Malformed {
                line: Some(line),
                column: Some(column),
                message,
                ..
            } => format!("Check syntax at line {}, column {}: {}", line, column, message),
            ConfigError::Malformed { message, .. } => format!("Check syntax: {}", message),
            ConfigError::EmptyRoster { path, fallback } => match fallback {
                Some(fallback) => format!(
                    "Add a 'critics' array to {} or {}",
                    path.display(),
                    fallback.display()
                ),
                None => format!("Add a 'critics' array to {}", path.display()),
            },
        }
    }
}

/// Parsed roster plus the pass-through output template
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CritiqueConfig {
    /// Critics in roster order
    #[serde(default)]
    pub critics: Vec<CriticDefinition>,

    /// Template string handed through to downstream consumers
    #[serde(default)]
    pub output_template: String,

    /// File the roster was read from (None when no file existed)
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

impl CritiqueConfig {
    /// Resolve the roster: `primary` if it exists, else `fallback`, else empty
    ///
    /// Fails with `ConfigError::EmptyRoster` when the resolved roster has no critics.
    pub fn load(primary: &Path, fallback: Option<&Path>) -> Result<Self, ConfigError> {
        let chosen = if primary.exists() {
            Some(primary)
        } else {
            fallback.filter(|path| path.exists())
        };

        let config = match chosen {
            Some(path) => {
                tracing::debug!(path = %path.display(), "loading critic roster");
                Self::from_file(path)?
            }
            None => {
                tracing::debug!(primary = %primary.display(), "no roster file found");
                Self::default()
            }
        };

        if config.critics.is_empty() {
            let path = config
                .source
                .clone()
                .unwrap_or_else(|| primary.to_path_buf());
            let fallback = fallback
                .filter(|f| *f != path.as_path())
                .map(Path::to_path_buf);
            return Err(ConfigError::EmptyRoster { path, fallback });
        }

        Ok(config)
    }

    /// Parse a single roster file, YAML or JSON by extension
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let mut config = if is_yaml(path) {
            Self::parse_yaml(path, &content)?
        } else {
            Self::parse_json(path, &content)?
        };
        config.source = Some(path.to_path_buf());
        Ok(config)
    }

    fn parse_json(path: &Path, content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Malformed {
            path: path.to_path_buf(),
            line: Some(e.line()),
            column: Some(e.column()),
            message: e.to_string(),
        })
    }

    fn parse_yaml(path: &Path, content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| {
            let location = e.location();
            ConfigError::Malformed {
                path: path.to_path_buf(),
                line: location.as_ref().map(|l| l.line()),
                column: location.as_ref().map(|l| l.column()),
                message: e.to_string(),
            }
        })
    }
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext == "yaml" || ext == "yml")
}
