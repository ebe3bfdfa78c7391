pub mod config;
pub mod critic;

pub use config::{ConfigError, CritiqueConfig, CONFIG_FILE_NAME, DEFAULT_CONFIG_FILE_NAME};
pub use critic::{CriticDefinition, FileKey, TrackedKey, TrackedSource};
