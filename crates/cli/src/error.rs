use std::path::PathBuf;

use roadmap_layout::LayoutError;
use thiserror::Error;

/// Errors surfaced by the `roadmap` command
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid records or layout configuration
    #[error(transparent)]
    Layout(#[from] LayoutError),

    /// A file could not be opened or read
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An output file could not be created or written
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A line of the input is not a valid milestone record
    #[error("Error parsing line {line} of {path}: {source}")]
    ParseRecord {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// The layout configuration file is not valid JSON for `LayoutConfig`
    #[error("Invalid configuration file {path}: {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Output could not be serialized
    #[error("JSON serialization error: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl CliError {
    /// Get the full error message for display to users.
    pub fn full_message(&self) -> String {
        match self {
            CliError::Layout(err) => err.full_message(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;
