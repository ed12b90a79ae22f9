//! Config command
//!
//! Implements `roadmap config`: prints where the layout configuration came
//! from and its effective values as JSON.

use clap::Args;
use roadmap_layout::LayoutConfig;

use crate::error::{CliError, CliResult};
use crate::settings::{ConfigSource, Settings};

/// Print the effective layout configuration
#[derive(Debug, Args)]
pub struct ConfigCommand {
    /// Print only the configuration source
    #[arg(long)]
    pub source_only: bool,
}

/// Result of the config command
#[derive(Debug)]
pub struct ConfigResult {
    pub source: ConfigSource,
    /// Pretty-printed configuration, absent with `--source-only`
    pub json: Option<String>,
}

impl std::fmt::Display for ConfigResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.json {
            Some(json) => {
                writeln!(f, "# source: {}", self.source)?;
                write!(f, "{}", json)
            }
            None => write!(f, "{}", self.source),
        }
    }
}

/// Serialize a configuration the way it is read back from disk
pub fn config_to_json(config: &LayoutConfig) -> CliResult<String> {
    serde_json::to_string_pretty(config).map_err(CliError::Serialize)
}

impl ConfigCommand {
    /// Execute the config command.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Serialize` if the configuration cannot be serialized.
    pub fn execute(&self, settings: &Settings) -> CliResult<ConfigResult> {
        let json = if self.source_only {
            None
        } else {
            Some(config_to_json(&settings.config)?)
        };
        Ok(ConfigResult {
            source: settings.source.clone(),
            json,
        })
    }
}
