//! Layout configuration file resolution
//!
//! The configuration is looked up in this order:
//! 1. `--config <path>`
//! 2. `ROADMAP_CONFIG` environment variable (if non-empty)
//! 3. `<git project root>/.roadmap/layout.json` if it exists
//! 4. `<user config dir>/roadmap/layout.json` if it exists
//! 5. Built-in defaults

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use roadmap_layout::LayoutConfig;
use tracing::debug;

use crate::error::{CliError, CliResult};

/// Environment variable name for the configuration file path
pub const CONFIG_ENV: &str = "ROADMAP_CONFIG";

/// Configuration path relative to the project root
pub const PROJECT_CONFIG_PATH: &str = ".roadmap/layout.json";

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Flag(PathBuf),
    Env(PathBuf),
    Project(PathBuf),
    User(PathBuf),
    Defaults,
}

impl ConfigSource {
    /// File backing this source, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigSource::Flag(p)
            | ConfigSource::Env(p)
            | ConfigSource::Project(p)
            | ConfigSource::User(p) => Some(p),
            ConfigSource::Defaults => None,
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.path() {
            Some(path) => write!(f, "{}", path.display()),
            None => write!(f, "built-in defaults"),
        }
    }
}

/// The configuration in effect for a run
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: LayoutConfig,
    pub source: ConfigSource,
}

impl Settings {
    /// Resolve, load and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Read` or `CliError::ConfigFile` when the chosen
    /// file cannot be read or parsed, and `CliError::Layout` when its values
    /// are invalid.
    pub fn load(cli_config: Option<PathBuf>) -> CliResult<Self> {
        let source = resolve_config_source(cli_config);
        let config = load_config(&source)?;
        Ok(Self { config, source })
    }
}

/// Find the project root by looking for a git repository.
///
/// Returns the root directory of the git repository containing the current
/// directory, or `None` if not in a git repository.
pub fn find_project_root() -> Option<PathBuf> {
    let output = Command::new("git")
        .args(["rev-parse", "--show-toplevel"])
        .output()
        .ok()?;

    if output.status.success() {
        let path_str = String::from_utf8(output.stdout).ok()?;
        Some(PathBuf::from(path_str.trim()))
    } else {
        None
    }
}

/// Pick the configuration source by priority.
pub fn resolve_config_source(cli_config: Option<PathBuf>) -> ConfigSource {
    if let Some(path) = cli_config {
        return ConfigSource::Flag(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV)
        && !env_path.is_empty()
    {
        return ConfigSource::Env(PathBuf::from(env_path));
    }

    discover_config(find_project_root(), dirs::config_dir())
}

/// Look for an existing config file under the project root, then the user
/// config directory.
fn discover_config(project_root: Option<PathBuf>, user_dir: Option<PathBuf>) -> ConfigSource {
    if let Some(path) = project_root
        .map(|root| root.join(PROJECT_CONFIG_PATH))
        .filter(|p| p.is_file())
    {
        return ConfigSource::Project(path);
    }

    if let Some(path) = user_dir
        .map(|dir| dir.join("roadmap").join("layout.json"))
        .filter(|p| p.is_file())
    {
        return ConfigSource::User(path);
    }

    ConfigSource::Defaults
}

/// Read and validate the configuration behind `source`.
///
/// # Errors
///
/// See [`Settings::load`].
pub fn load_config(source: &ConfigSource) -> CliResult<LayoutConfig> {
    let config = match source.path() {
        Some(path) => {
            debug!("Loading layout configuration from {}", path.display());
            let text = std::fs::read_to_string(path).map_err(|e| CliError::Read {
                path: path.to_path_buf(),
                source: e,
            })?;
            serde_json::from_str(&text).map_err(|e| CliError::ConfigFile {
                path: path.to_path_buf(),
                source: e,
            })?
        }
        None => LayoutConfig::default(),
    };
    config.validate()?;
    Ok(config)
}
