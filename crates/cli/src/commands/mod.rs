//! Subcommands of the `roadmap` binary

pub mod config;
pub mod plan;
pub mod render;

pub use config::{ConfigCommand, ConfigResult};
pub use plan::{PlanCommand, PlanResult, PlanRow};
pub use render::{RenderCommand, RenderResult};

use chrono::NaiveDate;
use clap::{Args, Subcommand};
use roadmap_layout::YearSelection;

use crate::error::CliResult;
use crate::settings::Settings;

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Lay out every page and write draw requests as JSON Lines
    Render(RenderCommand),
    /// Show how records paginate, without rendering
    Plan(PlanCommand),
    /// Print the effective layout configuration
    Config(ConfigCommand),
}

/// Text a command produced, and the stream it belongs on
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Report {
    Stdout(String),
    /// Used when stdout carries machine-readable output
    Stderr(String),
}

impl Command {
    /// Execute the command against the resolved settings.
    ///
    /// # Errors
    ///
    /// Returns the command's `CliError`.
    pub fn execute(&self, settings: &Settings) -> CliResult<Report> {
        match self {
            Command::Render(cmd) => cmd
                .execute(&settings.config)
                .map(|r| Report::Stderr(r.to_string())),
            Command::Plan(cmd) => cmd
                .execute(&settings.config)
                .map(|r| Report::Stdout(r.to_string())),
            Command::Config(cmd) => cmd.execute(settings).map(|r| Report::Stdout(r.to_string())),
        }
    }
}

/// Year filter shared by `render` and `plan`
#[derive(Debug, Clone, Default, Args)]
pub struct YearArgs {
    /// Only lay out these years (repeatable)
    #[arg(long = "year", value_name = "YEAR", conflicts_with_all = ["from", "to"])]
    pub years: Vec<i32>,

    /// First year of an inclusive span
    #[arg(long, requires = "to")]
    pub from: Option<i32>,

    /// Last year of an inclusive span
    #[arg(long, requires = "from")]
    pub to: Option<i32>,
}

impl YearArgs {
    pub fn selection(&self) -> YearSelection {
        match (self.from, self.to) {
            (Some(from), Some(to)) => YearSelection::Span { from, to },
            _ if !self.years.is_empty() => YearSelection::Explicit(self.years.clone()),
            _ => YearSelection::Present,
        }
    }
}

/// Parse a `YYYY-MM-DD` command-line date.
pub fn parse_day(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|e| format!("expected YYYY-MM-DD, got '{}': {}", s, e))
}
