//! Plan command
//!
//! Implements `roadmap plan`: shows how records split into years and pages
//! without computing any geometry.

use std::path::PathBuf;

use clap::Args;
use roadmap_layout::{LayoutConfig, Page, plan_normalized};

use super::YearArgs;
use crate::error::CliResult;
use crate::input::load_records;
use crate::output::format_plan_table;

/// Show the pagination of a roadmap
#[derive(Debug, Args)]
pub struct PlanCommand {
    /// Input file of JSON Lines records (reads from stdin if not specified)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    #[command(flatten)]
    pub years: YearArgs,
}

/// One line of the plan table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRow {
    pub year: i32,
    /// Page counter, such as `2/3`
    pub page: String,
    pub rows: usize,
    pub milestones: usize,
    /// `category / workstream` of the first row on the page
    pub first_row: String,
}

impl PlanRow {
    fn of(page: &Page) -> Self {
        Self {
            year: page.year,
            page: format!("{}/{}", page.number, page.total),
            rows: page.row_count(),
            milestones: page.entries.len(),
            first_row: page
                .rows
                .first()
                .map(|r| format!("{} / {}", r.category, r.workstream))
                .unwrap_or_else(|| "-".to_string()),
        }
    }
}

/// Result of the plan command
#[derive(Debug)]
pub struct PlanResult {
    pub rows: Vec<PlanRow>,
}

impl std::fmt::Display for PlanResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", format_plan_table(&self.rows))
    }
}

impl PlanCommand {
    /// Execute the plan command.
    ///
    /// # Errors
    ///
    /// Returns `CliError` if the input cannot be read or a record is invalid.
    pub fn execute(&self, config: &LayoutConfig) -> CliResult<PlanResult> {
        let input = load_records(self.input.as_deref())?;
        let normalized = input.normalize()?;
        let pages = plan_normalized(&normalized, config, &self.years.selection())?;
        Ok(PlanResult {
            rows: pages.iter().map(PlanRow::of).collect(),
        })
    }
}
