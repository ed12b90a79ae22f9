//! Render command
//!
//! Implements `roadmap render`: loads milestone records, lays out every page
//! and writes the draw requests as JSON Lines. Each page starts with a
//! `{"type":"page"}` header line followed by its requests in drawing order.

use std::io::Write;
use std::path::PathBuf;

use chrono::NaiveDate;
use clap::Args;
use roadmap_layout::{DrawRequest, Emu, LayoutConfig, RenderedPage, plan_normalized, render_page};
use serde::Serialize;
use tracing::info;

use super::{YearArgs, parse_day};
use crate::error::{CliError, CliResult};
use crate::input::load_records;

/// Lay out roadmap pages and write draw requests
#[derive(Debug, Args)]
pub struct RenderCommand {
    /// Input file of JSON Lines records (reads from stdin if not specified)
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Output file path (defaults to stdout if not specified)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub years: YearArgs,

    /// Reference date for the today line (defaults to the local date)
    #[arg(long, value_parser = parse_day)]
    pub today: Option<NaiveDate>,

    /// Do not draw the today line
    #[arg(long, conflicts_with = "today")]
    pub no_today: bool,
}

/// Header line written before each page's draw requests
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename = "page")]
pub struct PageHeader<'a> {
    pub year: i32,
    pub page: usize,
    pub total: usize,
    pub title: &'a str,
    pub width: Emu,
    pub height: Emu,
    pub rows: usize,
    pub milestones: usize,
}

impl<'a> PageHeader<'a> {
    fn of(page: &'a RenderedPage) -> Self {
        Self {
            year: page.year,
            page: page.number,
            total: page.total,
            title: &page.title,
            width: page.geometry.canvas_width,
            height: page.geometry.canvas_height,
            rows: page.rows.len(),
            milestones: page.milestones.len(),
        }
    }
}

/// Result of the render command
#[derive(Debug)]
pub struct RenderResult {
    pub pages: usize,
    pub milestones: usize,
    /// Labels that overlap another label
    pub overlapping_labels: usize,
    /// Labels drawn outside their own row band
    pub labels_outside_rows: usize,
    pub source: String,
    pub destination: String,
}

impl std::fmt::Display for RenderResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Render complete!")?;
        writeln!(f, "  Pages: {}", self.pages)?;
        writeln!(f, "  Milestones: {}", self.milestones)?;
        if self.overlapping_labels > 0 {
            writeln!(f, "  Overlapping labels: {}", self.overlapping_labels)?;
        }
        if self.labels_outside_rows > 0 {
            writeln!(f, "  Labels outside their row: {}", self.labels_outside_rows)?;
        }
        writeln!(f, "  Input: {}", self.source)?;
        write!(f, "  Output: {}", self.destination)
    }
}

/// Write pages as JSON Lines to any writer.
///
/// # Errors
///
/// Returns `CliError::Serialize` if a record cannot be serialized and the
/// writer's I/O error, tagged with `target`, if writing fails.
pub fn write_pages<W: Write>(
    writer: &mut W,
    pages: &[RenderedPage],
    target: &std::path::Path,
) -> CliResult<()> {
    let write_err = |e: std::io::Error| CliError::Write {
        path: target.to_path_buf(),
        source: e,
    };
    for page in pages {
        let header = serde_json::to_string(&PageHeader::of(page)).map_err(CliError::Serialize)?;
        writeln!(writer, "{}", header).map_err(write_err)?;
        for request in &page.requests {
            let json = serde_json::to_string::<DrawRequest>(request).map_err(CliError::Serialize)?;
            writeln!(writer, "{}", json).map_err(write_err)?;
        }
    }
    writer.flush().map_err(write_err)
}

impl RenderCommand {
    /// Reference date passed to the renderer
    fn reference_date(&self) -> Option<NaiveDate> {
        if self.no_today {
            None
        } else {
            Some(
                self.today
                    .unwrap_or_else(|| chrono::Local::now().date_naive()),
            )
        }
    }

    /// Execute the render command.
    ///
    /// # Arguments
    ///
    /// * `config` - Validated layout configuration
    ///
    /// # Errors
    ///
    /// Returns `CliError` if the input cannot be read, a record is invalid,
    /// or the output cannot be written. Nothing is written when any record
    /// is invalid.
    pub fn execute(&self, config: &LayoutConfig) -> CliResult<RenderResult> {
        let input = load_records(self.input.as_deref())?;
        let normalized = input.normalize()?;
        let pages = plan_normalized(&normalized, config, &self.years.selection())?;

        let today = self.reference_date();
        let rendered = pages
            .iter()
            .map(|page| render_page(page, config, today))
            .collect::<Result<Vec<_>, _>>()?;

        let destination = match &self.output {
            Some(path) => {
                let file = std::fs::File::create(path).map_err(|e| CliError::Write {
                    path: path.clone(),
                    source: e,
                })?;
                let mut writer = std::io::BufWriter::new(file);
                write_pages(&mut writer, &rendered, path)?;
                path.display().to_string()
            }
            None => {
                let stdout = std::io::stdout();
                let mut writer = stdout.lock();
                write_pages(&mut writer, &rendered, std::path::Path::new("<stdout>"))?;
                "stdout".to_string()
            }
        };

        let result = RenderResult {
            pages: rendered.len(),
            milestones: rendered.iter().map(|p| p.milestones.len()).sum(),
            overlapping_labels: rendered.iter().map(RenderedPage::fallbacks).sum(),
            labels_outside_rows: rendered.iter().map(RenderedPage::labels_outside_rows).sum(),
            source: input.source,
            destination,
        };
        info!(
            "Rendered {} page(s) with {} milestone(s)",
            result.pages, result.milestones
        );
        Ok(result)
    }
}
