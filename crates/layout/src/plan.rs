//! Whole-roadmap planning
//!
//! Chains the stages for every selected year: validate the configuration,
//! normalize all records, partition by year, order rows, paginate, and
//! optionally render each page.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::error::{LayoutError, LayoutResult};
use crate::grouping::{ordered_row_keys, partition_by_year};
use crate::models::MilestoneRecord;
use crate::normalize::{MAX_YEAR, MIN_YEAR, NormalizedRecord, normalize_all};
use crate::paginate::{Page, paginate_year};
use crate::render::{RenderedPage, render_page};

/// Which years get pages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum YearSelection {
    /// Every year that has at least one record
    #[default]
    Present,
    /// These years, whether or not they have records
    Explicit(Vec<i32>),
    /// Every year in `from..=to`
    Span { from: i32, to: i32 },
}

impl YearSelection {
    /// Resolve the selection against the years present in the data.
    ///
    /// # Errors
    ///
    /// Returns `LayoutError::Configuration` for an empty span or a year
    /// outside the supported range.
    pub fn resolve(&self, present: impl IntoIterator<Item = i32>) -> LayoutResult<BTreeSet<i32>> {
        let years: BTreeSet<i32> = match self {
            YearSelection::Present => return Ok(present.into_iter().collect()),
            YearSelection::Explicit(years) => years.iter().copied().collect(),
            YearSelection::Span { from, to } => {
                if from > to {
                    return Err(LayoutError::configuration(format!(
                        "year span {}..{} is empty",
                        from, to
                    )));
                }
                (*from..=*to).collect()
            }
        };

        if let Some(year) = years.iter().find(|y| !(MIN_YEAR..=MAX_YEAR).contains(*y)) {
            return Err(LayoutError::configuration(format!(
                "year {} is outside {}..={}",
                year, MIN_YEAR, MAX_YEAR
            )));
        }
        Ok(years)
    }
}

/// Normalize, group and paginate `records` into pages.
///
/// Rows are numbered from 1 in slice order. Pages come out ordered by year,
/// then page number. Any invalid record aborts the whole plan so no partial
/// set of pages is produced.
///
/// # Errors
///
/// Returns the first normalization error, or `LayoutError::Configuration`
/// when the configuration or year selection is invalid.
pub fn plan_pages(
    records: &[MilestoneRecord],
    config: &LayoutConfig,
    selection: &YearSelection,
) -> LayoutResult<Vec<Page>> {
    config.validate()?;
    let normalized = normalize_all(records)?;
    plan_normalized(&normalized, config, selection)
}

/// Group and paginate records that were already normalized.
///
/// Callers that number rows themselves (by source line, for instance)
/// normalize first and plan with this.
///
/// # Errors
///
/// Returns `LayoutError::Configuration` when the configuration or year
/// selection is invalid.
pub fn plan_normalized(
    normalized: &[NormalizedRecord],
    config: &LayoutConfig,
    selection: &YearSelection,
) -> LayoutResult<Vec<Page>> {
    config.validate()?;
    let mut by_year = partition_by_year(normalized);
    let years = selection.resolve(by_year.keys().copied())?;

    let skipped: usize = by_year
        .iter()
        .filter(|(year, _)| !years.contains(*year))
        .map(|(year, recs)| {
            debug!("Skipping {} record(s) from unselected year {}", recs.len(), year);
            recs.len()
        })
        .sum();

    let mut pages = Vec::new();
    for year in years {
        let year_records = by_year.remove(&year).unwrap_or_default();
        let rows = ordered_row_keys(&year_records);
        pages.extend(paginate_year(
            year,
            &rows,
            &year_records,
            config.rows_per_page,
        )?);
    }

    debug!(
        "Planned {} page(s) from {} record(s), {} skipped",
        pages.len(),
        normalized.len(),
        skipped
    );
    Ok(pages)
}

/// Plan and render every page.
///
/// # Errors
///
/// Same as [`plan_pages`].
pub fn render_roadmap(
    records: &[MilestoneRecord],
    config: &LayoutConfig,
    selection: &YearSelection,
    today: Option<NaiveDate>,
) -> LayoutResult<Vec<RenderedPage>> {
    plan_pages(records, config, selection)?
        .iter()
        .map(|page| render_page(page, config, today))
        .collect()
}
