//! Pagination of a year's rows into fixed-capacity pages

use std::collections::HashMap;

use tracing::debug;

use crate::error::{LayoutError, LayoutResult};
use crate::grouping::RowKey;
use crate::normalize::NormalizedRecord;

/// A milestone placed on a page, with the index of its row on that page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    /// 0-based row index within the page
    pub row: usize,
    pub record: NormalizedRecord,
}

/// One page of one year
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub year: i32,
    /// 1-based page number within the year
    pub number: usize,
    /// Number of pages the year was split into
    pub total: usize,
    /// Rows on this page, in display order
    pub rows: Vec<RowKey>,
    /// Milestones ordered by (row, date)
    pub entries: Vec<PageEntry>,
}

impl Page {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Split an ordered row list into chunks of at most `capacity` rows.
///
/// Always returns at least one chunk, which is empty when there are no rows.
///
/// # Errors
///
/// Returns `LayoutError::Configuration` when `capacity` is zero.
pub fn chunk_rows(rows: &[RowKey], capacity: usize) -> LayoutResult<Vec<Vec<RowKey>>> {
    if capacity == 0 {
        return Err(LayoutError::configuration("rows_per_page must be at least 1"));
    }
    if rows.is_empty() {
        return Ok(vec![Vec::new()]);
    }
    Ok(rows.chunks(capacity).map(<[RowKey]>::to_vec).collect())
}

/// Build the pages of one year.
///
/// # Arguments
///
/// * `year` - The year being paginated
/// * `rows` - The year's rows in display order
/// * `records` - The year's records, in any order
/// * `capacity` - Maximum rows per page
///
/// # Errors
///
/// Returns `LayoutError::Configuration` when `capacity` is zero.
pub fn paginate_year(
    year: i32,
    rows: &[RowKey],
    records: &[NormalizedRecord],
    capacity: usize,
) -> LayoutResult<Vec<Page>> {
    let chunks = chunk_rows(rows, capacity)?;
    let total = chunks.len();
    debug!(
        "Paginating {}: {} rows into {} page(s)",
        year,
        rows.len(),
        total
    );

    let pages = chunks
        .into_iter()
        .enumerate()
        .map(|(i, page_rows)| {
            let positions: HashMap<(&str, &str), usize> = page_rows
                .iter()
                .enumerate()
                .map(|(idx, key)| ((key.category.as_str(), key.workstream.as_str()), idx))
                .collect();

            let mut entries: Vec<PageEntry> = records
                .iter()
                .filter_map(|record| {
                    positions
                        .get(&(record.category.as_str(), record.workstream.as_str()))
                        .map(|&row| PageEntry {
                            row,
                            record: record.clone(),
                        })
                })
                .collect();
            entries.sort_by_key(|entry| (entry.row, entry.record.date));

            Page {
                year,
                number: i + 1,
                total,
                rows: page_rows,
                entries,
            }
        })
        .collect();

    Ok(pages)
}
