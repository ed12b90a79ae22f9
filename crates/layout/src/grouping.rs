//! Row grouping and ordering
//!
//! Partitions normalized records by year and derives the ordered,
//! duplicate-free list of rows (category / workstream pairs) for each year.

use std::collections::{BTreeMap, HashSet};

use crate::normalize::NormalizedRecord;

/// One horizontal lane of the grid: a category / workstream pair
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowKey {
    /// Category as displayed
    pub category: String,
    /// Workstream as displayed
    pub workstream: String,
    pub normalized_category: String,
    pub category_bucket: String,
    pub normalized_workstream: String,
}

impl RowKey {
    /// Build the row key a record belongs to.
    pub fn of(record: &NormalizedRecord) -> Self {
        Self {
            category: record.category.clone(),
            workstream: record.workstream.clone(),
            normalized_category: record.normalized_category.clone(),
            category_bucket: record.category_bucket.clone(),
            normalized_workstream: record.normalized_workstream.clone(),
        }
    }

    /// Check whether a record belongs to this row.
    ///
    /// Identity is the displayed pair, so rows that differ only in casing
    /// stay distinct.
    pub fn matches(&self, record: &NormalizedRecord) -> bool {
        self.category == record.category && self.workstream == record.workstream
    }

    /// The tuple rows are ordered by
    pub fn sort_tuple(&self) -> (&str, &str, &str) {
        (
            self.category_bucket.as_str(),
            self.normalized_category.as_str(),
            self.normalized_workstream.as_str(),
        )
    }
}

/// Split records into per-year groups, preserving record order within a year.
pub fn partition_by_year(records: &[NormalizedRecord]) -> BTreeMap<i32, Vec<NormalizedRecord>> {
    let mut years: BTreeMap<i32, Vec<NormalizedRecord>> = BTreeMap::new();
    for record in records {
        years.entry(record.year()).or_default().push(record.clone());
    }
    years
}

/// Derive the ordered rows for one year's records.
///
/// Rows are deduplicated in first-encounter order and then stably sorted by
/// `(category_bucket, normalized_category, normalized_workstream)`, so rows
/// with equal sort tuples keep the order in which they first appeared.
/// An empty input yields an empty list.
pub fn ordered_row_keys(records: &[NormalizedRecord]) -> Vec<RowKey> {
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut keys: Vec<RowKey> = Vec::new();

    for record in records {
        if seen.insert((record.category.as_str(), record.workstream.as_str())) {
            keys.push(RowKey::of(record));
        }
    }

    // Vec::sort_by is stable
    keys.sort_by(|a, b| a.sort_tuple().cmp(&b.sort_tuple()));
    keys
}
