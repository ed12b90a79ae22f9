//! Record normalization
//!
//! Cleans raw milestone records: trims and collapses whitespace in display
//! text, derives case-folded sort keys and the category bucket, and parses
//! dates. A record that cannot be normalized stops the whole run.

use chrono::{Datelike, Duration, NaiveDate};
use tracing::{trace, warn};

use crate::error::{LayoutError, LayoutResult};
use crate::models::{DateValue, MilestoneKind, MilestoneRecord, Status};

/// Earliest year accepted on a milestone
pub const MIN_YEAR: i32 = 1900;

/// Latest year accepted on a milestone
pub const MAX_YEAR: i32 = 2200;

/// Largest spreadsheet serial day number (9999-12-31)
const MAX_SERIAL: f64 = 2_958_465.0;

/// Text formats tried, in order, for date strings
const DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d-%b-%Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%B %d, %Y",
];

/// A milestone with clean display text, parsed date and derived sort keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedRecord {
    /// 1-based position of the record in its source
    pub row: usize,
    /// Category as displayed (original casing, whitespace collapsed)
    pub category: String,
    /// Workstream as displayed
    pub workstream: String,
    /// Title as displayed; empty when the source had none
    pub title: String,
    pub date: NaiveDate,
    pub status: Status,
    pub kind: MilestoneKind,
    /// Case-folded category used for sorting
    pub normalized_category: String,
    /// Leading alphanumeric run of the normalized category
    pub category_bucket: String,
    /// Case-folded workstream used for sorting
    pub normalized_workstream: String,
}

impl NormalizedRecord {
    pub fn year(&self) -> i32 {
        self.date.year()
    }

    /// 0-based month column index
    pub fn month_index(&self) -> usize {
        self.date.month0() as usize
    }
}

/// Trim a string and collapse internal whitespace runs to single spaces.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Build a case-folded sort key.
///
/// Underscores and hyphens count as spaces so that "Data-Platform" and
/// "data platform" sort together. Lowercasing is followed by the full case
/// folds that differ from it, so "Straße" and "STRASSE" share a key.
pub fn sort_key(s: &str) -> String {
    let mut folded = String::with_capacity(s.len());
    for c in s
        .chars()
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .flat_map(char::to_lowercase)
    {
        match c {
            'ß' => folded.push_str("ss"),
            'ς' => folded.push('σ'),
            'ﬀ' => folded.push_str("ff"),
            'ﬁ' => folded.push_str("fi"),
            'ﬂ' => folded.push_str("fl"),
            'ﬅ' | 'ﬆ' => folded.push_str("st"),
            other => folded.push(other),
        }
    }
    collapse_whitespace(&folded)
}

/// Derive the type bucket of a normalized category.
///
/// The bucket is the first maximal run of alphanumeric characters, so
/// "build (phase 2)" and "build/ops" both land in "build". Leading
/// punctuation is skipped; a category with no alphanumerics is its own bucket.
pub fn category_bucket(normalized_category: &str) -> String {
    let bucket: String = normalized_category
        .chars()
        .skip_while(|c| !c.is_alphanumeric())
        .take_while(|c| c.is_alphanumeric())
        .collect();
    if bucket.is_empty() {
        normalized_category.to_string()
    } else {
        bucket
    }
}

/// Convert a spreadsheet serial day number (1900 date system) to a date.
///
/// Serial 60 is the spreadsheet's phantom 1900-02-29 and has no date.
fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > MAX_SERIAL {
        return None;
    }
    let days = serial.floor() as i64;
    let base = match days {
        60 => return None,
        d if d < 60 => NaiveDate::from_ymd_opt(1899, 12, 31)?,
        _ => NaiveDate::from_ymd_opt(1899, 12, 30)?,
    };
    base.checked_add_signed(Duration::days(days))
}

/// Parse a date from text, trying each known format.
///
/// Datetimes are accepted with the time part ignored. Bare integers are
/// rejected: spreadsheet serials only arrive as numbers, and text such as
/// "2025" is a year, not a day count.
fn date_from_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() || text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let date_part = text
        .split(['T', ' '])
        .next()
        .filter(|head| head.len() < text.len() && head.contains('-'));
    if let Some(head) = date_part
        && let Ok(date) = NaiveDate::parse_from_str(head, "%Y-%m-%d")
    {
        return Some(date);
    }

    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// Parse a raw date value, rejecting years outside the supported range.
pub fn parse_date(value: &DateValue) -> Option<NaiveDate> {
    let date = match value {
        DateValue::Serial(serial) => date_from_serial(*serial),
        DateValue::Text(text) => date_from_text(text),
    }?;
    (MIN_YEAR..=MAX_YEAR).contains(&date.year()).then_some(date)
}

/// Return the collapsed text of a required field, or a `MissingField` error.
fn required(value: Option<&str>, row: usize, field: &'static str) -> LayoutResult<String> {
    let text = value.map(collapse_whitespace).unwrap_or_default();
    if text.is_empty() {
        return Err(LayoutError::MissingField { row, field });
    }
    Ok(text)
}

/// Normalize one raw record.
///
/// # Arguments
///
/// * `record` - The raw record
/// * `row` - 1-based position of the record in its source, used in errors
///
/// # Errors
///
/// Returns `LayoutError::MissingField` when category, workstream or date is
/// absent or blank, and `LayoutError::InvalidDate` when the date does not
/// parse or falls outside the supported years.
pub fn normalize(record: &MilestoneRecord, row: usize) -> LayoutResult<NormalizedRecord> {
    let category = required(record.category.as_deref(), row, "category")?;
    let workstream = required(record.workstream.as_deref(), row, "workstream")?;

    let raw_date = match &record.date {
        Some(DateValue::Text(text)) if text.trim().is_empty() => None,
        other => other.as_ref(),
    }
    .ok_or(LayoutError::MissingField { row, field: "date" })?;

    let date = parse_date(raw_date).ok_or_else(|| LayoutError::InvalidDate {
        row,
        category: category.clone(),
        workstream: workstream.clone(),
        value: raw_date.to_string(),
    })?;

    let status = match record.status.as_deref() {
        Some(raw) => {
            let status = Status::parse(raw);
            if status == Status::Unknown {
                warn!(
                    "Unrecognized status '{}' on row {}, using neutral color",
                    raw, row
                );
            }
            status
        }
        None => Status::Unknown,
    };
    let kind = record
        .kind
        .as_deref()
        .map(MilestoneKind::parse)
        .unwrap_or(MilestoneKind::Regular);

    let normalized_category = sort_key(&category);
    let category_bucket = category_bucket(&normalized_category);
    let normalized_workstream = sort_key(&workstream);

    trace!(
        "Normalized row {}: {} / {} on {}",
        row,
        category,
        workstream,
        date
    );

    Ok(NormalizedRecord {
        row,
        title: record
            .title
            .as_deref()
            .map(collapse_whitespace)
            .unwrap_or_default(),
        category,
        workstream,
        date,
        status,
        kind,
        normalized_category,
        category_bucket,
        normalized_workstream,
    })
}

/// Normalize every record, numbering rows from 1 in slice order.
///
/// Stops at the first record that fails.
pub fn normalize_all(records: &[MilestoneRecord]) -> LayoutResult<Vec<NormalizedRecord>> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| normalize(record, i + 1))
        .collect()
}
