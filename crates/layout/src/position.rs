//! Date to canvas position mapping

use chrono::{Datelike, NaiveDate};

use crate::geometry::GridGeometry;
use crate::models::{Emu, Point};

/// Number of days in a Gregorian month, or 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next.map_or(31, |n| (n - first).num_days() as u32)
}

/// Position of a day within its month: 0.0 on the 1st, 1.0 on the last day.
///
/// Months of one day or fewer map to 0.0.
pub fn fraction_of_month(day: u32, days: u32) -> f64 {
    if days <= 1 {
        return 0.0;
    }
    f64::from(day.saturating_sub(1)) / f64::from(days - 1)
}

/// Day fraction of a date within its own month
pub fn day_fraction(date: NaiveDate) -> f64 {
    fraction_of_month(date.day(), days_in_month(date.year(), date.month()))
}

/// Horizontal marker position of a date
pub fn date_x(geom: &GridGeometry, date: NaiveDate) -> Emu {
    let month_idx = date.month0() as usize;
    let offset = (day_fraction(date) * geom.month_width() as f64).round() as Emu;
    geom.month_left(month_idx) + offset
}

/// Marker center for a date on row `row` of the page
pub fn marker_center(geom: &GridGeometry, date: NaiveDate, row: usize) -> Point {
    Point::new(date_x(geom, date), geom.row_center(row))
}
