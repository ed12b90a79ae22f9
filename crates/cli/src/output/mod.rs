//! Output formatting module
//!
//! Provides table formatting for the `plan` command.

use crate::commands::PlanRow;

/// Maximum width for the first-row column before truncation
const MAX_FIRST_ROW_WIDTH: usize = 40;

/// Truncate a string to at most `max_width` characters, adding an ellipsis
/// if needed.
fn truncate(s: &str, max_width: usize) -> String {
    let count = s.chars().count();
    if count <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        s.chars().take(max_width).collect()
    } else {
        let kept: String = s.chars().take(max_width - 3).collect();
        format!("{}...", kept)
    }
}

/// Format plan rows into an aligned table string.
///
/// Produces output in the format:
/// ```text
/// Year  Page  Rows  Milestones  First row
/// ----  ----  ----  ----------  --------------
/// 2025  1/2     30          84  Build / API
/// ```
pub fn format_plan_table(rows: &[PlanRow]) -> String {
    if rows.is_empty() {
        return "No pages planned.".to_string();
    }

    let headers = ["Year", "Page", "Rows", "Milestones", "First row"];

    let year_width = rows
        .iter()
        .map(|r| r.year.to_string().len())
        .max()
        .unwrap_or(0)
        .max(headers[0].len());

    let page_width = rows
        .iter()
        .map(|r| r.page.len())
        .max()
        .unwrap_or(0)
        .max(headers[1].len());

    let rows_width = rows
        .iter()
        .map(|r| r.rows.to_string().len())
        .max()
        .unwrap_or(0)
        .max(headers[2].len());

    let milestones_width = headers[3].len();

    let first_width = rows
        .iter()
        .map(|r| r.first_row.chars().count().min(MAX_FIRST_ROW_WIDTH))
        .max()
        .unwrap_or(0)
        .max(headers[4].len());

    let mut output = String::new();

    output.push_str(&format!(
        "{:<year_w$}  {:<page_w$}  {:<rows_w$}  {:<ms_w$}  {}\n",
        headers[0],
        headers[1],
        headers[2],
        headers[3],
        headers[4],
        year_w = year_width,
        page_w = page_width,
        rows_w = rows_width,
        ms_w = milestones_width,
    ));

    output.push_str(&format!(
        "{:->year_w$}  {:->page_w$}  {:->rows_w$}  {:->ms_w$}  {:->first_w$}\n",
        "",
        "",
        "",
        "",
        "",
        year_w = year_width,
        page_w = page_width,
        rows_w = rows_width,
        ms_w = milestones_width,
        first_w = first_width,
    ));

    for row in rows {
        output.push_str(&format!(
            "{:<year_w$}  {:<page_w$}  {:>rows_w$}  {:>ms_w$}  {}\n",
            row.year,
            row.page,
            row.rows,
            row.milestones,
            truncate(&row.first_row, MAX_FIRST_ROW_WIDTH),
            year_w = year_width,
            page_w = page_width,
            rows_w = rows_width,
            ms_w = milestones_width,
        ));
    }

    // Remove trailing newline
    output.pop();

    output
}
