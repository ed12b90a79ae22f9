//! Grid geometry planning
//!
//! Apportions the fixed canvas among the title and legend bands, the
//! sidebar table, the month header and the grid rows for a page with a
//! given number of rows. All arithmetic is in integer layout units; any
//! remainder from dividing a span goes into the last month column or the
//! last row, so the grid always ends exactly on its computed bound.

use crate::config::{LayoutConfig, RowHeightPolicy};
use crate::error::{LayoutError, LayoutResult};
use crate::models::{Emu, Rect, inches};

/// Number of month columns on every page
pub const MONTHS: usize = 12;

/// A horizontal or vertical extent: start edge and length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: Emu,
    pub len: Emu,
}

impl Span {
    pub fn new(start: Emu, len: Emu) -> Self {
        Self { start, len }
    }

    /// Exclusive end edge
    pub fn end(&self) -> Emu {
        self.start + self.len
    }

    pub fn center(&self) -> Emu {
        self.start + self.len / 2
    }
}

/// Absolute layout of one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridGeometry {
    pub canvas_width: Emu,
    pub canvas_height: Emu,
    pub title: Rect,
    pub legend: Rect,
    /// Sidebar "Type" column
    pub category_column: Span,
    /// Sidebar "Workstream" column
    pub workstream_column: Span,
    /// Month header band above the month columns
    pub header: Rect,
    /// The twelve month columns, January first
    pub months: [Span; MONTHS],
    /// Row bands, top to bottom
    pub rows: Vec<Span>,
    /// The page actually has no rows; `rows` then holds one placeholder band
    pub empty: bool,
}

impl GridGeometry {
    pub fn month_left(&self, month_idx: usize) -> Emu {
        self.months[month_idx].start
    }

    /// Width of a month column. All columns share this width except the
    /// last, which also absorbs the division remainder.
    pub fn month_width(&self) -> Emu {
        self.months[0].len
    }

    pub fn row_top(&self, row: usize) -> Emu {
        self.rows[row].start
    }

    pub fn row_height(&self, row: usize) -> Emu {
        self.rows[row].len
    }

    pub fn row_center(&self, row: usize) -> Emu {
        self.rows[row].center()
    }

    /// Top of the first row, directly below the month header
    pub fn grid_top(&self) -> Emu {
        self.header.y1
    }

    /// Bottom edge of the last row
    pub fn grid_bottom(&self) -> Emu {
        self.rows.last().map_or(self.grid_top(), Span::end)
    }

    /// Left edge of the dated area (January)
    pub fn area_left(&self) -> Emu {
        self.months[0].start
    }

    /// Right edge of the dated area (end of December)
    pub fn area_right(&self) -> Emu {
        self.months[MONTHS - 1].end()
    }

    /// Left edge of the sidebar table
    pub fn sidebar_left(&self) -> Emu {
        self.category_column.start
    }

    /// Rectangle of one grid cell
    pub fn cell(&self, row: usize, month_idx: usize) -> Rect {
        let col = self.months[month_idx];
        let band = self.rows[row];
        Rect::from_origin(col.start, band.start, col.len, band.len)
    }
}

/// Split `total` into `parts` equal lengths starting at `start`, giving the
/// remainder to the last part.
fn divide_span(start: Emu, total: Emu, parts: usize) -> Vec<Span> {
    let parts_emu = parts as Emu;
    let base = total / parts_emu;
    let remainder = total - base * parts_emu;
    (0..parts)
        .map(|i| {
            let len = if i + 1 == parts { base + remainder } else { base };
            Span::new(start + base * i as Emu, len)
        })
        .collect()
}

/// Compute the geometry of a page with `row_count` rows.
///
/// A page with no rows is laid out as a single row so the scaffold still
/// has a grid; [`GridGeometry::empty`] records that it holds no data.
///
/// # Errors
///
/// Returns `LayoutError::Configuration` when the rows would be shorter than
/// `min_row_height` or the canvas leaves no room for the month columns.
pub fn plan_grid(config: &LayoutConfig, row_count: usize) -> LayoutResult<GridGeometry> {
    let empty = row_count == 0;
    let rows_needed = row_count.max(1);

    let canvas_width = inches(config.canvas_width);
    let canvas_height = inches(config.canvas_height);
    let left = inches(config.left_pad);
    let right = canvas_width - inches(config.right_pad);
    let top = inches(config.top_pad);

    let title = Rect::from_origin(left, top, right - left, inches(config.title_height));
    let legend = Rect::from_origin(left, title.y1, right - left, inches(config.legend_height));

    let category_column = Span::new(left, inches(config.sidebar_category_width));
    let workstream_column = Span::new(
        category_column.end(),
        inches(config.sidebar_workstream_width),
    );

    let months_left = workstream_column.end();
    let months_span = right - months_left;
    if months_span < MONTHS as Emu {
        return Err(LayoutError::configuration(format!(
            "no horizontal room for month columns ({} units)",
            months_span
        )));
    }
    let month_spans = divide_span(months_left, months_span, MONTHS);
    let mut months = [Span::new(0, 0); MONTHS];
    months.copy_from_slice(&month_spans);

    let header_top = config.header_top();
    let header = Rect::from_origin(
        months_left,
        header_top,
        months_span,
        inches(config.header_height),
    );

    let grid_top = header.y1;
    let grid_span = canvas_height - inches(config.bottom_pad) - grid_top;
    let floor = inches(config.min_row_height).max(1);
    if grid_span < floor * rows_needed as Emu {
        return Err(LayoutError::configuration(format!(
            "{} rows need at least {} units of grid height but only {} remain",
            rows_needed,
            floor * rows_needed as Emu,
            grid_span
        )));
    }

    let rows = match config.row_height_policy {
        RowHeightPolicy::Fixed(height) if inches(height) * rows_needed as Emu <= grid_span => {
            let height = inches(height);
            (0..rows_needed)
                .map(|i| Span::new(grid_top + height * i as Emu, height))
                .collect()
        }
        _ => divide_span(grid_top, grid_span, rows_needed),
    };

    Ok(GridGeometry {
        canvas_width,
        canvas_height,
        title,
        legend,
        category_column,
        workstream_column,
        header,
        months,
        rows,
        empty,
    })
}
