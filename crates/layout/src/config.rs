//! Layout configuration
//!
//! All layout constants live in one immutable [`LayoutConfig`] that is passed
//! to the planner, the label engine and the renderer. Lengths are in inches
//! and converted to layout units with [`inches`] where they are used.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, LayoutResult};
use crate::models::{Emu, inches};

/// How row heights are chosen for a page
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowHeightPolicy {
    /// Divide all remaining vertical space evenly among the page's rows.
    Stretch,
    /// Use a constant row height (inches) while the rows fit, stretching
    /// otherwise.
    Fixed(f64),
}

/// Label wrapping strategy for a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WrapPolicy {
    /// Wrap every `wrap_words_per_line` words inside the crowded region only.
    Default,
    /// Never wrap.
    Never,
    /// Always wrap every `n` words.
    EveryWords(usize),
}

/// Immutable layout constants for every page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub left_pad: f64,
    pub right_pad: f64,
    pub top_pad: f64,
    pub bottom_pad: f64,
    /// Gap between the legend band and the month header
    pub band_gap: f64,
    pub legend_height: f64,
    pub title_height: f64,
    pub header_height: f64,
    pub sidebar_category_width: f64,
    pub sidebar_workstream_width: f64,

    pub rows_per_page: usize,
    pub row_height_policy: RowHeightPolicy,
    /// Smallest usable row height; a page needing less is a configuration error
    pub min_row_height: f64,

    pub circle_size: f64,
    pub star_size: f64,

    pub label_width: f64,
    pub label_line_height: f64,
    /// Distance between a marker's edge and its label
    pub label_gap: f64,
    /// Extra space between stacked label lanes
    pub lane_gap: f64,
    pub max_lane_tries: usize,
    /// Approximate advance of one character at the label font size
    pub char_width: f64,
    pub label_font_size: f64,

    /// First month (1-based) of the crowded region; 13 disables it
    pub crowded_from_month: u32,
    pub wrap_words_per_line: usize,
    /// Marker distance, as a fraction of the month width, that counts as a cluster
    pub cluster_fraction: f64,
    /// Per category-bucket wrap rules
    pub wrap_overrides: BTreeMap<String, WrapPolicy>,

    pub title_prefix: String,
    pub show_today: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            canvas_width: 20.0,
            canvas_height: 9.0,
            left_pad: 0.25,
            right_pad: 0.25,
            top_pad: 0.05,
            bottom_pad: 0.5,
            band_gap: 0.2,
            legend_height: 0.6,
            title_height: 0.5,
            header_height: 1.0,
            sidebar_category_width: 1.5,
            sidebar_workstream_width: 2.5,
            rows_per_page: 30,
            row_height_policy: RowHeightPolicy::Stretch,
            min_row_height: 0.1,
            circle_size: 0.30,
            star_size: 0.40,
            label_width: 2.2,
            label_line_height: 0.2,
            label_gap: 0.05,
            lane_gap: 0.02,
            max_lane_tries: 9,
            char_width: 0.09,
            label_font_size: 12.0,
            crowded_from_month: 9,
            wrap_words_per_line: 3,
            cluster_fraction: 0.25,
            wrap_overrides: BTreeMap::new(),
            title_prefix: "Roadmap".to_string(),
            show_today: true,
        }
    }
}

impl LayoutConfig {
    /// Top of the month header band, below the title and legend bands
    pub fn header_top(&self) -> Emu {
        inches(self.top_pad)
            + inches(self.title_height)
            + inches(self.legend_height)
            + inches(self.band_gap)
    }

    /// Top of the first grid row
    pub fn grid_top(&self) -> Emu {
        self.header_top() + inches(self.header_height)
    }

    /// Vertical space shared by the grid rows
    pub fn grid_span(&self) -> Emu {
        inches(self.canvas_height) - inches(self.bottom_pad) - self.grid_top()
    }

    /// Left edge of the first month column
    pub fn months_left(&self) -> Emu {
        inches(self.left_pad)
            + inches(self.sidebar_category_width)
            + inches(self.sidebar_workstream_width)
    }

    /// Horizontal space shared by the twelve month columns
    pub fn months_span(&self) -> Emu {
        inches(self.canvas_width) - inches(self.right_pad) - self.months_left()
    }

    /// Wrap rule that applies to a category bucket
    pub fn wrap_policy(&self, bucket: &str) -> WrapPolicy {
        self.wrap_overrides
            .get(bucket)
            .copied()
            .unwrap_or(WrapPolicy::Default)
    }

    /// Check that these constants can lay out a full page.
    ///
    /// # Errors
    ///
    /// Returns `LayoutError::Configuration` naming the first offending option.
    pub fn validate(&self) -> LayoutResult<()> {
        if self.rows_per_page == 0 {
            return Err(LayoutError::configuration("rows_per_page must be at least 1"));
        }
        if !(self.canvas_width > 0.0) || !(self.canvas_height > 0.0) {
            return Err(LayoutError::configuration(format!(
                "canvas must have a positive size, got {} x {}",
                self.canvas_width, self.canvas_height
            )));
        }

        let lengths = [
            ("left_pad", self.left_pad),
            ("right_pad", self.right_pad),
            ("top_pad", self.top_pad),
            ("bottom_pad", self.bottom_pad),
            ("band_gap", self.band_gap),
            ("legend_height", self.legend_height),
            ("title_height", self.title_height),
            ("header_height", self.header_height),
            ("sidebar_category_width", self.sidebar_category_width),
            ("sidebar_workstream_width", self.sidebar_workstream_width),
            ("label_gap", self.label_gap),
            ("lane_gap", self.lane_gap),
        ];
        if let Some((name, value)) = lengths.iter().find(|(_, v)| !(*v >= 0.0)) {
            return Err(LayoutError::configuration(format!(
                "{} must not be negative, got {}",
                name, value
            )));
        }

        let sizes = [
            ("min_row_height", self.min_row_height),
            ("circle_size", self.circle_size),
            ("star_size", self.star_size),
            ("label_width", self.label_width),
            ("label_line_height", self.label_line_height),
            ("char_width", self.char_width),
            ("label_font_size", self.label_font_size),
        ];
        if let Some((name, value)) = sizes.iter().find(|(_, v)| !(*v > 0.0)) {
            return Err(LayoutError::configuration(format!(
                "{} must be positive, got {}",
                name, value
            )));
        }

        if let RowHeightPolicy::Fixed(height) = self.row_height_policy
            && !(height > 0.0)
        {
            return Err(LayoutError::configuration(format!(
                "fixed row height must be positive, got {}",
                height
            )));
        }

        if self.months_span() < 12 {
            return Err(LayoutError::configuration(format!(
                "no horizontal room for month columns: canvas width {} leaves {} units",
                self.canvas_width,
                self.months_span()
            )));
        }

        let grid_span = self.grid_span();
        let floor = inches(self.min_row_height);
        if grid_span < floor * self.rows_per_page as Emu {
            return Err(LayoutError::configuration(format!(
                "{} rows per page need {} units of grid height but only {} remain",
                self.rows_per_page,
                floor * self.rows_per_page as Emu,
                grid_span
            )));
        }

        if self.max_lane_tries == 0 {
            return Err(LayoutError::configuration("max_lane_tries must be at least 1"));
        }
        if self.wrap_words_per_line == 0 {
            return Err(LayoutError::configuration("wrap_words_per_line must be at least 1"));
        }
        if let Some((bucket, _)) = self
            .wrap_overrides
            .iter()
            .find(|(_, policy)| matches!(policy, WrapPolicy::EveryWords(0)))
        {
            return Err(LayoutError::configuration(format!(
                "wrap override for '{}' must wrap at least 1 word per line",
                bucket
            )));
        }
        if !(1..=13).contains(&self.crowded_from_month) {
            return Err(LayoutError::configuration(format!(
                "crowded_from_month must be between 1 and 13, got {}",
                self.crowded_from_month
            )));
        }
        if !(0.0..=1.0).contains(&self.cluster_fraction) {
            return Err(LayoutError::configuration(format!(
                "cluster_fraction must be between 0 and 1, got {}",
                self.cluster_fraction
            )));
        }

        Ok(())
    }
}
