//! Data models for roadmap layout
//!
//! Defines the raw milestone record accepted from loaders, the status and
//! kind enums that drive marker styling, and the geometric primitives
//! (`Point`, `Rect`, `Rgb`) shared by the planner, label engine and renderer.

use serde::{Deserialize, Serialize};

/// Canvas layout unit. One inch is [`EMU_PER_INCH`] units.
pub type Emu = i64;

/// Layout units per inch
pub const EMU_PER_INCH: Emu = 914_400;

/// Layout units per typographic point
pub const EMU_PER_POINT: Emu = 12_700;

/// Convert inches to layout units, rounding to the nearest unit.
pub fn inches(value: f64) -> Emu {
    (value * EMU_PER_INCH as f64).round() as Emu
}

/// Convert typographic points to layout units, rounding to the nearest unit.
pub fn points(value: f64) -> Emu {
    (value * EMU_PER_POINT as f64).round() as Emu
}

/// A position on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: Emu,
    pub y: Emu,
}

impl Point {
    pub fn new(x: Emu, y: Emu) -> Self {
        Self { x, y }
    }
}

/// An axis-aligned rectangle spanning `[x0, x1) x [y0, y1)`
///
/// Used both for grid cells and for label boxes during placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub x0: Emu,
    pub y0: Emu,
    pub x1: Emu,
    pub y1: Emu,
}

impl Rect {
    /// Create a rectangle from its corner coordinates
    pub fn new(x0: Emu, y0: Emu, x1: Emu, y1: Emu) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// Create a rectangle from a top-left origin and a size
    pub fn from_origin(x: Emu, y: Emu, width: Emu, height: Emu) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x + width,
            y1: y + height,
        }
    }

    /// Create a square centered on a point
    pub fn centered(center: Point, size: Emu) -> Self {
        let half = size / 2;
        Self::from_origin(center.x - half, center.y - half, size, size)
    }

    pub fn width(&self) -> Emu {
        self.x1 - self.x0
    }

    pub fn height(&self) -> Emu {
        self.y1 - self.y0
    }

    pub fn center(&self) -> Point {
        Point::new((self.x0 + self.x1) / 2, (self.y0 + self.y1) / 2)
    }

    /// Move the rectangle by the given offsets
    pub fn translate(&self, dx: Emu, dy: Emu) -> Self {
        Self::new(self.x0 + dx, self.y0 + dy, self.x1 + dx, self.y1 + dy)
    }

    /// Check whether two rectangles overlap.
    ///
    /// Intervals are half-open on both axes, so rectangles that only share
    /// an edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    /// Area shared with another rectangle (zero when they do not intersect)
    pub fn overlap_area(&self, other: &Rect) -> i128 {
        let w = self.x1.min(other.x1) - self.x0.max(other.x0);
        let h = self.y1.min(other.y1) - self.y0.max(other.y0);
        if w <= 0 || h <= 0 {
            0
        } else {
            w as i128 * h as i128
        }
    }

    /// Shift the rectangle horizontally so it lies within `[left, right]`.
    ///
    /// A rectangle wider than the span is pinned to `left`.
    pub fn clamp_horizontal(&self, left: Emu, right: Emu) -> Self {
        if self.x0 < left || self.width() > right - left {
            self.translate(left - self.x0, 0)
        } else if self.x1 > right {
            self.translate(right - self.x1, 0)
        } else {
            *self
        }
    }
}

/// An RGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const NAVY: Rgb = Rgb(0, 0, 128);
    pub const HEADER_BLUE: Rgb = Rgb(91, 155, 213);
    pub const SHADE_LIGHT: Rgb = Rgb(224, 242, 255);
    pub const SHADE_DARK: Rgb = Rgb(190, 220, 240);
    pub const TODAY_GREEN: Rgb = Rgb(0, 176, 80);
    pub const NEUTRAL_GRAY: Rgb = Rgb(128, 128, 128);

    /// Hex form, e.g. `#5B9BD5`
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Milestone delivery status
///
/// Drives the marker fill color. Values that match none of the known
/// statuses become `Unknown` and render in a neutral color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    OnTrack,
    AtRisk,
    OffTrack,
    Complete,
    Tbc,
    Unknown,
}

impl Status {
    /// Statuses shown in the legend, in legend order
    pub const LEGEND: [Status; 5] = [
        Status::OnTrack,
        Status::AtRisk,
        Status::OffTrack,
        Status::Complete,
        Status::Tbc,
    ];

    /// Parse a free-text status.
    ///
    /// Case, spaces, underscores and hyphens are ignored, so "On Track",
    /// "on_track" and "ONTRACK" are all `OnTrack`.
    pub fn parse(s: &str) -> Status {
        let key: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "ontrack" => Status::OnTrack,
            "atrisk" => Status::AtRisk,
            "offtrack" => Status::OffTrack,
            "complete" | "completed" => Status::Complete,
            "tbc" => Status::Tbc,
            _ => Status::Unknown,
        }
    }

    /// Returns the snake_case identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::OnTrack => "on_track",
            Status::AtRisk => "at_risk",
            Status::OffTrack => "off_track",
            Status::Complete => "complete",
            Status::Tbc => "tbc",
            Status::Unknown => "unknown",
        }
    }

    /// Human-readable label used in the legend
    pub fn label(&self) -> &'static str {
        match self {
            Status::OnTrack => "On Track",
            Status::AtRisk => "At Risk",
            Status::OffTrack => "Off Track",
            Status::Complete => "Complete",
            Status::Tbc => "TBC",
            Status::Unknown => "Unknown",
        }
    }

    /// Marker fill color for this status
    pub fn color(&self) -> Rgb {
        match self {
            Status::OnTrack => Rgb(0, 176, 80),
            Status::AtRisk => Rgb(255, 192, 0),
            Status::OffTrack => Rgb(255, 0, 0),
            Status::Complete => Rgb(0, 112, 192),
            Status::Tbc => Rgb(191, 191, 191),
            Status::Unknown => Rgb::NEUTRAL_GRAY,
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Milestone importance, which picks the marker shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    Regular,
    Major,
}

impl MilestoneKind {
    /// Parse a free-text kind. `major`/`t0` are Major, anything else is Regular.
    pub fn parse(s: &str) -> MilestoneKind {
        match s.trim().to_lowercase().as_str() {
            "major" | "t0" => MilestoneKind::Major,
            _ => MilestoneKind::Regular,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MilestoneKind::Regular => "regular",
            MilestoneKind::Major => "major",
        }
    }

    /// Marker shape drawn for this kind
    pub fn shape(&self) -> MarkerShape {
        match self {
            MilestoneKind::Regular => MarkerShape::Circle,
            MilestoneKind::Major => MarkerShape::Star,
        }
    }
}

impl std::fmt::Display for MilestoneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Marker glyph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerShape {
    Circle,
    Star,
}

/// A date as it arrives from a loader: text, or a spreadsheet serial number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateValue {
    Serial(f64),
    Text(String),
}

impl std::fmt::Display for DateValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateValue::Serial(n) => write!(f, "{}", n),
            DateValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// A milestone as supplied by a tabular loader, before normalization
///
/// Text fields may be ragged (surrounding or repeated whitespace). Field
/// names also accept the spreadsheet column headings used by roadmap input
/// sheets ("Type", "Workstream", "Milestone Title", ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MilestoneRecord {
    #[serde(default, alias = "Type", alias = "type")]
    pub category: Option<String>,

    #[serde(default, alias = "Workstream")]
    pub workstream: Option<String>,

    #[serde(default, alias = "Milestone Title")]
    pub title: Option<String>,

    #[serde(default, alias = "Milestone Date")]
    pub date: Option<DateValue>,

    #[serde(default, alias = "Milestone Status")]
    pub status: Option<String>,

    #[serde(default, alias = "Milestone Type")]
    pub kind: Option<String>,
}

impl MilestoneRecord {
    /// Create a record with every field populated
    pub fn new(
        category: impl Into<String>,
        workstream: impl Into<String>,
        title: impl Into<String>,
        date: impl Into<String>,
        status: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            category: Some(category.into()),
            workstream: Some(workstream.into()),
            title: Some(title.into()),
            date: Some(DateValue::Text(date.into())),
            status: Some(status.into()),
            kind: Some(kind.into()),
        }
    }
}
