//! Roadmap layout engine
//!
//! Turns milestone records into paginated, per-year roadmap pages: a table of
//! category / workstream rows crossed with twelve month columns, with markers
//! placed by exact day of month and labels placed to avoid each other.
//! Output is a list of backend-neutral draw requests per page.

pub mod config;
pub mod error;
pub mod geometry;
pub mod grouping;
pub mod labels;
pub mod models;
pub mod normalize;
pub mod paginate;
pub mod plan;
pub mod position;
pub mod render;

pub use config::{LayoutConfig, RowHeightPolicy, WrapPolicy};
pub use error::{ErrorKind, LayoutError, LayoutResult};
pub use geometry::{GridGeometry, Span, plan_grid};
pub use grouping::{RowKey, ordered_row_keys, partition_by_year};
pub use labels::{LabelMode, LabelPlacer, LabelRequest, PlacedLabel};
pub use models::{
    DateValue, EMU_PER_INCH, EMU_PER_POINT, Emu, MarkerShape, MilestoneKind, MilestoneRecord,
    Point, Rect, Rgb, Status, inches, points,
};
pub use normalize::{NormalizedRecord, normalize, normalize_all, parse_date};
pub use paginate::{Page, PageEntry, paginate_year};
pub use plan::{YearSelection, plan_normalized, plan_pages, render_roadmap};
pub use position::{day_fraction, marker_center};
pub use render::{
    Alignment, Border, DashStyle, DrawRequest, PlacedMilestone, RenderedPage, page_title,
    render_page,
};
