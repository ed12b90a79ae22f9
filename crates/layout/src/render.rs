//! Page rendering into draw requests
//!
//! The renderer never touches a file format. It turns one [`Page`] into an
//! ordered list of [`DrawRequest`]s that an output backend can serialize to
//! slides, images or anything else: legend, month header, sidebar table,
//! grid, guide lines, milestone markers with their labels, the today line
//! and the title.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use tracing::debug;

use crate::config::LayoutConfig;
use crate::error::LayoutResult;
use crate::geometry::{GridGeometry, MONTHS, plan_grid};
use crate::grouping::RowKey;
use crate::labels::{LabelMode, LabelPlacer, LabelRequest, PlacedLabel};
use crate::models::{Emu, MarkerShape, MilestoneKind, Point, Rect, Rgb, Status, inches, points};
use crate::paginate::Page;
use crate::position::{date_x, day_fraction, marker_center};

const TITLE_FONT: f64 = 20.0;
const LEGEND_FONT: f64 = 15.0;
const HEADER_FONT: f64 = 18.0;
const SIDEBAR_FONT: f64 = 15.0;

/// Outline of a rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Border {
    pub color: Rgb,
    pub width: Emu,
}

impl Border {
    fn white(pt: f64) -> Self {
        Self {
            color: Rgb::WHITE,
            width: points(pt),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashStyle {
    Solid,
    RoundDot,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// One primitive for the output backend
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrawRequest {
    Rectangle {
        bounds: Rect,
        /// `None` draws the outline only
        fill: Option<Rgb>,
        border: Option<Border>,
    },
    Connector {
        from: Point,
        to: Point,
        color: Rgb,
        width: Emu,
        dash: DashStyle,
    },
    TextBox {
        bounds: Rect,
        text: String,
        font_size: f64,
        color: Rgb,
        alignment: Alignment,
        bold: bool,
    },
    Marker {
        center: Point,
        shape: MarkerShape,
        size: Emu,
        fill: Rgb,
    },
}

impl DrawRequest {
    /// Serialized `type` tag
    pub fn kind(&self) -> &'static str {
        match self {
            DrawRequest::Rectangle { .. } => "rectangle",
            DrawRequest::Connector { .. } => "connector",
            DrawRequest::TextBox { .. } => "text_box",
            DrawRequest::Marker { .. } => "marker",
        }
    }

    fn text(bounds: Rect, text: impl Into<String>, font_size: f64, color: Rgb) -> Self {
        DrawRequest::TextBox {
            bounds,
            text: text.into(),
            font_size,
            color,
            alignment: Alignment::Center,
            bold: false,
        }
    }
}

/// A milestone as it was placed on the page
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedMilestone {
    pub row: usize,
    pub title: String,
    pub date: NaiveDate,
    pub status: Status,
    pub kind: MilestoneKind,
    pub month_index: usize,
    pub day_fraction: f64,
    pub center: Point,
    pub size: Emu,
    pub label: PlacedLabel,
}

/// A page laid out and ready for output
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub year: i32,
    pub number: usize,
    pub total: usize,
    pub title: String,
    pub rows: Vec<RowKey>,
    pub geometry: GridGeometry,
    pub milestones: Vec<PlacedMilestone>,
    /// Present only when the today line was drawn on this page
    pub today_x: Option<Emu>,
    pub requests: Vec<DrawRequest>,
}

impl RenderedPage {
    /// Labels that had to overlap another label
    pub fn fallbacks(&self) -> usize {
        self.milestones.iter().filter(|m| m.label.fell_back).count()
    }

    /// Labels that extend past their row band into a neighbouring row
    pub fn labels_outside_rows(&self) -> usize {
        self.milestones.iter().filter(|m| !m.label.within_row).count()
    }
}

static_assertions::assert_impl_all!(RenderedPage: Send, Sync);

/// Title text for a page, with a page counter when the year spans several pages
pub fn page_title(prefix: &str, year: i32, number: usize, total: usize) -> String {
    if total > 1 {
        format!("{} - {}  (Page {}/{})", prefix, year, number, total)
    } else {
        format!("{} - {}", prefix, year)
    }
}

fn marker_size(config: &LayoutConfig, kind: MilestoneKind) -> Emu {
    match kind {
        MilestoneKind::Regular => inches(config.circle_size),
        MilestoneKind::Major => inches(config.star_size),
    }
}

fn draw_legend(geom: &GridGeometry, config: &LayoutConfig, out: &mut Vec<DrawRequest>) {
    let items: Vec<(&str, MarkerShape, Rgb)> = std::iter::once((
        "Major Milestone",
        MarkerShape::Star,
        Status::OnTrack.color(),
    ))
    .chain(
        Status::LEGEND
            .iter()
            .map(|s| (s.label(), MarkerShape::Circle, s.color())),
    )
    .collect();

    let slot = geom.legend.width() / items.len() as Emu;
    let size = inches(config.circle_size);
    let gap = inches(config.label_gap);
    for (i, (label, shape, fill)) in items.into_iter().enumerate() {
        let slot_left = geom.legend.x0 + slot * i as Emu;
        let marker_left = slot_left + (slot - size) / 2;
        let center = Point::new(marker_left + size / 2, geom.legend.y0 + size / 2);
        out.push(DrawRequest::Marker {
            center,
            shape,
            size,
            fill,
        });

        let text_left = marker_left + size + gap;
        let bounds = Rect::new(
            text_left,
            geom.legend.y0,
            (slot_left + slot).max(text_left + 1),
            geom.legend.y0 + size,
        );
        out.push(DrawRequest::TextBox {
            bounds,
            text: label.to_string(),
            font_size: LEGEND_FONT,
            color: Rgb::BLACK,
            alignment: Alignment::Left,
            bold: false,
        });
    }
}

fn draw_month_header(geom: &GridGeometry, year: i32, out: &mut Vec<DrawRequest>) {
    out.push(DrawRequest::Rectangle {
        bounds: geom.header,
        fill: Some(Rgb::HEADER_BLUE),
        border: None,
    });
    for (m, col) in geom.months.iter().enumerate() {
        let bounds = Rect::from_origin(col.start, geom.header.y0, col.len, geom.header.height());
        out.push(DrawRequest::Rectangle {
            bounds,
            fill: None,
            border: Some(Border::white(0.95)),
        });
        let label = NaiveDate::from_ymd_opt(year, m as u32 + 1, 1)
            .map(|d| d.format("%b %y").to_string())
            .unwrap_or_default();
        out.push(DrawRequest::TextBox {
            bounds,
            text: label,
            font_size: HEADER_FONT,
            color: Rgb::WHITE,
            alignment: Alignment::Center,
            bold: true,
        });
    }
}

fn draw_sidebar(geom: &GridGeometry, rows: &[RowKey], out: &mut Vec<DrawRequest>) {
    let columns = [geom.category_column, geom.workstream_column];
    for (col, heading) in columns.iter().zip(["Type", "Workstream"]) {
        let bounds = Rect::from_origin(col.start, geom.header.y0, col.len, geom.header.height());
        out.push(DrawRequest::Rectangle {
            bounds,
            fill: Some(Rgb::HEADER_BLUE),
            border: Some(Border::white(0.95)),
        });
        out.push(DrawRequest::TextBox {
            bounds,
            text: heading.to_string(),
            font_size: HEADER_FONT,
            color: Rgb::BLACK,
            alignment: Alignment::Center,
            bold: true,
        });
    }

    for (r, key) in rows.iter().enumerate() {
        let shade = if r % 2 == 0 {
            Rgb::SHADE_LIGHT
        } else {
            Rgb::SHADE_DARK
        };
        let band = geom.rows[r];
        for (col, text) in columns.iter().zip([&key.category, &key.workstream]) {
            let bounds = Rect::from_origin(col.start, band.start, col.len, band.len);
            out.push(DrawRequest::Rectangle {
                bounds,
                fill: Some(shade),
                border: Some(Border::white(0.75)),
            });
            out.push(DrawRequest::text(
                bounds,
                text.as_str(),
                SIDEBAR_FONT,
                Rgb::BLACK,
            ));
        }
    }
}

fn draw_grid(geom: &GridGeometry, real_rows: usize, out: &mut Vec<DrawRequest>) {
    for m in 0..MONTHS {
        let fill = if m % 2 == 0 {
            Rgb::SHADE_LIGHT
        } else {
            Rgb::SHADE_DARK
        };
        for r in 0..geom.rows.len() {
            out.push(DrawRequest::Rectangle {
                bounds: geom.cell(r, m),
                fill: Some(fill),
                border: Some(Border::white(0.95)),
            });
        }
    }

    for r in 0..real_rows {
        let y = geom.row_center(r);
        out.push(DrawRequest::Connector {
            from: Point::new(geom.area_left(), y),
            to: Point::new(geom.area_right(), y),
            color: Rgb::NAVY,
            width: points(0.5),
            dash: DashStyle::Solid,
        });
    }
}

/// Lay out one page and produce its draw requests.
///
/// `today` is the reference date for the today line; it is drawn only when
/// `show_today` is set and the date falls in the page's year.
///
/// # Errors
///
/// Returns `LayoutError::Configuration` when the page's rows cannot fit the
/// canvas.
pub fn render_page(
    page: &Page,
    config: &LayoutConfig,
    today: Option<NaiveDate>,
) -> LayoutResult<RenderedPage> {
    let geometry = plan_grid(config, page.row_count())?;
    let title = page_title(&config.title_prefix, page.year, page.number, page.total);
    debug!(
        "Rendering '{}': {} rows, {} milestones",
        title,
        page.row_count(),
        page.entries.len()
    );

    let mut requests = Vec::new();
    draw_legend(&geometry, config, &mut requests);
    draw_month_header(&geometry, page.year, &mut requests);
    draw_sidebar(&geometry, &page.rows, &mut requests);
    draw_grid(&geometry, page.row_count(), &mut requests);

    let mut placer = LabelPlacer::new(
        config,
        geometry.area_left(),
        geometry.area_right(),
        geometry.month_width(),
    );
    let mut milestones = Vec::with_capacity(page.entries.len());
    for entry in &page.entries {
        let record = &entry.record;
        let center = marker_center(&geometry, record.date, entry.row);
        let size = marker_size(config, record.kind);
        let band = geometry.rows[entry.row];
        let label = placer.place(&LabelRequest {
            row: entry.row,
            marker: center,
            marker_size: size,
            month_index: record.month_index(),
            text: &record.title,
            bucket: &record.category_bucket,
            row_top: band.start,
            row_bottom: band.end(),
        });

        requests.push(DrawRequest::Marker {
            center,
            shape: record.kind.shape(),
            size,
            fill: record.status.color(),
        });
        let alignment = match label.mode {
            LabelMode::Above => Alignment::Center,
            LabelMode::Side if label.bounds.x1 <= center.x => Alignment::Right,
            LabelMode::Side => Alignment::Left,
        };
        requests.push(DrawRequest::TextBox {
            bounds: label.bounds,
            text: label.text(),
            font_size: config.label_font_size,
            color: Rgb::BLACK,
            alignment,
            bold: false,
        });

        milestones.push(PlacedMilestone {
            row: entry.row,
            title: record.title.clone(),
            date: record.date,
            status: record.status,
            kind: record.kind,
            month_index: record.month_index(),
            day_fraction: day_fraction(record.date),
            center,
            size,
            label,
        });
    }

    let today_x = today
        .filter(|d| config.show_today && d.year() == page.year)
        .map(|d| date_x(&geometry, d));
    if let Some(x) = today_x {
        requests.push(DrawRequest::Connector {
            from: Point::new(x, geometry.grid_top()),
            to: Point::new(x, geometry.grid_bottom()),
            color: Rgb::TODAY_GREEN,
            width: points(2.0),
            dash: DashStyle::RoundDot,
        });
    }

    requests.push(DrawRequest::TextBox {
        bounds: geometry.title,
        text: title.clone(),
        font_size: TITLE_FONT,
        color: Rgb::BLACK,
        alignment: Alignment::Left,
        bold: true,
    });

    if placer.fallbacks() > 0 {
        debug!("'{}': {} label(s) overlap", title, placer.fallbacks());
    }

    Ok(RenderedPage {
        year: page.year,
        number: page.number,
        total: page.total,
        title,
        rows: page.rows.clone(),
        geometry,
        milestones,
        today_x,
        requests,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grouping::ordered_row_keys;
    use crate::models::MilestoneRecord;
    use crate::normalize::{NormalizedRecord, normalize};
    use crate::paginate::paginate_year;

    fn rec(
        category: &str,
        workstream: &str,
        title: &str,
        date: &str,
        status: &str,
        kind: &str,
    ) -> NormalizedRecord {
        let raw = MilestoneRecord::new(category, workstream, title, date, status, kind);
        normalize(&raw, 1).unwrap()
    }

    fn single_page(records: &[NormalizedRecord], year: i32) -> Page {
        let rows = ordered_row_keys(records);
        paginate_year(year, &rows, records, 30)
            .unwrap()
            .remove(0)
    }

    fn count(requests: &[DrawRequest], kind: &str) -> usize {
        requests.iter().filter(|r| r.kind() == kind).count()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_page_title() {
        assert_eq!(page_title("Roadmap", 2025, 1, 1), "Roadmap - 2025");
        assert_eq!(
            page_title("Roadmap", 2025, 2, 3),
            "Roadmap - 2025  (Page 2/3)"
        );
    }

    #[test]
    fn test_two_march_milestones_share_a_row() {
        let records = vec![
            rec("Build", "API", "API beta", "2025-03-15", "OnTrack", "Regular"),
            rec("Build", "API", "API design", "2025-03-01", "Complete", "Major"),
        ];
        let page = single_page(&records, 2025);
        let config = LayoutConfig::default();
        let rendered = render_page(&page, &config, None).unwrap();

        assert_eq!(rendered.rows.len(), 1);
        assert_eq!(rendered.rows[0].category, "Build");
        assert_eq!(rendered.rows[0].workstream, "API");
        assert_eq!(rendered.milestones.len(), 2);

        let first = &rendered.milestones[0];
        let second = &rendered.milestones[1];
        assert_eq!(first.date, date(2025, 3, 1));
        assert_eq!(first.kind, MilestoneKind::Major);
        assert_eq!(first.month_index, 2);
        assert_eq!(second.month_index, 2);
        assert_eq!(first.day_fraction, 0.0);
        assert!((second.day_fraction - 14.0 / 30.0).abs() < 1e-9);
        assert_eq!(first.center.x, rendered.geometry.month_left(2));
        assert_eq!(first.center.y, second.center.y);
        assert_eq!(first.center.y, rendered.geometry.row_center(0));
        assert!(!first.label.bounds.intersects(&second.label.bounds));
        assert_eq!(rendered.fallbacks(), 0);
        assert_eq!(rendered.labels_outside_rows(), 0);
    }

    #[test]
    fn test_marker_styles_follow_status_and_kind() {
        let records = vec![
            rec("Run", "Ops", "Cutover", "2025-05-10", "At Risk", "T0"),
            rec("Run", "Ops", "Review", "2025-07-10", "whatever", "T1"),
        ];
        let page = single_page(&records, 2025);
        let config = LayoutConfig::default();
        let rendered = render_page(&page, &config, None).unwrap();

        let markers: Vec<(MarkerShape, Emu, Rgb)> = rendered
            .requests
            .iter()
            .filter_map(|r| match r {
                DrawRequest::Marker {
                    shape, size, fill, ..
                } => Some((*shape, *size, *fill)),
                _ => None,
            })
            .collect();
        // six legend entries come first
        assert_eq!(markers.len(), 8);
        assert_eq!(
            markers[6],
            (MarkerShape::Star, inches(0.40), Rgb(255, 192, 0))
        );
        assert_eq!(
            markers[7],
            (MarkerShape::Circle, inches(0.30), Rgb::NEUTRAL_GRAY)
        );
    }

    #[test]
    fn test_scaffold_counts() {
        let records = vec![
            rec("Build", "API", "a", "2025-02-01", "On Track", "Regular"),
            rec("Run", "Ops", "b", "2025-04-01", "On Track", "Regular"),
        ];
        let page = single_page(&records, 2025);
        let rendered = render_page(&page, &LayoutConfig::default(), None).unwrap();
        let reqs = &rendered.requests;

        // header bar + 12 month cells + 2 sidebar headings + 2x2 sidebar cells + 24 grid cells
        assert_eq!(count(reqs, "rectangle"), 1 + 12 + 2 + 4 + 24);
        // 2 guide lines, no today line
        assert_eq!(count(reqs, "connector"), 2);
        // 6 legend markers + 2 milestones
        assert_eq!(count(reqs, "marker"), 8);
        // 6 legend labels + 12 months + 2 headings + 4 sidebar + 2 labels + title
        assert_eq!(count(reqs, "text_box"), 6 + 12 + 2 + 4 + 2 + 1);

        let months: Vec<&str> = reqs
            .iter()
            .filter_map(|r| match r {
                DrawRequest::TextBox { text, bold: true, font_size, .. }
                    if *font_size == HEADER_FONT && text.ends_with("25") =>
                {
                    Some(text.as_str())
                }
                _ => None,
            })
            .collect();
        assert_eq!(months.first(), Some(&"Jan 25"));
        assert_eq!(months.last(), Some(&"Dec 25"));
    }

    #[test]
    fn test_empty_year_renders_scaffold() {
        let page = paginate_year(2027, &[], &[], 30).unwrap().remove(0);
        let rendered = render_page(&page, &LayoutConfig::default(), None).unwrap();
        assert!(rendered.geometry.empty);
        assert!(rendered.milestones.is_empty());
        assert_eq!(rendered.title, "Roadmap - 2027");
        // one placeholder grid row, no sidebar body, no guide line
        assert_eq!(count(&rendered.requests, "rectangle"), 1 + 12 + 2 + 12);
        assert_eq!(count(&rendered.requests, "connector"), 0);
    }

    #[test]
    fn test_today_line_only_in_its_year() {
        let records = vec![rec("Build", "API", "a", "2025-02-01", "On Track", "Regular")];
        let page = single_page(&records, 2025);
        let config = LayoutConfig::default();

        let rendered = render_page(&page, &config, Some(date(2025, 6, 16))).unwrap();
        let x = rendered.today_x.unwrap();
        assert_eq!(x, date_x(&rendered.geometry, date(2025, 6, 16)));
        let line = rendered
            .requests
            .iter()
            .find(|r| matches!(r, DrawRequest::Connector { dash: DashStyle::RoundDot, .. }));
        match line {
            Some(DrawRequest::Connector { from, to, color, .. }) => {
                assert_eq!(from.x, x);
                assert_eq!(to.x, x);
                assert_eq!(from.y, rendered.geometry.grid_top());
                assert_eq!(to.y, rendered.geometry.grid_bottom());
                assert_eq!(*color, Rgb::TODAY_GREEN);
            }
            other => panic!("expected today connector, got {:?}", other),
        }

        let other_year = render_page(&page, &config, Some(date(2024, 6, 16))).unwrap();
        assert!(other_year.today_x.is_none());

        let hidden = LayoutConfig {
            show_today: false,
            ..Default::default()
        };
        let off = render_page(&page, &hidden, Some(date(2025, 6, 16))).unwrap();
        assert!(off.today_x.is_none());
    }

    #[test]
    fn test_title_is_last_request() {
        let records = vec![rec("Build", "API", "a", "2025-02-01", "On Track", "Regular")];
        let page = single_page(&records, 2025);
        let config = LayoutConfig {
            title_prefix: "Platform Roadmap".to_string(),
            ..Default::default()
        };
        let rendered = render_page(&page, &config, None).unwrap();
        match rendered.requests.last() {
            Some(DrawRequest::TextBox { text, bold, .. }) => {
                assert_eq!(text, "Platform Roadmap - 2025");
                assert!(*bold);
            }
            other => panic!("expected title, got {:?}", other),
        }
    }

    #[test]
    fn test_draw_request_json_shape() {
        let request = DrawRequest::Marker {
            center: Point::new(10, 20),
            shape: MarkerShape::Star,
            size: 5,
            fill: Rgb(1, 2, 3),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "marker");
        assert_eq!(json["shape"], "star");
        assert_eq!(json["center"]["x"], 10);

        let request = DrawRequest::TextBox {
            bounds: Rect::new(0, 0, 1, 1),
            text: "x".to_string(),
            font_size: 12.0,
            color: Rgb::BLACK,
            alignment: Alignment::Center,
            bold: false,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["type"], "text_box");
        assert_eq!(json["alignment"], "center");
    }
}
