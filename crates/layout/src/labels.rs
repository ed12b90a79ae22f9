//! Label placement
//!
//! Milestone titles are placed greedily, one marker at a time, in the order
//! the page lists its entries. Each row keeps the boxes already placed in it;
//! a new label tries a short, ordered list of lanes and takes the first box
//! that does not intersect anything placed before it in the same row.
//!
//! Two modes exist:
//!
//! - **Side**: one line to the right of the marker (or to the left when the
//!   right side would run past the dated area), with lanes stepping up and
//!   down from the marker's center line.
//! - **Above**: used in the crowded months at the end of the year. The title
//!   is word-wrapped and stacked above or below the marker, alternating
//!   sides and moving outward one lane at a time.
//!
//! Long titles are refilled so every line fits the label box width, which
//! makes the tested box the text's real footprint. When every lane collides
//! the candidate overlapping the least is kept. Overlap in dense clusters is
//! an accepted outcome and is only reported.

use std::collections::HashMap;

use tracing::{debug, trace, warn};

use crate::config::{LayoutConfig, WrapPolicy};
use crate::models::{Emu, Point, Rect, inches};

/// Where a label sits relative to its marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelMode {
    Side,
    Above,
}

impl LabelMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            LabelMode::Side => "side",
            LabelMode::Above => "above",
        }
    }
}

/// One label to place
#[derive(Debug, Clone)]
pub struct LabelRequest<'a> {
    /// Row index on the page
    pub row: usize,
    pub marker: Point,
    /// Marker diameter
    pub marker_size: Emu,
    /// 0-based month of the milestone
    pub month_index: usize,
    pub text: &'a str,
    /// Category bucket, used to look up wrap overrides
    pub bucket: &'a str,
    pub row_top: Emu,
    pub row_bottom: Emu,
}

/// The outcome of placing one label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedLabel {
    pub bounds: Rect,
    pub lines: Vec<String>,
    pub mode: LabelMode,
    /// Signed lane the label ended up in; negative is upward
    pub lane: i64,
    /// No collision-free lane existed and the first candidate was kept
    pub fell_back: bool,
    /// The box stays inside its row band
    pub within_row: bool,
}

impl PlacedLabel {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Default)]
struct RowState {
    placed: Vec<Rect>,
    previous_x: Option<Emu>,
    prefer_up: bool,
}

/// Split `text` into lines of at most `words` words
pub fn wrap_words(text: &str, words: usize) -> Vec<String> {
    let all: Vec<&str> = text.split_whitespace().collect();
    if all.is_empty() {
        return vec![String::new()];
    }
    all.chunks(words.max(1)).map(|chunk| chunk.join(" ")).collect()
}

/// Refill `lines` so none is longer than `max_chars` characters.
///
/// Words are packed greedily; a single word longer than the limit is split.
pub fn fit_lines(lines: &[String], max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut out = Vec::new();
    for line in lines {
        let mut current = String::new();
        let mut current_len = 0;
        for word in line.split_whitespace() {
            let chars: Vec<char> = word.chars().collect();
            for piece in chars.chunks(max_chars) {
                let piece_len = piece.len();
                if current_len > 0 && current_len + 1 + piece_len > max_chars {
                    out.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                if current_len > 0 {
                    current.push(' ');
                    current_len += 1;
                }
                current.extend(piece);
                current_len += piece_len;
            }
        }
        out.push(current);
    }
    if out.is_empty() {
        out.push(String::new());
    }
    out
}

/// Greedy per-row label placer for one page
#[derive(Debug)]
pub struct LabelPlacer<'a> {
    config: &'a LayoutConfig,
    area_left: Emu,
    area_right: Emu,
    month_width: Emu,
    rows: HashMap<usize, RowState>,
    fallbacks: usize,
}

impl<'a> LabelPlacer<'a> {
    /// Create a placer for the dated area `[area_left, area_right)`.
    pub fn new(
        config: &'a LayoutConfig,
        area_left: Emu,
        area_right: Emu,
        month_width: Emu,
    ) -> Self {
        Self {
            config,
            area_left,
            area_right,
            month_width,
            rows: HashMap::new(),
            fallbacks: 0,
        }
    }

    /// Number of labels that could not avoid a collision
    pub fn fallbacks(&self) -> usize {
        self.fallbacks
    }

    /// Boxes placed so far in `row`
    pub fn placed_in_row(&self, row: usize) -> &[Rect] {
        self.rows
            .get(&row)
            .map(|state| state.placed.as_slice())
            .unwrap_or(&[])
    }

    fn mode_for(&self, month_index: usize) -> LabelMode {
        if month_index + 1 >= self.config.crowded_from_month as usize {
            LabelMode::Above
        } else {
            LabelMode::Side
        }
    }

    fn lines_for(&self, text: &str, bucket: &str, mode: LabelMode) -> Vec<String> {
        let words = match (self.config.wrap_policy(bucket), mode) {
            (WrapPolicy::Never, _) => None,
            (WrapPolicy::EveryWords(n), _) => Some(n),
            (WrapPolicy::Default, LabelMode::Above) => Some(self.config.wrap_words_per_line),
            (WrapPolicy::Default, LabelMode::Side) => None,
        };
        let lines = match words {
            Some(n) => wrap_words(text, n),
            None => vec![text.split_whitespace().collect::<Vec<_>>().join(" ")],
        };
        fit_lines(&lines, self.max_line_chars())
    }

    /// Characters that fit on one line of a full-width label box
    fn max_line_chars(&self) -> usize {
        let room = self.config.label_width - 2.0 * self.config.label_gap;
        (room / self.config.char_width).floor().max(1.0) as usize
    }

    /// Estimated box size for the given lines
    fn measure(&self, lines: &[String]) -> (Emu, Emu) {
        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let natural =
            inches(longest as f64 * self.config.char_width) + 2 * inches(self.config.label_gap);
        let width = natural.min(inches(self.config.label_width)).max(1);
        let height = (inches(self.config.label_line_height) * lines.len() as Emu).max(1);
        (width, height)
    }

    /// Candidate boxes in the order they are tried, with their lane numbers.
    fn candidates(
        &self,
        request: &LabelRequest<'_>,
        mode: LabelMode,
        size: (Emu, Emu),
        prefer_up: bool,
    ) -> Vec<(i64, Rect)> {
        let (width, height) = size;
        let gap = inches(self.config.label_gap);
        let half = request.marker_size / 2;
        let unit = height + inches(self.config.lane_gap);
        let tries = self.config.max_lane_tries.max(1);
        let Point { x, y } = request.marker;

        let mut out = Vec::with_capacity(tries);
        match mode {
            LabelMode::Side => {
                let right_x0 = x + half + gap;
                let x0 = if right_x0 + width > self.area_right {
                    x - half - gap - width
                } else {
                    right_x0
                };
                let base = Rect::from_origin(x0, y - height / 2, width, height);
                let sign = if prefer_up { -1 } else { 1 };
                let mut lanes = vec![0i64];
                let mut step = 1i64;
                while lanes.len() < tries {
                    lanes.push(sign * step);
                    lanes.push(-sign * step);
                    step += 1;
                }
                lanes.truncate(tries);
                for lane in lanes {
                    out.push((lane, base.translate(0, lane * unit)));
                }
            }
            LabelMode::Above => {
                let x0 = x - width / 2;
                let above = Rect::from_origin(x0, y - half - gap - height, width, height);
                let below = Rect::from_origin(x0, y + half + gap, width, height);
                let mut step = 0i64;
                while out.len() < tries {
                    let up = (-(step + 1), above.translate(0, -step * unit));
                    let down = (step + 1, below.translate(0, step * unit));
                    if prefer_up {
                        out.push(up);
                        out.push(down);
                    } else {
                        out.push(down);
                        out.push(up);
                    }
                    step += 1;
                }
                out.truncate(tries);
            }
        }

        out.into_iter()
            .map(|(lane, rect)| (lane, rect.clamp_horizontal(self.area_left, self.area_right)))
            .collect()
    }

    /// Place one label and remember its box for later labels in the same row.
    pub fn place(&mut self, request: &LabelRequest<'_>) -> PlacedLabel {
        let mode = self.mode_for(request.month_index);
        let lines = self.lines_for(request.text, request.bucket, mode);
        let size = self.measure(&lines);

        let (clustered, prefer_up) = {
            let state = self.rows.entry(request.row).or_default();
            let threshold = (self.month_width as f64 * self.config.cluster_fraction).round() as Emu;
            match state.previous_x {
                Some(prev) if (request.marker.x - prev).abs() < threshold => {
                    (true, !state.prefer_up)
                }
                _ => (false, true),
            }
        };

        let candidates = self.candidates(request, mode, size, prefer_up);
        let placed = self.placed_in_row(request.row);
        let chosen = candidates
            .iter()
            .find(|(_, rect)| !placed.iter().any(|p| p.intersects(rect)))
            .copied();

        let (lane, bounds, fell_back) = match chosen {
            Some((lane, rect)) => (lane, rect, false),
            None => {
                let (lane, rect) = least_overlap(&candidates, placed);
                (lane, rect, true)
            }
        };

        if fell_back {
            self.fallbacks += 1;
            warn!(
                "No free lane for label '{}' on row {} after {} tries, keeping overlap",
                request.text,
                request.row,
                candidates.len()
            );
        } else {
            trace!(
                "Placed label '{}' on row {} ({}, lane {}, clustered: {})",
                request.text,
                request.row,
                mode.as_str(),
                lane,
                clustered
            );
        }

        let within_row = bounds.y0 >= request.row_top && bounds.y1 <= request.row_bottom;
        if !within_row {
            debug!(
                "Label '{}' on row {} extends past its row band (lane {})",
                request.text,
                request.row,
                lane
            );
        }

        let state = self.rows.entry(request.row).or_default();
        state.placed.push(bounds);
        state.previous_x = Some(request.marker.x);
        state.prefer_up = prefer_up;

        PlacedLabel {
            bounds,
            lines,
            mode,
            lane,
            fell_back,
            within_row,
        }
    }
}

/// Candidate covering the least area of already placed boxes, the earliest
/// one on ties. `candidates` always holds lane 0.
fn least_overlap(candidates: &[(i64, Rect)], placed: &[Rect]) -> (i64, Rect) {
    candidates
        .iter()
        .copied()
        .min_by_key(|(_, rect)| placed.iter().map(|p| p.overlap_area(rect)).sum::<i128>())
        .unwrap_or(candidates[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const LEFT: Emu = 1_000_000;
    const RIGHT: Emu = 15_000_000;
    const MONTH: Emu = (RIGHT - LEFT) / 12;
    const ROW_TOP: Emu = 3_000_000;
    const ROW_BOTTOM: Emu = 4_000_000;
    const ROW_Y: Emu = 3_500_000;

    fn request<'a>(x: Emu, month_index: usize, text: &'a str) -> LabelRequest<'a> {
        LabelRequest {
            row: 0,
            marker: Point::new(x, ROW_Y),
            marker_size: inches(0.3),
            month_index,
            text,
            bucket: "build",
            row_top: ROW_TOP,
            row_bottom: ROW_BOTTOM,
        }
    }

    #[test]
    fn test_wrap_words() {
        assert_eq!(
            wrap_words("one two three four five", 3),
            vec!["one two three".to_string(), "four five".to_string()]
        );
        assert_eq!(wrap_words("   ", 3), vec![String::new()]);
        assert_eq!(wrap_words("a  b", 0), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_side_label_sits_right_of_marker() {
        let config = LayoutConfig::default();
        let mut placer = LabelPlacer::new(&config, LEFT, RIGHT, MONTH);
        let x = LEFT + MONTH * 2;
        let label = placer.place(&request(x, 2, "API beta launch"));
        assert_eq!(label.mode, LabelMode::Side);
        assert_eq!(label.lines, vec!["API beta launch".to_string()]);
        assert!(label.bounds.x0 > x);
        assert_eq!(label.lane, 0);
        assert!(!label.fell_back);
        assert_eq!(label.bounds.center().y, ROW_Y);
    }

    #[test]
    fn test_side_label_flips_left_near_right_edge() {
        let config = LayoutConfig {
            crowded_from_month: 13,
            ..Default::default()
        };
        let mut placer = LabelPlacer::new(&config, LEFT, RIGHT, MONTH);
        let x = RIGHT - 1000;
        let label = placer.place(&request(x, 11, "Year end review"));
        assert_eq!(label.mode, LabelMode::Side);
        assert!(label.bounds.x1 < x);
        assert!(label.bounds.x1 <= RIGHT);
    }

    #[test]
    fn test_crowded_months_wrap_above() {
        let config = LayoutConfig::default();
        let mut placer = LabelPlacer::new(&config, LEFT, RIGHT, MONTH);
        let label = placer.place(&request(LEFT + MONTH * 9, 9, "Launch the new portal everywhere"));
        assert_eq!(label.mode, LabelMode::Above);
        assert_eq!(
            label.lines,
            vec!["Launch the new".to_string(), "portal everywhere".to_string()]
        );
        assert!(label.bounds.y1 < ROW_Y);
        assert_eq!(label.text(), "Launch the new\nportal everywhere");
    }

    #[test]
    fn test_wrap_override_never() {
        let mut config = LayoutConfig::default();
        config.wrap_overrides.insert("build".to_string(), WrapPolicy::Never);
        let mut placer = LabelPlacer::new(&config, LEFT, RIGHT, MONTH);
        let label = placer.place(&request(LEFT + MONTH * 10, 10, "one two three four"));
        assert_eq!(label.mode, LabelMode::Above);
        assert_eq!(label.lines.len(), 1);
    }

    #[test]
    fn test_wrap_override_every_words_applies_to_side_labels() {
        let mut config = LayoutConfig::default();
        config.wrap_overrides.insert("build".to_string(), WrapPolicy::EveryWords(1));
        let mut placer = LabelPlacer::new(&config, LEFT, RIGHT, MONTH);
        let label = placer.place(&request(LEFT, 0, "alpha beta"));
        assert_eq!(label.mode, LabelMode::Side);
        assert_eq!(label.lines, vec!["alpha".to_string(), "beta".to_string()]);
    }

    #[test]
    fn test_colliding_side_labels_move_to_another_lane() {
        let config = LayoutConfig::default();
        let mut placer = LabelPlacer::new(&config, LEFT, RIGHT, MONTH);
        let x = LEFT + MONTH * 2;
        let first = placer.place(&request(x, 2, "Design review"));
        let second = placer.place(&request(x + MONTH / 2, 2, "Beta"));
        assert!(!first.bounds.intersects(&second.bounds));
        assert_ne!(second.lane, 0);
        assert!(!second.fell_back);
    }

    #[test]
    fn test_cluster_flips_preference() {
        let config = LayoutConfig::default();
        let mut placer = LabelPlacer::new(&config, LEFT, RIGHT, MONTH);
        let x = LEFT + MONTH * 10;
        let first = placer.place(&request(x, 10, "First"));
        let second = placer.place(&request(x + 10, 10, "Second"));
        assert!(first.bounds.y1 < ROW_Y);
        assert!(second.bounds.y0 > ROW_Y);
        assert!(!first.bounds.intersects(&second.bounds));
    }

    #[test]
    fn test_side_cluster_prefers_downward_lane() {
        let config = LayoutConfig::default();
        let mut placer = LabelPlacer::new(&config, LEFT, RIGHT, MONTH);
        let x = LEFT + MONTH;
        let first = placer.place(&request(x, 1, "First"));
        let second = placer.place(&request(x, 1, "Second"));
        assert_eq!(second.lane, 1);
        assert!(second.bounds.y0 >= first.bounds.y1);
    }

    #[test]
    fn test_fallback_keeps_first_candidate() {
        let config = LayoutConfig {
            max_lane_tries: 1,
            ..Default::default()
        };
        let mut placer = LabelPlacer::new(&config, LEFT, RIGHT, MONTH);
        let x = LEFT + MONTH;
        let first = placer.place(&request(x, 1, "Same"));
        let second = placer.place(&request(x + MONTH, 1, "Same"));
        assert!(!second.fell_back);
        let third = placer.place(&request(x, 1, "Same"));
        assert!(third.fell_back);
        assert_eq!(third.bounds, first.bounds);
        assert_eq!(placer.fallbacks(), 1);
        assert_eq!(placer.placed_in_row(0).len(), 3);
    }

    #[test]
    fn test_rows_do_not_share_boxes() {
        let config = LayoutConfig::default();
        let mut placer = LabelPlacer::new(&config, LEFT, RIGHT, MONTH);
        let x = LEFT + MONTH;
        placer.place(&request(x, 1, "Kickoff"));
        let mut other_row = request(x, 1, "Kickoff");
        other_row.row = 1;
        let label = placer.place(&other_row);
        assert_eq!(label.lane, 0);
        assert_eq!(placer.placed_in_row(0).len(), 1);
        assert_eq!(placer.placed_in_row(1).len(), 1);
        assert!(placer.placed_in_row(7).is_empty());
    }

    #[test]
    fn test_labels_are_clamped_to_area() {
        let config = LayoutConfig::default();
        let mut placer = LabelPlacer::new(&config, LEFT, RIGHT, MONTH);
        let label = placer.place(&request(RIGHT - 10, 11, "A very long milestone title here"));
        assert!(label.bounds.x0 >= LEFT);
        assert!(label.bounds.x1 <= RIGHT);
        let label = placer.place(&request(LEFT, 11, "Another long milestone title"));
        assert!(label.bounds.x0 >= LEFT);
    }

    #[test]
    fn test_row_containment_is_reported() {
        let config = LayoutConfig::default();
        let mut placer = LabelPlacer::new(&config, LEFT, RIGHT, MONTH);
        let label = placer.place(&request(LEFT + MONTH, 1, "Fits"));
        assert!(label.within_row);

        let mut tight = request(LEFT + MONTH, 1, "Too tall");
        tight.row = 3;
        tight.row_top = ROW_Y - 10;
        tight.row_bottom = ROW_Y + 10;
        assert!(!placer.place(&tight).within_row);
    }

    #[test]
    fn test_fit_lines() {
        let lines = vec!["alpha beta gamma delta".to_string()];
        assert_eq!(
            fit_lines(&lines, 11),
            vec!["alpha beta".to_string(), "gamma delta".to_string()]
        );
        assert_eq!(
            fit_lines(&["abcdefgh".to_string()], 3),
            vec!["abc".to_string(), "def".to_string(), "gh".to_string()]
        );
        assert_eq!(fit_lines(&[String::new()], 5), vec![String::new()]);
        assert_eq!(fit_lines(&["short".to_string()], 20), vec!["short".to_string()]);
    }

    #[test]
    fn test_long_side_title_box_holds_its_text() {
        let config = LayoutConfig::default();
        let mut placer = LabelPlacer::new(&config, LEFT, RIGHT, MONTH);
        let xa = LEFT + MONTH;
        let title = "Platform migration readiness review and signoff";
        let a = placer.place(&request(xa, 1, title));

        assert_eq!(a.mode, LabelMode::Side);
        assert!(a.lines.len() > 1);
        assert_eq!(a.lines.join(" "), title);
        let longest = a.lines.iter().map(|l| l.chars().count()).max().unwrap();
        assert!(a.bounds.width() >= inches(longest as f64 * config.char_width));
        assert_eq!(
            a.bounds.height(),
            inches(config.label_line_height) * a.lines.len() as Emu
        );

        let b = placer.place(&request(xa + inches(2.3), 1, "Go live"));
        assert!(!a.bounds.intersects(&b.bounds));
        assert!(!b.fell_back);
    }

    #[test]
    fn test_fallback_picks_least_overlapping_candidate() {
        let config = LayoutConfig {
            max_lane_tries: 3,
            ..Default::default()
        };
        let mut placer = LabelPlacer::new(&config, LEFT, RIGHT, MONTH);
        let req = request(LEFT + MONTH, 1, "Blocked");
        let mode = placer.mode_for(req.month_index);
        let lines = placer.lines_for(req.text, req.bucket, mode);
        let size = placer.measure(&lines);
        let candidates = placer.candidates(&req, mode, size, true);
        assert_eq!(candidates.len(), 3);

        let (_, sliver_target) = candidates[2];
        let sliver = Rect::new(
            sliver_target.x0,
            sliver_target.y0,
            sliver_target.x0 + 10,
            sliver_target.y0 + 10,
        );
        let state = placer.rows.entry(0).or_default();
        state.placed = vec![candidates[0].1, candidates[1].1, sliver];

        let label = placer.place(&req);
        assert!(label.fell_back);
        assert_eq!(label.lane, candidates[2].0);
        assert_eq!(label.bounds, candidates[2].1);
        assert_eq!(placer.fallbacks(), 1);
    }

    #[test]
    fn test_width_is_capped() {
        let config = LayoutConfig::default();
        let placer = LabelPlacer::new(&config, LEFT, RIGHT, MONTH);
        let (w, h) = placer.measure(&["x".repeat(200)]);
        assert_eq!(w, inches(2.2));
        assert_eq!(h, inches(0.2));
        let (w, _) = placer.measure(&["ab".to_string()]);
        assert!(w < inches(2.2));
    }

    proptest! {
        #[test]
        fn prop_distant_markers_do_not_overlap(
            start in 0i64..(MONTH * 6),
            extra in 1i64..(MONTH * 3),
            month_a in 0usize..12,
            month_b in 0usize..12,
            text_a in "[a-z]{1,12}( [a-z]{1,8}){0,4}",
            text_b in "[a-z]{1,12}( [a-z]{1,8}){0,4}",
        ) {
            let config = LayoutConfig::default();
            let mut placer = LabelPlacer::new(&config, LEFT, RIGHT, MONTH);
            let xa = LEFT + start;
            let xb = xa + inches(config.label_width) + extra;
            let a = placer.place(&request(xa, month_a, &text_a));
            let b = placer.place(&request(xb, month_b, &text_b));
            prop_assert!(!a.bounds.intersects(&b.bounds));
            prop_assert!(!b.fell_back);
        }
    }
}
