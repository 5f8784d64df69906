use chrono::{Duration, NaiveDate};
use serde::Serialize;

use crate::model::TimelineMode;

/// Width of the start (circle) and end (triangle) markers.
pub const HANDLE_SIZE: f64 = 10.0;

/// Horizontal geometry of a project's baseline, relative to the left edge
/// of the first visible column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePositions {
    pub baseline_start_px: f64,
    pub baseline_width_px: f64,
    pub circle_left_px: f64,
    pub triangle_left_px: f64,
    /// Any part of the project falls inside the window.
    pub visible: bool,
    /// The project continues past the left edge; its left side is drawn open.
    pub starts_before_viewport: bool,
    /// The project continues past the right edge (or is open-ended).
    pub ends_after_viewport: bool,
}

impl TimelinePositions {
    pub fn is_finite(&self) -> bool {
        [
            self.baseline_start_px,
            self.baseline_width_px,
            self.circle_left_px,
            self.triangle_left_px,
        ]
        .iter()
        .all(|v| v.is_finite())
    }

    pub fn baseline_end_px(&self) -> f64 {
        self.baseline_start_px + self.baseline_width_px
    }
}

/// Left pixel offset of `date` given the sorted visible column dates.
///
/// In week mode a date lands inside its week column, one day-width per day.
/// Dates before the first column map to 0; dates after the last map to the
/// right edge.
pub fn date_offset_px(date: NaiveDate, dates: &[NaiveDate], mode: TimelineMode) -> f64 {
    match mode {
        TimelineMode::Days => dates.partition_point(|d| *d < date) as f64 * mode.column_width(),
        TimelineMode::Weeks => {
            let index = dates.partition_point(|c| *c + Duration::days(7) <= date);
            let base = index as f64 * mode.column_width();
            match dates.get(index) {
                Some(column) if *column <= date => {
                    base + (date - *column).num_days() as f64 * mode.day_width()
                }
                _ => base,
            }
        }
    }
}

/// Left offset and width of the cell for a single day.
pub fn day_cell_px(date: NaiveDate, dates: &[NaiveDate], mode: TimelineMode) -> (f64, f64) {
    (date_offset_px(date, dates, mode), mode.day_width())
}

/// Compute baseline and marker offsets for a project spanning
/// `project_start..=project_end` (`None` end: open-ended) inside the
/// window `viewport_start..=viewport_end` whose columns are `dates`.
pub fn get_timeline_positions(
    project_start: NaiveDate,
    project_end: Option<NaiveDate>,
    viewport_start: NaiveDate,
    viewport_end: NaiveDate,
    dates: &[NaiveDate],
    mode: TimelineMode,
) -> TimelinePositions {
    // The first drawn column may begin before `viewport_start` (week mode
    // aligns it to a Monday); that column's left edge is the window edge.
    let left_edge = dates.first().map_or(viewport_start, |first| (*first).min(viewport_start));
    let end = project_end.unwrap_or(viewport_end);
    if end < project_start || end < left_edge || project_start > viewport_end {
        return TimelinePositions::default();
    }

    let day_width = mode.day_width();
    let clamped_start = project_start.max(left_edge);
    let clamped_end = end.min(viewport_end);

    let start_px = date_offset_px(clamped_start, dates, mode);
    let end_px = date_offset_px(clamped_end, dates, mode) + day_width;

    // Markers of a clipped project sit off-screen at their true position.
    let hidden_before = (clamped_start - project_start).num_days() as f64 * day_width;
    let hidden_after = (end - clamped_end).num_days() as f64 * day_width;

    TimelinePositions {
        baseline_start_px: start_px,
        baseline_width_px: (end_px - start_px).max(0.0),
        circle_left_px: start_px - hidden_before - HANDLE_SIZE / 2.0,
        triangle_left_px: end_px + hidden_after - HANDLE_SIZE / 2.0,
        visible: true,
        starts_before_viewport: project_start < left_edge,
        ends_after_viewport: project_end.is_none() || end > viewport_end,
    }
}
