use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Pixel width of one day column in [`TimelineMode::Days`].
pub const DAY_COLUMN_WIDTH: f64 = 40.0;
/// Pixel width of one week column in [`TimelineMode::Weeks`].
pub const WEEK_COLUMN_WIDTH: f64 = 77.0;

/// Controls what granularity the timeline columns display.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimelineMode {
    #[default]
    Days,
    Weeks,
}

impl TimelineMode {
    pub fn column_width(self) -> f64 {
        match self {
            TimelineMode::Days => DAY_COLUMN_WIDTH,
            TimelineMode::Weeks => WEEK_COLUMN_WIDTH,
        }
    }

    /// Pixels covered by a single day.
    pub fn day_width(self) -> f64 {
        match self {
            TimelineMode::Days => DAY_COLUMN_WIDTH,
            TimelineMode::Weeks => WEEK_COLUMN_WIDTH / 7.0,
        }
    }
}

/// The visible window of the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineViewport {
    /// The leftmost visible date.
    pub start: NaiveDate,
    /// The rightmost visible date.
    pub end: NaiveDate,
    pub mode: TimelineMode,
}

impl TimelineViewport {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end: end.max(start),
            mode: TimelineMode::Days,
        }
    }

    pub fn with_mode(mut self, mode: TimelineMode) -> Self {
        self.mode = mode;
        self
    }

    /// Column dates: every day, or the Monday of every touched week.
    pub fn visible_dates(&self) -> Vec<NaiveDate> {
        let (first, step) = match self.mode {
            TimelineMode::Days => (self.start, 1),
            TimelineMode::Weeks => (week_start(self.start), 7),
        };
        let mut dates = Vec::new();
        let mut date = first;
        while date <= self.end {
            dates.push(date);
            date += Duration::days(step);
        }
        dates
    }

    /// Every day in the window, regardless of mode.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let start = self.start;
        let count = (self.end - self.start).num_days() + 1;
        (0..count.max(0)).map(move |i| start + Duration::days(i))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Total width in pixels for the visible range.
    pub fn total_width(&self) -> f64 {
        self.visible_dates().len() as f64 * self.mode.column_width()
    }

    /// Convert a pointer movement in pixels into a fractional day delta.
    pub fn px_to_days(&self, delta_px: f64) -> f64 {
        delta_px / self.mode.day_width()
    }

    /// Scroll the viewport by a number of days.
    pub fn scroll_days(&mut self, days: i64) {
        self.start += Duration::days(days);
        self.end += Duration::days(days);
    }
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}
