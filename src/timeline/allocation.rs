//! Deciding what a project's timeline shows on each day.
//!
//! A day carries event time (planned or completed), an auto-estimate drawn
//! from the milestone segment covering it or from an even split of the
//! project's remaining hours, or nothing. The first rule that applies wins:
//! holiday, outside the project range, events, auto-estimate, none.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::events::ProjectEvents;
use super::milestones::{
    calculate_milestone_segments, get_milestone_segment_for_date, rate_days, MilestoneSegment,
};
use super::work_hours::{HolidayPolicy, WorkCalendar};
use crate::model::{CalendarEvent, Holiday, Milestone, Project, Settings};

/// Hours that fill one bar to its full height.
pub const FULL_BAR_HOURS: f64 = 8.0;
/// Every further block of this many hours adds one overflow layer.
pub const OVERFLOW_STEP_HOURS: f64 = 8.0;
/// Overflow layers stop stacking here.
pub const MAX_OVERFLOW_LAYERS: u8 = 2;
/// Smallest height drawn for a day with any hours.
pub const MIN_VISIBLE_HEIGHT: f64 = 2.0;

/// Which type a day takes when it has both planned and completed events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixedEventPolicy {
    #[default]
    PreferPlanned,
    PreferCompleted,
}

/// Row height preset; sets the cap on a day bar's height.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowMode {
    #[default]
    Compact,
    Expanded,
}

impl RowMode {
    pub fn max_height(self) -> f64 {
        match self {
            RowMode::Compact => 28.0,
            RowMode::Expanded => 40.0,
        }
    }
}

/// Tunables for how hours are resolved and drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocationPolicy {
    pub holiday_policy: HolidayPolicy,
    pub mixed_event_policy: MixedEventPolicy,
    pub row_mode: RowMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AllocationType {
    None,
    Planned,
    Completed,
    AutoEstimate,
}

/// Vertical size of a day bar.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BarHeight {
    pub height_px: f64,
    /// Stacked layers drawn for hours beyond a full bar.
    pub overflow_layers: u8,
}

/// Map hours to a capped bar height plus overflow layers.
///
/// Monotonic in `hours`; non-positive or non-finite hours give an empty bar.
pub fn bar_height(hours: f64, row_mode: RowMode) -> BarHeight {
    if !hours.is_finite() || hours <= 0.0 {
        return BarHeight::default();
    }
    let max = row_mode.max_height();
    let height_px = (hours.min(FULL_BAR_HOURS) / FULL_BAR_HOURS * max).max(MIN_VISIBLE_HEIGHT);
    let extra = ((hours - FULL_BAR_HOURS) / OVERFLOW_STEP_HOURS).ceil().max(0.0);
    let overflow_layers = extra.min(MAX_OVERFLOW_LAYERS as f64) as u8;
    BarHeight {
        height_px,
        overflow_layers,
    }
}

/// What one project shows on one day.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeAllocation {
    pub allocation_type: AllocationType,
    pub hours: f64,
    pub height_in_pixels: f64,
    pub overflow_layers: u8,
    /// The day has planned and completed events at once.
    pub is_planned_and_completed: bool,
    pub milestone_segment: Option<MilestoneSegment>,
}

impl TimeAllocation {
    pub fn none() -> Self {
        Self {
            allocation_type: AllocationType::None,
            hours: 0.0,
            height_in_pixels: 0.0,
            overflow_layers: 0,
            is_planned_and_completed: false,
            milestone_segment: None,
        }
    }

    fn with_hours(allocation_type: AllocationType, hours: f64, row_mode: RowMode) -> Self {
        let bar = bar_height(hours, row_mode);
        Self {
            allocation_type,
            hours,
            height_in_pixels: bar.height_px,
            overflow_layers: bar.overflow_layers,
            ..Self::none()
        }
    }

    pub fn is_none(&self) -> bool {
        self.allocation_type == AllocationType::None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EstimateSource {
    Event,
    MilestoneAllocation,
    AutoEstimate,
}

impl EstimateSource {
    pub fn as_str(self) -> &'static str {
        match self {
            EstimateSource::Event => "event",
            EstimateSource::MilestoneAllocation => "milestone-allocation",
            EstimateSource::AutoEstimate => "auto-estimate",
        }
    }
}

/// Hours attributed to a project on one day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayEstimate {
    pub date: NaiveDate,
    pub hours: f64,
    pub source: EstimateSource,
    pub is_planned_event: bool,
    pub is_completed_event: bool,
}

/// Everything besides the project needed to resolve its days.
#[derive(Debug, Clone, Copy)]
pub struct AllocationInputs<'a> {
    pub settings: &'a Settings,
    pub holidays: &'a [Holiday],
    pub events: &'a [CalendarEvent],
    pub milestones: &'a [Milestone],
    /// End of the visible window; continuous projects run up to it.
    pub viewport_end: NaiveDate,
    pub policy: AllocationPolicy,
}

/// Resolves days for one project, with segments and the even-split rate
/// computed once up front.
#[derive(Debug, Clone)]
pub struct ProjectAllocator<'a> {
    project: &'a Project,
    calendar: WorkCalendar<'a>,
    policy: AllocationPolicy,
    range: Option<(NaiveDate, NaiveDate)>,
    events: ProjectEvents,
    segments: Vec<MilestoneSegment>,
    even_split_rate: f64,
}

impl<'a> ProjectAllocator<'a> {
    /// Segments are derived from `inputs.milestones`.
    pub fn new(project: &'a Project, inputs: &AllocationInputs<'a>) -> Self {
        let mut allocator = Self::with_segments(project, inputs, Vec::new());
        if let Some((start, end)) = allocator.range {
            allocator.segments = calculate_milestone_segments(
                project.id,
                start,
                end,
                inputs.milestones,
                &allocator.calendar,
                inputs.events,
                Some(project.estimated_hours),
            );
        }
        allocator
    }

    /// Use precomputed `segments` instead of deriving them.
    pub fn with_segments(
        project: &'a Project,
        inputs: &AllocationInputs<'a>,
        segments: Vec<MilestoneSegment>,
    ) -> Self {
        let calendar = WorkCalendar::new(inputs.settings, inputs.holidays)
            .with_weekdays(project.auto_estimate_days)
            .with_policy(inputs.policy.holiday_policy);
        let range = project.date_range(inputs.viewport_end);
        if range.is_none() {
            debug!(project = %project.name, "project has no usable date range");
        }

        let (events, even_split_rate) = match range {
            Some((start, end)) => {
                let events = ProjectEvents::collect(project.id, inputs.events, start, end);
                let rate = even_split_rate(project.estimated_hours, start, end, &calendar, &events);
                (events, rate)
            }
            None => (ProjectEvents::default(), 0.0),
        };

        Self {
            project,
            calendar,
            policy: inputs.policy,
            range,
            events,
            segments,
            even_split_rate,
        }
    }

    pub fn segments(&self) -> &[MilestoneSegment] {
        &self.segments
    }

    /// Hours per day used when no milestone segment covers a day.
    pub fn even_split_rate(&self) -> f64 {
        self.even_split_rate
    }

    pub fn resolve(&self, date: NaiveDate) -> TimeAllocation {
        let row_mode = self.policy.row_mode;

        if self.calendar.is_holiday(date) {
            return TimeAllocation::none();
        }

        let Some((start, end)) = self.range else {
            return TimeAllocation::none();
        };
        if date < start || date > end {
            return TimeAllocation::none();
        }

        if let Some(day) = self.events.on(date) {
            let mixed = day.has_planned && day.has_completed;
            let allocation_type = match (day.has_planned, day.has_completed) {
                (true, true) => match self.policy.mixed_event_policy {
                    MixedEventPolicy::PreferPlanned => AllocationType::Planned,
                    MixedEventPolicy::PreferCompleted => AllocationType::Completed,
                },
                (true, false) => AllocationType::Planned,
                (false, true) => AllocationType::Completed,
                (false, false) => AllocationType::None,
            };
            if allocation_type != AllocationType::None {
                let mut allocation = TimeAllocation::with_hours(allocation_type, day.hours(), row_mode);
                allocation.is_planned_and_completed = mixed;
                return allocation;
            }
        }

        if self.project.auto_estimates_on(date) && self.calendar.capacity(date) > 0.0 {
            let segment = get_milestone_segment_for_date(&self.segments, date);
            let hours = match segment {
                Some(segment) => segment.hours_per_day,
                None => self.even_split_rate,
            };
            if hours > 0.0 {
                let mut allocation =
                    TimeAllocation::with_hours(AllocationType::AutoEstimate, hours, row_mode);
                allocation.milestone_segment = segment.cloned();
                return allocation;
            }
        }

        TimeAllocation::none()
    }

    /// Estimates for every day in `from..=to` that carries hours.
    pub fn day_estimates(&self, from: NaiveDate, to: NaiveDate) -> Vec<DayEstimate> {
        let mut out = Vec::new();
        let mut date = from;
        while date <= to {
            let allocation = self.resolve(date);
            if let Some(estimate) = self.to_estimate(date, &allocation) {
                out.push(estimate);
            }
            date += Duration::days(1);
        }
        out
    }

    fn to_estimate(&self, date: NaiveDate, allocation: &TimeAllocation) -> Option<DayEstimate> {
        let source = match allocation.allocation_type {
            AllocationType::None => return None,
            AllocationType::Planned | AllocationType::Completed => EstimateSource::Event,
            AllocationType::AutoEstimate if allocation.milestone_segment.is_some() => {
                EstimateSource::MilestoneAllocation
            }
            AllocationType::AutoEstimate => EstimateSource::AutoEstimate,
        };
        let day = self.events.on(date).copied().unwrap_or_default();
        Some(DayEstimate {
            date,
            hours: allocation.hours,
            source,
            is_planned_event: day.has_planned,
            is_completed_event: day.has_completed,
        })
    }
}

/// Resolve a single day against precomputed milestone segments.
pub fn resolve_allocation(
    project: &Project,
    date: NaiveDate,
    inputs: &AllocationInputs<'_>,
    segments: &[MilestoneSegment],
) -> TimeAllocation {
    ProjectAllocator::with_segments(project, inputs, segments.to_vec()).resolve(date)
}

/// Remaining project hours (after event time) spread evenly over the
/// rate-bearing days without events.
fn even_split_rate(
    estimated_hours: f64,
    start: NaiveDate,
    end: NaiveDate,
    calendar: &WorkCalendar<'_>,
    events: &ProjectEvents,
) -> f64 {
    if !estimated_hours.is_finite() || estimated_hours <= 0.0 {
        return 0.0;
    }
    let days = rate_days(start, end, calendar, events);
    if days == 0 {
        return 0.0;
    }
    let remaining = (estimated_hours - events.hours_between(start, end)).max(0.0);
    remaining / days as f64
}
