//! Splitting a project's hour budget into milestone segments.
//!
//! Consecutive milestone due dates cut the project range into contiguous
//! segments. Each segment spreads its hours evenly over its working days;
//! the segment after the last milestone takes whatever part of the project
//! budget the milestones did not claim.

use chrono::{Duration, NaiveDate};
use tracing::debug;
use uuid::Uuid;

use super::events::ProjectEvents;
use super::work_hours::WorkCalendar;
use crate::model::{CalendarEvent, Milestone};

/// A contiguous run of days sharing one hourly rate.
#[derive(Debug, Clone, PartialEq)]
pub struct MilestoneSegment {
    /// The milestone closing this segment; `None` for the trailing remainder.
    pub milestone_id: Option<Uuid>,
    pub milestone_name: Option<String>,
    pub start: NaiveDate,
    /// Inclusive.
    pub end: NaiveDate,
    /// Hours assigned to the segment before events are taken out.
    pub allocated_hours: f64,
    /// Event hours inside the segment, already spent from the allocation.
    pub event_hours: f64,
    /// Days that take a share of the remaining hours.
    pub working_days: u32,
    pub hours_per_day: f64,
}

impl MilestoneSegment {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Hours spread across the segment's working days.
    pub fn spread_hours(&self) -> f64 {
        self.hours_per_day * self.working_days as f64
    }
}

/// Milestones of `project_id` that should take part in segmentation.
///
/// When the project has a recurring template, numbered non-recurring
/// instances (`"<name> <n>"`) are generated copies and are dropped so the
/// template's hours are only counted once.
pub fn effective_milestones(project_id: Uuid, milestones: &[Milestone]) -> Vec<&Milestone> {
    let mut own: Vec<&Milestone> = milestones
        .iter()
        .filter(|m| m.project_id == project_id)
        .collect();

    if own.iter().any(|m| m.is_recurring) {
        own.retain(|m| m.is_recurring || !m.is_numbered_instance());
    }

    own.sort_by_key(|m| m.due_date);
    own
}

/// Partition `start..=end` at milestone due dates and compute each
/// segment's daily rate.
///
/// `total_budget_hours` is the whole project's budget; anything above the
/// milestones' combined allocation goes to the trailing segment (or to the
/// last milestone when it is due on `end`). Returns no segments when the
/// project has no usable milestones.
pub fn calculate_milestone_segments(
    project_id: Uuid,
    start: NaiveDate,
    end: NaiveDate,
    milestones: &[Milestone],
    calendar: &WorkCalendar<'_>,
    events: &[CalendarEvent],
    total_budget_hours: Option<f64>,
) -> Vec<MilestoneSegment> {
    if end < start {
        return Vec::new();
    }

    let mut bounds: Vec<(NaiveDate, f64, &Milestone)> = Vec::new();
    for milestone in effective_milestones(project_id, milestones) {
        if milestone.due_date < start || milestone.due_date > end {
            debug!(
                milestone = %milestone.name,
                due = %milestone.due_date,
                "milestone outside project range, ignored"
            );
            continue;
        }
        let hours = finite_or_zero(milestone.time_allocation).max(0.0);
        match bounds.last_mut() {
            Some((due, total, _)) if *due == milestone.due_date => *total += hours,
            _ => bounds.push((milestone.due_date, hours, milestone)),
        }
    }

    if bounds.is_empty() {
        return Vec::new();
    }

    let claimed: f64 = bounds.iter().map(|(_, hours, _)| hours).sum();
    let remainder = total_budget_hours
        .map(|total| (finite_or_zero(total) - claimed).max(0.0))
        .unwrap_or(0.0);

    let mut ranges: Vec<(NaiveDate, NaiveDate, f64, Option<&Milestone>)> = Vec::new();
    let mut next_start = start;
    for (due, hours, milestone) in &bounds {
        ranges.push((next_start, *due, *hours, Some(*milestone)));
        next_start = *due + Duration::days(1);
    }
    if next_start <= end {
        ranges.push((next_start, end, remainder, None));
    } else if let Some(last) = ranges.last_mut() {
        last.2 += remainder;
    }

    let project_events = ProjectEvents::collect(project_id, events, start, end);
    ranges
        .into_iter()
        .map(|(seg_start, seg_end, hours, milestone)| {
            build_segment(seg_start, seg_end, hours, milestone, calendar, &project_events)
        })
        .collect()
}

fn build_segment(
    start: NaiveDate,
    end: NaiveDate,
    allocated_hours: f64,
    milestone: Option<&Milestone>,
    calendar: &WorkCalendar<'_>,
    events: &ProjectEvents,
) -> MilestoneSegment {
    let working_days = rate_days(start, end, calendar, events);
    let event_hours = events.hours_between(start, end);
    let budget = (allocated_hours - event_hours).max(0.0);
    let hours_per_day = if working_days > 0 {
        budget / working_days as f64
    } else {
        0.0
    };

    MilestoneSegment {
        milestone_id: milestone.map(|m| m.id),
        milestone_name: milestone.map(|m| m.name.clone()),
        start,
        end,
        allocated_hours,
        event_hours,
        working_days,
        hours_per_day,
    }
}

/// Days in `start..=end` that share a budget: rate-bearing per the calendar
/// and not already covered by an event.
pub(crate) fn rate_days(
    start: NaiveDate,
    end: NaiveDate,
    calendar: &WorkCalendar<'_>,
    events: &ProjectEvents,
) -> u32 {
    let mut count = 0;
    let mut date = start;
    while date <= end {
        if calendar.counts_toward_rate(date) && !events.has_event_on(date) {
            count += 1;
        }
        date += Duration::days(1);
    }
    count
}

/// The segment covering `date`, if any.
pub fn get_milestone_segment_for_date(
    segments: &[MilestoneSegment],
    date: NaiveDate,
) -> Option<&MilestoneSegment> {
    segments.iter().find(|s| s.contains(date))
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}
