use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use uuid::Uuid;

use crate::model::CalendarEvent;

/// Event time recorded against one project on one day.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DayEvents {
    pub planned_hours: f64,
    pub completed_hours: f64,
    pub has_planned: bool,
    pub has_completed: bool,
}

impl DayEvents {
    pub fn hours(&self) -> f64 {
        self.planned_hours + self.completed_hours
    }
}

/// Per-day event totals for a single project within a date range.
#[derive(Debug, Clone, Default)]
pub struct ProjectEvents {
    by_date: BTreeMap<NaiveDate, DayEvents>,
}

impl ProjectEvents {
    /// Collect the project's events and habits falling inside `start..=end`.
    /// Tasks and other projects' events are ignored.
    pub fn collect(
        project_id: Uuid,
        events: &[CalendarEvent],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Self {
        let mut by_date: BTreeMap<NaiveDate, DayEvents> = BTreeMap::new();
        let relevant = events
            .iter()
            .filter(|e| e.project_id == Some(project_id) && e.counts_as_project_time());

        for event in relevant {
            let mut date = event.start_time.date().max(start);
            let last = event.end_time.date().min(end);
            while date <= last {
                if event.overlaps(date) {
                    let hours = event.hours_on(date);
                    let day = by_date.entry(date).or_default();
                    // Hours land in one bucket; a ticked-off planned event
                    // still counts as planned time.
                    if event.is_planned() {
                        day.planned_hours += hours;
                    } else {
                        day.completed_hours += hours;
                    }
                    day.has_planned |= event.is_planned();
                    day.has_completed |= event.is_completed();
                }
                date += Duration::days(1);
            }
        }

        Self { by_date }
    }

    pub fn on(&self, date: NaiveDate) -> Option<&DayEvents> {
        self.by_date.get(&date)
    }

    pub fn has_event_on(&self, date: NaiveDate) -> bool {
        self.by_date.contains_key(&date)
    }

    /// Total event hours within `start..=end`.
    pub fn hours_between(&self, start: NaiveDate, end: NaiveDate) -> f64 {
        if end < start {
            return 0.0;
        }
        self.by_date.range(start..=end).map(|(_, d)| d.hours()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_date.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventCategory, EventType};
    use chrono::NaiveDateTime;

    fn at(day: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[test]
    fn splits_planned_and_completed_hours() {
        let project = Uuid::new_v4();
        let events = vec![
            CalendarEvent::new("a", at(4, 9), at(4, 11)).for_project(project),
            CalendarEvent::new("b", at(4, 13), at(4, 14))
                .for_project(project)
                .with_type(EventType::Tracked),
            CalendarEvent::new("other", at(4, 9), at(4, 17)).for_project(Uuid::new_v4()),
            CalendarEvent::new("todo", at(5, 9), at(5, 10))
                .for_project(project)
                .with_category(EventCategory::Task),
        ];
        let index = ProjectEvents::collect(project, &events, d(1), d(31));

        let day = index.on(d(4)).copied().unwrap();
        assert_eq!(day.planned_hours, 2.0);
        assert_eq!(day.completed_hours, 1.0);
        assert!(day.has_planned && day.has_completed);
        assert!(!index.has_event_on(d(5)));
        assert_eq!(index.hours_between(d(1), d(31)), 3.0);
    }

    #[test]
    fn ticked_off_planned_event_carries_both_markers() {
        let project = Uuid::new_v4();
        let events = vec![CalendarEvent::new("done", at(5, 9), at(5, 12))
            .for_project(project)
            .with_type(EventType::Planned)
            .mark_completed()];
        let index = ProjectEvents::collect(project, &events, d(1), d(31));

        let day = index.on(d(5)).copied().unwrap();
        assert!(day.has_planned && day.has_completed);
        assert_eq!(day.planned_hours, 3.0);
        assert_eq!(day.completed_hours, 0.0);
        assert_eq!(day.hours(), 3.0);
    }

    #[test]
    fn clips_to_the_requested_range() {
        let project = Uuid::new_v4();
        let events = vec![CalendarEvent::new("long", at(3, 12), at(6, 12)).for_project(project)];
        let index = ProjectEvents::collect(project, &events, d(4), d(5));
        assert!(!index.has_event_on(d(3)));
        assert!(index.has_event_on(d(4)));
        assert!(!index.has_event_on(d(6)));
        assert_eq!(index.hours_between(d(4), d(5)), 48.0);
        assert_eq!(index.hours_between(d(6), d(4)), 0.0);
    }
}
