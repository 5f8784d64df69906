use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What kind of calendar entry an event is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    #[default]
    Event,
    Habit,
    Task,
}

/// How an event's time was recorded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    #[default]
    Planned,
    Tracked,
    Completed,
}

/// A calendar entry, optionally attached to a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarEvent {
    pub id: Uuid,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub project_id: Option<Uuid>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    /// Hours.
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub category: EventCategory,
    #[serde(default, rename = "type")]
    pub event_type: EventType,
}

impl CalendarEvent {
    pub fn new(title: impl Into<String>, start_time: NaiveDateTime, end_time: NaiveDateTime) -> Self {
        let end_time = end_time.max(start_time);
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            project_id: None,
            start_time,
            end_time,
            duration: (end_time - start_time).num_minutes() as f64 / 60.0,
            completed: false,
            category: EventCategory::Event,
            event_type: EventType::Planned,
        }
    }

    pub fn for_project(mut self, project_id: Uuid) -> Self {
        self.project_id = Some(project_id);
        self
    }

    pub fn with_category(mut self, category: EventCategory) -> Self {
        self.category = category;
        self
    }

    pub fn with_type(mut self, event_type: EventType) -> Self {
        self.event_type = event_type;
        self
    }

    pub fn mark_completed(mut self) -> Self {
        self.completed = true;
        self
    }

    /// Events and habits occupy project time; tasks do not.
    pub fn counts_as_project_time(&self) -> bool {
        matches!(self.category, EventCategory::Event | EventCategory::Habit)
    }

    /// Work that has been done: flagged complete, or recorded after the fact.
    pub fn is_completed(&self) -> bool {
        self.completed || matches!(self.event_type, EventType::Completed | EventType::Tracked)
    }

    /// Scheduled work. An event can be both planned and completed when a
    /// planned entry has been ticked off.
    pub fn is_planned(&self) -> bool {
        self.event_type == EventType::Planned
    }

    pub fn overlaps(&self, date: NaiveDate) -> bool {
        let (day_start, day_end) = day_bounds(date);
        if self.start_time == self.end_time {
            return day_start <= self.start_time && self.start_time < day_end;
        }
        self.start_time < day_end && self.end_time > day_start
    }

    /// Hours this event credits to `date`.
    ///
    /// A single-day event credits its recorded duration; a multi-day event
    /// credits the part of its span falling on that day.
    pub fn hours_on(&self, date: NaiveDate) -> f64 {
        if !self.overlaps(date) {
            return 0.0;
        }
        let same_day = self.start_time.date() == self.end_time.date()
            || self.end_time == day_bounds(self.start_time.date()).1;
        if same_day && self.duration > 0.0 {
            return self.duration;
        }
        let (day_start, day_end) = day_bounds(date);
        let from = self.start_time.max(day_start);
        let to = self.end_time.min(day_end);
        ((to - from).num_minutes().max(0) as f64) / 60.0
    }
}

fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_time(NaiveTime::default());
    let end = date
        .succ_opt()
        .map(|next| next.and_time(NaiveTime::default()))
        .unwrap_or(NaiveDateTime::MAX);
    (start, end)
}
