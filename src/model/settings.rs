use chrono::{Duration, NaiveDate, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ModelError;

/// Maximum number of work slots configured for a single weekday.
pub const MAX_SLOTS_PER_DAY: usize = 6;

/// Work slot boundaries must fall on this many minutes.
pub const SLOT_GRANULARITY_MINUTES: u32 = 15;

/// A block of working time within a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkSlot {
    pub id: Uuid,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    #[serde(with = "hhmm")]
    pub end_time: NaiveTime,
    /// Length in hours.
    pub duration: f64,
}

impl WorkSlot {
    pub fn new(start_time: NaiveTime, end_time: NaiveTime) -> Result<Self, ModelError> {
        let slot = Self {
            id: Uuid::new_v4(),
            start_time,
            end_time,
            duration: hours_between(start_time, end_time),
        };
        slot.validate()?;
        Ok(slot)
    }

    /// Build a slot from whole hours, e.g. `WorkSlot::hours(9, 17)`.
    pub fn hours(start: u32, end: u32) -> Result<Self, ModelError> {
        let at = |h: u32| {
            NaiveTime::from_hms_opt(h, 0, 0).ok_or_else(|| ModelError::SlotGranularity(h.to_string()))
        };
        Self::new(at(start)?, at(end)?)
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        for t in [self.start_time, self.end_time] {
            if t.minute() % SLOT_GRANULARITY_MINUTES != 0 || t.second() != 0 {
                return Err(ModelError::SlotGranularity(t.format("%H:%M:%S").to_string()));
            }
        }
        if self.end_time < self.start_time {
            return Err(ModelError::SlotEndsBeforeStart {
                start: self.start_time.format("%H:%M").to_string(),
                end: self.end_time.format("%H:%M").to_string(),
            });
        }
        let expected = hours_between(self.start_time, self.end_time);
        if (self.duration - expected).abs() > 1e-6 {
            return Err(ModelError::SlotDurationMismatch {
                start: self.start_time.format("%H:%M").to_string(),
                end: self.end_time.format("%H:%M").to_string(),
                found: self.duration,
            });
        }
        Ok(())
    }
}

fn hours_between(start: NaiveTime, end: NaiveTime) -> f64 {
    ((end - start).num_minutes().max(0) as f64) / 60.0
}

/// Ordered work slots for each weekday.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeeklyWorkHours {
    pub monday: Vec<WorkSlot>,
    pub tuesday: Vec<WorkSlot>,
    pub wednesday: Vec<WorkSlot>,
    pub thursday: Vec<WorkSlot>,
    pub friday: Vec<WorkSlot>,
    pub saturday: Vec<WorkSlot>,
    pub sunday: Vec<WorkSlot>,
}

impl WeeklyWorkHours {
    pub fn for_weekday(&self, weekday: Weekday) -> &[WorkSlot] {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    pub fn for_weekday_mut(&mut self, weekday: Weekday) -> &mut Vec<WorkSlot> {
        match weekday {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        }
    }
}

/// User calendar settings consumed by the allocation core.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub weekly_work_hours: WeeklyWorkHours,
}

impl Settings {
    /// 09:00-17:00 Monday to Friday.
    pub fn standard() -> Self {
        let mut weekly = WeeklyWorkHours::default();
        for weekday in [Weekday::Mon, Weekday::Tue, Weekday::Wed, Weekday::Thu, Weekday::Fri] {
            if let Ok(slot) = WorkSlot::hours(9, 17) {
                weekly.for_weekday_mut(weekday).push(slot);
            }
        }
        Self {
            weekly_work_hours: weekly,
        }
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        for weekday in WEEK {
            let slots = self.weekly_work_hours.for_weekday(weekday);
            if slots.len() > MAX_SLOTS_PER_DAY {
                return Err(ModelError::TooManySlots {
                    weekday: weekday.to_string(),
                    count: slots.len(),
                    max: MAX_SLOTS_PER_DAY,
                });
            }
            slots.iter().try_for_each(WorkSlot::validate)?;
        }
        Ok(())
    }
}

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// A day or inclusive run of days without work capacity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Holiday {
    pub id: Uuid,
    pub name: String,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
}

impl Holiday {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            start_date: date,
            end_date: None,
        }
    }

    pub fn range(name: impl Into<String>, start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            end_date: Some(end.max(start)),
            ..Self::new(name, start)
        }
    }

    pub fn last_day(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.start_date).max(self.start_date)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.last_day()
    }

    pub fn days(&self) -> i64 {
        (self.last_day() - self.start_date).num_days() + 1
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        (0..self.days()).map(move |i| self.start_date + Duration::days(i))
    }
}

/// Serde helper storing [`NaiveTime`] as `HH:MM`.
mod hhmm {
    use chrono::NaiveTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(s.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(s.trim(), "%H:%M:%S"))
            .map_err(|e| de::Error::custom(format!("invalid time '{s}': {e}")))
    }
}
