use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::model::{AutoEstimateDays, Holiday, Settings, WorkSlot};

/// How holidays inside a project's range affect the hours of the days around them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidayPolicy {
    /// Holidays are not working days; the budget spreads over the days that remain.
    #[default]
    Redistribute,
    /// Holidays keep their share of the budget, which is then not worked.
    Drop,
}

pub fn is_holiday(date: NaiveDate, holidays: &[Holiday]) -> bool {
    holidays.iter().any(|h| h.contains(date))
}

/// Working slots for `date`: the weekday's configured slots, or none on a holiday.
pub fn generate_work_hours_for_date<'a>(
    date: NaiveDate,
    settings: &'a Settings,
    holidays: &[Holiday],
) -> &'a [WorkSlot] {
    if is_holiday(date, holidays) {
        return &[];
    }
    settings.weekly_work_hours.for_weekday(date.weekday())
}

/// Sum of slot durations in hours. Overlap between slots is not detected.
pub fn calculate_work_hours_total(slots: &[WorkSlot]) -> f64 {
    slots.iter().map(|s| s.duration.max(0.0)).sum()
}

/// Settings, holidays and the weekdays a project may use, bundled for
/// day-by-day questions.
#[derive(Debug, Clone, Copy)]
pub struct WorkCalendar<'a> {
    settings: &'a Settings,
    holidays: &'a [Holiday],
    weekdays: AutoEstimateDays,
    policy: HolidayPolicy,
}

impl<'a> WorkCalendar<'a> {
    pub fn new(settings: &'a Settings, holidays: &'a [Holiday]) -> Self {
        Self {
            settings,
            holidays,
            weekdays: AutoEstimateDays::all(),
            policy: HolidayPolicy::default(),
        }
    }

    pub fn with_weekdays(mut self, weekdays: AutoEstimateDays) -> Self {
        self.weekdays = weekdays;
        self
    }

    pub fn with_policy(mut self, policy: HolidayPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> HolidayPolicy {
        self.policy
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        is_holiday(date, self.holidays)
    }

    pub fn work_hours(&self, date: NaiveDate) -> &'a [WorkSlot] {
        generate_work_hours_for_date(date, self.settings, self.holidays)
    }

    /// Available hours on `date`, zero on holidays.
    pub fn capacity(&self, date: NaiveDate) -> f64 {
        calculate_work_hours_total(self.work_hours(date))
    }

    /// Hours the weekday would offer if `date` were not a holiday.
    pub fn weekday_capacity(&self, date: NaiveDate) -> f64 {
        calculate_work_hours_total(self.settings.weekly_work_hours.for_weekday(date.weekday()))
    }

    /// An enabled weekday with positive capacity that is not a holiday.
    pub fn is_working_day(&self, date: NaiveDate) -> bool {
        self.weekdays.is_enabled(date.weekday()) && self.capacity(date) > 0.0
    }

    /// Whether `date` takes a share when a budget is divided into a daily rate.
    ///
    /// Under [`HolidayPolicy::Drop`] a holiday on an otherwise-working weekday
    /// still takes its share.
    pub fn counts_toward_rate(&self, date: NaiveDate) -> bool {
        match self.policy {
            HolidayPolicy::Redistribute => self.is_working_day(date),
            HolidayPolicy::Drop => {
                self.weekdays.is_enabled(date.weekday()) && self.weekday_capacity(date) > 0.0
            }
        }
    }
}
