use chrono::{Datelike, Duration, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An sRGB display colour with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional).
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim().trim_start_matches('#');
        let byte = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (i, c) in hex.chars().enumerate() {
                    let v = c.to_digit(16)? as u8;
                    out[i] = v * 17;
                }
                Some(Self::from_rgb(out[0], out[1], out[2]))
            }
            6 => Some(Self::from_rgb(byte(0)?, byte(2)?, byte(4)?)),
            8 => Some(Self::from_rgba(byte(0)?, byte(2)?, byte(4)?, byte(6)?)),
            _ => None,
        }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        PROJECT_COLORS[0]
    }
}

/// Colours handed out to new projects in rotation.
pub const PROJECT_COLORS: &[Rgba] = &[
    Rgba::from_rgb(66, 133, 244),  // blue
    Rgba::from_rgb(52, 168, 83),   // green
    Rgba::from_rgb(171, 71, 188),  // purple
    Rgba::from_rgb(251, 140, 0),   // orange
    Rgba::from_rgb(3, 169, 244),   // light blue
    Rgba::from_rgb(229, 57, 53),   // red
    Rgba::from_rgb(0, 188, 212),   // cyan
    Rgba::from_rgb(255, 193, 7),   // amber
];

/// Per-weekday switches controlling where auto-estimated hours may land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoEstimateDays {
    pub monday: bool,
    pub tuesday: bool,
    pub wednesday: bool,
    pub thursday: bool,
    pub friday: bool,
    pub saturday: bool,
    pub sunday: bool,
}

impl Default for AutoEstimateDays {
    fn default() -> Self {
        Self {
            monday: true,
            tuesday: true,
            wednesday: true,
            thursday: true,
            friday: true,
            saturday: false,
            sunday: false,
        }
    }
}

impl AutoEstimateDays {
    pub fn all() -> Self {
        Self {
            saturday: true,
            sunday: true,
            ..Self::default()
        }
    }

    pub fn is_enabled(&self, weekday: Weekday) -> bool {
        match weekday {
            Weekday::Mon => self.monday,
            Weekday::Tue => self.tuesday,
            Weekday::Wed => self.wednesday,
            Weekday::Thu => self.thursday,
            Weekday::Fri => self.friday,
            Weekday::Sat => self.saturday,
            Weekday::Sun => self.sunday,
        }
    }

    pub fn set(&mut self, weekday: Weekday, enabled: bool) {
        let flag = match weekday {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        };
        *flag = enabled;
    }
}

/// A tracked project drawn as one row of the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    #[serde(with = "color_serde", default)]
    pub color: Rgba,
    pub start_date: Option<NaiveDate>,
    /// Ignored when `continuous` is set.
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    /// Open-ended project; its effective end is the viewport end.
    #[serde(default)]
    pub continuous: bool,
    #[serde(default)]
    pub estimated_hours: f64,
    #[serde(default)]
    pub auto_estimate_days: AutoEstimateDays,
}

impl Project {
    pub fn new(
        name: impl Into<String>,
        start: NaiveDate,
        end: NaiveDate,
        estimated_hours: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            color: Rgba::default(),
            start_date: Some(start),
            end_date: Some(end),
            continuous: false,
            estimated_hours,
            auto_estimate_days: AutoEstimateDays::default(),
        }
    }

    pub fn new_continuous(name: impl Into<String>, start: NaiveDate, estimated_hours: f64) -> Self {
        Self {
            end_date: None,
            continuous: true,
            ..Self::new(name, start, start, estimated_hours)
        }
    }

    /// The last day the project occupies, given the visible window end.
    pub fn effective_end(&self, viewport_end: NaiveDate) -> Option<NaiveDate> {
        if self.continuous {
            Some(viewport_end)
        } else {
            self.end_date
        }
    }

    /// Inclusive `(start, end)` span, or `None` when the project is missing
    /// dates or its end precedes its start.
    pub fn date_range(&self, viewport_end: NaiveDate) -> Option<(NaiveDate, NaiveDate)> {
        let start = self.start_date?;
        let end = self.effective_end(viewport_end)?;
        (start <= end).then_some((start, end))
    }

    pub fn contains(&self, date: NaiveDate, viewport_end: NaiveDate) -> bool {
        self.date_range(viewport_end)
            .is_some_and(|(start, end)| start <= date && date <= end)
    }

    pub fn auto_estimates_on(&self, date: NaiveDate) -> bool {
        self.auto_estimate_days.is_enabled(date.weekday())
    }

    /// Move both ends by `days`. Returns whether the record changed; a
    /// shift that leaves the calendar range changes nothing.
    pub fn shift(&mut self, days: i64) -> bool {
        let start = match self.start_date {
            Some(start) => match add_days(start, days) {
                Some(moved) => Some(moved),
                None => return false,
            },
            None => None,
        };
        let end = match self.end_date {
            Some(end) if !self.continuous => match add_days(end, days) {
                Some(moved) => Some(moved),
                None => return false,
            },
            other => other,
        };
        let changed = start != self.start_date || end != self.end_date;
        self.start_date = start;
        self.end_date = end;
        changed
    }

    /// Move the start by `days`, never past the end.
    pub fn shift_start(&mut self, days: i64) -> bool {
        let Some(moved) = self.start_date.and_then(|start| add_days(start, days)) else {
            return false;
        };
        let moved = match self.end_date {
            Some(end) if !self.continuous => moved.min(end),
            _ => moved,
        };
        let changed = self.start_date != Some(moved);
        self.start_date = Some(moved);
        changed
    }

    /// Move the end by `days`, never before the start. Continuous projects
    /// have no end to move.
    pub fn shift_end(&mut self, days: i64) -> bool {
        if self.continuous {
            return false;
        }
        let Some(moved) = self.end_date.and_then(|end| add_days(end, days)) else {
            return false;
        };
        let moved = match self.start_date {
            Some(start) => moved.max(start),
            None => moved,
        };
        let changed = self.end_date != Some(moved);
        self.end_date = Some(moved);
        changed
    }
}

/// `date` moved by `days`, or `None` when the result is not a representable date.
pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

/// Serde helper storing [`Rgba`] as a hex string.
mod color_serde {
    use super::Rgba;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(color: &Rgba, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&color.to_hex())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Rgba, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Rgba::from_hex(&s).ok_or_else(|| de::Error::custom(format!("invalid colour '{s}'")))
    }
}
