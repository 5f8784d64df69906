use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CalendarEvent, Holiday, Milestone, Project, Settings};

/// A snapshot of everything the timeline needs: settings, projects,
/// milestones, events and holidays.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    /// A snapshot without settings gets the standard 09:00-17:00 week.
    #[serde(default = "Settings::standard")]
    pub settings: Settings,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default)]
    pub events: Vec<CalendarEvent>,
    #[serde(default)]
    pub holidays: Vec<Holiday>,
    #[serde(default = "Utc::now")]
    pub created: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub modified: DateTime<Utc>,
}

impl Default for Workspace {
    fn default() -> Self {
        Self {
            settings: Settings::standard(),
            projects: Vec::new(),
            milestones: Vec::new(),
            events: Vec::new(),
            holidays: Vec::new(),
            created: Utc::now(),
            modified: Utc::now(),
        }
    }
}

impl Workspace {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    /// Touch the modified timestamp.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }

    pub fn project(&self, id: Uuid) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn project_mut(&mut self, id: Uuid) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == id)
    }

    /// Look a project up by id or, failing that, by case-insensitive name.
    pub fn find_project(&self, key: &str) -> Option<&Project> {
        if let Ok(id) = key.parse::<Uuid>() {
            return self.project(id);
        }
        self.projects
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(key.trim()))
    }

    /// Add holidays, skipping any whose dates are already covered by an
    /// existing entry with the same name. Returns the number added.
    pub fn merge_holidays(&mut self, incoming: Vec<Holiday>) -> usize {
        let mut added = 0;
        for holiday in incoming {
            let duplicate = self.holidays.iter().any(|h| {
                h.name.eq_ignore_ascii_case(&holiday.name)
                    && h.start_date == holiday.start_date
                    && h.last_day() == holiday.last_day()
            });
            if !duplicate {
                self.holidays.push(holiday);
                added += 1;
            }
        }
        if added > 0 {
            self.touch();
        }
        added
    }
}
