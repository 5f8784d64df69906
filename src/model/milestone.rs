use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A checkpoint inside a project carrying its own hour budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    pub due_date: NaiveDate,
    /// Hours budgeted for the work leading up to this milestone.
    #[serde(default)]
    pub time_allocation: f64,
    /// Template for a repeating milestone; numbered copies are generated from it.
    #[serde(default)]
    pub is_recurring: bool,
}

impl Milestone {
    pub fn new(
        project_id: Uuid,
        name: impl Into<String>,
        due_date: NaiveDate,
        time_allocation: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            project_id,
            name: name.into(),
            due_date,
            time_allocation,
            is_recurring: false,
        }
    }

    pub fn recurring(mut self) -> Self {
        self.is_recurring = true;
        self
    }

    /// Whether the name looks like a generated instance, e.g. `"Sprint 3"`.
    pub fn is_numbered_instance(&self) -> bool {
        match self.name.trim_end().rsplit_once(' ') {
            Some((base, number)) => {
                !base.trim().is_empty()
                    && !number.is_empty()
                    && number.chars().all(|c| c.is_ascii_digit())
            }
            None => false,
        }
    }
}
