pub mod event;
pub mod milestone;
pub mod project;
pub mod settings;
pub mod timeline;
pub mod workspace;

pub use event::{CalendarEvent, EventCategory, EventType};
pub use milestone::Milestone;
pub use project::{AutoEstimateDays, Project, Rgba};
pub use settings::{Holiday, Settings, WeeklyWorkHours, WorkSlot};
pub use timeline::{TimelineMode, TimelineViewport};
pub use workspace::Workspace;
