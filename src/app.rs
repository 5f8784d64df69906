use std::path::Path;

use chrono::{Duration, NaiveDate};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{CsvError, StoreError};
use crate::io::{self, WorkspaceStore};
use crate::model::{Project, Rgba, TimelineMode, TimelineViewport, Workspace};
use crate::timeline::drag::whole_days;
use crate::timeline::positioning::day_cell_px;
use crate::timeline::{
    calculate_baseline_visual_offsets, calculate_visual_project_dates, get_timeline_positions,
    AllocationInputs, DayEstimate, DragKind, DragState, ProjectAllocator, TimeAllocation,
    TimelinePositions, VisualDates,
};

/// Source of "today", injected so the timeline can be driven from tests.
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// The local wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// A clock stuck on one date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

/// One rendered day of a project row.
#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub left_px: f64,
    pub width_px: f64,
    pub allocation: TimeAllocation,
}

/// Everything a renderer needs to draw one project.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineRow {
    pub project_id: Uuid,
    pub name: String,
    pub color: Rgba,
    pub positions: TimelinePositions,
    /// Dates as currently shown, including any drag preview.
    pub visual_dates: VisualDates,
    pub is_dragging: bool,
    pub days: Vec<DayCell>,
}

/// Application state: the loaded workspace, the visible window and the
/// drag gesture in progress.
pub struct TimelineApp {
    pub workspace: Workspace,
    pub viewport: TimelineViewport,
    pub config: Config,
    pub drag: DragState,
    pub status_message: String,
    store: Box<dyn WorkspaceStore>,
    clock: Box<dyn Clock>,
}

impl TimelineApp {
    /// Load the workspace from `store` and place the viewport around today.
    pub fn open(
        store: Box<dyn WorkspaceStore>,
        config: Config,
        clock: Box<dyn Clock>,
    ) -> Result<Self, StoreError> {
        let workspace = store.load()?;
        let today = clock.today();
        let viewport = TimelineViewport::new(
            today - Duration::days(config.view.days_before),
            today + Duration::days(config.view.days_after),
        )
        .with_mode(config.view.mode);

        Ok(Self {
            workspace,
            viewport,
            config,
            drag: DragState::Idle,
            status_message: "Ready".to_string(),
            store,
            clock,
        })
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    // --- Persistence ---

    pub fn save(&mut self) -> Result<(), StoreError> {
        self.workspace.touch();
        self.store.save(&self.workspace)?;
        self.status_message = "Workspace saved".to_string();
        Ok(())
    }

    pub fn import_holidays(&mut self, path: &Path) -> Result<(usize, usize), CsvError> {
        let (holidays, skipped) = io::import_holidays(path)?;
        let added = self.workspace.merge_holidays(holidays);
        self.status_message = if skipped > 0 {
            format!("Imported {added} holidays ({skipped} rows skipped)")
        } else {
            format!("Imported {added} holidays")
        };
        info!(added, skipped, "holidays imported");
        Ok((added, skipped))
    }

    /// Write estimates for every project over `from..=to`.
    pub fn export_estimates(
        &mut self,
        path: &Path,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<usize, CsvError> {
        let rows: Vec<(&Project, Vec<DayEstimate>)> = self
            .workspace
            .projects
            .iter()
            .map(|p| (p, self.allocator(p).day_estimates(from, to)))
            .collect();
        let count = io::export_day_estimates(&rows, path)?;
        self.status_message = format!("Exported {count} day estimates to CSV");
        Ok(count)
    }

    // --- Viewport ---

    pub fn set_mode(&mut self, mode: TimelineMode) {
        self.viewport.mode = mode;
    }

    /// Fit the viewport to the projects' dates, with the configured margins.
    pub fn fit_viewport_to_projects(&mut self) {
        let projects = &self.workspace.projects;
        let Some(min) = projects.iter().filter_map(|p| p.start_date).min() else {
            return;
        };
        let max = projects
            .iter()
            .filter_map(|p| if p.continuous { None } else { p.end_date })
            .max()
            .unwrap_or_else(|| self.today())
            .max(min);
        self.viewport.start = min - Duration::days(self.config.view.days_before);
        self.viewport.end = max + Duration::days(self.config.view.days_after);
    }

    // --- Rows ---

    fn inputs(&self) -> AllocationInputs<'_> {
        AllocationInputs {
            settings: &self.workspace.settings,
            holidays: &self.workspace.holidays,
            events: &self.workspace.events,
            milestones: &self.workspace.milestones,
            viewport_end: self.viewport.end,
            policy: self.config.allocation,
        }
    }

    fn allocator<'a>(&'a self, project: &'a Project) -> ProjectAllocator<'a> {
        ProjectAllocator::new(project, &self.inputs())
    }

    pub fn day_estimates(&self, project_id: Uuid, from: NaiveDate, to: NaiveDate) -> Vec<DayEstimate> {
        match self.workspace.project(project_id) {
            Some(project) => self.allocator(project).day_estimates(from, to),
            None => Vec::new(),
        }
    }

    pub fn rows(&self) -> Vec<TimelineRow> {
        self.workspace
            .projects
            .iter()
            .map(|p| self.build_row(p))
            .collect()
    }

    pub fn row(&self, project_id: Uuid) -> Option<TimelineRow> {
        self.workspace.project(project_id).map(|p| self.build_row(p))
    }

    fn build_row(&self, project: &Project) -> TimelineRow {
        let is_dragging = self.drag.targets(project.id);
        let mode = self.viewport.mode;
        let dates = self.viewport.visible_dates();

        let committed = match project.start_date {
            Some(start) => get_timeline_positions(
                start,
                if project.continuous { None } else { project.end_date },
                self.viewport.start,
                self.viewport.end,
                &dates,
                mode,
            ),
            None => TimelinePositions::default(),
        };
        let positions =
            calculate_baseline_visual_offsets(&committed, is_dragging, &self.drag, project.id, mode);
        let visual_dates = calculate_visual_project_dates(project, is_dragging, &self.drag);

        // Allocation preview follows the dragged dates.
        let mut preview = project.clone();
        preview.start_date = visual_dates.start;
        if !project.continuous {
            preview.end_date = visual_dates.end;
        }
        let allocator = ProjectAllocator::new(&preview, &self.inputs());

        let days = self
            .viewport
            .days()
            .map(|date| {
                let (left_px, width_px) = day_cell_px(date, &dates, mode);
                DayCell {
                    date,
                    left_px,
                    width_px,
                    allocation: allocator.resolve(date),
                }
            })
            .collect();

        TimelineRow {
            project_id: project.id,
            name: project.name.clone(),
            color: project.color,
            positions,
            visual_dates,
            is_dragging,
            days,
        }
    }

    // --- Drag gesture ---

    /// Start a gesture on `project_id`. Returns false for an unknown project.
    pub fn begin_drag(&mut self, project_id: Uuid, kind: DragKind) -> bool {
        if self.workspace.project(project_id).is_none() {
            warn!(%project_id, "drag started on unknown project");
            return false;
        }
        self.drag = DragState::begin(kind, project_id);
        true
    }

    /// Pointer moved `delta_px` since the gesture started.
    pub fn update_drag(&mut self, delta_px: f64) {
        let delta_days = self.viewport.px_to_days(delta_px);
        self.set_drag_delta_days(delta_days);
    }

    pub fn set_drag_delta_days(&mut self, delta_days: f64) {
        self.drag = self.drag.with_delta(delta_days);
    }

    /// Drop the gesture without touching the project.
    pub fn cancel_drag(&mut self) {
        self.drag = DragState::Idle;
    }

    /// Apply the gesture's whole-day delta to the project record.
    /// Returns the changed project, if any.
    pub fn commit_drag(&mut self) -> Option<Uuid> {
        let state = std::mem::take(&mut self.drag);
        let project_id = state.project_id()?;
        let days = whole_days(state.delta_days());
        if days == 0 {
            return None;
        }

        let project = self.workspace.project_mut(project_id)?;
        let changed = match state {
            DragState::Idle => false,
            DragState::Move { .. } => project.shift(days),
            DragState::ResizeStart { .. } => project.shift_start(days),
            DragState::ResizeEnd { .. } => project.shift_end(days),
        };
        if !changed {
            debug!(%project_id, days, "drag released without changing the project");
            return None;
        }
        let name = project.name.clone();
        self.workspace.touch();
        self.status_message = format!("Moved '{name}' by {days} day(s)");
        info!(%project_id, days, "drag committed");
        Some(project_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MemoryStore;
    use crate::timeline::AllocationType;
    use pretty_assertions::assert_eq;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn app_with(project: Project) -> TimelineApp {
        let mut ws = Workspace::default();
        ws.projects.push(project);
        let mut app = TimelineApp::open(
            Box::new(MemoryStore::new(ws)),
            Config::default(),
            Box::new(FixedClock(d(4))),
        )
        .unwrap();
        app.viewport = TimelineViewport::new(d(1), d(31));
        app
    }

    #[test]
    fn viewport_is_placed_around_today() {
        let app = app_with(Project::new("P", d(4), d(8), 20.0));
        let fresh = TimelineApp::open(
            Box::new(MemoryStore::new(app.workspace.clone())),
            Config::default(),
            Box::new(FixedClock(d(10))),
        )
        .unwrap();
        assert_eq!(fresh.viewport.start, d(3));
        assert_eq!(fresh.viewport.end, NaiveDate::from_ymd_opt(2024, 4, 9).unwrap());
    }

    #[test]
    fn rows_carry_positions_and_day_cells() {
        let app = app_with(Project::new("P", d(4), d(8), 20.0));
        let rows = app.rows();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.positions.baseline_start_px, 120.0);
        assert_eq!(row.days.len(), 31);
        let monday = &row.days[3];
        assert_eq!(monday.date, d(4));
        assert_eq!(monday.left_px, 120.0);
        assert_eq!(monday.allocation.allocation_type, AllocationType::AutoEstimate);
        assert_eq!(monday.allocation.hours, 4.0);
    }

    #[test]
    fn drag_previews_then_commits() {
        let project = Project::new("P", d(4), d(8), 20.0);
        let id = project.id;
        let mut app = app_with(project);

        assert!(app.begin_drag(id, DragKind::Move));
        app.update_drag(7.0 * 40.0);
        let row = app.row(id).unwrap();
        assert!(row.is_dragging);
        assert_eq!(row.visual_dates.start, Some(d(11)));
        assert_eq!(row.positions.baseline_start_px, 400.0);
        // The committed record is untouched until release.
        assert_eq!(app.workspace.projects[0].start_date, Some(d(4)));
        assert_eq!(row.days[10].allocation.hours, 4.0);
        assert!(row.days[3].allocation.is_none());

        assert_eq!(app.commit_drag(), Some(id));
        assert_eq!(app.drag, DragState::Idle);
        assert_eq!(app.workspace.projects[0].start_date, Some(d(11)));
        assert_eq!(app.workspace.projects[0].end_date, Some(d(15)));
    }

    #[test]
    fn cancel_leaves_the_project_alone() {
        let project = Project::new("P", d(4), d(8), 20.0);
        let id = project.id;
        let mut app = app_with(project);

        app.begin_drag(id, DragKind::ResizeEnd);
        app.set_drag_delta_days(3.0);
        app.cancel_drag();
        assert_eq!(app.commit_drag(), None);
        let row = app.row(id).unwrap();
        assert!(!row.is_dragging);
        assert_eq!(row.visual_dates.end, Some(d(8)));
        assert_eq!(app.workspace.projects[0].end_date, Some(d(8)));
    }

    #[test]
    fn resizing_the_end_of_a_continuous_project_changes_nothing() {
        let project = Project::new_continuous("Ops", d(4), 40.0);
        let id = project.id;
        let mut app = app_with(project);
        let before = app.workspace.modified;
        app.status_message = "Ready".to_string();

        app.begin_drag(id, DragKind::ResizeEnd);
        app.set_drag_delta_days(3.0);
        assert_eq!(app.commit_drag(), None);
        assert_eq!(app.drag, DragState::Idle);
        assert_eq!(app.workspace.modified, before);
        assert_eq!(app.status_message, "Ready");
        assert_eq!(app.workspace.projects[0].end_date, None);
    }

    #[test]
    fn huge_drag_is_released_without_change() {
        let project = Project::new("P", d(4), d(8), 20.0);
        let id = project.id;
        let mut app = app_with(project);

        app.begin_drag(id, DragKind::Move);
        app.set_drag_delta_days(1e12);
        let row = app.row(id).unwrap();
        assert_eq!(row.visual_dates.start, Some(d(4)));
        assert_eq!(app.commit_drag(), None);
        assert_eq!(app.workspace.projects[0].start_date, Some(d(4)));
    }

    #[test]
    fn unknown_project_cannot_be_dragged() {
        let mut app = app_with(Project::new("P", d(4), d(8), 20.0));
        assert!(!app.begin_drag(Uuid::new_v4(), DragKind::Move));
        assert!(!app.drag.is_active());
    }

    #[test]
    fn save_goes_to_the_store() {
        let mut app = app_with(Project::new("P", d(4), d(8), 20.0));
        app.save().unwrap();
        assert_eq!(app.status_message, "Workspace saved");
    }
}
