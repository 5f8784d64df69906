//! Visual preview of an in-progress drag.
//!
//! Nothing here is retained between calls: every call takes the committed
//! project and the current gesture, so dropping the gesture (cancel, lost
//! pointer capture) is just passing [`DragState::Idle`] again.

use chrono::NaiveDate;
use tracing::debug;
use uuid::Uuid;

use super::positioning::TimelinePositions;
use crate::model::project::add_days;
use crate::model::{Project, TimelineMode};

/// Which part of the bar the pointer grabbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragKind {
    Move,
    ResizeStart,
    ResizeEnd,
}

/// The current gesture. Deltas are fractional days.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Move { project_id: Uuid, delta_days: f64 },
    ResizeStart { project_id: Uuid, delta_days: f64 },
    ResizeEnd { project_id: Uuid, delta_days: f64 },
}

impl DragState {
    pub fn begin(kind: DragKind, project_id: Uuid) -> Self {
        Self::Idle.retarget(kind, project_id, 0.0)
    }

    fn retarget(self, kind: DragKind, project_id: Uuid, delta_days: f64) -> Self {
        match kind {
            DragKind::Move => DragState::Move { project_id, delta_days },
            DragKind::ResizeStart => DragState::ResizeStart { project_id, delta_days },
            DragKind::ResizeEnd => DragState::ResizeEnd { project_id, delta_days },
        }
    }

    pub fn kind(&self) -> Option<DragKind> {
        match self {
            DragState::Idle => None,
            DragState::Move { .. } => Some(DragKind::Move),
            DragState::ResizeStart { .. } => Some(DragKind::ResizeStart),
            DragState::ResizeEnd { .. } => Some(DragKind::ResizeEnd),
        }
    }

    pub fn project_id(&self) -> Option<Uuid> {
        match *self {
            DragState::Idle => None,
            DragState::Move { project_id, .. }
            | DragState::ResizeStart { project_id, .. }
            | DragState::ResizeEnd { project_id, .. } => Some(project_id),
        }
    }

    pub fn delta_days(&self) -> f64 {
        match *self {
            DragState::Idle => 0.0,
            DragState::Move { delta_days, .. }
            | DragState::ResizeStart { delta_days, .. }
            | DragState::ResizeEnd { delta_days, .. } => delta_days,
        }
    }

    /// Same gesture with a new accumulated delta. Idle stays idle.
    pub fn with_delta(self, delta_days: f64) -> Self {
        match (self.kind(), self.project_id()) {
            (Some(kind), Some(project_id)) => self.retarget(kind, project_id, delta_days),
            _ => DragState::Idle,
        }
    }

    pub fn is_active(&self) -> bool {
        !matches!(self, DragState::Idle)
    }

    /// The gesture is active and grabbed `project_id`.
    pub fn targets(&self, project_id: Uuid) -> bool {
        self.project_id() == Some(project_id)
    }
}

/// Round a fractional day delta to whole days; non-finite deltas are 0.
pub fn whole_days(delta_days: f64) -> i64 {
    if delta_days.is_finite() {
        delta_days.round() as i64
    } else {
        0
    }
}

/// Dates the project appears to have while being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisualDates {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

/// Visual start/end for `project` under the gesture. Only the gesture's
/// own project moves; with `is_dragging == false` the committed dates are
/// returned whatever `drag_state` holds.
pub fn calculate_visual_project_dates(
    project: &Project,
    is_dragging: bool,
    drag_state: &DragState,
) -> VisualDates {
    let committed = VisualDates {
        start: project.start_date,
        end: if project.continuous {
            None
        } else {
            project.end_date
        },
    };
    if !is_dragging || !drag_state.targets(project.id) {
        return committed;
    }

    let days = whole_days(drag_state.delta_days());
    // A delta that would leave the calendar range keeps the committed dates.
    let shifted = |date: Option<NaiveDate>| match date {
        Some(d) => add_days(d, days).map(Some),
        None => Some(None),
    };
    let (Some(moved_start), Some(moved_end)) = (shifted(committed.start), shifted(committed.end))
    else {
        debug!(project_id = %project.id, days, "drag delta out of date range, keeping committed dates");
        return committed;
    };

    match drag_state {
        DragState::Idle => committed,
        DragState::Move { .. } => VisualDates {
            start: moved_start,
            end: moved_end,
        },
        DragState::ResizeStart { .. } => VisualDates {
            start: match (moved_start, committed.end) {
                (Some(s), Some(e)) => Some(s.min(e)),
                (s, _) => s,
            },
            end: committed.end,
        },
        DragState::ResizeEnd { .. } => VisualDates {
            start: committed.start,
            end: match (committed.start, moved_end) {
                (Some(s), Some(e)) => Some(e.max(s)),
                (_, e) => e,
            },
        },
    }
}

/// Shift committed baseline positions by the gesture's fractional delta.
///
/// Move shifts everything; resize-start moves the left edge and shrinks the
/// width so the right edge stays put; resize-end grows or shrinks the width.
/// A result that is not finite falls back to `positions`.
pub fn calculate_baseline_visual_offsets(
    positions: &TimelinePositions,
    is_dragging: bool,
    drag_state: &DragState,
    project_id: Uuid,
    mode: TimelineMode,
) -> TimelinePositions {
    if !is_dragging || !drag_state.targets(project_id) {
        return *positions;
    }

    let shift = drag_state.delta_days() * mode.day_width();
    let mut adjusted = *positions;
    match drag_state {
        DragState::Idle => {}
        DragState::Move { .. } => {
            adjusted.baseline_start_px += shift;
            adjusted.circle_left_px += shift;
            adjusted.triangle_left_px += shift;
        }
        DragState::ResizeStart { .. } => {
            let shift = shift.min(positions.baseline_width_px);
            adjusted.baseline_start_px += shift;
            adjusted.baseline_width_px -= shift;
            adjusted.circle_left_px += shift;
        }
        DragState::ResizeEnd { .. } => {
            let shift = shift.max(-positions.baseline_width_px);
            adjusted.baseline_width_px += shift;
            adjusted.triangle_left_px += shift;
        }
    }

    if adjusted.is_finite() {
        adjusted
    } else {
        debug!(%project_id, "drag offset produced non-finite geometry, keeping committed positions");
        *positions
    }
}
