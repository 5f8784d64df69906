//! Pure per-day computations behind the project timeline.
//!
//! Everything in here is a function of the snapshot passed in; nothing is
//! cached between calls and nothing returns an error. Degenerate input
//! (missing dates, zero budgets, no working days) resolves to zero hours
//! or unchanged geometry.

pub mod allocation;
pub mod drag;
pub mod events;
pub mod milestones;
pub mod positioning;
pub mod work_hours;

pub use allocation::{
    bar_height, resolve_allocation, AllocationInputs, AllocationPolicy, AllocationType,
    DayEstimate, EstimateSource, MixedEventPolicy, ProjectAllocator, RowMode, TimeAllocation,
};
pub use drag::{
    calculate_baseline_visual_offsets, calculate_visual_project_dates, DragKind, DragState,
    VisualDates,
};
pub use milestones::{calculate_milestone_segments, get_milestone_segment_for_date, MilestoneSegment};
pub use positioning::{get_timeline_positions, TimelinePositions};
pub use work_hours::{
    calculate_work_hours_total, generate_work_hours_for_date, HolidayPolicy, WorkCalendar,
};
