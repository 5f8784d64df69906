use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use workload_timeline::model::{
    CalendarEvent, EventType, Holiday, Milestone, Project, Settings, TimelineMode,
    TimelineViewport,
};
use workload_timeline::timeline::{
    calculate_baseline_visual_offsets, calculate_milestone_segments, calculate_visual_project_dates,
    generate_work_hours_for_date, get_timeline_positions, resolve_allocation, AllocationInputs,
    AllocationPolicy, AllocationType, DragKind, DragState, HolidayPolicy, MilestoneSegment,
    MixedEventPolicy, ProjectAllocator, WorkCalendar,
};

/// March 2024; the 4th is a Monday.
fn d(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    d(day).and_time(NaiveTime::from_hms_opt(hour, 0, 0).unwrap())
}

struct Fixture {
    settings: Settings,
    holidays: Vec<Holiday>,
    events: Vec<CalendarEvent>,
    milestones: Vec<Milestone>,
    policy: AllocationPolicy,
}

impl Fixture {
    fn new() -> Self {
        Self {
            settings: Settings::standard(),
            holidays: Vec::new(),
            events: Vec::new(),
            milestones: Vec::new(),
            policy: AllocationPolicy::default(),
        }
    }

    fn inputs(&self) -> AllocationInputs<'_> {
        AllocationInputs {
            settings: &self.settings,
            holidays: &self.holidays,
            events: &self.events,
            milestones: &self.milestones,
            viewport_end: d(31),
            policy: self.policy,
        }
    }

    fn hours(&self, project: &Project, days: std::ops::RangeInclusive<u32>) -> Vec<f64> {
        let allocator = ProjectAllocator::new(project, &self.inputs());
        days.map(|day| allocator.resolve(d(day)).hours).collect()
    }
}

fn work_week() -> Project {
    Project::new("P", d(4), d(8), 20.0)
}

#[test]
fn five_day_week_splits_evenly() {
    let fx = Fixture::new();
    let project = work_week();
    let allocator = ProjectAllocator::new(&project, &fx.inputs());

    for day in 4..=8 {
        let allocation = allocator.resolve(d(day));
        assert_eq!(allocation.allocation_type, AllocationType::AutoEstimate);
        assert_eq!(allocation.hours, 4.0);
    }
    for day in [9, 10] {
        assert!(allocator.resolve(d(day)).is_none());
    }
    assert_eq!(allocator.even_split_rate(), 4.0);
}

#[test]
fn holiday_inside_the_week_redistributes_by_default() {
    let mut fx = Fixture::new();
    fx.holidays.push(Holiday::new("Midweek", d(6)));
    let project = work_week();

    assert_eq!(fx.hours(&project, 4..=8), vec![5.0, 5.0, 0.0, 5.0, 5.0]);
    let allocator = ProjectAllocator::new(&project, &fx.inputs());
    assert_eq!(allocator.resolve(d(6)).allocation_type, AllocationType::None);
}

#[test]
fn holiday_inside_the_week_drops_its_share_when_configured() {
    let mut fx = Fixture::new();
    fx.holidays.push(Holiday::new("Midweek", d(6)));
    fx.policy.holiday_policy = HolidayPolicy::Drop;
    let project = work_week();

    assert_eq!(fx.hours(&project, 4..=8), vec![4.0, 4.0, 0.0, 4.0, 4.0]);
}

#[test]
fn holidays_dominate_slots_and_every_project() {
    let mut fx = Fixture::new();
    fx.holidays.push(Holiday::range("Break", d(5), d(7)));
    let a = work_week();
    let b = Project::new_continuous("Support", d(1), 100.0);
    fx.events.push(CalendarEvent::new("Standup", at(6, 9), at(6, 10)).for_project(a.id));
    fx.milestones.push(Milestone::new(a.id, "Alpha", d(6), 10.0));

    for day in 5..=7 {
        assert!(generate_work_hours_for_date(d(day), &fx.settings, &fx.holidays).is_empty());
        for project in [&a, &b] {
            let allocation = ProjectAllocator::new(project, &fx.inputs()).resolve(d(day));
            assert_eq!(allocation.allocation_type, AllocationType::None);
            assert_eq!(allocation.hours, 0.0);
        }
    }
}

#[test]
fn events_take_precedence_over_estimates() {
    let mut fx = Fixture::new();
    let project = work_week();
    fx.events.push(CalendarEvent::new("Design review", at(5, 9), at(5, 12)).for_project(project.id));
    fx.events.push(
        CalendarEvent::new("Build", at(7, 13), at(7, 15))
            .for_project(project.id)
            .with_type(EventType::Completed),
    );
    let allocator = ProjectAllocator::new(&project, &fx.inputs());

    let tue = allocator.resolve(d(5));
    assert_eq!(tue.allocation_type, AllocationType::Planned);
    assert_eq!(tue.hours, 3.0);
    let thu = allocator.resolve(d(7));
    assert_eq!(thu.allocation_type, AllocationType::Completed);
    assert_eq!(thu.hours, 2.0);

    // 20h - 5h of events over the three remaining days.
    for day in [4, 6, 8] {
        let allocation = allocator.resolve(d(day));
        assert_eq!(allocation.allocation_type, AllocationType::AutoEstimate);
        assert_eq!(allocation.hours, 5.0);
    }
}

#[test]
fn mixed_event_day_follows_the_policy() {
    let mut fx = Fixture::new();
    let project = work_week();
    fx.events.push(CalendarEvent::new("Plan", at(5, 9), at(5, 10)).for_project(project.id));
    fx.events.push(
        CalendarEvent::new("Done", at(5, 11), at(5, 12))
            .for_project(project.id)
            .with_type(EventType::Tracked),
    );

    let planned = ProjectAllocator::new(&project, &fx.inputs()).resolve(d(5));
    assert_eq!(planned.allocation_type, AllocationType::Planned);
    assert!(planned.is_planned_and_completed);
    assert_eq!(planned.hours, 2.0);

    fx.policy.mixed_event_policy = MixedEventPolicy::PreferCompleted;
    let completed = ProjectAllocator::new(&project, &fx.inputs()).resolve(d(5));
    assert_eq!(completed.allocation_type, AllocationType::Completed);
    assert!(completed.is_planned_and_completed);
}

#[test]
fn ticked_off_planned_event_is_a_mixed_day() {
    let mut fx = Fixture::new();
    let project = work_week();
    fx.events.push(
        CalendarEvent::new("Kickoff", at(5, 9), at(5, 11))
            .for_project(project.id)
            .with_type(EventType::Planned)
            .mark_completed(),
    );

    let allocation = ProjectAllocator::new(&project, &fx.inputs()).resolve(d(5));
    assert_eq!(allocation.allocation_type, AllocationType::Planned);
    assert!(allocation.is_planned_and_completed);
    assert_eq!(allocation.hours, 2.0);

    fx.policy.mixed_event_policy = MixedEventPolicy::PreferCompleted;
    let allocation = ProjectAllocator::new(&project, &fx.inputs()).resolve(d(5));
    assert_eq!(allocation.allocation_type, AllocationType::Completed);
    assert!(allocation.is_planned_and_completed);
}

#[test]
fn zero_budget_and_all_holiday_projects_resolve_to_nothing() {
    let mut fx = Fixture::new();
    let idle = Project::new("Idle", d(4), d(8), 0.0);
    assert!(fx.hours(&idle, 1..=12).iter().all(|h| *h == 0.0));

    fx.holidays.push(Holiday::range("Closed", d(4), d(8)));
    let closed = work_week();
    assert!(fx.hours(&closed, 1..=12).iter().all(|h| *h == 0.0));

    let weekend = Project::new("Weekend", d(9), d(10), 16.0);
    assert!(fx.hours(&weekend, 9..=10).iter().all(|h| *h == 0.0));
}

#[test]
fn inverted_or_undated_projects_have_no_allocation() {
    let fx = Fixture::new();
    let inverted = Project::new("Backwards", d(8), d(4), 20.0);
    assert!(fx.hours(&inverted, 1..=12).iter().all(|h| *h == 0.0));

    let mut undated = work_week();
    undated.start_date = None;
    assert!(fx.hours(&undated, 1..=12).iter().all(|h| *h == 0.0));
}

#[test]
fn milestone_segments_conserve_the_budget() {
    let mut fx = Fixture::new();
    let project = Project::new("Launch", d(4), d(22), 40.0);
    fx.milestones.push(Milestone::new(project.id, "Design", d(8), 10.0));
    fx.milestones.push(Milestone::new(project.id, "Build", d(15), 15.0));
    let allocator = ProjectAllocator::new(&project, &fx.inputs());

    let segments = allocator.segments();
    assert_eq!(segments.len(), 3);
    let rates: Vec<f64> = segments.iter().map(|s| s.hours_per_day).collect();
    assert_eq!(rates, vec![2.0, 3.0, 3.0]);
    let total: f64 = segments.iter().map(|s| s.spread_hours()).sum();
    assert!((total - 40.0).abs() < 1e-9);

    let resolved: f64 = (4..=22).map(|day| allocator.resolve(d(day)).hours).sum();
    assert!((resolved - 40.0).abs() < 1e-9);
    assert_eq!(
        allocator.resolve(d(11)).milestone_segment.unwrap().milestone_name.as_deref(),
        Some("Build")
    );
}

#[test]
fn single_day_resolution_matches_the_allocator_for_the_same_segments() {
    let mut fx = Fixture::new();
    fx.holidays.push(Holiday::new("Midweek", d(13)));
    let project = Project::new("Launch", d(4), d(22), 40.0);
    fx.milestones.push(Milestone::new(project.id, "Design", d(8), 10.0));
    fx.milestones.push(Milestone::new(project.id, "Build", d(15), 15.0));
    fx.events.push(CalendarEvent::new("Demo", at(19, 9), at(19, 11)).for_project(project.id));

    let calendar = WorkCalendar::new(&fx.settings, &fx.holidays)
        .with_weekdays(project.auto_estimate_days)
        .with_policy(fx.policy.holiday_policy);
    let segments = calculate_milestone_segments(
        project.id,
        d(4),
        d(22),
        &fx.milestones,
        &calendar,
        &fx.events,
        Some(project.estimated_hours),
    );
    let allocator = ProjectAllocator::new(&project, &fx.inputs());
    assert_eq!(allocator.segments(), segments.as_slice());

    for day in 1..=31 {
        let single = resolve_allocation(&project, d(day), &fx.inputs(), &segments);
        assert_eq!(single, allocator.resolve(d(day)), "day {day}");
    }
}

#[test]
fn single_day_resolution_uses_the_segments_it_is_given() {
    let fx = Fixture::new();
    let project = work_week();
    let segments = vec![MilestoneSegment {
        milestone_id: None,
        milestone_name: Some("Crunch".to_string()),
        start: d(4),
        end: d(6),
        allocated_hours: 21.0,
        event_hours: 0.0,
        working_days: 3,
        hours_per_day: 7.0,
    }];

    let hours: Vec<f64> = (4..=8)
        .map(|day| resolve_allocation(&project, d(day), &fx.inputs(), &segments).hours)
        .collect();
    // Days outside the given segment fall back to the flat split.
    assert_eq!(hours, vec![7.0, 7.0, 7.0, 4.0, 4.0]);

    let monday = resolve_allocation(&project, d(4), &fx.inputs(), &segments);
    assert_eq!(monday.allocation_type, AllocationType::AutoEstimate);
    assert_eq!(
        monday.milestone_segment.and_then(|s| s.milestone_name),
        Some("Crunch".to_string())
    );
    assert!(resolve_allocation(&project, d(9), &fx.inputs(), &segments).is_none());
    assert!(resolve_allocation(&project, d(4), &fx.inputs(), &[]).milestone_segment.is_none());
}

#[test]
fn recurring_template_is_counted_once() {
    let project_id = Uuid::new_v4();
    let milestones = vec![
        Milestone::new(project_id, "Review", d(8), 6.0).recurring(),
        Milestone::new(project_id, "Review 1", d(12), 6.0),
        Milestone::new(project_id, "Review 2", d(15), 6.0),
        Milestone::new(project_id, "Release", d(19), 4.0),
    ];
    let settings = Settings::standard();
    let calendar = WorkCalendar::new(&settings, &[]);

    let segments =
        calculate_milestone_segments(project_id, d(4), d(22), &milestones, &calendar, &[], Some(30.0));
    let names: Vec<Option<&str>> = segments.iter().map(|s| s.milestone_name.as_deref()).collect();
    assert_eq!(names, vec![Some("Review"), Some("Release"), None]);
    assert_eq!(segments[0].allocated_hours, 6.0);
    assert_eq!(segments[2].allocated_hours, 20.0);
}

#[test]
fn visual_dates_ignore_stale_drag_state_when_not_dragging() {
    let project = work_week();
    for state in [
        DragState::begin(DragKind::Move, project.id).with_delta(3.0),
        DragState::begin(DragKind::ResizeStart, project.id).with_delta(-2.0),
        DragState::begin(DragKind::ResizeEnd, project.id).with_delta(5.0),
    ] {
        let visual = calculate_visual_project_dates(&project, false, &state);
        assert_eq!(visual.start, project.start_date);
        assert_eq!(visual.end, project.end_date);
    }
}

#[test]
fn resize_end_moves_only_the_end() {
    let project = work_week();
    let viewport = TimelineViewport::new(d(1), d(31));
    let dates = viewport.visible_dates();
    let committed =
        get_timeline_positions(d(4), Some(d(8)), viewport.start, viewport.end, &dates, TimelineMode::Days);

    for delta in [-2_i64, 1, 3] {
        let state = DragState::begin(DragKind::ResizeEnd, project.id).with_delta(delta as f64);
        let visual = calculate_visual_project_dates(&project, true, &state);
        assert_eq!(visual.start, Some(d(4)));
        assert_eq!(visual.end, Some(d(8) + chrono::Duration::days(delta)));

        let offsets =
            calculate_baseline_visual_offsets(&committed, true, &state, project.id, TimelineMode::Days);
        assert_eq!(offsets.baseline_start_px, committed.baseline_start_px);
        assert_eq!(
            offsets.baseline_width_px,
            committed.baseline_width_px + delta as f64 * 40.0
        );
    }
}
