use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use workload_timeline::app::{SystemClock, TimelineApp, TimelineRow};
use workload_timeline::config::Config;
use workload_timeline::io::JsonFileStore;
use workload_timeline::model::{TimelineMode, TimelineViewport};
use workload_timeline::timeline::{AllocationType, DragKind};

#[derive(Debug, Parser)]
#[command(name = "workload-timeline", version, about = "Project workload timeline")]
struct Cli {
    /// Workspace JSON file (projects, events, milestones, holidays, settings)
    #[arg(short, long, global = true, default_value = "workspace.json")]
    workspace: PathBuf,

    /// Config file (defaults to $WORKLOAD_TIMELINE_CONFIG or the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print every project's timeline for a date window
    Report(WindowArgs),
    /// Write per-day estimates to a CSV file
    Export {
        output: PathBuf,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Merge holidays from a CSV file into the workspace
    ImportHolidays { csv: PathBuf },
    /// Move or resize a project by whole days
    Shift {
        /// Project name or id
        project: String,
        #[arg(value_enum)]
        edge: Edge,
        #[arg(allow_hyphen_values = true)]
        days: f64,
        /// Show the preview without saving
        #[arg(long)]
        dry_run: bool,
    },
}

#[derive(Debug, Clone, Args)]
struct WindowArgs {
    /// First day (YYYY-MM-DD); defaults to the configured window around today
    #[arg(long)]
    from: Option<NaiveDate>,
    /// Last day (YYYY-MM-DD)
    #[arg(long)]
    to: Option<NaiveDate>,
    #[arg(long, value_enum)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Days,
    Weeks,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Edge {
    Move,
    Start,
    End,
}

fn main() {
    if let Err(error) = run() {
        eprintln!("workload-timeline: {error:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let store = JsonFileStore::new(&cli.workspace);
    let mut app = TimelineApp::open(Box::new(store), config, Box::new(SystemClock))
        .with_context(|| format!("opening {}", cli.workspace.display()))?;

    match cli.command {
        Command::Report(window) => {
            apply_window(&mut app, &window);
            print_report(&app);
        }
        Command::Export { output, window } => {
            apply_window(&mut app, &window);
            let (from, to) = (app.viewport.start, app.viewport.end);
            let count = app.export_estimates(&output, from, to)?;
            println!("{count} day estimates written to {}", output.display());
        }
        Command::ImportHolidays { csv } => {
            app.import_holidays(&csv)?;
            app.save()?;
            println!("{}", app.status_message);
        }
        Command::Shift {
            project,
            edge,
            days,
            dry_run,
        } => {
            let Some(id) = app.workspace.find_project(&project).map(|p| p.id) else {
                bail!("no project named '{project}'");
            };
            let kind = match edge {
                Edge::Move => DragKind::Move,
                Edge::Start => DragKind::ResizeStart,
                Edge::End => DragKind::ResizeEnd,
            };
            app.fit_viewport_to_projects();
            app.begin_drag(id, kind);
            app.set_drag_delta_days(days);
            if let Some(row) = app.row(id) {
                print_row(&row);
            }
            if dry_run {
                app.cancel_drag();
            } else if app.commit_drag().is_some() {
                app.save()?;
                println!("{}", app.status_message);
            }
        }
    }
    Ok(())
}

fn apply_window(app: &mut TimelineApp, window: &WindowArgs) {
    if let Some(mode) = window.mode {
        app.set_mode(match mode {
            Mode::Days => TimelineMode::Days,
            Mode::Weeks => TimelineMode::Weeks,
        });
    }
    let start = window.from.unwrap_or(app.viewport.start);
    let end = window.to.unwrap_or(app.viewport.end);
    app.viewport = TimelineViewport::new(start, end).with_mode(app.viewport.mode);
}

fn print_report(app: &TimelineApp) {
    println!(
        "{} .. {} ({} projects)",
        app.viewport.start,
        app.viewport.end,
        app.workspace.projects.len()
    );
    for row in app.rows() {
        print_row(&row);
    }
}

/// One line per project: a glyph per day and the total hours.
fn print_row(row: &TimelineRow) {
    let glyphs: String = row
        .days
        .iter()
        .map(|cell| match cell.allocation.allocation_type {
            AllocationType::None => '.',
            AllocationType::Planned => 'P',
            AllocationType::Completed => 'C',
            AllocationType::AutoEstimate if cell.allocation.overflow_layers > 0 => '!',
            AllocationType::AutoEstimate if cell.allocation.milestone_segment.is_some() => 'M',
            AllocationType::AutoEstimate => '#',
        })
        .collect();
    let total: f64 = row.days.iter().map(|c| c.allocation.hours).sum();
    let span = match (row.visual_dates.start, row.visual_dates.end) {
        (Some(s), Some(e)) => format!("{s} .. {e}"),
        (Some(s), None) => format!("{s} .. (continuous)"),
        _ => "(no dates)".to_string(),
    };
    println!("{:<24} {:<28} {glyphs} {total:>7.1}h", row.name, span);
}
