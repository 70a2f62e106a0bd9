mod analytics;
mod app;
mod config;
mod domain;
mod error;
mod input;
mod notifications;
mod report;
mod store;
mod ticker;
mod timer;
mod ui;

use analytics::{
    due_within, format_duration, minutes_by_project, overdue, project_total_between,
    records_newest_first, search, task_total, to_calendar_events, SearchFilters,
};
use anyhow::{bail, Context, Result};
use app::AppState;
use chrono::{Days, Local, NaiveDate};
use clap::{Parser, Subcommand};
use config::{load_config, save_config, Config, MAX_WINDOW_DAYS};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use domain::{
    flatten_tasks, status_badge, tree_connector, Id, NewProject, NewTask, NewTimeRecord, Priority,
    ProjectPatch, ProjectStatus, TaskPatch, TaskStatus,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use report::{calculate_summary, ReportOptions, SummaryStats};
use std::io;
use std::path::PathBuf;
use store::files::{config_file, init_local_tally, store_file};
use store::{JsonStore, RecordSink, Snapshot, Store};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "TALLY_LOG";

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "A terminal project, task and time tracker with a work timer and analytics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a local .tally directory in the current directory
    Init,
    /// Manage projects
    #[command(subcommand)]
    Project(ProjectCommand),
    /// Manage tasks
    #[command(subcommand)]
    Task(TaskCommand),
    /// Log time on a task directly
    Log {
        task: Id,
        minutes: u32,
        /// Day the work happened (YYYY-MM-DD). Defaults to today.
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// List time records, newest first
    Records {
        #[command(subcommand)]
        action: Option<RecordsCommand>,
        #[arg(short, long)]
        task: Option<Id>,
    },
    /// Open the interactive work timer (default)
    Timer {
        /// Task to preselect
        #[arg(short, long)]
        task: Option<Id>,
        /// Start timing the selected task immediately
        #[arg(short, long)]
        start: bool,
        /// Notes for the session
        #[arg(short, long)]
        notes: Option<String>,
    },
    /// Show totals, the daily series and the time split
    Summary {
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        /// Number of days in the daily series
        #[arg(long, value_parser = day_count(1))]
        days: Option<u32>,
        /// Also show one project's total for the window
        #[arg(short, long)]
        project: Option<Id>,
    },
    /// Show overdue and upcoming tasks
    Due {
        /// Days ahead to look for deadlines
        #[arg(long, value_parser = day_count(0))]
        horizon: Option<u32>,
    },
    /// List task deadlines as all-day calendar events
    Calendar,
    /// Search projects and tasks
    Search {
        /// Text to look for in names and descriptions
        query: Option<String>,
        #[arg(short, long)]
        project: Option<Id>,
        #[arg(short, long)]
        status: Option<TaskStatus>,
        #[arg(long)]
        priority: Option<Priority>,
        /// Skip subtasks
        #[arg(long)]
        top_level: bool,
    },
    /// Generate a markdown report with statistics
    Report {
        /// Date to generate report for (YYYY-MM-DD format). Defaults to today.
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long, value_parser = day_count(1))]
        days: Option<u32>,
        /// Output file path. Defaults to <tally dir>/report-YYYY-MM-DD.md
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum ProjectCommand {
    Add {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value = domain::model::DEFAULT_PROJECT_COLOR)]
        color: String,
    },
    List {
        /// Include archived projects
        #[arg(short, long)]
        all: bool,
    },
    /// Change a project's name, description or color
    Edit {
        id: Id,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Archive an active project or restore an archived one
    Archive { id: Id },
    Delete { id: Id },
}

#[derive(Subcommand)]
enum TaskCommand {
    Add {
        project: Id,
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(long, default_value = "medium")]
        priority: Priority,
        #[arg(long, default_value = "pending")]
        status: TaskStatus,
        #[arg(long, value_parser = parse_date)]
        deadline: Option<NaiveDate>,
        /// Make this a subtask of the given task
        #[arg(long)]
        parent: Option<Id>,
    },
    List {
        #[arg(short, long)]
        project: Option<Id>,
        #[arg(short, long)]
        status: Option<TaskStatus>,
    },
    /// Change a task's name, description, priority or deadline
    Edit {
        id: Id,
        #[arg(long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(long)]
        priority: Option<Priority>,
        #[arg(long, value_parser = parse_date, conflicts_with = "clear_deadline")]
        deadline: Option<NaiveDate>,
        /// Remove the deadline
        #[arg(long)]
        clear_deadline: bool,
    },
    Status { id: Id, status: TaskStatus },
    Delete { id: Id },
}

#[derive(Subcommand)]
enum RecordsCommand {
    /// Delete a time record
    Delete { id: Id },
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| format!("Invalid date format. Use YYYY-MM-DD: {}", e))
}

fn day_count(min: i64) -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(min..=i64::from(MAX_WINDOW_DAYS))
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn open_store() -> Result<JsonStore> {
    let path = store_file()?;
    JsonStore::open(&path).with_context(|| format!("Failed to open store {}", path.display()))
}

fn open_config() -> Result<Config> {
    load_config(config_file()?)
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Timer {
        task: None,
        start: false,
        notes: None,
    });

    match command {
        Commands::Init => {
            let tally_dir = init_local_tally()?;
            save_config(tally_dir.join("config.json"), &Config::default())?;
            println!("Initialized tally directory: {}", tally_dir.display());
            println!();
            println!("Tally will now use this local directory for projects, tasks and time.");
            println!("Run 'tally project add <name>' to get started.");
            Ok(())
        }
        Commands::Project(cmd) => run_project(&mut open_store()?, cmd),
        Commands::Task(cmd) => run_task(&mut open_store()?, cmd),
        Commands::Log { task, minutes, date, notes } => {
            let mut store = open_store()?;
            let record = store.create_record(NewTimeRecord {
                task_id: task,
                minutes_spent: minutes,
                date: date.unwrap_or_else(today),
                notes,
            })?;
            println!(
                "Logged {} on task {} for {} (record #{})",
                format_duration(u64::from(record.minutes_spent)),
                record.task_id,
                record.date,
                record.id
            );
            Ok(())
        }
        Commands::Records { action: Some(RecordsCommand::Delete { id }), .. } => {
            let mut store = open_store()?;
            let record = store.get_record(id)?;
            store.delete_record(id)?;
            println!(
                "Deleted record #{} ({} on {})",
                record.id,
                format_duration(u64::from(record.minutes_spent)),
                record.date
            );
            Ok(())
        }
        Commands::Records { action: None, task } => print_records(&open_store()?, task),
        Commands::Timer { task, start, notes } => {
            run_tui(open_store()?, open_config()?, task, start, notes)
        }
        Commands::Summary { date, days, project } => {
            let config = open_config()?;
            let store = open_store()?;
            let snapshot = Snapshot::fetch(&store)?;
            let stats = calculate_summary(
                &snapshot,
                date.unwrap_or_else(today),
                days.unwrap_or(config.summary_days),
                config.due_horizon_days,
            );
            print_summary(&stats);
            if let Some(project_id) = project {
                print_project_window(&store, &snapshot, &stats, project_id)?;
            }
            Ok(())
        }
        Commands::Due { horizon } => {
            let horizon = horizon.unwrap_or(open_config()?.due_horizon_days);
            print_due(&open_store()?, horizon)
        }
        Commands::Calendar => {
            let snapshot = Snapshot::fetch(&open_store()?)?;
            let events = to_calendar_events(&snapshot.tasks, &snapshot.projects);
            if events.is_empty() {
                println!("No tasks with a deadline.");
            }
            for event in events {
                let span = if event.start == event.end {
                    event.start.to_string()
                } else {
                    format!("{} to {}", event.start, event.end)
                };
                let kind = if event.all_day { "all day" } else { "timed" };
                println!("{}  {}  ({}, {})", span, event.title, kind, event.task.status);
            }
            Ok(())
        }
        Commands::Search { query, project, status, priority, top_level } => {
            let snapshot = Snapshot::fetch(&open_store()?)?;
            let filters = SearchFilters {
                project_id: project,
                status,
                priority,
                top_level_only: top_level,
            };
            let results = search(
                &snapshot.projects,
                &snapshot.tasks,
                query.as_deref().unwrap_or(""),
                &filters,
            );
            if results.is_empty() {
                println!("No matches.");
                return Ok(());
            }
            if filters.is_empty() {
                println!("{} results", results.total());
            } else {
                println!("{} results (tasks filtered)", results.total());
            }
            for p in &results.projects {
                println!("  project #{} {} [{}]", p.id, p.name, p.status);
            }
            for t in &results.tasks {
                println!("  task    #{} {} [{}] {}", t.id, t.name, t.status, t.priority);
            }
            Ok(())
        }
        Commands::Report { date, days, output } => {
            let config = open_config()?;
            let options = ReportOptions {
                date: date.unwrap_or_else(today),
                window_days: days.unwrap_or(config.summary_days),
                due_horizon_days: config.due_horizon_days,
                output,
            };
            println!("Generating report for {}...", options.date);
            let report_path = report::generate_report(&open_store()?, &options)?;
            println!("Report generated: {}", report_path.display());
            Ok(())
        }
    }
}

fn run_project(store: &mut JsonStore, cmd: ProjectCommand) -> Result<()> {
    match cmd {
        ProjectCommand::Add { name, description, color } => {
            let project = store.create_project(
                NewProject::new(name).description(description).color(color),
            )?;
            println!("Created project #{} {}", project.id, project.name);
        }
        ProjectCommand::List { all } => {
            let projects = store.list_projects()?;
            let records = store.list_records()?;
            let tasks = store.list_tasks()?;
            let minutes = minutes_by_project(&records, &tasks, &projects);
            for project in projects.iter().filter(|p| all || p.is_active()) {
                let archived = if project.status == ProjectStatus::Archived {
                    "  (archived)"
                } else {
                    ""
                };
                println!(
                    "#{:<4} {:<24} {}  {}{}",
                    project.id,
                    project.name,
                    project.color,
                    format_duration(minutes.get(&project.id).copied().unwrap_or(0)),
                    archived
                );
            }
        }
        ProjectCommand::Edit { id, name, description, color } => {
            let patch = ProjectPatch { name, description, color };
            if patch.is_empty() {
                bail!("Nothing to change. Pass --name, --description or --color.");
            }
            let current = store.get_project(id)?;
            let project = store.update_project(patch.apply(&current))?;
            println!("Updated project #{} {}", project.id, project.name);
        }
        ProjectCommand::Archive { id } => {
            let project = store.toggle_archive(id)?;
            println!("Project #{} is now {}", project.id, project.status);
        }
        ProjectCommand::Delete { id } => {
            store.delete_project(id)?;
            println!("Deleted project #{} and its tasks", id);
        }
    }
    Ok(())
}

fn run_task(store: &mut JsonStore, cmd: TaskCommand) -> Result<()> {
    match cmd {
        TaskCommand::Add { project, name, description, priority, status, deadline, parent } => {
            let mut draft = NewTask::new(name)
                .description(description)
                .priority(priority)
                .status(status);
            if let Some(deadline) = deadline {
                draft = draft.deadline(deadline);
            }
            if let Some(parent_id) = parent {
                draft = draft.parent(parent_id);
            }
            let task = store.create_task(project, draft)?;
            println!("Created task #{} {}", task.id, task.name);
        }
        TaskCommand::List { project, status } => {
            let tasks = store.list_tasks()?;
            let records = store.list_records()?;
            let today = today();
            for row in flatten_tasks(&tasks) {
                let task = row.task;
                if project.map_or(false, |id| task.project_id != id)
                    || status.map_or(false, |s| task.status != s)
                {
                    continue;
                }
                let indent = if row.depth > 0 {
                    format!("  {} ", tree_connector(row.is_last))
                } else {
                    String::new()
                };
                let total = task_total(&records, task.id);
                let due = match task.deadline {
                    Some(d) if task.is_overdue(today) => format!("  overdue {}", d),
                    Some(d) => format!("  due {}", d),
                    None => String::new(),
                };
                println!(
                    "{}#{:<4} {:<28} {:<14} {:<6} {}{}",
                    indent,
                    task.id,
                    task.name,
                    status_badge(task.status),
                    task.priority,
                    format_duration(total.minutes),
                    due
                );
            }
        }
        TaskCommand::Edit { id, name, description, priority, deadline, clear_deadline } => {
            let deadline = if clear_deadline { Some(None) } else { deadline.map(Some) };
            let patch = TaskPatch { name, description, priority, deadline };
            if patch.is_empty() {
                bail!("Nothing to change. Pass --name, --description, --priority or a deadline option.");
            }
            let current = store.get_task(id)?;
            let task = store.update_task(patch.apply(&current))?;
            println!("Updated task #{} {}", task.id, task.name);
        }
        TaskCommand::Status { id, status } => {
            let task = store.set_status(id, status)?;
            println!("Task #{} is now {}", task.id, task.status);
        }
        TaskCommand::Delete { id } => {
            store.delete_task(id)?;
            println!("Deleted task #{} and its subtasks (time records kept)", id);
        }
    }
    Ok(())
}

fn print_records(store: &JsonStore, task: Option<Id>) -> Result<()> {
    let records = match task {
        Some(task_id) => store.list_records_for_task(task_id)?,
        None => store.list_records()?,
    };
    let tasks = store.list_tasks()?;

    for record in records_newest_first(&records) {
        let name = tasks
            .iter()
            .find(|t| t.id == record.task_id)
            .map(|t| t.name.as_str())
            .unwrap_or("(deleted task)");
        println!(
            "{}  {:>7}  {}{}",
            record.date,
            format_duration(u64::from(record.minutes_spent)),
            name,
            record
                .notes
                .as_deref()
                .map(|n| format!("  - {}", n))
                .unwrap_or_default()
        );
    }
    if let Some(task_id) = task {
        let total = task_total(&records, task_id);
        println!("Total: {}h {}m", total.hours, total.remainder_minutes);
    }
    Ok(())
}

fn print_summary(stats: &SummaryStats) {
    println!("Today:        {}", format_duration(stats.today_minutes));
    println!(
        "Last {} days: {}",
        stats.window_days,
        format_duration(stats.window_minutes)
    );
    println!("All time:     {}", format_duration(stats.total_minutes));
    println!();

    let peak = stats.daily.iter().map(|d| d.minutes).max().unwrap_or(0).max(1);
    for day in &stats.daily {
        let bar = "█".repeat((day.minutes * 30 / peak) as usize);
        println!("{}  {:>5.1}h  {}", day.day.format("%a %m-%d"), day.hours, bar);
    }

    if !stats.projects.is_empty() {
        println!();
        for line in &stats.projects {
            println!(
                "{:<24} {:>8}  {:>5.1}%",
                line.name,
                format_duration(line.minutes),
                line.percent
            );
        }
    }

    if !stats.statuses.is_empty() {
        println!();
        let parts: Vec<String> = stats
            .statuses
            .iter()
            .map(|(status, count)| format!("{}: {}", status.label(), count))
            .collect();
        println!("{}", parts.join("   "));
    }
    if stats.overdue_count > 0 || stats.due_soon_count > 0 {
        println!(
            "{} overdue, {} due soon",
            stats.overdue_count, stats.due_soon_count
        );
    }
}

/// One project's minutes over the summary window
fn print_project_window(
    store: &JsonStore,
    snapshot: &Snapshot,
    stats: &SummaryStats,
    project_id: Id,
) -> Result<()> {
    let project = store.get_project(project_id)?;
    let from = stats
        .date
        .checked_sub_days(Days::new(u64::from(stats.window_days.max(1)) - 1))
        .unwrap_or(NaiveDate::MIN);
    let minutes = project_total_between(
        &snapshot.records,
        &snapshot.tasks,
        project_id,
        from,
        stats.date,
    );
    println!();
    println!(
        "{}: {} from {} to {}",
        project.name,
        format_duration(minutes),
        from,
        stats.date
    );
    Ok(())
}

fn print_due(store: &JsonStore, horizon: u32) -> Result<()> {
    let tasks = store.list_tasks()?;
    let today = today();

    let late = overdue(&tasks, today);
    if !late.is_empty() {
        println!("Overdue:");
        for task in late {
            if let Some(deadline) = task.deadline {
                println!("  {}  #{} {}", deadline, task.id, task.name);
            }
        }
    }

    let upcoming = due_within(&tasks, today, horizon);
    println!("Due in the next {} days:", horizon);
    if upcoming.is_empty() {
        println!("  nothing");
    }
    for task in upcoming {
        if let Some(deadline) = task.deadline {
            println!("  {}  #{} {}", deadline, task.id, task.name);
        }
    }
    Ok(())
}

fn run_tui(
    store: JsonStore,
    config: Config,
    task: Option<Id>,
    start: bool,
    notes: Option<String>,
) -> Result<()> {
    eprintln!("Using store: {}", store.path().display());

    let mut app = AppState::new(Box::new(store), config, task)?;
    // never start a different task than the one asked for
    let preselected = task.map_or(true, |id| app.selected_task_id() == Some(id));
    if start && preselected {
        app.start_selected(notes);
    } else if let Some(notes) = notes {
        app.timer.set_notes(notes);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if app.timer.state().is_active() {
        eprintln!(
            "Discarded unsaved session of {} minutes",
            app.timer.elapsed_minutes()
        );
    }

    if let Err(err) = result {
        eprintln!("Error: {}", err);
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, app: &mut AppState) -> Result<()> {
    let poll_rate = ticker::poll_duration();

    loop {
        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(poll_rate)? {
            if let Event::Key(key) = event::read()? {
                // Only process key press events (ignore key release)
                if key.kind == KeyEventKind::Press && input::handle_key(app, key)? {
                    return Ok(());
                }
            }
        }

        // Tick the timer and pick up saved records
        app.tick();
    }
}
