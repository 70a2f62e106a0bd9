pub mod aggregate;
pub mod classify;
pub mod search;

pub use aggregate::{
    daily_series, format_clock, format_duration, minutes_by_project, orphaned_minutes,
    project_breakdown, project_total_between, records_newest_first, task_total, total_for_day,
    total_last_days, total_minutes, DayTotal,
};
pub use classify::{due_within, overdue, status_counts, to_calendar_events, top_level_tasks};
pub use search::{search, SearchFilters};
