use crate::analytics::{
    daily_series, due_within, orphaned_minutes, overdue, project_breakdown, status_counts,
    total_for_day, total_last_days, total_minutes, DayTotal,
};
use crate::domain::TaskStatus;
use crate::store::Snapshot;
use chrono::NaiveDate;

/// Per-project line of the time distribution
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectLine {
    pub name: String,
    pub color: String,
    pub minutes: u64,
    pub percent: f64,
}

/// Everything the summary and the report display for one day
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryStats {
    pub date: NaiveDate,
    pub window_days: u32,
    pub record_count: usize,
    pub total_minutes: u64,
    pub today_minutes: u64,
    pub window_minutes: u64,
    pub orphaned_minutes: u64,
    pub projects: Vec<ProjectLine>,
    pub statuses: Vec<(TaskStatus, usize)>,
    pub daily: Vec<DayTotal>,
    pub overdue_count: usize,
    pub due_soon_count: usize,
}

impl SummaryStats {
    /// Days in the series with any time logged
    pub fn active_days(&self) -> usize {
        self.daily.iter().filter(|d| d.minutes > 0).count()
    }

    /// Average minutes per day over the window
    pub fn daily_average(&self) -> u64 {
        if self.window_days == 0 {
            0
        } else {
            self.window_minutes / u64::from(self.window_days)
        }
    }
}

/// Compute the summary of `snapshot` as seen on `date`
pub fn calculate_summary(
    snapshot: &Snapshot,
    date: NaiveDate,
    window_days: u32,
    due_horizon_days: u32,
) -> SummaryStats {
    let records = &snapshot.records;
    let tasks = &snapshot.tasks;

    let projects = project_breakdown(records, tasks, &snapshot.projects)
        .into_iter()
        .map(|share| ProjectLine {
            name: share.project.name.clone(),
            color: share.project.color.clone(),
            minutes: share.minutes,
            percent: share.percent,
        })
        .collect();

    SummaryStats {
        date,
        window_days,
        record_count: records.len(),
        total_minutes: total_minutes(records),
        today_minutes: total_for_day(records, date),
        window_minutes: total_last_days(records, date, window_days),
        orphaned_minutes: orphaned_minutes(records, tasks),
        projects,
        statuses: status_counts(tasks),
        daily: daily_series(records, window_days, date),
        overdue_count: overdue(tasks, date).len(),
        due_soon_count: due_within(tasks, date, due_horizon_days).len(),
    }
}
