use crate::domain::{is_overdue, Project, Task, TaskStatus};
use chrono::{Days, NaiveDate};
use std::collections::BTreeMap;

/// An all-day calendar entry for a task deadline
#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent<'a> {
    pub title: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub all_day: bool,
    pub task: &'a Task,
}

/// Tasks without a parent, in input order
pub fn top_level_tasks(tasks: &[Task]) -> Vec<&Task> {
    tasks.iter().filter(|t| t.is_top_level()).collect()
}

/// Group tasks by status. Every status is present, possibly empty.
pub fn by_status(tasks: &[Task]) -> BTreeMap<TaskStatus, Vec<&Task>> {
    let mut groups: BTreeMap<TaskStatus, Vec<&Task>> = TaskStatus::all()
        .iter()
        .map(|status| (*status, Vec::new()))
        .collect();
    for task in tasks {
        groups.entry(task.status).or_default().push(task);
    }
    groups
}

/// Number of tasks per status, statuses without tasks omitted
pub fn status_counts(tasks: &[Task]) -> Vec<(TaskStatus, usize)> {
    by_status(tasks)
        .into_iter()
        .map(|(status, group)| (status, group.len()))
        .filter(|(_, count)| *count > 0)
        .collect()
}

/// Open tasks past their deadline, earliest deadline first
pub fn overdue(tasks: &[Task], today: NaiveDate) -> Vec<&Task> {
    let mut late: Vec<&Task> = tasks.iter().filter(|t| is_overdue(t, today)).collect();
    late.sort_by_key(|t| t.deadline);
    late
}

/// Open tasks due between `today` and `today + horizon_days`, inclusive.
/// A horizon past the last representable date reaches to that date.
pub fn due_within(tasks: &[Task], today: NaiveDate, horizon_days: u32) -> Vec<&Task> {
    let horizon = today
        .checked_add_days(Days::new(u64::from(horizon_days)))
        .unwrap_or(NaiveDate::MAX);
    let mut upcoming: Vec<&Task> = tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Done)
        .filter(|t| matches!(t.deadline, Some(d) if d >= today && d <= horizon))
        .collect();
    upcoming.sort_by_key(|t| t.deadline);
    upcoming
}

/// One all-day event per task with a deadline.
/// Titles read "Project - Task" when the project is known.
pub fn to_calendar_events<'a>(tasks: &'a [Task], projects: &[Project]) -> Vec<CalendarEvent<'a>> {
    tasks
        .iter()
        .filter_map(|task| {
            let deadline = task.deadline?;
            let title = match projects.iter().find(|p| p.id == task.project_id) {
                Some(project) => format!("{} - {}", project.name, task.name),
                None => task.name.clone(),
            };
            Some(CalendarEvent {
                title,
                start: deadline,
                end: deadline,
                all_day: true,
                task,
            })
        })
        .collect()
}
