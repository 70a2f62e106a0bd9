use crate::domain::{Id, Project, Task, TimeRecord};
use chrono::{Days, NaiveDate};
use std::collections::{HashMap, HashSet};

/// One day of the daily series
#[derive(Debug, Clone, PartialEq)]
pub struct DayTotal {
    pub day: NaiveDate,
    pub minutes: u64,
    /// Display value, rounded to one decimal
    pub hours: f64,
}

/// Per-project slice of the time distribution
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectShare<'a> {
    pub project: &'a Project,
    pub minutes: u64,
    /// Share of all attributed minutes, 0-100
    pub percent: f64,
}

/// Time logged against one task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTotal {
    pub minutes: u64,
    pub hours: u64,
    /// Minutes left over after whole hours
    pub remainder_minutes: u64,
}

pub fn total_minutes(records: &[TimeRecord]) -> u64 {
    records.iter().map(|r| u64::from(r.minutes_spent)).sum()
}

pub fn total_for_day(records: &[TimeRecord], day: NaiveDate) -> u64 {
    records
        .iter()
        .filter(|r| r.date == day)
        .map(|r| u64::from(r.minutes_spent))
        .sum()
}

/// Sum over records dated within `[from, to]`, both ends inclusive
pub fn total_for_window(records: &[TimeRecord], from: NaiveDate, to: NaiveDate) -> u64 {
    records
        .iter()
        .filter(|r| r.date >= from && r.date <= to)
        .map(|r| u64::from(r.minutes_spent))
        .sum()
}

/// Total for the `days` calendar days ending at `today` (the "this week" figure)
pub fn total_last_days(records: &[TimeRecord], today: NaiveDate, days: u32) -> u64 {
    if days == 0 {
        return 0;
    }
    let from = today
        .checked_sub_days(Days::new(u64::from(days) - 1))
        .unwrap_or(NaiveDate::MIN);
    total_for_window(records, from, today)
}

/// Minutes per project id, joined record -> task -> project.
/// Projects without time are absent; records whose task is gone are skipped.
pub fn minutes_by_project(
    records: &[TimeRecord],
    tasks: &[Task],
    projects: &[Project],
) -> HashMap<Id, u64> {
    let known_projects: HashSet<Id> = projects.iter().map(|p| p.id).collect();
    let task_project: HashMap<Id, Id> = tasks.iter().map(|t| (t.id, t.project_id)).collect();

    let mut totals: HashMap<Id, u64> = HashMap::new();
    for record in records {
        let Some(project_id) = task_project.get(&record.task_id) else {
            continue;
        };
        if known_projects.contains(project_id) {
            *totals.entry(*project_id).or_insert(0) += u64::from(record.minutes_spent);
        }
    }
    totals.retain(|_, minutes| *minutes > 0);
    totals
}

/// Projects with time, largest first, with their share of the total
pub fn project_breakdown<'a>(
    records: &[TimeRecord],
    tasks: &[Task],
    projects: &'a [Project],
) -> Vec<ProjectShare<'a>> {
    let totals = minutes_by_project(records, tasks, projects);
    let grand_total: u64 = totals.values().sum();

    let mut shares: Vec<ProjectShare<'a>> = projects
        .iter()
        .filter_map(|project| {
            let minutes = *totals.get(&project.id)?;
            Some(ProjectShare {
                project,
                minutes,
                percent: percent_of(minutes, grand_total),
            })
        })
        .collect();
    // stable sort keeps input order between equal totals
    shares.sort_by(|a, b| b.minutes.cmp(&a.minutes));
    shares
}

/// Minutes for one project within `[from, to]`
pub fn project_total_between(
    records: &[TimeRecord],
    tasks: &[Task],
    project_id: Id,
    from: NaiveDate,
    to: NaiveDate,
) -> u64 {
    let project_tasks: HashSet<Id> = tasks
        .iter()
        .filter(|t| t.project_id == project_id)
        .map(|t| t.id)
        .collect();
    records
        .iter()
        .filter(|r| project_tasks.contains(&r.task_id) && r.date >= from && r.date <= to)
        .map(|r| u64::from(r.minutes_spent))
        .sum()
}

pub fn task_total(records: &[TimeRecord], task_id: Id) -> TaskTotal {
    let minutes: u64 = records
        .iter()
        .filter(|r| r.task_id == task_id)
        .map(|r| u64::from(r.minutes_spent))
        .sum();
    TaskTotal {
        minutes,
        hours: minutes / 60,
        remainder_minutes: minutes % 60,
    }
}

/// Minutes logged against tasks that no longer exist
pub fn orphaned_minutes(records: &[TimeRecord], tasks: &[Task]) -> u64 {
    let task_ids: HashSet<Id> = tasks.iter().map(|t| t.id).collect();
    records
        .iter()
        .filter(|r| !task_ids.contains(&r.task_id))
        .map(|r| u64::from(r.minutes_spent))
        .sum()
}

/// `num_days` consecutive days ending at `end_day`, oldest first, gaps as zero.
/// The series stops at the first representable date.
pub fn daily_series(records: &[TimeRecord], num_days: u32, end_day: NaiveDate) -> Vec<DayTotal> {
    let mut per_day: HashMap<NaiveDate, u64> = HashMap::new();
    for record in records {
        *per_day.entry(record.date).or_insert(0) += u64::from(record.minutes_spent);
    }

    let mut series: Vec<DayTotal> = (0..u64::from(num_days))
        .map_while(|offset| end_day.checked_sub_days(Days::new(offset)))
        .map(|day| {
            let minutes = per_day.get(&day).copied().unwrap_or(0);
            DayTotal {
                day,
                minutes,
                hours: hours_one_decimal(minutes),
            }
        })
        .collect();
    series.reverse();
    series
}

/// Records sorted by date, most recent first
pub fn records_newest_first(records: &[TimeRecord]) -> Vec<&TimeRecord> {
    let mut sorted: Vec<&TimeRecord> = records.iter().collect();
    sorted.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
    sorted
}

/// Format minutes as "Xm" below an hour, else "Xh Ym"
pub fn format_duration(minutes: u64) -> String {
    if minutes < 60 {
        format!("{}m", minutes)
    } else {
        format!("{}h {}m", minutes / 60, minutes % 60)
    }
}

/// Format seconds as "HH:MM:SS" for the running timer
pub fn format_clock(seconds: u64) -> String {
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

fn hours_one_decimal(minutes: u64) -> f64 {
    (minutes as f64 / 60.0 * 10.0).round() / 10.0
}

fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::fixtures::{day, project, record, task};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_totals_on_empty_input() {
        assert_eq!(total_minutes(&[]), 0);
        assert_eq!(total_for_day(&[], day(2024, 1, 1)), 0);
        assert_eq!(total_for_window(&[], day(2024, 1, 1), day(2024, 1, 31)), 0);
        assert!(minutes_by_project(&[], &[], &[]).is_empty());
        assert!(project_breakdown(&[], &[], &[]).is_empty());
    }

    #[test]
    fn test_total_minutes_is_order_independent() {
        let records = vec![
            record(1, 10, 30, day(2024, 1, 1)),
            record(2, 10, 45, day(2024, 1, 2)),
            record(3, 11, 5, day(2024, 1, 3)),
        ];
        let mut reversed = records.clone();
        reversed.reverse();

        assert_eq!(total_minutes(&records), 80);
        assert_eq!(total_minutes(&reversed), 80);
    }

    #[test]
    fn test_total_for_window_is_inclusive() {
        let records = vec![
            record(1, 10, 10, day(2024, 1, 1)),
            record(2, 10, 20, day(2024, 1, 5)),
            record(3, 10, 40, day(2024, 1, 6)),
        ];
        assert_eq!(total_for_window(&records, day(2024, 1, 1), day(2024, 1, 5)), 30);
        assert_eq!(total_for_window(&records, day(2024, 1, 5), day(2024, 1, 5)), 20);
        assert_eq!(total_for_window(&records, day(2024, 1, 7), day(2024, 1, 9)), 0);
    }

    #[test]
    fn test_total_last_days() {
        let today = day(2024, 1, 10);
        let records = vec![
            record(1, 10, 10, day(2024, 1, 3)), // outside 7-day window
            record(2, 10, 20, day(2024, 1, 4)),
            record(3, 10, 30, today),
        ];
        assert_eq!(total_last_days(&records, today, 7), 50);
        assert_eq!(total_last_days(&records, today, 1), 30);
        assert_eq!(total_last_days(&records, today, 0), 0);
    }

    #[test]
    fn test_windows_saturate_at_calendar_bounds() {
        let records = vec![record(1, 10, 25, day(2024, 1, 1))];
        assert_eq!(total_last_days(&records, day(2024, 1, 1), u32::MAX), 25);
        assert_eq!(total_last_days(&records, NaiveDate::MIN, u32::MAX), 0);

        let series = daily_series(&[], 5, NaiveDate::MIN + Days::new(2));
        assert_eq!(series.len(), 3);
        assert_eq!(series[0].day, NaiveDate::MIN);
    }

    #[test]
    fn test_daily_series_fills_gaps_oldest_first() {
        let series = daily_series(&[], 7, day(2024, 1, 7));

        assert_eq!(series.len(), 7);
        assert_eq!(series[0].day, day(2024, 1, 1));
        assert_eq!(series[6].day, day(2024, 1, 7));
        assert!(series.iter().all(|d| d.minutes == 0 && d.hours == 0.0));
    }

    #[test]
    fn test_daily_series_rounds_hours_only() {
        let records = vec![
            record(1, 10, 50, day(2024, 1, 6)),
            record(2, 11, 45, day(2024, 1, 6)),
        ];
        let series = daily_series(&records, 2, day(2024, 1, 7));

        assert_eq!(
            series,
            vec![
                DayTotal { day: day(2024, 1, 6), minutes: 95, hours: 1.6 },
                DayTotal { day: day(2024, 1, 7), minutes: 0, hours: 0.0 },
            ]
        );
    }

    #[test]
    fn test_minutes_by_project_excludes_empty_and_orphans() {
        let projects = vec![project(1, "Work"), project(2, "Home")];
        let tasks = vec![task(10, 1, "Code"), task(20, 2, "Garden")];
        let records = vec![
            record(1, 10, 30, day(2024, 1, 1)),
            record(2, 10, 15, day(2024, 1, 2)),
            record(3, 99, 60, day(2024, 1, 2)), // task deleted
        ];

        let totals = minutes_by_project(&records, &tasks, &projects);
        assert_eq!(totals.len(), 1);
        assert_eq!(totals.get(&1), Some(&45));
        assert_eq!(totals.get(&2), None);
        assert_eq!(orphaned_minutes(&records, &tasks), 60);
    }

    #[test]
    fn test_project_breakdown_sorted_with_shares() {
        let projects = vec![project(1, "Work"), project(2, "Home"), project(3, "Idle")];
        let tasks = vec![task(10, 1, "Code"), task(20, 2, "Garden")];
        let records = vec![
            record(1, 10, 30, day(2024, 1, 1)),
            record(2, 20, 90, day(2024, 1, 1)),
        ];

        let shares = project_breakdown(&records, &tasks, &projects);
        let summary: Vec<(&str, u64, f64)> = shares
            .iter()
            .map(|s| (s.project.name.as_str(), s.minutes, s.percent))
            .collect();
        assert_eq!(summary, vec![("Home", 90, 75.0), ("Work", 30, 25.0)]);
    }

    #[test]
    fn test_project_total_between() {
        let tasks = vec![task(10, 1, "Code"), task(11, 1, "Review"), task(20, 2, "Garden")];
        let records = vec![
            record(1, 10, 30, day(2024, 1, 1)),
            record(2, 11, 20, day(2024, 1, 3)),
            record(3, 20, 90, day(2024, 1, 2)),
            record(4, 10, 10, day(2024, 2, 1)),
        ];
        assert_eq!(
            project_total_between(&records, &tasks, 1, day(2024, 1, 1), day(2024, 1, 31)),
            50
        );
    }

    #[test]
    fn test_task_total() {
        let records = vec![
            record(1, 10, 50, day(2024, 1, 1)),
            record(2, 10, 45, day(2024, 1, 2)),
            record(3, 11, 5, day(2024, 1, 2)),
        ];
        assert_eq!(
            task_total(&records, 10),
            TaskTotal { minutes: 95, hours: 1, remainder_minutes: 35 }
        );
    }

    #[test]
    fn test_records_newest_first() {
        let records = vec![
            record(1, 10, 5, day(2024, 1, 2)),
            record(2, 10, 5, day(2024, 1, 9)),
            record(3, 10, 5, day(2024, 1, 5)),
        ];
        let ids: Vec<Id> = records_newest_first(&records).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0m");
        assert_eq!(format_duration(59), "59m");
        assert_eq!(format_duration(60), "1h 0m");
        assert_eq!(format_duration(65), "1h 5m");
        assert_eq!(format_duration(125), "2h 5m");
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00:00");
        assert_eq!(format_clock(125), "00:02:05");
        assert_eq!(format_clock(3661), "01:01:01");
    }
}
