use crate::analytics::{due_within, format_duration, overdue};
use crate::report::stats::{calculate_summary, SummaryStats};
use crate::store::files::{atomic_write, report_file};
use crate::store::{Snapshot, Store};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::path::PathBuf;

/// Format percentage with 1 decimal place
fn format_percent(value: f64) -> String {
    format!("{:.1}%", value)
}

/// Options for a report run
#[derive(Debug, Clone)]
pub struct ReportOptions {
    pub date: NaiveDate,
    pub window_days: u32,
    pub due_horizon_days: u32,
    pub output: Option<PathBuf>,
}

/// Generate a markdown analytics report and write it to disk
pub fn generate_report<S: Store + ?Sized>(store: &S, options: &ReportOptions) -> Result<PathBuf> {
    let snapshot = Snapshot::fetch(store).context("Failed to load data for report")?;
    let stats = calculate_summary(
        &snapshot,
        options.date,
        options.window_days,
        options.due_horizon_days,
    );
    let report = render_report(&stats, &snapshot, options.due_horizon_days);

    let output_path = match &options.output {
        Some(path) => path.clone(),
        None => report_file(options.date)?,
    };
    atomic_write(&output_path, &report)?;
    tracing::info!(path = %output_path.display(), "report written");

    Ok(output_path)
}

/// Render the report body
pub fn render_report(stats: &SummaryStats, snapshot: &Snapshot, due_horizon_days: u32) -> String {
    let mut report = String::new();

    report.push_str(&format!("# Time Report - {}\n\n", stats.date));

    // Summary Section
    report.push_str("## Summary\n\n");
    report.push_str(&format!("- **Today:** {}\n", format_duration(stats.today_minutes)));
    report.push_str(&format!(
        "- **Last {} days:** {} ({} active days, {} per day)\n",
        stats.window_days,
        format_duration(stats.window_minutes),
        stats.active_days(),
        format_duration(stats.daily_average())
    ));
    report.push_str(&format!(
        "- **All time:** {} across {} records\n",
        format_duration(stats.total_minutes),
        stats.record_count
    ));
    if stats.orphaned_minutes > 0 {
        report.push_str(&format!(
            "- **Unattributed:** {} logged on deleted tasks\n",
            format_duration(stats.orphaned_minutes)
        ));
    }
    report.push('\n');

    // Time by Project Section
    report.push_str("## Time by Project\n\n");
    if stats.projects.is_empty() {
        report.push_str("_No time recorded yet._\n\n");
    } else {
        for line in &stats.projects {
            report.push_str(&format!(
                "- **{}** ({}): {} ({})\n",
                line.name,
                line.color,
                format_duration(line.minutes),
                format_percent(line.percent)
            ));
        }
        report.push('\n');
    }

    // Daily Activity Section
    report.push_str("## Daily Activity\n\n");
    report.push_str("| Day | Minutes | Hours |\n");
    report.push_str("|-----|---------|-------|\n");
    for day in &stats.daily {
        report.push_str(&format!(
            "| {} | {} | {:.1} |\n",
            day.day.format("%a %m-%d"),
            day.minutes,
            day.hours
        ));
    }
    report.push('\n');

    // Tasks by Status Section
    report.push_str("## Tasks by Status\n\n");
    if stats.statuses.is_empty() {
        report.push_str("_No tasks._\n\n");
    } else {
        for (status, count) in &stats.statuses {
            report.push_str(&format!("- {}: {}\n", status.label(), count));
        }
        report.push('\n');
    }

    // Deadlines Section
    let late = overdue(&snapshot.tasks, stats.date);
    let upcoming = due_within(&snapshot.tasks, stats.date, due_horizon_days);
    if !late.is_empty() || !upcoming.is_empty() {
        report.push_str("## Deadlines\n\n");
        for task in late {
            if let Some(deadline) = task.deadline {
                report.push_str(&format!("- ⚠ **{}** overdue since {}\n", task.name, deadline));
            }
        }
        for task in upcoming {
            if let Some(deadline) = task.deadline {
                report.push_str(&format!("- {} due {}\n", task.name, deadline));
            }
        }
        report.push('\n');
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::fixtures::{day, project, record, task};
    use crate::domain::{NewProject, NewTask, NewTimeRecord};
    use crate::store::memory::MemoryStore;
    use crate::store::RecordSink;
    use tempfile::tempdir;

    fn snapshot() -> Snapshot {
        let mut late = task(11, 1, "File taxes");
        late.deadline = Some(day(2024, 1, 3));
        Snapshot {
            projects: vec![project(1, "Work")],
            tasks: vec![task(10, 1, "Code"), late],
            records: vec![record(1, 10, 95, day(2024, 1, 7)), record(2, 99, 5, day(2024, 1, 6))],
        }
    }

    #[test]
    fn test_render_report_sections() {
        let snapshot = snapshot();
        let stats = calculate_summary(&snapshot, day(2024, 1, 7), 7, 7);
        let report = render_report(&stats, &snapshot, 7);

        assert!(report.starts_with("# Time Report - 2024-01-07\n"));
        assert!(report.contains("- **Today:** 1h 35m\n"));
        assert!(report.contains("- **Work** (#0d6efd): 1h 35m (100.0%)\n"));
        assert!(report.contains("- **Unattributed:** 5m logged on deleted tasks\n"));
        assert!(report.contains("| Sun 01-07 | 95 | 1.6 |\n"));
        assert!(report.contains("- Pending: 2\n"));
        assert!(report.contains("- ⚠ **File taxes** overdue since 2024-01-03\n"));
    }

    #[test]
    fn test_render_report_empty() {
        let snapshot = Snapshot::default();
        let stats = calculate_summary(&snapshot, day(2024, 1, 7), 3, 7);
        let report = render_report(&stats, &snapshot, 7);

        assert!(report.contains("_No time recorded yet._"));
        assert!(report.contains("_No tasks._"));
        assert!(!report.contains("## Deadlines"));
    }

    #[test]
    fn test_generate_report_writes_file() {
        let temp_dir = tempdir().unwrap();
        let output = temp_dir.path().join("report.md");

        let mut store = MemoryStore::new();
        let project = store.create_project(NewProject::new("Work")).unwrap();
        let task = store.create_task(project.id, NewTask::new("Code")).unwrap();
        store
            .create_record(NewTimeRecord {
                task_id: task.id,
                minutes_spent: 30,
                date: day(2024, 1, 7),
                notes: None,
            })
            .unwrap();

        let options = ReportOptions {
            date: day(2024, 1, 7),
            window_days: 7,
            due_horizon_days: 7,
            output: Some(output.clone()),
        };
        let path = generate_report(&store, &options).unwrap();

        assert_eq!(path, output);
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("- **Today:** 30m\n"));
    }
}
