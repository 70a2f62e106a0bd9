use super::enums::{Priority, TaskStatus};
use super::model::{subtasks_of, Task};
use crate::analytics::top_level_tasks;

/// A flattened row for listing the task tree
#[derive(Debug, Clone, Copy)]
pub struct FlatRow<'a> {
    /// Depth in the tree (0 = task, 1 = subtask)
    pub depth: usize,
    /// Whether this is the last subtask of its parent
    pub is_last: bool,
    pub task: &'a Task,
}

/// Flatten tasks into display order: each top-level task followed by its subtasks.
/// Tasks nested deeper than one level are not reachable from a top-level row and are skipped.
pub fn flatten_tasks(tasks: &[Task]) -> Vec<FlatRow<'_>> {
    let mut rows = Vec::new();

    for task in top_level_tasks(tasks) {
        rows.push(FlatRow {
            depth: 0,
            is_last: false,
            task,
        });

        let subtasks = subtasks_of(task.id, tasks);
        let count = subtasks.len();
        for (idx, subtask) in subtasks.into_iter().enumerate() {
            rows.push(FlatRow {
                depth: 1,
                is_last: idx == count - 1,
                task: subtask,
            });
        }
    }

    rows
}

/// Get status badge text
pub fn status_badge(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "○ PENDING",
        TaskStatus::InProgress => "◐ IN PROGRESS",
        TaskStatus::Done => "✓ DONE",
    }
}

pub fn priority_badge(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "low",
        Priority::Medium => "med",
        Priority::High => "HIGH",
    }
}

/// Get tree connector for subtasks
pub fn tree_connector(is_last: bool) -> &'static str {
    if is_last {
        "└─"
    } else {
        "├─"
    }
}

#[cfg(test)]
mod tests {
    use super::super::model::fixtures::task;
    use super::*;

    #[test]
    fn test_flatten_tasks_simple() {
        let tasks = vec![task(1, 1, "Task 1"), task(2, 1, "Task 2")];

        let rows = flatten_tasks(&tasks);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].depth, 0);
        assert_eq!(rows[0].task.id, 1);
        assert_eq!(rows[1].task.id, 2);
    }

    #[test]
    fn test_flatten_tasks_with_subtasks() {
        let mut sub1 = task(2, 1, "Subtask 1");
        sub1.parent_id = Some(1);
        let mut sub2 = task(3, 1, "Subtask 2");
        sub2.parent_id = Some(1);
        // subtasks listed before their parent still render under it
        let tasks = vec![sub1, task(1, 1, "Parent"), sub2];

        let rows = flatten_tasks(&tasks);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].task.name, "Parent");
        assert_eq!(rows[1].depth, 1);
        assert_eq!(rows[2].depth, 1);
        assert!(!rows[1].is_last);
        assert!(rows[2].is_last);
    }

    #[test]
    fn test_flatten_skips_deep_nesting() {
        let mut sub = task(2, 1, "Sub");
        sub.parent_id = Some(1);
        let mut deep = task(3, 1, "Deep");
        deep.parent_id = Some(2);
        let tasks = vec![task(1, 1, "Parent"), sub, deep];

        assert_eq!(flatten_tasks(&tasks).len(), 2);
    }

    #[test]
    fn test_tree_connector() {
        assert_eq!(tree_connector(false), "├─");
        assert_eq!(tree_connector(true), "└─");
    }

    #[test]
    fn test_status_badge() {
        assert_eq!(status_badge(TaskStatus::Done), "✓ DONE");
        assert_eq!(status_badge(TaskStatus::Pending), "○ PENDING");
    }
}
