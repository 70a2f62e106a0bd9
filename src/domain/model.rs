use super::enums::{Priority, ProjectStatus, TaskStatus};
use crate::error::ValidationError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned identifier. Zero never names a persisted entity.
pub type Id = u64;

/// Default color for new projects
pub const DEFAULT_PROJECT_COLOR: &str = "#0d6efd";

/// A top-level grouping of tasks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Display color as a hex string
    pub color: String,
    pub status: ProjectStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Project {
    pub fn is_active(&self) -> bool {
        is_active_project(self)
    }
}

/// Fields a client supplies when creating a project
#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub name: String,
    pub description: String,
    pub color: String,
}

impl NewProject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            color: DEFAULT_PROJECT_COLOR.to_string(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName("project"));
        }
        validate_color(&self.color)
    }
}

/// A unit of work under a project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Id,
    /// Owning project, fixed for the lifetime of the task
    pub project_id: Id,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Set for subtasks
    #[serde(default)]
    pub parent_id: Option<Id>,
}

impl Task {
    pub fn is_top_level(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        is_overdue(self, today)
    }

    /// Nesting depth (0 = top-level task, 1 = subtask).
    /// A parent missing from `tasks` ends the walk.
    pub fn depth(&self, tasks: &[Task]) -> usize {
        let mut depth = 0;
        let mut parent = self.parent_id;
        while let Some(parent_id) = parent {
            if depth >= tasks.len() {
                break; // cycle guard
            }
            depth += 1;
            parent = tasks
                .iter()
                .find(|t| t.id == parent_id)
                .and_then(|t| t.parent_id);
        }
        depth
    }
}

/// Fields a client supplies when creating a task
#[derive(Debug, Clone, PartialEq)]
pub struct NewTask {
    pub name: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub deadline: Option<NaiveDate>,
    pub parent_id: Option<Id>,
}

impl NewTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            priority: Priority::Medium,
            status: TaskStatus::Pending,
            deadline: None,
            parent_id: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn status(mut self, status: TaskStatus) -> Self {
        self.status = status;
        self
    }

    pub fn deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn parent(mut self, parent_id: Id) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName("task"));
        }
        Ok(())
    }
}

/// Changes to an existing project; `None` leaves the field as it is
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
}

impl ProjectPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.color.is_none()
    }

    /// Copy of `project` with the changes applied. Validation happens in the store.
    pub fn apply(self, project: &Project) -> Project {
        let mut updated = project.clone();
        if let Some(name) = self.name {
            updated.name = name;
        }
        if let Some(description) = self.description {
            updated.description = description;
        }
        if let Some(color) = self.color {
            updated.color = color;
        }
        updated
    }
}

/// Changes to an existing task. Project and parent are not editable here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    /// `Some(None)` clears the deadline
    pub deadline: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.priority.is_none()
            && self.deadline.is_none()
    }

    pub fn apply(self, task: &Task) -> Task {
        let mut updated = task.clone();
        if let Some(name) = self.name {
            updated.name = name;
        }
        if let Some(description) = self.description {
            updated.description = description;
        }
        if let Some(priority) = self.priority {
            updated.priority = priority;
        }
        if let Some(deadline) = self.deadline {
            updated.deadline = deadline;
        }
        updated
    }
}

/// An immutable log entry of minutes spent on a task on a given day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeRecord {
    pub id: Id,
    /// Weak reference: the task may have been deleted since
    pub task_id: Id,
    pub minutes_spent: u32,
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Fields a client supplies when creating a time record
#[derive(Debug, Clone, PartialEq)]
pub struct NewTimeRecord {
    pub task_id: Id,
    pub minutes_spent: u32,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

impl NewTimeRecord {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.task_id == 0 {
            return Err(ValidationError::MissingTask);
        }
        if self.minutes_spent < 1 {
            return Err(ValidationError::InvalidMinutes);
        }
        Ok(())
    }
}

/// A persisted record is valid when it names a task and holds at least a minute
pub fn valid_time_record(record: &TimeRecord) -> bool {
    record.minutes_spent >= 1 && record.task_id != 0
}

pub fn is_active_project(project: &Project) -> bool {
    project.status == ProjectStatus::Active
}

/// Open task whose deadline is strictly before `today`
pub fn is_overdue(task: &Task, today: NaiveDate) -> bool {
    match task.deadline {
        Some(deadline) => task.status != TaskStatus::Done && deadline < today,
        None => false,
    }
}

/// Accept `#rgb` and `#rrggbb`
pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    let hex = color.strip_prefix('#').unwrap_or("");
    let valid_len = hex.len() == 3 || hex.len() == 6;
    if valid_len && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(())
    } else {
        Err(ValidationError::InvalidColor(color.to_string()))
    }
}

/// Direct children of `parent_id`, in input order
pub fn subtasks_of(parent_id: Id, tasks: &[Task]) -> Vec<&Task> {
    tasks
        .iter()
        .filter(|t| t.parent_id == Some(parent_id))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_valid_time_record() {
        let mut r = record(1, 10, 30, day(2024, 1, 1));
        assert!(valid_time_record(&r));

        r.minutes_spent = 0;
        assert!(!valid_time_record(&r));

        r.minutes_spent = 5;
        r.task_id = 0;
        assert!(!valid_time_record(&r));
    }

    #[test]
    fn test_is_active_project() {
        let mut p = project(1, "Work");
        assert!(is_active_project(&p));
        p.status = ProjectStatus::Archived;
        assert!(!p.is_active());
    }

    #[test]
    fn test_is_overdue() {
        let today = day(2024, 3, 10);
        let mut t = task(1, 1, "Write report");
        assert!(!is_overdue(&t, today)); // no deadline

        t.deadline = Some(day(2024, 3, 9));
        assert!(is_overdue(&t, today));

        t.deadline = Some(today);
        assert!(!is_overdue(&t, today)); // due today is not late yet

        t.deadline = Some(day(2024, 3, 1));
        t.status = TaskStatus::Done;
        assert!(!is_overdue(&t, today));
    }

    #[test]
    fn test_task_depth() {
        let parent = task(1, 1, "Parent");
        let mut child = task(2, 1, "Child");
        child.parent_id = Some(1);
        let mut grandchild = task(3, 1, "Grandchild");
        grandchild.parent_id = Some(2);
        let tasks = vec![parent.clone(), child.clone(), grandchild.clone()];

        assert_eq!(parent.depth(&tasks), 0);
        assert_eq!(child.depth(&tasks), 1);
        assert_eq!(grandchild.depth(&tasks), 2);
    }

    #[test]
    fn test_task_depth_with_missing_parent() {
        let mut orphan = task(2, 1, "Orphan");
        orphan.parent_id = Some(99);
        assert_eq!(orphan.depth(&[orphan.clone()]), 1);
    }

    #[test]
    fn test_validate_color() {
        assert!(validate_color("#fff").is_ok());
        assert!(validate_color("#0D6EFD").is_ok());
        assert_eq!(
            validate_color("blue"),
            Err(ValidationError::InvalidColor("blue".to_string()))
        );
        assert!(validate_color("#12345").is_err());
    }

    #[test]
    fn test_new_project_validation() {
        assert!(NewProject::new("Home").validate().is_ok());
        assert_eq!(
            NewProject::new("  ").validate(),
            Err(ValidationError::EmptyName("project"))
        );
        assert!(NewProject::new("Home").color("#zzz").validate().is_err());
    }

    #[test]
    fn test_new_time_record_validation() {
        let draft = NewTimeRecord {
            task_id: 3,
            minutes_spent: 1,
            date: day(2024, 1, 1),
            notes: None,
        };
        assert!(draft.validate().is_ok());

        let no_task = NewTimeRecord { task_id: 0, ..draft.clone() };
        assert_eq!(no_task.validate(), Err(ValidationError::MissingTask));

        let no_minutes = NewTimeRecord { minutes_spent: 0, ..draft };
        assert_eq!(no_minutes.validate(), Err(ValidationError::InvalidMinutes));
    }

    #[test]
    fn test_project_patch_keeps_unset_fields() {
        let original = project(1, "Work");
        let patch = ProjectPatch {
            color: Some("#198754".to_string()),
            ..ProjectPatch::default()
        };
        assert!(!patch.is_empty());

        let updated = patch.apply(&original);
        assert_eq!(updated.name, "Work");
        assert_eq!(updated.color, "#198754");
        assert!(ProjectPatch::default().is_empty());
    }

    #[test]
    fn test_task_patch_sets_and_clears_deadline() {
        let mut original = task(1, 1, "Write report");
        original.deadline = Some(day(2024, 3, 1));

        let moved = TaskPatch {
            deadline: Some(Some(day(2024, 4, 1))),
            priority: Some(Priority::High),
            ..TaskPatch::default()
        }
        .apply(&original);
        assert_eq!(moved.deadline, Some(day(2024, 4, 1)));
        assert_eq!(moved.priority, Priority::High);
        assert_eq!(moved.name, "Write report");

        let cleared = TaskPatch {
            deadline: Some(None),
            ..TaskPatch::default()
        }
        .apply(&original);
        assert_eq!(cleared.deadline, None);
        assert_eq!(cleared.priority, original.priority);
    }

    #[test]
    fn test_subtasks_of() {
        let mut a = task(2, 1, "A");
        a.parent_id = Some(1);
        let mut b = task(3, 1, "B");
        b.parent_id = Some(1);
        let tasks = vec![task(1, 1, "Parent"), a, b, task(4, 1, "Other")];

        let names: Vec<&str> = subtasks_of(1, &tasks).iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B"]);
    }
}
