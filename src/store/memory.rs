use super::{RecordSink, Store};
use crate::domain::{
    validate_color, Id, NewProject, NewTask, NewTimeRecord, Project, ProjectStatus, Task,
    TaskStatus, TimeRecord,
};
use crate::error::{TrackerError, TrackerResult, ValidationError};
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// All persisted entities plus the id sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Last id handed out; shared by all entity kinds
    #[serde(default)]
    pub last_id: Id,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub records: Vec<TimeRecord>,
}

impl Dataset {
    fn next_id(&mut self) -> Id {
        self.last_id += 1;
        self.last_id
    }

    fn project(&self, id: Id) -> TrackerResult<&Project> {
        self.projects
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| TrackerError::not_found("project", id))
    }

    fn project_mut(&mut self, id: Id) -> TrackerResult<&mut Project> {
        self.projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| TrackerError::not_found("project", id))
    }

    fn task(&self, id: Id) -> TrackerResult<&Task> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| TrackerError::not_found("task", id))
    }

    fn task_mut(&mut self, id: Id) -> TrackerResult<&mut Task> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| TrackerError::not_found("task", id))
    }

    /// Enforce one level of nesting: the parent must be a top-level task of
    /// the same project, and a task that has subtasks cannot become one.
    fn check_parent(&self, project_id: Id, parent_id: Id, child_id: Option<Id>) -> TrackerResult<()> {
        let parent = self.task(parent_id)?;
        if parent.project_id != project_id {
            return Err(ValidationError::ParentInOtherProject.into());
        }
        if parent.depth(&self.tasks) > 0 || Some(parent_id) == child_id {
            return Err(ValidationError::NestingTooDeep.into());
        }
        if let Some(child_id) = child_id {
            if self.tasks.iter().any(|t| t.parent_id == Some(child_id)) {
                return Err(ValidationError::NestingTooDeep.into());
            }
        }
        Ok(())
    }

    pub fn create_project(&mut self, draft: NewProject) -> TrackerResult<Project> {
        draft.validate()?;
        let now = Utc::now();
        let project = Project {
            id: self.next_id(),
            name: draft.name.trim().to_string(),
            description: draft.description,
            color: draft.color,
            status: ProjectStatus::Active,
            created_at: now,
            updated_at: now,
        };
        tracing::debug!(id = project.id, name = %project.name, "created project");
        self.projects.push(project.clone());
        Ok(project)
    }

    pub fn update_project(&mut self, project: Project) -> TrackerResult<Project> {
        if project.name.trim().is_empty() {
            return Err(ValidationError::EmptyName("project").into());
        }
        validate_color(&project.color)?;

        let existing = self.project_mut(project.id)?;
        existing.name = project.name.trim().to_string();
        existing.description = project.description;
        existing.color = project.color;
        existing.status = project.status;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    pub fn delete_project(&mut self, id: Id) -> TrackerResult<()> {
        self.project(id)?;
        self.projects.retain(|p| p.id != id);
        let before = self.tasks.len();
        self.tasks.retain(|t| t.project_id != id);
        tracing::debug!(id, removed_tasks = before - self.tasks.len(), "deleted project");
        Ok(())
    }

    pub fn toggle_archive(&mut self, id: Id) -> TrackerResult<Project> {
        let project = self.project_mut(id)?;
        project.status = project.status.toggled();
        project.updated_at = Utc::now();
        tracing::debug!(id, status = %project.status, "toggled project archive");
        Ok(project.clone())
    }

    pub fn create_task(&mut self, project_id: Id, draft: NewTask) -> TrackerResult<Task> {
        draft.validate()?;
        self.project(project_id)?;
        if let Some(parent_id) = draft.parent_id {
            self.check_parent(project_id, parent_id, None)?;
        }

        let now = Utc::now();
        let task = Task {
            id: self.next_id(),
            project_id,
            name: draft.name.trim().to_string(),
            description: draft.description,
            priority: draft.priority,
            status: draft.status,
            deadline: draft.deadline,
            created_at: now,
            updated_at: now,
            parent_id: draft.parent_id,
        };
        tracing::debug!(id = task.id, project_id, "created task");
        self.tasks.push(task.clone());
        Ok(task)
    }

    pub fn update_task(&mut self, task: Task) -> TrackerResult<Task> {
        if task.name.trim().is_empty() {
            return Err(ValidationError::EmptyName("task").into());
        }
        let existing = self.task(task.id)?;
        if existing.project_id != task.project_id {
            return Err(ValidationError::ProjectChanged.into());
        }
        if task.parent_id != existing.parent_id {
            if let Some(parent_id) = task.parent_id {
                self.check_parent(task.project_id, parent_id, Some(task.id))?;
            }
        }

        let existing = self.task_mut(task.id)?;
        existing.name = task.name.trim().to_string();
        existing.description = task.description;
        existing.priority = task.priority;
        existing.status = task.status;
        existing.deadline = task.deadline;
        existing.parent_id = task.parent_id;
        existing.updated_at = Utc::now();
        Ok(existing.clone())
    }

    pub fn delete_task(&mut self, id: Id) -> TrackerResult<()> {
        self.task(id)?;
        self.tasks.retain(|t| t.id != id && t.parent_id != Some(id));
        tracing::debug!(id, "deleted task and its subtasks");
        Ok(())
    }

    pub fn set_status(&mut self, id: Id, status: TaskStatus) -> TrackerResult<Task> {
        let task = self.task_mut(id)?;
        task.status = status;
        task.updated_at = Utc::now();
        Ok(task.clone())
    }

    pub fn create_record(&mut self, draft: NewTimeRecord) -> TrackerResult<TimeRecord> {
        draft.validate()?;
        self.task(draft.task_id)?;

        let record = TimeRecord {
            id: self.next_id(),
            task_id: draft.task_id,
            minutes_spent: draft.minutes_spent,
            date: draft.date,
            notes: draft.notes.filter(|n| !n.trim().is_empty()),
            created_at: Utc::now(),
        };
        tracing::debug!(
            id = record.id,
            task_id = record.task_id,
            minutes = record.minutes_spent,
            "created time record"
        );
        self.records.push(record.clone());
        Ok(record)
    }

    pub fn delete_record(&mut self, id: Id) -> TrackerResult<()> {
        if !self.records.iter().any(|r| r.id == id) {
            return Err(TrackerError::not_found("time record", id));
        }
        self.records.retain(|r| r.id != id);
        Ok(())
    }
}

/// Store kept entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Dataset,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_dataset(data: Dataset) -> Self {
        Self { data }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.data
    }
}

impl RecordSink for MemoryStore {
    fn create_record(&mut self, draft: NewTimeRecord) -> TrackerResult<TimeRecord> {
        self.data.create_record(draft)
    }
}

impl Store for MemoryStore {
    fn list_projects(&self) -> TrackerResult<Vec<Project>> {
        Ok(self.data.projects.clone())
    }

    fn get_project(&self, id: Id) -> TrackerResult<Project> {
        self.data.project(id).cloned()
    }

    fn create_project(&mut self, draft: NewProject) -> TrackerResult<Project> {
        self.data.create_project(draft)
    }

    fn update_project(&mut self, project: Project) -> TrackerResult<Project> {
        self.data.update_project(project)
    }

    fn delete_project(&mut self, id: Id) -> TrackerResult<()> {
        self.data.delete_project(id)
    }

    fn toggle_archive(&mut self, id: Id) -> TrackerResult<Project> {
        self.data.toggle_archive(id)
    }

    fn list_tasks(&self) -> TrackerResult<Vec<Task>> {
        Ok(self.data.tasks.clone())
    }

    fn get_task(&self, id: Id) -> TrackerResult<Task> {
        self.data.task(id).cloned()
    }

    fn create_task(&mut self, project_id: Id, draft: NewTask) -> TrackerResult<Task> {
        self.data.create_task(project_id, draft)
    }

    fn update_task(&mut self, task: Task) -> TrackerResult<Task> {
        self.data.update_task(task)
    }

    fn delete_task(&mut self, id: Id) -> TrackerResult<()> {
        self.data.delete_task(id)
    }

    fn set_status(&mut self, id: Id, status: TaskStatus) -> TrackerResult<Task> {
        self.data.set_status(id, status)
    }

    fn list_records(&self) -> TrackerResult<Vec<TimeRecord>> {
        Ok(self.data.records.clone())
    }

    fn get_record(&self, id: Id) -> TrackerResult<TimeRecord> {
        self.data
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or_else(|| TrackerError::not_found("time record", id))
    }

    fn delete_record(&mut self, id: Id) -> TrackerResult<()> {
        self.data.delete_record(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    fn seeded() -> (MemoryStore, Project, Task) {
        let mut store = MemoryStore::new();
        let project = store.create_project(NewProject::new("Work")).unwrap();
        let task = store.create_task(project.id, NewTask::new("Write docs")).unwrap();
        (store, project, task)
    }

    #[test]
    fn test_ids_are_assigned_by_store() {
        let (mut store, project, task) = seeded();
        assert_eq!(project.id, 1);
        assert_eq!(task.id, 2);

        let record = store
            .create_record(NewTimeRecord {
                task_id: task.id,
                minutes_spent: 15,
                date: day(3),
                notes: Some("   ".to_string()),
            })
            .unwrap();
        assert_eq!(record.id, 3);
        assert_eq!(record.notes, None);
        assert_eq!(store.get_record(3).unwrap(), record);
    }

    #[test]
    fn test_create_task_requires_project() {
        let mut store = MemoryStore::new();
        let err = store.create_task(42, NewTask::new("Lost")).unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { kind: "project", id: 42 }));
    }

    #[test]
    fn test_subtask_depth_is_limited_to_one() {
        let (mut store, project, task) = seeded();
        let sub = store
            .create_task(project.id, NewTask::new("Outline").parent(task.id))
            .unwrap();

        let err = store
            .create_task(project.id, NewTask::new("Too deep").parent(sub.id))
            .unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Validation(ValidationError::NestingTooDeep)
        ));
    }

    #[test]
    fn test_subtask_parent_must_share_project() {
        let (mut store, _, task) = seeded();
        let other = store.create_project(NewProject::new("Home")).unwrap();
        let err = store
            .create_task(other.id, NewTask::new("Mixed").parent(task.id))
            .unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Validation(ValidationError::ParentInOtherProject)
        ));
    }

    #[test]
    fn test_task_with_subtasks_cannot_become_subtask() {
        let (mut store, project, task) = seeded();
        let other = store.create_task(project.id, NewTask::new("Other")).unwrap();
        store
            .create_task(project.id, NewTask::new("Child").parent(task.id))
            .unwrap();

        let mut moved = store.get_task(task.id).unwrap();
        moved.parent_id = Some(other.id);
        let err = store.update_task(moved).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Validation(ValidationError::NestingTooDeep)
        ));
    }

    #[test]
    fn test_task_project_is_immutable() {
        let (mut store, _, task) = seeded();
        let other = store.create_project(NewProject::new("Home")).unwrap();

        let mut moved = task.clone();
        moved.project_id = other.id;
        let err = store.update_task(moved).unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Validation(ValidationError::ProjectChanged)
        ));

        let mut renamed = task;
        renamed.name = "Write better docs".to_string();
        assert_eq!(store.update_task(renamed).unwrap().name, "Write better docs");
    }

    #[test]
    fn test_delete_task_cascades_to_subtasks_but_keeps_records() {
        let (mut store, project, task) = seeded();
        store
            .create_task(project.id, NewTask::new("Child").parent(task.id))
            .unwrap();
        store
            .create_record(NewTimeRecord {
                task_id: task.id,
                minutes_spent: 30,
                date: day(1),
                notes: None,
            })
            .unwrap();

        store.delete_task(task.id).unwrap();

        assert!(store.list_tasks().unwrap().is_empty());
        assert_eq!(store.list_records().unwrap().len(), 1);
        assert_eq!(store.list_records_for_task(task.id).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_project_removes_its_tasks() {
        let (mut store, project, _) = seeded();
        let other = store.create_project(NewProject::new("Home")).unwrap();
        store.create_task(other.id, NewTask::new("Dishes")).unwrap();

        store.delete_project(project.id).unwrap();

        let tasks = store.list_tasks().unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].project_id, other.id);
    }

    #[test]
    fn test_toggle_archive_and_set_status() {
        let (mut store, project, task) = seeded();

        let archived = store.toggle_archive(project.id).unwrap();
        assert_eq!(archived.status, ProjectStatus::Archived);
        let active = store.toggle_archive(project.id).unwrap();
        assert_eq!(active.status, ProjectStatus::Active);

        let done = store.set_status(task.id, TaskStatus::Done).unwrap();
        assert_eq!(done.status, TaskStatus::Done);
    }

    #[test]
    fn test_create_record_rejects_invalid_drafts() {
        let (mut store, _, task) = seeded();

        let err = store
            .create_record(NewTimeRecord {
                task_id: task.id,
                minutes_spent: 0,
                date: day(1),
                notes: None,
            })
            .unwrap_err();
        assert!(matches!(
            err,
            TrackerError::Validation(ValidationError::InvalidMinutes)
        ));

        let err = store
            .create_record(NewTimeRecord {
                task_id: 999,
                minutes_spent: 5,
                date: day(1),
                notes: None,
            })
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound { kind: "task", .. }));
    }

    #[test]
    fn test_update_project_validates_color() {
        let (mut store, project, _) = seeded();
        let mut changed = project;
        changed.color = "red".to_string();
        assert!(store.update_project(changed).is_err());
    }
}
