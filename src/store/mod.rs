//! CRUD interface over projects, tasks and time records.
//!
//! The engines only ever read snapshots out of a [`Store`]; the work timer
//! only ever writes through a [`RecordSink`].

pub mod files;
pub mod json;
pub mod memory;

use crate::domain::{Id, NewProject, NewTask, NewTimeRecord, Project, Task, TaskStatus, TimeRecord};
use crate::error::TrackerResult;

pub use json::JsonStore;

/// Accepts new time records. The only capability the work timer needs.
pub trait RecordSink {
    fn create_record(&mut self, draft: NewTimeRecord) -> TrackerResult<TimeRecord>;
}

/// Full store interface. Ids are assigned here, never by callers.
pub trait Store: RecordSink {
    fn list_projects(&self) -> TrackerResult<Vec<Project>>;
    fn get_project(&self, id: Id) -> TrackerResult<Project>;
    fn create_project(&mut self, draft: NewProject) -> TrackerResult<Project>;
    fn update_project(&mut self, project: Project) -> TrackerResult<Project>;
    /// Removes the project and its tasks. Time records are kept.
    fn delete_project(&mut self, id: Id) -> TrackerResult<()>;
    fn toggle_archive(&mut self, id: Id) -> TrackerResult<Project>;

    fn list_tasks(&self) -> TrackerResult<Vec<Task>>;
    fn get_task(&self, id: Id) -> TrackerResult<Task>;
    fn create_task(&mut self, project_id: Id, draft: NewTask) -> TrackerResult<Task>;
    fn update_task(&mut self, task: Task) -> TrackerResult<Task>;
    /// Removes the task and its subtasks. Time records are kept.
    fn delete_task(&mut self, id: Id) -> TrackerResult<()>;
    fn set_status(&mut self, id: Id, status: TaskStatus) -> TrackerResult<Task>;

    fn list_records(&self) -> TrackerResult<Vec<TimeRecord>>;
    fn get_record(&self, id: Id) -> TrackerResult<TimeRecord>;
    fn delete_record(&mut self, id: Id) -> TrackerResult<()>;

    fn list_records_for_task(&self, task_id: Id) -> TrackerResult<Vec<TimeRecord>> {
        Ok(self
            .list_records()?
            .into_iter()
            .filter(|r| r.task_id == task_id)
            .collect())
    }
}

/// Everything the read-only engines work on, fetched in one go
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub records: Vec<TimeRecord>,
}

impl Snapshot {
    pub fn fetch<S: Store + ?Sized>(store: &S) -> TrackerResult<Self> {
        Ok(Self {
            projects: store.list_projects()?,
            tasks: store.list_tasks()?,
            records: store.list_records()?,
        })
    }
}
