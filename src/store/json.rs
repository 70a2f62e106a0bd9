use super::files::{atomic_write, read_file};
use super::memory::{Dataset, MemoryStore};
use super::{RecordSink, Store};
use crate::domain::{
    valid_time_record, Id, NewProject, NewTask, NewTimeRecord, Project, Task, TaskStatus,
    TimeRecord,
};
use crate::error::{TrackerError, TrackerResult};
use std::path::{Path, PathBuf};

/// Store persisted as a single JSON document.
/// Every mutation is applied to a copy, written atomically, then adopted, so a
/// failed write leaves both the file and the in-memory view untouched.
#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl JsonStore {
    /// Open the store at `path`. A missing or empty file is an empty store.
    pub fn open<P: AsRef<Path>>(path: P) -> TrackerResult<Self> {
        let path = path.as_ref().to_path_buf();
        let content = read_file(&path).map_err(TrackerError::transport)?;
        let inner = if content.trim().is_empty() {
            MemoryStore::new()
        } else {
            let data: Dataset = serde_json::from_str(&content).map_err(|e| {
                TrackerError::transport(format!("corrupt store {}: {}", path.display(), e))
            })?;
            if let Some(bad) = data.records.iter().find(|r| !valid_time_record(r)) {
                return Err(TrackerError::transport(format!(
                    "corrupt store {}: time record {} has no task or no minutes",
                    path.display(),
                    bad.id
                )));
            }
            MemoryStore::from_dataset(data)
        };
        let data = inner.dataset();
        tracing::debug!(
            path = %path.display(),
            projects = data.projects.len(),
            tasks = data.tasks.len(),
            records = data.records.len(),
            "opened store"
        );
        Ok(Self { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, data: &Dataset) -> TrackerResult<()> {
        let json = serde_json::to_string_pretty(data).map_err(TrackerError::transport)?;
        atomic_write(&self.path, &json).map_err(|e| {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to write store");
            TrackerError::transport(format!("{:#}", e))
        })
    }

    fn mutate<T>(
        &mut self,
        f: impl FnOnce(&mut MemoryStore) -> TrackerResult<T>,
    ) -> TrackerResult<T> {
        let mut next = self.inner.clone();
        let out = f(&mut next)?;
        self.persist(next.dataset())?;
        self.inner = next;
        Ok(out)
    }
}

impl RecordSink for JsonStore {
    fn create_record(&mut self, draft: NewTimeRecord) -> TrackerResult<TimeRecord> {
        self.mutate(|store| store.create_record(draft))
    }
}

impl Store for JsonStore {
    fn list_projects(&self) -> TrackerResult<Vec<Project>> {
        self.inner.list_projects()
    }

    fn get_project(&self, id: Id) -> TrackerResult<Project> {
        self.inner.get_project(id)
    }

    fn create_project(&mut self, draft: NewProject) -> TrackerResult<Project> {
        self.mutate(|store| store.create_project(draft))
    }

    fn update_project(&mut self, project: Project) -> TrackerResult<Project> {
        self.mutate(|store| store.update_project(project))
    }

    fn delete_project(&mut self, id: Id) -> TrackerResult<()> {
        self.mutate(|store| store.delete_project(id))
    }

    fn toggle_archive(&mut self, id: Id) -> TrackerResult<Project> {
        self.mutate(|store| store.toggle_archive(id))
    }

    fn list_tasks(&self) -> TrackerResult<Vec<Task>> {
        self.inner.list_tasks()
    }

    fn get_task(&self, id: Id) -> TrackerResult<Task> {
        self.inner.get_task(id)
    }

    fn create_task(&mut self, project_id: Id, draft: NewTask) -> TrackerResult<Task> {
        self.mutate(|store| store.create_task(project_id, draft))
    }

    fn update_task(&mut self, task: Task) -> TrackerResult<Task> {
        self.mutate(|store| store.update_task(task))
    }

    fn delete_task(&mut self, id: Id) -> TrackerResult<()> {
        self.mutate(|store| store.delete_task(id))
    }

    fn set_status(&mut self, id: Id, status: TaskStatus) -> TrackerResult<Task> {
        self.mutate(|store| store.set_status(id, status))
    }

    fn list_records(&self) -> TrackerResult<Vec<TimeRecord>> {
        self.inner.list_records()
    }

    fn get_record(&self, id: Id) -> TrackerResult<TimeRecord> {
        self.inner.get_record(id)
    }

    fn delete_record(&mut self, id: Id) -> TrackerResult<()> {
        self.mutate(|store| store.delete_record(id))
    }
}
