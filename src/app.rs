use crate::analytics::{daily_series, total_for_day, total_last_days, DayTotal};
use crate::config::Config;
use crate::domain::{flatten_tasks, Id, Task, TimeRecord, TimerState, UiMode};
use crate::error::TrackerResult;
use crate::notifications;
use crate::store::{Snapshot, Store};
use crate::timer::WorkTimer;
use chrono::{Local, NaiveDate};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

/// A one-line message shown under the timer
#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub text: String,
    pub is_error: bool,
}

/// State of the interactive timer screen
pub struct AppState {
    pub store: Box<dyn Store>,
    pub timer: WorkTimer,
    pub snapshot: Snapshot,
    pub config: Config,
    /// Tasks that can be timed (not done), in tree order
    pub choices: Vec<Task>,
    pub selected_index: usize,
    pub ui_mode: UiMode,
    pub status: Option<StatusLine>,
    pub today: NaiveDate,
    saved: Rc<RefCell<Vec<TimeRecord>>>,
}

impl AppState {
    pub fn new(store: Box<dyn Store>, config: Config, preselect: Option<Id>) -> TrackerResult<Self> {
        let saved: Rc<RefCell<Vec<TimeRecord>>> = Rc::default();
        let mut timer = WorkTimer::new();
        let queue = Rc::clone(&saved);
        timer.on_record_saved(move |record| queue.borrow_mut().push(record.clone()));

        let mut app = Self {
            store,
            timer,
            snapshot: Snapshot::default(),
            config,
            choices: Vec::new(),
            selected_index: 0,
            ui_mode: UiMode::Normal,
            status: None,
            today: Local::now().date_naive(),
            saved,
        };
        app.reload()?;

        if let Some(task_id) = preselect {
            match app.choices.iter().position(|t| t.id == task_id) {
                Some(index) => app.selected_index = index,
                None => app.set_error(format!("task {} is not open for tracking", task_id)),
            }
        }
        app.sync_selection();
        Ok(app)
    }

    /// Re-fetch everything from the store
    pub fn reload(&mut self) -> TrackerResult<()> {
        self.snapshot = Snapshot::fetch(self.store.as_ref())?;
        self.today = Local::now().date_naive();

        let selected_id = self.selected_task_id();
        self.choices = flatten_tasks(&self.snapshot.tasks)
            .into_iter()
            .filter(|row| !row.task.is_done())
            .map(|row| row.task.clone())
            .collect();
        if let Some(index) = selected_id.and_then(|id| self.choices.iter().position(|t| t.id == id)) {
            self.selected_index = index;
        }
        if self.selected_index >= self.choices.len() {
            self.selected_index = self.choices.len().saturating_sub(1);
        }
        Ok(())
    }

    pub fn selected_task_id(&self) -> Option<Id> {
        self.choices.get(self.selected_index).map(|t| t.id)
    }

    /// "Project - Task" for a task id
    pub fn task_label(&self, task_id: Id) -> String {
        let Some(task) = self.snapshot.tasks.iter().find(|t| t.id == task_id) else {
            return format!("task {}", task_id);
        };
        match self.snapshot.projects.iter().find(|p| p.id == task.project_id) {
            Some(project) => format!("{} - {}", project.name, task.name),
            None => task.name.clone(),
        }
    }

    pub fn today_minutes(&self) -> u64 {
        total_for_day(&self.snapshot.records, self.today)
    }

    pub fn window_minutes(&self) -> u64 {
        total_last_days(&self.snapshot.records, self.today, self.config.summary_days)
    }

    pub fn daily(&self) -> Vec<DayTotal> {
        daily_series(&self.snapshot.records, self.config.summary_days, self.today)
    }

    pub fn move_selection_up(&mut self) {
        if self.guard_locked() && self.selected_index > 0 {
            self.selected_index -= 1;
            self.sync_selection();
        }
    }

    pub fn move_selection_down(&mut self) {
        if self.guard_locked() && self.selected_index + 1 < self.choices.len() {
            self.selected_index += 1;
            self.sync_selection();
        }
    }

    /// Start, resume or pause depending on the timer state
    pub fn toggle_run_pause(&mut self) {
        match self.timer.state() {
            TimerState::Running => self.timer.pause(),
            TimerState::Idle | TimerState::Paused => {
                if let Err(e) = self.timer.start(Instant::now()) {
                    self.set_error(e.to_string());
                } else {
                    self.status = None;
                }
            }
        }
    }

    pub fn stop(&mut self) {
        self.timer.stop();
        self.status = None;
    }

    /// Start timing the selected task right away, with optional notes
    pub fn start_selected(&mut self, notes: Option<String>) {
        if let Some(notes) = notes {
            self.timer.set_notes(notes);
        }
        let Some(task_id) = self.selected_task_id() else {
            self.set_error("no task selected".to_string());
            return;
        };
        if let Err(e) = self.timer.start_task(task_id, Instant::now()) {
            self.set_error(e.to_string());
        }
    }

    /// Save the session. Failures keep the session and show the error.
    pub fn commit(&mut self) {
        self.timer.tick();
        match self.timer.commit(self.store.as_mut(), None) {
            Ok(_) => {
                let text = self.timer.message().unwrap_or("saved").to_string();
                self.set_info(format!("✓ {}", text));
            }
            Err(e) if e.is_transient() => {
                self.set_error(format!("{} (session kept, s to retry)", e));
            }
            Err(e) => self.set_error(e.to_string()),
        }
    }

    /// Advance the timer and handle any records saved since the last call
    pub fn tick(&mut self) {
        self.timer.tick();
        self.process_saved();
    }

    /// Notes can be edited unless the timer is running
    pub fn begin_notes(&mut self) {
        if self.timer.state() == TimerState::Running {
            self.set_error("pause the timer to edit notes".to_string());
        } else {
            self.ui_mode = UiMode::EditingNotes;
        }
    }

    fn process_saved(&mut self) {
        let saved: Vec<TimeRecord> = self.saved.borrow_mut().drain(..).collect();
        if saved.is_empty() {
            return;
        }

        if self.config.notify_on_save {
            for record in &saved {
                notifications::notify_record_saved(&self.task_label(record.task_id), record.minutes_spent);
            }
        }
        if let Err(e) = self.reload() {
            tracing::warn!(error = %e, "failed to refresh after save");
            self.set_error(e.to_string());
        }
    }

    /// Selection moves only while idle; the timer's task is locked otherwise
    fn guard_locked(&mut self) -> bool {
        if self.timer.state().is_active() {
            self.set_error("task is locked while the timer is active".to_string());
            false
        } else {
            true
        }
    }

    fn sync_selection(&mut self) {
        let task_id = self.selected_task_id();
        if let Err(e) = self.timer.select_task(task_id) {
            self.set_error(e.to_string());
        }
    }

    fn set_info(&mut self, text: String) {
        self.status = Some(StatusLine { text, is_error: false });
    }

    fn set_error(&mut self, text: String) {
        self.status = Some(StatusLine { text, is_error: true });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{NewProject, NewTask, TaskStatus};
    use crate::store::memory::MemoryStore;
    use std::time::Duration;

    fn app_with_tasks() -> AppState {
        let mut store = MemoryStore::new();
        let project = store.create_project(NewProject::new("Work")).unwrap();
        let first = store.create_task(project.id, NewTask::new("Code")).unwrap();
        store
            .create_task(project.id, NewTask::new("Tests").parent(first.id))
            .unwrap();
        store
            .create_task(project.id, NewTask::new("Shipped").status(TaskStatus::Done))
            .unwrap();
        let config = Config {
            notify_on_save: false,
            ..Config::default()
        };
        AppState::new(Box::new(store), config, None).unwrap()
    }

    #[test]
    fn test_choices_exclude_done_tasks() {
        let app = app_with_tasks();
        let names: Vec<&str> = app.choices.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Code", "Tests"]);
        assert_eq!(app.timer.selected_task(), Some(app.choices[0].id));
        assert_eq!(app.task_label(app.choices[1].id), "Work - Tests");
    }

    #[test]
    fn test_selection_locked_while_running() {
        let mut app = app_with_tasks();
        app.toggle_run_pause();
        assert_eq!(app.timer.state(), TimerState::Running);

        app.move_selection_down();
        assert_eq!(app.selected_index, 0);
        assert!(app.status.as_ref().unwrap().is_error);

        app.stop();
        app.move_selection_down();
        assert_eq!(app.selected_index, 1);
        assert_eq!(app.timer.selected_task(), Some(app.choices[1].id));
    }

    #[test]
    fn test_commit_short_session_shows_error() {
        let mut app = app_with_tasks();
        app.toggle_run_pause();
        app.commit();

        let status = app.status.clone().unwrap();
        assert!(status.is_error);
        assert_eq!(status.text, "minimum one minute");
        assert_eq!(app.timer.state(), TimerState::Running);
    }

    #[test]
    fn test_saved_record_triggers_reload() {
        let mut app = app_with_tasks();
        let t0 = Instant::now();
        app.timer.start(t0).unwrap();
        app.timer.advance(t0 + Duration::from_secs(61));
        let day = app.today;
        app.timer.commit_on(app.store.as_mut(), None, day).unwrap();
        assert!(app.snapshot.records.is_empty());

        app.tick();
        assert_eq!(app.snapshot.records.len(), 1);
        assert_eq!(app.today_minutes(), 1);
    }

    #[test]
    fn test_start_selected_with_notes() {
        let mut app = app_with_tasks();
        app.move_selection_down();
        app.start_selected(Some("pairing".to_string()));

        assert_eq!(app.timer.state(), TimerState::Running);
        assert_eq!(app.timer.selected_task(), Some(app.choices[1].id));
        assert_eq!(app.timer.notes(), "pairing");
    }

    #[test]
    fn test_commit_shows_saved_message() {
        let mut app = app_with_tasks();
        let t0 = Instant::now();
        app.timer.start(t0).unwrap();
        app.timer.advance(t0 + Duration::from_secs(125));
        assert!(app.timer.can_commit());

        app.commit();
        let status = app.status.clone().unwrap();
        assert!(!status.is_error);
        assert_eq!(status.text, "✓ 2 minutes saved");
        assert_eq!(app.timer.state(), TimerState::Idle);
    }

    #[test]
    fn test_preselect_unknown_task() {
        let store = MemoryStore::new();
        let app = AppState::new(Box::new(store), Config::default(), Some(42)).unwrap();
        assert!(app.status.unwrap().is_error);
        assert_eq!(app.timer.selected_task(), None);
    }
}
