use crate::domain::{Id, NewTimeRecord, TimeRecord, TimerState};
use crate::error::{TrackerResult, ValidationError};
use crate::store::RecordSink;
use crate::ticker::Ticker;
use chrono::{Local, NaiveDate};
use std::time::Instant;

/// Seconds needed before a session can be saved
pub const MIN_COMMIT_SECONDS: u64 = 60;

type RecordListener = Box<dyn FnMut(&TimeRecord)>;

/// Stopwatch that turns a work session on one task into a time record.
///
/// Transitions:
/// - `Idle -> Running` on start (a task must be selected)
/// - `Running -> Paused` on pause
/// - `Paused -> Running` on start, same task
/// - `Running|Paused -> Idle` on stop (elapsed reset) or successful commit
pub struct WorkTimer {
    state: TimerState,
    elapsed_seconds: u64,
    selected_task: Option<Id>,
    notes: String,
    message: Option<String>,
    ticker: Ticker,
    listeners: Vec<RecordListener>,
}

impl Default for WorkTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkTimer {
    pub fn new() -> Self {
        Self {
            state: TimerState::Idle,
            elapsed_seconds: 0,
            selected_task: None,
            notes: String::new(),
            message: None,
            ticker: Ticker::new(),
            listeners: Vec::new(),
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Whole minutes a commit would record right now
    pub fn elapsed_minutes(&self) -> u64 {
        self.elapsed_seconds / 60
    }

    pub fn selected_task(&self) -> Option<Id> {
        self.selected_task
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Last save confirmation, cleared by stop
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn can_commit(&self) -> bool {
        self.selected_task.is_some() && self.elapsed_seconds >= MIN_COMMIT_SECONDS
    }

    /// Subscribe to "record saved" notifications
    pub fn on_record_saved(&mut self, listener: impl FnMut(&TimeRecord) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Choose the task to track. Locked while a session is in progress.
    pub fn select_task(&mut self, task_id: Option<Id>) -> Result<(), ValidationError> {
        if self.state.is_active() {
            return Err(ValidationError::TaskLocked);
        }
        self.selected_task = task_id.filter(|id| *id != 0);
        Ok(())
    }

    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    pub fn notes_mut(&mut self) -> &mut String {
        &mut self.notes
    }

    /// Start a fresh session or resume a paused one
    pub fn start(&mut self, now: Instant) -> Result<(), ValidationError> {
        match self.state {
            TimerState::Running => Ok(()),
            TimerState::Paused => {
                self.enter_running(now);
                Ok(())
            }
            TimerState::Idle => {
                if self.selected_task.is_none() {
                    return Err(ValidationError::NoTaskSelected);
                }
                self.message = None;
                self.enter_running(now);
                Ok(())
            }
        }
    }

    /// Select `task_id` and start in one step
    pub fn start_task(&mut self, task_id: Id, now: Instant) -> Result<(), ValidationError> {
        if self.state.is_active() && self.selected_task != Some(task_id) {
            return Err(ValidationError::TaskLocked);
        }
        if self.state == TimerState::Idle {
            self.select_task(Some(task_id))?;
        }
        self.start(now)
    }

    pub fn pause(&mut self) {
        if self.state == TimerState::Running {
            self.leave_running();
            self.state = TimerState::Paused;
            tracing::debug!(elapsed = self.elapsed_seconds, "timer paused");
        }
    }

    /// Abandon the session: back to idle with elapsed time discarded
    pub fn stop(&mut self) {
        if self.state.is_active() {
            self.leave_running();
            tracing::debug!(discarded = self.elapsed_seconds, "timer stopped");
            self.state = TimerState::Idle;
            self.elapsed_seconds = 0;
            self.message = None;
        }
    }

    /// Count ticks due by `now`. Only a running timer accumulates.
    pub fn advance(&mut self, now: Instant) {
        if self.state == TimerState::Running {
            self.elapsed_seconds += self.ticker.fire_due(now);
        }
    }

    /// Advance to the current instant
    pub fn tick(&mut self) {
        self.advance(Instant::now());
    }

    /// Save the session as a record dated today (local calendar)
    pub fn commit<S: RecordSink + ?Sized>(
        &mut self,
        sink: &mut S,
        notes: Option<&str>,
    ) -> TrackerResult<TimeRecord> {
        self.commit_on(sink, notes, Local::now().date_naive())
    }

    /// Save the session as a record dated `day`.
    ///
    /// Whole minutes only; leftover seconds are dropped. On failure nothing
    /// changes, so the session can be retried.
    pub fn commit_on<S: RecordSink + ?Sized>(
        &mut self,
        sink: &mut S,
        notes: Option<&str>,
        day: NaiveDate,
    ) -> TrackerResult<TimeRecord> {
        let task_id = self.selected_task.ok_or(ValidationError::NoTaskSelected)?;
        if self.elapsed_seconds < MIN_COMMIT_SECONDS {
            return Err(ValidationError::BelowMinimum.into());
        }

        let minutes = self.elapsed_seconds / 60;
        let notes = notes
            .unwrap_or(self.notes.as_str())
            .trim()
            .to_string();
        let draft = NewTimeRecord {
            task_id,
            minutes_spent: u32::try_from(minutes).unwrap_or(u32::MAX),
            date: day,
            notes: if notes.is_empty() { None } else { Some(notes) },
        };

        let record = match sink.create_record(draft) {
            Ok(record) => record,
            Err(err) => {
                tracing::warn!(error = %err, elapsed = self.elapsed_seconds, "failed to save session");
                return Err(err);
            }
        };

        self.leave_running();
        self.state = TimerState::Idle;
        self.elapsed_seconds = 0;
        self.notes.clear();
        self.message = Some(format!("{} minutes saved", record.minutes_spent));
        tracing::info!(task_id, minutes = record.minutes_spent, "saved work session");

        for listener in &mut self.listeners {
            listener(&record);
        }
        Ok(record)
    }

    fn enter_running(&mut self, now: Instant) {
        self.state = TimerState::Running;
        self.ticker.arm(now);
    }

    fn leave_running(&mut self) {
        self.ticker.cancel();
    }

    #[cfg(test)]
    fn has_pending_tick(&self) -> bool {
        self.ticker.is_armed()
    }
}
