pub mod enums;
pub mod model;
pub mod views;

pub use enums::{Priority, ProjectStatus, TaskStatus, TimerState, UiMode};
pub use model::{
    is_overdue, valid_time_record, validate_color, Id, NewProject, NewTask, NewTimeRecord, Project,
    ProjectPatch, Task, TaskPatch, TimeRecord,
};
pub use views::{flatten_tasks, priority_badge, status_badge, tree_connector};
