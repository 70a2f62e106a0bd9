use crate::domain::{Id, Priority, Project, Task, TaskStatus};

/// Categorical task filters; `None` means "any"
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    pub project_id: Option<Id>,
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    /// Hide subtasks from the task results
    pub top_level_only: bool,
}

impl SearchFilters {
    pub fn is_empty(&self) -> bool {
        self.project_id.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && !self.top_level_only
    }

    fn accepts(&self, task: &Task) -> bool {
        self.project_id.map_or(true, |id| task.project_id == id)
            && self.status.map_or(true, |status| task.status == status)
            && self.priority.map_or(true, |priority| task.priority == priority)
            && (!self.top_level_only || task.is_top_level())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResults<'a> {
    pub projects: Vec<&'a Project>,
    pub tasks: Vec<&'a Task>,
}

impl SearchResults<'_> {
    pub fn total(&self) -> usize {
        self.projects.len() + self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Case-insensitive substring match on name or description. The query is
/// used as given, whitespace included.
/// Projects match on text only; tasks must also pass every set filter.
pub fn search<'a>(
    projects: &'a [Project],
    tasks: &'a [Task],
    query: &str,
    filters: &SearchFilters,
) -> SearchResults<'a> {
    let needle = query.to_lowercase();

    SearchResults {
        projects: projects
            .iter()
            .filter(|p| text_matches(&needle, &p.name, &p.description))
            .collect(),
        tasks: tasks
            .iter()
            .filter(|t| text_matches(&needle, &t.name, &t.description) && filters.accepts(t))
            .collect(),
    }
}

fn text_matches(needle: &str, name: &str, description: &str) -> bool {
    needle.is_empty()
        || name.to_lowercase().contains(needle)
        || description.to_lowercase().contains(needle)
}
