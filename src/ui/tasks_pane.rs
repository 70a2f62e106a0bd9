use crate::app::AppState;
use crate::domain::{priority_badge, tree_connector, Task};
use crate::ui::styles::{
    border_style, default_style, priority_style, project_color, selected_style, title_style,
    tree_style,
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Create a line for a task or subtask
fn create_task_line<'a>(app: &AppState, task: &'a Task, is_last: bool) -> Line<'a> {
    let mut spans = Vec::new();

    if task.parent_id.is_some() {
        spans.push(Span::styled("  ", tree_style()));
        spans.push(Span::styled(tree_connector(is_last), tree_style()));
        spans.push(Span::raw(" "));
    } else {
        let color = app
            .snapshot
            .projects
            .iter()
            .find(|p| p.id == task.project_id)
            .map(|p| project_color(&p.color))
            .unwrap_or(ratatui::style::Color::Gray);
        spans.push(Span::styled("● ", default_style().fg(color)));
    }

    spans.push(Span::styled(task.name.as_str(), default_style()));
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        priority_badge(task.priority),
        priority_style(task.priority),
    ));
    if let Some(deadline) = task.deadline {
        spans.push(Span::styled(format!("  due {}", deadline.format("%m-%d")), tree_style()));
    }

    Line::from(spans)
}

/// Render the selectable task list
pub fn render_tasks_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let items: Vec<ListItem> = app
        .choices
        .iter()
        .enumerate()
        .map(|(idx, task)| {
            let next_is_sibling = app
                .choices
                .get(idx + 1)
                .map_or(false, |next| next.parent_id.is_some() && next.parent_id == task.parent_id);
            ListItem::new(create_task_line(app, task, !next_is_sibling))
        })
        .collect();

    let title = if app.timer.state().is_active() {
        format!(" Tasks ({}) [locked] ", app.choices.len())
    } else {
        format!(" Tasks ({}) ", app.choices.len())
    };

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(Span::styled(title, title_style())),
        )
        .highlight_style(selected_style());

    let mut state = ListState::default();
    if !app.choices.is_empty() {
        state.select(Some(app.selected_index));
    }
    f.render_stateful_widget(list, area, &mut state);
}
