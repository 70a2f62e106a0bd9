use crate::analytics::format_clock;
use crate::app::AppState;
use crate::domain::{TimerState, UiMode};
use crate::ui::styles::{
    border_style, default_style, error_style, hint_style, success_style, timer_style, title_style,
};
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Render the work timer
pub fn render_timer_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let timer = &app.timer;
    let state = timer.state();
    let mut lines = Vec::new();

    let task = match timer.selected_task() {
        Some(task_id) => app.task_label(task_id),
        None => "Select a task".to_string(),
    };
    lines.push(Line::from(Span::styled(task, default_style())));
    lines.push(Line::raw(""));

    lines.push(Line::from(Span::styled(
        format_clock(timer.elapsed_seconds()),
        timer_style(state).add_modifier(Modifier::BOLD),
    )));
    let save_hint = if timer.can_commit() {
        "s to save"
    } else if state.is_active() {
        "saving needs one minute"
    } else {
        "Space to start"
    };
    lines.push(Line::from(Span::styled(
        format!("{} minutes · {}", timer.elapsed_minutes(), save_hint),
        hint_style(),
    )));

    let notes_line = if app.ui_mode == UiMode::EditingNotes {
        format!("Notes: {}▏", timer.notes())
    } else if timer.notes().is_empty() {
        "Notes: (n to add)".to_string()
    } else {
        format!("Notes: {}", timer.notes())
    };
    lines.push(Line::from(Span::styled(notes_line, hint_style())));

    if let Some(status) = &app.status {
        let style = if status.is_error { error_style() } else { success_style() };
        lines.push(Line::from(Span::styled(status.text.as_str(), style)));
    }

    let badge = match state {
        TimerState::Running => " ⏱ Work Timer - RUNNING ",
        TimerState::Paused => " ⏸ Work Timer - PAUSED ",
        TimerState::Idle => " Work Timer ",
    };

    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style())
                .title(Span::styled(badge, title_style())),
        );
    f.render_widget(paragraph, area);
}
