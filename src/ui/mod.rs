pub mod keybindings;
pub mod layout;
pub mod styles;
pub mod summary_pane;
pub mod tasks_pane;
pub mod timer_pane;

use crate::app::AppState;
use keybindings::render_keybindings;
use layout::create_layout;
use ratatui::Frame;
use summary_pane::render_summary_pane;
use tasks_pane::render_tasks_pane;
use timer_pane::render_timer_pane;

/// Main render function - draws the entire UI
pub fn render(f: &mut Frame, app: &AppState) {
    let layout = create_layout(f.size());

    render_keybindings(f, app.ui_mode, layout.keybindings_area);
    render_tasks_pane(f, app, layout.tasks_area);
    render_timer_pane(f, app, layout.timer_area);
    render_summary_pane(f, app, layout.summary_area);
}
