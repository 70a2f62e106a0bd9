use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Main layout structure
pub struct MainLayout {
    pub keybindings_area: Rect,
    pub tasks_area: Rect,
    pub timer_area: Rect,
    pub summary_area: Rect,
}

/// Create the main layout
/// - Top bar: keybindings (1 row)
/// - Main area: Tasks (40%) | Timer above Summary (60%)
pub fn create_layout(area: Rect) -> MainLayout {
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Keybindings bar
            Constraint::Min(0),    // Main content
        ])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(main_chunks[1]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(10), // Timer pane
            Constraint::Min(0),     // Summary pane
        ])
        .split(columns[1]);

    MainLayout {
        keybindings_area: main_chunks[0],
        tasks_area: columns[0],
        timer_area: right[0],
        summary_area: right[1],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_splits_columns() {
        let layout = create_layout(Rect::new(0, 0, 100, 40));
        assert_eq!(layout.keybindings_area.height, 1);
        assert_eq!(layout.tasks_area.width, 40);
        assert_eq!(layout.timer_area.height, 10);
        assert_eq!(layout.summary_area.height, 29);
    }
}
