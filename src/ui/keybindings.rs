use crate::domain::UiMode;
use crate::ui::styles::hint_style;
use ratatui::{layout::Rect, text::{Line, Span}, widgets::Paragraph, Frame};

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, mode: UiMode, area: Rect) {
    let hints = match mode {
        UiMode::Normal => Line::from(vec![
            Span::raw(" ↑/↓ task   "),
            Span::raw("Space start/pause   "),
            Span::raw("x stop   "),
            Span::raw("s save   "),
            Span::raw("n notes   "),
            Span::raw("r refresh   "),
            Span::raw("q quit"),
        ]),
        UiMode::EditingNotes => Line::from(vec![
            Span::raw(" type notes   "),
            Span::raw("Enter/Esc done"),
        ]),
    };

    let paragraph = Paragraph::new(hints).style(hint_style());
    f.render_widget(paragraph, area);
}
