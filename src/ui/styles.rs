use crate::domain::{Priority, TimerState};
use ratatui::style::{Color, Modifier, Style};

/// Default text style
pub fn default_style() -> Style {
    Style::default().fg(Color::White)
}

/// Selected row highlight style
pub fn selected_style() -> Style {
    Style::default()
        .fg(Color::Black)
        .bg(Color::LightCyan)
        .add_modifier(Modifier::BOLD)
}

/// Clock style for each timer state
pub fn timer_style(state: TimerState) -> Style {
    match state {
        TimerState::Running => Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD),
        TimerState::Paused => Style::default().fg(Color::Yellow),
        TimerState::Idle => Style::default().fg(Color::Gray),
    }
}

pub fn priority_style(priority: Priority) -> Style {
    match priority {
        Priority::High => Style::default().fg(Color::Red),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::Low => Style::default().fg(Color::Blue),
    }
}

/// Tree connector style (for subtasks)
pub fn tree_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Title style for panes
pub fn title_style() -> Style {
    Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD)
}

/// Border style
pub fn border_style() -> Style {
    Style::default().fg(Color::Gray)
}

/// Keybinding hint style
pub fn hint_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

/// Chart bar style
pub fn bar_style() -> Style {
    Style::default().fg(Color::Blue)
}

/// Error message style
pub fn error_style() -> Style {
    Style::default()
        .fg(Color::Red)
        .add_modifier(Modifier::BOLD)
}

/// Success message style
pub fn success_style() -> Style {
    Style::default().fg(Color::Green)
}

/// Parse a project's "#rrggbb" / "#rgb" color, gray when malformed
pub fn project_color(hex: &str) -> Color {
    let digits = hex.trim_start_matches('#');
    let expanded: String = match digits.len() {
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        _ => digits.to_string(),
    };
    if expanded.len() != 6 || !expanded.is_ascii() {
        return Color::Gray;
    }
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    match (channel(0), channel(2), channel(4)) {
        (Some(r), Some(g), Some(b)) => Color::Rgb(r, g, b),
        _ => Color::Gray,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_color() {
        assert_eq!(project_color("#0d6efd"), Color::Rgb(0x0d, 0x6e, 0xfd));
        assert_eq!(project_color("#fff"), Color::Rgb(255, 255, 255));
        assert_eq!(project_color("nope"), Color::Gray);
        assert_eq!(project_color("#zzzzzz"), Color::Gray);
    }
}
