use crate::analytics::{format_duration, project_breakdown};
use crate::app::AppState;
use crate::ui::styles::{bar_style, border_style, default_style, project_color, title_style};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{BarChart, Block, Borders, Paragraph},
    Frame,
};

/// Render totals, the daily chart and the per-project split
pub fn render_summary_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style())
        .title(Span::styled(" Summary ", title_style()));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let shares = project_breakdown(
        &app.snapshot.records,
        &app.snapshot.tasks,
        &app.snapshot.projects,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(shares.len().min(6) as u16),
        ])
        .split(inner);

    let totals = Line::from(vec![
        Span::styled("Today ", title_style()),
        Span::styled(format_duration(app.today_minutes()), default_style()),
        Span::raw("   "),
        Span::styled(format!("Last {} days ", app.config.summary_days), title_style()),
        Span::styled(format_duration(app.window_minutes()), default_style()),
    ]);
    f.render_widget(Paragraph::new(totals), chunks[0]);

    let daily = app.daily();
    let labels: Vec<String> = daily.iter().map(|d| d.day.format("%d").to_string()).collect();
    let data: Vec<(&str, u64)> = labels
        .iter()
        .zip(&daily)
        .map(|(label, day)| (label.as_str(), day.minutes))
        .collect();
    let chart = BarChart::default()
        .data(data.as_slice())
        .bar_width(3)
        .bar_gap(1)
        .bar_style(bar_style());
    f.render_widget(chart, chunks[1]);

    let project_lines: Vec<Line> = shares
        .iter()
        .take(6)
        .map(|share| {
            Line::from(vec![
                Span::styled("■ ", default_style().fg(project_color(&share.project.color))),
                Span::styled(share.project.name.as_str(), default_style()),
                Span::raw(format!(
                    "  {} ({:.0}%)",
                    format_duration(share.minutes),
                    share.percent
                )),
            ])
        })
        .collect();
    f.render_widget(Paragraph::new(project_lines), chunks[2]);
}
