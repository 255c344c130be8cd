use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Renders the header/title block at the top of the screen
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let title_block = Block::default()
        .borders(Borders::ALL)
        .style(Style::default());

    let mut spans = vec![Span::styled(
        "Popular Movies",
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(updated) = app.last_updated {
        spans.push(Span::styled(
            format!("  (updated {})", updated.format("%H:%M")),
            Style::default().fg(Color::Gray),
        ));
    }

    let title = Paragraph::new(Line::from(spans)).block(title_block);

    frame.render_widget(title, area);
}
