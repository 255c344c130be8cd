use crate::app::App;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders},
    Frame,
};
use throbber_widgets_tui::{BRAILLE_SIX, Throbber, WhichUse};

/// Spinner line with `label`, advanced by the app tick.
pub fn throbber(label: &str) -> Throbber<'_> {
    Throbber::default()
        .label(label)
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .throbber_style(Style::default().fg(Color::Cyan))
        .throbber_set(BRAILLE_SIX)
        .use_type(WhichUse::Spin)
}

/// Renders the loading screen shown while the movie list is fetched
pub fn render_loading(frame: &mut Frame, app: &mut App, area: Rect) {
    let loading_block = Block::default()
        .title("Loading Movies")
        .borders(Borders::ALL)
        .style(Style::default());

    let inner = loading_block.inner(area);
    frame.render_widget(loading_block, area);

    let line = Rect::new(inner.x + 1, inner.y + 1, inner.width.saturating_sub(2), 1)
        .intersection(inner);
    frame.render_stateful_widget(
        throbber("Loading popular movies from TMDB..."),
        line,
        &mut app.throbber,
    );
}
