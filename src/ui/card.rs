use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

use crate::app::tmdb::MovieSummary;
use crate::config::Config;

pub const CARD_WIDTH: u16 = 34;
pub const CARD_HEIGHT: u16 = 4;

/// A single movie tile in the grid. Stateless; selection is decided by the
/// app and clicks are hit-tested against the area the card was drawn in.
pub struct MovieCard<'a> {
    movie: &'a MovieSummary,
    selected: bool,
}

impl<'a> MovieCard<'a> {
    pub fn new(movie: &'a MovieSummary) -> Self {
        Self {
            movie,
            selected: false,
        }
    }

    pub fn selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }
}

pub fn poster_url(config: &Config, movie: &MovieSummary) -> Option<String> {
    movie.poster_path.as_deref().map(|path| config.image_url(path))
}

/// One decimal place, halves rounded away from zero.
pub fn one_decimal(value: f64) -> String {
    format!("{:.1}", (value * 10.0).round() / 10.0)
}

pub fn rating_label(vote_average: f64) -> String {
    format!("{} / 10", one_decimal(vote_average))
}

/// Rating, language and release date separated by bullets.
pub fn meta_spans(movie: &MovieSummary) -> Vec<Span<'_>> {
    let bullet = || Span::styled(" • ", Style::default().fg(Color::DarkGray));
    vec![
        Span::styled("★ ", Style::default().fg(Color::Yellow)),
        Span::styled(rating_label(movie.vote_average), Style::default().fg(Color::White)),
        bullet(),
        Span::styled(movie.original_language.as_str(), Style::default().fg(Color::Gray)),
        bullet(),
        Span::styled(movie.release_date.as_str(), Style::default().fg(Color::Gray)),
    ]
}

impl Widget for MovieCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style);

        let title_style = if self.selected {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
        };

        let lines = vec![
            Line::from(Span::styled(self.movie.title.as_str(), title_style)),
            Line::from(meta_spans(self.movie)),
        ];

        Paragraph::new(lines).block(block).render(area, buf);
    }
}

/// Lays out `count` cards in rows that fill `area`, scrolled so `selected`
/// stays visible. Returns the column count and the area of each drawn card.
pub fn card_grid(area: Rect, count: usize, selected: usize) -> (usize, Vec<(usize, Rect)>) {
    let columns = usize::from((area.width / CARD_WIDTH).max(1));
    let visible_rows = usize::from((area.height / CARD_HEIGHT).max(1));
    let card_width = area.width / columns as u16;

    let selected_row = selected / columns;
    let first_row = selected_row.saturating_sub(visible_rows - 1);

    let mut cards = Vec::new();
    for row in 0..visible_rows {
        for column in 0..columns {
            let index = (first_row + row) * columns + column;
            if index >= count {
                return (columns, cards);
            }
            let y = area.y + row as u16 * CARD_HEIGHT;
            if y + CARD_HEIGHT > area.bottom() {
                return (columns, cards);
            }
            let rect = Rect::new(
                area.x + column as u16 * card_width,
                y,
                card_width,
                CARD_HEIGHT,
            );
            cards.push((index, rect));
        }
    }

    (columns, cards)
}
