use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tui_big_text::{BigText, PixelSize};

use super::card::{MovieCard, card_grid};

/// Renders the main content area showing the card grid or empty state
pub fn render_main_content(frame: &mut Frame, app: &mut App, area: Rect) {
    app.card_areas.clear();

    if let Some(error) = &app.movies_error {
        let error_text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "Failed to load movies",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red))),
            Line::from(""),
            Line::from(Span::styled(
                "Press (g) to try again",
                Style::default().fg(Color::Gray),
            )),
        ];
        let error_paragraph = Paragraph::new(error_text)
            .block(Block::default().title("Error").borders(Borders::ALL))
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });
        frame.render_widget(error_paragraph, area);
        return;
    }

    if app.movies.is_empty() {
        let empty_block = Block::default()
            .title("No movies loaded - press 'g' to load")
            .borders(Borders::ALL)
            .style(Style::default());

        frame.render_widget(empty_block, area);
        return;
    }

    let outer_block = Block::default()
        .title(format!("Movies ({})", app.movies.len()))
        .borders(Borders::ALL);
    let inner = outer_block.inner(area);
    frame.render_widget(outer_block, area);

    let (columns, cards) = card_grid(inner, app.movies.len(), app.selected_movie_index);
    app.grid_columns = columns;

    for (index, card_area) in &cards {
        let card = MovieCard::new(&app.movies[*index])
            .selected(*index == app.selected_movie_index);
        frame.render_widget(card, *card_area);
    }

    app.card_areas = cards;
}

/// Renders missing API key error with big text
pub fn render_missing_api_key(frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(8),  // Big text
            Constraint::Min(5),     // Instructions
        ])
        .split(area);

    let big_text = BigText::builder()
        .pixel_size(PixelSize::Quadrant)
        .style(Style::default().fg(Color::Red).add_modifier(Modifier::BOLD))
        .lines(vec!["API KEY".into(), "REQUIRED!".into()])
        .alignment(Alignment::Center)
        .build();

    frame.render_widget(big_text, chunks[0]);

    let instructions = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Please set your TMDB API key to browse movies",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "1. Get a free key at: https://www.themoviedb.org/settings/api",
            Style::default().fg(Color::White),
        )),
        Line::from(Span::styled(
            "2. Set it in the environment or a .env file: TMDB_API_KEY=your_key_here",
            Style::default().fg(Color::White),
        )),
        Line::from(Span::styled(
            "3. Restart the application",
            Style::default().fg(Color::White),
        )),
    ];

    let instructions_paragraph = Paragraph::new(instructions)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    frame.render_widget(instructions_paragraph, chunks[1]);
}
