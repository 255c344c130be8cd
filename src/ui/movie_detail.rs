use crate::app::App;
use crate::app::detail::{DetailPhase, DetailState, NO_OVERVIEW_TEXT};
use crate::app::tmdb::CastMember;
use crate::config::Config;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
};
use ratatui_image::{StatefulImage, Resize, protocol::StatefulProtocol};
use throbber_widgets_tui::ThrobberState;

use super::card::{one_decimal, poster_url, rating_label};
use super::loading::throbber;

const CAST_COLUMNS: usize = 4;
const CLOSE_LABEL: &str = "(x) close";

/// Renders the movie detail overlay
pub fn render_movie_detail(frame: &mut Frame, app: &mut App, area: Rect) {
    let App {
        config,
        detail,
        poster_protocol,
        loading_poster,
        poster_area,
        trailer_close_area,
        throbber,
        ..
    } = app;

    let Some(detail) = &*detail else {
        render_empty_state(frame, area);
        return;
    };

    let outer_block = Block::default()
        .title(format!("Movie Details - {}", detail.movie.title))
        .borders(Borders::ALL)
        .style(Style::default());

    let inner_area = outer_block.inner(area);
    frame.render_widget(outer_block, area);

    let trailer_height = if detail.is_playing { 5 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(16),             // Poster and info
            Constraint::Length(trailer_height), // Trailer panel
            Constraint::Min(4),                 // Cast
            Constraint::Length(1),              // Footer
        ])
        .split(inner_area);

    let top = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(chunks[0]);

    render_poster_section(frame, top[0], config, detail, poster_protocol, *loading_poster, throbber);
    *poster_area = Some(top[0]);

    render_info_section(frame, top[1], detail);

    if detail.is_playing {
        render_trailer_panel(frame, chunks[1], detail, throbber);
        *trailer_close_area = Some(close_button_area(chunks[1]));
    } else {
        *trailer_close_area = None;
    }

    render_cast_section(frame, chunks[2], detail, throbber);

    let footer = Paragraph::new(Line::from(Span::styled(
        "Click the cover image (or press p) to watch the trailer",
        Style::default().fg(Color::Gray),
    )))
    .alignment(Alignment::Center);
    frame.render_widget(footer, chunks[3]);
}

/// Renders the poster section
fn render_poster_section(
    frame: &mut Frame,
    area: Rect,
    config: &Config,
    detail: &DetailState,
    poster_protocol: &mut Option<StatefulProtocol>,
    loading_poster: bool,
    throbber_state: &mut ThrobberState,
) {
    let poster_block = Block::default().borders(Borders::ALL).title("Poster");
    let inner_area = poster_block.inner(area);
    frame.render_widget(poster_block, area);

    if loading_poster {
        frame.render_stateful_widget(
            throbber("Downloading poster..."),
            first_line(inner_area),
            throbber_state,
        );
    } else if let Some(protocol) = poster_protocol {
        let image = StatefulImage::<StatefulProtocol>::default().resize(Resize::Fit(None));
        frame.render_stateful_widget(image, inner_area, protocol);
    } else {
        let mut placeholder_text = vec![
            Line::from(""),
            Line::from(Span::styled(
                "No poster preview",
                Style::default().fg(Color::Gray),
            )),
        ];
        if let Some(url) = poster_url(config, &detail.movie) {
            placeholder_text.push(Line::from(""));
            placeholder_text.push(Line::from(Span::styled(url, Style::default().fg(Color::DarkGray))));
        }

        let placeholder_paragraph = Paragraph::new(placeholder_text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true });

        frame.render_widget(placeholder_paragraph, inner_area);
    }
}

fn labeled<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(label, Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        Span::styled(value, Style::default().fg(Color::White)),
    ])
}

pub fn info_lines(detail: &DetailState) -> Vec<Line<'static>> {
    let movie = &detail.movie;
    let overview = if movie.overview.is_empty() {
        NO_OVERVIEW_TEXT.to_string()
    } else {
        movie.overview.clone()
    };
    let trailer = if detail.trailer_url.is_empty() {
        "-".to_string()
    } else {
        detail.trailer_url.clone()
    };

    vec![
        labeled("Language : ", movie.original_language.to_uppercase()),
        labeled("Popularity : ", one_decimal(movie.popularity)),
        labeled("Release Date : ", movie.release_date.clone()),
        labeled("Rating : ", rating_label(movie.vote_average)),
        labeled("Genres : ", detail.genre_line()),
        labeled("Trailer : ", trailer),
        Line::from(""),
        labeled("Overview : ", overview),
    ]
}

fn render_info_section(frame: &mut Frame, area: Rect, detail: &DetailState) {
    let info = Paragraph::new(info_lines(detail))
        .block(Block::default().borders(Borders::ALL).title("Info"))
        .wrap(Wrap { trim: true });
    frame.render_widget(info, area);
}

/// What the trailer panel shows for the current state.
pub enum TrailerView<'a> {
    Loading,
    Error(&'a str),
    Player(&'a str),
}

pub fn trailer_view(detail: &DetailState) -> TrailerView<'_> {
    if detail.phase() == DetailPhase::Loading {
        TrailerView::Loading
    } else if !detail.error.is_empty() {
        TrailerView::Error(&detail.error)
    } else {
        TrailerView::Player(&detail.trailer_url)
    }
}

/// Where the right-aligned close label sits on the panel's bottom border.
pub fn close_button_area(panel: Rect) -> Rect {
    let width = (CLOSE_LABEL.len() as u16).min(panel.width.saturating_sub(2));
    Rect::new(
        panel.right().saturating_sub(1 + width),
        panel.bottom().saturating_sub(1),
        width,
        panel.height.min(1),
    )
}

fn render_trailer_panel(
    frame: &mut Frame,
    area: Rect,
    detail: &DetailState,
    throbber_state: &mut ThrobberState,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title("Trailer")
        .title_bottom(Line::from(CLOSE_LABEL).right_aligned());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match trailer_view(detail) {
        TrailerView::Loading => {
            frame.render_stateful_widget(
                throbber("Loading trailer..."),
                first_line(inner),
                throbber_state,
            );
        }
        TrailerView::Error(error) => {
            let text = Paragraph::new(Span::styled(error, Style::default().fg(Color::Red)))
                .alignment(Alignment::Center);
            frame.render_widget(text, inner);
        }
        TrailerView::Player(url) => {
            let text = Paragraph::new(vec![
                Line::from(Span::styled(
                    url,
                    Style::default().fg(Color::Yellow).add_modifier(Modifier::UNDERLINED),
                )),
                Line::from(Span::styled(
                    "Open this link in a browser to play the trailer",
                    Style::default().fg(Color::Gray),
                )),
            ])
            .alignment(Alignment::Center);
            frame.render_widget(text, inner);
        }
    }
}

fn cast_rows(cast: &[CastMember]) -> Vec<Row<'_>> {
    cast.chunks(CAST_COLUMNS)
        .map(|actors| {
            let cells = actors.iter().map(|actor| {
                Cell::from(Text::from(vec![
                    Line::from(Span::styled(
                        actor.name.as_str(),
                        Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
                    )),
                    Line::from(Span::styled(
                        actor.character.as_str(),
                        Style::default().fg(Color::Gray),
                    )),
                ]))
            });
            Row::new(cells).height(3)
        })
        .collect()
}

fn render_cast_section(
    frame: &mut Frame,
    area: Rect,
    detail: &DetailState,
    throbber_state: &mut ThrobberState,
) {
    let block = Block::default().borders(Borders::ALL).title("Cast");

    if detail.phase() == DetailPhase::Loading {
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_stateful_widget(
            throbber("Loading cast..."),
            first_line(inner),
            throbber_state,
        );
        return;
    }

    if detail.cast.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No cast information available",
            Style::default().fg(Color::Gray),
        ))
        .alignment(Alignment::Center)
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let widths = [Constraint::Ratio(1, CAST_COLUMNS as u32); CAST_COLUMNS];
    let table = Table::new(cast_rows(&detail.cast), widths).block(block);
    frame.render_widget(table, area);
}

/// Renders empty state
fn render_empty_state(frame: &mut Frame, area: Rect) {
    let empty_block = Block::default()
        .title("Movie Details")
        .borders(Borders::ALL)
        .style(Style::default());

    let empty_text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "No movie selected",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press (Esc) or (b) to go back",
            Style::default().fg(Color::Gray),
        )),
    ];

    let empty_paragraph = Paragraph::new(empty_text)
        .block(empty_block)
        .alignment(Alignment::Center);

    frame.render_widget(empty_paragraph, area);
}

fn first_line(area: Rect) -> Rect {
    Rect::new(area.x, area.y, area.width, area.height.min(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::detail::tests::{FakeApi, movie};
    use crate::app::detail::{FETCH_FAILED_MESSAGE, NO_GENRES_TEXT, fetch_detail};

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn ready_state() -> DetailState {
        let mut state = DetailState::loading(movie(42, "X"));
        state.apply(fetch_detail(&FakeApi::scenario(), 42));
        state
    }

    #[test]
    fn info_lines_follow_detail_contract() {
        let lines: Vec<String> = info_lines(&ready_state()).iter().map(line_text).collect();

        assert_eq!(lines[0], "Language : EN");
        assert_eq!(lines[1], "Popularity : 88.0");
        assert_eq!(lines[2], "Release Date : 2024-05-01");
        assert_eq!(lines[3], "Rating : 7.3 / 10");
        assert_eq!(lines[4], "Genres : Action");
        assert_eq!(lines[5], "Trailer : https://www.youtube.com/embed/abc");
        assert_eq!(lines[7], "Overview : No overview available.");
    }

    #[test]
    fn genres_fall_back_while_loading() {
        let state = DetailState::loading(movie(42, "X"));
        let lines: Vec<String> = info_lines(&state).iter().map(line_text).collect();
        assert_eq!(lines[4], format!("Genres : {}", NO_GENRES_TEXT));
    }

    #[test]
    fn trailer_panel_prefers_loading_then_error_then_player() {
        let mut state = DetailState::loading(movie(42, "X"));
        assert!(matches!(trailer_view(&state), TrailerView::Loading));

        state = ready_state();
        assert!(matches!(
            trailer_view(&state),
            TrailerView::Player("https://www.youtube.com/embed/abc")
        ));

        state.error = FETCH_FAILED_MESSAGE.to_string();
        assert!(matches!(trailer_view(&state), TrailerView::Error(FETCH_FAILED_MESSAGE)));
    }

    #[test]
    fn close_button_sits_on_bottom_border() {
        let panel = Rect::new(10, 20, 40, 5);
        assert_eq!(close_button_area(panel), Rect::new(40, 24, 9, 1));

        let area = Rect::new(0, 0, 40, 5);
        let mut buf = ratatui::buffer::Buffer::empty(area);
        let block = Block::default()
            .borders(Borders::ALL)
            .title_bottom(Line::from(CLOSE_LABEL).right_aligned());
        ratatui::widgets::Widget::render(block, area, &mut buf);
        let button = close_button_area(area);
        let label: String = (button.left()..button.right())
            .map(|x| buf[(x, button.y)].symbol())
            .collect();
        assert_eq!(label, CLOSE_LABEL);
    }

    #[test]
    fn cast_is_laid_out_four_per_row() {
        let actor = CastMember {
            name: "A".to_string(),
            character: "Hero".to_string(),
            profile_path: None,
        };
        let cast = vec![actor; 9];
        assert_eq!(cast_rows(&cast).len(), 3);
    }
}
