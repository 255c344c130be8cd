mod card;
mod footer;
mod header;
mod loading;
mod main_content;
mod movie_detail;

use crate::app::{App, CurrentScreen};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
};

use footer::render_footer;
use header::render_header;
use loading::render_loading;
use main_content::{render_main_content, render_missing_api_key};
use movie_detail::render_movie_detail;

/// Main UI rendering function that orchestrates all UI components
pub fn ui(frame: &mut Frame, app: &mut App) {
    // Create the main layout: header, content area, footer
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),  // Header
            Constraint::Min(1),     // Content
            Constraint::Length(3),  // Footer
        ])
        .split(frame.area());

    render_header(frame, app, chunks[0]);

    if !app.has_api_key() {
        render_missing_api_key(frame, chunks[1]);
    } else {
        match app.current_screen {
            CurrentScreen::MovieDetail => {
                render_movie_detail(frame, app, chunks[1]);
            }
            CurrentScreen::Main => {
                if app.loading_movies {
                    render_loading(frame, app, chunks[1]);
                } else {
                    render_main_content(frame, app, chunks[1]);
                }
            }
        }
    }

    render_footer(frame, app, chunks[2]);
}
