mod app;
use app::App;

mod config;
mod ui;

use std::error::Error;
use std::fs::{self, File};
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, MouseButton, MouseEventKind,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::prelude::{Backend, CrosstermBackend};
use ratatui_image::picker::Picker;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::CurrentScreen;
use crate::app::tmdb::{MovieApi, TmdbClient};
use crate::config::Config;

/// Sends tracing output to a file, the terminal belongs to the UI.
fn init_logging() -> Result<(), Box<dyn Error>> {
    let log_dir = dirs::cache_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("reel_tui");
    fs::create_dir_all(&log_dir)?;
    let log_file = File::create(log_dir.join("reel_tui.log"))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .init();

    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    init_logging()?;
    let config = Config::load()?;

    let api: Option<Arc<dyn MovieApi>> = match config.api_key.as_deref() {
        Some(key) => Some(Arc::new(TmdbClient::new(&config, key))),
        None => {
            tracing::warn!("TMDB_API_KEY is not set");
            None
        }
    };

    // setup terminal
    enable_raw_mode()?;
    let mut stderr = io::stderr(); // This is a special case. Normally using stdout is fine
    execute!(stderr, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stderr);
    let mut terminal = Terminal::new(backend)?;

    // create app and run it
    let mut app = App::new(config, api);
    match Picker::from_query_stdio() {
        Ok(picker) => app = app.with_picker(picker),
        Err(e) => tracing::warn!(error = %e, "terminal image support unavailable, posters disabled"),
    }
    app.fetch_movies();
    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "exited with error");
    }
    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>>
where
    B::Error: Error + 'static,
{
    loop {
        terminal.draw(|f| ui::ui(f, app))?;

        app.poll_background();
        app.on_tick();

        // Poll for events with a timeout to allow UI updates
        if !event::poll(Duration::from_millis(100))? {
            continue;
        }

        match event::read()? {
            Event::Mouse(mouse) => {
                if mouse.kind == MouseEventKind::Down(MouseButton::Left) {
                    app.click_at(mouse.column, mouse.row);
                }
            }
            Event::Key(key) => {
                if key.kind == event::KeyEventKind::Release {
                    // Skip events that are not KeyEventKind::Press
                    continue;
                }

                match app.current_screen {
                    CurrentScreen::Main => match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Char('g') => app.fetch_movies(),
                        KeyCode::Enter => app.open_selected(),
                        KeyCode::Down | KeyCode::Char('j') => app.next_row(),
                        KeyCode::Up | KeyCode::Char('k') => app.previous_row(),
                        KeyCode::Right | KeyCode::Char('l') => app.next_movie(),
                        KeyCode::Left | KeyCode::Char('h') => app.previous_movie(),
                        _ => {}
                    },
                    CurrentScreen::MovieDetail => match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Esc | KeyCode::Char('b') => app.close_detail(),
                        KeyCode::Char('p') | KeyCode::Enter => app.play_trailer(),
                        KeyCode::Char('x') => app.stop_trailer(),
                        _ => {}
                    },
                }
            }
            _ => {}
        }
    }
}
