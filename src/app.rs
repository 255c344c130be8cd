pub mod detail;
pub mod tmdb;

use std::sync::Arc;
use std::sync::mpsc;

use chrono::{DateTime, Local};
use ratatui::layout::{Position, Rect};
use ratatui_image::picker::Picker;
use ratatui_image::protocol::StatefulProtocol;
use throbber_widgets_tui::ThrobberState;

use crate::app::detail::{DetailMessage, DetailState, spawn_detail_fetch};
use crate::app::tmdb::{MovieApi, MovieSummary};
use crate::config::Config;

pub enum MovieFetchMessage {
    Complete(Vec<MovieSummary>),
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrentScreen {
    Main,
    MovieDetail,
}

pub struct App {
    pub config: Config,
    pub api: Option<Arc<dyn MovieApi>>,
    pub current_screen: CurrentScreen,
    pub movies: Vec<MovieSummary>,
    pub loading_movies: bool,
    pub movies_error: Option<String>,
    pub receiver: Option<mpsc::Receiver<MovieFetchMessage>>,
    pub last_updated: Option<DateTime<Local>>,
    pub selected_movie_index: usize,
    /// Cards per grid row, as last laid out by the UI.
    pub grid_columns: usize,
    /// Screen area of every card drawn in the last frame.
    pub card_areas: Vec<(usize, Rect)>,
    pub detail: Option<DetailState>,
    pub detail_receiver: Option<mpsc::Receiver<DetailMessage>>,
    pub picker: Option<Picker>,
    pub poster_protocol: Option<StatefulProtocol>,
    pub loading_poster: bool,
    /// Screen area of the overlay poster, clicking it starts the trailer.
    pub poster_area: Option<Rect>,
    /// Screen area of the trailer panel's close button while it is shown.
    pub trailer_close_area: Option<Rect>,
    pub throbber: ThrobberState,
}

impl App {
    pub fn new(config: Config, api: Option<Arc<dyn MovieApi>>) -> Self {
        Self {
            config,
            api,
            current_screen: CurrentScreen::Main,
            movies: Vec::new(),
            loading_movies: false,
            movies_error: None,
            receiver: None,
            last_updated: None,
            selected_movie_index: 0,
            grid_columns: 1,
            card_areas: Vec::new(),
            detail: None,
            detail_receiver: None,
            picker: None,
            poster_protocol: None,
            loading_poster: false,
            poster_area: None,
            trailer_close_area: None,
            throbber: ThrobberState::default(),
        }
    }

    pub fn with_picker(mut self, picker: Picker) -> Self {
        self.picker = Some(picker);
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api.is_some()
    }

    pub fn fetch_movies(&mut self) {
        let Some(api) = self.api.clone() else {
            return;
        };
        if self.loading_movies {
            return;
        }

        let (sender, receiver) = mpsc::channel();
        self.receiver = Some(receiver);
        self.loading_movies = true;
        self.movies_error = None;

        std::thread::spawn(move || {
            tracing::info!("loading popular movies");
            let message = match api.discover() {
                Ok(movies) => MovieFetchMessage::Complete(movies),
                Err(e) => {
                    tracing::error!(error = %e, "failed to load movies");
                    MovieFetchMessage::Error(e.to_string())
                }
            };
            let _ = sender.send(message);
        });
    }

    /// Drains whatever the background threads have produced since last frame.
    pub fn poll_background(&mut self) {
        if let Some(receiver) = &self.receiver {
            match receiver.try_recv() {
                Ok(MovieFetchMessage::Complete(movies)) => {
                    tracing::info!(count = movies.len(), "movies loaded");
                    self.movies = movies;
                    self.last_updated = Some(Local::now());
                    self.loading_movies = false;
                    self.receiver = None;
                    self.selected_movie_index = 0;
                }
                Ok(MovieFetchMessage::Error(error)) => {
                    self.movies_error = Some(error);
                    self.loading_movies = false;
                    self.receiver = None;
                }
                Err(mpsc::TryRecvError::Empty) => {}
                Err(mpsc::TryRecvError::Disconnected) => {
                    self.loading_movies = false;
                    self.receiver = None;
                }
            }
        }

        let mut messages = Vec::new();
        if let Some(receiver) = &self.detail_receiver {
            messages.extend(receiver.try_iter());
        }
        for message in messages {
            self.handle_detail_message(message);
        }
    }

    fn handle_detail_message(&mut self, message: DetailMessage) {
        match message {
            DetailMessage::Settled(fetch) => {
                if let Some(detail) = &mut self.detail {
                    detail.apply(fetch);
                    tracing::info!(
                        movie_id = detail.movie.id,
                        cast = detail.cast.len(),
                        has_trailer = !detail.trailer_url.is_empty(),
                        "movie details settled"
                    );
                }
            }
            DetailMessage::Poster(result) => {
                self.loading_poster = false;
                match result {
                    Ok(img) => {
                        if let Some(picker) = &self.picker {
                            self.poster_protocol = Some(picker.new_resize_protocol(img));
                        }
                    }
                    Err(e) => tracing::warn!(error = %e, "failed to load poster"),
                }
            }
        }
    }

    /// Opens the overlay for the movie at `index`, replacing any open one.
    pub fn open_detail(&mut self, index: usize) {
        let Some(movie) = self.movies.get(index).cloned() else {
            return;
        };
        self.selected_movie_index = index;

        // Dropping the previous receiver discards anything still in flight.
        self.detail_receiver = None;
        self.poster_protocol = None;
        self.poster_area = None;
        self.trailer_close_area = None;
        self.loading_poster = false;

        if let Some(api) = self.api.clone() {
            let (sender, receiver) = mpsc::channel();
            let want_poster = self.picker.is_some() && movie.poster_path.is_some();
            let _ = spawn_detail_fetch(api, &movie, want_poster, sender);
            self.detail_receiver = Some(receiver);
            self.loading_poster = want_poster;
        }

        tracing::info!(movie_id = movie.id, title = %movie.title, "opened movie details");
        self.detail = Some(DetailState::loading(movie));
        self.current_screen = CurrentScreen::MovieDetail;
    }

    pub fn open_selected(&mut self) {
        self.open_detail(self.selected_movie_index);
    }

    pub fn close_detail(&mut self) {
        if let Some(detail) = self.detail.take() {
            tracing::info!(movie_id = detail.movie.id, "closed movie details");
        }
        self.detail_receiver = None;
        self.poster_protocol = None;
        self.poster_area = None;
        self.trailer_close_area = None;
        self.loading_poster = false;
        self.current_screen = CurrentScreen::Main;
    }

    pub fn play_trailer(&mut self) {
        if let Some(detail) = &mut self.detail {
            detail.play();
        }
    }

    pub fn stop_trailer(&mut self) {
        if let Some(detail) = &mut self.detail {
            detail.stop();
        }
        self.trailer_close_area = None;
    }

    /// Left mouse click at a terminal cell.
    pub fn click_at(&mut self, column: u16, row: u16) {
        let position = Position::new(column, row);
        match self.current_screen {
            CurrentScreen::Main => {
                let hit = self
                    .card_areas
                    .iter()
                    .find(|(_, area)| area.contains(position))
                    .map(|(index, _)| *index);
                if let Some(index) = hit {
                    self.open_detail(index);
                }
            }
            CurrentScreen::MovieDetail => {
                if self.trailer_close_area.is_some_and(|area| area.contains(position)) {
                    self.stop_trailer();
                } else if self.poster_area.is_some_and(|area| area.contains(position)) {
                    self.play_trailer();
                }
            }
        }
    }

    pub fn next_movie(&mut self) {
        self.move_selection(1);
    }

    pub fn previous_movie(&mut self) {
        self.move_selection(-1);
    }

    pub fn next_row(&mut self) {
        self.move_selection(self.grid_columns.max(1) as isize);
    }

    pub fn previous_row(&mut self) {
        self.move_selection(-(self.grid_columns.max(1) as isize));
    }

    fn move_selection(&mut self, delta: isize) {
        let movie_count = self.movies.len();
        if movie_count == 0 {
            return;
        }

        let target = self.selected_movie_index as isize + delta;
        self.selected_movie_index = target.clamp(0, movie_count as isize - 1) as usize;
    }

    pub fn on_tick(&mut self) {
        self.throbber.calc_next();
    }
}
