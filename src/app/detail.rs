//! Detail overlay state and the fetch that feeds it.
//!
//! A selection builds a fresh [`DetailState`] in the loading phase and hands
//! the movie id to [`spawn_detail_fetch`]. Videos, credits and the genre list
//! are requested concurrently; once all three have settled a single
//! [`DetailMessage::Settled`] carries the outcomes back and
//! [`DetailState::apply`] merges them.

use std::sync::Arc;
use std::sync::mpsc;
use std::thread;

use crate::app::tmdb::{CastMember, Genre, MovieApi, MovieSummary, TmdbError, Video};

pub const NO_TRAILER_MESSAGE: &str = "No trailer available for this movie.";
pub const FETCH_FAILED_MESSAGE: &str = "Failed to fetch data. Please try again later.";
pub const NO_GENRES_TEXT: &str = "No genres available.";
pub const NO_OVERVIEW_TEXT: &str = "No overview available.";
pub const TRAILER_EMBED_BASE: &str = "https://www.youtube.com/embed/";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailPhase {
    Loading,
    Ready,
}

/// Outcome of the three detail requests, gathered after all of them settled.
#[derive(Debug)]
pub struct DetailFetch {
    pub videos: Result<Vec<Video>, TmdbError>,
    pub credits: Result<Vec<CastMember>, TmdbError>,
    pub genres: Result<Vec<Genre>, TmdbError>,
}

pub enum DetailMessage {
    Settled(DetailFetch),
    Poster(Result<image::DynamicImage, String>),
}

/// View state of the open detail overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailState {
    pub movie: MovieSummary,
    pub trailer_url: String,
    pub is_playing: bool,
    pub loading: bool,
    pub error: String,
    pub cast: Vec<CastMember>,
    pub genres: Vec<Genre>,
}

impl DetailState {
    pub fn loading(movie: MovieSummary) -> Self {
        Self {
            movie,
            trailer_url: String::new(),
            is_playing: false,
            loading: true,
            error: String::new(),
            cast: Vec::new(),
            genres: Vec::new(),
        }
    }

    pub fn phase(&self) -> DetailPhase {
        if self.loading {
            DetailPhase::Loading
        } else {
            DetailPhase::Ready
        }
    }

    /// Merges settled results. Successful parts are kept even when another
    /// request failed; any failure leaves the generic message in `error`.
    pub fn apply(&mut self, fetch: DetailFetch) {
        let mut failed = false;

        match fetch.videos {
            Ok(videos) => match first_trailer(&videos) {
                Some(trailer) => self.trailer_url = trailer_url(&trailer.key),
                None => self.error = NO_TRAILER_MESSAGE.to_string(),
            },
            Err(e) => {
                tracing::error!(movie_id = self.movie.id, error = %e, "failed to fetch videos");
                failed = true;
            }
        }

        match fetch.credits {
            Ok(cast) => self.cast = cast,
            Err(e) => {
                tracing::error!(movie_id = self.movie.id, error = %e, "failed to fetch credits");
                failed = true;
            }
        }

        match fetch.genres {
            Ok(genres) => self.genres = genres,
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch genre list");
                failed = true;
            }
        }

        if failed {
            self.error = FETCH_FAILED_MESSAGE.to_string();
        }
        self.loading = false;
    }

    pub fn play(&mut self) {
        self.is_playing = true;
    }

    pub fn stop(&mut self) {
        self.is_playing = false;
    }

    /// Display names for `genre_ids`, in input order, joined with `" , "`.
    /// Ids missing from the stored genre list are dropped.
    pub fn genre_names(&self, genre_ids: &[u32]) -> String {
        genre_ids
            .iter()
            .filter_map(|id| self.genres.iter().find(|g| g.id == *id))
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(" , ")
    }

    pub fn genre_line(&self) -> String {
        let names = self.genre_names(&self.movie.genre_ids);
        if names.is_empty() {
            NO_GENRES_TEXT.to_string()
        } else {
            names
        }
    }
}

/// First video typed exactly "Trailer"; order of the result set decides.
pub fn first_trailer(videos: &[Video]) -> Option<&Video> {
    videos.iter().find(|v| v.video_type == "Trailer")
}

pub fn trailer_url(key: &str) -> String {
    format!("{}{}", TRAILER_EMBED_BASE, key)
}

/// Runs the three detail requests concurrently and returns once all settled.
pub fn fetch_detail(api: &dyn MovieApi, movie_id: u64) -> DetailFetch {
    thread::scope(|scope| {
        let videos = scope.spawn(|| api.videos(movie_id));
        let credits = scope.spawn(|| api.credits(movie_id));
        let genres = scope.spawn(|| api.genres());

        DetailFetch {
            videos: join(videos),
            credits: join(credits),
            genres: join(genres),
        }
    })
}

fn join<T>(handle: thread::ScopedJoinHandle<'_, Result<T, TmdbError>>) -> Result<T, TmdbError> {
    handle
        .join()
        .unwrap_or_else(|_| Err(TmdbError::Request("request thread panicked".to_string())))
}

/// Starts the detail fetch for `movie` on a worker thread, and the poster
/// download on its own thread when `want_poster` is set.
///
/// Results go to `sender`; if the receiver was dropped because the overlay
/// closed or moved on to another movie, the send fails and the results are
/// discarded. The returned handle yields whether the settled results were
/// delivered.
pub fn spawn_detail_fetch(
    api: Arc<dyn MovieApi>,
    movie: &MovieSummary,
    want_poster: bool,
    sender: mpsc::Sender<DetailMessage>,
) -> thread::JoinHandle<bool> {
    let movie_id = movie.id;

    if let Some(path) = movie.poster_path.clone().filter(|_| want_poster) {
        let api = Arc::clone(&api);
        let sender = sender.clone();
        thread::spawn(move || {
            let poster = api
                .image(&path)
                .map_err(|e| e.to_string())
                .and_then(|bytes| image::load_from_memory(&bytes).map_err(|e| e.to_string()));
            let _ = sender.send(DetailMessage::Poster(poster));
        });
    }

    thread::spawn(move || {
        tracing::info!(movie_id, "fetching movie details");
        let fetch = fetch_detail(api.as_ref(), movie_id);
        if sender.send(DetailMessage::Settled(fetch)).is_err() {
            tracing::debug!(movie_id, "detail overlay gone, dropping results");
            return false;
        }
        true
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory API. `gate`, when set, blocks `genres()` until a unit is
    /// sent on the paired channel; `video_gates` does the same for
    /// `videos()` of one movie id. With `keyed_trailers` every movie gets a
    /// single trailer keyed `k{id}`.
    pub(crate) struct FakeApi {
        pub movies: Vec<MovieSummary>,
        pub videos: Result<Vec<Video>, ()>,
        pub cast: Result<Vec<CastMember>, ()>,
        pub genres: Result<Vec<Genre>, ()>,
        pub gate: Option<Mutex<mpsc::Receiver<()>>>,
        pub video_gates: Vec<(u64, Mutex<mpsc::Receiver<()>>)>,
        pub keyed_trailers: bool,
    }

    impl FakeApi {
        pub(crate) fn scenario() -> Self {
            Self {
                movies: vec![movie(42, "X")],
                videos: Ok(vec![
                    video("Teaser", "tease"),
                    video("Trailer", "abc"),
                    video("Trailer", "later"),
                ]),
                cast: Ok(vec![CastMember {
                    name: "A".to_string(),
                    character: "Hero".to_string(),
                    profile_path: Some("/p.jpg".to_string()),
                }]),
                genres: Ok(vec![Genre {
                    id: 1,
                    name: "Action".to_string(),
                }]),
                gate: None,
                video_gates: Vec::new(),
                keyed_trailers: false,
            }
        }
    }

    fn failed() -> TmdbError {
        TmdbError::Status("500 Internal Server Error".to_string())
    }

    impl MovieApi for FakeApi {
        fn discover(&self) -> Result<Vec<MovieSummary>, TmdbError> {
            Ok(self.movies.clone())
        }

        fn videos(&self, movie_id: u64) -> Result<Vec<Video>, TmdbError> {
            if let Some((_, gate)) = self.video_gates.iter().find(|(id, _)| *id == movie_id) {
                let _ = gate.lock().unwrap().recv();
            }
            if self.keyed_trailers {
                return Ok(vec![video("Trailer", &format!("k{}", movie_id))]);
            }
            self.videos.clone().map_err(|_| failed())
        }

        fn credits(&self, _movie_id: u64) -> Result<Vec<CastMember>, TmdbError> {
            self.cast.clone().map_err(|_| failed())
        }

        fn genres(&self) -> Result<Vec<Genre>, TmdbError> {
            if let Some(gate) = &self.gate {
                let _ = gate.lock().unwrap().recv();
            }
            self.genres.clone().map_err(|_| failed())
        }

        fn image(&self, _path: &str) -> Result<Vec<u8>, TmdbError> {
            Err(failed())
        }
    }

    pub(crate) fn movie(id: u64, title: &str) -> MovieSummary {
        MovieSummary {
            id,
            title: title.to_string(),
            poster_path: Some("/poster.jpg".to_string()),
            vote_average: 7.34,
            release_date: "2024-05-01".to_string(),
            original_language: "en".to_string(),
            popularity: 88.04,
            overview: String::new(),
            genre_ids: vec![1],
        }
    }

    fn video(video_type: &str, key: &str) -> Video {
        Video {
            video_type: video_type.to_string(),
            key: key.to_string(),
        }
    }

    fn settled(api: &FakeApi) -> DetailState {
        let mut state = DetailState::loading(movie(42, "X"));
        state.apply(fetch_detail(api, 42));
        state
    }

    #[test]
    fn scenario_resolves_trailer_cast_and_genres() {
        let state = settled(&FakeApi::scenario());

        assert_eq!(state.phase(), DetailPhase::Ready);
        assert_eq!(state.trailer_url, "https://www.youtube.com/embed/abc");
        assert_eq!(state.error, "");
        assert_eq!(state.cast.len(), 1);
        assert_eq!(state.genre_names(&[1]), "Action");
    }

    #[test]
    fn fresh_state_is_loading_with_empty_fields() {
        let state = DetailState::loading(movie(42, "X"));
        assert_eq!(state.phase(), DetailPhase::Loading);
        assert!(state.trailer_url.is_empty());
        assert!(state.error.is_empty());
        assert!(state.cast.is_empty());
        assert!(state.genres.is_empty());
        assert!(!state.is_playing);
    }

    #[test]
    fn missing_trailer_sets_message_but_keeps_other_data() {
        let api = FakeApi {
            videos: Ok(vec![video("Teaser", "t"), video("Clip", "c")]),
            ..FakeApi::scenario()
        };
        let state = settled(&api);

        assert_eq!(state.trailer_url, "");
        assert_eq!(state.error, NO_TRAILER_MESSAGE);
        assert_eq!(state.cast.len(), 1);
        assert_eq!(state.genres.len(), 1);
        assert!(!state.loading);
    }

    #[test]
    fn any_failure_wins_over_found_trailer() {
        let api = FakeApi {
            cast: Err(()),
            ..FakeApi::scenario()
        };
        let state = settled(&api);

        assert_eq!(state.trailer_url, "https://www.youtube.com/embed/abc");
        assert_eq!(state.error, FETCH_FAILED_MESSAGE);
        assert!(state.cast.is_empty());
        assert!(!state.loading);
    }

    #[test]
    fn failure_overwrites_no_trailer_message() {
        let api = FakeApi {
            videos: Ok(Vec::new()),
            genres: Err(()),
            ..FakeApi::scenario()
        };
        let state = settled(&api);

        assert_eq!(state.error, FETCH_FAILED_MESSAGE);
    }

    #[test]
    fn genre_names_keeps_order_and_drops_unknown_ids() {
        let mut state = DetailState::loading(movie(1, "Y"));
        state.genres = vec![
            Genre { id: 1, name: "Action".to_string() },
            Genre { id: 2, name: "Drama".to_string() },
            Genre { id: 3, name: "Comedy".to_string() },
        ];

        assert_eq!(state.genre_names(&[3, 99, 1]), "Comedy , Action");
        assert_eq!(state.genre_names(&[99]), "");
        assert_eq!(state.genre_names(&[]), "");
    }

    #[test]
    fn genre_line_falls_back_when_nothing_matches() {
        let mut state = DetailState::loading(movie(1, "Y"));
        assert_eq!(state.genre_line(), NO_GENRES_TEXT);

        state.genres = vec![Genre { id: 1, name: "Action".to_string() }];
        assert_eq!(state.genre_line(), "Action");
    }

    #[test]
    fn playing_toggle_is_independent_of_fetch() {
        let mut state = DetailState::loading(movie(1, "Y"));
        state.play();
        assert!(state.is_playing);
        assert!(state.loading);

        state.apply(fetch_detail(&FakeApi::scenario(), 1));
        assert!(state.is_playing);

        state.stop();
        assert!(!state.is_playing);
    }

    #[test]
    fn settled_message_waits_for_slowest_request() {
        let (release, gate) = mpsc::channel();
        let api = FakeApi {
            gate: Some(Mutex::new(gate)),
            ..FakeApi::scenario()
        };
        let (sender, receiver) = mpsc::channel();

        spawn_detail_fetch(Arc::new(api), &movie(42, "X"), false, sender);

        assert!(receiver.recv_timeout(Duration::from_millis(200)).is_err());

        release.send(()).unwrap();
        match receiver.recv_timeout(Duration::from_secs(5)) {
            Ok(DetailMessage::Settled(fetch)) => {
                let mut state = DetailState::loading(movie(42, "X"));
                state.apply(fetch);
                assert!(!state.loading);
                assert_eq!(state.genres.len(), 1);
            }
            _ => panic!("expected settled detail fetch"),
        }
    }

    #[test]
    fn dropped_receiver_discards_results() {
        let (sender, receiver) = mpsc::channel();
        drop(receiver);
        let handle = spawn_detail_fetch(Arc::new(FakeApi::scenario()), &movie(42, "X"), false, sender);
        assert!(!handle.join().unwrap());
    }

    #[test]
    fn live_receiver_gets_settled_results() {
        let (sender, receiver) = mpsc::channel();
        let handle = spawn_detail_fetch(Arc::new(FakeApi::scenario()), &movie(42, "X"), false, sender);
        assert!(handle.join().unwrap());
        assert!(matches!(receiver.try_recv(), Ok(DetailMessage::Settled(_))));
    }

    #[test]
    fn poster_download_does_not_wait_for_detail_requests() {
        let (release, gate) = mpsc::channel();
        let api = FakeApi {
            gate: Some(Mutex::new(gate)),
            ..FakeApi::scenario()
        };
        let (sender, receiver) = mpsc::channel();

        let handle = spawn_detail_fetch(Arc::new(api), &movie(42, "X"), true, sender);

        match receiver.recv_timeout(Duration::from_secs(5)) {
            Ok(DetailMessage::Poster(result)) => assert!(result.is_err()),
            _ => panic!("expected poster result before detail requests settled"),
        }

        release.send(()).unwrap();
        assert!(handle.join().unwrap());
        assert!(matches!(receiver.try_recv(), Ok(DetailMessage::Settled(_))));
    }
}
