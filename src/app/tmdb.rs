use serde::Deserialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::config::Config;

/// Errors that can occur while talking to TMDB.
#[derive(Debug, Error)]
pub enum TmdbError {
    /// The request never produced a response
    #[error("Request failed: {0}")]
    Request(String),

    /// TMDB answered with a non-success status
    #[error("API request failed with status: {0}")]
    Status(String),

    /// The body did not match the expected shape
    #[error("Failed to parse API response: {0}")]
    Parse(String),
}

/// One movie as returned by the discover endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieSummary {
    pub id: u64,
    pub title: String,
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub popularity: f64,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub genre_ids: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Video {
    #[serde(rename = "type")]
    pub video_type: String,
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CastMember {
    pub name: String,
    #[serde(default)]
    pub character: String,
    pub profile_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ResultsPage<T> {
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
struct Credits {
    cast: Vec<CastMember>,
}

#[derive(Debug, Deserialize)]
struct GenreList {
    genres: Vec<Genre>,
}

/// Read-only view of the movie metadata API.
///
/// The detail fetch calls the three per-movie methods from separate threads,
/// so implementors must be shareable.
pub trait MovieApi: Send + Sync {
    /// One page of popular movies for the card grid.
    fn discover(&self) -> Result<Vec<MovieSummary>, TmdbError>;

    fn videos(&self, movie_id: u64) -> Result<Vec<Video>, TmdbError>;

    fn credits(&self, movie_id: u64) -> Result<Vec<CastMember>, TmdbError>;

    /// The global movie genre list, not specific to any movie.
    fn genres(&self) -> Result<Vec<Genre>, TmdbError>;

    /// Raw bytes of an image on the CDN.
    fn image(&self, path: &str) -> Result<Vec<u8>, TmdbError>;
}

/// Blocking TMDB client.
pub struct TmdbClient {
    client: reqwest::blocking::Client,
    api_key: String,
    config: Config,
}

impl TmdbClient {
    pub fn new(config: &Config, api_key: &str) -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
            api_key: api_key.to_string(),
            config: config.clone(),
        }
    }

    /// Builds `{base}{path}?{extra}&api_key=...`.
    fn endpoint(&self, path: &str, extra: &[(&str, &str)]) -> String {
        let mut query: Vec<String> = extra
            .iter()
            .map(|(k, v)| format!("{}={}", k, urlencoding::encode(v)))
            .collect();
        query.push(format!("api_key={}", urlencoding::encode(&self.api_key)));

        format!("{}{}?{}", self.config.api_base_url, path, query.join("&"))
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, TmdbError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|e| TmdbError::Request(e.without_url().to_string()))?;

        if !response.status().is_success() {
            return Err(TmdbError::Status(response.status().to_string()));
        }

        let body = response
            .text()
            .map_err(|e| TmdbError::Request(e.without_url().to_string()))?;

        serde_json::from_str(&body).map_err(|e| TmdbError::Parse(e.to_string()))
    }
}

impl MovieApi for TmdbClient {
    fn discover(&self) -> Result<Vec<MovieSummary>, TmdbError> {
        let url = self.endpoint("/discover/movie", &[("sort_by", "popularity.desc")]);
        let page: ResultsPage<MovieSummary> = self.get_json(&url)?;
        Ok(page.results)
    }

    fn videos(&self, movie_id: u64) -> Result<Vec<Video>, TmdbError> {
        let url = self.endpoint(&format!("/movie/{}/videos", movie_id), &[]);
        let page: ResultsPage<Video> = self.get_json(&url)?;
        Ok(page.results)
    }

    fn credits(&self, movie_id: u64) -> Result<Vec<CastMember>, TmdbError> {
        let url = self.endpoint(&format!("/movie/{}/credits", movie_id), &[]);
        let credits: Credits = self.get_json(&url)?;
        Ok(credits.cast)
    }

    fn genres(&self) -> Result<Vec<Genre>, TmdbError> {
        let url = self.endpoint("/genre/movie/list", &[]);
        let list: GenreList = self.get_json(&url)?;
        Ok(list.genres)
    }

    fn image(&self, path: &str) -> Result<Vec<u8>, TmdbError> {
        let url = self.config.image_url(path);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| TmdbError::Request(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TmdbError::Status(format!(
                "Failed to download image: status {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| TmdbError::Request(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}
