//! TMDB reference data: record types and the HTTP client that fetches them

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::TmdbConfig;
use crate::error::{E2eError, E2eResult};
use crate::reference::ExpectedList;

/// Prefix the front end puts in front of every poster path
pub const IMAGE_BASE_URL: &str = "https://image.tmdb.org/t/p/w500/";

/// Build the poster URL the front end renders for a path.
///
/// Paths from TMDB start with `/`, so the result carries a double slash just
/// like the application's own string concatenation. A missing path renders as
/// `null`.
pub fn poster_url(path: Option<&str>) -> String {
    format!("{}{}", IMAGE_BASE_URL, path.unwrap_or("null"))
}

/// A movie as returned in TMDB list endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieRecord {
    pub id: u64,

    /// Display title; TMDB occasionally includes doubled whitespace
    pub title: String,

    #[serde(default)]
    pub overview: String,

    /// Ordering key for list pages
    #[serde(default)]
    pub popularity: f64,

    #[serde(default)]
    pub poster_path: Option<String>,

    #[serde(default)]
    pub release_date: String,

    #[serde(default)]
    pub vote_average: f64,
}

impl MovieRecord {
    pub fn poster_url(&self) -> String {
        poster_url(self.poster_path.as_deref())
    }
}

/// A named sub-record (genre, production country)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Named {
    pub name: String,
}

/// The full record returned by `movie/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    #[serde(flatten)]
    pub movie: MovieRecord,

    #[serde(default)]
    pub genres: Vec<Named>,

    #[serde(default)]
    pub production_countries: Vec<Named>,

    /// Minutes
    #[serde(default)]
    pub runtime: Option<u32>,

    #[serde(default)]
    pub revenue: u64,
}

/// A single image entry from `movie/{id}/images`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub file_path: String,
}

/// The `movie/{id}/images` payload; only posters are checked
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieImages {
    pub posters: Vec<ImageRecord>,
}

#[derive(Debug, Deserialize)]
struct ListPage {
    results: Vec<MovieRecord>,
}

/// The TMDB endpoints the harness reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TmdbEndpoint {
    /// `discover/movie`, first page, English, no adult or video entries
    Discover,
    /// `movie/{id}`
    MovieDetail(u64),
    /// `movie/{id}/images`
    MovieImages(u64),
    /// `movie/upcoming`
    Upcoming,
    /// `trending/movie/week`
    TrendingWeek,
}

impl TmdbEndpoint {
    /// Path relative to the API root
    pub fn path(&self) -> String {
        match self {
            TmdbEndpoint::Discover => "discover/movie".to_string(),
            TmdbEndpoint::MovieDetail(id) => format!("movie/{}", id),
            TmdbEndpoint::MovieImages(id) => format!("movie/{}/images", id),
            TmdbEndpoint::Upcoming => "movie/upcoming".to_string(),
            TmdbEndpoint::TrendingWeek => "trending/movie/week".to_string(),
        }
    }

    /// Query parameters besides the API key
    pub fn params(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            TmdbEndpoint::Discover => &[
                ("language", "en-US"),
                ("include_adult", "false"),
                ("include_video", "false"),
                ("page", "1"),
            ],
            _ => &[],
        }
    }

    /// Whether the payload carries a `results` list
    pub fn is_list(&self) -> bool {
        matches!(
            self,
            TmdbEndpoint::Discover | TmdbEndpoint::Upcoming | TmdbEndpoint::TrendingWeek
        )
    }
}

/// Blocking-in-spirit client: every call is awaited to completion before the
/// caller moves on, and nothing is retried.
pub struct TmdbClient {
    http: reqwest::Client,
    config: TmdbConfig,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> E2eResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    /// FetchList: request a list endpoint and return its results sorted by
    /// popularity
    pub async fn fetch_list(&self, endpoint: TmdbEndpoint) -> E2eResult<ExpectedList> {
        if !endpoint.is_list() {
            return Err(E2eError::InvalidConfig(format!(
                "{} is not a list endpoint",
                endpoint.path()
            )));
        }
        let page: ListPage = self.get_json(endpoint).await?;
        info!(
            endpoint = %endpoint.path(),
            count = page.results.len(),
            "Fetched reference list"
        );
        Ok(ExpectedList::from_results(page.results))
    }

    pub async fn discover(&self) -> E2eResult<ExpectedList> {
        self.fetch_list(TmdbEndpoint::Discover).await
    }

    pub async fn upcoming(&self) -> E2eResult<ExpectedList> {
        self.fetch_list(TmdbEndpoint::Upcoming).await
    }

    pub async fn trending_week(&self) -> E2eResult<ExpectedList> {
        self.fetch_list(TmdbEndpoint::TrendingWeek).await
    }

    pub async fn movie_detail(&self, id: u64) -> E2eResult<MovieDetail> {
        self.get_json(TmdbEndpoint::MovieDetail(id)).await
    }

    pub async fn movie_images(&self, id: u64) -> E2eResult<MovieImages> {
        self.get_json(TmdbEndpoint::MovieImages(id)).await
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: TmdbEndpoint) -> E2eResult<T> {
        let api_key = self.config.api_key()?;
        let path = endpoint.path();
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);

        debug!(url = %url, "GET (api_key redacted)");

        let response = self
            .http
            .get(&url)
            .query(&[("api_key", api_key)])
            .query(endpoint.params())
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let text = String::from_utf8_lossy(&body);
            return Err(E2eError::ApiStatus {
                endpoint: path,
                status: status.as_u16(),
                body: text.chars().take(200).collect(),
            });
        }

        serde_json::from_slice(&body).map_err(|e| E2eError::MalformedResponse {
            endpoint: path,
            reason: e.to_string(),
        })
    }
}
