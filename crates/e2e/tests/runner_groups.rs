//! Runner tests with a stubbed TMDB API and a scripted page driver

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use movies_e2e::config::TmdbConfig;
use movies_e2e::playwright::PageDriver;
use movies_e2e::runner::RunnerConfig;
use movies_e2e::selectors::{SelectorProfile, Selectors};
use movies_e2e::snapshot::{
    CardActions, CardsSnapshot, DetailSnapshot, ElementSnapshot, FilterCardSnapshot, PageSnapshot,
};
use movies_e2e::{E2eError, E2eResult, TestRunner, ViewGroup};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Serves canned snapshots per path and records every visit
#[derive(Clone, Default)]
struct ScriptedDriver {
    pages: Arc<HashMap<String, PageSnapshot>>,
    visits: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl PageDriver for ScriptedDriver {
    async fn capture(&self, path: &str, _selectors: &Selectors) -> E2eResult<PageSnapshot> {
        self.visits.lock().unwrap().push(path.to_string());
        self.pages
            .get(path)
            .cloned()
            .ok_or_else(|| E2eError::Playwright(format!("no page for {}", path)))
    }
}

struct Film {
    id: u64,
    title: &'static str,
    popularity: f64,
}

const FILMS: [Film; 7] = [
    Film { id: 11, title: "Star  Wars", popularity: 40.0 },
    Film { id: 12, title: "Finding Nemo", popularity: 95.5 },
    Film { id: 13, title: "Forrest Gump", popularity: 12.25 },
    Film { id: 14, title: "American Beauty", popularity: 60.0 },
    Film { id: 15, title: "Citizen Kane", popularity: 3.0 },
    Film { id: 16, title: "Dancer in the Dark", popularity: 77.7 },
    Film { id: 17, title: "The Fifth Element", popularity: 20.0 },
];

fn results_json() -> serde_json::Value {
    json!({
        "page": 1,
        "results": FILMS.iter().map(|f| json!({
            "id": f.id,
            "title": f.title,
            "popularity": f.popularity,
            "poster_path": format!("/{}.jpg", f.id),
            "release_date": format!("2001-01-{}", f.id),
            "vote_average": 7.5
        })).collect::<Vec<_>>()
    })
}

/// The discover page as a correct front end renders it
fn discover_page() -> PageSnapshot {
    let mut films: Vec<&Film> = FILMS.iter().collect();
    films.sort_by(|a, b| b.popularity.partial_cmp(&a.popularity).unwrap());

    PageSnapshot {
        url: "/".to_string(),
        headings: vec!["Discover Movies".to_string()],
        cards: CardsSnapshot {
            header_count: films.len(),
            titles: films.iter().map(|f| Some(f.title.to_string())).collect(),
            media_styles: films
                .iter()
                .map(|f| {
                    Some(format!(
                        "background-image: url(\"https://image.tmdb.org/t/p/w500//{}.jpg\");",
                        f.id
                    ))
                })
                .collect(),
            contents: films
                .iter()
                .map(|f| format!("2001-01-{} 7.5", f.id))
                .collect(),
            actions: films
                .iter()
                .map(|f| CardActions {
                    button_aria_label: Some("add to favorites".to_string()),
                    link_href: Some(format!("/movies/{}", f.id)),
                    link_text: "More Info ...".to_string(),
                })
                .collect(),
        },
        filter: Some(FilterCardSnapshot {
            title: Some("Filter Movies".to_string()),
            search: Some(ElementSnapshot::default()),
            genre: Some(ElementSnapshot::default()),
            sort: Some(ElementSnapshot {
                class_name: String::new(),
                text: "Popularity".to_string(),
            }),
            time: None,
        }),
        ..Default::default()
    }
}

async fn mount_discover(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_json()))
        .mount(server)
        .await;
}

/// Detail and images for film 12, the most popular of `FILMS`
async fn mount_detail(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/movie/12"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12,
            "title": "Finding  Nemo",
            "overview": "A clownfish   searches the ocean.",
            "popularity": 95.5,
            "poster_path": "/12.jpg",
            "release_date": "2003-05-30",
            "vote_average": 7.8,
            "genres": [{ "id": 16, "name": "Animation" }, { "id": 10751, "name": "Family" }],
            "production_countries": [{ "iso_3166_1": "US", "name": "United States of America" }],
            "runtime": 100,
            "revenue": 940335536
        })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/12/images"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 12,
            "posters": [{ "file_path": "/n1.jpg" }, { "file_path": "/n2.jpg" }]
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// The details page for film 12, rendered verbatim from TMDB's fields
fn nemo_page() -> PageSnapshot {
    let strings = |items: &[&str]| items.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    PageSnapshot {
        url: "/movies/12".to_string(),
        headings: strings(&["Finding  Nemo", "Overview"]),
        detail: DetailSnapshot {
            paragraphs: strings(&["A clownfish   searches the ocean."]),
            genre_chips: Some(strings(&["Genres", "Animation", "Family"])),
            fact_chips: Some(strings(&[
                "100 min.",
                "940,335,536",
                "7.8 (18000)",
                "Released: 2003-05-30",
            ])),
            country_chips: Some(strings(&["Production Countries", "United States of America"])),
            poster_srcs: Some(vec![
                Some("https://image.tmdb.org/t/p/w500//n1.jpg".to_string()),
                Some("https://image.tmdb.org/t/p/w500//n2.jpg".to_string()),
            ]),
            buttons: strings(&["View Cast", "View Crew"]),
            reviews_buttons: strings(&["Reviews"]),
        },
        ..Default::default()
    }
}

fn runner(tmdb_uri: String, api_key: Option<&str>, driver: ScriptedDriver) -> TestRunner {
    let config = RunnerConfig {
        tmdb: TmdbConfig {
            api_key: api_key.map(String::from),
            base_url: tmdb_uri,
            timeout_secs: 5,
        },
        selectors: SelectorProfile::TestIds,
        ..Default::default()
    };
    TestRunner::with_config(config)
        .unwrap()
        .with_driver(Box::new(driver))
}

#[tokio::test]
async fn test_discover_group_passes_against_matching_page() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_json()))
        .mount(&server)
        .await;

    let mut pages = HashMap::new();
    pages.insert("/".to_string(), discover_page());
    let driver = ScriptedDriver {
        pages: Arc::new(pages),
        ..Default::default()
    };

    let mut runner = runner(server.uri(), Some("k"), driver.clone());
    let suite = runner.run_groups(&[ViewGroup::Discover]).await.unwrap();

    assert_eq!(suite.total, 3);
    assert_eq!(suite.passed, 3, "{:#?}", suite.results);
    assert!(suite.success());
    // One visit per case.
    assert_eq!(driver.visits.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn test_misordered_page_fails_only_the_data_case() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/discover/movie"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_json()))
        .mount(&server)
        .await;

    let mut page = discover_page();
    page.cards.titles.reverse();
    let mut pages = HashMap::new();
    pages.insert("/".to_string(), page);
    let driver = ScriptedDriver {
        pages: Arc::new(pages),
        ..Default::default()
    };

    let mut runner = runner(server.uri(), Some("k"), driver);
    let suite = runner.run_groups(&[ViewGroup::Discover]).await.unwrap();

    assert_eq!(suite.passed, 2);
    assert_eq!(suite.failed, 1);
    let failed = suite.results.iter().find(|r| !r.success).unwrap();
    assert_eq!(
        failed.name,
        "displays the correct movie information and sorts movies by popularity"
    );
    assert!(!failed.blocked);
    assert!(!failed.failures.is_empty());
}

#[tokio::test]
async fn test_details_group_visits_most_popular_movie() {
    let server = MockServer::start().await;
    mount_discover(&server).await;
    mount_detail(&server).await;

    let mut pages = HashMap::new();
    pages.insert("/movies/12".to_string(), nemo_page());
    let driver = ScriptedDriver {
        pages: Arc::new(pages),
        ..Default::default()
    };

    let mut runner = runner(server.uri(), Some("k"), driver.clone());
    let suite = runner.run_groups(&[ViewGroup::MovieDetails]).await.unwrap();

    assert_eq!(suite.total, 5);
    assert_eq!(suite.passed, 5, "{:#?}", suite.results);
    assert_eq!(*driver.visits.lock().unwrap(), vec!["/movies/12".to_string(); 5]);
}

#[tokio::test]
async fn test_details_group_fails_on_empty_carousel() {
    let server = MockServer::start().await;
    mount_discover(&server).await;
    mount_detail(&server).await;

    let mut page = nemo_page();
    page.detail.poster_srcs = Some(Vec::new());
    let mut pages = HashMap::new();
    pages.insert("/movies/12".to_string(), page);
    let driver = ScriptedDriver {
        pages: Arc::new(pages),
        ..Default::default()
    };

    let mut runner = runner(server.uri(), Some("k"), driver);
    let suite = runner.run_groups(&[ViewGroup::MovieDetails]).await.unwrap();

    assert_eq!(suite.passed, 4);
    let failed = suite.results.iter().find(|r| !r.success).unwrap();
    assert_eq!(failed.name, "displays the movie posters in a carousel");
}

#[tokio::test]
async fn test_trending_page_without_cards_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/trending/movie/week"))
        .respond_with(ResponseTemplate::new(200).set_body_json(results_json()))
        .mount(&server)
        .await;

    let mut page = discover_page();
    page.headings = vec!["Trending This Week".to_string()];
    page.cards = CardsSnapshot::default();
    let mut pages = HashMap::new();
    pages.insert("/movies/trending/week".to_string(), page);
    let driver = ScriptedDriver {
        pages: Arc::new(pages),
        ..Default::default()
    };

    let mut runner = runner(server.uri(), Some("k"), driver);
    let suite = runner.run_groups(&[ViewGroup::Trending]).await.unwrap();

    let list_case = suite
        .results
        .iter()
        .find(|r| r.name == "displays the correct movie information and sorts movies by popularity")
        .unwrap();
    assert!(!list_case.success);
    assert!(!list_case.failures.is_empty());
}

#[tokio::test]
async fn test_missing_key_blocks_group_without_visiting() {
    let server = MockServer::start().await;
    let driver = ScriptedDriver::default();

    let mut runner = runner(server.uri(), None, driver.clone());
    let suite = runner
        .run_groups(&[ViewGroup::Upcoming, ViewGroup::MovieDetails])
        .await
        .unwrap();

    assert_eq!(suite.total, 8);
    assert_eq!(suite.failed, 8);
    assert_eq!(suite.blocked, 8);
    assert!(suite
        .results
        .iter()
        .all(|r| r.error.as_deref().unwrap_or("").starts_with("setup failed: TMDB API key missing")));
    assert!(driver.visits.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_local_views_run_without_reference_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let mut favorites = discover_page();
    favorites.headings = vec!["Favorite Movies".to_string()];
    let mut pages = HashMap::new();
    pages.insert("/movies/favorites".to_string(), favorites);
    let driver = ScriptedDriver {
        pages: Arc::new(pages),
        ..Default::default()
    };

    let mut runner = runner(server.uri(), None, driver.clone());
    let suite = runner.run_groups(&[ViewGroup::Favorites]).await.unwrap();

    assert_eq!(suite.total, 2);
    assert!(suite.success(), "{:#?}", suite.results);
    assert_eq!(
        *driver.visits.lock().unwrap(),
        vec!["/movies/favorites".to_string(), "/movies/favorites".to_string()]
    );
}

#[tokio::test]
async fn test_results_report_is_written() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();

    let config = RunnerConfig {
        tmdb: TmdbConfig {
            api_key: None,
            base_url: server.uri(),
            timeout_secs: 5,
        },
        output_dir: dir.path().to_path_buf(),
        ..Default::default()
    };
    let mut runner = TestRunner::with_config(config)
        .unwrap()
        .with_driver(Box::new(ScriptedDriver::default()));
    let suite = runner.run_groups(&[ViewGroup::Trending]).await.unwrap();
    let path = runner.write_results(&suite).unwrap();

    let report: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
    assert_eq!(report["total"], 3);
    assert_eq!(report["blocked"], 3);
    assert_eq!(report["results"][0]["group"], "The Trending page");
}
