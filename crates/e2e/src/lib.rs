//! Movies front end E2E test framework
//!
//! This crate checks a movie-discovery front end against live TMDB data:
//! - Fetches reference data from TMDB before each view group runs
//! - Sorts list data by popularity and normalizes whitespace in titles
//! - Drives the browser through Playwright and captures a page snapshot
//! - Compares rendered cards, chips and controls to the reference by position
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    E2E Test Runner (Rust)                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  TestRunner                                                 │
//! │    ├── start() -> ServerHandle? + PageDriver                │
//! │    └── run_group(group) for each ViewGroup, in order        │
//! │          ├── load_context(TmdbClient) -> GroupContext       │
//! │          │     (setup failure blocks every case)            │
//! │          └── for each CaseKind:                             │
//! │                capture(path) -> PageSnapshot                │
//! │                evaluate(ctx, snapshot) -> [AssertionFailure]│
//! ├─────────────────────────────────────────────────────────────┤
//! │  ViewGroup                                                  │
//! │    Discover · MovieDetails · Favorites · Upcoming           │
//! │    MustWatch · Trending                                     │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod assertions;
pub mod config;
pub mod error;
pub mod playwright;
pub mod reference;
pub mod runner;
pub mod selectors;
pub mod server;
pub mod snapshot;
pub mod suite;
pub mod tmdb;

pub use error::{E2eError, E2eResult};
pub use reference::{normalize, ExpectedList, GroupContext};
pub use runner::TestRunner;
pub use suite::ViewGroup;
pub use tmdb::{MovieRecord, TmdbClient};
