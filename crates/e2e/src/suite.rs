//! View groups and the cases each one runs
//!
//! Groups run in a fixed order. Each group first builds its
//! [`GroupContext`] from TMDB, then every case visits the group's page and
//! checks the captured snapshot against that context.

use serde::{Deserialize, Serialize};

use crate::assertions::{self, AssertionFailure, Checks};
use crate::error::{E2eError, E2eResult};
use crate::reference::GroupContext;
use crate::selectors::Selectors;
use crate::snapshot::PageSnapshot;
use crate::tmdb::TmdbClient;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ViewGroup {
    Discover,
    MovieDetails,
    Favorites,
    Upcoming,
    MustWatch,
    Trending,
}

/// Aria label of the per-card toggle on most list pages
pub const ADD_TO_FAVORITES: &str = "add to favorites";
/// Aria label of the per-card toggle on the upcoming page
pub const ADD_TO_MUST_WATCH: &str = "add to must watch";

impl ViewGroup {
    /// All groups in execution order
    pub const ALL: [ViewGroup; 6] = [
        ViewGroup::Discover,
        ViewGroup::MovieDetails,
        ViewGroup::Favorites,
        ViewGroup::Upcoming,
        ViewGroup::MustWatch,
        ViewGroup::Trending,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ViewGroup::Discover => "The Discover Movies page",
            ViewGroup::MovieDetails => "The Movie Details page",
            ViewGroup::Favorites => "The Favorites page",
            ViewGroup::Upcoming => "The Upcoming Movies page",
            ViewGroup::MustWatch => "The Must Watch page",
            ViewGroup::Trending => "The Trending page",
        }
    }

    /// The `h3` the page renders as its header. The details page is titled
    /// by the movie, so it has none.
    pub fn heading(self) -> Option<&'static str> {
        match self {
            ViewGroup::Discover => Some("Discover Movies"),
            ViewGroup::MovieDetails => None,
            ViewGroup::Favorites => Some("Favorite Movies"),
            ViewGroup::Upcoming => Some("Upcoming Movies"),
            ViewGroup::MustWatch => Some("Your Must-Watch Movies"),
            ViewGroup::Trending => Some("Trending This Week"),
        }
    }

    /// Card toggle label on list pages with reference data
    pub fn toggle_label(self) -> &'static str {
        match self {
            ViewGroup::Upcoming => ADD_TO_MUST_WATCH,
            _ => ADD_TO_FAVORITES,
        }
    }

    /// Path to visit; the details page needs the context's first movie
    pub fn path(self, ctx: &GroupContext) -> E2eResult<String> {
        Ok(match self {
            ViewGroup::Discover => "/".to_string(),
            ViewGroup::MovieDetails => format!("/movies/{}", ctx.detail()?.movie.id),
            ViewGroup::Favorites => "/movies/favorites".to_string(),
            ViewGroup::Upcoming => "/movies/upcoming".to_string(),
            ViewGroup::MustWatch => "/movies/mustwatch".to_string(),
            ViewGroup::Trending => "/movies/trending/week".to_string(),
        })
    }

    pub fn cases(self) -> &'static [CaseKind] {
        match self {
            ViewGroup::Discover | ViewGroup::Upcoming => &[
                CaseKind::HeaderAndCount,
                CaseKind::FilterCard,
                CaseKind::ListView,
            ],
            ViewGroup::MovieDetails => &[
                CaseKind::DetailOverview,
                CaseKind::PosterCarousel,
                CaseKind::DetailFacts,
                CaseKind::ProductionCountries,
                CaseKind::ReviewsButton,
            ],
            ViewGroup::Favorites | ViewGroup::MustWatch => {
                &[CaseKind::Header, CaseKind::FilterCard]
            }
            ViewGroup::Trending => &[CaseKind::Header, CaseKind::FilterCard, CaseKind::ListView],
        }
    }

    /// Fetch this group's reference data. Favorites and Must-Watch are local
    /// views and fetch nothing.
    pub async fn load_context(self, client: &TmdbClient) -> E2eResult<GroupContext> {
        let name = self.name();
        match self {
            ViewGroup::Discover => Ok(GroupContext::with_movies(name, client.discover().await?)),
            ViewGroup::Upcoming => Ok(GroupContext::with_movies(name, client.upcoming().await?)),
            ViewGroup::Trending => {
                Ok(GroupContext::with_movies(name, client.trending_week().await?))
            }
            ViewGroup::MovieDetails => {
                let movies = client.discover().await?;
                let id = movies
                    .first()
                    .map(|m| m.id)
                    .ok_or_else(|| E2eError::MalformedResponse {
                        endpoint: "discover/movie".to_string(),
                        reason: "empty results".to_string(),
                    })?;
                let detail = client.movie_detail(id).await?;
                let images = client.movie_images(id).await?;
                Ok(GroupContext::with_detail(name, movies, detail, images))
            }
            ViewGroup::Favorites | ViewGroup::MustWatch => Ok(GroupContext::empty(name)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseKind {
    HeaderAndCount,
    Header,
    FilterCard,
    ListView,
    DetailOverview,
    PosterCarousel,
    DetailFacts,
    ProductionCountries,
    ReviewsButton,
}

/// Options that shape the checks but not the reference data
#[derive(Debug, Clone, Copy)]
pub struct CaseOptions<'a> {
    pub selectors: &'a Selectors,
    /// Cards rendered on first load of a list page
    pub page_size: usize,
}

impl CaseKind {
    pub fn title(self, page_size: usize) -> String {
        match self {
            CaseKind::HeaderAndCount => {
                format!("displays the page header and {} movies on first load", page_size)
            }
            CaseKind::Header => "displays the page header".to_string(),
            CaseKind::FilterCard => {
                "displays the 'Filter Movies' card and all relevant filter/sort fields".to_string()
            }
            CaseKind::ListView => {
                "displays the correct movie information and sorts movies by popularity".to_string()
            }
            CaseKind::DetailOverview => "displays the movie title, overview and genres".to_string(),
            CaseKind::PosterCarousel => "displays the movie posters in a carousel".to_string(),
            CaseKind::DetailFacts => {
                "displays the movie runtime, revenue, vote, and release date".to_string()
            }
            CaseKind::ProductionCountries => {
                "displays the production countries and view cast/crew buttons".to_string()
            }
            CaseKind::ReviewsButton => "displays the reviews button".to_string(),
        }
    }

    /// Run this case's checks against one captured page
    pub fn evaluate(
        self,
        group: ViewGroup,
        ctx: &GroupContext,
        page: &PageSnapshot,
        options: CaseOptions<'_>,
    ) -> E2eResult<Vec<AssertionFailure>> {
        let sel = options.selectors;
        let mut checks = Checks::new();

        match self {
            CaseKind::HeaderAndCount | CaseKind::Header => {
                if let Some(heading) = group.heading() {
                    assertions::assert_heading(&mut checks, sel, &page.headings, heading);
                }
                if self == CaseKind::HeaderAndCount {
                    assertions::assert_card_count(&mut checks, sel, &page.cards, options.page_size);
                }
            }
            CaseKind::FilterCard => {
                assertions::assert_filter_card(
                    &mut checks,
                    sel,
                    page.filter.as_ref(),
                    group == ViewGroup::Trending,
                );
            }
            CaseKind::ListView => {
                assertions::assert_list_view(
                    &mut checks,
                    sel,
                    ctx.movies()?,
                    &page.cards,
                    group.toggle_label(),
                );
            }
            CaseKind::DetailOverview => {
                assertions::assert_detail_overview(
                    &mut checks,
                    sel,
                    ctx.detail()?,
                    &page.headings,
                    &page.detail,
                );
            }
            CaseKind::PosterCarousel => {
                assertions::assert_poster_carousel(&mut checks, sel, ctx.images()?, &page.detail);
            }
            CaseKind::DetailFacts => {
                assertions::assert_detail_facts(&mut checks, sel, ctx.detail()?, &page.detail);
            }
            CaseKind::ProductionCountries => {
                assertions::assert_production_countries(
                    &mut checks,
                    sel,
                    ctx.detail()?,
                    &page.detail,
                );
            }
            CaseKind::ReviewsButton => {
                assertions::assert_reviews_button(&mut checks, sel, &page.detail);
            }
        }

        Ok(checks.into_failures())
    }
}
