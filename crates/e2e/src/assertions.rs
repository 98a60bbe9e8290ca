//! Comparisons between reference data and captured page state
//!
//! Every check appends to a [`Checks`] accumulator instead of stopping, so a
//! case reports all of its mismatches at once. Cards are matched to reference
//! records purely by position.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::reference::{contains_normalized, display_number, group_thousands, normalize, ExpectedList};
use crate::selectors::{describe_scope, Selectors};
use crate::snapshot::{CardsSnapshot, DetailSnapshot, ElementSnapshot, FilterCardSnapshot};
use crate::tmdb::{poster_url, MovieDetail, MovieImages, Named};

/// Label on every card's detail link
pub const MORE_INFO_LABEL: &str = "More Info ...";

/// A single mismatch between expected and observed state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssertionFailure {
    pub selector: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for AssertionFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {:?}",
            self.selector, self.expected, self.actual
        )
    }
}

/// Collects failures for one test case
#[derive(Debug, Default)]
pub struct Checks {
    failures: Vec<AssertionFailure>,
}

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&mut self, selector: impl Into<String>, expected: impl Into<String>, actual: impl Into<String>) {
        self.failures.push(AssertionFailure {
            selector: selector.into(),
            expected: expected.into(),
            actual: actual.into(),
        });
    }

    /// `actual` must contain `needle` verbatim
    pub fn contains(&mut self, selector: &str, actual: &str, needle: &str) {
        if !actual.contains(needle) {
            self.fail(selector, format!("to contain {:?}", needle), actual);
        }
    }

    /// `actual` must contain the whitespace-normalized `expected`
    pub fn contains_normalized(&mut self, selector: &str, actual: &str, expected: &str) {
        if !contains_normalized(actual, expected) {
            self.fail(selector, format!("to contain {:?} (normalized)", expected), actual);
        }
    }

    pub fn equals(&mut self, selector: &str, actual: Option<&str>, expected: &str) {
        if actual != Some(expected) {
            self.fail(selector, format!("{:?}", expected), actual.unwrap_or("<missing>"));
        }
    }

    /// At least one of `candidates` contains `needle` once whitespace runs are
    /// collapsed on both sides
    pub fn any_contains_normalized(&mut self, selector: &str, candidates: &[String], needle: &str) {
        if !candidates.iter().any(|c| contains_normalized(c, needle)) {
            self.fail(
                selector,
                format!("an element containing {:?} (normalized)", normalize(needle)),
                candidates.join(" | "),
            );
        }
    }

    /// At least one of `candidates` contains `needle`
    pub fn any_contains(&mut self, selector: &str, candidates: &[String], needle: &str, ignore_case: bool) {
        let found = if ignore_case {
            let needle = needle.to_lowercase();
            candidates.iter().any(|c| c.to_lowercase().contains(&needle))
        } else {
            candidates.iter().any(|c| c.contains(needle))
        };
        if !found {
            self.fail(
                selector,
                format!("an element containing {:?}", needle),
                candidates.join(" | "),
            );
        }
    }

    /// Element's class list must include every class in `expected`
    pub fn has_classes(&mut self, selector: &str, element: Option<&ElementSnapshot>, expected: &str) {
        match element {
            Some(el) => {
                let classes: Vec<&str> = el.class_name.split_whitespace().collect();
                let missing: Vec<&str> = expected
                    .split_whitespace()
                    .filter(|c| !classes.contains(c))
                    .collect();
                if !missing.is_empty() {
                    self.fail(
                        selector,
                        format!("class {:?}", expected),
                        el.class_name.clone(),
                    );
                }
            }
            None => self.fail(selector, "element to exist", "<missing>"),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn into_failures(self) -> Vec<AssertionFailure> {
        self.failures
    }
}

/// Some page heading contains `expected`
pub fn assert_heading(checks: &mut Checks, selectors: &Selectors, headings: &[String], expected: &str) {
    checks.any_contains(selectors.heading, headings, expected, false);
}

/// Exactly `expected` card headers are rendered
pub fn assert_card_count(checks: &mut Checks, selectors: &Selectors, cards: &CardsSnapshot, expected: usize) {
    if cards.header_count != expected {
        checks.fail(
            selectors.card_header,
            format!("length {}", expected),
            cards.header_count.to_string(),
        );
    }
}

/// The "Filter Movies" card with its search, genre and sort controls. With
/// `with_time_select` the trending time control must read "This Week".
pub fn assert_filter_card(
    checks: &mut Checks,
    selectors: &Selectors,
    filter: Option<&FilterCardSnapshot>,
    with_time_select: bool,
) {
    let scope = describe_scope(selectors.filter_card);
    let Some(filter) = filter else {
        checks.fail(scope, "filter card to exist", "<missing>");
        return;
    };

    let title = filter.title.as_deref().unwrap_or("");
    checks.contains(&format!("{} {}", scope, selectors.filter_title), title, "Filter Movies");

    let sort_selector = format!("{} {}", scope, selectors.sort_select);
    let time_selector = format!("{} {}", scope, selectors.time_select);

    if let Some(classes) = selectors.filter_classes {
        checks.has_classes(
            &format!("{} {}", scope, selectors.search_input),
            filter.search.as_ref(),
            classes.search,
        );
        checks.has_classes(
            &format!("{} {}", scope, selectors.genre_select),
            filter.genre.as_ref(),
            classes.genre,
        );
        checks.has_classes(&sort_selector, filter.sort.as_ref(), classes.select);
        if with_time_select {
            checks.has_classes(&time_selector, filter.time.as_ref(), classes.select);
        }
    } else {
        for (selector, element) in [
            (selectors.search_input, &filter.search),
            (selectors.genre_select, &filter.genre),
        ] {
            if element.is_none() {
                checks.fail(format!("{} {}", scope, selector), "element to exist", "<missing>");
            }
        }
    }

    match &filter.sort {
        Some(sort) => checks.contains(&sort_selector, &sort.text, "Popularity"),
        None => checks.fail(&sort_selector, "element to exist", "<missing>"),
    }

    if with_time_select {
        match &filter.time {
            Some(time) => checks.contains(&time_selector, &time.text, "This Week"),
            None => checks.fail(&time_selector, "element to exist", "<missing>"),
        }
    }
}

/// AssertListView: every rendered card matches the reference record at the
/// same index. A card with no counterpart fails as out of range, and so does
/// a page with no cards or with card parts of differing counts.
pub fn assert_list_view(
    checks: &mut Checks,
    selectors: &Selectors,
    expected: &ExpectedList,
    cards: &CardsSnapshot,
    toggle_label: &str,
) {
    let parts = [
        (selectors.card_title, cards.titles.len()),
        (selectors.card_media, cards.media_styles.len()),
        (selectors.card_content, cards.contents.len()),
        (selectors.card_actions, cards.actions.len()),
    ];
    for (selector, count) in parts {
        if count == 0 {
            checks.fail(selector, "at least one card", "0 elements");
        }
    }
    if parts.iter().any(|(_, count)| *count != parts[0].1) {
        let counts: Vec<String> = parts
            .iter()
            .map(|(selector, count)| format!("{}={}", selector, count))
            .collect();
        checks.fail(selectors.card_header, "one title, media, content and actions per card", counts.join(" "));
    }

    let out_of_range = |checks: &mut Checks, selector: &str, index: usize| {
        checks.fail(
            format!("{}:eq({})", selector, index),
            format!("a reference record at index {}", index),
            format!("only {} reference records", expected.len()),
        );
    };

    for (index, title) in cards.titles.iter().enumerate() {
        let selector = format!("{}:eq({}) {}", selectors.card_title, index, selectors.card_title_text);
        match expected.get(index) {
            Some(movie) => match title {
                Some(text) => checks.contains_normalized(&selector, text, &movie.title),
                None => checks.fail(selector, format!("title {:?}", movie.title), "<missing>"),
            },
            None => out_of_range(checks, selectors.card_title, index),
        }
    }

    for (index, style) in cards.media_styles.iter().enumerate() {
        let selector = format!("{}:eq({})", selectors.card_media, index);
        match expected.get(index) {
            Some(movie) => {
                let want = format!("background-image: url(\"{}\");", movie.poster_url());
                checks.equals(&format!("{}[style]", selector), style.as_deref(), &want);
            }
            None => out_of_range(checks, selectors.card_media, index),
        }
    }

    for (index, content) in cards.contents.iter().enumerate() {
        let selector = format!("{}:eq({})", selectors.card_content, index);
        match expected.get(index) {
            Some(movie) => {
                checks.contains(&selector, content, &movie.release_date);
                checks.contains(&selector, content, &display_number(movie.vote_average));
            }
            None => out_of_range(checks, selectors.card_content, index),
        }
    }

    for (index, actions) in cards.actions.iter().enumerate() {
        let selector = format!("{}:eq({})", selectors.card_actions, index);
        match expected.get(index) {
            Some(movie) => {
                checks.equals(
                    &format!("{} button[aria-label]", selector),
                    actions.button_aria_label.as_deref(),
                    toggle_label,
                );
                checks.equals(
                    &format!("{} a[href]", selector),
                    actions.link_href.as_deref(),
                    &format!("/movies/{}", movie.id),
                );
                checks.contains(&format!("{} a", selector), &actions.link_text, MORE_INFO_LABEL);
            }
            None => out_of_range(checks, selectors.card_actions, index),
        }
    }
}

/// Chip labels in a region: the header label followed by each name, in order
pub fn assert_chip_labels(
    checks: &mut Checks,
    selector: &str,
    header: &str,
    names: &[Named],
    chips: Option<&[String]>,
) {
    let Some(chips) = chips else {
        checks.fail(selector, "chip region to exist", "<missing>");
        return;
    };

    let labels: Vec<&str> = std::iter::once(header)
        .chain(names.iter().map(|n| n.name.as_str()))
        .collect();

    for (index, chip) in chips.iter().enumerate() {
        let chip_selector = format!("{} span:eq({})", selector, index);
        match labels.get(index) {
            Some(label) => checks.contains(&chip_selector, chip, label),
            None => checks.fail(chip_selector, "no chip at this index", chip.clone()),
        }
    }

    for (index, label) in labels.iter().enumerate().skip(chips.len()) {
        checks.fail(
            format!("{} span:eq({})", selector, index),
            format!("chip {:?}", label),
            "<missing>",
        );
    }
}

/// Title and overview (normalized), the "Overview" heading, and genre chips
pub fn assert_detail_overview(
    checks: &mut Checks,
    selectors: &Selectors,
    detail: &MovieDetail,
    headings: &[String],
    page: &DetailSnapshot,
) {
    checks.any_contains_normalized(selectors.heading, headings, &detail.movie.title);
    checks.any_contains(selectors.heading, headings, "Overview", false);
    checks.any_contains_normalized(selectors.paragraph, &page.paragraphs, &detail.movie.overview);

    assert_chip_labels(
        checks,
        &describe_scope(selectors.genre_chips),
        "Genres",
        &detail.genres,
        page.genre_chips.as_deref(),
    );
}

/// Each carousel image shows the poster at the same index
pub fn assert_poster_carousel(
    checks: &mut Checks,
    selectors: &Selectors,
    images: &MovieImages,
    page: &DetailSnapshot,
) {
    let scope = describe_scope(selectors.poster_carousel);
    let Some(srcs) = &page.poster_srcs else {
        checks.fail(scope, "poster carousel to exist", "<missing>");
        return;
    };
    if srcs.is_empty() {
        checks.fail(
            format!("{} {}", scope, selectors.poster_image),
            "at least one poster",
            "0 elements",
        );
    }

    for (index, src) in srcs.iter().enumerate() {
        let selector = format!("{} {}:eq({})[src]", scope, selectors.poster_image, index);
        match images.posters.get(index) {
            Some(poster) => {
                checks.equals(&selector, src.as_deref(), &poster_url(Some(&poster.file_path)))
            }
            None => checks.fail(
                selector,
                format!("a reference poster at index {}", index),
                format!("only {} reference posters", images.posters.len()),
            ),
        }
    }
}

/// Runtime, grouped revenue, vote average and release date in the facts list
pub fn assert_detail_facts(checks: &mut Checks, selectors: &Selectors, detail: &MovieDetail, page: &DetailSnapshot) {
    let scope = format!("{} {}", describe_scope(selectors.fact_chips), selectors.chip_label);
    let Some(facts) = &page.fact_chips else {
        checks.fail(scope, "facts region to exist", "<missing>");
        return;
    };

    if let Some(runtime) = detail.runtime {
        checks.any_contains(&scope, facts, &runtime.to_string(), false);
    }
    checks.any_contains(&scope, facts, &group_thousands(detail.revenue), false);
    checks.any_contains(&scope, facts, &display_number(detail.movie.vote_average), false);
    checks.any_contains(&scope, facts, &detail.movie.release_date, false);
}

/// Production country chips plus the cast and crew buttons
pub fn assert_production_countries(
    checks: &mut Checks,
    selectors: &Selectors,
    detail: &MovieDetail,
    page: &DetailSnapshot,
) {
    assert_chip_labels(
        checks,
        &describe_scope(selectors.country_chips),
        "Production Countries",
        &detail.production_countries,
        page.country_chips.as_deref(),
    );
    checks.any_contains(selectors.button, &page.buttons, "View Cast", true);
    checks.any_contains(selectors.button, &page.buttons, "View Crew", true);
}

/// The floating "Reviews" button
pub fn assert_reviews_button(checks: &mut Checks, selectors: &Selectors, page: &DetailSnapshot) {
    checks.any_contains(selectors.reviews_button, &page.reviews_buttons, "Reviews", true);
}
