//! Expected-state model built from TMDB responses
//!
//! The UI is compared against this model by ordinal position, so the order
//! produced here is load-bearing.

use std::cmp::Ordering;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{E2eError, E2eResult};
use crate::tmdb::{MovieDetail, MovieImages, MovieRecord};

static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s\s+").expect("static regex")
});

/// Three-way popularity comparator, most popular first.
///
/// Equal (or incomparable) values compare as `Equal`; no further tiebreak is
/// applied.
pub fn popularity_order(a: &MovieRecord, b: &MovieRecord) -> Ordering {
    if a.popularity < b.popularity {
        Ordering::Greater
    } else if a.popularity > b.popularity {
        Ordering::Less
    } else {
        Ordering::Equal
    }
}

/// Sort records by popularity, descending. The sort is stable, so ties keep
/// the order TMDB returned them in.
pub fn sort_by_popularity(mut records: Vec<MovieRecord>) -> Vec<MovieRecord> {
    records.sort_by(popularity_order);
    records
}

/// Collapse every run of two or more whitespace characters into one space
pub fn normalize(s: &str) -> String {
    WHITESPACE_RUN.replace_all(s, " ").into_owned()
}

/// Substring match with whitespace runs collapsed on both sides. Rendered
/// text comes from `textContent`, which keeps TMDB's doubled spaces.
pub fn contains_normalized(rendered: &str, expected: &str) -> bool {
    normalize(rendered).contains(&normalize(expected))
}

/// Format an integer with `,` thousands separators (en-US grouping)
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Render a number the way the front end prints it: integral values without
/// a fractional part, everything else in shortest round-trip form.
pub fn display_number(value: f64) -> String {
    format!("{}", value)
}

/// Movie records sorted by popularity. Immutable once built.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpectedList {
    movies: Vec<MovieRecord>,
}

impl ExpectedList {
    /// Sort a raw result set into the expected order
    pub fn from_results(results: Vec<MovieRecord>) -> Self {
        Self {
            movies: sort_by_popularity(results),
        }
    }

    pub fn get(&self, index: usize) -> Option<&MovieRecord> {
        self.movies.get(index)
    }

    pub fn first(&self) -> Option<&MovieRecord> {
        self.movies.first()
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MovieRecord> {
        self.movies.iter()
    }

    pub fn as_slice(&self) -> &[MovieRecord] {
        &self.movies
    }
}

/// Reference data for one view group.
///
/// Built once before the group's cases run, passed by reference into each
/// case, and dropped when the group finishes.
#[derive(Debug, Clone, Default)]
pub struct GroupContext {
    group: String,
    movies: Option<ExpectedList>,
    detail: Option<MovieDetail>,
    images: Option<MovieImages>,
}

impl GroupContext {
    /// A context for groups that fetch nothing
    pub fn empty(group: &str) -> Self {
        Self {
            group: group.to_string(),
            ..Default::default()
        }
    }

    pub fn with_movies(group: &str, movies: ExpectedList) -> Self {
        Self {
            movies: Some(movies),
            ..Self::empty(group)
        }
    }

    pub fn with_detail(
        group: &str,
        movies: ExpectedList,
        detail: MovieDetail,
        images: MovieImages,
    ) -> Self {
        Self {
            group: group.to_string(),
            movies: Some(movies),
            detail: Some(detail),
            images: Some(images),
        }
    }

    pub fn movies(&self) -> E2eResult<&ExpectedList> {
        self.movies
            .as_ref()
            .ok_or_else(|| E2eError::MissingReference(self.group.clone()))
    }

    pub fn detail(&self) -> E2eResult<&MovieDetail> {
        self.detail
            .as_ref()
            .ok_or_else(|| E2eError::MissingReference(self.group.clone()))
    }

    pub fn images(&self) -> E2eResult<&MovieImages> {
        self.images
            .as_ref()
            .ok_or_else(|| E2eError::MissingReference(self.group.clone()))
    }
}
