//! Selector profiles for locating elements in the rendered front end
//!
//! `TestIds` addresses elements through `data-testid` attributes that the
//! application attaches for testing. `MaterialUi` reproduces the class names
//! generated by the current Material UI version; those break whenever the
//! library changes its markup, so the class-list checks only run under it.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SelectorProfile {
    /// Stable `data-testid` hooks
    #[default]
    TestIds,
    /// Material UI generated class names
    MaterialUi,
}

/// One hop in a scoped lookup: `querySelectorAll(selector)[index]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Nth {
    pub selector: &'static str,
    pub index: usize,
}

const fn nth(selector: &'static str, index: usize) -> Nth {
    Nth { selector, index }
}

/// Class lists the filter card inputs must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterClasses {
    pub search: &'static str,
    pub genre: &'static str,
    pub select: &'static str,
}

/// Selectors handed to the extraction script. Scopes are chains of [`Nth`]
/// hops starting at `document`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selectors {
    pub heading: &'static str,

    pub card_header: &'static str,
    pub card_title: &'static str,
    pub card_title_text: &'static str,
    pub card_media: &'static str,
    pub card_content: &'static str,
    pub card_actions: &'static str,

    pub filter_card: &'static [Nth],
    pub filter_title: &'static str,
    pub search_input: &'static str,
    pub genre_select: &'static str,
    pub sort_select: &'static str,
    pub time_select: &'static str,

    pub genre_chips: &'static [Nth],
    pub fact_chips: &'static [Nth],
    pub country_chips: &'static [Nth],
    pub chip_label: &'static str,
    pub poster_carousel: &'static [Nth],
    pub poster_image: &'static str,
    pub paragraph: &'static str,
    pub button: &'static str,
    pub reviews_button: &'static str,

    #[serde(skip)]
    pub filter_classes: Option<FilterClasses>,
}

const MUI: Selectors = Selectors {
    heading: "h3",
    card_header: ".MuiCardHeader-root",
    card_title: ".MuiCardHeader-content",
    card_title_text: "p",
    card_media: ".MuiCardMedia-root",
    card_content: ".MuiCardContent-root",
    card_actions: ".MuiCardActions-root",
    filter_card: &[
        nth(".MuiGrid-root.MuiGrid-container", 1),
        nth(".MuiGrid-root.MuiGrid-item", 0),
    ],
    filter_title: "h1",
    search_input: "#filled-search",
    genre_select: "#genre-select",
    sort_select: "#sort-select",
    time_select: "#time-select",
    genre_chips: &[nth("ul", 0)],
    fact_chips: &[nth("ul", 1)],
    country_chips: &[nth("ul", 2)],
    chip_label: "span",
    poster_carousel: &[
        nth(".MuiGrid-root", 0),
        nth(".MuiGrid-root.MuiGrid-item", 0),
    ],
    poster_image: "div img",
    paragraph: "p",
    button: "button",
    reviews_button: "button.MuiButtonBase-root.MuiFab-root",
    filter_classes: Some(FilterClasses {
        search: "MuiInputBase-input MuiFilledInput-input MuiInputBase-inputTypeSearch",
        genre: "MuiInputBase-input MuiOutlinedInput-input MuiInputBase-inputAdornedEnd MuiAutocomplete-input MuiAutocomplete-inputFocused",
        select: "MuiSelect-select MuiSelect-outlined MuiInputBase-input MuiOutlinedInput-input",
    }),
};

const TEST_IDS: Selectors = Selectors {
    heading: "h3",
    card_header: "[data-testid='movie-card-header']",
    card_title: "[data-testid='movie-card-header']",
    card_title_text: "[data-testid='movie-card-title']",
    card_media: "[data-testid='movie-card-media']",
    card_content: "[data-testid='movie-card-content']",
    card_actions: "[data-testid='movie-card-actions']",
    filter_card: &[nth("[data-testid='filter-card']", 0)],
    filter_title: "[data-testid='filter-card-title']",
    search_input: "[data-testid='filter-search']",
    genre_select: "[data-testid='filter-genre']",
    sort_select: "[data-testid='filter-sort']",
    time_select: "[data-testid='filter-time']",
    genre_chips: &[nth("[data-testid='genre-chips']", 0)],
    fact_chips: &[nth("[data-testid='movie-facts']", 0)],
    country_chips: &[nth("[data-testid='country-chips']", 0)],
    chip_label: "[data-testid='chip-label']",
    poster_carousel: &[nth("[data-testid='poster-carousel']", 0)],
    poster_image: "img",
    paragraph: "p",
    button: "button",
    reviews_button: "[data-testid='reviews-button']",
    filter_classes: None,
};

impl SelectorProfile {
    pub fn selectors(self) -> &'static Selectors {
        match self {
            SelectorProfile::TestIds => &TEST_IDS,
            SelectorProfile::MaterialUi => &MUI,
        }
    }
}

/// Render a scope chain the way assertion messages name it,
/// e.g. `.MuiGrid-root.MuiGrid-container:eq(1) .MuiGrid-root.MuiGrid-item:eq(0)`
pub fn describe_scope(scope: &[Nth]) -> String {
    scope
        .iter()
        .map(|hop| format!("{}:eq({})", hop.selector, hop.index))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_mui_checks_classes() {
        assert!(SelectorProfile::MaterialUi.selectors().filter_classes.is_some());
        assert!(SelectorProfile::TestIds.selectors().filter_classes.is_none());
    }

    #[test]
    fn test_selectors_serialize_scopes() {
        let json = serde_json::to_value(SelectorProfile::MaterialUi.selectors()).unwrap();
        assert_eq!(json["filter_card"][0]["index"], 1);
        assert_eq!(json["fact_chips"][0]["selector"], "ul");
        assert!(json.get("filter_classes").is_none());
    }

    #[test]
    fn test_describe_scope() {
        let scope = SelectorProfile::MaterialUi.selectors().filter_card;
        assert_eq!(
            describe_scope(scope),
            ".MuiGrid-root.MuiGrid-container:eq(1) .MuiGrid-root.MuiGrid-item:eq(0)"
        );
    }
}
