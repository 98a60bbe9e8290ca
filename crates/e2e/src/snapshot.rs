//! Observed page state, extracted from the live DOM in one pass

use serde::{Deserialize, Serialize};

/// Line prefix the extraction script prints before the snapshot JSON
pub const SNAPSHOT_MARKER: &str = "__PAGE_SNAPSHOT__";

/// An element reduced to the parts the checks read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementSnapshot {
    #[serde(default)]
    pub class_name: String,
    #[serde(default)]
    pub text: String,
}

/// The action row under each movie card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardActions {
    #[serde(default)]
    pub button_aria_label: Option<String>,
    #[serde(default)]
    pub link_href: Option<String>,
    #[serde(default)]
    pub link_text: String,
}

/// Card collections, each in document order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardsSnapshot {
    #[serde(default)]
    pub header_count: usize,
    /// Text of the title element inside each card header; `None` when the
    /// header has no title element
    #[serde(default)]
    pub titles: Vec<Option<String>>,
    /// Raw `style` attribute of each media element
    #[serde(default)]
    pub media_styles: Vec<Option<String>>,
    #[serde(default)]
    pub contents: Vec<String>,
    #[serde(default)]
    pub actions: Vec<CardActions>,
}

/// The "Filter Movies" card
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCardSnapshot {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub search: Option<ElementSnapshot>,
    #[serde(default)]
    pub genre: Option<ElementSnapshot>,
    #[serde(default)]
    pub sort: Option<ElementSnapshot>,
    #[serde(default)]
    pub time: Option<ElementSnapshot>,
}

/// Regions of the movie details page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DetailSnapshot {
    #[serde(default)]
    pub paragraphs: Vec<String>,
    /// `None` when the chip region is not rendered at all
    #[serde(default)]
    pub genre_chips: Option<Vec<String>>,
    #[serde(default)]
    pub fact_chips: Option<Vec<String>>,
    #[serde(default)]
    pub country_chips: Option<Vec<String>>,
    #[serde(default)]
    pub poster_srcs: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub buttons: Vec<String>,
    #[serde(default)]
    pub reviews_buttons: Vec<String>,
}

/// Everything captured from one page visit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub headings: Vec<String>,
    #[serde(default)]
    pub cards: CardsSnapshot,
    #[serde(default)]
    pub filter: Option<FilterCardSnapshot>,
    #[serde(default)]
    pub detail: DetailSnapshot,
}

impl PageSnapshot {
    /// Find the snapshot line in script output and parse it
    pub fn from_output(stdout: &str) -> Option<serde_json::Result<Self>> {
        stdout
            .lines()
            .find_map(|line| line.strip_prefix(SNAPSHOT_MARKER))
            .map(|json| serde_json::from_str(json.trim()))
    }
}

/// Browser-side extraction. Runs inside `page.evaluate` with the serialized
/// [`Selectors`](crate::selectors::Selectors) as its argument.
pub const EXTRACT_JS: &str = r#"(sel) => {
  const text = (el) => (el ? el.textContent : '');
  const all = (root, s) => Array.from(root.querySelectorAll(s));
  const scope = (hops) => {
    let node = document;
    for (const hop of hops) {
      if (!node) return null;
      node = node.querySelectorAll(hop.selector)[hop.index] || null;
    }
    return node;
  };
  const element = (root, s) => {
    const el = root.querySelector(s);
    return el ? { class_name: el.getAttribute('class') || '', text: el.textContent } : null;
  };
  const chips = (hops) => {
    const root = scope(hops);
    return root ? all(root, sel.chip_label).map(text) : null;
  };

  const filterRoot = scope(sel.filter_card);
  const filter = filterRoot ? {
    title: filterRoot.querySelector(sel.filter_title) ? text(filterRoot.querySelector(sel.filter_title)) : null,
    search: element(filterRoot, sel.search_input),
    genre: element(filterRoot, sel.genre_select),
    sort: element(filterRoot, sel.sort_select),
    time: element(filterRoot, sel.time_select),
  } : null;

  const carousel = scope(sel.poster_carousel);

  return {
    url: window.location.pathname,
    headings: all(document, sel.heading).map(text),
    cards: {
      header_count: all(document, sel.card_header).length,
      titles: all(document, sel.card_title).map((el) => {
        const t = el.querySelector(sel.card_title_text);
        return t ? t.textContent : null;
      }),
      media_styles: all(document, sel.card_media).map((el) => el.getAttribute('style')),
      contents: all(document, sel.card_content).map(text),
      actions: all(document, sel.card_actions).map((el) => {
        const button = el.querySelector('button');
        const link = el.querySelector('a');
        return {
          button_aria_label: button ? button.getAttribute('aria-label') : null,
          link_href: link ? link.getAttribute('href') : null,
          link_text: text(link),
        };
      }),
    },
    filter,
    detail: {
      paragraphs: all(document, sel.paragraph).map(text),
      genre_chips: chips(sel.genre_chips),
      fact_chips: chips(sel.fact_chips),
      country_chips: chips(sel.country_chips),
      poster_srcs: carousel ? all(carousel, sel.poster_image).map((img) => img.getAttribute('src')) : null,
      buttons: all(document, sel.button).map(text),
      reviews_buttons: all(document, sel.reviews_button).map(text),
    },
  };
}"#;
