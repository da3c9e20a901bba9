//! Site-specific extraction rules.
//!
//! The crawler and extractor are driven entirely by a [`SiteRules`] value,
//! so supporting another layout of the site means supplying other rules,
//! not touching the crawl loop.

use kunuz_core::{Error, Result};
use scraper::{ElementRef, Html, Selector};

pub mod kunuz;

#[derive(Debug, Clone)]
pub struct SiteRules {
    /// Origin that relative article links are resolved against.
    pub base_url: String,
    /// Anchors on a listing page that point at articles.
    pub article_link: String,
    /// Regex an article href must match (the date-segmented path).
    pub article_path: String,
    /// Control that reveals more articles on a listing page.
    pub load_more: String,
    pub heading: String,
    pub published_meta: String,
    pub image_meta: String,
    /// Tried in order; the first match is the article body.
    pub content_containers: Vec<String>,
    /// Sub-elements of the body that never carry article text.
    pub noise: String,
    pub paragraph: String,
    /// Paragraphs containing this (case-insensitive) are cookie banners.
    pub cookie_keyword: String,
    pub min_content_chars: usize,
}

impl Default for SiteRules {
    fn default() -> Self {
        kunuz::rules()
    }
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use super::*;

    pub fn parse_selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector)
            .map_err(|e| Error::Config(format!("Invalid selector {:?}: {:?}", selector, e)))
    }

    /// Text of an element with every text node trimmed and joined by a space.
    pub fn element_text(element: ElementRef) -> String {
        element
            .text()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// `content` attribute of the first element matching `selector`, if non-blank.
    pub fn attr_of_first(document: &Html, selector: &Selector, attr: &str) -> Option<String> {
        document
            .select(selector)
            .next()
            .and_then(|el| el.value().attr(attr))
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }
}
