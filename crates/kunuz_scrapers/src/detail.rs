//! Article page extraction.

use std::collections::HashSet;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use kunuz_core::types::{LANGUAGE_TAG, SOURCE_TAG};
use kunuz_core::{ArticleRecord, DateRange, PageSession, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::cleaner;
use crate::scrapers::utils::{attr_of_first, element_text, parse_selector};
use crate::scrapers::SiteRules;
use crate::settings::CrawlSettings;

/// Loose `DD.MM.YYYY` date anywhere in the page text. Last resort only: it
/// will happily match unrelated numbers in the body.
static LOOSE_DATE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{2})\.(\d{2})\.(\d{4})").unwrap());

const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Why an article was left out of the results. None of these are errors:
/// the caller moves on to the next URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("navigation failed: {0}")]
    Navigation(String),
    #[error("no heading")]
    MissingHeading,
    #[error("published {0} is outside the requested range")]
    OutOfRange(NaiveDateTime),
    #[error("no content container")]
    MissingContent,
    #[error("content too short ({0} chars)")]
    TooShort(usize),
}

pub struct DetailExtractor {
    heading: Selector,
    published_meta: Selector,
    image_meta: Selector,
    containers: Vec<Selector>,
    noise: Selector,
    paragraph: Selector,
    cookie_keyword: String,
    min_content_chars: usize,
    timeout: Duration,
}

impl DetailExtractor {
    pub fn new(rules: &SiteRules, settings: &CrawlSettings) -> Result<Self> {
        Ok(Self {
            heading: parse_selector(&rules.heading)?,
            published_meta: parse_selector(&rules.published_meta)?,
            image_meta: parse_selector(&rules.image_meta)?,
            containers: rules
                .content_containers
                .iter()
                .map(|s| parse_selector(s))
                .collect::<Result<Vec<_>>>()?,
            noise: parse_selector(&rules.noise)?,
            paragraph: parse_selector(&rules.paragraph)?,
            cookie_keyword: rules.cookie_keyword.to_lowercase(),
            min_content_chars: rules.min_content_chars,
            timeout: settings.detail_timeout,
        })
    }

    /// Loads `url` and turns it into a record, or says why it was skipped.
    pub async fn extract(
        &self,
        session: &mut dyn PageSession,
        url: &str,
        category: &str,
        range: &DateRange,
    ) -> std::result::Result<ArticleRecord, Rejection> {
        session
            .navigate(url, self.timeout)
            .await
            .map_err(|e| Rejection::Navigation(e.to_string()))?;
        let html = session
            .current_html()
            .await
            .map_err(|e| Rejection::Navigation(e.to_string()))?;

        self.extract_from_html(&html, url, category, range)
    }

    pub fn extract_from_html(
        &self,
        html: &str,
        url: &str,
        category: &str,
        range: &DateRange,
    ) -> std::result::Result<ArticleRecord, Rejection> {
        let document = Html::parse_document(html);

        let title = document
            .select(&self.heading)
            .next()
            .map(element_text)
            .filter(|t| !t.is_empty())
            .ok_or(Rejection::MissingHeading)?;

        let published_at = self.published_at(&document);
        if let Some(ts) = published_at {
            if !range.contains(Some(ts)) {
                return Err(Rejection::OutOfRange(ts));
            }
        }

        let container = self
            .containers
            .iter()
            .find_map(|selector| document.select(selector).next())
            .ok_or(Rejection::MissingContent)?;

        let content = cleaner::clean(&self.body_text(container));
        let length = content.chars().count();
        if length < self.min_content_chars {
            return Err(Rejection::TooShort(length));
        }

        Ok(ArticleRecord {
            title: cleaner::collapse_whitespace(&title),
            content,
            image_url: attr_of_first(&document, &self.image_meta, "content"),
            published_at,
            source_url: url.to_string(),
            source: SOURCE_TAG.to_string(),
            category: category.to_string(),
            language: LANGUAGE_TAG.to_string(),
        })
    }

    /// Structured metadata first, then the first plausible `DD.MM.YYYY` in the text.
    fn published_at(&self, document: &Html) -> Option<NaiveDateTime> {
        attr_of_first(document, &self.published_meta, "content")
            .and_then(|raw| parse_timestamp(&raw))
            .or_else(|| {
                let text: String = document.root_element().text().collect();
                loose_date(&text)
            })
    }

    /// Paragraph text of the container, skipping noise elements and cookie
    /// banners.
    fn body_text(&self, container: ElementRef) -> String {
        let noise: HashSet<_> = container.select(&self.noise).map(|el| el.id()).collect();

        container
            .select(&self.paragraph)
            .filter_map(|p| {
                let text = p
                    .descendants()
                    .filter(|node| !node.ancestors().any(|a| noise.contains(&a.id())))
                    .filter_map(|node| node.value().as_text().map(|t| t.trim()))
                    .filter(|t| !t.is_empty())
                    .collect::<Vec<_>>()
                    .join(" ");
                let banner = text.to_lowercase().contains(&self.cookie_keyword);
                (!text.is_empty() && !banner).then_some(text)
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Accepts RFC 3339 (offset dropped, wall-clock time kept), bare ISO
/// date-times, a trailing `Z`, or a plain date.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }

    let bare = raw.trim_end_matches('Z');
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(bare, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(bare, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn loose_date(text: &str) -> Option<NaiveDateTime> {
    LOOSE_DATE_RE.captures_iter(text).find_map(|caps| {
        let day = caps[1].parse().ok()?;
        let month = caps[2].parse().ok()?;
        let year = caps[3].parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{article_page, long_body, ScriptedSession, ScriptedSite};

    const URL: &str = "https://kun.uz/news/2026/01/20/maqola";

    fn extractor() -> DetailExtractor {
        DetailExtractor::new(&SiteRules::default(), &CrawlSettings::default()).unwrap()
    }

    fn extract(html: &str, range: &DateRange) -> std::result::Result<ArticleRecord, Rejection> {
        extractor().extract_from_html(html, URL, "sports", range)
    }

    #[test]
    fn test_extracts_full_record() {
        let html = article_page("Yangi  stadion", Some("2026-01-20T09:15:00+05:00"), &long_body());
        let record = extract(&html, &DateRange::default()).unwrap();

        assert_eq!(record.title, "Yangi stadion");
        assert_eq!(record.category, "sports");
        assert_eq!(record.source, "kunuz");
        assert_eq!(record.language, "uz");
        assert_eq!(record.source_url, URL);
        assert_eq!(
            record.image_url.as_deref(),
            Some("https://kun.uz/storage/cover.jpg")
        );
        assert_eq!(
            record.published_at,
            NaiveDate::from_ymd_opt(2026, 1, 20).unwrap().and_hms_opt(9, 15, 0)
        );
        assert!(record.content.chars().count() >= 200);
    }

    #[test]
    fn test_missing_heading_rejects() {
        let html = article_page("", None, &long_body());
        assert_eq!(extract(&html, &DateRange::default()), Err(Rejection::MissingHeading));
    }

    #[test]
    fn test_heading_without_container_rejects() {
        let html = format!("<html><body><h1>Sarlavha</h1><div class=\"other\"><p>{}</p></div></body></html>", long_body());
        assert_eq!(extract(&html, &DateRange::default()), Err(Rejection::MissingContent));
    }

    #[test]
    fn test_fallback_container() {
        let html = format!(
            "<html><body><h1>Sarlavha</h1><div class=\"news-inner__content\"><p>{}</p></div></body></html>",
            long_body()
        );
        assert!(extract(&html, &DateRange::default()).is_ok());
    }

    #[test]
    fn test_short_content_rejects() {
        let html = article_page("Sarlavha", None, "Qisqa matn.");
        assert!(matches!(
            extract(&html, &DateRange::default()),
            Err(Rejection::TooShort(_))
        ));
    }

    #[test]
    fn test_out_of_range_rejects() {
        let html = article_page("Sarlavha", Some("2026-01-20T10:00:00"), &long_body());
        let range = DateRange::parse(Some("2026-01-25"), None).unwrap();
        assert!(matches!(extract(&html, &range), Err(Rejection::OutOfRange(_))));
    }

    #[test]
    fn test_undated_article_passes_range() {
        let html = article_page("Sarlavha", None, &long_body());
        let range = DateRange::parse(Some("2026-01-25"), Some("2026-01-31")).unwrap();
        let record = extract(&html, &range).unwrap();
        assert_eq!(record.published_at, None);
    }

    #[test]
    fn test_loose_date_fallback() {
        let html = format!(
            "<html><body><h1>Sarlavha</h1><span>99.99.2026</span><span>22.01.2026 14:00</span>\
             <div class=\"single-content\"><p>{}</p></div></body></html>",
            long_body()
        );
        let record = extract(&html, &DateRange::default()).unwrap();
        assert_eq!(
            record.published_at,
            NaiveDate::from_ymd_opt(2026, 1, 22).unwrap().and_hms_opt(0, 0, 0)
        );
    }

    #[test]
    fn test_noise_and_cookie_paragraphs_are_dropped() {
        let html = format!(
            r#"<html><body><h1>Sarlavha</h1><div class="single-content">
                <p>{body}</p>
                <figure><p>Foto ostidagi yozuv</p></figure>
                <div class="share"><p>Ulashish</p></div>
                <p>Biz Cookies fayllaridan foydalanamiz</p>
                <p>Oxirgi <script>track()</script>jumla.</p>
            </div></body></html>"#,
            body = long_body()
        );
        let record = extract(&html, &DateRange::default()).unwrap();
        assert!(!record.content.contains("yozuv"));
        assert!(!record.content.contains("Ulashish"));
        assert!(!record.content.to_lowercase().contains("cookies"));
        assert!(!record.content.contains("track"));
        assert!(record.content.ends_with("Oxirgi jumla."));
    }

    #[test]
    fn test_footer_is_cleaned_from_content() {
        let body = format!(
            "{} \"KUN.UZ\" saytida eʼlon qilingan materiallardan nusxa olish taqiqlanadi.",
            long_body()
        );
        let html = article_page("Sarlavha", None, &body);
        let record = extract(&html, &DateRange::default()).unwrap();
        assert!(!record.content.contains("KUN.UZ"));
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let expected = NaiveDate::from_ymd_opt(2026, 1, 20).unwrap().and_hms_opt(10, 0, 0);
        assert_eq!(parse_timestamp("2026-01-20T10:00:00Z"), expected);
        assert_eq!(parse_timestamp("2026-01-20T10:00:00+05:00"), expected);
        assert_eq!(parse_timestamp("2026-01-20T10:00:00.000"), expected);
        assert_eq!(parse_timestamp("2026-01-20 10:00:00"), expected);
        assert_eq!(
            parse_timestamp("2026-01-20"),
            NaiveDate::from_ymd_opt(2026, 1, 20).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }

    #[tokio::test]
    async fn test_navigation_failure_is_a_rejection() {
        let mut session = ScriptedSession::new(ScriptedSite::new().failing(URL));
        let result = extractor()
            .extract(&mut session, URL, "sports", &DateRange::default())
            .await;
        assert!(matches!(result, Err(Rejection::Navigation(_))));
    }

    #[tokio::test]
    async fn test_extract_through_session() {
        let html = article_page("Sarlavha", Some("2026-01-20T10:00:00"), &long_body());
        let mut session = ScriptedSession::new(ScriptedSite::new().page(URL, &html));
        let record = extractor()
            .extract(&mut session, URL, "sports", &DateRange::default())
            .await
            .unwrap();
        assert_eq!(record.title, "Sarlavha");
        assert_eq!(session.journal().navigations, vec![URL.to_string()]);
    }
}
