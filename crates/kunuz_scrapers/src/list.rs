//! Listing page crawler.
//!
//! Category pages on kun.uz render a first batch of articles and reveal
//! more through a "load more" button that only appears once the page has
//! been scrolled far enough. The crawler keeps scrolling and clicking until
//! it has enough links or the page stops producing new ones.

use std::collections::HashSet;

use kunuz_core::{ArticleRef, Error, PageSession, Result};
use regex::Regex;
use scraper::{Html, Selector};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use crate::scrapers::utils::parse_selector;
use crate::scrapers::SiteRules;
use crate::settings::CrawlSettings;

pub struct ListCrawler {
    base_url: Url,
    link_selector: Selector,
    article_path: Regex,
    load_more: String,
    settings: CrawlSettings,
}

impl ListCrawler {
    pub fn new(rules: &SiteRules, settings: &CrawlSettings) -> Result<Self> {
        let base_url = Url::parse(&rules.base_url)
            .map_err(|e| Error::Config(format!("Invalid base URL {}: {}", rules.base_url, e)))?;
        let article_path = Regex::new(&rules.article_path)
            .map_err(|e| Error::Config(format!("Invalid article path pattern: {}", e)))?;
        // Validate early; the session takes the selector as text.
        parse_selector(&rules.load_more)?;

        Ok(Self {
            base_url,
            link_selector: parse_selector(&rules.article_link)?,
            article_path,
            load_more: rules.load_more.clone(),
            settings: settings.clone(),
        })
    }

    /// Collects up to `target` distinct article URLs from a listing page, in
    /// discovery order.
    ///
    /// Running out of content is not an error: the result is simply short.
    /// Fails only when the listing page cannot be opened or the crawl is
    /// cancelled.
    pub async fn collect(
        &self,
        session: &mut dyn PageSession,
        listing_url: &str,
        target: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<ArticleRef>> {
        if target == 0 {
            return Ok(Vec::new());
        }

        session
            .navigate(listing_url, self.settings.listing_timeout)
            .await?;

        let mut seen = HashSet::new();
        let mut collected = Vec::new();
        let mut after_click = false;

        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let html = match session.current_html().await {
                Ok(html) => html,
                Err(e) => {
                    warn!(listing = listing_url, error = %e, "Could not read listing page");
                    break;
                }
            };

            let mut added = 0;
            for url in self.article_links(&html) {
                if collected.len() >= target {
                    break;
                }
                if seen.insert(url.clone()) {
                    collected.push(ArticleRef { url });
                    added += 1;
                }
            }

            debug!(
                listing = listing_url,
                added,
                total = collected.len(),
                target,
                "Scanned listing page"
            );

            if collected.len() >= target {
                break;
            }
            // A click that renders nothing new means the listing is exhausted.
            if after_click && added == 0 {
                debug!(listing = listing_url, "Load more produced no new links");
                break;
            }
            if !self.reveal_more(session, cancel).await? {
                break;
            }
            after_click = true;
        }

        Ok(collected)
    }

    /// Absolute article URLs found in `html`, in document order. May contain
    /// duplicates.
    pub fn article_links(&self, html: &str) -> Vec<String> {
        let document = Html::parse_document(html);
        document
            .select(&self.link_selector)
            .filter_map(|a| a.value().attr("href"))
            .filter(|href| self.article_path.is_match(href))
            .filter_map(|href| self.base_url.join(href.trim()).ok())
            .map(String::from)
            .collect()
    }

    /// Scrolls until the load-more control shows up, then clicks it.
    /// Returns false when the page has nothing more to give.
    async fn reveal_more(
        &self,
        session: &mut dyn PageSession,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        let mut found = false;
        for attempt in 1..=self.settings.scroll_attempts {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            if let Err(e) = session.scroll_to_bottom().await {
                warn!(error = %e, "Scroll failed");
                return Ok(false);
            }
            session.wait_millis(self.settings.scroll_wait_ms).await;

            match session.is_present(&self.load_more).await {
                Ok(true) => {
                    debug!(attempt, "Load more control visible");
                    found = true;
                    break;
                }
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "Could not query load more control");
                    return Ok(false);
                }
            }
        }

        if !found {
            debug!(
                attempts = self.settings.scroll_attempts,
                "Load more control never appeared"
            );
            return Ok(false);
        }

        match session.click_if_present(&self.load_more).await {
            Ok(true) => {
                session.wait_millis(self.settings.load_more_wait_ms).await;
                Ok(true)
            }
            Ok(false) => Ok(false),
            Err(e) => {
                warn!(error = %e, "Load more click failed");
                Ok(false)
            }
        }
    }
}
