use std::path::PathBuf;
use std::time::Duration;

/// Timing knobs for the crawl. Defaults match the pace kun.uz tolerates
/// without its lazy loader falling behind.
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub listing_timeout: Duration,
    pub detail_timeout: Duration,
    /// Scroll-and-wait cycles spent looking for the load-more control.
    pub scroll_attempts: usize,
    pub scroll_wait_ms: u64,
    pub load_more_wait_ms: u64,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            listing_timeout: Duration::from_secs(60),
            detail_timeout: Duration::from_secs(30),
            scroll_attempts: 6,
            scroll_wait_ms: 1200,
            load_more_wait_ms: 1800,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub headless: bool,
    pub sandbox: bool,
    pub chrome_path: Option<PathBuf>,
    pub extra_args: Vec<String>,
    /// Timeout for individual CDP requests.
    pub request_timeout: Duration,
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            headless: true,
            sandbox: false,
            chrome_path: None,
            extra_args: Vec::new(),
            request_timeout: Duration::from_secs(30),
        }
    }
}
