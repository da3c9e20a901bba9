pub mod cleaner;
pub mod cli;
pub mod detail;
pub mod list;
pub mod orchestrator;
pub mod scrapers;
pub mod settings;
mod logging;

#[cfg(feature = "browser")]
pub mod browser;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use cli::{handle_scrape, list_categories, validate_limit, BrowserArgs, CrawlArgs, ScrapeArgs, MAX_LIMIT};
pub use detail::{DetailExtractor, Rejection};
pub use list::ListCrawler;
pub use logging::init_logging;
pub use orchestrator::{split_quota, CategoryOrchestrator};
pub use scrapers::SiteRules;
pub use settings::{BrowserSettings, CrawlSettings};

#[cfg(feature = "browser")]
pub use browser::ChromeLauncher;

pub mod prelude {
    pub use super::orchestrator::CategoryOrchestrator;
    pub use kunuz_core::{ArticleRecord, CategorySelector, DateRange, Error, Result};
}
