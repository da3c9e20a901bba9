use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use kunuz_core::{ArticleRecord, ArticleStorage, CategorySelector, DateRange, Error, Result};
use kunuz_storage::{export_csv, JsonFileStorage};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::orchestrator::CategoryOrchestrator;
use crate::settings::{BrowserSettings, CrawlSettings};

/// Hard ceiling on a single request, shared with the HTTP API.
pub const MAX_LIMIT: usize = 100;

#[derive(Args, Debug, Clone)]
pub struct ScrapeArgs {
    /// Category key, a comma-separated list of keys, or "everything"
    #[arg(short, long, default_value = "everything")]
    pub category: String,
    /// Number of articles to return
    #[arg(short, long, default_value_t = 20)]
    pub limit: usize,
    /// Only keep articles published on or after this day (YYYY-MM-DD)
    #[arg(long)]
    pub from_date: Option<String>,
    /// Only keep articles published on or before this day (YYYY-MM-DD)
    #[arg(long)]
    pub to_date: Option<String>,
    /// Save the results as JSON in the output directory
    #[arg(long)]
    pub save: bool,
    #[arg(long, default_value = "parsed_data")]
    pub output_dir: PathBuf,
    /// Also export title, category, date and URL to this CSV file
    #[arg(long)]
    pub csv: Option<PathBuf>,
    /// Print the records as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct CrawlArgs {
    /// Seconds to wait for an article page to load
    #[arg(long, default_value_t = 30, env = "KUNUZ_DETAIL_TIMEOUT")]
    pub detail_timeout: u64,
    /// Seconds to wait for a listing page to load
    #[arg(long, default_value_t = 60, env = "KUNUZ_LISTING_TIMEOUT")]
    pub listing_timeout: u64,
    /// Scroll attempts spent looking for the "load more" button
    #[arg(long, default_value_t = 6)]
    pub scroll_attempts: usize,
}

impl From<&CrawlArgs> for CrawlSettings {
    fn from(args: &CrawlArgs) -> Self {
        Self {
            detail_timeout: Duration::from_secs(args.detail_timeout),
            listing_timeout: Duration::from_secs(args.listing_timeout),
            scroll_attempts: args.scroll_attempts,
            ..CrawlSettings::default()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct BrowserArgs {
    /// Show the browser window
    #[arg(long)]
    pub headful: bool,
    /// Keep Chrome's sandbox enabled (usually unavailable in containers)
    #[arg(long)]
    pub sandbox: bool,
    /// Path to the Chrome/Chromium executable
    #[arg(long, env = "CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,
}

impl From<&BrowserArgs> for BrowserSettings {
    fn from(args: &BrowserArgs) -> Self {
        Self {
            headless: !args.headful,
            sandbox: args.sandbox,
            chrome_path: args.chrome_path.clone(),
            ..BrowserSettings::default()
        }
    }
}

/// Checks a requested limit against `1..=MAX_LIMIT`.
pub fn validate_limit(limit: i64) -> Result<usize> {
    if (1..=MAX_LIMIT as i64).contains(&limit) {
        Ok(limit as usize)
    } else {
        Err(Error::Config(format!(
            "limit must be between 1 and {}, got {}",
            MAX_LIMIT, limit
        )))
    }
}

/// Runs the `scrape` subcommand: crawl, print, optionally persist.
pub async fn handle_scrape(
    args: &ScrapeArgs,
    orchestrator: &CategoryOrchestrator,
    cancel: &CancellationToken,
) -> Result<Vec<ArticleRecord>> {
    let selector: CategorySelector = args.category.parse()?;
    let limit = validate_limit(args.limit as i64)?;
    let range = DateRange::parse(args.from_date.as_deref(), args.to_date.as_deref())?;

    let articles = orchestrator.run(&selector, limit, &range, cancel).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&articles)?);
    } else {
        for (i, article) in articles.iter().enumerate() {
            println!("[{}] {} - {}", i + 1, article.title, article.source_url);
        }
    }

    if args.save && !articles.is_empty() {
        let storage = JsonFileStorage::new(&args.output_dir);
        storage.store_articles(selector.label(), &articles).await?;
    }
    if let Some(path) = &args.csv {
        export_csv(path, &articles)?;
    }

    info!("✅ Done! Total articles: {}", articles.len());
    Ok(articles)
}

/// Runs the `categories` subcommand.
pub fn list_categories(orchestrator: &CategoryOrchestrator) {
    println!("Available categories:");
    for spec in orchestrator.categories().iter() {
        println!("  {:<12} {:<14} {}", spec.key, spec.display_name, spec.listing_url);
    }
    println!("  {:<12} (all of the above)", "everything");
}
