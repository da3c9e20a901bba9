use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use kunuz_core::CategoryTable;
use kunuz_scrapers::cli::{handle_scrape, list_categories, BrowserArgs, CrawlArgs, ScrapeArgs};
use kunuz_scrapers::{init_logging, BrowserSettings, CategoryOrchestrator, ChromeLauncher, CrawlSettings, SiteRules};
use kunuz_storage::JsonFileStorage;
use kunuz_web::AppState;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                match c {
                    's' => total_seconds += num,
                    'm' => total_seconds += num * 60,
                    'h' => total_seconds += num * 3600,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                }
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // bare number means seconds
        if !current_number.is_empty() {
            total_seconds += current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            has_unit = true;
        }

        if !has_unit || total_seconds == 0 {
            return Err("Duration must be a positive number of seconds, minutes or hours".to_string());
        }
        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Crawl kun.uz category listings and articles", long_about = None)]
struct Cli {
    /// JSON file replacing the built-in category table
    #[arg(long, global = true, env = "KUNUZ_CATEGORIES")]
    categories_file: Option<PathBuf>,

    /// Debug-level logs for the kunuz crates (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(flatten)]
    browser: BrowserArgs,

    #[command(flatten)]
    crawl: CrawlArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Crawl one or more categories and print the articles
    Scrape(ScrapeArgs),
    /// List the configured categories
    Categories,
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "0.0.0.0:8000", env = "KUNUZ_BIND")]
        bind: SocketAddr,
        /// Deadline for one /parse request (e.g. 600, 10m, 1h)
        #[arg(long, default_value = "10m")]
        request_timeout: HumanDuration,
        /// Also save every non-empty /parse result as JSON in this directory
        #[arg(long)]
        save_dir: Option<PathBuf>,
    },
}

fn load_categories(path: Option<&PathBuf>) -> anyhow::Result<CategoryTable> {
    match path {
        Some(path) => {
            let table = CategoryTable::load(path)
                .with_context(|| format!("loading categories from {}", path.display()))?;
            info!("📚 Loaded {} categories from {}", table.len(), path.display());
            Ok(table)
        }
        None => Ok(CategoryTable::builtin()),
    }
}

/// Cancels `token` on the first Ctrl-C so the running crawl can close its browser.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping the crawl");
            token.cancel();
        }
    });
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let table = load_categories(cli.categories_file.as_ref())?;
    let launcher = ChromeLauncher::new(BrowserSettings::from(&cli.browser));
    let orchestrator = CategoryOrchestrator::new(
        table,
        Arc::new(launcher),
        &SiteRules::default(),
        &CrawlSettings::from(&cli.crawl),
    )?;

    match cli.command {
        Commands::Scrape(args) => {
            let cancel = CancellationToken::new();
            cancel_on_ctrl_c(cancel.clone());
            handle_scrape(&args, &orchestrator, &cancel).await?;
        }
        Commands::Categories => list_categories(&orchestrator),
        Commands::Serve {
            bind,
            request_timeout,
            save_dir,
        } => {
            let mut state = AppState::new(orchestrator).with_request_timeout(request_timeout.0);
            if let Some(dir) = save_dir {
                state = state.with_storage(Arc::new(JsonFileStorage::new(dir)));
            }
            kunuz_web::serve(state, bind).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration() {
        assert_eq!(HumanDuration::from_str("600").unwrap().0, Duration::from_secs(600));
        assert_eq!(HumanDuration::from_str("10m").unwrap().0, Duration::from_secs(600));
        assert_eq!(HumanDuration::from_str("1h 30s").unwrap().0, Duration::from_secs(3630));
        assert!(HumanDuration::from_str("0").is_err());
        assert!(HumanDuration::from_str("5d").is_err());
        assert!(HumanDuration::from_str("m").is_err());
    }

    #[test]
    fn test_cli_parses_scrape() {
        let cli = Cli::try_parse_from([
            "kunuz",
            "scrape",
            "--category",
            "sport,health",
            "--limit",
            "7",
            "--from-date",
            "2026-01-01",
            "--save",
        ])
        .unwrap();
        match cli.command {
            Commands::Scrape(args) => {
                assert_eq!(args.category, "sport,health");
                assert_eq!(args.limit, 7);
                assert_eq!(args.from_date.as_deref(), Some("2026-01-01"));
                assert!(args.save);
                assert_eq!(args.output_dir, PathBuf::from("parsed_data"));
            }
            other => panic!("unexpected command {:?}", other),
        }
        assert!(!cli.browser.headful);
    }

    #[test]
    fn test_cli_parses_serve_defaults() {
        let cli = Cli::try_parse_from(["kunuz", "serve"]).unwrap();
        match cli.command {
            Commands::Serve {
                bind,
                request_timeout,
                save_dir,
            } => {
                assert_eq!(bind.port(), 8000);
                assert_eq!(request_timeout.0, Duration::from_secs(600));
                assert!(save_dir.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_load_builtin_categories() {
        let table = load_categories(None).unwrap();
        assert_eq!(table.len(), 7);
    }
}
