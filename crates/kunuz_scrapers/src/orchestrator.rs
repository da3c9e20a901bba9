use std::sync::Arc;

use kunuz_core::{
    ArticleRecord, CategorySelector, CategorySpec, CategoryTable, DateRange, Error, PageSession,
    Result, SessionLauncher,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::detail::DetailExtractor;
use crate::list::ListCrawler;
use crate::scrapers::SiteRules;
use crate::settings::CrawlSettings;

/// Splits `limit` across `categories` slots: everyone gets the floor share
/// and the first `limit % categories` slots get one more.
pub fn split_quota(limit: usize, categories: usize) -> Vec<usize> {
    if categories == 0 {
        return Vec::new();
    }
    let base = limit / categories;
    let remainder = limit % categories;
    (0..categories)
        .map(|i| base + usize::from(i < remainder))
        .collect()
}

/// Drives list crawling and article extraction over one or more categories.
pub struct CategoryOrchestrator {
    categories: CategoryTable,
    launcher: Arc<dyn SessionLauncher>,
    crawler: ListCrawler,
    extractor: DetailExtractor,
}

impl CategoryOrchestrator {
    pub fn new(
        categories: CategoryTable,
        launcher: Arc<dyn SessionLauncher>,
        rules: &SiteRules,
        settings: &CrawlSettings,
    ) -> Result<Self> {
        Ok(Self {
            categories,
            launcher,
            crawler: ListCrawler::new(rules, settings)?,
            extractor: DetailExtractor::new(rules, settings)?,
        })
    }

    pub fn categories(&self) -> &CategoryTable {
        &self.categories
    }

    /// Per-category crawl targets, in crawl order. Unknown keys are kept so
    /// they can be reported when their turn comes.
    pub fn plan(&self, selector: &CategorySelector, limit: usize) -> Vec<(String, usize)> {
        match selector {
            CategorySelector::Everything => self
                .categories
                .iter()
                .zip(split_quota(limit, self.categories.len()))
                .map(|(spec, quota)| (spec.key.clone(), quota))
                .collect(),
            CategorySelector::Keys(keys) => keys.iter().map(|k| (k.clone(), limit)).collect(),
        }
    }

    /// Runs one crawl request on a fresh browser session.
    ///
    /// The session is closed on every exit path. Failing to start the
    /// browser is the only way a run fails before crawling anything.
    pub async fn run(
        &self,
        selector: &CategorySelector,
        limit: usize,
        range: &DateRange,
        cancel: &CancellationToken,
    ) -> Result<Vec<ArticleRecord>> {
        let mut session = self.launcher.launch().await?;
        let outcome = self
            .run_with_session(session.as_mut(), selector, limit, range, cancel)
            .await;
        if let Err(e) = session.close().await {
            warn!(error = %e, "Failed to close browser session");
        }
        outcome
    }

    /// Crawls on an existing session. Results are kept in completion order
    /// and never exceed `limit`, whatever the selector.
    pub async fn run_with_session(
        &self,
        session: &mut dyn PageSession,
        selector: &CategorySelector,
        limit: usize,
        range: &DateRange,
        cancel: &CancellationToken,
    ) -> Result<Vec<ArticleRecord>> {
        if matches!(selector, CategorySelector::Everything) {
            info!("🌟 Crawling everything ({} articles across {} categories)", limit, self.categories.len());
        }

        let mut results = Vec::new();
        for (key, quota) in self.plan(selector, limit) {
            if results.len() >= limit {
                break;
            }
            let Some(spec) = self.categories.get(&key) else {
                warn!(category = %key, "Unknown category, skipping");
                continue;
            };
            if quota == 0 {
                debug!(category = %key, "No quota left for category");
                continue;
            }

            let records = self
                .crawl_category(session, spec, quota, range, cancel)
                .await?;
            results.extend(records);

            if results.len() >= limit {
                results.truncate(limit);
                break;
            }
        }

        info!("✅ Crawl finished with {} articles", results.len());
        Ok(results)
    }

    async fn crawl_category(
        &self,
        session: &mut dyn PageSession,
        spec: &CategorySpec,
        quota: usize,
        range: &DateRange,
        cancel: &CancellationToken,
    ) -> Result<Vec<ArticleRecord>> {
        info!("🚀 Crawling {} (limit: {})", spec.key, quota);

        let refs = match self
            .crawler
            .collect(session, &spec.listing_url, quota, cancel)
            .await
        {
            Ok(refs) => refs,
            Err(Error::Cancelled) => return Err(Error::Cancelled),
            Err(e) => {
                warn!(category = %spec.key, error = %e, "Listing crawl failed");
                return Ok(Vec::new());
            }
        };
        info!("   Found {} URLs", refs.len());

        let total = refs.len();
        let mut records = Vec::new();
        for (i, article) in refs.into_iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            match self
                .extractor
                .extract(session, &article.url, &spec.display_name, range)
                .await
            {
                Ok(record) => {
                    info!("   ✓ [{}/{}] {}", i + 1, total, preview(&record.title));
                    records.push(record);
                }
                Err(reason) => {
                    debug!(url = %article.url, %reason, "   ✗ [{}/{}] skipped", i + 1, total);
                }
            }
        }
        Ok(records)
    }
}

fn preview(title: &str) -> String {
    const MAX: usize = 50;
    if title.chars().count() <= MAX {
        title.to_string()
    } else {
        format!("{}...", title.chars().take(MAX).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{
        article_page, listing_page, long_body, ScriptedLauncher, ScriptedSite,
    };

    /// A site where every builtin category lists `per_category` dated articles.
    fn site(per_category: usize, published_at: &str) -> ScriptedSite {
        let mut site = ScriptedSite::new();
        for (c, spec) in CategoryTable::builtin().iter().enumerate() {
            let hrefs: Vec<String> = (0..per_category)
                .map(|i| format!("/news/2026/01/20/{}-{}-{}", spec.key, c, i))
                .collect();
            site = site.page(&spec.listing_url, &listing_page(&hrefs));
            for href in &hrefs {
                let url = format!("https://kun.uz{}", href);
                site = site.page(
                    &url,
                    &article_page(&format!("{} {}", spec.key, href), Some(published_at), &long_body()),
                );
            }
        }
        site
    }

    fn orchestrator(launcher: ScriptedLauncher) -> CategoryOrchestrator {
        CategoryOrchestrator::new(
            CategoryTable::builtin(),
            Arc::new(launcher),
            &SiteRules::default(),
            &CrawlSettings::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_split_quota_even() {
        assert_eq!(split_quota(21, 7), vec![3; 7]);
    }

    #[test]
    fn test_split_quota_remainder_goes_first() {
        assert_eq!(split_quota(20, 7), vec![3, 3, 3, 3, 3, 3, 2]);
        assert_eq!(split_quota(20, 7).iter().sum::<usize>(), 20);
    }

    #[test]
    fn test_split_quota_sums_to_limit() {
        for limit in 0..=100 {
            for n in 1..=10 {
                let quotas = split_quota(limit, n);
                assert_eq!(quotas.iter().sum::<usize>(), limit);
                let floor = limit / n;
                for (i, q) in quotas.iter().enumerate() {
                    assert_eq!(*q, floor + usize::from(i < limit % n));
                }
            }
        }
        assert!(split_quota(5, 0).is_empty());
    }

    #[test]
    fn test_plan_for_keys_uses_full_limit() {
        let orch = orchestrator(ScriptedLauncher::new(ScriptedSite::new()));
        let plan = orch.plan(
            &CategorySelector::Keys(vec!["foo".into(), "sport".into()]),
            20,
        );
        assert_eq!(plan, vec![("foo".to_string(), 20), ("sport".to_string(), 20)]);
    }

    #[tokio::test]
    async fn test_everything_mode_truncates_to_limit() {
        let launcher = ScriptedLauncher::new(site(5, "2026-01-20T10:00:00"));
        let orch = orchestrator(launcher.clone());

        let results = orch
            .run(&CategorySelector::Everything, 20, &DateRange::default(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(results.len(), 20);
        // 3 each for the first six categories, 2 for the last
        let sports = results.iter().filter(|r| r.category == "sports").count();
        let entertainment = results.iter().filter(|r| r.category == "entertainment").count();
        assert_eq!(sports, 3);
        assert_eq!(entertainment, 2);
        assert_eq!(results[0].category, "health");

        let journal = launcher.journal();
        assert_eq!(journal.launches, 1);
        assert!(journal.closed);
    }

    #[tokio::test]
    async fn test_everything_mode_with_small_limit_skips_empty_quotas() {
        let launcher = ScriptedLauncher::new(site(5, "2026-01-20T10:00:00"));
        let orch = orchestrator(launcher.clone());

        let results = orch
            .run(&CategorySelector::Everything, 3, &DateRange::default(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        let listings: Vec<_> = launcher
            .journal()
            .navigations
            .into_iter()
            .filter(|url| url.contains("/category/"))
            .collect();
        assert_eq!(listings.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_category_is_skipped() {
        let launcher = ScriptedLauncher::new(site(4, "2026-01-20T10:00:00"));
        let orch = orchestrator(launcher);

        let results = orch
            .run(
                &CategorySelector::Keys(vec!["foo".into(), "sport".into()]),
                20,
                &DateRange::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|r| r.category == "sports"));
    }

    #[tokio::test]
    async fn test_multi_category_mode_caps_total() {
        let launcher = ScriptedLauncher::new(site(5, "2026-01-20T10:00:00"));
        let orch = orchestrator(launcher);

        let results = orch
            .run(
                &CategorySelector::Keys(vec!["health".into(), "sport".into()]),
                8,
                &DateRange::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 8);
        assert_eq!(results.iter().filter(|r| r.category == "health").count(), 5);
        assert_eq!(results.iter().filter(|r| r.category == "sports").count(), 3);
    }

    #[tokio::test]
    async fn test_date_filter_excludes_old_articles() {
        let launcher = ScriptedLauncher::new(site(3, "2026-01-20T10:00:00"));
        let orch = orchestrator(launcher.clone());
        let range = DateRange::parse(Some("2026-01-25"), None).unwrap();

        let results = orch
            .run(&CategorySelector::Keys(vec!["world".into()]), 3, &range, &CancellationToken::new())
            .await
            .unwrap();

        assert!(results.is_empty());
        assert!(launcher.journal().closed);
    }

    #[tokio::test]
    async fn test_failed_articles_reduce_yield_only() {
        let spec = CategoryTable::builtin().get("sport").cloned().unwrap();
        let hrefs: Vec<String> = (0..3).map(|i| format!("/news/2026/01/20/s-{}", i)).collect();
        let site = ScriptedSite::new()
            .page(&spec.listing_url, &listing_page(&hrefs))
            .page(
                "https://kun.uz/news/2026/01/20/s-0",
                &article_page("Birinchi", None, &long_body()),
            )
            .failing("https://kun.uz/news/2026/01/20/s-1")
            .page(
                "https://kun.uz/news/2026/01/20/s-2",
                "<html><body><h1>Konteynersiz</h1></body></html>",
            );
        let orch = orchestrator(ScriptedLauncher::new(site));

        let results = orch
            .run(&CategorySelector::Keys(vec!["sport".into()]), 3, &DateRange::default(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "Birinchi");
        assert!(results.iter().all(|r| r.content.chars().count() >= 200));
    }

    #[tokio::test]
    async fn test_unreachable_listing_contributes_nothing() {
        let launcher = ScriptedLauncher::new(site(2, "2026-01-20T10:00:00").failing("https://kun.uz/news/category/sport"));
        let orch = orchestrator(launcher);

        let results = orch
            .run(
                &CategorySelector::Keys(vec!["sport".into(), "health".into()]),
                10,
                &DateRange::default(),
                &CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.category == "health"));
    }

    #[tokio::test]
    async fn test_browser_launch_failure_is_fatal() {
        let orch = orchestrator(ScriptedLauncher::broken());
        let result = orch
            .run(&CategorySelector::Everything, 5, &DateRange::default(), &CancellationToken::new())
            .await;
        assert!(matches!(result, Err(Error::Browser(_))));
    }

    #[tokio::test]
    async fn test_cancelled_run_still_closes_session() {
        let launcher = ScriptedLauncher::new(site(2, "2026-01-20T10:00:00"));
        let orch = orchestrator(launcher.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = orch
            .run(&CategorySelector::Everything, 7, &DateRange::default(), &cancel)
            .await;

        assert!(matches!(result, Err(Error::Cancelled)));
        assert!(launcher.journal().closed);
    }

    #[test]
    fn test_preview_truncates_long_titles() {
        assert_eq!(preview("qisqa"), "qisqa");
        let long = "a".repeat(60);
        assert_eq!(preview(&long), format!("{}...", "a".repeat(50)));
    }
}
