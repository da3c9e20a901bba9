//! Scripted, browser-free sessions for exercising the crawl pipeline.
//!
//! A [`ScriptedSite`] maps URLs to canned markup. Listing pages may carry
//! several snapshots: each load-more click advances to the next one, and the
//! load-more control is "present" while a further snapshot exists.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use kunuz_core::{Error, PageSession, Result, SessionLauncher};

#[derive(Debug, Clone, Default)]
pub struct ScriptedSite {
    pages: HashMap<String, Vec<String>>,
    failing: HashSet<String>,
}

impl ScriptedSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.to_string(), vec![html.to_string()]);
        self
    }

    pub fn paged(mut self, url: &str, snapshots: Vec<String>) -> Self {
        self.pages.insert(url.to_string(), snapshots);
        self
    }

    /// Navigating to `url` fails as if it timed out.
    pub fn failing(mut self, url: &str) -> Self {
        self.failing.insert(url.to_string());
        self
    }
}

/// What a scripted session was asked to do.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    pub navigations: Vec<String>,
    pub scrolls: usize,
    pub clicks: usize,
    pub launches: usize,
    pub closed: bool,
}

pub struct ScriptedSession {
    site: Arc<ScriptedSite>,
    current: Option<String>,
    cursor: usize,
    journal: Arc<Mutex<Journal>>,
}

impl ScriptedSession {
    pub fn new(site: ScriptedSite) -> Self {
        Self::with_journal(Arc::new(site), Arc::new(Mutex::new(Journal::default())))
    }

    fn with_journal(site: Arc<ScriptedSite>, journal: Arc<Mutex<Journal>>) -> Self {
        Self {
            site,
            current: None,
            cursor: 0,
            journal,
        }
    }

    pub fn journal(&self) -> Journal {
        self.journal.lock().expect("journal lock poisoned").clone()
    }

    fn record(&self, f: impl FnOnce(&mut Journal)) {
        f(&mut self.journal.lock().expect("journal lock poisoned"));
    }

    fn snapshots(&self) -> &[String] {
        self.current
            .as_ref()
            .and_then(|url| self.site.pages.get(url))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn has_more(&self) -> bool {
        self.cursor + 1 < self.snapshots().len()
    }
}

#[async_trait]
impl PageSession for ScriptedSession {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<()> {
        self.record(|j| j.navigations.push(url.to_string()));
        if self.site.failing.contains(url) || !self.site.pages.contains_key(url) {
            self.current = None;
            return Err(Error::Navigation(format!("timed out loading {}", url)));
        }
        self.current = Some(url.to_string());
        self.cursor = 0;
        Ok(())
    }

    async fn current_html(&mut self) -> Result<String> {
        self.snapshots()
            .get(self.cursor)
            .cloned()
            .ok_or_else(|| Error::Navigation("no page loaded".to_string()))
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        self.record(|j| j.scrolls += 1);
        Ok(())
    }

    async fn is_present(&mut self, _selector: &str) -> Result<bool> {
        Ok(self.has_more())
    }

    async fn click_if_present(&mut self, _selector: &str) -> Result<bool> {
        if !self.has_more() {
            return Ok(false);
        }
        self.cursor += 1;
        self.record(|j| j.clicks += 1);
        Ok(true)
    }

    async fn wait_millis(&mut self, _millis: u64) {}

    async fn close(&mut self) -> Result<()> {
        self.record(|j| j.closed = true);
        Ok(())
    }
}

/// Hands out [`ScriptedSession`]s that share one journal.
#[derive(Clone)]
pub struct ScriptedLauncher {
    site: Arc<ScriptedSite>,
    journal: Arc<Mutex<Journal>>,
    broken: bool,
}

impl ScriptedLauncher {
    pub fn new(site: ScriptedSite) -> Self {
        Self {
            site: Arc::new(site),
            journal: Arc::new(Mutex::new(Journal::default())),
            broken: false,
        }
    }

    /// A launcher whose browser never starts.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::new(ScriptedSite::new())
        }
    }

    pub fn journal(&self) -> Journal {
        self.journal.lock().expect("journal lock poisoned").clone()
    }
}

#[async_trait]
impl SessionLauncher for ScriptedLauncher {
    async fn launch(&self) -> Result<Box<dyn PageSession>> {
        if self.broken {
            return Err(Error::Browser("browser executable not found".to_string()));
        }
        self.journal.lock().expect("journal lock poisoned").launches += 1;
        Ok(Box::new(ScriptedSession::with_journal(
            self.site.clone(),
            self.journal.clone(),
        )))
    }
}

/// A listing page with one kun.uz-style card per href.
pub fn listing_page(hrefs: &[String]) -> String {
    let cards: String = hrefs
        .iter()
        .map(|href| format!(r#"<a class="news-page__item" href="{}">Yangilik</a>"#, href))
        .collect();
    format!(
        r#"<html><body><div class="news-page">{}</div></body></html>"#,
        cards
    )
}

/// An article page in kun.uz markup.
pub fn article_page(title: &str, published_at: Option<&str>, body: &str) -> String {
    let meta = published_at
        .map(|ts| format!(r#"<meta property="article:published_time" content="{}">"#, ts))
        .unwrap_or_default();
    format!(
        r#"<html><head>{}<meta property="og:image" content="https://kun.uz/storage/cover.jpg"></head>
<body><h1>{}</h1><div class="single-content"><p>{}</p></div></body></html>"#,
        meta, title, body
    )
}

/// Filler paragraph comfortably above the minimum content length.
pub fn long_body() -> String {
    "Toshkentda bugun bo‘lib o‘tgan uchrashuvda mutaxassislar yangi loyihalar haqida \
     batafsil ma’lumot berishdi va ularning iqtisodiyotga ta’sirini muhokama qilishdi. "
        .repeat(3)
}
