//! Headless Chromium sessions over the DevTools protocol.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use kunuz_core::{Error, PageSession, Result, SessionLauncher};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::settings::BrowserSettings;

const SCROLL_SCRIPT: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// Launches a dedicated Chromium process per session.
pub struct ChromeLauncher {
    settings: BrowserSettings,
}

impl ChromeLauncher {
    pub fn new(settings: BrowserSettings) -> Self {
        Self { settings }
    }

    fn config(&self) -> Result<BrowserConfig> {
        let mut builder = BrowserConfig::builder().request_timeout(self.settings.request_timeout);

        // with_head means NOT headless
        if !self.settings.headless {
            builder = builder.with_head();
        }
        if !self.settings.sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &self.settings.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder = builder
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--no-first-run");
        for arg in &self.settings.extra_args {
            builder = builder.arg(arg.as_str());
        }

        builder.build().map_err(Error::Browser)
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn PageSession>> {
        info!("Launching browser (headless={})", self.settings.headless);

        let (browser, mut handler) = Browser::launch(self.config()?)
            .await
            .map_err(|e| Error::Browser(format!("Failed to launch browser: {}", e)))?;

        // The handler stream must be polled for the browser to make progress.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let mut session = ChromeSession {
            browser,
            page: None,
            handler_task,
        };
        match session.browser.new_page("about:blank").await {
            Ok(page) => session.page = Some(page),
            Err(e) => {
                let _ = session.close().await;
                return Err(Error::Browser(format!("Failed to open tab: {}", e)));
            }
        }
        Ok(Box::new(session))
    }
}

pub struct ChromeSession {
    browser: Browser,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
}

impl ChromeSession {
    fn page(&self) -> Result<&Page> {
        self.page
            .as_ref()
            .ok_or_else(|| Error::Browser("tab already closed".to_string()))
    }
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()> {
        let page = self.page()?;
        let load = async {
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        };
        match tokio::time::timeout(timeout, load).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(Error::Navigation(format!("{}: {}", url, e))),
            Err(_) => Err(Error::Navigation(format!(
                "{}: timed out after {}s",
                url,
                timeout.as_secs()
            ))),
        }
    }

    async fn current_html(&mut self) -> Result<String> {
        self.page()?
            .content()
            .await
            .map_err(|e| Error::Browser(format!("Failed to read page content: {}", e)))
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        self.page()?
            .evaluate(SCROLL_SCRIPT)
            .await
            .map(|_| ())
            .map_err(|e| Error::Browser(format!("Scroll failed: {}", e)))
    }

    async fn is_present(&mut self, selector: &str) -> Result<bool> {
        // find_element errors when nothing matches
        Ok(self.page()?.find_element(selector).await.is_ok())
    }

    async fn click_if_present(&mut self, selector: &str) -> Result<bool> {
        let element = match self.page()?.find_element(selector).await {
            Ok(element) => element,
            Err(_) => return Ok(false),
        };
        element
            .click()
            .await
            .map_err(|e| Error::Browser(format!("Click failed: {}", e)))?;
        Ok(true)
    }

    async fn wait_millis(&mut self, millis: u64) {
        tokio::time::sleep(Duration::from_millis(millis)).await;
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                debug!(error = %e, "Tab close failed");
            }
        }
        let closed = self
            .browser
            .close()
            .await
            .map_err(|e| Error::Browser(format!("Failed to close browser: {}", e)));
        if closed.is_ok() {
            let _ = self.browser.wait().await;
        }
        self.handler_task.abort();
        closed.map(|_| ())
    }
}

impl Drop for ChromeSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}
