use std::time::Duration;

use async_trait::async_trait;

use crate::Result;

/// One browser tab. Calls must be issued one at a time: a second
/// navigation before the first completes corrupts the tab state.
#[async_trait]
pub trait PageSession: Send {
    /// Loads `url`, failing with `Error::Navigation` if the page does not
    /// settle within `timeout`.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<()>;

    /// The rendered DOM serialized back to markup.
    async fn current_html(&mut self) -> Result<String>;

    async fn scroll_to_bottom(&mut self) -> Result<()>;

    async fn is_present(&mut self, selector: &str) -> Result<bool>;

    /// Clicks the first match of `selector`. Returns false when nothing matched.
    async fn click_if_present(&mut self, selector: &str) -> Result<bool>;

    async fn wait_millis(&mut self, millis: u64);

    /// Closes the tab and the browser behind it.
    async fn close(&mut self) -> Result<()>;
}

/// Starts browser sessions.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn PageSession>>;
}
