use std::sync::Arc;
use std::time::Duration;

use kunuz_core::ArticleStorage;
use kunuz_scrapers::CategoryOrchestrator;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

pub struct AppState {
    pub orchestrator: Arc<CategoryOrchestrator>,
    /// Upper bound on one `/parse` request, crawl included.
    pub request_timeout: Duration,
    /// When set, every non-empty `/parse` result is stored under its label.
    pub storage: Option<Arc<dyn ArticleStorage>>,
}

impl AppState {
    pub fn new(orchestrator: CategoryOrchestrator) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            storage: None,
        }
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn with_storage(mut self, storage: Arc<dyn ArticleStorage>) -> Self {
        self.storage = Some(storage);
        self
    }
}
