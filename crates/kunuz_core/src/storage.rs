use async_trait::async_trait;

use crate::types::ArticleRecord;
use crate::Result;

#[async_trait]
pub trait ArticleStorage: Send + Sync {
    /// Stores a result set under `label` (a category key, `everything` or `multiple`),
    /// replacing whatever was stored under that label before.
    async fn store_articles(&self, label: &str, articles: &[ArticleRecord]) -> Result<()>;

    /// Reads back the result set stored under `label`.
    async fn get_by_label(&self, label: &str) -> Result<Vec<ArticleRecord>>;
}
