use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use kunuz_core::{ArticleRecord, ArticleStorage, Error, Result};
use tokio::sync::RwLock;

/// Keeps result sets in process memory, keyed by label.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    sets: Arc<RwLock<HashMap<String, Vec<ArticleRecord>>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn labels(&self) -> Vec<String> {
        let mut labels: Vec<String> = self.sets.read().await.keys().cloned().collect();
        labels.sort();
        labels
    }
}

#[async_trait]
impl ArticleStorage for MemoryStorage {
    async fn store_articles(&self, label: &str, articles: &[ArticleRecord]) -> Result<()> {
        self.sets
            .write()
            .await
            .insert(label.to_string(), articles.to_vec());
        Ok(())
    }

    async fn get_by_label(&self, label: &str) -> Result<Vec<ArticleRecord>> {
        self.sets
            .read()
            .await
            .get(label)
            .cloned()
            .ok_or_else(|| Error::Storage(format!("nothing stored under '{}'", label)))
    }
}
