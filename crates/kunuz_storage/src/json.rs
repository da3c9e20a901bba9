use std::path::{Path, PathBuf};

use async_trait::async_trait;
use kunuz_core::{ArticleRecord, ArticleStorage, Error, Result};
use tracing::info;

/// Writes each result set to `<dir>/kunuz_<label>.json` as a pretty-printed
/// UTF-8 array.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, label: &str) -> PathBuf {
        let safe: String = label
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("kunuz_{}.json", safe))
    }
}

#[async_trait]
impl ArticleStorage for JsonFileStorage {
    async fn store_articles(&self, label: &str, articles: &[ArticleRecord]) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.path_for(label);
        let body = serde_json::to_string_pretty(articles)?;
        tokio::fs::write(&path, body).await?;
        info!("💾 Saved {} articles → {}", articles.len(), path.display());
        Ok(())
    }

    async fn get_by_label(&self, label: &str) -> Result<Vec<ArticleRecord>> {
        let path = self.path_for(label);
        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            Error::Storage(format!("cannot read {}: {}", path.display(), e))
        })?;
        Ok(serde_json::from_str(&raw)?)
    }
}
