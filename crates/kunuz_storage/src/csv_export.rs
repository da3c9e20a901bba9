use std::path::Path;

use kunuz_core::{ArticleRecord, Error, Result};
use serde::Serialize;
use tracing::info;

/// One CSV line: the columns a spreadsheet user needs to triage articles.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    title: &'a str,
    category: &'a str,
    published_at: String,
    source_url: &'a str,
}

/// Writes `title, category, published_at, source_url` rows with a header.
pub fn export_csv(path: &Path, articles: &[ArticleRecord]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path).map_err(csv_error)?;
    for article in articles {
        writer
            .serialize(CsvRow {
                title: &article.title,
                category: &article.category,
                published_at: article
                    .published_at
                    .map(|ts| ts.format("%Y-%m-%dT%H:%M:%S").to_string())
                    .unwrap_or_default(),
                source_url: &article.source_url,
            })
            .map_err(csv_error)?;
    }
    writer.flush()?;
    info!("Exported {} articles → {}", articles.len(), path.display());
    Ok(())
}

fn csv_error(e: csv::Error) -> Error {
    Error::Storage(format!("CSV export failed: {}", e))
}
