use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

/// Selector value that requests every configured category.
pub const EVERYTHING: &str = "everything";

const DEFAULT_LIMIT: usize = 20;

/// One crawlable category of the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategorySpec {
    pub key: String,
    pub listing_url: String,
    pub display_name: String,
    pub default_limit: usize,
}

impl CategorySpec {
    pub fn new(key: &str, listing_url: &str, display_name: &str) -> Self {
        Self {
            key: key.to_string(),
            listing_url: listing_url.to_string(),
            display_name: display_name.to_string(),
            default_limit: DEFAULT_LIMIT,
        }
    }
}

/// On-disk shape of a category entry, keyed by category key.
#[derive(Debug, Deserialize)]
struct CategoryEntry {
    url: String,
    category_name: String,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

/// Immutable, ordered category table. Order matters: quota remainders go
/// to the first categories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    specs: Vec<CategorySpec>,
}

impl CategoryTable {
    pub fn from_specs(specs: Vec<CategorySpec>) -> Result<Self> {
        let mut seen = HashSet::new();
        for spec in &specs {
            if spec.key.is_empty() {
                return Err(Error::Config("category key must not be empty".to_string()));
            }
            if spec.key == EVERYTHING {
                return Err(Error::Config(format!(
                    "'{}' is reserved and cannot be a category key",
                    EVERYTHING
                )));
            }
            if !seen.insert(spec.key.as_str()) {
                return Err(Error::Config(format!("duplicate category key '{}'", spec.key)));
            }
        }
        Ok(Self { specs })
    }

    /// The kun.uz sections the crawler ships with.
    pub fn builtin() -> Self {
        Self {
            specs: vec![
                CategorySpec::new("health", "https://kun.uz/news/category/soglom-hayot", "health"),
                CategorySpec::new("world", "https://kun.uz/news/category/jahon", "global"),
                CategorySpec::new("economy", "https://kun.uz/news/category/iqtisodiyot", "business"),
                CategorySpec::new("sport", "https://kun.uz/news/category/sport", "sports"),
                CategorySpec::new("technology", "https://kun.uz/news/category/texnologiya", "technology"),
                CategorySpec::new("education", "https://kun.uz/news/category/talim", "science"),
                CategorySpec::new("useful", "https://kun.uz/news/category/turizm", "entertainment"),
            ],
        }
    }

    /// Parses a JSON object mapping key to `{url, category_name, limit}`.
    /// Entry order in the document is kept.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        let entries: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)
            .map_err(|e| Error::Config(format!("invalid category table: {}", e)))?;

        let specs = entries
            .into_iter()
            .map(|(key, value)| {
                let entry: CategoryEntry = serde_json::from_value(value)
                    .map_err(|e| Error::Config(format!("category '{}': {}", key, e)))?;
                Ok(CategorySpec {
                    key,
                    listing_url: entry.url,
                    display_name: entry.category_name,
                    default_limit: entry.limit,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_specs(specs)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read category table {}: {}", path.display(), e))
        })?;
        let table = Self::from_json_str(&raw)?;
        debug!(path = %path.display(), categories = table.len(), "Loaded category table");
        Ok(table)
    }

    pub fn get(&self, key: &str) -> Option<&CategorySpec> {
        self.specs.iter().find(|spec| spec.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategorySpec> {
        self.specs.iter()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.specs.iter().map(|spec| spec.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// What a crawl request asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategorySelector {
    Everything,
    Keys(Vec<String>),
}

impl CategorySelector {
    /// Name used for output files: the key itself, `everything`, or
    /// `multiple` for a list.
    pub fn label(&self) -> &str {
        match self {
            CategorySelector::Everything => EVERYTHING,
            CategorySelector::Keys(keys) if keys.len() == 1 => &keys[0],
            CategorySelector::Keys(_) => "multiple",
        }
    }
}

impl FromStr for CategorySelector {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case(EVERYTHING) {
            return Ok(CategorySelector::Everything);
        }

        let keys: Vec<String> = trimmed
            .split(',')
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string)
            .collect();

        if keys.is_empty() {
            return Err(Error::Config("no category given".to_string()));
        }
        Ok(CategorySelector::Keys(keys))
    }
}

impl fmt::Display for CategorySelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategorySelector::Everything => write!(f, "{}", EVERYTHING),
            CategorySelector::Keys(keys) => write!(f, "{}", keys.join(",")),
        }
    }
}
