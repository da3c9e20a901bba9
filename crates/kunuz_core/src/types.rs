use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tag written into every record's `source` field.
pub const SOURCE_TAG: &str = "kunuz";

/// Tag written into every record's `language` field.
pub const LANGUAGE_TAG: &str = "uz";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// A candidate article discovered on a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArticleRef {
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub published_at: Option<NaiveDateTime>,
    pub source_url: String,
    pub source: String,
    /// Display name of the category, not its key.
    pub category: String,
    pub language: String,
}

/// Inclusive publish-date window. Either bound may be open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self> {
        if let (Some(from), Some(to)) = (from, to) {
            if from > to {
                return Err(Error::Config(format!(
                    "from_date {} is after to_date {}",
                    from, to
                )));
            }
        }
        Ok(Self { from, to })
    }

    /// Parses `YYYY-MM-DD` bounds as they arrive from the CLI or query string.
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self> {
        Self::new(parse_bound("from_date", from)?, parse_bound("to_date", to)?)
    }

    pub fn is_unbounded(&self) -> bool {
        self.from.is_none() && self.to.is_none()
    }

    /// Articles without a timestamp always pass.
    pub fn contains(&self, published_at: Option<NaiveDateTime>) -> bool {
        let Some(published_at) = published_at else {
            return true;
        };
        let day = published_at.date();
        self.from.map_or(true, |from| day >= from) && self.to.map_or(true, |to| day <= to)
    }
}

fn parse_bound(label: &str, value: Option<&str>) -> Result<Option<NaiveDate>> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => NaiveDate::parse_from_str(raw, DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                Error::Config(format!(
                    "Invalid '{}': {}. Expected YYYY-MM-DD",
                    label, raw
                ))
            }),
    }
}
