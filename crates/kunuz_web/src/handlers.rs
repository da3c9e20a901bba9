use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use kunuz_core::{ArticleRecord, CategorySelector, DateRange};
use kunuz_scrapers::validate_limit;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::AppState;

const DEFAULT_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct ParseParams {
    pub category: Option<String>,
    pub limit: Option<i64>,
    pub from_date: Option<String>,
    pub to_date: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub count: usize,
    pub category: String,
    pub limit: usize,
    pub data: Vec<ArticleRecord>,
}

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

pub async fn list_categories(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut body = Map::new();
    for spec in state.orchestrator.categories().iter() {
        body.insert(
            spec.key.clone(),
            json!({ "url": spec.listing_url, "category_name": spec.display_name }),
        );
    }
    Json(Value::Object(body))
}

pub async fn parse(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ParseParams>,
) -> Result<Json<ParseResponse>, ApiError> {
    let category = params.category.unwrap_or_else(|| "everything".to_string());
    let selector = resolve_selector(&state, &category)?;
    let limit = validate_limit(params.limit.unwrap_or(DEFAULT_LIMIT))?;
    let range = DateRange::parse(params.from_date.as_deref(), params.to_date.as_deref())?;

    info!(category = %category, limit, "Parse request");
    let data = run_crawl(&state, selector.clone(), limit, range).await?;

    if let (Some(storage), false) = (&state.storage, data.is_empty()) {
        if let Err(e) = storage.store_articles(selector.label(), &data).await {
            warn!(error = %e, "Failed to store parse result");
        }
    }

    Ok(Json(ParseResponse {
        count: data.len(),
        category,
        limit,
        data,
    }))
}

/// Only configured keys are accepted over HTTP.
fn resolve_selector(state: &AppState, raw: &str) -> Result<CategorySelector, ApiError> {
    let table = state.orchestrator.categories();
    let invalid = || {
        let mut valid = table.keys().join(", ");
        valid.push_str(", everything");
        ApiError::BadRequest(format!(
            "Invalid category '{}'. Valid categories: {}",
            raw, valid
        ))
    };

    let selector: CategorySelector = raw.parse().map_err(|_| invalid())?;
    if let CategorySelector::Keys(keys) = &selector {
        if keys.iter().any(|key| !table.contains(key)) {
            return Err(invalid());
        }
    }
    Ok(selector)
}

/// Runs the crawl on its own task. When the request deadline passes the run
/// is cancelled and left to close its browser session in the background.
async fn run_crawl(
    state: &AppState,
    selector: CategorySelector,
    limit: usize,
    range: DateRange,
) -> Result<Vec<ArticleRecord>, ApiError> {
    let cancel = CancellationToken::new();
    let orchestrator = state.orchestrator.clone();
    let task_cancel = cancel.clone();
    let task = tokio::spawn(async move {
        orchestrator
            .run(&selector, limit, &range, &task_cancel)
            .await
    });

    match tokio::time::timeout(state.request_timeout, task).await {
        Ok(Ok(outcome)) => outcome.map_err(ApiError::from),
        Ok(Err(e)) => Err(ApiError::Internal(format!("crawl task failed: {}", e))),
        Err(_) => {
            cancel.cancel();
            warn!("Parse request timed out after {:?}", state.request_timeout);
            Err(ApiError::Internal(format!(
                "crawl timed out after {}s",
                state.request_timeout.as_secs()
            )))
        }
    }
}
