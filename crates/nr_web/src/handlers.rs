use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use nr_core::config::{CacheConfig, API_VERSION};
use nr_core::SearchRequest;

use crate::AppState;

const SEARCH_CACHE_CONTROL: &str = "max-age=0, s-maxage=300";

/// Failures as the API reports them. Bodies are empty; the status says it all.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Core(#[from] nr_core::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!("Error: {}", self);
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Core(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            ApiError::Core(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        status.into_response()
    }
}

pub async fn info() -> impl IntoResponse {
    Json(json!({ "apiVersion": API_VERSION }))
}

pub async fn search_news(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state
        .search
        .search(&request.search_request_parameters, request.page_key.as_deref())
        .await?;
    Ok(([(header::CACHE_CONTROL, SEARCH_CACHE_CONTROL)], Json(page)))
}

pub async fn check_news_updates(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updates = state
        .search
        .check_updates(&request.search_request_parameters, request.page_key.as_deref())
        .await?;
    Ok(([(header::CACHE_CONTROL, SEARCH_CACHE_CONTROL)], Json(updates)))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentParams {
    pub url: Option<String>,
    pub fetch_read_more_content: Option<String>,
}

pub async fn story_content(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ContentParams>,
) -> Result<impl IntoResponse, ApiError> {
    let url = params
        .url
        .filter(|url| state.content.is_site_url(url))
        .ok_or_else(|| ApiError::BadRequest("missing or foreign url".to_string()))?;
    let fetch_read_more = params
        .fetch_read_more_content
        .map(|value| value.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let content = state.content.fetch_story_content(&url, fetch_read_more).await?;
    let max_age = max_age(content.timestamp, Utc::now(), &state.config.cache);
    let cache_control = format!("max-age=0, s-maxage={}", max_age);
    Ok(([(header::CACHE_CONTROL, cache_control)], Json(content)))
}

/// Fresh stories still change, so they are cached for a shorter time.
pub fn max_age(timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>, cache: &CacheConfig) -> u64 {
    match timestamp {
        Some(timestamp) if (now - timestamp).num_hours() < cache.new_story_threshold_hours => cache.new_story_max_age,
        _ => cache.default_max_age,
    }
}
