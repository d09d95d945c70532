use crate::app::AppState;
use crate::error::ApiError;
use crate::models::external::{ProcessedBooksResult, RawSearchResult};
use crate::models::responses::{
    CacheTestResponse, ExternalHealthResponse, RandomBook, RandomBookResponse,
};
use axum::{
    extract::{rejection::QueryRejection, Query, State},
    response::Json,
};
use serde::Deserialize;
use std::collections::BTreeMap;
use tracing::{error, info};

pub const MAX_RESULTS_LIMIT: i64 = 20;

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default = "default_query")]
    pub query: String,
    #[serde(default = "default_max_results")]
    pub max_results: i64,
}

fn default_query() -> String {
    "python programming".to_string()
}

fn default_max_results() -> i64 {
    5
}

impl SearchParams {
    /// Returns `max_results` once it is known to be within 1..=20.
    fn validate(&self) -> Result<u32, ApiError> {
        if (1..=MAX_RESULTS_LIMIT).contains(&self.max_results) {
            Ok(self.max_results as u32)
        } else {
            Err(ApiError::Unprocessable(format!(
                "max_results must be between 1 and {}",
                MAX_RESULTS_LIMIT
            )))
        }
    }
}

pub async fn raw_books(
    params: Result<Query<SearchParams>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<RawSearchResult>, ApiError> {
    let Query(params) = params?;
    let max_results = params.validate()?;
    info!("Raw search: {:?}", params);

    state
        .books
        .fetch_raw(&params.query, max_results)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Raw search for '{}' failed: {}", params.query, e);
            ApiError::Internal(format!("Error fetching books data: {}", e))
        })
}

pub async fn processed_books(
    params: Result<Query<SearchParams>, QueryRejection>,
    State(state): State<AppState>,
) -> Result<Json<ProcessedBooksResult>, ApiError> {
    let Query(params) = params?;
    let max_results = params.validate()?;
    info!("Processed search: {:?}", params);

    state
        .books
        .fetch_processed(&params.query, max_results)
        .await
        .map(Json)
        .map_err(|e| {
            error!("Processed search for '{}' failed: {}", params.query, e);
            ApiError::Internal(format!("Error processing books data: {}", e))
        })
}

pub async fn random_book(State(state): State<AppState>) -> Json<RandomBookResponse> {
    let response = match state.books.random_book().await {
        Ok((topic, Some(book))) => RandomBookResponse::Found {
            random_topic: topic,
            book: RandomBook {
                title: book.title,
                authors: book.authors,
                year: book.published_year,
                preview_link: book.preview_link,
            },
        },
        Ok((_, None)) => RandomBookResponse::Empty {
            message: "No books found".to_string(),
        },
        Err(e) => {
            error!("Random book lookup failed: {}", e);
            RandomBookResponse::Failed {
                error: e.to_string(),
            }
        }
    };

    Json(response)
}

pub async fn external_health(State(state): State<AppState>) -> Json<ExternalHealthResponse> {
    let cache = state.books.cache();
    let cache_status = if !cache.is_enabled() {
        "disabled"
    } else if cache.is_reachable().await {
        "connected"
    } else {
        "unreachable"
    };

    let mut external_apis = BTreeMap::new();
    external_apis.insert("google_books".to_string(), "enabled".to_string());
    external_apis.insert(
        format!("cache:{}", cache.backend_name()),
        cache_status.to_string(),
    );

    Json(ExternalHealthResponse {
        status: "ok".to_string(),
        external_apis,
    })
}

pub async fn cache_test(State(state): State<AppState>) -> Result<Json<CacheTestResponse>, ApiError> {
    let timing = state.books.cache_timing().await.map_err(|e| {
        error!("Cache timing check failed: {}", e);
        ApiError::Internal(format!("Error processing books data: {}", e))
    })?;

    Ok(Json(CacheTestResponse {
        cache_status: if timing.cache_enabled {
            "enabled".to_string()
        } else {
            "disabled".to_string()
        },
        first_request_ms: timing.first_request_ms,
        second_request_ms: timing.second_request_ms,
    }))
}
