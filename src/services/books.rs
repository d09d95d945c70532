use crate::models::external::{ProcessedBook, ProcessedBooksResult, RawSearchResult};
use crate::services::cache::Cache;
use crate::services::google_books::{BooksApi, UpstreamError};
use crate::services::transform::transform;
use rand::seq::SliceRandom;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

pub type Api = Arc<dyn BooksApi + Send + Sync>;

pub const RANDOM_TOPICS: [&str; 5] = [
    "python",
    "javascript",
    "java",
    "programming",
    "computer science",
];

pub fn raw_cache_key(query: &str, max_results: u32) -> String {
    format!("books:raw:{}:{}", query, max_results)
}

pub fn processed_cache_key(query: &str, max_results: u32) -> String {
    format!("books:processed:{}:{}", query, max_results)
}

pub struct CacheTiming {
    pub cache_enabled: bool,
    pub first_request_ms: f64,
    pub second_request_ms: f64,
}

/// Cache-aside search over the upstream books API.
///
/// Raw and processed results live under separate key namespaces; a processed
/// miss goes through [`BooksService::fetch_raw`], so it reuses a cached raw
/// response instead of calling upstream again.
#[derive(Clone)]
pub struct BooksService {
    api: Api,
    cache: Cache,
}

impl BooksService {
    pub fn new(api: Api, cache: Cache) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    pub async fn fetch_raw(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<RawSearchResult, UpstreamError> {
        let key = raw_cache_key(query, max_results);

        if let Some(cached) = self.cache.cache_get::<RawSearchResult>(&key).await {
            return Ok(cached);
        }

        let raw = self.api.search(query, max_results).await?;
        self.cache.cache_set(&key, &raw).await;

        Ok(raw)
    }

    pub async fn fetch_processed(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<ProcessedBooksResult, UpstreamError> {
        let key = processed_cache_key(query, max_results);

        if let Some(cached) = self.cache.cache_get::<ProcessedBooksResult>(&key).await {
            return Ok(cached);
        }

        let raw = self.fetch_raw(query, max_results).await?;
        let processed = transform(&raw);
        self.cache.cache_set(&key, &processed).await;

        Ok(processed)
    }

    /// A random book from a random programming topic, with the topic used.
    pub async fn random_book(&self) -> Result<(String, Option<ProcessedBook>), UpstreamError> {
        let topic = RANDOM_TOPICS
            .choose(&mut rand::thread_rng())
            .copied()
            .unwrap_or(RANDOM_TOPICS[0]);

        let result = self.fetch_processed(topic, 5).await?;
        let book = result.books.choose(&mut rand::thread_rng()).cloned();

        Ok((topic.to_string(), book))
    }

    pub async fn cache_timing(&self) -> Result<CacheTiming, UpstreamError> {
        let start = Instant::now();
        self.fetch_processed("python", 5).await?;
        let first = start.elapsed();

        let start = Instant::now();
        self.fetch_processed("python", 5).await?;
        let second = start.elapsed();

        info!("Cache timing check: first {:?}, second {:?}", first, second);

        Ok(CacheTiming {
            cache_enabled: self.cache.is_enabled(),
            first_request_ms: first.as_secs_f64() * 1000.0,
            second_request_ms: second.as_secs_f64() * 1000.0,
        })
    }
}
