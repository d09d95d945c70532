use crate::models::external::RawSearchResult;
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

pub const GOOGLE_BOOKS_URL: &str = "https://www.googleapis.com/books/v1/volumes";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Upstream responded with status {0}")]
    Status(reqwest::StatusCode),
    #[error("Failed to parse upstream response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Book-metadata search API.
#[async_trait]
pub trait BooksApi {
    async fn search(&self, query: &str, max_results: u32)
        -> Result<RawSearchResult, UpstreamError>;
}

#[derive(Debug, Clone)]
pub struct GoogleBooksClient {
    client: Client,
    base_url: String,
}

impl GoogleBooksClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, UpstreamError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl BooksApi for GoogleBooksClient {
    async fn search(
        &self,
        query: &str,
        max_results: u32,
    ) -> Result<RawSearchResult, UpstreamError> {
        info!("Searching upstream for '{}' (max {})", query, max_results);

        let max_results = max_results.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("maxResults", max_results.as_str()),
                ("printType", "books"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            error!("Upstream search for '{}' failed: {}", query, response.status());
            return Err(UpstreamError::Status(response.status()));
        }

        let text = response.text().await?;
        let result: RawSearchResult = serde_json::from_str(&text)?;

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
    use serde_json::json;
    use std::collections::HashMap;

    async fn serve(app: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/books/v1/volumes", addr)
    }

    #[tokio::test]
    async fn test_search_sends_expected_params() {
        let app = Router::new().route(
            "/books/v1/volumes",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "kind": "books#volumes",
                    "totalItems": 1,
                    "items": [{
                        "id": format!("{}|{}|{}", params["q"], params["maxResults"], params["printType"]),
                        "volumeInfo": {"title": "Echo"}
                    }]
                }))
            }),
        );
        let client = GoogleBooksClient::new(serve(app).await).unwrap();

        let result = client.search("rust lang", 3).await.unwrap();
        assert_eq!(result.items[0].id, "rust lang|3|books");
    }

    #[tokio::test]
    async fn test_search_error_status() {
        let app = Router::new().route(
            "/books/v1/volumes",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let client = GoogleBooksClient::new(serve(app).await).unwrap();

        let err = client.search("python", 5).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Status(s) if s.as_u16() == 503));
    }

    #[tokio::test]
    async fn test_search_malformed_body() {
        let app = Router::new().route(
            "/books/v1/volumes",
            get(|| async { Json(json!({"unexpected": true})) }),
        );
        let client = GoogleBooksClient::new(serve(app).await).unwrap();

        let err = client.search("python", 5).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Decode(_)));
    }

    #[tokio::test]
    async fn test_search_unreachable() {
        let client = GoogleBooksClient::new("http://127.0.0.1:1/volumes").unwrap();
        let err = client.search("python", 5).await.unwrap_err();
        assert!(matches!(err, UpstreamError::Request(_)));
    }
}
