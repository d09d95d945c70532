#![allow(dead_code)]

use axum::{
    body::Body,
    extract::{Query, State},
    http::{Request, StatusCode},
    routing::get,
    Json, Router,
};
use catalog_service::app::{build_router, AppState};
use catalog_service::config::Config;
use catalog_service::models::cache_store::MemoryCache;
use catalog_service::models::storage::MemoryBookStore;
use catalog_service::services::books::BooksService;
use catalog_service::services::cache::Cache;
use catalog_service::services::google_books::GoogleBooksClient;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;

/// Local stand-in for the Google Books volumes endpoint.
pub struct FakeUpstream {
    pub url: String,
    hits: Arc<AtomicUsize>,
}

impl FakeUpstream {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn volumes(
    State(hits): State<Arc<AtomicUsize>>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    hits.fetch_add(1, Ordering::SeqCst);

    let query = params.get("q").cloned().unwrap_or_default();
    if query == "fail" {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let max_results: usize = params
        .get("maxResults")
        .and_then(|m| m.parse().ok())
        .unwrap_or(10);

    let items: Vec<Value> = (0..max_results)
        .map(|i| {
            if i % 2 == 0 {
                json!({
                    "id": format!("vol-{}", i),
                    "volumeInfo": {
                        "title": format!("{} book {}", query, i),
                        "authors": ["Guido van Rossum"],
                        "publishedDate": "2020-05-01",
                        "pageCount": 320,
                        "categories": ["Computers"],
                        "imageLinks": {"thumbnail": format!("http://img/{}", i)},
                        "language": "en",
                        "previewLink": format!("http://preview/{}", i)
                    }
                })
            } else {
                json!({
                    "id": format!("vol-{}", i),
                    "volumeInfo": {"title": format!("{} book {}", query, i), "publishedDate": "n/a"}
                })
            }
        })
        .collect();

    Ok(Json(json!({
        "kind": "books#volumes",
        "totalItems": 1234,
        "items": items
    })))
}

pub async fn spawn_upstream() -> FakeUpstream {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = Router::new()
        .route("/books/v1/volumes", get(volumes))
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeUpstream {
        url: format!("http://{}/books/v1/volumes", addr),
        hits,
    }
}

pub fn app_with(upstream_url: &str, cache: Cache) -> Router {
    let api = GoogleBooksClient::new(upstream_url).unwrap();
    let books = BooksService::new(Arc::new(api), cache);
    let config = Config {
        google_books_url: upstream_url.to_string(),
        ..Config::default()
    };
    build_router(AppState::new(
        Arc::new(MemoryBookStore::new()),
        books,
        config,
    ))
}

pub fn memory_cache() -> Cache {
    Cache::new(Arc::new(MemoryCache::new()), 60)
}

pub async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn send_json(app: &Router, method: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}
