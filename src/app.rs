use crate::config::Config;
use crate::models::storage::BookStore;
use crate::routes::{
    books::{
        book_by_isbn, books_by_author, create_book, delete_book, get_book, list_books,
        search_books, update_book,
    },
    external::{cache_test, external_health, processed_books, random_book, raw_books},
    health::{environment, healthcheck, log_test, root, server_time, services_status},
};
use crate::services::books::BooksService;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub type Store = Arc<dyn BookStore + Send + Sync>;

/// Shared handles passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub books: Arc<BooksService>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Store, books: BooksService, config: Config) -> Self {
        Self {
            store,
            books: Arc::new(books),
            config: Arc::new(config),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/common/healthcheck", get(healthcheck))
        .route("/common/time", get(server_time))
        .route("/common/environment", get(environment))
        .route("/common/services-status", get(services_status))
        .route("/common/log-test", get(log_test))
        .route("/books", post(create_book).get(list_books))
        .route(
            "/books/:book_id",
            get(get_book).put(update_book).delete(delete_book),
        )
        .route("/books/author/:author", get(books_by_author))
        .route("/books/isbn/:isbn", get(book_by_isbn))
        .route("/books/search/:query", get(search_books))
        .route("/external/data", get(raw_books))
        .route("/external/processed", get(processed_books))
        .route("/external/books/random", get(random_book))
        .route("/external/health", get(external_health))
        .route("/external/cache-test", get(cache_test))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
