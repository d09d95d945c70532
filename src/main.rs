use catalog_service::app::{build_router, AppState, Store};
use catalog_service::config::{CacheBackend, Config, StoreBackend};
use catalog_service::models::cache_store::{CacheStore, MemoryCache, RedisCache};
use catalog_service::models::storage::{BookStore, MemoryBookStore, PostgresBookStore};
use catalog_service::services::books::BooksService;
use catalog_service::services::cache::Cache;
use catalog_service::services::google_books::GoogleBooksClient;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("catalog_service=info,tower_http=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;

    let store: Store = match &config.store {
        StoreBackend::Postgres { database_url } => {
            info!("Using PostgreSQL book store");
            Arc::new(PostgresBookStore::new(database_url).await?)
        }
        StoreBackend::Memory => {
            info!("Using in-memory book store");
            Arc::new(MemoryBookStore::new())
        }
    };

    if let Err(e) = store.test_connection().await {
        error!("Failed to connect to book store: {}", e);
        std::process::exit(1);
    }
    info!("Book store connection successful");

    let cache = match &config.cache {
        CacheBackend::Redis { redis_url } => {
            let redis = RedisCache::new(redis_url)?;
            // An unreachable cache only slows requests down; keep serving.
            match redis.test_connection().await {
                Ok(()) => info!("Redis cache connection successful"),
                Err(e) => warn!("Redis cache unreachable, continuing without hits: {}", e),
            }
            Cache::new(Arc::new(redis), config.cache_ttl)
        }
        CacheBackend::Memory => {
            info!("Using in-memory cache");
            Cache::new(Arc::new(MemoryCache::new()), config.cache_ttl)
        }
        CacheBackend::Disabled => {
            info!("Cache disabled");
            Cache::disabled()
        }
    };

    let api = GoogleBooksClient::new(config.google_books_url.clone())?;
    info!("Upstream books API: {}", api.base_url());
    let books = BooksService::new(Arc::new(api), cache);

    let addr = format!("0.0.0.0:{}", config.port);
    let app = build_router(AppState::new(store, books, config));

    info!("Catalog service starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
