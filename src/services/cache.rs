use crate::models::cache_store::{CacheError, CacheStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

pub type Store = Arc<dyn CacheStore + Send + Sync>;

/// Outcome of a cache read. `Miss` and `StoreUnavailable` are handled the
/// same way by callers; they are kept apart for logging.
#[derive(Debug, Clone, PartialEq)]
pub enum CacheLookup<T> {
    Hit(T),
    Miss,
    StoreUnavailable,
}

impl<T> CacheLookup<T> {
    pub fn into_option(self) -> Option<T> {
        match self {
            CacheLookup::Hit(value) => Some(value),
            CacheLookup::Miss | CacheLookup::StoreUnavailable => None,
        }
    }
}

/// Best-effort JSON cache. No method here ever returns an error.
#[derive(Clone)]
pub struct Cache {
    store: Option<Store>,
    default_ttl: u64,
}

impl Cache {
    pub fn new(store: Store, default_ttl: u64) -> Self {
        Self {
            store: Some(store),
            default_ttl,
        }
    }

    pub fn disabled() -> Self {
        Self {
            store: None,
            default_ttl: 0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.store.is_some()
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.as_ref().map(|s| s.name()).unwrap_or("none")
    }

    pub async fn is_reachable(&self) -> bool {
        match &self.store {
            Some(store) => store.test_connection().await.is_ok(),
            None => false,
        }
    }

    pub async fn lookup<T: DeserializeOwned>(&self, key: &str) -> CacheLookup<T> {
        let Some(store) = &self.store else {
            return CacheLookup::StoreUnavailable;
        };

        match store.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!("Cache hit for {}", key);
                    CacheLookup::Hit(value)
                }
                Err(e) => {
                    warn!("Cache get error for {}: {}", key, CacheError::from(e));
                    CacheLookup::Miss
                }
            },
            Ok(None) => {
                debug!("Cache miss for {}", key);
                CacheLookup::Miss
            }
            Err(e) => {
                warn!("Cache get error for {}: {}", key, e);
                CacheLookup::StoreUnavailable
            }
        }
    }

    pub async fn cache_get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        self.lookup(key).await.into_option()
    }

    pub async fn cache_set<T: Serialize>(&self, key: &str, value: &T) -> bool {
        self.cache_set_with_ttl(key, value, self.default_ttl).await
    }

    pub async fn cache_set_with_ttl<T: Serialize>(&self, key: &str, value: &T, ttl: u64) -> bool {
        let Some(store) = &self.store else {
            return false;
        };

        if ttl == 0 {
            warn!("Cache set skipped for {}: ttl must be positive", key);
            return false;
        }

        let payload = match serde_json::to_string(value) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Cache set error for {}: {}", key, CacheError::from(e));
                return false;
            }
        };

        match store.set(key, &payload, ttl).await {
            Ok(()) => {
                debug!("Cached {} for {}s", key, ttl);
                true
            }
            Err(e) => {
                warn!("Cache set error for {}: {}", key, e);
                false
            }
        }
    }
}
