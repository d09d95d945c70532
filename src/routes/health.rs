use crate::app::AppState;
use crate::config::StoreBackend;
use crate::models::responses::{
    EnvironmentResponse, HealthResponse, LogTestResponse, RootResponse, ServicesStatusResponse,
    TimeResponse,
};
use axum::{extract::State, response::Json};
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::{debug, error, info, trace, warn};

pub async fn root() -> Json<RootResponse> {
    let endpoints = [
        "/common/healthcheck",
        "/common/time",
        "/common/environment",
        "/common/services-status",
        "/books",
        "/external/data",
        "/external/processed",
        "/external/books/random",
    ];

    Json(RootResponse {
        message: "Catalog service is running".to_string(),
        endpoints: endpoints.iter().map(|e| e.to_string()).collect(),
    })
}

pub async fn healthcheck() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        message: "Service is running".to_string(),
    })
}

pub async fn server_time() -> Json<TimeResponse> {
    Json(TimeResponse {
        server_time: Utc::now().to_rfc3339(),
    })
}

fn masked(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|_| "***".to_string())
}

pub async fn environment(State(state): State<AppState>) -> Json<EnvironmentResponse> {
    let config = &state.config;

    let mut environment = BTreeMap::new();
    environment.insert("ENVIRONMENT".to_string(), Some(config.environment.clone()));
    environment.insert("DATABASE_URL".to_string(), masked(&config.database_url));
    environment.insert("REDIS_URL".to_string(), masked(&config.redis_url));
    environment.insert("REDIS_TTL".to_string(), Some(config.cache_ttl.to_string()));
    environment.insert(
        "CACHE_BACKEND".to_string(),
        Some(state.books.cache().backend_name().to_string()),
    );

    Json(EnvironmentResponse {
        environment,
        redis_enabled: config.redis_enabled(),
    })
}

pub async fn services_status(State(state): State<AppState>) -> Json<ServicesStatusResponse> {
    let enabled = |on: bool| (if on { "enabled" } else { "disabled" }).to_string();

    let mut services = BTreeMap::new();
    services.insert(
        "postgresql".to_string(),
        enabled(matches!(state.config.store, StoreBackend::Postgres { .. })),
    );
    services.insert("redis".to_string(), enabled(state.config.redis_enabled()));
    services.insert("google_books_api".to_string(), enabled(true));

    Json(ServicesStatusResponse {
        services,
        timestamp: Utc::now().to_rfc3339(),
        status: "operational".to_string(),
    })
}

pub async fn log_test() -> Json<LogTestResponse> {
    trace!("TRACE message from log test");
    debug!("DEBUG message from log test");
    info!("INFO message from log test");
    warn!("WARN message from log test");
    error!("ERROR message from log test");

    Json(LogTestResponse {
        message: "Log test completed".to_string(),
        levels_tested: ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"]
            .iter()
            .map(|l| l.to_string())
            .collect(),
        timestamp: Utc::now().to_rfc3339(),
    })
}
