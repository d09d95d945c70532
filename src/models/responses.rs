use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Deserialize, Serialize, Debug)]
pub struct RootResponse {
    pub message: String,
    pub endpoints: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub message: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct TimeResponse {
    pub server_time: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct EnvironmentResponse {
    pub environment: BTreeMap<String, Option<String>>,
    pub redis_enabled: bool,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct ServicesStatusResponse {
    pub services: BTreeMap<String, String>,
    pub timestamp: String,
    pub status: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct LogTestResponse {
    pub message: String,
    pub levels_tested: Vec<String>,
    pub timestamp: String,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RandomBook {
    pub title: String,
    pub authors: Vec<String>,
    pub year: Option<i32>,
    pub preview_link: Option<String>,
}

/// Body of `GET /external/books/random`; exactly one shape is produced.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RandomBookResponse {
    Found { random_topic: String, book: RandomBook },
    Empty { message: String },
    Failed { error: String },
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExternalHealthResponse {
    pub status: String,
    pub external_apis: BTreeMap<String, String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CacheTestResponse {
    pub cache_status: String,
    pub first_request_ms: f64,
    pub second_request_ms: f64,
}
