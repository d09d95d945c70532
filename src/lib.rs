pub mod app;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
