pub mod analytics;
pub mod config;
pub mod handlers;
pub mod loader;
pub mod models;
pub mod routes;
pub mod store;
