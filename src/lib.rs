pub mod app;
pub mod auth;
pub mod config;
pub mod controllers;
pub mod currency;
pub mod db;
pub mod error;
pub mod extractors;
pub mod logging;
pub mod migrations;
pub mod models;
pub mod openapi;
pub mod response;
pub mod testing;

pub use app::App;
pub use config::Config;
pub use error::ApiError;
pub use logging::{init_logging, init_logging_json, init_logging_with_level};
pub use testing::{TestApp, TestClient, TestResponse};
