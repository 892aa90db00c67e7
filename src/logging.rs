//! Logging initialization helpers.
//!
//! Call one of these once at startup, before building the [`crate::App`].
//! The `RUST_LOG` environment variable always takes precedence over the
//! programmatic default, e.g.:
//!
//! ```text
//! RUST_LOG=coinvert=debug,tower_http=debug,sqlx=warn cargo run
//! ```

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize logging with sensible defaults (`info` level).
///
/// # Panics
///
/// Panics if a global subscriber is already installed. Call it once.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize logging at a specific level instead of reading `RUST_LOG`.
pub fn init_logging_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize JSON-formatted logging for log aggregation systems.
pub fn init_logging_json() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().json())
        .init();
}
