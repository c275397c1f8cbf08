//! # Structured Logging Module
//!
//! Environment-aware structured logging for debugging the async pipelines.
//! Collaborators embedding the core may install their own subscriber; the
//! initializer tolerates an already-set global.

use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize structured logging with environment-specific configuration.
///
/// `level` overrides the environment-derived default; it accepts any
/// `EnvFilter` directive (`"error"`, `"warn"`, `"info"`, `"debug"`).
pub fn init_structured_logging(level: Option<&str>) {
    let directive = level
        .map(str::to_string)
        .unwrap_or_else(|| get_log_level(&get_environment()));

    LOGGER_INITIALIZED.get_or_init(|| {
        let subscriber = tracing_subscriber::registry().with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_filter(EnvFilter::new(directive)),
        );

        // A global subscriber may already be set by the embedding
        // application; continue with it rather than panic.
        if subscriber.try_init().is_err() {
            tracing::debug!("Global tracing subscriber already initialized - continuing");
        }
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("GAMESDK_ENV")
        .or_else(|_| std::env::var("APP_ENV"))
        .unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment
fn get_log_level(environment: &str) -> String {
    match environment {
        "production" => "info".to_string(),
        _ => "debug".to_string(),
    }
}
