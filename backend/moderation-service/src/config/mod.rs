use crate::error::{ModerationError, Result};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server configuration
    pub http_port: u16,

    // Database configuration
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,

    // Content analyzer
    pub analyzer_url: Option<String>,
    pub analyzer_timeout_secs: u64,

    // Queue defaults
    pub default_queue_limit: i64,

    // Service configuration
    pub service_name: String,
    pub environment: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| ModerationError::Config("DATABASE_URL must be set".to_string()))?;

        Ok(Self {
            http_port: parse_or("HTTP_PORT", 8090),
            database_url,
            db_max_connections: parse_or("DB_MAX_CONNECTIONS", 10),
            db_min_connections: parse_or("DB_MIN_CONNECTIONS", 2),
            db_acquire_timeout_secs: parse_or("DB_ACQUIRE_TIMEOUT_SECS", 10),
            analyzer_url: env::var("ANALYZER_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            analyzer_timeout_secs: parse_or("ANALYZER_TIMEOUT_SECS", 5),
            default_queue_limit: parse_or("DEFAULT_QUEUE_LIMIT", 50),
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "moderation-service".to_string()),
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
        })
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
