use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_DATABASE_NAME: &str = "blog_db";

#[derive(Debug, Clone, Deserialize)]
pub struct BlogConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    /// `None` when `DATABASE_URL` is unset; the service then runs without a store.
    pub mongodb: Option<MongoConfig>,
    pub otlp_endpoint: Option<String>,
    /// Whether `DATABASE_URL` was present in the environment at load time.
    #[serde(default)]
    pub database_url_set: bool,
    /// Whether `DATABASE_NAME` was present in the environment at load time.
    #[serde(default)]
    pub database_name_set: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl BlogConfig {
    pub fn load() -> Result<Self, AppError> {
        // Load common config (handles .env and APP__ prefix)
        let mut common = core_config::Config::load()?;

        common.port = parse_port(env::var("PORT").ok().as_deref())?;
        if let Ok(level) = env::var("LOG_LEVEL") {
            common.log_level = level;
        }

        let mongodb = env::var("DATABASE_URL")
            .ok()
            .filter(|uri| !uri.trim().is_empty())
            .map(|uri| MongoConfig {
                uri,
                database: env::var("DATABASE_NAME")
                    .ok()
                    .filter(|name| !name.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
            });

        Ok(BlogConfig {
            common,
            mongodb,
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|e| !e.is_empty()),
            database_url_set: env::var("DATABASE_URL").is_ok(),
            database_name_set: env::var("DATABASE_NAME").is_ok(),
        })
    }
}

fn parse_port(raw: Option<&str>) -> Result<u16, AppError> {
    match raw {
        None => Ok(DEFAULT_PORT),
        Some(value) => value.trim().parse().map_err(|e| {
            AppError::ConfigError(anyhow::anyhow!("Invalid PORT '{}': {}", value, e))
        }),
    }
}
