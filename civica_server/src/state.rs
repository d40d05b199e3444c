//! Process-wide configuration and shared handler state.

use std::sync::Arc;

use anyhow::{Context, Result};
use civica_lib::{import::JobRegistry, Db, Geocoder, Provider, ProviderConfig};

/// Environment-driven configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub provider: String,
    pub max_age_days: i64,
    pub providers: ProviderConfig,
    pub geocoder_key: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse().context("PORT is not a valid port number")?,
            Err(_) => 5050,
        };
        let provider =
            std::env::var("PROVIDER").unwrap_or_else(|_| "ballotready".to_string());
        let max_age_days = match std::env::var("CACHE_MAX_AGE_DAYS") {
            Ok(raw) => raw
                .parse()
                .context("CACHE_MAX_AGE_DAYS is not a valid number of days")?,
            Err(_) => civica_lib::DEFAULT_MAX_AGE_DAYS,
        };
        Ok(Self {
            database_url,
            port,
            provider,
            max_age_days,
            providers: ProviderConfig {
                cicero_api_key: std::env::var("CICERO_API_KEY").ok(),
                ballotready_api_key: std::env::var("BALLOTREADY_API_KEY").ok(),
                ballotready_endpoint: std::env::var("BALLOTREADY_ENDPOINT").ok(),
            },
            geocoder_key: std::env::var("GEOCODER_KEY").ok(),
        })
    }
}

/// Singletons initialized at startup and threaded through every handler.
/// Everything here is read-only after construction except the job registry.
#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub provider: Arc<dyn Provider>,
    pub geocoder: Option<Arc<Geocoder>>,
    pub jobs: Arc<JobRegistry>,
    pub max_age: chrono::Duration,
}
