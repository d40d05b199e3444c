//! HTTP server answering "who are my elected officials?" for a US postal
//! code or street address, backed by the three-tier freshness cache in
//! `civica_lib`.

mod error;
mod routes;
mod state;

use std::sync::Arc;

use anyhow::{Context, Result};
use civica_lib::{build_provider, import::JobRegistry, Db, Geocoder};

use crate::state::{AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("civica=info".parse().unwrap()),
        )
        .with_target(false)
        .init();

    let config = Config::from_env()?;

    let db = Db::connect(&config.database_url)
        .await
        .context("failed to connect to the database")?;
    db.init().await.context("failed to apply schema")?;

    let provider = build_provider(&config.provider, &config.providers)
        .with_context(|| format!("failed to build provider '{}'", config.provider))?;
    tracing::info!("active provider: {}", provider.name());

    let geocoder = match &config.geocoder_key {
        Some(key) => {
            let geocoder = Geocoder::new(key.clone())
                .map_err(|e| anyhow::anyhow!("failed to build geocoder: {}", e))?;
            tracing::info!("geocoder enabled; geofence path active");
            Some(Arc::new(geocoder))
        }
        None => {
            tracing::info!("GEOCODER_KEY not set; geofence path disabled");
            None
        }
    };

    let app_state = AppState {
        db,
        provider,
        geocoder,
        jobs: Arc::new(JobRegistry::new()),
        max_age: chrono::Duration::days(config.max_age_days),
    };

    let app = routes::router(app_state);
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("listening on {}", addr);
    axum::serve(listener, app).await.context("server exited")?;
    Ok(())
}
