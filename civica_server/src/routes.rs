//! The `/essentials` HTTP surface.

use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use civica_lib::dispatch::{self, PostalFlow, PostalOutcome};
use civica_lib::{candidacy, freshness, import, read, validation, warm, CivicaError};

use crate::error::ApiError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/essentials/politicians/by-zip/{zip}", get(by_zip))
        .route("/essentials/cache-status/{zip}", get(cache_status))
        .route("/essentials/politicians/search", post(search))
        .route("/essentials/politicians/{id}", get(profile))
        .route(
            "/essentials/politicians/{id}/endorsements",
            get(endorsements),
        )
        .route("/essentials/politicians/{id}/stances", get(stances))
        .route("/essentials/politicians/{id}/elections", get(elections))
        .route("/essentials/candidates/by-zip/{zip}", get(candidates_by_zip))
        .route(
            "/essentials/admin/import",
            post(start_import).get(list_imports),
        )
        .route("/essentials/admin/import/{job_id}", get(import_status))
        .route("/essentials/health", get(health))
        .with_state(state)
}

fn fresh_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=3600, stale-while-revalidate=86400"),
    );
    headers.insert(header::VARY, HeaderValue::from_static("Accept-Encoding"));
    headers
}

fn no_store_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    );
    headers
}

fn data_status(headers: &mut HeaderMap, status: &'static str) {
    headers.insert("X-Data-Status", HeaderValue::from_static(status));
}

fn server_timing(headers: &mut HeaderMap, dbread_ms: f64, wait_ms: f64, total_ms: f64) {
    if let Ok(value) = HeaderValue::from_str(&format!(
        "dbread;dur={:.1}, wait;dur={:.1}, total;dur={:.1}",
        dbread_ms, wait_ms, total_ms
    )) {
        headers.insert("Server-Timing", value);
    }
}

fn postal_response(flow: PostalFlow, total_start: Instant) -> Response {
    let total_ms = total_start.elapsed().as_secs_f64() * 1000.0;
    match flow.outcome {
        PostalOutcome::Fresh(rows) => {
            let mut headers = fresh_headers();
            data_status(&mut headers, "fresh");
            server_timing(&mut headers, flow.dbread_ms, flow.wait_ms, total_ms);
            (StatusCode::OK, headers, Json(rows)).into_response()
        }
        PostalOutcome::Stale(rows) => {
            let mut headers = no_store_headers();
            data_status(&mut headers, "stale");
            server_timing(&mut headers, flow.dbread_ms, flow.wait_ms, total_ms);
            (StatusCode::OK, headers, Json(rows)).into_response()
        }
        PostalOutcome::Warmed(rows) => {
            let mut headers = no_store_headers();
            data_status(&mut headers, "warmed");
            server_timing(&mut headers, flow.dbread_ms, flow.wait_ms, total_ms);
            (StatusCode::OK, headers, Json(rows)).into_response()
        }
        PostalOutcome::Warming => {
            let mut headers = no_store_headers();
            headers.insert(header::RETRY_AFTER, HeaderValue::from_static("3"));
            server_timing(&mut headers, flow.dbread_ms, flow.wait_ms, total_ms);
            (
                StatusCode::ACCEPTED,
                headers,
                Json(json!({ "status": "warming" })),
            )
                .into_response()
        }
    }
}

async fn by_zip(
    State(state): State<AppState>,
    Path(zip): Path<String>,
) -> Result<Response, ApiError> {
    let total_start = Instant::now();
    let postal = validation::validate_postal(&zip)?;
    let flow = dispatch::postal_flow(&state.db, &state.provider, state.max_age, &postal).await?;
    Ok(postal_response(flow, total_start))
}

async fn cache_status(
    State(state): State<AppState>,
    Path(zip): Path<String>,
) -> Result<Response, ApiError> {
    let postal = validation::validate_postal(&zip)?;
    let view = freshness::check_postal(state.db.pool(), &postal, state.max_age).await?;
    let warming = warm::spawn_stale_warmers(&state.db, &state.provider, &postal, &view);

    let mut headers = no_store_headers();
    if warming {
        headers.insert(header::RETRY_AFTER, HeaderValue::from_static("3"));
    }
    let body = json!({
        "federalFresh": view.federal_fresh,
        "stateFresh": view.state_fresh,
        "localFresh": view.local_fresh,
        "allFresh": view.all_fresh(),
        "state": view.state,
        "warming": warming,
    });
    Ok((StatusCode::OK, headers, Json(body)).into_response())
}

#[derive(Deserialize)]
struct SearchBody {
    query: String,
}

async fn search(
    State(state): State<AppState>,
    Json(body): Json<SearchBody>,
) -> Result<Response, ApiError> {
    let total_start = Instant::now();
    let query = validation::validate_query(&body.query)?;

    if validation::is_postal(&query) {
        let flow = dispatch::postal_flow(&state.db, &state.provider, state.max_age, &query).await?;
        return Ok(postal_response(flow, total_start));
    }

    let result = dispatch::search_address(
        &state.db,
        &state.provider,
        state.geocoder.as_deref(),
        state.max_age,
        &query,
    )
    .await?;

    let mut headers = no_store_headers();
    if let Ok(value) = HeaderValue::from_str(result.data_status) {
        headers.insert("X-Data-Status", value);
    }
    if let Some(count) = result.geofence_count {
        if let Ok(value) = HeaderValue::from_str(&count.to_string()) {
            headers.insert("X-Geofence-Count", value);
        }
    }
    Ok((StatusCode::OK, headers, Json(result.officials)).into_response())
}

async fn profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = validation::validate_uuid(&id)?;
    let Some(view) = read::read_official(state.db.pool(), id).await? else {
        return Err(CivicaError::NotFound(format!("official {}", id)).into());
    };

    // Lazy candidacy enrichment: bounded, detached, silent on failure.
    if let Some(global_id) = view.global_id.clone() {
        if !candidacy::has_election_records(state.db.pool(), id).await? {
            candidacy::spawn_lazy_fetch(
                state.db.clone(),
                Arc::clone(&state.provider),
                id,
                global_id,
            );
        }
    }

    Ok((StatusCode::OK, no_store_headers(), Json(view)).into_response())
}

async fn endorsements(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = validation::validate_uuid(&id)?;
    if !read::official_exists(state.db.pool(), id).await? {
        return Err(CivicaError::NotFound(format!("official {}", id)).into());
    }
    let rows = candidacy::endorsements_for(state.db.pool(), id).await?;
    Ok((StatusCode::OK, no_store_headers(), Json(rows)).into_response())
}

async fn stances(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = validation::validate_uuid(&id)?;
    if !read::official_exists(state.db.pool(), id).await? {
        return Err(CivicaError::NotFound(format!("official {}", id)).into());
    }
    let rows = candidacy::stances_for(state.db.pool(), id).await?;
    Ok((StatusCode::OK, no_store_headers(), Json(rows)).into_response())
}

async fn elections(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let id = validation::validate_uuid(&id)?;
    if !read::official_exists(state.db.pool(), id).await? {
        return Err(CivicaError::NotFound(format!("official {}", id)).into());
    }
    let rows = candidacy::elections_for(state.db.pool(), id).await?;
    Ok((StatusCode::OK, no_store_headers(), Json(rows)).into_response())
}

/// Future-election candidates. Empty array when the provider cannot serve
/// the query; never an error to the client.
async fn candidates_by_zip(
    State(state): State<AppState>,
    Path(zip): Path<String>,
) -> Result<Response, ApiError> {
    let postal = validation::validate_postal(&zip)?;
    let races = match state.provider.fetch_races_by_postal(&postal).await {
        Ok(races) => races,
        Err(e) => {
            tracing::warn!("race fetch for {} failed: {}", postal, e);
            Vec::new()
        }
    };
    Ok((StatusCode::OK, no_store_headers(), Json(races)).into_response())
}

#[derive(Deserialize)]
struct ImportBody {
    zips: Vec<String>,
    delay_between_ms: Option<u64>,
}

async fn start_import(
    State(state): State<AppState>,
    Json(body): Json<ImportBody>,
) -> Result<Response, ApiError> {
    let postals = validation::validate_import_postals(&body.zips)?;
    let job = import::spawn_import(
        state.db.clone(),
        Arc::clone(&state.provider),
        Arc::clone(&state.jobs),
        postals,
        body.delay_between_ms,
    );
    Ok((
        StatusCode::ACCEPTED,
        Json(json!({ "job_id": job.id, "status": job.status })),
    )
        .into_response())
}

async fn import_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    let id = validation::validate_uuid(&job_id)?;
    let Some(job) = state.jobs.get(id) else {
        return Err(CivicaError::NotFound(format!("import job {}", id)).into());
    };
    Ok((StatusCode::OK, Json(job)).into_response())
}

async fn list_imports(State(state): State<AppState>) -> Response {
    (StatusCode::OK, Json(state.jobs.all())).into_response()
}

async fn health(State(state): State<AppState>) -> Response {
    if let Err(e) = state.db.ping().await {
        tracing::error!("health check: database unreachable: {}", e);
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "database": "unreachable" })),
        )
            .into_response();
    }
    match state.provider.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "provider": state.provider.name() })),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("health check: provider unreachable: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded", "provider": state.provider.name() })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_headers_allow_shared_caching() {
        let headers = fresh_headers();
        let cache = headers.get(header::CACHE_CONTROL).unwrap().to_str().unwrap();
        assert!(cache.contains("max-age=3600"));
        assert!(cache.contains("stale-while-revalidate=86400"));
        assert_eq!(headers.get(header::VARY).unwrap(), "Accept-Encoding");
    }

    #[test]
    fn no_store_headers_forbid_caching() {
        let headers = no_store_headers();
        let cache = headers.get(header::CACHE_CONTROL).unwrap().to_str().unwrap();
        assert!(cache.contains("no-store"));
        assert!(cache.contains("must-revalidate"));
    }

    #[test]
    fn server_timing_formats_all_segments() {
        let mut headers = HeaderMap::new();
        server_timing(&mut headers, 12.34, 0.0, 15.9);
        let value = headers.get("Server-Timing").unwrap().to_str().unwrap();
        assert_eq!(value, "dbread;dur=12.3, wait;dur=0.0, total;dur=15.9");
    }

    #[test]
    fn warming_response_carries_retry_after() {
        let flow = PostalFlow {
            outcome: PostalOutcome::Warming,
            dbread_ms: 1.0,
            wait_ms: 10_000.0,
        };
        let response = postal_response(flow, Instant::now());
        assert_eq!(response.status(), StatusCode::ACCEPTED);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "3");
    }

    #[test]
    fn fresh_response_stamps_data_status() {
        let flow = PostalFlow {
            outcome: PostalOutcome::Fresh(Vec::new()),
            dbread_ms: 1.0,
            wait_ms: 0.0,
        };
        let response = postal_response(flow, Instant::now());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get("X-Data-Status").unwrap(), "fresh");
    }
}
