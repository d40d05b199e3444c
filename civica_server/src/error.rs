//! HTTP error mapping for the library's error kinds.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use civica_lib::CivicaError;
use serde_json::json;

/// Wrapper that renders library errors as JSON problem bodies.
pub struct ApiError(pub CivicaError);

impl From<CivicaError> for ApiError {
    fn from(e: CivicaError) -> Self {
        Self(e)
    }
}

impl From<civica_lib::sqlx::Error> for ApiError {
    fn from(e: civica_lib::sqlx::Error) -> Self {
        Self(CivicaError::Store(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            CivicaError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            CivicaError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            CivicaError::ProviderConfig(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            CivicaError::Provider(e) => {
                tracing::warn!("provider failure on request path: {}", e);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "upstream provider unavailable".to_string(),
                )
            }
            CivicaError::Geocode(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            CivicaError::Store(e) => {
                tracing::error!("store failure on request path: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
