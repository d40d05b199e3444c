//! Error types for the library layer.

use std::fmt;

use crate::provider::ProviderError;

/// Errors produced by the library layer, wrapping provider and store
/// failures and adding input validation.
#[derive(Debug)]
pub enum CivicaError {
    /// An error from one of the provider clients.
    Provider(ProviderError),
    /// A database operation failed.
    Store(sqlx::Error),
    /// User-provided input failed validation.
    InvalidInput(String),
    /// The requested record does not exist.
    NotFound(String),
    /// A required provider or key is not configured.
    ProviderConfig(String),
    /// The geocoding backend failed or returned no usable result.
    Geocode(String),
}

impl fmt::Display for CivicaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider(e) => write!(f, "Provider error: {}", e),
            Self::Store(e) => write!(f, "Store error: {}", e),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::ProviderConfig(msg) => write!(f, "Provider not configured: {}", msg),
            Self::Geocode(msg) => write!(f, "Geocoding failed: {}", msg),
        }
    }
}

impl std::error::Error for CivicaError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Provider(e) => Some(e),
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ProviderError> for CivicaError {
    fn from(e: ProviderError) -> Self {
        Self::Provider(e)
    }
}

impl From<sqlx::Error> for CivicaError {
    fn from(e: sqlx::Error) -> Self {
        Self::Store(e)
    }
}
