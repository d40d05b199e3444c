//! Geocoding client for the address search path.
//!
//! Geocoding is optional: without an API key the geofence path is disabled
//! and address searches fall straight through to the GraphQL provider.

use std::time::Duration;

use serde::Deserialize;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Geocoding request failed")]
    RequestFailed,
    #[error("Geocoding request failed with status {status}")]
    HttpStatus { status: u16 },
    #[error("Geocoder returned status '{0}'")]
    BadStatus(String),
}

/// One geocoded location.
#[derive(Debug, Clone)]
pub struct GeocodeResult {
    pub lat: f64,
    pub lng: f64,
    pub state: Option<String>,
    pub postal: Option<String>,
    pub formatted: String,
}

/// Thin client over the Google geocoding endpoint.
pub struct Geocoder {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl Geocoder {
    pub fn new(api_key: String) -> Result<Self, Error> {
        Self::with_base_url("https://maps.googleapis.com", api_key)
    }

    /// Custom base URL for testing with wiremock.
    pub fn with_base_url(base_url: &str, api_key: String) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build geocoder HTTP client: {}", e);
                Error::RequestFailed
            })?;
        Ok(Self {
            http,
            base_url: base_url.to_string(),
            api_key,
        })
    }

    /// Geocodes a free-form address. `Ok(None)` when nothing matched.
    pub async fn geocode(&self, address: &str) -> Result<Option<GeocodeResult>, Error> {
        let url = format!("{}/maps/api/geocode/json", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("address", address), ("key", &self.api_key)])
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Geocoding request failed: {}", e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::HttpStatus {
                status: status.as_u16(),
            });
        }

        let body: GeocodeResponse = resp.json().await.map_err(|e| {
            tracing::error!("Failed to parse geocoding response: {}", e);
            Error::RequestFailed
        })?;

        match body.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" => return Ok(None),
            other => return Err(Error::BadStatus(other.to_string())),
        }

        let Some(result) = body.results.into_iter().next() else {
            return Ok(None);
        };

        let mut state = None;
        let mut postal = None;
        for component in &result.address_components {
            if component
                .types
                .iter()
                .any(|t| t == "administrative_area_level_1")
            {
                state = Some(component.short_name.clone());
            }
            if component.types.iter().any(|t| t == "postal_code") {
                postal = Some(component.short_name.clone());
            }
        }

        Ok(Some(GeocodeResult {
            lat: result.geometry.location.lat,
            lng: result.geometry.location.lng,
            state,
            postal,
            formatted: result.formatted_address,
        }))
    }
}

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeEntry>,
}

#[derive(Deserialize)]
struct GeocodeEntry {
    formatted_address: String,
    geometry: Geometry,
    #[serde(default)]
    address_components: Vec<AddressComponent>,
}

#[derive(Deserialize)]
struct Geometry {
    location: Location,
}

#[derive(Deserialize)]
struct Location {
    lat: f64,
    lng: f64,
}

#[derive(Deserialize)]
struct AddressComponent {
    short_name: String,
    #[serde(default)]
    types: Vec<String>,
}
