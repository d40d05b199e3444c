//! HTTP client for the Cicero REST API.

use std::time::Duration;

use url::Url;

use crate::{
    query::OfficialQuery,
    types::{Official, OfficialsResponse},
    Error,
};

/// Largest page the officials endpoint will return. A page with fewer
/// entries than this marks the end of the result set.
pub const PAGE_MAX: i64 = 199;

/// HTTP client for the Cicero REST API.
///
/// Holds a pooled `reqwest::Client` with a 30-second timeout. The API key is
/// appended to every request.
pub struct Client {
    http: reqwest::Client,
    base_api_url: String,
    api_key: String,
}

impl Client {
    /// Creates a new client pointing at the production API.
    pub fn new(api_key: String) -> Result<Self, Error> {
        Self::with_base_url("https://app.cicerodata.com/v3.1", api_key)
    }

    /// Creates a new client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str, api_key: String) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        Ok(Self {
            http,
            base_api_url: base_url.to_string(),
            api_key,
        })
    }

    fn get_url(&self, path: &str, query: &OfficialQuery) -> Result<Url, Error> {
        let url = Url::parse(format!("{}{}", &self.base_api_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::RequestFailed
        })?;
        let mut url = query.add_to_url(&url);
        url.query_pairs_mut().append_pair("key", &self.api_key);
        Ok(url)
    }

    /// Fetches one page of officials matching the given query.
    pub async fn get_officials(&self, query: &OfficialQuery) -> Result<OfficialsResponse, Error> {
        let url = self.get_url("/official", query)?;
        let resp = self
            .http
            .get(url)
            .header("accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get officials: {}", e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        let parsed = serde_json::from_str::<OfficialsResponse>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse officials: {} | body: {}", e, snippet);
            Error::RequestFailed
        })?;

        if !parsed.response.errors.is_empty() {
            return Err(Error::ApiErrors(parsed.response.errors));
        }

        Ok(parsed)
    }

    /// Fetches every official for a postal code, walking offset pages of
    /// [`PAGE_MAX`] until a short page signals the end.
    pub async fn get_all_officials(
        &self,
        postal: &str,
        district_types: &[&str],
    ) -> Result<Vec<Official>, Error> {
        let mut all = Vec::new();
        let mut offset = 0i64;
        loop {
            let mut query = OfficialQuery::default()
                .with_postal(postal)
                .with_max(PAGE_MAX)
                .with_offset(offset);
            if !district_types.is_empty() {
                query = query.with_district_types(district_types.iter().copied());
            }
            let resp = self.get_officials(&query).await?;
            let page: Vec<Official> = resp
                .response
                .results
                .candidates
                .into_iter()
                .flat_map(|c| c.officials)
                .collect();
            let page_len = page.len() as i64;
            all.extend(page);
            if page_len < PAGE_MAX {
                break;
            }
            offset += PAGE_MAX;
        }
        Ok(all)
    }

    /// Cheap probe: fetch a single official for a known-good postal code.
    pub async fn health_check(&self) -> Result<(), Error> {
        let query = OfficialQuery::default()
            .with_postal("20500")
            .with_district_types(["NATIONAL_EXEC"])
            .with_max(1);
        self.get_officials(&query).await.map(|_| ())
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        format!("{}...[truncated]", &body[..MAX])
    }
}
