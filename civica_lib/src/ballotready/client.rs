//! HTTP client for the BallotReady GraphQL endpoint.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use super::error::Error;
use super::queries;
use super::types::{
    Connection, GraphQlResponse, NodeData, OfficeHolderNode, OfficeHoldersData,
    PersonCandidaciesNode, PositionContainmentData, PositionContainmentNode, RaceNode, RacesData,
};

/// Relay page size; paging stops when `hasNextPage` is false or the end
/// cursor is empty.
pub const PAGE_SIZE: i64 = 100;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// GraphQL client for the BallotReady civic data API.
pub struct Client {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl Client {
    /// Creates a client pointing at the production endpoint.
    pub fn new(api_key: String) -> Result<Self, Error> {
        Self::with_endpoint("https://bpi.civicengine.com/graphql", api_key)
    }

    /// Creates a client with a custom endpoint. Used for testing with wiremock.
    pub fn with_endpoint(endpoint: &str, api_key: String) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        Ok(Self {
            http,
            endpoint: endpoint.to_string(),
            api_key,
        })
    }

    async fn post<T: DeserializeOwned>(&self, query: &str, variables: Value) -> Result<T, Error> {
        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await
            .map_err(|e| {
                tracing::error!("GraphQL request failed: {}", e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read GraphQL response body: {}", e);
            Error::RequestFailed
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("GraphQL endpoint returned {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        let parsed: GraphQlResponse<T> = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse GraphQL response: {} | body: {}", e, truncate_body(&body));
            Error::RequestFailed
        })?;

        if !parsed.errors.is_empty() {
            let messages: Vec<String> = parsed.errors.into_iter().map(|e| e.message).collect();
            return Err(Error::GraphQl(messages));
        }

        parsed.data.ok_or(Error::MissingData)
    }

    /// Walks a Relay connection to exhaustion.
    async fn paged<T, D, F>(&self, query: &str, base_vars: Value, extract: F) -> Result<Vec<T>, Error>
    where
        D: DeserializeOwned,
        F: Fn(D) -> Connection<T>,
    {
        let mut all = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let mut vars = base_vars.clone();
            vars["first"] = json!(PAGE_SIZE);
            vars["after"] = match &after {
                Some(cursor) => json!(cursor),
                None => Value::Null,
            };
            let data: D = self.post(query, vars).await?;
            let conn = extract(data);
            all.extend(conn.edges.into_iter().map(|e| e.node));
            if !conn.page_info.has_next_page {
                break;
            }
            match conn.page_info.end_cursor {
                Some(cursor) if !cursor.is_empty() => after = Some(cursor),
                // hasNextPage with no usable cursor still terminates.
                _ => break,
            }
        }
        Ok(all)
    }

    /// All officeholders for a postal code, every government level.
    pub async fn office_holders_by_zip(&self, zip: &str) -> Result<Vec<OfficeHolderNode>, Error> {
        self.paged(
            &queries::office_holders_by_zip(),
            json!({ "zip": zip }),
            |d: OfficeHoldersData| d.office_holders,
        )
        .await
    }

    /// All officeholders for a free-form address.
    pub async fn office_holders_by_address(
        &self,
        address: &str,
    ) -> Result<Vec<OfficeHolderNode>, Error> {
        self.paged(
            &queries::office_holders_by_address(),
            json!({ "address": address }),
            |d: OfficeHoldersData| d.office_holders,
        )
        .await
    }

    /// Candidacy graph for a person by Relay global ID. `None` when the ID
    /// resolves to nothing.
    pub async fn person_candidacies(
        &self,
        global_id: &str,
    ) -> Result<Option<PersonCandidaciesNode>, Error> {
        let data: NodeData<PersonCandidaciesNode> = self
            .post(queries::PERSON_CANDIDACIES, json!({ "id": global_id }))
            .await?;
        Ok(data.node)
    }

    /// Races for a postal code with an election day after `today`.
    pub async fn races_by_zip(
        &self,
        zip: &str,
        today: chrono::NaiveDate,
    ) -> Result<Vec<RaceNode>, Error> {
        self.paged(
            queries::RACES_BY_ZIP,
            json!({ "zip": zip, "electionDay": today.to_string() }),
            |d: RacesData| d.races,
        )
        .await
    }

    /// Containment flags for every position overlapping a postal code.
    pub async fn position_containment_by_zip(
        &self,
        zip: &str,
    ) -> Result<Vec<PositionContainmentNode>, Error> {
        self.paged(
            queries::POSITION_CONTAINMENT_BY_ZIP,
            json!({ "zip": zip }),
            |d: PositionContainmentData| d.positions,
        )
        .await
    }

    /// Cheap probe: a no-op typename query.
    pub async fn health_check(&self) -> Result<(), Error> {
        let _: Value = self.post(queries::HEALTH, json!({})).await?;
        Ok(())
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
