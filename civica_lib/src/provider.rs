//! The provider seam: a common adapter trait over the two upstream data
//! sources, plus the static registry that picks the active one at startup.

use std::sync::Arc;

use async_trait::async_trait;

use crate::district::{DistrictType, STATE_TIER_TYPES};
use crate::error::CivicaError;
use crate::record::{OfficialRecord, PersonCandidacies, RaceRecord};

/// Postal code used for queries that need any valid location (federal
/// officials are identical nationwide).
pub const FEDERAL_SAMPLE_POSTAL: &str = "20500";

/// District types fetched by the federal warmer.
pub const FEDERAL_TYPES: &[DistrictType] = &[
    DistrictType::NationalExec,
    DistrictType::NationalUpper,
    DistrictType::NationalLower,
];

/// Errors surfaced by provider adapters.
#[derive(thiserror::Error, Debug)]
pub enum ProviderError {
    /// The REST provider failed.
    #[error("REST provider: {0}")]
    Rest(#[from] cicero_api::Error),
    /// The GraphQL provider failed.
    #[error("GraphQL provider: {0}")]
    Graph(#[from] crate::ballotready::Error),
    /// The active provider does not implement this operation.
    #[error("operation not supported by this provider: {0}")]
    Unsupported(&'static str),
}

/// Common outbound contract for both upstream providers.
///
/// Operations the REST provider cannot serve (address lookup, candidacy
/// data, races, containment) keep their default `Unsupported` bodies.
#[async_trait]
pub trait Provider: Send + Sync {
    fn name(&self) -> &'static str;

    /// All officials for a postal code, optionally filtered by district type.
    async fn fetch_by_postal(
        &self,
        postal: &str,
        filter: Option<&[DistrictType]>,
    ) -> Result<Vec<OfficialRecord>, ProviderError>;

    /// State-tier officials for a state, queried through a sample postal
    /// code inside it and post-filtered on representing/district state.
    async fn fetch_by_state(
        &self,
        state: &str,
        sample_postal: &str,
    ) -> Result<Vec<OfficialRecord>, ProviderError> {
        let records = self
            .fetch_by_postal(sample_postal, Some(STATE_TIER_TYPES))
            .await?;
        Ok(records
            .into_iter()
            .filter(|r| r.state().is_some_and(|s| s.eq_ignore_ascii_case(state)))
            .collect())
    }

    /// Federal officials (identical nationwide).
    async fn fetch_federal(&self) -> Result<Vec<OfficialRecord>, ProviderError> {
        self.fetch_by_postal(FEDERAL_SAMPLE_POSTAL, Some(FEDERAL_TYPES))
            .await
    }

    /// Officials for a free-form street address.
    async fn fetch_by_address(&self, _address: &str) -> Result<Vec<OfficialRecord>, ProviderError> {
        Err(ProviderError::Unsupported("address lookup"))
    }

    /// Candidacy graph for one person, by provider global ID.
    async fn fetch_candidacy_data(
        &self,
        _global_id: &str,
    ) -> Result<Option<PersonCandidacies>, ProviderError> {
        Err(ProviderError::Unsupported("candidacy data"))
    }

    /// Future races for a postal code.
    async fn fetch_races_by_postal(
        &self,
        _postal: &str,
    ) -> Result<Vec<RaceRecord>, ProviderError> {
        Err(ProviderError::Unsupported("races by postal"))
    }

    /// Position-containment pairs `(position external ID, fully contains
    /// the postal area)`.
    async fn fetch_position_containment_by_postal(
        &self,
        _postal: &str,
    ) -> Result<Vec<(String, bool)>, ProviderError> {
        Err(ProviderError::Unsupported("position containment"))
    }

    /// Cheap upstream probe.
    async fn health_check(&self) -> Result<(), ProviderError>;
}

/// Keys and endpoints read from the environment at startup.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub cicero_api_key: Option<String>,
    pub ballotready_api_key: Option<String>,
    pub ballotready_endpoint: Option<String>,
}

/// Builds the named provider. The set of providers is closed; there is no
/// dynamic plugin loading.
pub fn build_provider(
    name: &str,
    cfg: &ProviderConfig,
) -> Result<Arc<dyn Provider>, CivicaError> {
    match name {
        "cicero" => {
            let key = cfg.cicero_api_key.clone().ok_or_else(|| {
                CivicaError::ProviderConfig("CICERO_API_KEY is not set".to_string())
            })?;
            let client = cicero_api::Client::new(key)
                .map_err(|e| CivicaError::Provider(ProviderError::Rest(e)))?;
            Ok(Arc::new(crate::cicero::CiceroProvider::new(client)))
        }
        "ballotready" => {
            let key = cfg.ballotready_api_key.clone().ok_or_else(|| {
                CivicaError::ProviderConfig("BALLOTREADY_API_KEY is not set".to_string())
            })?;
            let client = match cfg.ballotready_endpoint.as_deref() {
                Some(endpoint) => crate::ballotready::Client::with_endpoint(endpoint, key),
                None => crate::ballotready::Client::new(key),
            }
            .map_err(|e| CivicaError::Provider(ProviderError::Graph(e)))?;
            Ok(Arc::new(crate::ballotready::BallotReadyProvider::new(
                client,
            )))
        }
        other => Err(CivicaError::ProviderConfig(format!(
            "unknown provider '{}'",
            other
        ))),
    }
}
