//! Library layer for Civica: provider adapters, the normalization/upsert
//! pipeline, the three-tier freshness cache with background warmers, and
//! the location dispatch that serves reads.
//!
//! Wraps the vendored `cicero_api` crate and a BallotReady GraphQL client
//! behind one provider trait, persisting normalized officials to Postgres.

pub mod ballotready;
pub mod candidacy;
pub mod cicero;
pub mod dispatch;
pub mod district;
pub mod error;
pub mod freshness;
pub mod geo;
pub mod geocode;
pub mod import;
pub mod locks;
pub mod provider;
pub mod read;
pub mod record;
pub mod store;
pub mod upsert;
pub mod validation;
pub mod warm;
pub mod zipstate;

pub use cicero_api;
pub use sqlx;

pub use dispatch::{postal_flow, search_address, PostalFlow, PostalOutcome, SearchResult};
pub use district::{map_district_type, DistrictType, PositionLevel, LOCAL_TYPES};
pub use error::CivicaError;
pub use freshness::FreshnessView;
pub use geocode::Geocoder;
pub use import::{ImportJob, JobRegistry, JobStatus};
pub use provider::{build_provider, Provider, ProviderConfig, ProviderError};
pub use read::{is_elected, OfficialView};
pub use record::OfficialRecord;
pub use store::Db;
pub use warm::{warm_federal, warm_local, warm_state, WarmOutcome, DEFAULT_MAX_AGE_DAYS};
