//! BallotReady GraphQL provider: Relay-paginated officeholder, candidacy,
//! race, and containment queries.

pub mod adapter;
pub mod client;
pub mod error;
pub mod queries;
pub mod types;

pub use adapter::BallotReadyProvider;
pub use client::{Client, PAGE_SIZE};
pub use error::Error;
