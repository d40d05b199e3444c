//! Unofficial client for the Cicero elected-officials REST API.
//!
//! Cicero returns currently-serving officials for a location. Responses are
//! offset-paginated; [`Client::get_all_officials`] walks every page for a
//! postal code and district-type filter.

pub mod client;
pub mod errors;
pub mod query;
pub mod types;

pub use client::{Client, PAGE_MAX};
pub use errors::Error;
pub use query::OfficialQuery;
