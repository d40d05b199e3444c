//! Error types for the GraphQL client.

/// Errors that can occur when talking to the GraphQL endpoint.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// An HTTP request failed (network error, timeout, or unparseable response).
    #[error("Request failed")]
    RequestFailed,
    /// The endpoint returned a non-success status with a body snippet.
    #[error("Request failed with status {status}")]
    HttpStatus { status: u16, body: String },
    /// The response carried GraphQL errors.
    #[error("GraphQL errors: {0:?}")]
    GraphQl(Vec<String>),
    /// A 2xx response with neither data nor errors.
    #[error("GraphQL response missing data")]
    MissingData,
}
