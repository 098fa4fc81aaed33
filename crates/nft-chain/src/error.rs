//! Chain API error types.

/// Errors that can occur when querying or broadcasting through a chain API.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Server returned a non-2xx response.
    #[error("server error ({status_code}): {message}")]
    Server {
        /// HTTP status code.
        status_code: u16,
        /// Error message from the server.
        message: String,
    },

    /// Resource not found (404).
    #[error("not found")]
    NotFound,

    /// The node refused the transaction (double spend, invalid script, ...).
    #[error("broadcast rejected: {0}")]
    Rejected(String),

    /// The response carried data the client could not interpret.
    #[error("invalid chain data: {0}")]
    InvalidData(String),
}
